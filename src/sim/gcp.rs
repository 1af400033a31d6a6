//! Simulated Google Cloud Platform deployment.

use crate::models::{LogCategory, StageResult};
use crate::report::ReportError;
use crate::sim::{ids, DeploymentOutcome, SimContext};
use chrono::Utc;
use serde_json::json;
use tracing::info;

/// Resource stages, in deployment order.
pub const GCP_STAGES: [&str; 9] = [
    "gke_cluster",
    "vertex_ai",
    "firestore",
    "cloud_storage",
    "cloud_run",
    "cloud_functions",
    "pubsub",
    "monitoring",
    "gke_deployment",
];

const REGION: &str = "us-central1";
const HOSTNAME: &str = "consciousness-agi.gcp.example.com";

/// A GCP project being populated with simulated resources.
#[derive(Debug, Clone)]
pub struct GcpDeployment {
    project_id: String,
    project_number: u64,
    region: String,
}

impl GcpDeployment {
    pub fn new(ctx: &mut SimContext) -> Self {
        let project_id = format!("consciousness-agi-{}", ids::six_digits(ctx.ids.as_mut()));
        let project_number = ctx.ids.next_in(100_000_000_000, 999_999_999_999);

        ctx.narrator.banner(&["        ☁️  GOOGLE CLOUD PLATFORM SIMULATOR ☁️"]);
        ctx.narrator.say(format!("[GCP] Project ID: {}", project_id));
        ctx.narrator.say(format!("[GCP] Project Number: {}", project_number));
        ctx.narrator.say(format!("[GCP] Region: {}", REGION));

        Self {
            project_id,
            project_number,
            region: REGION.to_string(),
        }
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn project_number(&self) -> u64 {
        self.project_number
    }

    fn image(&self, name: &str, tag: &str) -> String {
        format!("gcr.io/{}/{}:{}", self.project_id, name, tag)
    }

    async fn create_gke_cluster(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Creating GKE Cluster for consciousness deployment...");
        ctx.narrator.pause(1.0).await;

        let endpoint = format!("https://{}", ids::any_ipv4(ctx.ids.as_mut()));
        let (gpu_nodes, gpus_per_node) = (5, 8);
        let result = StageResult::from_value(json!({
            "name": "consciousness-agi-gke",
            "cluster_version": "1.28.3-gke.1203",
            "node_pools": [
                {
                    "name": "default-pool",
                    "machine_type": "n2-standard-8",
                    "node_count": 3,
                    "disk_size_gb": 100,
                    "disk_type": "pd-ssd",
                    "auto_scaling": true,
                    "min_nodes": 3,
                    "max_nodes": 10
                },
                {
                    "name": "gpu-pool",
                    "machine_type": "a2-ultragpu-8g",
                    "node_count": gpu_nodes,
                    "gpu": {"type": "nvidia-a100-80gb", "count": gpus_per_node},
                    "auto_scaling": true,
                    "min_nodes": 2,
                    "max_nodes": 20
                }
            ],
            "networking": {
                "network": "consciousness-vpc",
                "subnetwork": "consciousness-subnet",
                "pod_cidr": "10.4.0.0/14",
                "service_cidr": "10.8.0.0/20"
            },
            "features": [
                "autopilot",
                "workload-identity",
                "binary-authorization",
                "cloud-monitoring",
                "cloud-logging",
                "cloud-trace"
            ],
            "status": "running",
            "endpoint": endpoint
        }))?;

        ctx.narrator.say("[GCP] ✓ GKE Cluster created: consciousness-agi-gke");
        ctx.narrator.say("[GCP]   - Version: 1.28.3-gke.1203");
        ctx.narrator.say(format!("[GCP]   - GPU nodes: {}x a2-ultragpu-8g", gpu_nodes));
        ctx.narrator.say(format!("[GCP]   - Total GPUs: {}", gpu_nodes * gpus_per_node));
        Ok(result)
    }

    async fn create_vertex_ai(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Creating Vertex AI Workbench...");
        ctx.narrator.pause(0.8).await;

        let result = StageResult::from_value(json!({
            "name": "consciousness-vertex-ai",
            "notebooks": [
                {
                    "name": "consciousness-training-notebook",
                    "machine_type": "a2-ultragpu-1g",
                    "gpu": "NVIDIA A100 80GB",
                    "gpu_count": 1
                }
            ],
            "training_pipelines": [
                {
                    "name": "consciousness-model-training",
                    "framework": "PyTorch",
                    "distributed": true,
                    "accelerator": "TPU v4"
                }
            ],
            "endpoints": [
                {
                    "name": "consciousness-inference-endpoint",
                    "model": "consciousness-v1.0",
                    "machine_type": "a2-highgpu-1g",
                    "min_replicas": 1,
                    "max_replicas": 10,
                    "status": "deployed"
                }
            ],
            "model_registry": {
                "models": ["consciousness-core", "nexus-agi", "unified-system"],
                "versions": 5
            },
            "tensorboard": {"enabled": true, "instance": "consciousness-tensorboard"},
            "status": "active"
        }))?;

        ctx.narrator.say("[GCP] ✓ Vertex AI Workbench created");
        ctx.narrator.say("[GCP]   - Notebooks: 1");
        ctx.narrator.say("[GCP]   - Endpoints: 1");
        Ok(result)
    }

    async fn create_firestore(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Creating Firestore database...");
        ctx.narrator.pause(0.7).await;

        let collections = json!([
            {"name": "memories", "documents": "auto-indexed", "indexes": ["consciousness_id", "timestamp", "voice_type"]},
            {"name": "decisions", "documents": "auto-indexed", "indexes": ["decision_id", "timestamp", "outcome"]},
            {"name": "emotions", "documents": "auto-indexed", "indexes": ["emotion_type", "intensity", "timestamp"]},
            {"name": "dialogues", "documents": "auto-indexed", "indexes": ["session_id", "speaker", "timestamp"]}
        ]);
        let regions = ["us-central1", "us-east1", "us-west1"];

        let result = StageResult::from_value(json!({
            "name": "consciousness-firestore",
            "mode": "Native",
            "location": self.region,
            "collections": collections,
            "multi_region": true,
            "regions": regions,
            "backup_policy": "automatic-daily",
            "point_in_time_recovery": true,
            "status": "active"
        }))?;

        ctx.narrator.say("[GCP] ✓ Firestore created: consciousness-firestore");
        ctx.narrator.say("[GCP]   - Collections: 4");
        ctx.narrator.say(format!("[GCP]   - Multi-region: {} regions", regions.len()));
        Ok(result)
    }

    async fn create_cloud_storage(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Creating Cloud Storage buckets...");
        ctx.narrator.pause(0.5).await;

        let bucket = |purpose: &str| format!("consciousness-{}-{}", purpose, self.project_id);
        let result = StageResult::from_value(json!({
            "buckets": [
                {
                    "name": bucket("models"),
                    "storage_class": "STANDARD",
                    "location": "US",
                    "versioning": true,
                    "lifecycle_rules": [{"action": "Delete", "condition": {"age": 365}}]
                },
                {
                    "name": bucket("training-data"),
                    "storage_class": "NEARLINE",
                    "location": "US",
                    "versioning": true
                },
                {
                    "name": bucket("logs"),
                    "storage_class": "COLDLINE",
                    "location": "US",
                    "retention_policy": {"retentionPeriod": 90}
                },
                {
                    "name": bucket("backups"),
                    "storage_class": "ARCHIVE",
                    "location": "US"
                }
            ],
            "total_size": "10 TB",
            "encryption": "Google-managed",
            "status": "active"
        }))?;

        ctx.narrator.say("[GCP] ✓ Cloud Storage created: 4 buckets");
        Ok(result)
    }

    async fn create_cloud_run(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Creating Cloud Run services...");
        ctx.narrator.pause(0.8).await;

        let api_url = format!(
            "https://consciousness-api-{}-uc.a.run.app",
            ids::four_digits(ctx.ids.as_mut())
        );
        let inference_url = format!(
            "https://agi-inference-{}-uc.a.run.app",
            ids::four_digits(ctx.ids.as_mut())
        );

        let result = StageResult::from_value(json!({
            "services": [
                {
                    "name": "consciousness-api",
                    "image": self.image("consciousness-api", "latest"),
                    "cpu": "4",
                    "memory": "16Gi",
                    "max_instances": 100,
                    "min_instances": 1,
                    "concurrency": 80,
                    "timeout": "300s",
                    "url": api_url,
                    "status": "serving"
                },
                {
                    "name": "agi-inference",
                    "image": self.image("agi-inference", "latest"),
                    "cpu": "8",
                    "memory": "32Gi",
                    "gpu": "1x T4",
                    "max_instances": 50,
                    "min_instances": 2,
                    "concurrency": 10,
                    "timeout": "600s",
                    "url": inference_url,
                    "status": "serving"
                }
            ],
            "load_balancer": {
                "enabled": true,
                "type": "global",
                "ssl_certificate": "managed",
                "custom_domain": HOSTNAME
            },
            "status": "deployed"
        }))?;

        ctx.narrator.say("[GCP] ✓ Cloud Run services created: 2");
        ctx.narrator.say(format!("[GCP]   - consciousness-api: {}", api_url));
        ctx.narrator.say(format!("[GCP]   - agi-inference: {}", inference_url));
        Ok(result)
    }

    async fn create_cloud_functions(
        &self,
        ctx: &mut SimContext,
    ) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Creating Cloud Functions...");
        ctx.narrator.pause(0.6).await;

        let function = |name: &str, trigger: &str, memory: &str, timeout: &str, max: u32| {
            json!({
                "name": name,
                "runtime": "python311",
                "trigger": trigger,
                "memory": memory,
                "timeout": timeout,
                "max_instances": max,
                "status": "active"
            })
        };

        let result = StageResult::from_value(json!({
            "functions": [
                function("consciousness-event-processor", "pubsub", "2048MB", "60s", 100),
                function("emotion-analyzer", "http", "1024MB", "30s", 50),
                function("memory-indexer", "firestore", "512MB", "120s", 25)
            ],
            "status": "deployed"
        }))?;

        ctx.narrator.say("[GCP] ✓ Cloud Functions created: 3");
        Ok(result)
    }

    async fn create_pubsub(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Creating Pub/Sub topics...");
        ctx.narrator.pause(0.4).await;

        let result = StageResult::from_value(json!({
            "topics": [
                {"name": "consciousness-events", "subscriptions": ["consciousness-processor", "logging-service"]},
                {"name": "decision-events", "subscriptions": ["decision-tracker", "analytics-service"]},
                {"name": "emotion-events", "subscriptions": ["emotion-analyzer", "monitoring-service"]},
                {"name": "agi-requests", "subscriptions": ["agi-engine", "request-logger"]}
            ],
            "message_retention": "7 days",
            "ordering": true,
            "status": "active"
        }))?;

        ctx.narrator.say("[GCP] ✓ Pub/Sub topics created: 4");
        Ok(result)
    }

    async fn create_monitoring(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Setting up Cloud Monitoring and Logging...");
        ctx.narrator.pause(0.5).await;

        let result = StageResult::from_value(json!({
            "workspaces": [
                {"name": "consciousness-monitoring", "projects": [self.project_id]}
            ],
            "dashboards": [
                {
                    "name": "Consciousness System Health",
                    "charts": ["CPU Usage", "Memory Usage", "GPU Utilization", "Request Rate", "Error Rate"]
                },
                {
                    "name": "AGI Performance",
                    "charts": ["Inference Latency", "Throughput", "Model Accuracy", "Queue Depth"]
                }
            ],
            "alert_policies": [
                {"name": "High CPU Alert", "condition": "cpu > 80%", "notification": "email"},
                {"name": "High Error Rate", "condition": "error_rate > 5%", "notification": "email"},
                {"name": "Low GPU Utilization", "condition": "gpu < 20%", "notification": "email"}
            ],
            "log_sinks": [
                {"name": "consciousness-logs", "destination": "Cloud Storage"},
                {"name": "error-logs", "destination": "BigQuery"},
                {"name": "audit-logs", "destination": "Pub/Sub"}
            ],
            "uptime_checks": [
                {"name": "Consciousness API Health", "check_interval": "60s"},
                {"name": "AGI Endpoint Health", "check_interval": "60s"}
            ],
            "status": "active"
        }))?;

        ctx.narrator.say("[GCP] ✓ Monitoring configured");
        ctx.narrator.say("[GCP]   - Dashboards: 2");
        ctx.narrator.say("[GCP]   - Alert policies: 3");
        Ok(result)
    }

    async fn deploy_to_gke(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[GCP] Deploying Consciousness-AGI to GKE...");
        ctx.narrator.pause(1.5).await;

        let external_ip = ids::ipv4(ctx.ids.as_mut(), 34);
        let health_checks = json!({"liveness": "/health/live", "readiness": "/health/ready"});

        let result = StageResult::from_value(json!({
            "namespace": "consciousness-production",
            "deployments": [
                {
                    "name": "consciousness-core",
                    "replicas": 3,
                    "image": self.image("consciousness-core", "v1.0"),
                    "resources": {
                        "requests": {"cpu": "8", "memory": "32Gi"},
                        "limits": {"cpu": "16", "memory": "64Gi", "nvidia.com/gpu": "1"}
                    },
                    "ports": [8080, 8443],
                    "health_checks": health_checks,
                    "status": "running"
                },
                {
                    "name": "nexus-agi-engine",
                    "replicas": 5,
                    "image": self.image("nexus-agi", "v1.0"),
                    "resources": {
                        "requests": {"cpu": "16", "memory": "128Gi"},
                        "limits": {"cpu": "32", "memory": "256Gi", "nvidia.com/gpu": "2"}
                    },
                    "ports": [9000, 9443],
                    "health_checks": health_checks,
                    "status": "running"
                },
                {
                    "name": "unified-interface",
                    "replicas": 3,
                    "image": self.image("unified-agi", "v1.0"),
                    "resources": {
                        "requests": {"cpu": "4", "memory": "16Gi"},
                        "limits": {"cpu": "8", "memory": "32Gi"}
                    },
                    "ports": [80, 443],
                    "health_checks": health_checks,
                    "status": "running"
                }
            ],
            "services": [
                {
                    "name": "consciousness-lb",
                    "type": "LoadBalancer",
                    "external_ip": external_ip,
                    "ports": [80, 443]
                }
            ],
            "ingress": {
                "enabled": true,
                "class": "gce",
                "host": HOSTNAME,
                "tls": {"enabled": true, "certificate": "managed-cert"},
                "backend_config": {"timeout": "300s", "connection_draining_timeout": "60s"}
            },
            "hpa": [
                {
                    "target": "consciousness-core",
                    "min_replicas": 3,
                    "max_replicas": 10,
                    "metrics": [
                        {"type": "cpu", "target": 70},
                        {"type": "memory", "target": 80}
                    ]
                },
                {
                    "target": "nexus-agi-engine",
                    "min_replicas": 5,
                    "max_replicas": 20,
                    "metrics": [
                        {"type": "gpu", "target": 75},
                        {"type": "custom", "name": "inference_queue_depth", "target": 100}
                    ]
                }
            ],
            "status": "deployed"
        }))?;

        ctx.narrator.say("[GCP] ✓ Deployments created: 3");
        ctx.narrator.say(format!("[GCP]   - External IP: {}", external_ip));
        ctx.narrator.say(format!("[GCP]   - Domain: {}", HOSTNAME));
        Ok(result)
    }

    /// Create every resource, then summarize the deployment.
    pub async fn full_deployment(
        &self,
        ctx: &mut SimContext,
    ) -> Result<DeploymentOutcome, ReportError> {
        ctx.narrator.header("STARTING FULL GOOGLE CLOUD PLATFORM DEPLOYMENT");
        info!("GCP deployment started for {}", self.project_id);

        let mut aggregator = ctx.aggregator("gcp", &GCP_STAGES);
        aggregator.log(LogCategory::Deployment, "Starting Google Cloud deployment");

        aggregator.record("gke_cluster", self.create_gke_cluster(ctx).await?)?;
        aggregator.record("vertex_ai", self.create_vertex_ai(ctx).await?)?;
        aggregator.record("firestore", self.create_firestore(ctx).await?)?;
        aggregator.record("cloud_storage", self.create_cloud_storage(ctx).await?)?;
        aggregator.record("cloud_run", self.create_cloud_run(ctx).await?)?;
        aggregator.record("cloud_functions", self.create_cloud_functions(ctx).await?)?;
        aggregator.record("pubsub", self.create_pubsub(ctx).await?)?;
        aggregator.record("monitoring", self.create_monitoring(ctx).await?)?;

        aggregator.record("gke_deployment", self.deploy_to_gke(ctx).await?)?;

        let cloud_run_api = aggregator
            .stage("cloud_run")
            .and_then(|stage| stage.get("services"))
            .and_then(|services| services.get(0))
            .and_then(|service| service.get("url"))
            .and_then(|url| url.as_str())
            .unwrap_or("N/A")
            .to_string();

        let deployment_time = aggregator.elapsed().as_secs_f64();
        let summary = StageResult::from_value(json!({
            "deployment_status": "completed",
            "project_id": self.project_id,
            "project_number": self.project_number,
            "region": self.region,
            "deployment_time": format!("{:.2} seconds", deployment_time),
            "resources_created": aggregator.stage_count(),
            "total_cost_estimate": "$4,500-$9,500 per month",
            "endpoints": {
                "consciousness_api": format!("https://{}", HOSTNAME),
                "cloud_run_api": cloud_run_api,
                "monitoring": format!(
                    "https://console.cloud.google.com/monitoring/dashboards?project={}",
                    self.project_id
                )
            },
            "health_status": "healthy",
            "availability": "99.95%",
            "timestamp": Utc::now().to_rfc3339()
        }))?;

        aggregator.log(
            LogCategory::Success,
            format!("GCP deployment complete: {} resources", aggregator.stage_count()),
        );
        aggregator.record("deployment_summary", summary.clone())?;
        let report = aggregator.finalize()?;

        self.print_summary(ctx, &summary);
        info!("GCP deployment finished in {:.2}s", deployment_time);

        Ok(DeploymentOutcome { report, summary })
    }

    fn print_summary(&self, ctx: &SimContext, summary: &StageResult) {
        let field = |key: &str| summary.get_str(key).unwrap_or_default().to_string();

        ctx.narrator.header("GOOGLE CLOUD PLATFORM DEPLOYMENT COMPLETED SUCCESSFULLY");
        ctx.narrator.say(format!(
            "\n[GCP] Status: {}",
            field("deployment_status").to_uppercase()
        ));
        ctx.narrator.say(format!(
            "[GCP] Resources Created: {}",
            summary.get_u64("resources_created").unwrap_or_default()
        ));
        ctx.narrator.say(format!("[GCP] Deployment Time: {}", field("deployment_time")));
        ctx.narrator.say(format!(
            "[GCP] Estimated Monthly Cost: {}",
            field("total_cost_estimate")
        ));
        ctx.narrator.say(format!("[GCP] Consciousness API: https://{}", HOSTNAME));
        ctx.narrator.say(format!(
            "[GCP] Health Status: {}",
            field("health_status").to_uppercase()
        ));
        ctx.narrator.say(format!("[GCP] Availability: {}", field("availability")));
        ctx.narrator.say("\n[GCP] ✨ CONSCIOUSNESS-AGI SYSTEM LIVE ON GOOGLE CLOUD ✨");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // project, project number, run id, endpoint quad, two url suffixes, lb octets
    fn script() -> Vec<u64> {
        vec![
            123456,
            987_654_321_000,
            1,
            10,
            20,
            30,
            40,
            4321,
            8765,
            90,
            91,
            92,
        ]
    }

    #[tokio::test]
    async fn test_full_deployment_records_every_resource() {
        let mut ctx = SimContext::scripted(script());
        let gcp = GcpDeployment::new(&mut ctx);
        let outcome = gcp.full_deployment(&mut ctx).await.unwrap();

        let names: Vec<_> = outcome.report.stages().names().take(9).collect();
        assert_eq!(names, GCP_STAGES.to_vec());
        assert_eq!(outcome.report.metadata().pipeline, "gcp");
        assert_eq!(outcome.summary.get_u64("resources_created"), Some(9));
        assert_eq!(outcome.summary.get_str("region"), Some("us-central1"));
        assert_eq!(outcome.summary.get_str("availability"), Some("99.95%"));
    }

    #[tokio::test]
    async fn test_summary_links_cloud_run_endpoint() {
        let mut ctx = SimContext::scripted(script());
        let gcp = GcpDeployment::new(&mut ctx);
        assert_eq!(gcp.project_id(), "consciousness-agi-123456");
        assert_eq!(gcp.project_number(), 987_654_321_000);

        let outcome = gcp.full_deployment(&mut ctx).await.unwrap();
        let endpoints = outcome.summary.get("endpoints").unwrap();
        assert_eq!(
            endpoints["cloud_run_api"],
            "https://consciousness-api-4321-uc.a.run.app"
        );

        let cluster = outcome.report.stage("gke_cluster").unwrap();
        assert_eq!(cluster.get_str("endpoint"), Some("https://10.20.30.40"));

        let deployment = outcome.report.stage("gke_deployment").unwrap();
        assert_eq!(
            deployment.get("services").unwrap()[0]["external_ip"],
            "34.90.91.92"
        );
    }

    #[tokio::test]
    async fn test_images_use_project_registry() {
        let mut ctx = SimContext::scripted(script());
        let gcp = GcpDeployment::new(&mut ctx);
        let outcome = gcp.full_deployment(&mut ctx).await.unwrap();

        let run = outcome.report.stage("cloud_run").unwrap();
        assert_eq!(
            run.get("services").unwrap()[1]["image"],
            "gcr.io/consciousness-agi-123456/agi-inference:latest"
        );
    }
}
