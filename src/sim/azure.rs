//! Simulated Microsoft Azure deployment.

use crate::models::{LogCategory, StageResult};
use crate::report::ReportError;
use crate::sim::{ids, DeploymentOutcome, SimContext};
use chrono::Utc;
use serde_json::json;
use tracing::info;

/// Resource stages, in deployment order.
pub const AZURE_STAGES: [&str; 9] = [
    "resource_group",
    "aks_cluster",
    "ml_workspace",
    "cognitive_services",
    "cosmos_db",
    "storage_account",
    "app_insights",
    "container_deployment",
    "autoscaling",
];

const RESOURCE_GROUP: &str = "consciousness-agi-rg";
const LOCATION: &str = "eastus2";
const HOSTNAME: &str = "consciousness-agi.azure.example.com";

/// An Azure subscription being populated with simulated resources.
#[derive(Debug, Clone)]
pub struct AzureDeployment {
    subscription_id: String,
    resource_group: String,
    location: String,
}

impl AzureDeployment {
    pub fn new(ctx: &mut SimContext) -> Self {
        let subscription_id = format!("azure-sub-{}", ids::six_digits(ctx.ids.as_mut()));

        ctx.narrator.banner(&["        ☁️  MICROSOFT AZURE CLOUD SIMULATOR ☁️"]);
        ctx.narrator.say(format!("[AZURE] Subscription ID: {}", subscription_id));
        ctx.narrator.say(format!("[AZURE] Resource Group: {}", RESOURCE_GROUP));
        ctx.narrator.say(format!("[AZURE] Location: {}", LOCATION));

        Self {
            subscription_id,
            resource_group: RESOURCE_GROUP.to_string(),
            location: LOCATION.to_string(),
        }
    }

    pub fn subscription_id(&self) -> &str {
        &self.subscription_id
    }

    async fn create_resource_group(
        &self,
        ctx: &mut SimContext,
    ) -> Result<StageResult, ReportError> {
        ctx.narrator.say(format!(
            "\n[AZURE] Creating Resource Group: {}...",
            self.resource_group
        ));
        ctx.narrator.pause(0.5).await;

        let result = StageResult::from_value(json!({
            "name": self.resource_group,
            "location": self.location,
            "tags": {
                "project": "consciousness-agi",
                "environment": "production",
                "ai-type": "nexus-agi"
            },
            "status": "active"
        }))?;

        ctx.narrator.say("[AZURE] ✓ Resource Group created successfully");
        Ok(result)
    }

    async fn create_aks_cluster(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Creating AKS Cluster for consciousness deployment...");
        ctx.narrator.pause(1.0).await;

        let result = StageResult::from_value(json!({
            "name": "consciousness-agi-aks",
            "kubernetes_version": "1.28.3",
            "node_pools": [
                {
                    "name": "systempool",
                    "vm_size": "Standard_D8s_v3",
                    "count": 3,
                    "mode": "System"
                },
                {
                    "name": "aipool",
                    "vm_size": "Standard_NC96ads_A100_v4",
                    "count": 5,
                    "mode": "User",
                    "gpu_type": "NVIDIA A100 (80GB)"
                }
            ],
            "networking": {
                "network_plugin": "azure",
                "service_cidr": "10.0.0.0/16",
                "dns_service_ip": "10.0.0.10",
                "pod_cidr": "10.244.0.0/16"
            },
            "features": [
                "auto-scaling",
                "azure-container-registry-integration",
                "azure-monitor",
                "azure-policy"
            ],
            "status": "running"
        }))?;

        ctx.narrator.say("[AZURE] ✓ AKS Cluster created: consciousness-agi-aks");
        ctx.narrator.say("[AZURE]   - Kubernetes version: 1.28.3");
        ctx.narrator.say("[AZURE]   - GPU nodes: 5x Standard_NC96ads_A100_v4");
        Ok(result)
    }

    async fn create_ml_workspace(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Creating Azure ML Workspace...");
        ctx.narrator.pause(0.8).await;

        let result = StageResult::from_value(json!({
            "name": "consciousness-ml-workspace",
            "sku": "Enterprise",
            "compute_instances": [
                {
                    "name": "consciousness-train-gpu",
                    "vm_size": "Standard_NC96ads_A100_v4",
                    "gpu_count": 8
                }
            ],
            "compute_clusters": [
                {
                    "name": "consciousness-inference",
                    "vm_size": "Standard_NC48ads_A100_v4",
                    "min_nodes": 1,
                    "max_nodes": 10,
                    "auto_scale": true
                }
            ],
            "experiments": ["consciousness-training", "agi-optimization"],
            "model_registry": "enabled",
            "mlflow_tracking": "enabled",
            "status": "active"
        }))?;

        ctx.narrator.say("[AZURE] ✓ Azure ML Workspace created: consciousness-ml-workspace");
        ctx.narrator.say("[AZURE]   - GPU compute instances: 1");
        Ok(result)
    }

    async fn create_cognitive_services(
        &self,
        ctx: &mut SimContext,
    ) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Creating Cognitive Services...");
        ctx.narrator.pause(0.5).await;

        let services = [
            "OpenAI",
            "Computer Vision",
            "Speech",
            "Language Understanding",
            "Custom Vision",
            "Form Recognizer",
        ];
        let endpoint = |service: &str| {
            format!(
                "https://{}.api.cognitive.microsoft.com/{}",
                self.location, service
            )
        };

        let result = StageResult::from_value(json!({
            "name": "consciousness-cognitive-services",
            "kind": "CognitiveServices",
            "sku": "S0",
            "services": services,
            "api_endpoints": {
                "openai": endpoint("openai"),
                "vision": endpoint("vision"),
                "speech": endpoint("speech")
            },
            "status": "provisioned"
        }))?;

        ctx.narrator.say("[AZURE] ✓ Cognitive Services created");
        ctx.narrator.say(format!("[AZURE]   - Services enabled: {}", services.len()));
        Ok(result)
    }

    async fn create_cosmos_db(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Creating Cosmos DB for consciousness memory storage...");
        ctx.narrator.pause(0.7).await;

        let regions = ["East US 2", "West US 2", "North Europe"];
        let result = StageResult::from_value(json!({
            "name": "consciousness-cosmos-db",
            "api": "Core (SQL)",
            "capacity_mode": "Serverless",
            "consistency_level": "Session",
            "databases": [
                {
                    "name": "consciousness_db",
                    "containers": [
                        {"name": "memories", "partition_key": "/consciousness_id"},
                        {"name": "decisions", "partition_key": "/timestamp"},
                        {"name": "emotions", "partition_key": "/emotion_type"},
                        {"name": "dialogues", "partition_key": "/session_id"}
                    ]
                }
            ],
            "multi_region": true,
            "regions": regions,
            "status": "active"
        }))?;

        ctx.narrator.say("[AZURE] ✓ Cosmos DB created: consciousness-cosmos-db");
        ctx.narrator.say(format!("[AZURE]   - Multi-region: {} regions", regions.len()));
        Ok(result)
    }

    async fn create_storage_account(
        &self,
        ctx: &mut SimContext,
    ) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Creating Storage Account...");
        ctx.narrator.pause(0.5).await;

        let name = format!("consciousnessstore{}", ids::four_digits(ctx.ids.as_mut()));
        let result = StageResult::from_value(json!({
            "name": name,
            "sku": "Premium_ZRS",
            "kind": "BlockBlobStorage",
            "containers": ["consciousness-models", "training-data", "logs", "backups"],
            "blob_tier": "Hot",
            "replication": "Zone-redundant",
            "encryption": "Microsoft-managed keys",
            "status": "available"
        }))?;

        ctx.narrator.say(format!("[AZURE] ✓ Storage Account created: {}", name));
        Ok(result)
    }

    async fn create_app_insights(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Creating Application Insights...");
        ctx.narrator.pause(0.4).await;

        let result = StageResult::from_value(json!({
            "name": "consciousness-insights",
            "type": "web",
            "retention_days": 90,
            "features": [
                "Performance monitoring",
                "Usage analytics",
                "Availability monitoring",
                "Custom metrics",
                "Log Analytics integration"
            ],
            "alert_rules": [
                {"name": "High CPU Usage", "threshold": "80%"},
                {"name": "Memory Pressure", "threshold": "85%"},
                {"name": "Response Time", "threshold": "1s"}
            ],
            "status": "active"
        }))?;

        ctx.narrator.say("[AZURE] ✓ Application Insights created");
        Ok(result)
    }

    async fn deploy_containers(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Deploying Consciousness-AGI containers to AKS...");
        ctx.narrator.pause(1.5).await;

        let external_ip = ids::ipv4(ctx.ids.as_mut(), 20);
        let result = StageResult::from_value(json!({
            "namespace": "consciousness-prod",
            "deployments": [
                {
                    "name": "consciousness-core",
                    "replicas": 3,
                    "image": "consciousness-agi:latest",
                    "resources": {"cpu": "8 cores", "memory": "32Gi", "gpu": "1x NVIDIA A100"},
                    "ports": [8080, 8443],
                    "status": "running"
                },
                {
                    "name": "nexus-agi-engine",
                    "replicas": 5,
                    "image": "nexus-agi:latest",
                    "resources": {"cpu": "16 cores", "memory": "128Gi", "gpu": "2x NVIDIA A100"},
                    "ports": [9000, 9443],
                    "status": "running"
                },
                {
                    "name": "unified-interface",
                    "replicas": 3,
                    "image": "unified-agi:latest",
                    "resources": {"cpu": "4 cores", "memory": "16Gi"},
                    "ports": [80, 443],
                    "status": "running"
                }
            ],
            "services": [
                {
                    "name": "consciousness-service",
                    "type": "LoadBalancer",
                    "external_ip": external_ip,
                    "ports": [80, 443]
                }
            ],
            "ingress": {
                "enabled": true,
                "host": HOSTNAME,
                "tls": true,
                "cert_manager": "enabled"
            },
            "status": "deployed"
        }))?;

        ctx.narrator.say("[AZURE] ✓ Containers deployed successfully");
        ctx.narrator.say("[AZURE]   - Deployments: 3");
        ctx.narrator.say(format!("[AZURE]   - External IP: {}", external_ip));
        ctx.narrator.say(format!("[AZURE]   - Hostname: {}", HOSTNAME));
        Ok(result)
    }

    async fn setup_autoscaling(&self, ctx: &mut SimContext) -> Result<StageResult, ReportError> {
        ctx.narrator.say("\n[AZURE] Configuring auto-scaling...");
        ctx.narrator.pause(0.5).await;

        let result = StageResult::from_value(json!({
            "hpa_enabled": true,
            "policies": [
                {
                    "target": "consciousness-core",
                    "min_replicas": 3,
                    "max_replicas": 10,
                    "metrics": [
                        {"type": "cpu", "threshold": "70%"},
                        {"type": "memory", "threshold": "80%"},
                        {"type": "custom", "name": "requests_per_second", "threshold": 1000}
                    ]
                },
                {
                    "target": "nexus-agi-engine",
                    "min_replicas": 5,
                    "max_replicas": 20,
                    "metrics": [
                        {"type": "gpu", "threshold": "75%"},
                        {"type": "queue_depth", "threshold": 100}
                    ]
                }
            ],
            "cluster_autoscaler": {
                "enabled": true,
                "min_nodes": 3,
                "max_nodes": 50,
                "scale_down_delay": "10m"
            },
            "status": "active"
        }))?;

        ctx.narrator.say("[AZURE] ✓ Auto-scaling configured");
        Ok(result)
    }

    /// Create every resource, then summarize the deployment.
    pub async fn full_deployment(
        &self,
        ctx: &mut SimContext,
    ) -> Result<DeploymentOutcome, ReportError> {
        ctx.narrator.header("STARTING FULL AZURE CLOUD DEPLOYMENT");
        info!("Azure deployment started for {}", self.subscription_id);

        let mut aggregator = ctx.aggregator("azure", &AZURE_STAGES);
        aggregator.log(LogCategory::Deployment, "Starting Azure Cloud deployment");

        aggregator.record("resource_group", self.create_resource_group(ctx).await?)?;
        aggregator.record("aks_cluster", self.create_aks_cluster(ctx).await?)?;
        aggregator.record("ml_workspace", self.create_ml_workspace(ctx).await?)?;
        aggregator.record("cognitive_services", self.create_cognitive_services(ctx).await?)?;
        aggregator.record("cosmos_db", self.create_cosmos_db(ctx).await?)?;
        aggregator.record("storage_account", self.create_storage_account(ctx).await?)?;
        aggregator.record("app_insights", self.create_app_insights(ctx).await?)?;

        aggregator.record("container_deployment", self.deploy_containers(ctx).await?)?;
        aggregator.record("autoscaling", self.setup_autoscaling(ctx).await?)?;

        let deployment_time = aggregator.elapsed().as_secs_f64();
        let summary = StageResult::from_value(json!({
            "deployment_status": "completed",
            "subscription_id": self.subscription_id,
            "resource_group": self.resource_group,
            "location": self.location,
            "deployment_time": format!("{:.2} seconds", deployment_time),
            "resources_created": aggregator.stage_count(),
            "total_cost_estimate": "$5,000-$10,000 per month",
            "endpoints": {
                "consciousness_api": format!("https://{}", HOSTNAME),
                "agi_api": format!("https://{}/agi", HOSTNAME),
                "monitoring": format!("https://portal.azure.com/#resource{}", self.resource_group)
            },
            "health_status": "healthy",
            "availability": "99.99%",
            "timestamp": Utc::now().to_rfc3339()
        }))?;

        aggregator.log(
            LogCategory::Success,
            format!("Azure deployment complete: {} resources", aggregator.stage_count()),
        );
        aggregator.record("deployment_summary", summary.clone())?;
        let report = aggregator.finalize()?;

        self.print_summary(ctx, &summary);
        info!(
            "Azure deployment finished in {:.2}s",
            deployment_time
        );

        Ok(DeploymentOutcome { report, summary })
    }

    fn print_summary(&self, ctx: &SimContext, summary: &StageResult) {
        let field = |key: &str| summary.get_str(key).unwrap_or_default().to_string();

        ctx.narrator.header("AZURE DEPLOYMENT COMPLETED SUCCESSFULLY");
        ctx.narrator.say(format!(
            "\n[AZURE] Status: {}",
            field("deployment_status").to_uppercase()
        ));
        ctx.narrator.say(format!(
            "[AZURE] Resources Created: {}",
            summary.get_u64("resources_created").unwrap_or_default()
        ));
        ctx.narrator.say(format!("[AZURE] Deployment Time: {}", field("deployment_time")));
        ctx.narrator.say(format!(
            "[AZURE] Estimated Monthly Cost: {}",
            field("total_cost_estimate")
        ));
        ctx.narrator.say(format!("[AZURE] Consciousness API: https://{}", HOSTNAME));
        ctx.narrator.say(format!(
            "[AZURE] Health Status: {}",
            field("health_status").to_uppercase()
        ));
        ctx.narrator.say(format!("[AZURE] Availability: {}", field("availability")));
        ctx.narrator.say("\n[AZURE] ✨ CONSCIOUSNESS-AGI SYSTEM LIVE ON AZURE ✨");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_full_deployment_records_every_resource() {
        let mut ctx = SimContext::scripted(vec![424242, 7, 1234, 14, 201, 7]);
        let azure = AzureDeployment::new(&mut ctx);
        let outcome = azure.full_deployment(&mut ctx).await.unwrap();

        let names: Vec<_> = outcome.report.stages().names().collect();
        assert_eq!(&names[..9], &AZURE_STAGES[..]);
        assert_eq!(names[9], "deployment_summary");
        assert_eq!(outcome.summary.get_u64("resources_created"), Some(9));
        assert_eq!(
            outcome.summary.get_str("total_cost_estimate"),
            Some("$5,000-$10,000 per month")
        );
        assert_eq!(outcome.summary.get_str("availability"), Some("99.99%"));
    }

    #[tokio::test]
    async fn test_cosmetic_ids_come_from_the_id_source() {
        // subscription, run id, storage suffix, then three octets
        let mut ctx = SimContext::scripted(vec![424242, 7, 1234, 14, 201, 7]);
        let azure = AzureDeployment::new(&mut ctx);
        assert_eq!(azure.subscription_id(), "azure-sub-424242");

        let outcome = azure.full_deployment(&mut ctx).await.unwrap();
        let storage = outcome.report.stage("storage_account").unwrap();
        assert_eq!(storage.get_str("name"), Some("consciousnessstore1234"));

        let containers = outcome.report.stage("container_deployment").unwrap();
        assert_eq!(
            containers.get("services").unwrap()[0]["external_ip"],
            "20.14.201.7"
        );
    }

    #[tokio::test]
    async fn test_same_seed_same_report_ids() {
        use crate::sim::{Narrator, RandomIds};

        let mut first = SimContext::new(Narrator::silent(), Box::new(RandomIds::seeded(11)));
        let mut second = SimContext::new(Narrator::silent(), Box::new(RandomIds::seeded(11)));

        let a = AzureDeployment::new(&mut first);
        let b = AzureDeployment::new(&mut second);
        assert_eq!(a.subscription_id(), b.subscription_id());

        let a = a.full_deployment(&mut first).await.unwrap();
        let b = b.full_deployment(&mut second).await.unwrap();
        assert_eq!(a.report.metadata().run_id, b.report.metadata().run_id);
        assert_eq!(
            a.report.stage("storage_account"),
            b.report.stage("storage_account")
        );
    }
}
