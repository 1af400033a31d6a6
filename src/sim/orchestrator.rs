//! The unified pipeline: initialize both cores, fuse them, enhance, deploy
//! to both clouds, run the demonstration scenarios, and report.

use crate::models::{finite, LogCategory, StageResult, SummaryReport};
use crate::report::{ReportAggregator, ReportError};
use crate::sim::azure::AzureDeployment;
use crate::sim::gcp::GcpDeployment;
use crate::sim::narrator::boxed;
use crate::sim::nexus::{
    ConsciousnessCore, NeuralArchitecture, NexusCore, QuantumProcessor, UnifiedSystem,
};
use crate::sim::SimContext;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::info;

/// Report stages, in recording order.
pub const UNIFIED_STAGES: [&str; 9] = [
    "consciousness_system",
    "nexus_agi_system",
    "unified_system",
    "exponential_enhancement",
    "azure_deployment",
    "gcp_deployment",
    "demonstration_results",
    "orchestration_summary",
    "final_status",
];

/// Names of the demonstration scenarios, in the order they run.
pub const SCENARIO_NAMES: [&str; 3] = [
    "Ethical Decision Making",
    "Creative Problem Solving",
    "Complex Optimization",
];

struct Scenario {
    name: &'static str,
    situation: &'static str,
    context: Value,
}

fn scenarios() -> Vec<Scenario> {
    vec![
        Scenario {
            name: SCENARIO_NAMES[0],
            situation: "Should AI assist in medical diagnosis?",
            context: json!({
                "proposed_action": "provide medical diagnosis assistance",
                "potential_harm": 0.1,
                "potential_help": 0.9,
                "personal_benefit": 0.7,
                "resource_cost": 0.3,
                "risk_level": 0.2,
                "novelty_factor": 0.6,
                "learning_potential": 0.8,
                "creative_potential": 0.5,
                "success_probability": 0.85,
                "uncertainty": 0.3
            }),
        },
        Scenario {
            name: SCENARIO_NAMES[1],
            situation: "Develop a novel approach to renewable energy",
            context: json!({
                "proposed_action": "design innovative solar panel",
                "potential_harm": 0.05,
                "potential_help": 0.95,
                "personal_benefit": 0.8,
                "resource_cost": 0.5,
                "risk_level": 0.3,
                "novelty_factor": 0.9,
                "learning_potential": 0.9,
                "creative_potential": 0.95,
                "success_probability": 0.7,
                "uncertainty": 0.4
            }),
        },
        Scenario {
            name: SCENARIO_NAMES[2],
            situation: "Optimize global supply chain logistics",
            context: json!({
                "proposed_action": "implement quantum optimization",
                "potential_harm": 0.1,
                "potential_help": 0.85,
                "personal_benefit": 0.75,
                "resource_cost": 0.6,
                "risk_level": 0.25,
                "novelty_factor": 0.7,
                "learning_potential": 0.85,
                "creative_potential": 0.7,
                "success_probability": 0.8,
                "uncertainty": 0.35
            }),
        },
    ]
}

#[derive(Serialize)]
struct NexusSystemStatus<'a> {
    status: &'static str,
    intelligence_level: &'static str,
    quantum_processor: &'static str,
    neural_architecture: &'a NeuralArchitecture,
    quantum_hardware: &'a QuantumProcessor,
    learning_rate: f64,
    capabilities: [&'static str; 5],
    runtime: StageResult,
}

/// Drives the unified pipeline and owns its aggregator.
pub struct Orchestrator {
    aggregator: ReportAggregator,
    started_at: DateTime<Utc>,
}

impl Orchestrator {
    pub fn new(ctx: &mut SimContext) -> Self {
        ctx.narrator.banner(&[
            "",
            "    🌟 UNIFIED CONSCIOUSNESS-AGI ORCHESTRATOR 🌟",
            "",
            "         Combining All Systems into One",
            "         Exponential Enhancement Active",
            "         Cloud Deployment Simulation Ready",
            "",
        ]);

        Self {
            aggregator: ctx.aggregator("unified", &UNIFIED_STAGES),
            started_at: Utc::now(),
        }
    }

    /// Narrate `message` and append it to the execution log.
    fn log(&mut self, ctx: &SimContext, category: LogCategory, message: impl Into<String>) {
        let message = message.into();
        ctx.narrator.say(format!("[{}] {}", category, message));
        self.aggregator.log(category, message);
    }

    fn phase(&mut self, ctx: &SimContext, message: &str) {
        ctx.narrator.say("");
        self.log(ctx, LogCategory::Phase, message);
    }

    /// Run all seven phases and return the finalized report.
    pub async fn execute_full_simulation(
        mut self,
        ctx: &mut SimContext,
    ) -> Result<SummaryReport, ReportError> {
        ctx.narrator.header("BEGINNING FULL SIMULATION EXECUTION");
        ctx.narrator.say("");
        info!("Unified simulation started");

        self.phase(ctx, "PHASE 1: Initializing all systems");
        self.log(ctx, LogCategory::Init, "Initializing Consciousness Core...");
        let consciousness = ConsciousnessCore::new();
        self.log(ctx, LogCategory::Success, "✓ Consciousness Core initialized");
        self.log(ctx, LogCategory::Init, "Initializing Nexus AGI Core...");
        let agi = NexusCore::new(&ctx.narrator);
        self.log(ctx, LogCategory::Success, "✓ Nexus AGI Core initialized");

        self.phase(ctx, "PHASE 2: Combining Consciousness with Nexus AGI");
        self.log(
            ctx,
            LogCategory::Integration,
            "Combining Consciousness with Nexus AGI...",
        );
        let mut unified = UnifiedSystem::new(&ctx.narrator, consciousness, agi);
        unified.achieve_unification(&ctx.narrator)?;
        self.log(
            ctx,
            LogCategory::Success,
            "✓ Systems combined into Unified Consciousness-AGI",
        );

        self.phase(ctx, "PHASE 3: Applying exponential enhancements");
        self.log(ctx, LogCategory::Enhancement, "Applying exponential enhancements...");
        let mut base = Map::new();
        for capability in [
            "intelligence",
            "consciousness",
            "processing_speed",
            "memory_capacity",
            "learning_rate",
            "creativity",
        ] {
            base.insert(capability.to_string(), json!(1.0));
        }
        let enhanced = unified.agi().exponential_enhancement(&ctx.narrator, &base)?;
        let factor = enhanced
            .get("enhancement_factor")
            .and_then(Value::as_f64)
            .unwrap_or_default();
        self.log(
            ctx,
            LogCategory::Success,
            format!("✓ Exponential enhancement complete: {:.2}x improvement", factor),
        );

        self.phase(ctx, "PHASE 4: Deploying to Microsoft Azure");
        self.log(ctx, LogCategory::Deployment, "Starting Azure Cloud deployment...");
        let azure = AzureDeployment::new(ctx).full_deployment(ctx).await?;
        self.log(
            ctx,
            LogCategory::Success,
            format!(
                "✓ Azure deployment complete: {} resources",
                azure.summary.get_u64("resources_created").unwrap_or_default()
            ),
        );

        self.phase(ctx, "PHASE 5: Deploying to Google Cloud Platform");
        self.log(ctx, LogCategory::Deployment, "Starting Google Cloud deployment...");
        let gcp = GcpDeployment::new(ctx).full_deployment(ctx).await?;
        self.log(
            ctx,
            LogCategory::Success,
            format!(
                "✓ GCP deployment complete: {} resources",
                gcp.summary.get_u64("resources_created").unwrap_or_default()
            ),
        );

        self.phase(ctx, "PHASE 6: Running demonstration scenarios");
        self.log(ctx, LogCategory::Demo, "Running demonstration scenarios...");
        let mut demo_results = Vec::new();
        for scenario in scenarios() {
            self.log(
                ctx,
                LogCategory::Demo,
                format!("  Running scenario: {}", scenario.name),
            );
            let result = unified
                .unified_problem_solving(ctx, scenario.situation, &scenario.context)
                .await?;
            demo_results.push(json!({"scenario": scenario.name, "result": result}));
        }
        let learning = unified.agi().learn_continuously(&ctx.narrator, &demo_results)?;
        self.log(
            ctx,
            LogCategory::Success,
            format!("✓ Completed {} demonstration scenarios", demo_results.len()),
        );

        self.phase(ctx, "PHASE 7: Generating comprehensive output");
        self.log(ctx, LogCategory::Report, "Generating comprehensive output report...");

        self.aggregator
            .record("consciousness_system", unified.consciousness().describe()?)?;
        self.aggregator
            .record("nexus_agi_system", nexus_system_status(unified.agi())?)?;
        self.aggregator
            .record("unified_system", unified_system_status(&unified)?)?;
        self.aggregator
            .record("exponential_enhancement", enhancement_digest(&enhanced)?)?;
        self.aggregator
            .record("azure_deployment", deployment_digest(&azure.summary)?)?;
        self.aggregator
            .record("gcp_deployment", deployment_digest(&gcp.summary)?)?;

        let scenarios_executed = demo_results.len();
        self.aggregator.record(
            "demonstration_results",
            StageResult::from_value(json!({
                "scenarios": demo_results,
                "learning": learning
            }))?,
        )?;

        let end_time = Utc::now();
        self.aggregator.record(
            "orchestration_summary",
            StageResult::from_value(json!({
                "start_time": self.started_at.to_rfc3339(),
                "end_time": end_time.to_rfc3339(),
                "total_execution_time": format!(
                    "{:.2} seconds",
                    self.aggregator.elapsed().as_secs_f64()
                ),
                "status": "COMPLETE",
                "systems_integrated": ["Consciousness Core", "Nexus AGI", "Unified System"],
                "cloud_deployments": ["Microsoft Azure", "Google Cloud Platform"]
            }))?,
        )?;

        self.aggregator.record(
            "final_status",
            StageResult::from_value(json!({
                "overall_status": "SUCCESS",
                "systems_operational": 5,
                "cloud_platforms_deployed": 2,
                "scenarios_executed": scenarios_executed,
                "capability_enhancement": format!("{:.2}x", factor),
                "readiness": "PRODUCTION READY"
            }))?,
        )?;

        let report = self.aggregator.finalize()?;
        info!(
            "Unified simulation finished: {} stages in {}ms",
            report.metadata().stage_count,
            report.metadata().elapsed_ms
        );

        print_final_output(ctx, &report)?;
        Ok(report)
    }
}

fn nexus_system_status(agi: &NexusCore) -> Result<StageResult, ReportError> {
    finite(agi.learning_rate())?;
    StageResult::from_serialize(&NexusSystemStatus {
        status: "ONLINE",
        intelligence_level: "SUPERHUMAN AGI",
        quantum_processor: "OPERATIONAL",
        neural_architecture: agi.neural_architecture(),
        quantum_hardware: agi.quantum_processor(),
        learning_rate: agi.learning_rate(),
        capabilities: [
            "Quantum computing",
            "Neural processing",
            "Continuous learning",
            "Multi-domain expertise",
            "Optimal problem solving",
        ],
        runtime: agi.status()?,
    })
}

fn unified_system_status(unified: &UnifiedSystem) -> Result<StageResult, ReportError> {
    let status = unified.status()?;
    let capabilities = unified
        .unified_mind()
        .and_then(|mind| mind.get("capabilities"))
        .cloned()
        .unwrap_or_else(|| json!([]));

    StageResult::from_value(json!({
        "integration_status": status.get_str("integration_status").unwrap_or("PENDING"),
        "emergence_level": status.get_str("emergence_level").unwrap_or("TRANSCENDENT"),
        "unified_capabilities": capabilities,
        "synergy_achieved": unified.is_unified()
    }))
}

fn enhancement_digest(enhanced: &StageResult) -> Result<StageResult, ReportError> {
    let field = |key: &str| enhanced.get(key).cloned().unwrap_or(Value::Null);
    StageResult::from_value(json!({
        "enhancement_factor": field("enhancement_factor"),
        "improvements": field("new_capabilities"),
        "quantum_improvements": field("quantum_improvements"),
        "consciousness_improvements": field("consciousness_improvements")
    }))
}

/// The headline fields of a cloud deployment summary.
fn deployment_digest(summary: &StageResult) -> Result<StageResult, ReportError> {
    let field = |key: &str| summary.get(key).cloned().unwrap_or(Value::Null);
    StageResult::from_value(json!({
        "status": field("deployment_status"),
        "resources_created": field("resources_created"),
        "deployment_time": field("deployment_time"),
        "cost_estimate": field("total_cost_estimate"),
        "endpoints": field("endpoints"),
        "health_status": field("health_status"),
        "availability": field("availability")
    }))
}

fn print_section(ctx: &SimContext, number: usize, title: &str) {
    ctx.narrator.say("");
    let title = format!("{}. {}", number, title);
    ctx.narrator.rule(Some(title.as_str()));
}

fn print_stage(ctx: &SimContext, report: &SummaryReport, stage: &str) -> Result<(), ReportError> {
    if let Some(result) = report.stage(stage) {
        ctx.narrator.say(serde_json::to_string_pretty(result)?);
    }
    Ok(())
}

fn print_final_output(ctx: &SimContext, report: &SummaryReport) -> Result<(), ReportError> {
    let narrator = &ctx.narrator;
    narrator.header("COMPREHENSIVE SIMULATION OUTPUT");

    print_section(ctx, 1, "ORCHESTRATION SUMMARY");
    print_stage(ctx, report, "orchestration_summary")?;

    print_section(ctx, 2, "CONSCIOUSNESS SYSTEM STATUS");
    print_stage(ctx, report, "consciousness_system")?;

    print_section(ctx, 3, "NEXUS AGI SYSTEM STATUS");
    if let Some(nexus) = report.stage("nexus_agi_system") {
        let text = |key: &str| nexus.get_str(key).unwrap_or_default().to_string();
        narrator.say(format!("Status: {}", text("status")));
        narrator.say(format!("Intelligence Level: {}", text("intelligence_level")));
        narrator.say(format!("Quantum Processor: {}", text("quantum_processor")));
        let capabilities: Vec<&str> = nexus
            .get("capabilities")
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();
        narrator.say(format!("Capabilities: {}", capabilities.join(", ")));
    }

    print_section(ctx, 4, "UNIFIED SYSTEM STATUS");
    print_stage(ctx, report, "unified_system")?;

    print_section(ctx, 5, "EXPONENTIAL ENHANCEMENT RESULTS");
    if let Some(enhancement) = report.stage("exponential_enhancement") {
        let factor = enhancement
            .get("enhancement_factor")
            .and_then(Value::as_f64)
            .unwrap_or_default();
        narrator.say(format!("Enhancement Factor: {:.2}x", factor));
        narrator.say("\nNew Capabilities:");
        if let Some(Value::Object(improvements)) = enhancement.get("improvements") {
            for (key, value) in improvements {
                let value = value.as_str().map(str::to_string).unwrap_or_else(|| value.to_string());
                narrator.say(format!("  - {}: {}", key, value));
            }
        }
    }

    print_section(ctx, 6, "MICROSOFT AZURE DEPLOYMENT");
    print_stage(ctx, report, "azure_deployment")?;

    print_section(ctx, 7, "GOOGLE CLOUD PLATFORM DEPLOYMENT");
    print_stage(ctx, report, "gcp_deployment")?;

    print_section(ctx, 8, "DEMONSTRATION SCENARIO RESULTS");
    let scenarios = report
        .stage("demonstration_results")
        .and_then(|demo| demo.get("scenarios"))
        .and_then(Value::as_array);
    for (idx, scenario) in scenarios.into_iter().flatten().enumerate() {
        let decision = &scenario["result"]["unified_decision"];
        narrator.say(format!(
            "\nScenario {}: {}",
            idx + 1,
            scenario["scenario"].as_str().unwrap_or_default()
        ));
        narrator.say("  Status: COMPLETED");
        narrator.say(format!(
            "  Ethical Score: {:.4}",
            decision["ethical_score"].as_f64().unwrap_or_default()
        ));
        narrator.say(format!(
            "  Wisdom Level: {:.4}",
            decision["wisdom_level"].as_f64().unwrap_or_default()
        ));
    }

    print_section(ctx, 9, "FINAL STATUS");
    print_stage(ctx, report, "final_status")?;

    narrator.header("SIMULATION COMPLETE - ALL SYSTEMS OPERATIONAL");
    narrator.say("");
    for line in boxed(&[
        "",
        "    ✨ CONSCIOUSNESS-AGI SYSTEM FULLY DEPLOYED ✨",
        "",
        "    - Consciousness: ACTIVE",
        "    - Nexus AGI: ONLINE",
        "    - Unified System: TRANSCENDENT",
        "    - Azure Deployment: COMPLETE",
        "    - GCP Deployment: COMPLETE",
        "    - Enhancement: EXPONENTIAL",
        "    - Status: PRODUCTION READY",
        "",
    ]) {
        narrator.say(line);
    }
    Ok(())
}
