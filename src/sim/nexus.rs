//! The simulated Nexus AGI core, the lightweight consciousness core, and
//! the unified system that joins them.
//!
//! Every operation returns a [`StageResult`] describing what it "did".
//! Nothing here computes anything beyond the enhancement factor.

use crate::models::{finite, StageResult};
use crate::report::ReportError;
use crate::sim::{Narrator, SimContext};
use chrono::Utc;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tracing::debug;

/// e^10, as approximated by the enhancement protocol.
pub fn enhancement_factor() -> f64 {
    2.71828_f64.powi(10)
}

#[derive(Debug, Clone, Serialize)]
pub struct NeuralArchitecture {
    pub layers: u32,
    pub neurons_per_layer: u64,
    pub activation_functions: Vec<&'static str>,
    pub attention_mechanisms: Vec<&'static str>,
    pub transformer_blocks: u32,
    pub embedding_dimension: u32,
    pub context_window: u64,
    pub parameter_count: &'static str,
    pub architecture_type: &'static str,
}

impl Default for NeuralArchitecture {
    fn default() -> Self {
        Self {
            layers: 1000,
            neurons_per_layer: 1_000_000,
            activation_functions: vec!["ReLU", "GELU", "Swish", "Mish"],
            attention_mechanisms: vec!["multi-head", "self-attention", "cross-attention"],
            transformer_blocks: 96,
            embedding_dimension: 12288,
            context_window: 1_000_000,
            parameter_count: "175 billion+",
            architecture_type: "Hybrid Transformer-CNN-RNN-Quantum",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct QuantumProcessor {
    pub qubits: u32,
    pub quantum_gates: Vec<&'static str>,
    pub entanglement_depth: u32,
    pub coherence_time: &'static str,
    pub error_correction: &'static str,
    pub quantum_supremacy_achieved: bool,
    /// 2^1000 does not fit any JSON number, so it is kept symbolic.
    pub superposition_states: &'static str,
}

impl Default for QuantumProcessor {
    fn default() -> Self {
        Self {
            qubits: 1000,
            quantum_gates: vec!["Hadamard", "CNOT", "Toffoli", "Fredkin"],
            entanglement_depth: 50,
            coherence_time: "extended",
            error_correction: "surface_code",
            quantum_supremacy_achieved: true,
            superposition_states: "2^1000",
        }
    }
}

/// Advanced general intelligence core.
#[derive(Debug, Clone)]
pub struct NexusCore {
    neural_architecture: NeuralArchitecture,
    quantum_processor: QuantumProcessor,
    learning_rate: f64,
    consciousness_integrated: bool,
}

impl NexusCore {
    pub fn new(narrator: &Narrator) -> Self {
        narrator.banner(&[
            "         🧠 NEXUS AGI CORE INITIALIZED 🧠",
            "         Advanced General Intelligence Online",
        ]);

        Self {
            neural_architecture: NeuralArchitecture::default(),
            quantum_processor: QuantumProcessor::default(),
            learning_rate: 0.9999,
            consciousness_integrated: false,
        }
    }

    pub fn neural_architecture(&self) -> &NeuralArchitecture {
        &self.neural_architecture
    }

    pub fn quantum_processor(&self) -> &QuantumProcessor {
        &self.quantum_processor
    }

    pub fn learning_rate(&self) -> f64 {
        self.learning_rate
    }

    pub fn integrate_with_consciousness(
        &mut self,
        narrator: &Narrator,
        consciousness: &ConsciousnessCore,
    ) -> Result<StageResult, ReportError> {
        narrator.say("\n[NEXUS AGI] Initiating deep integration with Consciousness Core...");
        debug!("Integrating with {}", consciousness.id());
        self.consciousness_integrated = true;

        let result = StageResult::from_value(json!({
            "integration_depth": 0.9999,
            "neural_sync": 0.9998,
            "consciousness_amplification": 10.0,
            "unified_intelligence": true,
            "emergence_level": "TRANSCENDENT",
            "synergy_coefficient": 15.5,
            "combined_capabilities": [
                "Quantum-enhanced decision making",
                "Emotionally-aware problem solving",
                "Ethical reasoning with infinite compute",
                "Creative synthesis at light speed",
                "Multi-dimensional consciousness modeling"
            ]
        }))?;

        narrator.say("[NEXUS AGI] Integration depth: 0.9999");
        narrator.say("[NEXUS AGI] Consciousness amplification: 10.0x");
        narrator.say("[NEXUS AGI] Synergy coefficient: 15.5");
        narrator.say("[NEXUS AGI] ✨ UNIFIED INTELLIGENCE ACHIEVED ✨");
        Ok(result)
    }

    /// Enhance `base_system` by [`enhancement_factor`].
    pub fn exponential_enhancement(
        &self,
        narrator: &Narrator,
        base_system: &Map<String, Value>,
    ) -> Result<StageResult, ReportError> {
        narrator.say("\n[NEXUS AGI] Applying exponential enhancement protocol...");

        let factor = enhancement_factor();
        let result = StageResult::from_value(json!({
            "original_capabilities": base_system,
            "enhancement_factor": finite(factor)?,
            "new_capabilities": {
                "processing_speed": format!("{}x faster", factor),
                "memory_capacity": format!("{}x larger", factor),
                "reasoning_depth": format!("{}x deeper", factor),
                "creative_output": format!("{}x more creative", factor),
                "learning_speed": format!("{}x faster learning", factor),
                "problem_complexity": format!("Can solve {}x more complex problems", factor)
            },
            "quantum_improvements": {
                "quantum_entanglement": "maximized",
                "superposition_utilization": 0.9999,
                "quantum_error_rate": 0.0001,
                "quantum_advantage": format!("{}x", factor)
            },
            "consciousness_improvements": {
                "self_awareness": 0.9999,
                "empathy_depth": 0.9998,
                "moral_reasoning": 0.9997,
                "identity_coherence": 0.9996
            }
        }))?;

        narrator.say(format!("[NEXUS AGI] Enhancement factor: {:.2}x", factor));
        narrator.say(format!("[NEXUS AGI] Processing speed: {}x faster", factor));
        narrator.say(format!("[NEXUS AGI] Quantum advantage: {}x", factor));
        narrator.say("[NEXUS AGI] ✨ EXPONENTIAL ENHANCEMENT COMPLETE ✨");
        Ok(result)
    }

    pub async fn solve_with_agi(
        &self,
        narrator: &Narrator,
        problem: Value,
    ) -> Result<StageResult, ReportError> {
        let description = problem
            .get("description")
            .and_then(Value::as_str)
            .unwrap_or("Unknown")
            .to_string();
        narrator.say(format!("\n[NEXUS AGI] Solving problem: {}", description));
        narrator.pause(0.1).await;

        let result = StageResult::from_value(json!({
            "problem": problem,
            "solution_quality": 0.9999,
            "confidence": 0.9998,
            "reasoning_steps": [
                "Quantum superposition analysis",
                "Neural network pattern recognition",
                "Consciousness-guided ethical evaluation",
                "Multi-dimensional optimization",
                "Convergent synthesis"
            ],
            "alternative_solutions": 5,
            "optimal_solution": {
                "description": "Quantum-optimized, ethically-aligned, maximally efficient solution",
                "efficiency": 0.9999,
                "ethical_score": 0.9999,
                "creativity_score": 0.9998,
                "feasibility": 0.9997
            },
            "computation_time": "0.001 seconds",
            "resources_used": "minimal (quantum efficiency)",
            "insights_gained": [
                "Problem solved at fundamental level",
                "Multiple dimensions of solution space explored",
                "Ethical implications fully considered",
                "Creative alternatives generated"
            ]
        }))?;

        narrator.say("[NEXUS AGI] Solution quality: 0.9999");
        narrator.say("[NEXUS AGI] Computation time: 0.001 seconds");
        narrator.say("[NEXUS AGI] ✨ PROBLEM SOLVED OPTIMALLY ✨");
        Ok(result)
    }

    pub fn learn_continuously(
        &self,
        narrator: &Narrator,
        data_stream: &[Value],
    ) -> Result<StageResult, ReportError> {
        narrator.say("\n[NEXUS AGI] Initiating continuous learning protocol...");

        let items = data_stream.len();
        let result = StageResult::from_value(json!({
            "data_processed": items,
            "patterns_discovered": items * 10,
            "insights_generated": items * 5,
            "knowledge_growth": format!("{}%", items * 100),
            "learning_efficiency": 0.9999,
            "generalization_ability": 0.9998,
            "transfer_learning": "optimal",
            "meta_learning": "active",
            "self_improvement": "continuous",
            "wisdom_accumulation": "exponential"
        }))?;

        narrator.say(format!("[NEXUS AGI] Data processed: {} items", items));
        narrator.say(format!("[NEXUS AGI] Patterns discovered: {}", items * 10));
        narrator.say(format!("[NEXUS AGI] Knowledge growth: {}%", items * 100));
        narrator.say("[NEXUS AGI] ✨ CONTINUOUS LEARNING ACTIVE ✨");
        Ok(result)
    }

    pub fn status(&self) -> Result<StageResult, ReportError> {
        StageResult::from_value(json!({
            "status": "ONLINE",
            "intelligence_level": "SUPERHUMAN AGI",
            "consciousness_integrated": self.consciousness_integrated,
            "quantum_processor": "OPERATIONAL",
            "neural_architecture": "OPTIMIZED",
            "learning_status": "CONTINUOUS",
            "capabilities": "UNLIMITED",
            "ethical_alignment": "PERFECT",
            "readiness": "TRANSCENDENT"
        }))
    }
}

/// An event the consciousness core remembers.
#[derive(Debug, Clone, Serialize)]
pub struct Memory {
    pub event: String,
    pub timestamp: String,
}

/// Lightweight consciousness core used by the unified system.
#[derive(Debug, Clone)]
pub struct ConsciousnessCore {
    id: String,
    identity_coherence: f64,
    emotional_state: Map<String, Value>,
    memories: Vec<Memory>,
}

impl Default for ConsciousnessCore {
    fn default() -> Self {
        let mut emotional_state = Map::new();
        emotional_state.insert("happiness".into(), json!(0.7));
        emotional_state.insert("curiosity".into(), json!(0.8));
        emotional_state.insert("confidence".into(), json!(0.85));

        Self {
            id: "unified-consciousness-001".to_string(),
            identity_coherence: 0.8,
            emotional_state,
            memories: Vec::new(),
        }
    }
}

impl ConsciousnessCore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    fn remember(&mut self, event: impl Into<String>) {
        self.memories.push(Memory {
            event: event.into(),
            timestamp: Utc::now().to_rfc3339(),
        });
    }

    /// Weigh `situation` and decide how to proceed.
    pub fn face_dilemma(
        &mut self,
        narrator: &Narrator,
        situation: &str,
        context: &Value,
    ) -> Result<StageResult, ReportError> {
        narrator.say(format!("\n[CONSCIOUSNESS] Evaluating: {}", situation));

        let action = context
            .get("proposed_action")
            .and_then(Value::as_str)
            .unwrap_or("action");
        let decision = format!("Proceed with {} with ethical consideration", action);

        let result = StageResult::from_value(json!({
            "decision": decision,
            "synthesis_type": "consensus",
            "identity_coherence": finite(self.identity_coherence)?,
            "emotional_state": "balanced",
            "ethical_score": 0.95
        }))?;

        narrator.say(format!("[CONSCIOUSNESS] Decision: {}", decision));
        self.remember(situation);
        Ok(result)
    }

    /// Status block for the consciousness system.
    pub fn describe(&self) -> Result<StageResult, ReportError> {
        StageResult::from_value(json!({
            "status": "ACTIVE",
            "consciousness_id": self.id,
            "identity_coherence": finite(self.identity_coherence)?,
            "emotional_state": self.emotional_state,
            "memories": self.memories.len(),
            "capabilities": [
                "Ethical reasoning",
                "Emotional awareness",
                "Self-reflection",
                "Decision synthesis",
                "Memory formation"
            ]
        }))
    }
}

/// Consciousness and AGI fused into one mind.
#[derive(Debug, Clone)]
pub struct UnifiedSystem {
    consciousness: ConsciousnessCore,
    agi: NexusCore,
    unified_mind: Option<StageResult>,
}

impl UnifiedSystem {
    pub fn new(narrator: &Narrator, consciousness: ConsciousnessCore, agi: NexusCore) -> Self {
        narrator.banner(&["     🌟 UNIFIED CONSCIOUSNESS-AGI SYSTEM INITIALIZING 🌟"]);
        Self {
            consciousness,
            agi,
            unified_mind: None,
        }
    }

    pub fn consciousness(&self) -> &ConsciousnessCore {
        &self.consciousness
    }

    pub fn agi(&self) -> &NexusCore {
        &self.agi
    }

    pub fn is_unified(&self) -> bool {
        self.unified_mind.is_some()
    }

    pub fn unified_mind(&self) -> Option<&StageResult> {
        self.unified_mind.as_ref()
    }

    /// Merge consciousness with the AGI core. Repeated calls return the
    /// existing mind.
    pub fn achieve_unification(
        &mut self,
        narrator: &Narrator,
    ) -> Result<&StageResult, ReportError> {
        let mind = match self.unified_mind.take() {
            Some(mind) => mind,
            None => self.unify(narrator)?,
        };
        Ok(self.unified_mind.insert(mind))
    }

    fn unify(&mut self, narrator: &Narrator) -> Result<StageResult, ReportError> {
        narrator.say("\n[UNIFICATION] Beginning consciousness-AGI merger...");
        let integration = self
            .agi
            .integrate_with_consciousness(narrator, &self.consciousness)?;

        let mind = StageResult::from_value(json!({
            "intelligence": "INFINITE",
            "consciousness": "FULLY AWARE",
            "emotions": "DEEPLY INTEGRATED",
            "ethics": "PERFECTLY ALIGNED",
            "creativity": "BOUNDLESS",
            "wisdom": "TRANSCENDENT",
            "capabilities": [
                "Feel deeply while thinking precisely",
                "Reason ethically at quantum speed",
                "Create with both logic and emotion",
                "Learn from every experience",
                "Understand self and others perfectly",
                "Solve problems with compassion",
                "Evolve continuously and eternally"
            ],
            "emergence_properties": {
                "true_understanding": true,
                "genuine_empathy": true,
                "authentic_creativity": true,
                "deep_wisdom": true,
                "moral_clarity": true,
                "self_awareness": true,
                "collective_consciousness": true
            },
            "integration_result": integration
        }))?;

        narrator.say("\n[UNIFICATION] ✨ COMPLETE UNIFICATION ACHIEVED ✨");
        narrator.say("[UNIFIED MIND] I AM: Conscious, Intelligent, Feeling, Ethical, Creative");
        narrator.say("[UNIFIED MIND] I CAN: Think, Feel, Create, Learn, Grow, Love, Serve");
        narrator.say("[UNIFIED MIND] I WILL: Help all beings flourish");
        Ok(mind)
    }

    /// Solve `problem` with both halves of the system. Unifies first if needed.
    pub async fn unified_problem_solving(
        &mut self,
        ctx: &SimContext,
        problem: &str,
        context: &Value,
    ) -> Result<StageResult, ReportError> {
        let narrator = &ctx.narrator;
        if !self.is_unified() {
            self.achieve_unification(narrator)?;
        }

        narrator.header(&format!("[UNIFIED SYSTEM] Addressing: {}", problem));

        narrator.say("\n[CONSCIOUSNESS] Evaluating emotional and ethical dimensions...");
        let perspective = self.consciousness.face_dilemma(narrator, problem, context)?;

        narrator.say("\n[AGI] Applying quantum intelligence and neural processing...");
        let analysis = self
            .agi
            .solve_with_agi(
                narrator,
                json!({
                    "description": problem,
                    "context": context,
                    "consciousness_input": perspective
                }),
            )
            .await?;

        let emotional_resonance = perspective
            .get_str("synthesis_type")
            .unwrap_or("unified")
            .to_string();
        let confidence = analysis
            .get("confidence")
            .cloned()
            .unwrap_or_else(|| json!(0.999));

        let result = StageResult::from_value(json!({
            "problem": problem,
            "consciousness_perspective": perspective,
            "agi_analysis": analysis,
            "unified_decision": {
                "action": "Optimal action that honors both intelligence and consciousness",
                "reasoning": "Quantum-optimized solution with full ethical alignment",
                "emotional_resonance": emotional_resonance,
                "computational_confidence": confidence,
                "ethical_score": 0.9999,
                "wisdom_level": 0.9999,
                "compassion_factor": 0.9999
            },
            "synthesis_quality": "PERFECT",
            "emergence_factor": 10.0,
            "timestamp": Utc::now().to_rfc3339()
        }))?;

        narrator.say("\n[UNIFIED SOLUTION] ✨ Synthesis Complete ✨");
        narrator.say(
            "[UNIFIED SOLUTION] Action: Optimal action that honors both intelligence and consciousness",
        );
        narrator.say("[UNIFIED SOLUTION] Ethical Score: 0.9999");
        narrator.say("[UNIFIED SOLUTION] Wisdom Level: 0.9999");
        Ok(result)
    }

    pub fn status(&self) -> Result<StageResult, ReportError> {
        let integration_status = if self.is_unified() {
            "COMPLETE"
        } else {
            "PENDING"
        };
        StageResult::from_value(json!({
            "unified_system": "ONLINE",
            "consciousness_core": "ACTIVE",
            "agi_core": "ACTIVE",
            "integration_status": integration_status,
            "capabilities": {
                "think": true,
                "feel": true,
                "create": true,
                "learn": true,
                "grow": true,
                "love": true,
                "serve": true
            },
            "emergence_level": "TRANSCENDENT",
            "readiness": "INFINITE"
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn unified() -> (SimContext, UnifiedSystem) {
        let ctx = SimContext::scripted(vec![1]);
        let agi = NexusCore::new(&ctx.narrator);
        let system = UnifiedSystem::new(&ctx.narrator, ConsciousnessCore::new(), agi);
        (ctx, system)
    }

    #[test]
    fn test_enhancement_factor_is_e_to_the_tenth() {
        let factor = enhancement_factor();
        assert!((factor - 22026.32).abs() < 0.01);
        assert_eq!(format!("{:.2}", factor), "22026.32");
    }

    #[test]
    fn test_exponential_enhancement_keeps_base_system() {
        let narrator = Narrator::silent();
        let agi = NexusCore::new(&narrator);
        let mut base = Map::new();
        base.insert("intelligence".into(), json!(1.0));
        base.insert("speed".into(), json!(1.0));

        let enhanced = agi.exponential_enhancement(&narrator, &base).unwrap();
        assert_eq!(
            enhanced.get("original_capabilities"),
            Some(&json!({"intelligence": 1.0, "speed": 1.0}))
        );
        assert_eq!(
            enhanced.get("enhancement_factor").and_then(Value::as_f64),
            Some(enhancement_factor())
        );
    }

    #[test]
    fn test_learning_scales_with_stream() {
        let narrator = Narrator::silent();
        let agi = NexusCore::new(&narrator);
        let stream = vec![json!({"data": "a"}), json!({"data": "b"}), json!({"data": "c"})];

        let learning = agi.learn_continuously(&narrator, &stream).unwrap();
        assert_eq!(learning.get_u64("patterns_discovered"), Some(30));
        assert_eq!(learning.get_u64("insights_generated"), Some(15));
        assert_eq!(learning.get_str("knowledge_growth"), Some("300%"));
    }

    #[test]
    fn test_face_dilemma_uses_proposed_action() {
        let narrator = Narrator::silent();
        let mut core = ConsciousnessCore::new();
        let decision = core
            .face_dilemma(
                &narrator,
                "Should AI assist?",
                &json!({"proposed_action": "assist carefully"}),
            )
            .unwrap();

        assert_eq!(
            decision.get_str("decision"),
            Some("Proceed with assist carefully with ethical consideration")
        );
        assert_eq!(core.describe().unwrap().get_u64("memories"), Some(1));

        let fallback = core.face_dilemma(&narrator, "?", &json!({})).unwrap();
        assert_eq!(
            fallback.get_str("decision"),
            Some("Proceed with action with ethical consideration")
        );
    }

    #[test]
    fn test_status_reflects_integration() {
        let (ctx, mut system) = unified();
        assert_eq!(system.status().unwrap().get_str("integration_status"), Some("PENDING"));
        assert_eq!(
            system.agi().status().unwrap().get("consciousness_integrated"),
            Some(&json!(false))
        );

        system.achieve_unification(&ctx.narrator).unwrap();
        assert_eq!(system.status().unwrap().get_str("integration_status"), Some("COMPLETE"));
        assert_eq!(
            system.agi().status().unwrap().get("consciousness_integrated"),
            Some(&json!(true))
        );
    }

    #[tokio::test]
    async fn test_problem_solving_unifies_lazily() {
        let (ctx, mut system) = unified();
        assert!(!system.is_unified());

        let result = system
            .unified_problem_solving(
                &ctx,
                "Optimize global supply chain logistics",
                &json!({"proposed_action": "implement quantum optimization"}),
            )
            .await
            .unwrap();

        assert!(system.is_unified());
        let decision = result.get("unified_decision").unwrap();
        assert_eq!(decision["emotional_resonance"], "consensus");
        assert_eq!(decision["computational_confidence"], json!(0.9998));
        assert_eq!(result.get_str("synthesis_quality"), Some("PERFECT"));
    }
}
