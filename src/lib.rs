// src/lib.rs
// Public library surface for integration tests (and potential reuse).

pub mod analyzer;
pub mod api;
pub mod config;
pub mod engine;
pub mod intent;
pub mod lexicon;
pub mod metrics;
pub mod render;
pub mod rng;
pub mod safety;
pub mod session;
pub mod skills;
pub mod strategy;
pub mod text;

// ---- Re-exports for stable public API ----
pub use crate::analyzer::{AnalysisResult, MessageAnalyzer};
pub use crate::api::{create_router, router, AppState};
pub use crate::config::TriageConfig;
pub use crate::engine::{ConversationEngine, Reply};
pub use crate::intent::Intent;
pub use crate::lexicon::Lexicon;
pub use crate::rng::{RandomSource, SmallRngSource};
pub use crate::safety::SafetyClassifier;
pub use crate::session::{InMemorySessionStore, Role, SessionStats, SessionStore, Turn};
pub use crate::skills::CopingSkills;
pub use crate::strategy::{choose_strategy, StrategyTag};

/// Analyze one message with the built-in lexicon.
pub fn analyze_message(text: &str) -> AnalysisResult {
    MessageAnalyzer::new(Lexicon::builtin()).analyze(text)
}

/// Crisis check with the built-in lexicon.
pub fn is_crisis_message(text: &str) -> bool {
    SafetyClassifier::new(Lexicon::builtin()).is_crisis(text)
}
