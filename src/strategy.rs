//! Strategy selection for the therapeutic branch.

use crate::analyzer::AnalysisResult;
use crate::rng::RandomSource;
use serde::{Deserialize, Serialize};

/// Urgency at or above this always gets coping support.
pub const URGENCY_SUPPORT_THRESHOLD: u8 = 7;
/// Below this many words the message is too short to reflect back.
pub const SHORT_MESSAGE_WORDS: usize = 6;
/// Above this many words there is enough content to summarize.
pub const LONG_MESSAGE_WORDS: usize = 12;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyTag {
    ValidateExplore,
    ReflectClarify,
    SupportCoping,
    Default,
}

impl StrategyTag {
    pub fn as_str(self) -> &'static str {
        match self {
            StrategyTag::ValidateExplore => "validate_explore",
            StrategyTag::ReflectClarify => "reflect_clarify",
            StrategyTag::SupportCoping => "support_coping",
            StrategyTag::Default => "default",
        }
    }
}

/// Pick a strategy for a non-positive message.
///
/// High urgency overrides everything. Otherwise short messages get
/// validation, long ones get reflection, and mid-length low-urgency
/// messages roll 0.5 / 0.3 / 0.2 across the three for variety.
pub fn choose_strategy(analysis: &AnalysisResult, rng: &dyn RandomSource) -> StrategyTag {
    if analysis.urgency >= URGENCY_SUPPORT_THRESHOLD {
        return StrategyTag::SupportCoping;
    }
    if analysis.word_count < SHORT_MESSAGE_WORDS {
        return StrategyTag::ValidateExplore;
    }
    if analysis.word_count > LONG_MESSAGE_WORDS {
        return StrategyTag::ReflectClarify;
    }
    let roll = rng.next_f32();
    if roll < 0.5 {
        StrategyTag::ValidateExplore
    } else if roll < 0.8 {
        StrategyTag::ReflectClarify
    } else {
        StrategyTag::SupportCoping
    }
}
