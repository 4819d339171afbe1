//! Response construction from the lexicon template pools.
//!
//! All selection goes through the injected [`RandomSource`], so scripted
//! sources make every branch assertable.

use crate::analyzer::AnalysisResult;
use crate::intent::Intent;
use crate::lexicon::Lexicon;
use crate::rng::RandomSource;
use crate::strategy::StrategyTag;
use std::sync::Arc;

/// Emotion used when analysis produced no usable label.
const FALLBACK_EMOTION: &str = "challenged";
/// Substituted when the first detected emotion is a positive label, which
/// would read oddly inside a validation template.
const MIXED_EMOTION: &str = "mixed";

/* ---- reflection summary word tables ---- */

const GOOD_WORDS: [&str; 5] = ["good", "great", "well", "better", "happy"];
const SLEEP_WORDS: [&str; 4] = ["sleep", "night", "bed", "tired"];
const ROUGH_WORDS: [&str; 4] = ["bad", "sad", "anxious", "stressed"];

#[derive(Debug, Clone)]
pub struct ResponseRenderer {
    lexicon: Arc<Lexicon>,
}

impl ResponseRenderer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    fn pick<'a>(&self, pool: &'a [String], rng: &dyn RandomSource) -> &'a str {
        // Pools are validated non-empty at lexicon load.
        if pool.is_empty() {
            return "";
        }
        &pool[rng.pick_index(pool.len())]
    }

    /// Affirming reply, with a follow-up question appended at the given
    /// probability. Follow-ups carry their own leading space.
    pub fn positive_response(&self, rng: &dyn RandomSource, follow_up_probability: f32) -> String {
        let t = &self.lexicon.data().templates;
        let mut out = self.pick(&t.positive, rng).to_string();
        if rng.next_f32() < follow_up_probability {
            out.push_str(self.pick(&t.positive_follow_ups, rng));
        }
        out
    }

    /// Negative-branch reply dispatched on the strategy tag.
    pub fn therapeutic_response(
        &self,
        message: &str,
        analysis: &AnalysisResult,
        strategy: StrategyTag,
        rng: &dyn RandomSource,
    ) -> String {
        let t = &self.lexicon.data().templates;
        match strategy {
            StrategyTag::ValidateExplore => {
                let mut emotion = analysis
                    .emotions
                    .first()
                    .map(String::as_str)
                    .unwrap_or(FALLBACK_EMOTION);
                if self.lexicon.is_positive_label(emotion) {
                    emotion = MIXED_EMOTION;
                }
                format!(
                    "{} {}",
                    self.pick(&t.validation, rng).replace("{emotion}", emotion),
                    self.pick(&t.exploration, rng)
                )
            }
            StrategyTag::ReflectClarify => self
                .pick(&t.reflection, rng)
                .replace("{summary}", summarize(message)),
            StrategyTag::SupportCoping => self.pick(&t.support, rng).to_string(),
            StrategyTag::Default => self.pick(&t.default, rng).to_string(),
        }
    }

    pub fn neutral_response(&self, rng: &dyn RandomSource) -> String {
        self.pick(&self.lexicon.data().templates.neutral, rng)
            .to_string()
    }

    /// Prompt used for empty or whitespace-only input.
    pub fn fallback_prompt(&self, rng: &dyn RandomSource) -> String {
        self.pick(&self.lexicon.data().templates.fallback, rng)
            .to_string()
    }

    /// Pool or keyed response for the specialized intents. `None` for the
    /// intents handled elsewhere (emergency, coping, support).
    pub fn intent_response(
        &self,
        intent: Intent,
        norm: &str,
        rng: &dyn RandomSource,
    ) -> Option<String> {
        let t = &self.lexicon.data().templates;
        let text = match intent {
            Intent::Greeting => self.pick(&t.greeting, rng).to_string(),
            Intent::Offensive => self.pick(&t.offensive, rng).to_string(),
            Intent::Rule333 => self.pick(&t.rule_333, rng).to_string(),
            Intent::AnxietyInfo => self.pick(&t.anxiety_info, rng).to_string(),
            Intent::Doctor => self.pick(&t.doctor, rng).to_string(),
            Intent::Medicine => self.medicine_response(norm),
            Intent::AppInfo => self.app_response(norm),
            Intent::Emergency | Intent::Coping | Intent::Support => return None,
        };
        Some(text)
    }

    /// First medicine entry named in the message, else the general advice.
    fn medicine_response(&self, norm: &str) -> String {
        let data = self.lexicon.data();
        for entry in &data.medicine_entries {
            if norm.contains(entry.key.as_str()) {
                return format!("About {}: {}", entry.key.to_uppercase(), entry.info);
            }
        }
        data.medicine_general.clone()
    }

    fn app_response(&self, norm: &str) -> String {
        let info = &self.lexicon.data().app_info;
        if norm.contains("feature") {
            format!("App Features: {}", info.features)
        } else if norm.contains("setting") {
            info.settings.clone()
        } else if norm.contains("premium") {
            info.premium.clone()
        } else {
            info.general.clone()
        }
    }
}

/// One-sentence summary for the reflection template, built from fixed
/// substring rules over the lowercased raw message.
fn summarize(message: &str) -> &'static str {
    let lower = message.to_lowercase();
    if GOOD_WORDS.iter().any(|w| lower.contains(w)) {
        if lower.contains("not") {
            "you're not feeling as good as you'd like"
        } else {
            "you're feeling pretty good about things"
        }
    } else if SLEEP_WORDS.iter().any(|w| lower.contains(w)) {
        "your sleep patterns have been affecting you"
    } else if ROUGH_WORDS.iter().any(|w| lower.contains(w)) {
        "you've been dealing with some difficult feelings"
    } else {
        "you're experiencing some challenges right now"
    }
}
