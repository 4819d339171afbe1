//! Intent classification: first matching rule wins.
//!
//! Order is safety-first and deliberate. Crisis outranks everything,
//! coping requests outrank greetings ("hi, can you help me cope?"),
//! and the emotional-support cluster outranks the informational intents
//! so "anxious about my medication" gets support, not a drug fact sheet.

use crate::lexicon::Lexicon;
use crate::safety::SafetyClassifier;
use crate::text::{contains_any, normalize, word_match_any};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Matches "333", "3 3 3", "3-3-3" and similar spacings.
static RULE_333_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"333|3.3.3").expect("valid rule-333 pattern"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Emergency,
    Coping,
    Offensive,
    Greeting,
    #[serde(rename = "rule_333")]
    Rule333,
    AnxietyInfo,
    Medicine,
    Doctor,
    AppInfo,
    Support,
}

impl Intent {
    /// Stable label for logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            Intent::Emergency => "emergency",
            Intent::Coping => "coping",
            Intent::Offensive => "offensive",
            Intent::Greeting => "greeting",
            Intent::Rule333 => "rule_333",
            Intent::AnxietyInfo => "anxiety_info",
            Intent::Medicine => "medicine",
            Intent::Doctor => "doctor",
            Intent::AppInfo => "app_info",
            Intent::Support => "support",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IntentClassifier {
    lexicon: Arc<Lexicon>,
    safety: SafetyClassifier,
}

impl IntentClassifier {
    pub fn new(lexicon: Arc<Lexicon>, safety: SafetyClassifier) -> Self {
        Self { lexicon, safety }
    }

    pub fn classify(&self, text: &str) -> Intent {
        if self.safety.is_crisis(text) {
            return Intent::Emergency;
        }

        let norm = normalize(text);
        let data = self.lexicon.data();

        if contains_any(&norm, &data.coping_keywords) {
            return Intent::Coping;
        }
        if self.lexicon.offensive_patterns().iter().any(|re| re.is_match(&norm)) {
            return Intent::Offensive;
        }
        if self.lexicon.greeting_patterns().iter().any(|re| re.is_match(&norm)) {
            return Intent::Greeting;
        }
        if is_rule_333(&norm) {
            return Intent::Rule333;
        }
        if (norm.contains("anxiety") || norm.contains("anxious"))
            && (norm.contains("what") || norm.contains("why"))
        {
            return Intent::AnxietyInfo;
        }
        // Emotional language wins over the informational intents below.
        if contains_any(&norm, &data.support_keywords) {
            return Intent::Support;
        }
        if word_match_any(&norm, &data.medicine_keywords) {
            return Intent::Medicine;
        }
        if word_match_any(&norm, &data.doctor_keywords) {
            return Intent::Doctor;
        }
        if word_match_any(&norm, &data.app_keywords) {
            return Intent::AppInfo;
        }
        Intent::Support
    }
}

fn is_rule_333(norm: &str) -> bool {
    RULE_333_RE.is_match(norm) || norm.contains("three three three")
}
