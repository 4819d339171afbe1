//! Crisis detection and safety messaging.
//!
//! Detection is two-stage: a substring scan over the crisis keyword list,
//! then compiled regex patterns for phrasings keywords miss ("i wanna die",
//! "cant go on"). Both run on normalized text, so HTML entities and curly
//! apostrophes cannot smuggle a phrase past the gate.
//!
//! Detection here is pure; callers decide what to log.

use crate::lexicon::Lexicon;
use crate::text::{contains_any, normalize};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct SafetyClassifier {
    lexicon: Arc<Lexicon>,
}

impl SafetyClassifier {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// True if the message matches any crisis keyword or pattern.
    pub fn is_crisis(&self, text: &str) -> bool {
        let norm = normalize(text);
        if contains_any(&norm, &self.lexicon.data().crisis_keywords) {
            return true;
        }
        self.lexicon
            .crisis_patterns()
            .iter()
            .any(|re| re.is_match(&norm))
    }

    /// The fixed crisis reply with hotline numbers. Never randomized.
    pub fn crisis_response(&self) -> &str {
        &self.lexicon.data().crisis_response
    }

    /// Append the standing safety disclaimer to a reply.
    pub fn add_disclaimer(&self, response: &str) -> String {
        format!("{}\n\n{}", response, self.lexicon.data().safety_disclaimer)
    }
}
