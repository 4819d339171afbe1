//! Message analysis: emotions, urgency, themes, and shape flags.
//!
//! Pure keyword heuristics over normalized text. No per-message state, no
//! randomness, so every function here is a plain input-output mapping and
//! tests can assert exact results.

use crate::lexicon::Lexicon;
use crate::text::{contains_any, normalize};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Urgency ceiling after clamping.
pub const MAX_URGENCY: u8 = 10;

/// Positive words that flip to "bad" when preceded by a negation.
const NEGATED_POSITIVE_WORDS: [&str; 4] = ["good", "well", "happy", "great"];

/// Everything downstream stages need to know about one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    /// Detected emotion labels, never empty ("neutral" when nothing matches).
    pub emotions: Vec<String>,
    /// 0..=10. Positive messages are always 0.
    pub urgency: u8,
    /// Life-area theme labels, may be empty.
    pub themes: Vec<String>,
    /// Whitespace-separated word count of the raw message.
    pub word_count: usize,
    pub has_question: bool,
    pub is_positive: bool,
    pub is_negative: bool,
}

#[derive(Debug, Clone)]
pub struct MessageAnalyzer {
    lexicon: Arc<Lexicon>,
}

impl MessageAnalyzer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// Analyze one message. Word count and the question flag come from the
    /// raw text; everything else works on the normalized form.
    pub fn analyze(&self, text: &str) -> AnalysisResult {
        let norm = normalize(text);
        let is_positive = self.detect_positive(&norm);
        let is_negative = self.detect_negative(&norm);

        AnalysisResult {
            emotions: self.detect_emotions(&norm),
            urgency: self.urgency_score(&norm, is_positive),
            themes: self.detect_themes(&norm),
            word_count: text.split_whitespace().count(),
            has_question: text.contains('?'),
            is_positive,
            is_negative,
        }
    }

    /// Emotion labels in lexicon order.
    ///
    /// Positive groups always register. A negative group registers only when
    /// nothing matched before it, or the message hedges with "not"/"but"
    /// (mixed feelings). A negated positive ("not good", "not happy")
    /// replaces the "good" label with "bad".
    fn detect_emotions(&self, norm: &str) -> Vec<String> {
        let data = self.lexicon.data();
        let mut emotions: Vec<String> = Vec::new();

        for group in &data.positive_emotions {
            if contains_any(norm, &group.words) {
                emotions.push(group.label.clone());
            }
        }

        let mixed = norm.contains("not") || norm.contains("but");
        for group in &data.negative_emotions {
            if contains_any(norm, &group.words) && (emotions.is_empty() || mixed) {
                emotions.push(group.label.clone());
            }
        }

        if norm.contains("not")
            && NEGATED_POSITIVE_WORDS.iter().any(|w| norm.contains(w))
        {
            emotions.retain(|e| e != "good");
            emotions.push("bad".to_string());
        }

        if emotions.is_empty() {
            emotions.push("neutral".to_string());
        }
        emotions
    }

    fn detect_positive(&self, norm: &str) -> bool {
        self.lexicon.data().positive_indicators.iter().any(|ind| {
            norm.contains(ind.as_str())
                && !norm.contains(&format!("not {}", ind))
                && !norm.contains(&format!("n't {}", ind))
        })
    }

    fn detect_negative(&self, norm: &str) -> bool {
        let data = self.lexicon.data();
        contains_any(norm, &data.negative_indicators)
            || contains_any(norm, &data.negated_positive_phrases)
    }

    /// One point per intensity word present, two per exclamation mark, three
    /// per absolute phrase, clamped to [`MAX_URGENCY`]. Positive messages
    /// score 0 regardless of punctuation.
    fn urgency_score(&self, norm: &str, is_positive: bool) -> u8 {
        if is_positive {
            return 0;
        }
        let data = self.lexicon.data();
        let mut score: u32 = 0;
        for word in &data.intensity_words {
            if norm.contains(word.as_str()) {
                score += 1;
            }
        }
        score += norm.matches('!').count() as u32 * 2;
        for phrase in &data.absolute_negative_phrases {
            if norm.contains(phrase.as_str()) {
                score += 3;
            }
        }
        score.min(MAX_URGENCY as u32) as u8
    }

    fn detect_themes(&self, norm: &str) -> Vec<String> {
        self.lexicon
            .data()
            .themes
            .iter()
            .filter(|g| contains_any(norm, &g.words))
            .map(|g| g.label.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn analyzer() -> MessageAnalyzer {
        MessageAnalyzer::new(Lexicon::builtin())
    }

    #[test]
    fn emotions_are_never_empty() {
        let a = analyzer();
        for input in ["", "   ", "🤷", "qwertyuiop"] {
            let res = a.analyze(input);
            assert_eq!(res.emotions, vec!["neutral"], "input: {:?}", input);
        }
    }

    #[test]
    fn analysis_is_deterministic() {
        let a = analyzer();
        let msg = "I'm so stressed about work but trying to stay calm";
        assert_eq!(a.analyze(msg), a.analyze(msg));
    }

    #[test]
    fn urgency_stays_in_bounds() {
        let a = analyzer();
        for input in [
            "fine",
            "I really can't take this!!",
            "I really can't take this!! I can't handle it!!! never always so too",
        ] {
            assert!(a.analyze(input).urgency <= MAX_URGENCY);
        }
    }

    #[test]
    fn negated_positive_becomes_bad() {
        let a = analyzer();
        let res = a.analyze("I'm not good");
        assert_eq!(res.emotions, vec!["bad"]);
        assert!(res.is_negative);
        assert!(!res.is_positive);
    }

    #[test]
    fn not_bad_reads_as_sad() {
        // "bad" is a sadness keyword and not part of the negated-positive
        // list, so the hedge does not flip it.
        let res = analyzer().analyze("not bad I guess");
        assert_eq!(res.emotions, vec!["sad"]);
    }

    #[test]
    fn dont_feel_good_counts_as_positive() {
        // "don't feel good" carries neither "not good" nor "n't good", so
        // the indicator check reads it as positive and urgency drops to 0.
        // The negated-phrase list still marks it negative.
        let res = analyzer().analyze("I don't feel good");
        assert_eq!(res.emotions, vec!["good"]);
        assert!(res.is_positive);
        assert!(res.is_negative);
        assert_eq!(res.urgency, 0);
    }

    #[test]
    fn urgency_adds_intensity_exclamations_and_absolutes() {
        // "really" + "can't" (2) + two '!' (4) + "can't take" (3).
        let res = analyzer().analyze("I really can't take this!!");
        assert_eq!(res.urgency, 9);
    }

    #[test]
    fn urgency_clamps_at_ten() {
        let res = analyzer().analyze("I really can't take this!! I can't handle it");
        assert_eq!(res.urgency, MAX_URGENCY);
    }

    #[test]
    fn positive_message_scores_zero_urgency() {
        let res = analyzer().analyze("I feel really good today!");
        assert!(res.is_positive);
        assert_eq!(res.urgency, 0);
        assert_eq!(res.emotions, vec!["good"]);
    }

    #[test]
    fn themes_cover_all_matching_groups() {
        let res = analyzer().analyze("I can't sleep at night because of work deadlines");
        assert_eq!(res.themes, vec!["sleep", "work", "daily"]);
    }

    #[test]
    fn mixed_marker_admits_negative_after_positive() {
        let res = analyzer().analyze("I'm happy but tired");
        assert_eq!(res.emotions, vec!["good", "tired"]);
    }

    #[test]
    fn only_first_negative_group_without_mixed_marker() {
        let res = analyzer().analyze("I feel sad and angry");
        assert_eq!(res.emotions, vec!["sad"]);
    }

    #[test]
    fn raw_text_drives_word_count_and_question_flag() {
        let res = analyzer().analyze("Feeling   ok?");
        assert_eq!(res.word_count, 2);
        assert!(res.has_question);
    }

    #[test]
    fn substring_matching_over_counts_on_purpose() {
        // "so" is inside "sorrow", which both detects sadness and adds an
        // intensity point.
        let res = analyzer().analyze("full of sorrow");
        assert_eq!(res.emotions, vec!["sad"]);
        assert_eq!(res.urgency, 1);
    }
}
