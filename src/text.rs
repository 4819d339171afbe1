//! Text normalization and matching helpers shared by the classifiers.
//!
//! All lexicon matching runs over `normalize`d text: HTML entities decoded
//! (mobile clients send `can&#39;t`), typographic apostrophes mapped to `'`,
//! lowercased, whitespace condensed. Callers keep the raw input around for
//! word counts and question detection.

/// Normalize a message for substring/pattern matching.
pub fn normalize(input: &str) -> String {
    let decoded = html_escape::decode_html_entities(input).replace('\u{2019}', "'");
    decoded
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// True if any needle occurs as a substring of `text`.
#[inline]
pub fn contains_any<S: AsRef<str>>(text: &str, needles: &[S]) -> bool {
    needles.iter().any(|n| text.contains(n.as_ref()))
}

/// True if any needle occurs as a whole word of `text` (single-word needles).
pub fn word_match_any<S: AsRef<str>>(text: &str, needles: &[S]) -> bool {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .any(|tok| needles.iter().any(|n| n.as_ref() == tok))
}

/// Short anonymized id for log lines. Never log raw message text outside the
/// fault path; use this hash instead.
pub(crate) fn anon_hash(text: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(12);
    for b in digest.iter().take(6) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}
