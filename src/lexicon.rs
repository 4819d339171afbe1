//! Embedded response lexicon: keyword groups, template pools, coping
//! techniques, info entries, and fixed strings.
//!
//! The default lexicon ships inside the binary via `include_str!` and is
//! validated once at first use. Pattern lists (crisis, offensive, greeting)
//! are compiled to regexes at load so a bad pattern fails construction, not
//! a request.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;

static BUILTIN: Lazy<Arc<Lexicon>> = Lazy::new(|| {
    let raw = include_str!("../lexicon.json");
    Arc::new(Lexicon::from_json_str(raw).expect("valid embedded lexicon"))
});

/// One labeled keyword group (emotion groups, themes).
#[derive(Debug, Clone, Deserialize)]
pub struct WordGroup {
    pub label: String,
    pub words: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CopingTechnique {
    pub key: String,
    pub name: String,
    pub steps: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MedicineEntry {
    pub key: String,
    pub info: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AppInfoEntries {
    pub general: String,
    pub features: String,
    pub settings: String,
    pub premium: String,
}

/// Random-selection pools for the renderer. All pools are non-empty after
/// validation.
#[derive(Debug, Clone, Deserialize)]
pub struct TemplatePools {
    pub validation: Vec<String>,
    pub exploration: Vec<String>,
    pub reflection: Vec<String>,
    pub support: Vec<String>,
    pub positive: Vec<String>,
    pub positive_follow_ups: Vec<String>,
    pub neutral: Vec<String>,
    pub default: Vec<String>,
    pub greeting: Vec<String>,
    pub offensive: Vec<String>,
    pub rule_333: Vec<String>,
    pub anxiety_info: Vec<String>,
    pub doctor: Vec<String>,
    pub fallback: Vec<String>,
}

/// Raw schema of `lexicon.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct LexiconData {
    pub positive_emotions: Vec<WordGroup>,
    pub negative_emotions: Vec<WordGroup>,
    pub positive_indicators: Vec<String>,
    pub negative_indicators: Vec<String>,
    pub negated_positive_phrases: Vec<String>,
    pub intensity_words: Vec<String>,
    pub absolute_negative_phrases: Vec<String>,
    pub themes: Vec<WordGroup>,
    pub crisis_keywords: Vec<String>,
    pub crisis_patterns: Vec<String>,
    pub offensive_patterns: Vec<String>,
    pub greeting_patterns: Vec<String>,
    pub coping_keywords: Vec<String>,
    pub menu_words: Vec<String>,
    pub support_keywords: Vec<String>,
    pub medicine_keywords: Vec<String>,
    pub doctor_keywords: Vec<String>,
    pub app_keywords: Vec<String>,
    pub templates: TemplatePools,
    pub coping_techniques: Vec<CopingTechnique>,
    pub emotion_technique_suggestions: HashMap<String, String>,
    pub default_technique: String,
    pub medicine_entries: Vec<MedicineEntry>,
    pub medicine_general: String,
    pub app_info: AppInfoEntries,
    pub crisis_response: String,
    pub safety_disclaimer: String,
    pub coping_offer: String,
    pub apology_fallback: String,
}

/// Validated lexicon with compiled pattern lists.
#[derive(Debug)]
pub struct Lexicon {
    data: LexiconData,
    crisis_patterns: Vec<Regex>,
    offensive_patterns: Vec<Regex>,
    greeting_patterns: Vec<Regex>,
}

impl Lexicon {
    /// The compiled-in default lexicon. Shared; cheap to clone.
    pub fn builtin() -> Arc<Self> {
        BUILTIN.clone()
    }

    /// Parse and validate a lexicon from a JSON string.
    pub fn from_json_str(raw: &str) -> anyhow::Result<Self> {
        let data: LexiconData = serde_json::from_str(raw)?;

        let crisis_patterns = compile_patterns("crisis", &data.crisis_patterns)?;
        let offensive_patterns = compile_patterns("offensive", &data.offensive_patterns)?;
        let greeting_patterns = compile_patterns("greeting", &data.greeting_patterns)?;

        let lex = Self {
            data,
            crisis_patterns,
            offensive_patterns,
            greeting_patterns,
        };
        lex.validate()?;
        Ok(lex)
    }

    /// Structural checks beyond deserialization: every pool the renderer
    /// draws from must be non-empty, and technique references must resolve.
    fn validate(&self) -> anyhow::Result<()> {
        let pools = [
            ("validation", &self.data.templates.validation),
            ("exploration", &self.data.templates.exploration),
            ("reflection", &self.data.templates.reflection),
            ("support", &self.data.templates.support),
            ("positive", &self.data.templates.positive),
            ("positive_follow_ups", &self.data.templates.positive_follow_ups),
            ("neutral", &self.data.templates.neutral),
            ("default", &self.data.templates.default),
            ("greeting", &self.data.templates.greeting),
            ("offensive", &self.data.templates.offensive),
            ("rule_333", &self.data.templates.rule_333),
            ("anxiety_info", &self.data.templates.anxiety_info),
            ("doctor", &self.data.templates.doctor),
            ("fallback", &self.data.templates.fallback),
        ];
        for (name, pool) in pools {
            if pool.is_empty() {
                anyhow::bail!("template pool `{}` is empty", name);
            }
        }

        if self.data.coping_techniques.is_empty() {
            anyhow::bail!("no coping techniques defined");
        }
        for tech in &self.data.coping_techniques {
            if tech.steps.is_empty() {
                anyhow::bail!("coping technique `{}` has no steps", tech.key);
            }
        }
        for (emotion, key) in &self.data.emotion_technique_suggestions {
            if self.technique(key).is_none() {
                anyhow::bail!(
                    "emotion `{}` suggests unknown technique `{}`",
                    emotion,
                    key
                );
            }
        }
        if self.technique(&self.data.default_technique).is_none() {
            anyhow::bail!(
                "default technique `{}` is not defined",
                self.data.default_technique
            );
        }
        if self.data.crisis_keywords.is_empty() && self.crisis_patterns.is_empty() {
            anyhow::bail!("crisis detection has no keywords and no patterns");
        }
        Ok(())
    }

    pub fn data(&self) -> &LexiconData {
        &self.data
    }

    pub fn crisis_patterns(&self) -> &[Regex] {
        &self.crisis_patterns
    }

    pub fn offensive_patterns(&self) -> &[Regex] {
        &self.offensive_patterns
    }

    pub fn greeting_patterns(&self) -> &[Regex] {
        &self.greeting_patterns
    }

    /// Look up a coping technique by its key.
    pub fn technique(&self, key: &str) -> Option<&CopingTechnique> {
        self.data.coping_techniques.iter().find(|t| t.key == key)
    }

    /// Technique key recommended for an emotion label, falling back to the
    /// configured default.
    pub fn suggested_technique(&self, emotion: &str) -> &CopingTechnique {
        let key = self
            .data
            .emotion_technique_suggestions
            .get(emotion)
            .unwrap_or(&self.data.default_technique);
        // Both sides validated at load.
        self.technique(key)
            .or_else(|| self.technique(&self.data.default_technique))
            .unwrap_or(&self.data.coping_techniques[0])
    }

    /// True if `label` names a positive emotion group.
    pub fn is_positive_label(&self, label: &str) -> bool {
        self.data.positive_emotions.iter().any(|g| g.label == label)
    }
}

fn compile_patterns(kind: &str, patterns: &[String]) -> anyhow::Result<Vec<Regex>> {
    patterns
        .iter()
        .map(|p| {
            Regex::new(p).map_err(|e| anyhow::anyhow!("{} pattern `{}` regex error: {}", kind, p, e))
        })
        .collect()
}
