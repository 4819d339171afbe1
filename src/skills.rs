//! Coping-technique dispatch: explicit requests, the numbered menu, and
//! per-emotion suggestions.

use crate::lexicon::{CopingTechnique, Lexicon};
use crate::rng::RandomSource;
use crate::text::{contains_any, normalize};
use std::fmt::Write as _;
use std::sync::Arc;

/// Jaro-Winkler score at or above this counts as naming a technique.
/// "breath" vs "breathing" is ~0.93; "minutes" vs "mindfulness" ~0.75.
pub const FUZZY_MATCH_THRESHOLD: f64 = 0.85;

/// First line of the technique menu; the orchestrator recognizes it when
/// deciding whether a bare number is a menu selection.
pub(crate) const MENU_HEADER: &str = "**Available Coping Techniques:**";

#[derive(Debug, Clone)]
pub struct CopingSkills {
    lexicon: Arc<Lexicon>,
}

impl CopingSkills {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    /// True if the message asks for a technique at all.
    pub fn is_coping_request(&self, text: &str) -> bool {
        contains_any(&normalize(text), &self.lexicon.data().coping_keywords)
    }

    /// Answer a coping request: named technique, menu, fuzzy-matched
    /// technique, or a random one.
    pub fn handle(&self, text: &str, rng: &dyn RandomSource) -> String {
        let norm = normalize(text);
        let data = self.lexicon.data();

        for tech in &data.coping_techniques {
            if norm.contains(tech.key.as_str()) {
                return render_technique(tech);
            }
        }
        if contains_any(&norm, &data.menu_words) {
            return self.technique_menu();
        }
        if let Some(tech) = self.fuzzy_match(&norm) {
            return render_technique(tech);
        }
        let idx = rng.pick_index(data.coping_techniques.len());
        render_technique(&data.coping_techniques[idx])
    }

    /// Interpret a follow-up to the menu: a 1-based number, an exact name,
    /// or a close misspelling. `None` when it reads as neither.
    pub fn menu_selection(&self, norm: &str) -> Option<String> {
        let techniques = &self.lexicon.data().coping_techniques;
        if let Ok(n) = norm.trim().parse::<usize>() {
            if (1..=techniques.len()).contains(&n) {
                return Some(render_technique(&techniques[n - 1]));
            }
        }
        for tech in techniques {
            if norm.contains(tech.key.as_str()) {
                return Some(render_technique(tech));
            }
        }
        self.fuzzy_match(norm).map(render_technique)
    }

    /// Technique recommended for an emotion label.
    pub fn suggest_for_emotion(&self, emotion: &str) -> String {
        render_technique(self.lexicon.suggested_technique(emotion))
    }

    pub fn technique_menu(&self) -> String {
        let mut out = String::from(MENU_HEADER);
        out.push_str("\n\n");
        for (i, tech) in self.lexicon.data().coping_techniques.iter().enumerate() {
            let _ = writeln!(out, "{}. {} ({})", i + 1, tech.name, tech.key);
        }
        out.push_str("\nJust type the number or name of the technique you'd like to try!");
        out
    }

    fn fuzzy_match(&self, norm: &str) -> Option<&CopingTechnique> {
        let techniques = &self.lexicon.data().coping_techniques;
        for token in norm.split(|c: char| !c.is_alphanumeric()) {
            if token.is_empty() {
                continue;
            }
            for tech in techniques {
                if strsim::jaro_winkler(token, &tech.key) >= FUZZY_MATCH_THRESHOLD {
                    return Some(tech);
                }
            }
        }
        None
    }
}

fn render_technique(tech: &CopingTechnique) -> String {
    let mut out = format!("**{}**\n\n", tech.name);
    for (i, step) in tech.steps.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, step);
    }
    out
}
