//! # Conversation Orchestrator
//! Routes each incoming message through safety veto, intent dispatch,
//! analysis, strategy, and rendering, then maintains session history and
//! the disclaimer/offer cadence.
//!
//! `get_response` is total: any panic in the pipeline is caught at this
//! boundary and converted to a fixed apologetic fallback, which is still
//! recorded in history.

use crate::analyzer::{AnalysisResult, MessageAnalyzer};
use crate::config::TriageConfig;
use crate::intent::{Intent, IntentClassifier};
use crate::lexicon::Lexicon;
use crate::render::ResponseRenderer;
use crate::rng::{RandomSource, SmallRngSource};
use crate::safety::SafetyClassifier;
use crate::session::{InMemorySessionStore, Role, SessionStats, SessionStore, Turn};
use crate::skills::{CopingSkills, MENU_HEADER};
use crate::strategy::choose_strategy;
use crate::text::{anon_hash, normalize};
use metrics::counter;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Words that read as a yes to the standing coping offer.
const AFFIRMATIVE_WORDS: [&str; 7] = ["yes", "yeah", "yep", "sure", "ok", "okay", "please"];
/// At most this many words for a message to count as a bare acceptance.
const AFFIRMATIVE_MAX_WORDS: usize = 4;
/// Stored turns consulted for menu/offer continuity.
const HISTORY_LOOKBACK: usize = 12;

/// One resolved reply with the intent that produced it.
#[derive(Debug, Clone)]
pub struct Reply {
    pub text: String,
    pub intent: Intent,
}

pub struct ConversationEngine {
    lexicon: Arc<Lexicon>,
    config: TriageConfig,
    store: Box<dyn SessionStore>,
    rng: Box<dyn RandomSource>,
    safety: SafetyClassifier,
    intents: IntentClassifier,
    analyzer: MessageAnalyzer,
    renderer: ResponseRenderer,
    skills: CopingSkills,
}

impl ConversationEngine {
    pub fn new(
        lexicon: Arc<Lexicon>,
        config: TriageConfig,
        store: Box<dyn SessionStore>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let safety = SafetyClassifier::new(lexicon.clone());
        let intents = IntentClassifier::new(lexicon.clone(), safety.clone());
        let analyzer = MessageAnalyzer::new(lexicon.clone());
        let renderer = ResponseRenderer::new(lexicon.clone());
        let skills = CopingSkills::new(lexicon.clone());
        Self {
            lexicon,
            config,
            store,
            rng,
            safety,
            intents,
            analyzer,
            renderer,
            skills,
        }
    }

    /// Built-in lexicon, default config, in-memory store, OS-seeded PRNG.
    pub fn with_defaults() -> Self {
        let config = TriageConfig::default();
        Self::new(
            Lexicon::builtin(),
            config,
            Box::new(InMemorySessionStore::with_capacity(config.history_max_turns)),
            Box::new(SmallRngSource::new()),
        )
    }

    /// Handle one message end to end. Never panics, never errors.
    pub fn respond(&self, session_id: &str, message: &str) -> Reply {
        counter!("triage_messages_total").increment(1);
        let turn = self.store.append(session_id, Role::User, message);

        let result = catch_unwind(AssertUnwindSafe(|| {
            self.respond_inner(session_id, message, turn)
        }));
        let reply = match result {
            Ok(reply) => reply,
            Err(_) => {
                // The one place raw content is logged: operators need the
                // message that broke the pipeline.
                error!(
                    session = %anon_hash(session_id),
                    turn,
                    message = %message,
                    "message handling panicked; returning fallback"
                );
                Reply {
                    text: self.lexicon.data().apology_fallback.clone(),
                    intent: Intent::Support,
                }
            }
        };

        self.store.append(session_id, Role::Assistant, &reply.text);
        reply
    }

    /// Text-only convenience over [`respond`](Self::respond).
    pub fn get_response(&self, session_id: &str, message: &str) -> String {
        self.respond(session_id, message).text
    }

    fn respond_inner(&self, session_id: &str, message: &str, turn: u64) -> Reply {
        let norm = normalize(message);

        // 1) Blank input: prompt for more, nothing to classify.
        if norm.is_empty() {
            let text = self.with_disclaimer(self.renderer.fallback_prompt(self.rng.as_ref()), turn);
            return Reply {
                text,
                intent: Intent::Support,
            };
        }

        // 2) Classify; crisis is decided here and cannot be shadowed.
        let intent = self.intents.classify(message);
        counter!("triage_intent_total", "intent" => intent.as_str()).increment(1);
        debug!(
            session = %anon_hash(session_id),
            message = %anon_hash(message),
            turn,
            intent = intent.as_str(),
            "message classified"
        );

        match intent {
            Intent::Emergency => {
                counter!("triage_crisis_total").increment(1);
                warn!(
                    session = %anon_hash(session_id),
                    message = %anon_hash(message),
                    "crisis indicators detected"
                );
                // No disclaimer: nothing may follow the hotline block.
                Reply {
                    text: self.safety.crisis_response().to_string(),
                    intent,
                }
            }
            Intent::Coping => {
                counter!("triage_coping_dispatch_total").increment(1);
                let text = self.skills.handle(message, self.rng.as_ref());
                Reply {
                    text: self.with_disclaimer(text, turn),
                    intent,
                }
            }
            Intent::Support => {
                let text = self.support_response(session_id, message, &norm, turn);
                Reply {
                    text: self.with_disclaimer(text, turn),
                    intent,
                }
            }
            _ => {
                // Specialized informational intents with fixed pools.
                let text = self
                    .renderer
                    .intent_response(intent, &norm, self.rng.as_ref())
                    .unwrap_or_else(|| self.renderer.fallback_prompt(self.rng.as_ref()));
                Reply {
                    text: self.with_disclaimer(text, turn),
                    intent,
                }
            }
        }
    }

    /// The therapeutic branch: continuity replies first, then
    /// analyze → strategy → render, then the optional coping offer.
    fn support_response(&self, session_id: &str, message: &str, norm: &str, turn: u64) -> String {
        if let Some(text) = self.follow_up_response(session_id, norm) {
            return text;
        }

        let analysis = self.analyzer.analyze(message);
        let base = if analysis.is_positive {
            self.renderer
                .positive_response(self.rng.as_ref(), self.config.follow_up_probability)
        } else if analysis.is_negative {
            let strategy = choose_strategy(&analysis, self.rng.as_ref());
            counter!("triage_strategy_total", "strategy" => strategy.as_str()).increment(1);
            self.renderer
                .therapeutic_response(message, &analysis, strategy, self.rng.as_ref())
        } else {
            self.renderer.neutral_response(self.rng.as_ref())
        };

        if self.should_offer_coping(turn, analysis.urgency) {
            let mut out = base;
            out.push_str("\n\n");
            out.push_str(&self.lexicon.data().coping_offer);
            return out;
        }
        base
    }

    /// Continuity with the previous assistant turn: a number or name after
    /// the technique menu, or a yes to the standing coping offer (which
    /// picks a technique for the emotion of the previous user message).
    fn follow_up_response(&self, session_id: &str, norm: &str) -> Option<String> {
        let history = self.store.snapshot_last_n(session_id, HISTORY_LOOKBACK);
        let prev_assistant = history.iter().rev().find(|t| t.role == Role::Assistant)?;

        if prev_assistant.text.starts_with(MENU_HEADER) {
            if let Some(text) = self.skills.menu_selection(norm) {
                return Some(text);
            }
        }

        if prev_assistant
            .text
            .contains(self.lexicon.data().coping_offer.as_str())
            && is_affirmative(norm)
        {
            // The last user turn is the acceptance itself; the one before
            // carries the feelings the offer was about.
            let prev_user = history.iter().rev().filter(|t| t.role == Role::User).nth(1)?;
            let analysis = self.analyzer.analyze(&prev_user.text);
            let emotion = analysis.emotions.first().cloned().unwrap_or_default();
            return Some(self.skills.suggest_for_emotion(&emotion));
        }
        None
    }

    fn should_offer_coping(&self, turn: u64, urgency: u8) -> bool {
        // Checks are ordered so the roll is only drawn when cadence and
        // urgency already line up.
        self.config.offer_every != 0
            && turn % self.config.offer_every == 0
            && urgency >= self.config.offer_min_urgency
            && self.rng.next_f32() < self.config.offer_probability
    }

    fn with_disclaimer(&self, text: String, turn: u64) -> String {
        if self.config.disclaimer_every != 0 && turn % self.config.disclaimer_every == 0 {
            self.safety.add_disclaimer(&text)
        } else {
            text
        }
    }

    /* ---- inspection for collaborators ---- */

    pub fn analyze(&self, text: &str) -> AnalysisResult {
        self.analyzer.analyze(text)
    }

    pub fn is_crisis(&self, text: &str) -> bool {
        self.safety.is_crisis(text)
    }

    pub fn history(&self, session_id: &str, n: usize) -> Vec<Turn> {
        self.store.snapshot_last_n(session_id, n)
    }

    pub fn stats(&self, session_id: &str) -> SessionStats {
        self.store.stats(session_id)
    }

    pub fn clear_session(&self, session_id: &str) {
        self.store.clear(session_id)
    }

    pub fn evict_idle(&self, max_idle: chrono::Duration) -> usize {
        self.store.evict_idle(max_idle)
    }
}

fn is_affirmative(norm: &str) -> bool {
    let mut words = 0;
    let mut hit = false;
    for token in norm
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
    {
        words += 1;
        if AFFIRMATIVE_WORDS.contains(&token) {
            hit = true;
        }
    }
    hit && words <= AFFIRMATIVE_MAX_WORDS
}
