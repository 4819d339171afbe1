//! Runtime tuning knobs: history cap and the disclaimer/offer cadence.
//!
//! Loaded from an optional TOML file (`[triage]` section), then overridden
//! by environment variables. A missing file means defaults; malformed env
//! values are ignored. An `*_every` value of 0 disables that cadence.

use anyhow::Context;
use serde::Deserialize;

use crate::session::DEFAULT_MAX_TURNS;

pub const DEFAULT_CONFIG_PATH: &str = "config/triage.toml";
pub const ENV_CONFIG_PATH: &str = "TRIAGE_CONFIG_PATH";

pub const ENV_HISTORY_MAX_TURNS: &str = "TRIAGE_HISTORY_MAX_TURNS";
pub const ENV_DISCLAIMER_EVERY: &str = "TRIAGE_DISCLAIMER_EVERY";
pub const ENV_OFFER_EVERY: &str = "TRIAGE_OFFER_EVERY";
pub const ENV_OFFER_MIN_URGENCY: &str = "TRIAGE_OFFER_MIN_URGENCY";
pub const ENV_OFFER_PROBABILITY: &str = "TRIAGE_OFFER_PROBABILITY";
pub const ENV_FOLLOW_UP_PROBABILITY: &str = "TRIAGE_FOLLOW_UP_PROBABILITY";

const DEFAULT_DISCLAIMER_EVERY: u64 = 5;
const DEFAULT_OFFER_EVERY: u64 = 4;
const DEFAULT_OFFER_MIN_URGENCY: u8 = 3;
const DEFAULT_OFFER_PROBABILITY: f32 = 0.4;
const DEFAULT_FOLLOW_UP_PROBABILITY: f32 = 0.6;

#[derive(Debug, Clone, Copy, Deserialize, PartialEq)]
#[serde(default)]
pub struct TriageConfig {
    /// Stored turns per session, both roles combined.
    pub history_max_turns: usize,
    /// Append the safety disclaimer every N user turns; 0 disables.
    pub disclaimer_every: u64,
    /// Consider a coping offer every N user turns; 0 disables.
    pub offer_every: u64,
    /// Minimum urgency for a coping offer.
    pub offer_min_urgency: u8,
    /// Probability of the offer once turn and urgency line up.
    pub offer_probability: f32,
    /// Probability of a follow-up question after a positive reply.
    pub follow_up_probability: f32,
}

impl Default for TriageConfig {
    fn default() -> Self {
        Self {
            history_max_turns: DEFAULT_MAX_TURNS,
            disclaimer_every: DEFAULT_DISCLAIMER_EVERY,
            offer_every: DEFAULT_OFFER_EVERY,
            offer_min_urgency: DEFAULT_OFFER_MIN_URGENCY,
            offer_probability: DEFAULT_OFFER_PROBABILITY,
            follow_up_probability: DEFAULT_FOLLOW_UP_PROBABILITY,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct TriageRoot {
    #[serde(default)]
    triage: TriageConfig,
}

impl TriageConfig {
    /// File (if present) then env overrides, sanitized.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var(ENV_CONFIG_PATH)
            .unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let mut cfg = match std::fs::read_to_string(&path) {
            Ok(raw) => Self::from_toml_str(&raw)
                .with_context(|| format!("config file `{}`", path))?,
            Err(_) => {
                tracing::debug!(path = %path, "triage config file not found; using defaults");
                Self::default()
            }
        };
        cfg.apply_env_overrides();
        cfg.sanitize();
        Ok(cfg)
    }

    pub fn from_toml_str(raw: &str) -> anyhow::Result<Self> {
        let root: TriageRoot =
            toml::from_str(raw).context("parse triage config TOML")?;
        Ok(root.triage)
    }

    fn apply_env_overrides(&mut self) {
        if let Some(v) = env_parse::<usize>(ENV_HISTORY_MAX_TURNS) {
            self.history_max_turns = v;
        }
        if let Some(v) = env_parse::<u64>(ENV_DISCLAIMER_EVERY) {
            self.disclaimer_every = v;
        }
        if let Some(v) = env_parse::<u64>(ENV_OFFER_EVERY) {
            self.offer_every = v;
        }
        if let Some(v) = env_parse::<u8>(ENV_OFFER_MIN_URGENCY) {
            self.offer_min_urgency = v;
        }
        if let Some(v) = env_parse::<f32>(ENV_OFFER_PROBABILITY) {
            self.offer_probability = v;
        }
        if let Some(v) = env_parse::<f32>(ENV_FOLLOW_UP_PROBABILITY) {
            self.follow_up_probability = v;
        }
    }

    fn sanitize(&mut self) {
        self.history_max_turns = self.history_max_turns.max(1);
        self.offer_probability = self.offer_probability.clamp(0.0, 1.0);
        self.follow_up_probability = self.follow_up_probability.clamp(0.0, 1.0);
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse::<T>().ok())
}
