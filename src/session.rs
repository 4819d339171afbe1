//! Per-session conversation history, bounded FIFO per session.
//!
//! `user_turns` is a monotonic per-session counter of user messages. It is
//! NOT the stored-turn count: eviction trims stored turns but never rewinds
//! the counter, so cadence logic (disclaimers, offers) stays stable on long
//! conversations.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// Default cap on stored turns per session (user + assistant combined).
pub const DEFAULT_MAX_TURNS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize)]
pub struct Turn {
    pub role: Role,
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct SessionStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub assistant_messages: usize,
    /// Monotonic user-turn counter, unaffected by eviction.
    pub user_turns: u64,
}

pub trait SessionStore: Send + Sync {
    /// Append a turn and return the session's user-turn counter after it.
    fn append(&self, session_id: &str, role: Role, text: &str) -> u64;

    /// Up to the last `n` stored turns, oldest first.
    fn snapshot_last_n(&self, session_id: &str, n: usize) -> Vec<Turn>;

    fn stats(&self, session_id: &str) -> SessionStats;

    fn clear(&self, session_id: &str);

    /// Drop sessions idle longer than `max_idle`; returns how many.
    fn evict_idle(&self, max_idle: Duration) -> usize;
}

#[derive(Debug)]
struct SessionState {
    turns: VecDeque<Turn>,
    user_turns: u64,
    last_active: DateTime<Utc>,
}

#[derive(Debug)]
pub struct InMemorySessionStore {
    inner: Mutex<HashMap<String, SessionState>>,
    max_turns: usize,
}

impl InMemorySessionStore {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_TURNS)
    }

    /// `max_turns` counts stored turns of both roles; clamped to at least 1.
    pub fn with_capacity(max_turns: usize) -> Self {
        Self {
            inner: Mutex::new(HashMap::new()),
            max_turns: max_turns.max(1),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, SessionState>> {
        // A panicked writer leaves the map structurally intact.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Default for InMemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore for InMemorySessionStore {
    fn append(&self, session_id: &str, role: Role, text: &str) -> u64 {
        let mut map = self.lock();
        let now = Utc::now();
        let state = map
            .entry(session_id.to_string())
            .or_insert_with(|| SessionState {
                turns: VecDeque::new(),
                user_turns: 0,
                last_active: now,
            });
        state.turns.push_back(Turn {
            role,
            text: text.to_string(),
            at: now,
        });
        while state.turns.len() > self.max_turns {
            state.turns.pop_front();
        }
        if role == Role::User {
            state.user_turns += 1;
        }
        state.last_active = now;
        state.user_turns
    }

    fn snapshot_last_n(&self, session_id: &str, n: usize) -> Vec<Turn> {
        let map = self.lock();
        match map.get(session_id) {
            Some(state) => {
                let skip = state.turns.len().saturating_sub(n);
                state.turns.iter().skip(skip).cloned().collect()
            }
            None => Vec::new(),
        }
    }

    fn stats(&self, session_id: &str) -> SessionStats {
        let map = self.lock();
        map.get(session_id)
            .map(|s| SessionStats {
                total_messages: s.turns.len(),
                user_messages: s.turns.iter().filter(|t| t.role == Role::User).count(),
                assistant_messages: s
                    .turns
                    .iter()
                    .filter(|t| t.role == Role::Assistant)
                    .count(),
                user_turns: s.user_turns,
            })
            .unwrap_or_default()
    }

    fn clear(&self, session_id: &str) {
        self.lock().remove(session_id);
    }

    fn evict_idle(&self, max_idle: Duration) -> usize {
        let mut map = self.lock();
        let cutoff = Utc::now() - max_idle;
        let before = map.len();
        map.retain(|_, s| s.last_active >= cutoff);
        before - map.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fifo_eviction_respects_cap() {
        let store = InMemorySessionStore::with_capacity(4);
        for i in 0..6 {
            let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
            store.append("s", role, &format!("msg{}", i));
        }
        let turns = store.snapshot_last_n("s", 100);
        assert_eq!(turns.len(), 4);
        assert_eq!(turns[0].text, "msg2");
        assert_eq!(turns[3].text, "msg5");
    }

    #[test]
    fn user_turn_counter_survives_eviction() {
        let store = InMemorySessionStore::with_capacity(2);
        let mut last = 0;
        for i in 0..5 {
            last = store.append("s", Role::User, &format!("u{}", i));
        }
        assert_eq!(last, 5);
        let stats = store.stats("s");
        assert_eq!(stats.user_turns, 5);
        assert_eq!(stats.total_messages, 2);
    }

    #[test]
    fn assistant_turns_do_not_advance_the_counter() {
        let store = InMemorySessionStore::new();
        assert_eq!(store.append("s", Role::User, "hi"), 1);
        assert_eq!(store.append("s", Role::Assistant, "hello"), 1);
        assert_eq!(store.append("s", Role::User, "again"), 2);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = InMemorySessionStore::new();
        store.append("a", Role::User, "from a");
        store.append("b", Role::User, "from b");
        let a = store.snapshot_last_n("a", 10);
        assert_eq!(a.len(), 1);
        assert_eq!(a[0].text, "from a");
        assert_eq!(store.stats("b").user_turns, 1);
    }

    #[test]
    fn snapshot_returns_the_tail_in_order() {
        let store = InMemorySessionStore::new();
        store.append("s", Role::User, "one");
        store.append("s", Role::Assistant, "two");
        store.append("s", Role::User, "three");
        let tail = store.snapshot_last_n("s", 2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].text, "two");
        assert_eq!(tail[1].text, "three");
        assert!(store.snapshot_last_n("missing", 2).is_empty());
    }

    #[test]
    fn clear_forgets_the_session() {
        let store = InMemorySessionStore::new();
        store.append("s", Role::User, "hi");
        store.clear("s");
        assert_eq!(store.stats("s").total_messages, 0);
        assert!(store.snapshot_last_n("s", 10).is_empty());
    }

    #[test]
    fn evict_idle_removes_only_stale_sessions() {
        let store = InMemorySessionStore::new();
        store.append("a", Role::User, "hi");
        store.append("b", Role::User, "hi");
        assert_eq!(store.evict_idle(Duration::hours(1)), 0);
        std::thread::sleep(std::time::Duration::from_millis(5));
        assert_eq!(store.evict_idle(Duration::zero()), 2);
        assert_eq!(store.stats("a").total_messages, 0);
    }

    #[test]
    fn zero_capacity_clamps_to_one() {
        let store = InMemorySessionStore::with_capacity(0);
        store.append("s", Role::User, "one");
        store.append("s", Role::User, "two");
        let turns = store.snapshot_last_n("s", 10);
        assert_eq!(turns.len(), 1);
        assert_eq!(turns[0].text, "two");
    }
}
