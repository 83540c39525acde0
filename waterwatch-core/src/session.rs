//! Keyed conversation state with per-key exclusion and idle expiry.
//!
//! Each conversation identity owns one slot behind its own mutex. The map
//! lock is only held to find or create a slot, so different conversations
//! never wait on each other beyond that lookup, while two messages for the
//! same conversation run one after the other.

use crate::dialog::ConversationState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;
use uuid::Uuid;

/// Opaque key for one guided-query conversation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationId(String);

impl ConversationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// A fresh random identity.
    pub fn new_random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ConversationId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ConversationId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ConversationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug)]
struct Slot {
    state: ConversationState,
    last_seen: Instant,
}

impl Slot {
    fn fresh(now: Instant) -> Self {
        Self {
            state: ConversationState::new(),
            last_seen: now,
        }
    }

    fn is_expired(&self, now: Instant, idle_timeout: Duration) -> bool {
        now.saturating_duration_since(self.last_seen) >= idle_timeout
    }
}

/// In-process store of conversation states.
#[derive(Debug)]
pub struct SessionStore {
    slots: Mutex<HashMap<ConversationId, Arc<Mutex<Slot>>>>,
    last_sweep: Mutex<Instant>,
    idle_timeout: Duration,
    sweep_interval: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration, sweep_interval: Duration) -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            last_sweep: Mutex::new(Instant::now()),
            idle_timeout,
            sweep_interval,
        }
    }

    pub fn idle_timeout(&self) -> Duration {
        self.idle_timeout
    }

    /// Run `f` with exclusive access to the state of `id`.
    ///
    /// The state is created on first use and reset to Idle when the
    /// conversation has been idle for longer than the timeout.
    pub fn with_session<R>(
        &self,
        id: &ConversationId,
        f: impl FnOnce(&mut ConversationState) -> R,
    ) -> R {
        self.with_session_at(id, Instant::now(), f)
    }

    /// [`with_session`](Self::with_session) with an explicit clock reading.
    pub fn with_session_at<R>(
        &self,
        id: &ConversationId,
        now: Instant,
        f: impl FnOnce(&mut ConversationState) -> R,
    ) -> R {
        self.maybe_sweep(now);

        let slot = {
            let mut slots = self.slots.lock();
            Arc::clone(
                slots
                    .entry(id.clone())
                    .or_insert_with(|| Arc::new(Mutex::new(Slot::fresh(now)))),
            )
        };

        let mut slot = slot.lock();
        if slot.is_expired(now, self.idle_timeout) {
            debug!(conversation = %id, step = %slot.state.step(), "conversation expired");
            slot.state.reset();
        }
        let result = f(&mut slot.state);
        slot.last_seen = now;
        result
    }

    /// The state the next message for `id` would start from, if known.
    pub fn state(&self, id: &ConversationId) -> Option<ConversationState> {
        let slot = self.slots.lock().get(id).cloned()?;
        let slot = slot.lock();
        if slot.is_expired(Instant::now(), self.idle_timeout) {
            Some(ConversationState::new())
        } else {
            Some(slot.state.clone())
        }
    }

    /// Number of tracked conversations, expired or not.
    pub fn len(&self) -> usize {
        self.slots.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.lock().is_empty()
    }

    fn maybe_sweep(&self, now: Instant) {
        {
            let mut last_sweep = self.last_sweep.lock();
            if now.saturating_duration_since(*last_sweep) < self.sweep_interval {
                return;
            }
            *last_sweep = now;
        }
        self.sweep_expired_at(now);
    }

    /// Drop expired conversations nobody is using. Returns how many went.
    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Instant::now())
    }

    fn sweep_expired_at(&self, now: Instant) -> usize {
        let mut slots = self.slots.lock();
        let before = slots.len();
        slots.retain(|_, slot| {
            // A slot referenced elsewhere is in use by a request.
            if Arc::strong_count(slot) > 1 {
                return true;
            }
            match slot.try_lock() {
                Some(slot) => !slot.is_expired(now, self.idle_timeout),
                None => true,
            }
        });
        let removed = before - slots.len();
        if removed > 0 {
            debug!(removed, remaining = slots.len(), "swept expired conversations");
        }
        removed
    }
}
