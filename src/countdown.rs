use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::clock::Clock;
use crate::engine::Update;
use crate::prefs::PrefsStore;

#[derive(Debug, Error)]
pub enum CountdownError {
    #[error("stored value under {key:?} is not an RFC 3339 timestamp: {source}")]
    MalformedTimestamp {
        key: String,
        source: chrono::ParseError,
    },
}

/// What construction does with a stored start instant that fails to parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MalformedEntryPolicy {
    /// Refuse to construct the countdown.
    #[default]
    Fail,
    /// Drop the entry and behave as if the countdown never started.
    Discard,
}

/// Named countdown that survives process restart.
///
/// The absolute UTC instant at which the countdown began is persisted into
/// the prefs store under `key`; a new instance built against the same store
/// picks the elapsed time back up. Progress and completion listeners fire
/// synchronously from [`Update::update`], which the frame loop invokes once
/// per frame.
pub struct PersistentCountdown {
    key: String,
    duration: Duration,
    saved_time: Option<DateTime<Utc>>,
    enabled: bool,
    store: Rc<RefCell<dyn PrefsStore>>,
    clock: Rc<dyn Clock>,
    progress_listeners: Vec<Box<dyn FnMut(Duration)>>,
    complete_listeners: Vec<Box<dyn FnMut()>>,
}

impl PersistentCountdown {
    /// Builds a countdown with the strict policy: a malformed stored instant
    /// fails construction.
    pub fn new(
        key: impl Into<String>,
        duration: Duration,
        store: Rc<RefCell<dyn PrefsStore>>,
        clock: Rc<dyn Clock>,
    ) -> Result<Self, CountdownError> {
        Self::with_policy(key, duration, store, clock, MalformedEntryPolicy::Fail)
    }

    pub fn with_policy(
        key: impl Into<String>,
        duration: Duration,
        store: Rc<RefCell<dyn PrefsStore>>,
        clock: Rc<dyn Clock>,
        policy: MalformedEntryPolicy,
    ) -> Result<Self, CountdownError> {
        let key = key.into();
        let stored = store.borrow().get(&key);
        let saved_time = match stored {
            Some(raw) => match parse_instant(&raw) {
                Ok(instant) => Some(instant),
                Err(source) => match policy {
                    MalformedEntryPolicy::Fail => {
                        return Err(CountdownError::MalformedTimestamp { key, source });
                    }
                    MalformedEntryPolicy::Discard => {
                        tracing::warn!(
                            target: "countdown",
                            key = %key,
                            %source,
                            "discarding malformed start instant"
                        );
                        store.borrow_mut().delete(&key);
                        None
                    }
                },
            },
            None => None,
        };

        Ok(Self {
            key,
            duration,
            saved_time,
            enabled: false,
            store,
            clock,
            progress_listeners: Vec::new(),
            complete_listeners: Vec::new(),
        })
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn is_running(&self) -> bool {
        self.enabled
    }

    /// Time left on the persisted countdown, or `None` if nothing is
    /// persisted under this key.
    pub fn remaining(&self) -> Option<Duration> {
        let saved = self.saved_time?;
        if !self.store.borrow().has(&self.key) {
            return None;
        }
        Some(self.duration.saturating_sub(self.elapsed_since(saved)))
    }

    pub fn on_progress(&mut self, listener: impl FnMut(Duration) + 'static) {
        self.progress_listeners.push(Box::new(listener));
    }

    pub fn on_complete(&mut self, listener: impl FnMut() + 'static) {
        self.complete_listeners.push(Box::new(listener));
    }

    /// Resumes a persisted countdown or begins a new one. With `reset`, any
    /// persisted entry is dropped first so the countdown restarts from the
    /// full duration. Starting on an already-expired entry emits the
    /// completion signal instead of running.
    pub fn start(&mut self, reset: bool) {
        if reset {
            self.clear();
        }

        if !self.store.borrow().has(&self.key) {
            let now = self.clock.now();
            self.saved_time = Some(now);
            self.store.borrow_mut().set(&self.key, &format_instant(now));
            self.enabled = true;
            tracing::debug!(
                target: "countdown",
                key = %self.key,
                duration_secs = self.duration.as_secs(),
                "countdown started"
            );
            return;
        }

        // Entry present but never parsed: written by someone else after
        // construction. Nothing to resume from.
        let Some(saved) = self.saved_time else {
            return;
        };

        if self.elapsed_since(saved) >= self.duration {
            self.stop();
            self.emit_complete();
        } else {
            self.enabled = true;
            tracing::debug!(target: "countdown", key = %self.key, "countdown resumed");
        }
    }

    /// Suspends signaling. Persisted state is untouched; idempotent.
    pub fn stop(&mut self) {
        self.enabled = false;
    }

    /// Drops the persisted entry, returning the countdown to never-started.
    pub fn clear(&mut self) {
        self.store.borrow_mut().delete(&self.key);
        self.saved_time = None;
    }

    fn elapsed_since(&self, saved: DateTime<Utc>) -> Duration {
        // A clock that moved backwards counts as zero elapsed.
        self.clock
            .now()
            .signed_duration_since(saved)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }

    fn emit_progress(&mut self, remaining: Duration) {
        for listener in &mut self.progress_listeners {
            listener(remaining);
        }
    }

    fn emit_complete(&mut self) {
        tracing::debug!(target: "countdown", key = %self.key, "countdown complete");
        for listener in &mut self.complete_listeners {
            listener();
        }
    }
}

impl Update for PersistentCountdown {
    fn update(&mut self) {
        if !self.enabled || !self.store.borrow().has(&self.key) {
            return;
        }
        let Some(saved) = self.saved_time else {
            return;
        };

        let elapsed = self.elapsed_since(saved);
        let remaining = self.duration.saturating_sub(elapsed);
        self.emit_progress(remaining);

        if elapsed >= self.duration {
            self.stop();
            self.emit_complete();
        }
    }
}

fn parse_instant(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    // Any stored offset is adjusted to UTC on the way in.
    DateTime::parse_from_rfc3339(raw).map(|instant| instant.with_timezone(&Utc))
}

fn format_instant(instant: DateTime<Utc>) -> String {
    // Full nanosecond precision so serialize -> parse is lossless.
    instant.to_rfc3339_opts(SecondsFormat::Nanos, true)
}
