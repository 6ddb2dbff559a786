#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! High-score persistence seam for Grid Invaders.
//!
//! The engine never touches storage directly: it announces new best scores
//! through [`Event::HighScoreChanged`], and this system writes them to a
//! [`HighScoreStore`]. Hosts choose the store implementation; tests use the
//! in-memory [`MemoryStore`].

use grid_invaders_core::Event;

/// Storage backend holding the single persisted high-score scalar.
///
/// Implementations are expected to treat I/O failures as non-fatal: `load`
/// falls back to zero and `save` drops the write, logging as appropriate.
pub trait HighScoreStore {
    /// Reads the persisted best score, or zero when absent or unreadable.
    fn load(&mut self) -> u32;

    /// Persists the provided best score.
    fn save(&mut self, value: u32);
}

/// In-memory store used for deterministic tests and headless runs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MemoryStore {
    value: Option<u32>,
}

impl MemoryStore {
    /// Creates an empty store that loads as zero.
    #[must_use]
    pub const fn new() -> Self {
        Self { value: None }
    }

    /// Creates a store pre-seeded with a persisted value.
    #[must_use]
    pub const fn with_value(value: u32) -> Self {
        Self { value: Some(value) }
    }

    /// Returns the currently persisted value, if any.
    #[must_use]
    pub const fn value(&self) -> Option<u32> {
        self.value
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&mut self) -> u32 {
        self.value.unwrap_or(0)
    }

    fn save(&mut self, value: u32) {
        self.value = Some(value);
    }
}

/// System that persists new best scores as the session announces them.
#[derive(Debug)]
pub struct HighScorePersistence<S: HighScoreStore> {
    store: S,
    last_saved: Option<u32>,
}

impl<S: HighScoreStore> HighScorePersistence<S> {
    /// Creates a persistence system wrapping the provided store.
    #[must_use]
    pub fn new(store: S) -> Self {
        Self {
            store,
            last_saved: None,
        }
    }

    /// Reads the persisted best score to seed a new session.
    pub fn load_initial(&mut self) -> u32 {
        let value = self.store.load();
        self.last_saved = Some(value);
        value
    }

    /// Consumes session events, writing each new best score exactly once.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            let Event::HighScoreChanged { value } = event else {
                continue;
            };
            if self.last_saved.is_some_and(|saved| saved >= *value) {
                continue;
            }
            self.store.save(*value);
            self.last_saved = Some(*value);
        }
    }

    /// Consumes the system, yielding the wrapped store.
    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }
}
