use crate::playback::storage::SessionStorage;

/// Default storage key for the played flag.
pub const DEFAULT_STORAGE_KEY: &str = "silkflow.hero.played";

/// Value written once the choreography has run.
pub const PLAYED_VALUE: &str = "true";

/// Once-per-session guard around the choreography.
///
/// Storage failures never escape: an unreadable record counts as "not played" and a failed write
/// is skipped, so the worst case is a replay on the next mount.
pub struct PlaybackGate<S: SessionStorage> {
    storage: S,
    key: String,
}

impl<S: SessionStorage> PlaybackGate<S> {
    /// Gate reading and writing `key` in `storage`.
    pub fn new(storage: S, key: impl Into<String>) -> Self {
        Self {
            storage,
            key: key.into(),
        }
    }

    /// Storage key in use.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Backing storage.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Whether the record says the choreography already ran this session.
    pub fn has_played(&self) -> bool {
        match self.storage.get(&self.key) {
            Ok(Some(v)) => {
                let played = v == PLAYED_VALUE;
                tracing::info!(key = %self.key, played, "playback record read");
                played
            }
            Ok(None) => {
                tracing::info!(key = %self.key, "no playback record; running choreography");
                false
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "playback record unreadable; treating as not played");
                false
            }
        }
    }

    /// Persist the played flag. Returns `false` when the write was refused.
    pub fn mark_played(&mut self) -> bool {
        match self.storage.set(&self.key, PLAYED_VALUE) {
            Ok(()) => {
                tracing::info!(key = %self.key, "playback record written");
                true
            }
            Err(err) => {
                tracing::warn!(key = %self.key, error = %err, "playback record not written");
                false
            }
        }
    }
}

impl<S: SessionStorage> std::fmt::Debug for PlaybackGate<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlaybackGate")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/playback/gate.rs"]
mod tests;
