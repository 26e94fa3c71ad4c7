//! Watch state — per-channel symbol watchlists with explicit load/save.
//!
//! State is a plain value passed to whoever needs it, never a global. The
//! JSON layout is `{"channels": {"<id>": {"watchlist": [...]}}}`, keyed by a
//! numeric channel id, so a scheduler or transport outside this crate can
//! keep one watchlist per chat/channel. A missing state file is an empty
//! state, not an error.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

/// Identifier of the channel (chat, feed, ...) a watchlist belongs to.
pub type ChannelId = i64;

/// Errors from loading or saving watch state.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("watch state '{path}' not readable: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("watch state '{path}' is malformed: {reason}")]
    Malformed { path: String, reason: String },

    #[error("watch state '{path}' not writable: {reason}")]
    Unwritable { path: String, reason: String },
}

/// One channel's watched symbols, kept sorted and deduplicated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelWatch {
    #[serde(default)]
    pub watchlist: BTreeSet<String>,
}

/// All watchlists, keyed by channel.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WatchState {
    #[serde(default)]
    pub channels: BTreeMap<ChannelId, ChannelWatch>,
}

impl WatchState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symbol to a channel's watchlist. Symbols are stored upper-case.
    ///
    /// Returns `false` if the symbol was already present.
    pub fn add(&mut self, channel: ChannelId, symbol: &str) -> bool {
        self.channels
            .entry(channel)
            .or_default()
            .watchlist
            .insert(symbol.to_uppercase())
    }

    /// Remove a symbol from a channel's watchlist.
    ///
    /// Returns `false` if the symbol was not watched. The channel entry is
    /// kept even when its watchlist empties, matching the saved-file shape.
    pub fn remove(&mut self, channel: ChannelId, symbol: &str) -> bool {
        match self.channels.get_mut(&channel) {
            Some(watch) => watch.watchlist.remove(&symbol.to_uppercase()),
            None => false,
        }
    }

    /// The channel's watched symbols in sorted order, empty for an unknown
    /// channel.
    pub fn watchlist(&self, channel: ChannelId) -> Vec<String> {
        self.channels
            .get(&channel)
            .map(|watch| watch.watchlist.iter().cloned().collect())
            .unwrap_or_default()
    }

    /// Load state from a JSON file. A missing file yields an empty state.
    pub fn load(path: &Path) -> Result<Self, StateError> {
        if !path.exists() {
            info!(path = %path.display(), "no existing watch state, starting empty");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path).map_err(|err| StateError::Unreadable {
            path: path.display().to_string(),
            reason: err.to_string(),
        })?;
        let state: WatchState =
            serde_json::from_str(&json).map_err(|err| StateError::Malformed {
                path: path.display().to_string(),
                reason: err.to_string(),
            })?;
        info!(
            path = %path.display(),
            channels = state.channels.len(),
            "watch state loaded"
        );
        Ok(state)
    }

    /// Save state to a JSON file, overwriting any previous content.
    pub fn save(&self, path: &Path) -> Result<(), StateError> {
        let unwritable = |reason: String| StateError::Unwritable {
            path: path.display().to_string(),
            reason,
        };
        let json =
            serde_json::to_string_pretty(self).map_err(|err| unwritable(err.to_string()))?;
        std::fs::write(path, json).map_err(|err| unwritable(err.to_string()))?;
        info!(
            path = %path.display(),
            channels = self.channels.len(),
            "watch state saved"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_uppercases_and_deduplicates() {
        let mut state = WatchState::new();
        assert!(state.add(42, "fpt"));
        assert!(!state.add(42, "FPT"));
        assert_eq!(state.watchlist(42), vec!["FPT".to_string()]);
    }

    #[test]
    fn remove_reports_absence() {
        let mut state = WatchState::new();
        state.add(42, "FPT");
        assert!(state.remove(42, "fpt"));
        assert!(!state.remove(42, "FPT"));
        assert!(!state.remove(7, "FPT"));
        assert!(state.watchlist(42).is_empty());
    }

    #[test]
    fn watchlists_are_per_channel() {
        let mut state = WatchState::new();
        state.add(1, "FPT");
        state.add(2, "VNM");
        state.add(2, "ACB");
        assert_eq!(state.watchlist(1), vec!["FPT".to_string()]);
        assert_eq!(
            state.watchlist(2),
            vec!["ACB".to_string(), "VNM".to_string()]
        );
        assert!(state.watchlist(3).is_empty());
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().unwrap();
        let state = WatchState::load(&dir.path().join("absent.json")).unwrap();
        assert!(state.channels.is_empty());
    }

    #[test]
    fn save_load_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");

        let mut state = WatchState::new();
        state.add(42, "FPT");
        state.add(42, "VNM");
        state.add(-7, "HPG");
        state.save(&path).unwrap();

        let loaded = WatchState::load(&path).unwrap();
        assert_eq!(loaded, state);
    }

    #[test]
    fn json_shape_uses_string_channel_keys() {
        let json = r#"{"channels":{"42":{"watchlist":["FPT","VNM"]}}}"#;
        let state: WatchState = serde_json::from_str(json).unwrap();
        assert_eq!(
            state.watchlist(42),
            vec!["FPT".to_string(), "VNM".to_string()]
        );

        let back = serde_json::to_string(&state).unwrap();
        assert!(back.contains("\"42\""));
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let err = WatchState::load(&path).unwrap_err();
        assert!(matches!(err, StateError::Malformed { .. }));
    }
}
