//! Runtime configuration, read from the environment.
//!
//! - `PORT`: HTTP port (default 8080).
//! - `MARKET_STATE_PATH`: JSON state file. Unset or empty ⇒ in-memory storage.

use crate::engine::BoxedStorage;
use crate::persistence::FileStorage;
use crate::storage::MemoryStorage;
use std::path::PathBuf;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketConfig {
    pub port: u16,
    pub state_path: Option<PathBuf>,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            state_path: None,
        }
    }
}

impl MarketConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Unparseable values fall back to defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let port = lookup("PORT")
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_PORT);
        let state_path = lookup("MARKET_STATE_PATH")
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from);
        Self { port, state_path }
    }

    /// Storage backend for this configuration.
    pub fn open_storage(&self) -> BoxedStorage {
        match &self.state_path {
            Some(path) => Box::new(FileStorage::new(path)),
            None => Box::new(MemoryStorage::new()),
        }
    }
}
