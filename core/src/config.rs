//! Runtime configuration, read from `LECTIO_*` environment variables

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::canon::DEFAULT_TRANSLATION;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_addr")]
    pub addr: String,
    /// Explicit corpus file (JSON or SQLite). Falls back to the data
    /// directory, then to the bundled sample corpus.
    #[serde(default)]
    pub corpus_path: Option<PathBuf>,
    #[serde(default = "default_translation")]
    pub translation: String,
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    /// Delay applied to every search result before delivery
    #[serde(default)]
    pub latency_ms: u64,
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

fn default_addr() -> String { "127.0.0.1:3000".into() }
fn default_translation() -> String { DEFAULT_TRANSLATION.into() }
fn default_cache_capacity() -> usize { DEFAULT_CACHE_CAPACITY }

/// Platform data directory, e.g. `~/.local/share/lectio` on Linux.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|d| d.join("lectio"))
        .unwrap_or_else(|| PathBuf::from("data"))
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: default_addr(),
            corpus_path: None,
            translation: default_translation(),
            cache_capacity: default_cache_capacity(),
            latency_ms: 0,
            data_dir: default_data_dir(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparsable values keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        Self {
            addr: lookup("LECTIO_ADDR").unwrap_or(defaults.addr),
            corpus_path: lookup("LECTIO_CORPUS").map(PathBuf::from),
            translation: lookup("LECTIO_TRANSLATION").unwrap_or(defaults.translation),
            cache_capacity: lookup("LECTIO_CACHE_CAPACITY")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.cache_capacity),
            latency_ms: lookup("LECTIO_LATENCY_MS")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.latency_ms),
            data_dir: lookup("LECTIO_DATA_DIR").map(PathBuf::from).unwrap_or(defaults.data_dir),
        }
    }

    pub fn latency(&self) -> Duration {
        Duration::from_millis(self.latency_ms)
    }

    /// Corpus file to load: the explicit path, else `corpus.db` or
    /// `corpus.json` in the data directory. `None` means the bundled sample.
    pub fn resolve_corpus_path(&self) -> Option<PathBuf> {
        if let Some(path) = &self.corpus_path {
            return Some(path.clone());
        }
        ["corpus.db", "corpus.json"]
            .iter()
            .map(|name| self.data_dir.join(name))
            .find(|path| path.is_file())
    }
}
