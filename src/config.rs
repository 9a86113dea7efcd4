//! quad configuration.
//!
//! Loaded from `<quad home>/config.toml`, where the quad home is `$QUAD_HOME`
//! or `~/.quad`. Every key is optional; a missing file means all defaults.
//!
//! ```toml
//! user = "asha@campus.edu"
//! delivery-fee = 20
//! watch-interval-ms = 2000
//! ```

use std::path::PathBuf;
use std::{env, fs, io};

use serde::{Deserialize, Serialize};
use tracing::debug;

/// Fee offered to carriers when `--fee` isn't given, in rupees.
pub const DEFAULT_DELIVERY_FEE: u32 = 20;

/// How often `quad match --watch` polls the store.
pub const DEFAULT_WATCH_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default, deny_unknown_fields)]
pub struct Config {
    /// The acting member when neither `--as` nor `QUAD_USER` is set.
    pub user: Option<String>,

    pub delivery_fee: u32,

    pub watch_interval_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user: None,
            delivery_fee: DEFAULT_DELIVERY_FEE,
            watch_interval_ms: DEFAULT_WATCH_INTERVAL_MS,
        }
    }
}

impl Config {
    /// Load config from `<quad home>/config.toml`, falling back to defaults
    /// when the file doesn't exist.
    pub fn load() -> Result<Self, String> {
        let Some(path) = Self::path() else {
            return Ok(Self::default());
        };

        let contents = match fs::read_to_string(&path) {
            Ok(s) => s,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(format!("failed to read {}: {e}", path.display())),
        };

        Self::parse(&contents).map_err(|e| format!("invalid config at {}: {e}", path.display()))
    }

    /// Parse config from TOML text.
    pub fn parse(contents: &str) -> Result<Self, String> {
        let config: Self = toml::from_str(contents).map_err(|e| e.to_string())?;

        if config.user.as_deref().is_some_and(|u| u.trim().is_empty()) {
            return Err("user is set but empty".to_string());
        }
        if config.watch_interval_ms == 0 {
            return Err("watch-interval-ms must be positive".to_string());
        }

        Ok(config)
    }

    /// The config file path: `<quad home>/config.toml`.
    pub fn path() -> Option<PathBuf> {
        home().map(|h| h.join("config.toml"))
    }
}

/// The quad home directory: `$QUAD_HOME`, or `~/.quad`.
pub fn home() -> Option<PathBuf> {
    if let Ok(dir) = env::var("QUAD_HOME")
        && !dir.is_empty()
    {
        return Some(PathBuf::from(dir));
    }
    dirs::home_dir().map(|h| h.join(".quad"))
}
