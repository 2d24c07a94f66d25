//! # Cart Configuration
//!
//! Where the cart is stored and how writes are scheduled.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     GOMARKET_DATA_DIR=/sdcard/app                                      │
//! │     GOMARKET_WRITE_MODE=immediate                                      │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/marketplace/cart.toml (Linux)                            │
//! │     ~/Library/Application Support/com.gomarket.marketplace/cart.toml   │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     file backend, "@GoMarketplace:cart", coalesced writes (100ms)      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # cart.toml
//! [storage]
//! backend = "file"          # file | memory
//! data_dir = "/data/app"    # optional, platform data dir by default
//! cart_key = "@GoMarketplace:cart"
//!
//! [persist]
//! mode = "coalesced"        # coalesced | immediate
//! debounce_ms = 100
//! ```

use std::path::PathBuf;
use std::time::Duration;

use gomarket_storage::DEFAULT_CART_KEY;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{CartError, CartResult};

/// Longest accepted coalesce window.
const MAX_DEBOUNCE_MS: u64 = 60_000;

// =============================================================================
// Storage Backend
// =============================================================================

/// Which key-value store backs the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageBackend {
    /// One file per key under the data directory.
    #[default]
    File,

    /// Process memory only; the cart does not survive a restart.
    Memory,
}

impl std::fmt::Display for StorageBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageBackend::File => write!(f, "file"),
            StorageBackend::Memory => write!(f, "memory"),
        }
    }
}

impl std::str::FromStr for StorageBackend {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "file" | "disk" => Ok(StorageBackend::File),
            "memory" | "mem" => Ok(StorageBackend::Memory),
            other => Err(CartError::InvalidConfig(format!(
                "Unknown storage backend: '{}'. Valid options: file, memory",
                other
            ))),
        }
    }
}

// =============================================================================
// Write Mode
// =============================================================================

/// How cart snapshots are written to storage.
///
/// ## Mode Comparison
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                      Write Mode Comparison                              │
/// │                                                                         │
/// │  IMMEDIATE                          │  COALESCED (Default)              │
/// │  ──────────                         │  ─────────────────────            │
/// │  • One write per mutation           │  • One write per window           │
/// │  • Storage never lags a mutation    │  • Storage lags by ≤ debounce_ms  │
/// │  • More flash wear                  │  • Only the latest snapshot lands │
/// │                                                                         │
/// │  Example: user taps "+" five times within 100ms                         │
/// │  IMMEDIATE: 5 writes                │  COALESCED: 1 write (qty + 5)     │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Collapse snapshots arriving within one window into a single write.
    #[default]
    Coalesced,

    /// Write every snapshot as it arrives.
    Immediate,
}

impl std::fmt::Display for WriteMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WriteMode::Coalesced => write!(f, "coalesced"),
            WriteMode::Immediate => write!(f, "immediate"),
        }
    }
}

impl std::str::FromStr for WriteMode {
    type Err = CartError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "coalesced" | "debounced" => Ok(WriteMode::Coalesced),
            "immediate" => Ok(WriteMode::Immediate),
            other => Err(CartError::InvalidConfig(format!(
                "Unknown write mode: '{}'. Valid options: coalesced, immediate",
                other
            ))),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Where the cart lives.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Backing store.
    #[serde(default)]
    pub backend: StorageBackend,

    /// Directory for the file backend. Platform data dir when unset.
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    /// Key the cart blob is stored under.
    #[serde(default = "default_cart_key")]
    pub cart_key: String,
}

fn default_cart_key() -> String {
    DEFAULT_CART_KEY.to_string()
}

impl Default for StorageSettings {
    fn default() -> Self {
        StorageSettings {
            backend: StorageBackend::default(),
            data_dir: None,
            cart_key: default_cart_key(),
        }
    }
}

impl StorageSettings {
    /// Returns the configured data directory, or the platform default.
    pub fn resolved_data_dir(&self) -> CartResult<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }

        project_dirs()
            .map(|dirs| dirs.data_dir().to_path_buf())
            .ok_or_else(|| CartError::InvalidConfig("Could not determine app data directory".into()))
    }
}

// =============================================================================
// Persist Settings
// =============================================================================

/// Write scheduling for the persistence writer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistSettings {
    /// Write mode.
    #[serde(default)]
    pub mode: WriteMode,

    /// Coalesce window in milliseconds (coalesced mode only).
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

fn default_debounce_ms() -> u64 {
    100
}

impl Default for PersistSettings {
    fn default() -> Self {
        PersistSettings {
            mode: WriteMode::default(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl PersistSettings {
    /// Settings that write every snapshot as it arrives.
    pub fn immediate() -> Self {
        PersistSettings {
            mode: WriteMode::Immediate,
            debounce_ms: 0,
        }
    }

    /// Settings that coalesce writes over `window_ms`.
    pub fn coalesced(window_ms: u64) -> Self {
        PersistSettings {
            mode: WriteMode::Coalesced,
            debounce_ms: window_ms,
        }
    }

    /// Returns the coalesce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// =============================================================================
// Main Cart Configuration
// =============================================================================

/// Complete cart configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CartConfig {
    /// Storage location.
    #[serde(default)]
    pub storage: StorageSettings,

    /// Write scheduling.
    #[serde(default)]
    pub persist: PersistSettings,
}

impl CartConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (cart.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> CartResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading cart config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load cart config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> CartResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| CartError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents).map_err(|e| CartError::ConfigSaveFailed(e.to_string()))?;

        info!(?path, "Cart config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> CartResult<()> {
        if self.storage.cart_key.trim().is_empty() {
            return Err(CartError::InvalidConfig("cart_key must not be empty".into()));
        }

        if self.persist.mode == WriteMode::Coalesced && self.persist.debounce_ms == 0 {
            return Err(CartError::InvalidConfig(
                "debounce_ms must be greater than 0 in coalesced mode".into(),
            ));
        }

        if self.persist.debounce_ms > MAX_DEBOUNCE_MS {
            return Err(CartError::InvalidConfig(format!(
                "debounce_ms must be at most {}",
                MAX_DEBOUNCE_MS
            )));
        }

        Ok(())
    }

    /// Applies environment variable overrides.
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|name| std::env::var(name).ok());
    }

    /// Applies overrides from a variable lookup.
    ///
    /// ## Variables
    /// - `GOMARKET_DATA_DIR`: file backend directory
    /// - `GOMARKET_CART_KEY`: storage key
    /// - `GOMARKET_STORAGE_BACKEND`: `file` or `memory`
    /// - `GOMARKET_WRITE_MODE`: `coalesced` or `immediate`
    /// - `GOMARKET_DEBOUNCE_MS`: coalesce window
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(dir) = lookup("GOMARKET_DATA_DIR") {
            debug!(data_dir = %dir, "Overriding data dir from environment");
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Some(key) = lookup("GOMARKET_CART_KEY") {
            self.storage.cart_key = key;
        }

        if let Some(backend) = lookup("GOMARKET_STORAGE_BACKEND") {
            match backend.parse() {
                Ok(parsed) => self.storage.backend = parsed,
                Err(_) => warn!(backend = %backend, "Unknown storage backend in environment"),
            }
        }

        if let Some(mode) = lookup("GOMARKET_WRITE_MODE") {
            match mode.parse() {
                Ok(parsed) => {
                    debug!(mode = %mode, "Overriding write mode from environment");
                    self.persist.mode = parsed;
                }
                Err(_) => warn!(mode = %mode, "Unknown write mode in environment"),
            }
        }

        if let Some(ms) = lookup("GOMARKET_DEBOUNCE_MS") {
            if let Ok(ms) = ms.parse::<u64>() {
                self.persist.debounce_ms = ms;
            }
        }
    }

    /// Returns the default config file path.
    fn default_config_path() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("cart.toml"))
    }
}

fn project_dirs() -> Option<directories::ProjectDirs> {
    directories::ProjectDirs::from("com", "gomarket", "marketplace")
}
