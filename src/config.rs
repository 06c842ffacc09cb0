//! Configuration management for carry-vm.
//!
//! Configuration is loaded from multiple sources in priority order:
//! 1. Environment variables (`CARRY_VM_SPEED`, `CARRY_VM_LEVEL`, `CARRY_VM_PROGRAM`)
//! 2. Project-local config file (`./carry-vm.toml`)
//! 3. User config file (`~/.config/carry-vm/config.toml`)
//! 4. Built-in defaults
//!
//! Command-line flags override all of these.
//!
//! # Config File Format
//!
//! ```toml
//! # carry-vm.toml
//!
//! # Auto-play speed, 1 (one step per second) to 10 (ten per second)
//! speed = 4
//!
//! # Level to play when --level is not given
//! level = "double"
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use crate::engine::Speed;

/// Global cached configuration.
static CONFIG: OnceLock<Config> = OnceLock::new();

const DEFAULT_LEVEL: &str = "double";
const DEFAULT_MAX_STEPS: usize = 10_000;

/// carry-vm configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Auto-play speed, 1..=10.
    pub speed: Option<u8>,

    /// Built-in level name.
    pub level: Option<String>,

    /// Program file to run instead of the level's reference solution.
    pub program: Option<String>,

    /// Step limit for headless runs.
    pub max_steps: Option<usize>,
}

impl Config {
    /// Load configuration from all sources.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables
    /// 2. Project-local `carry-vm.toml`
    /// 3. User config `~/.config/carry-vm/config.toml`
    /// 4. Defaults
    pub fn load() -> Self {
        let mut config = Self::default();

        if let Some(user_config) = Self::load_user_config() {
            config.merge(user_config);
        }

        if let Some(local_config) = Self::load_local_config() {
            config.merge(local_config);
        }

        config.apply_overrides(|key| std::env::var(key).ok());

        config
    }

    /// Get the cached global configuration.
    ///
    /// Loads configuration on first call and caches it.
    pub fn get() -> &'static Config {
        CONFIG.get_or_init(|| {
            let config = Self::load();
            log::debug!("Loaded configuration: {:?}", config);
            config
        })
    }

    /// Configured speed, or the default when unset or out of range.
    pub fn speed(&self) -> Speed {
        match self.speed.map(Speed::try_from) {
            Some(Ok(speed)) => speed,
            Some(Err(e)) => {
                log::warn!("Ignoring configured speed: {}", e);
                Speed::default()
            }
            None => Speed::default(),
        }
    }

    /// Level name, defaulting to `double`.
    pub fn level(&self) -> &str {
        self.level.as_deref().unwrap_or(DEFAULT_LEVEL)
    }

    pub fn program_path(&self) -> Option<PathBuf> {
        self.program.as_ref().map(PathBuf::from)
    }

    pub fn max_steps(&self) -> usize {
        self.max_steps.unwrap_or(DEFAULT_MAX_STEPS)
    }

    /// Load user configuration from ~/.config/carry-vm/config.toml
    fn load_user_config() -> Option<Self> {
        let config_path = Self::user_config_path()?;
        Self::load_from_file(&config_path)
    }

    /// Load project-local configuration from ./carry-vm.toml
    fn load_local_config() -> Option<Self> {
        Self::load_from_file(Path::new("carry-vm.toml"))
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Option<Self> {
        if !path.exists() {
            return None;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    log::info!("Loaded config from {}", path.display());
                    Some(config)
                }
                Err(e) => {
                    log::warn!("Failed to parse {}: {}", path.display(), e);
                    None
                }
            },
            Err(e) => {
                log::warn!("Failed to read {}: {}", path.display(), e);
                None
            }
        }
    }

    /// Merge another config into this one.
    /// Only overrides fields that are Some in the other config.
    fn merge(&mut self, other: Self) {
        if other.speed.is_some() {
            self.speed = other.speed;
        }
        if other.level.is_some() {
            self.level = other.level;
        }
        if other.program.is_some() {
            self.program = other.program;
        }
        if other.max_steps.is_some() {
            self.max_steps = other.max_steps;
        }
    }

    /// Apply overrides from `lookup` (the process environment outside tests).
    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(value) = lookup("CARRY_VM_SPEED") {
            match value.trim().parse::<u8>() {
                Ok(speed) => {
                    log::info!("Using CARRY_VM_SPEED from environment: {}", speed);
                    self.speed = Some(speed);
                }
                Err(e) => log::warn!("Ignoring CARRY_VM_SPEED={:?}: {}", value, e),
            }
        }
        if let Some(level) = lookup("CARRY_VM_LEVEL") {
            log::info!("Using CARRY_VM_LEVEL from environment: {}", level);
            self.level = Some(level);
        }
        if let Some(path) = lookup("CARRY_VM_PROGRAM") {
            log::info!("Using CARRY_VM_PROGRAM from environment: {}", path);
            self.program = Some(path);
        }
    }

    /// Get the path to the user config file (for display/creation).
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("carry-vm").join("config.toml"))
    }

    /// Generate a sample config file content.
    pub fn sample_config() -> String {
        r#"# carry-vm configuration
# Place this file at ~/.config/carry-vm/config.toml or ./carry-vm.toml

# Auto-play speed: 1 (slowest, one step per second) to 10 (fastest)
speed = 2

# Level to play (see --list-levels)
level = "double"

# Program listing to run (optional, defaults to the level's solution)
# program = "double.asm"

# Step limit for --fast runs
# max_steps = 10000
"#
        .to_string()
    }
}
