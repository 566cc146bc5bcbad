//! # quire-config
//!
//! Layered configuration loading for Quire using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`QUIRE_*` prefix, `__` as separator)
//! 2. Project-level `.quire/config.toml`
//! 3. User-level `~/.config/quire/config.toml`
//! 4. Built-in defaults
//!
//! `QUIRE_VALIDATION__MAX_DEPTH` maps to `validation.max_depth`,
//! `QUIRE_INFERENCE__MAX_DEPTH` to `inference.max_depth`.
//!
//! ```no_run
//! use quire_config::QuireConfig;
//!
//! let config = QuireConfig::load_with_dotenv().expect("config");
//! println!("walk limit: {}", config.validation.max_depth);
//! ```

mod error;
mod inference;
mod validation;

pub use error::ConfigError;
pub use inference::InferenceConfig;
pub use validation::ValidationConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuireConfig {
    #[serde(default)]
    pub validation: ValidationConfig,
    #[serde(default)]
    pub inference: InferenceConfig,
}

impl QuireConfig {
    /// Load configuration from TOML files and environment variables.
    ///
    /// Does not read `.env`; see [`Self::load_with_dotenv`].
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Figment`] when a source fails to parse, or
    /// [`ConfigError::InvalidValue`] when a loaded value is out of range.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` from the workspace root.
    ///
    /// # Errors
    ///
    /// See [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and hosts can layer extra providers on top.
    #[must_use]
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(".quire/config.toml");
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("QUIRE_").split("__"))
    }

    /// Reject values no walk could work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero depth limit.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.validation.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "validation.max_depth".into(),
                reason: "must be at least 1".into(),
            });
        }
        if self.inference.max_depth == 0 {
            return Err(ConfigError::InvalidValue {
                field: "inference.max_depth".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(())
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("quire").join("config.toml"))
    }

    /// Walks up from `CARGO_MANIFEST_DIR` looking for `.env`, then falls back
    /// to the current directory. Missing files are ignored.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
