#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for apkforge
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/apkforge/config.toml)
//! - Environment variables
//!
//! Paths inside the build containers are not configurable; see [`fixed_paths`].

pub mod fixed_paths;

use apkforge_errors::{ConfigError, Error};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub compiler: CompilerConfig,
}

/// Settings consumed by the plan compiler
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerConfig {
    /// Image the environment-setup stage starts from
    #[serde(default = "default_base_image")]
    pub base_image: String,
    /// Unprivileged account that runs abuild in the signing stage
    #[serde(default = "default_builder_user")]
    pub builder_user: String,
    /// Group abuild requires its caller to belong to
    #[serde(default = "default_builder_group")]
    pub builder_group: String,
}

impl Default for CompilerConfig {
    fn default() -> Self {
        Self {
            base_image: default_base_image(),
            builder_user: default_builder_user(),
            builder_group: default_builder_group(),
        }
    }
}

impl CompilerConfig {
    /// Check values that end up unquoted in generated shell
    ///
    /// # Errors
    ///
    /// Returns an error if the builder user or group is not a plain account
    /// name (`[a-z_][a-z0-9_-]*`).
    pub fn validate(&self) -> Result<(), Error> {
        for (field, value) in [
            ("builder_user", &self.builder_user),
            ("builder_group", &self.builder_group),
        ] {
            if !is_account_name(value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    value: value.clone(),
                }
                .into());
            }
        }
        Ok(())
    }
}

fn is_account_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_lowercase() || c == '_')
        && chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

fn default_base_image() -> String {
    "alpine:3.23".to_string()
}

fn default_builder_user() -> String {
    "builder".to_string()
}

fn default_builder_group() -> String {
    "abuild".to_string()
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("apkforge").join("config.toml"))
    }

    /// Parse configuration from TOML text
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not valid TOML for this structure.
    pub fn from_toml_str(contents: &str) -> Result<Self, Error> {
        let config: Self = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
            message: e.to_string(),
        })?;
        config.compiler.validate()?;
        Ok(config)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or if the file contents
    /// contain invalid TOML syntax that cannot be parsed.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        Self::from_toml_str(&contents)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            tracing::debug!(path = %config_path.display(), "no config file, using defaults");
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with process environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if an override is present but empty.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        self.merge_env_from(|key| std::env::var(key).ok())
    }

    /// Merge overrides from an arbitrary variable lookup
    ///
    /// # Errors
    ///
    /// Returns an error if an override is present but empty.
    pub fn merge_env_from<F>(&mut self, lookup: F) -> Result<(), Error>
    where
        F: Fn(&str) -> Option<String>,
    {
        // APKFORGE_BASE_IMAGE
        if let Some(image) = lookup("APKFORGE_BASE_IMAGE") {
            self.compiler.base_image = non_empty("APKFORGE_BASE_IMAGE", image)?;
        }

        // APKFORGE_BUILDER_USER
        if let Some(user) = lookup("APKFORGE_BUILDER_USER") {
            self.compiler.builder_user = non_empty("APKFORGE_BUILDER_USER", user)?;
        }

        self.compiler.validate()
    }
}

fn non_empty(field: &str, value: String) -> Result<String, Error> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }
        .into());
    }
    Ok(value)
}
