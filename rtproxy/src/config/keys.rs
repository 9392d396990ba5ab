//! Configuration key access and validation.
//!
//! Every setting is addressed as `section.key`. A [`ConfigKey`] knows how to
//! read its value from a [`ConfigFile`] and how to validate and store a new
//! one. The INI parser goes through the same table, so a value accepted by
//! `config set` is exactly a value accepted in the file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;

use super::defaults::{MAX_TTL, MAX_UDP_PAYLOAD};
use super::settings::ConfigFile;
use crate::publisher::PublishMode;

/// Errors that can occur when getting or setting configuration values.
#[derive(Debug, Error)]
pub enum ConfigKeyError {
    /// Unknown configuration key.
    #[error("Unknown configuration key '{0}'")]
    UnknownKey(String),

    /// Validation failed for the value.
    #[error("Invalid value for {key}: {reason}")]
    ValidationFailed { key: String, reason: String },
}

/// Supported configuration keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ListenPort,

    PublishAddress,
    PublishPort,
    PublishTtl,
    PublishMaxDatagramSize,
    PublishMode,
    PublishQuiescenceMs,
    PublishVerbose,

    LoggingFile,
}

impl FromStr for ConfigKey {
    type Err = ConfigKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == lower)
            .ok_or_else(|| ConfigKeyError::UnknownKey(s.to_string()))
    }
}

impl ConfigKey {
    /// Canonical key name (e.g., "publish.mode").
    pub fn name(&self) -> &'static str {
        match self {
            ConfigKey::ListenPort => "listen.port",
            ConfigKey::PublishAddress => "publish.address",
            ConfigKey::PublishPort => "publish.port",
            ConfigKey::PublishTtl => "publish.ttl",
            ConfigKey::PublishMaxDatagramSize => "publish.max_datagram_size",
            ConfigKey::PublishMode => "publish.mode",
            ConfigKey::PublishQuiescenceMs => "publish.quiescence_ms",
            ConfigKey::PublishVerbose => "publish.verbose",
            ConfigKey::LoggingFile => "logging.file",
        }
    }

    /// Section name (e.g., "publish").
    pub fn section(&self) -> &'static str {
        self.name().split('.').next().unwrap_or("")
    }

    /// Key name within the section (e.g., "mode").
    pub fn key_name(&self) -> &'static str {
        self.name().split('.').nth(1).unwrap_or(self.name())
    }

    /// Get the value from a config file as a string.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::ListenPort => config.listen.port.to_string(),
            ConfigKey::PublishAddress => config.publish.address.clone(),
            ConfigKey::PublishPort => config.publish.port.to_string(),
            ConfigKey::PublishTtl => config.publish.ttl.to_string(),
            ConfigKey::PublishMaxDatagramSize => config.publish.max_datagram_size.to_string(),
            ConfigKey::PublishMode => config.publish.mode.to_string(),
            ConfigKey::PublishQuiescenceMs => config.publish.quiescence_ms.to_string(),
            ConfigKey::PublishVerbose => config.publish.verbose.to_string(),
            ConfigKey::LoggingFile => path_to_display(&config.logging.file),
        }
    }

    /// Set the value in a config file.
    ///
    /// Validates the value according to the key's specification before setting.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigKeyError> {
        let value = value.trim();
        self.validate(value)?;
        self.set_unchecked(config, value);
        Ok(())
    }

    /// Store an already validated value; values that fail to parse leave the field untouched.
    fn set_unchecked(&self, config: &mut ConfigFile, value: &str) {
        match self {
            ConfigKey::ListenPort => {
                if let Ok(port) = value.parse() {
                    config.listen.port = port;
                }
            }
            ConfigKey::PublishAddress => {
                config.publish.address = value.to_string();
            }
            ConfigKey::PublishPort => {
                if let Ok(port) = value.parse() {
                    config.publish.port = port;
                }
            }
            ConfigKey::PublishTtl => {
                if let Ok(ttl) = value.parse() {
                    config.publish.ttl = ttl;
                }
            }
            ConfigKey::PublishMaxDatagramSize => {
                if let Ok(size) = value.parse() {
                    config.publish.max_datagram_size = size;
                }
            }
            ConfigKey::PublishMode => {
                if let Ok(mode) = value.parse() {
                    config.publish.mode = mode;
                }
            }
            ConfigKey::PublishQuiescenceMs => {
                if let Ok(ms) = value.parse() {
                    config.publish.quiescence_ms = ms;
                }
            }
            ConfigKey::PublishVerbose => {
                config.publish.verbose = parse_bool(value);
            }
            ConfigKey::LoggingFile => {
                config.logging.file = expand_tilde(value);
            }
        }
    }

    /// Validate a value according to this key's specification.
    pub fn validate(&self, value: &str) -> Result<(), ConfigKeyError> {
        self.specification()
            .is_satisfied_by(value.trim())
            .map_err(|reason| ConfigKeyError::ValidationFailed {
                key: self.name().to_string(),
                reason,
            })
    }

    fn specification(&self) -> Box<dyn ValueSpecification> {
        match self {
            ConfigKey::ListenPort => Box::new(PortSpec),
            ConfigKey::PublishAddress => Box::new(HostSpec),
            ConfigKey::PublishPort => Box::new(PortSpec),
            ConfigKey::PublishTtl => Box::new(RangeSpec::new(0, MAX_TTL as u64)),
            ConfigKey::PublishMaxDatagramSize => {
                Box::new(RangeSpec::new(1, MAX_UDP_PAYLOAD as u64))
            }
            ConfigKey::PublishMode => Box::new(ModeSpec),
            ConfigKey::PublishQuiescenceMs => Box::new(RangeSpec::new(1, u64::MAX)),
            ConfigKey::PublishVerbose => Box::new(BooleanSpec),
            ConfigKey::LoggingFile => Box::new(PathSpec),
        }
    }

    /// All supported keys, in file order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::ListenPort,
            ConfigKey::PublishAddress,
            ConfigKey::PublishPort,
            ConfigKey::PublishTtl,
            ConfigKey::PublishMaxDatagramSize,
            ConfigKey::PublishMode,
            ConfigKey::PublishQuiescenceMs,
            ConfigKey::PublishVerbose,
            ConfigKey::LoggingFile,
        ]
    }
}

// ============================================================================
// Value Specifications
// ============================================================================

trait ValueSpecification {
    /// Returns Ok(()) if valid, Err(reason) if invalid.
    fn is_satisfied_by(&self, value: &str) -> Result<(), String>;
}

struct PortSpec;

impl ValueSpecification for PortSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<u16>()
            .map(|_| ())
            .map_err(|_| "must be a port number (0-65535)".to_string())
    }
}

/// Inclusive integer range.
struct RangeSpec {
    min: u64,
    max: u64,
}

impl RangeSpec {
    fn new(min: u64, max: u64) -> Self {
        Self { min, max }
    }

    fn reason(&self) -> String {
        if self.max == u64::MAX {
            format!("must be an integer of at least {}", self.min)
        } else {
            format!("must be an integer between {} and {}", self.min, self.max)
        }
    }
}

impl ValueSpecification for RangeSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        match value.parse::<u64>() {
            Ok(n) if (self.min..=self.max).contains(&n) => Ok(()),
            _ => Err(self.reason()),
        }
    }
}

struct ModeSpec;

impl ValueSpecification for ModeSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        value
            .parse::<PublishMode>()
            .map(|_| ())
            .map_err(|_| "must be one of: batch, single".to_string())
    }
}

/// Host name or address; no scheme, port or whitespace.
struct HostSpec;

impl ValueSpecification for HostSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must not be empty".to_string())
        } else if value.contains(char::is_whitespace) || value.contains("://") {
            Err("must be a host name or IP address".to_string())
        } else {
            Ok(())
        }
    }
}

struct BooleanSpec;

impl ValueSpecification for BooleanSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        let lower = value.to_lowercase();
        let valid = ["true", "false", "yes", "no", "1", "0", "on", "off"];
        if valid.contains(&lower.as_str()) {
            Ok(())
        } else {
            Err("must be true/false, yes/no, 1/0, or on/off".to_string())
        }
    }
}

struct PathSpec;

impl ValueSpecification for PathSpec {
    fn is_satisfied_by(&self, value: &str) -> Result<(), String> {
        if value.is_empty() {
            Err("must be a valid path".to_string())
        } else {
            Ok(())
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

fn parse_bool(value: &str) -> bool {
    let v = value.to_lowercase();
    v == "true" || v == "1" || v == "yes" || v == "on"
}

/// Expand ~ to home directory in paths.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Convert path to display string, collapsing home dir to ~.
pub(super) fn path_to_display(path: &Path) -> String {
    if let Some(home) = dirs::home_dir() {
        if let Ok(stripped) = path.strip_prefix(&home) {
            return format!("~/{}", stripped.display());
        }
    }
    path.display().to_string()
}
