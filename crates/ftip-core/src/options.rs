#![forbid(unsafe_code)]

//! Caller-facing configuration for a singleton group.
//!
//! [`SingletonOptions`] is the whole configuration surface: a `disabled` flag
//! and an ordered `overrides` list. Both default to "off".
//!
//! # Loading
//!
//! With the `options-config` feature the options can be loaded from TOML or
//! JSON:
//!
//! ```toml
//! disabled = false
//!
//! [[overrides]]
//! placement = "bottom"
//! ```
//!
//! ```rust,ignore
//! let options = SingletonOptions::from_toml_file("ftip.toml")?;
//! let options = SingletonOptions::from_json_str(json)?;
//! ```

#[cfg(feature = "options-config")]
use std::path::Path;

#[cfg(feature = "options-config")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "options-config")]
use crate::error::OptionsError;
use crate::props::PropMap;

/// Configuration for one singleton group.
#[derive(Debug, Clone, Default, PartialEq)]
#[cfg_attr(feature = "options-config", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "options-config", serde(default))]
pub struct SingletonOptions {
    /// Keep the overlay disabled after creation and after every update.
    pub disabled: bool,
    /// Ordered configuration maps handed to the engine as the `overrides`
    /// setting.
    pub overrides: Vec<PropMap>,
}

impl SingletonOptions {
    /// Default options: enabled, no overrides.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Append one overrides entry.
    #[must_use]
    pub fn with_override(mut self, entry: PropMap) -> Self {
        self.overrides.push(entry);
        self
    }

    /// Replace the overrides list.
    #[must_use]
    pub fn overrides(mut self, overrides: Vec<PropMap>) -> Self {
        self.overrides = overrides;
        self
    }

    /// The overrides list as a configuration value.
    #[must_use]
    pub fn overrides_value(&self) -> serde_json::Value {
        serde_json::Value::Array(
            self.overrides
                .iter()
                .cloned()
                .map(serde_json::Value::Object)
                .collect(),
        )
    }

    /// Validate the options.
    ///
    /// Returns a list of problems. An empty list means the options are valid.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        self.overrides
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.is_empty())
            .map(|(index, _)| format!("overrides[{index}] is an empty map"))
            .collect()
    }

    /// Load from a TOML string.
    #[cfg(feature = "options-config")]
    pub fn from_toml_str(s: &str) -> Result<Self, OptionsError> {
        toml::from_str(s).map_err(OptionsError::Toml)
    }

    /// Load from a TOML file on disk.
    #[cfg(feature = "options-config")]
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from a JSON string.
    #[cfg(feature = "options-config")]
    pub fn from_json_str(s: &str) -> Result<Self, OptionsError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load from a JSON file on disk.
    #[cfg(feature = "options-config")]
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, OptionsError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_json_str(&content)
    }
}
