//! Feature-flag options for the upload pipeline
//! Options are an explicitly passed value with a load-once-per-request
//! lifetime: construct a fresh value after every write instead of mutating
//! shared state. There is deliberately no process-global cache.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Known feature flags.
pub const FEATURES: &[&str] = &["svg"];

/// Persisted feature flags. Every flag defaults to off; with all flags off
/// the host platform behaves exactly as if this crate were not wired up.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Gate for the whole SVG upload pipeline.
    #[serde(default)]
    pub svg: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { svg: false }
    }
}

impl Options {
    /// Load options from a JSON or YAML file. A missing file yields the
    /// defaults; keys absent from the file keep their default value.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content)
            .or_else(|_| serde_yaml::from_str(&content))
            .map_err(|e| Error::ConfigError(format!("Cannot parse options file: {}", e)))
    }

    /// Persist options as JSON. Callers reload with [`Options::load`]
    /// rather than reusing the written value across requests.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| Error::ConfigError(format!("Cannot serialize options: {}", e)))?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn get(&self, feature: &str) -> Option<bool> {
        match feature {
            "svg" => Some(self.svg),
            _ => None,
        }
    }

    pub fn set(&mut self, feature: &str, enabled: bool) -> Result<()> {
        match feature {
            "svg" => self.svg = enabled,
            _ => return Err(Error::ConfigError(format!("Unknown feature: {}", feature))),
        }
        Ok(())
    }

    pub fn set_all(&mut self, enabled: bool) {
        self.svg = enabled;
    }

    /// All features with their current status, in [`FEATURES`] order.
    pub fn features(&self) -> Vec<(&'static str, bool)> {
        FEATURES
            .iter()
            .map(|&feature| (feature, self.get(feature).unwrap_or(false)))
            .collect()
    }
}
