//! Settings file for the command-line tool.

use crate::{DemoError, DemoResult};
use covenant_class::GuardConfig;
use covenant_registry::RegistryConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Tool settings, loaded from a JSON file. Missing sections keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub registry: RegistryConfig,
    pub guard: GuardConfig,
}

impl Settings {
    /// Parse settings from JSON text.
    pub fn from_json(text: &str) -> DemoResult<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Load settings from a file.
    pub fn load(path: &Path) -> DemoResult<Self> {
        let text = fs::read_to_string(path).map_err(|e| DemoError::io(path, e))?;
        let settings = Self::from_json(&text)?;
        tracing::debug!(path = %path.display(), ?settings, "loaded settings");
        Ok(settings)
    }
}
