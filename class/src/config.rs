//! Configuration for call guards.

use serde::{Deserialize, Serialize};

/// When a guard turns annotation names into check chains.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    /// Look names up at every call; later redefinitions are seen.
    #[default]
    OnCall,
    /// Look names up once when the guard is built; unknown names fail then.
    OnWrap,
}

/// Configuration for a `CallGuard`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    pub resolution: Resolution,
}

impl GuardConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Guard that resolves its annotations up front.
    pub fn eager() -> Self {
        Self {
            resolution: Resolution::OnWrap,
        }
    }

    pub fn with_resolution(mut self, resolution: Resolution) -> Self {
        self.resolution = resolution;
        self
    }
}
