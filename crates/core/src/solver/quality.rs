//! Fidelity presets for the active-front cap
//!
//! The spread engine tries at most `max_active_fronts` sources per step. A
//! lower cap bounds the per-step cost on large, fully engaged fires at the
//! price of under-sampling the front; presets name the common choices.

use serde::{Deserialize, Serialize};

/// Quality preset determining how many active fronts are tried per step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityPreset {
    /// 200 sources per step: interactive previews
    Draft,
    /// 800 sources per step: the reference behavior
    Standard,
    /// 3200 sources per step: offline runs
    Detailed,
    /// No cap: every active front is tried every step
    Exhaustive,
}

impl QualityPreset {
    /// Source cap for this preset, `None` when uncapped
    #[must_use]
    pub const fn max_active_fronts(&self) -> Option<usize> {
        match self {
            Self::Draft => Some(200),
            Self::Standard => Some(800),
            Self::Detailed => Some(3200),
            Self::Exhaustive => None,
        }
    }

    /// Parse a preset name, ignoring case
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "standard" => Some(Self::Standard),
            "detailed" => Some(Self::Detailed),
            "exhaustive" => Some(Self::Exhaustive),
            _ => None,
        }
    }

    /// Preset matching the reference behavior
    #[must_use]
    pub const fn recommended() -> Self {
        Self::Standard
    }
}

impl Default for QualityPreset {
    fn default() -> Self {
        Self::recommended()
    }
}
