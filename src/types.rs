use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub type ActionId = u32;
pub type Micros = u64;

/// Opaque action parameters. Shared with whoever produced the decision;
/// tasks and plans hold a reference, never the only copy.
pub type ActionParams = Arc<serde_json::Value>;

/// Width of one priority level on the 0..=100 decision scale.
pub const PRIORITY_SCALE_STEP: u32 = 25;

#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    #[default]
    Low,
    Normal,
    High,
    Critical,
}

impl Priority {
    pub fn level(self) -> u8 {
        match self {
            Self::Low => 0,
            Self::Normal => 1,
            Self::High => 2,
            Self::Critical => 3,
        }
    }

    pub fn from_level(level: u8) -> Self {
        match level {
            0 => Self::Low,
            1 => Self::Normal,
            2 => Self::High,
            _ => Self::Critical,
        }
    }

    /// Maps a 0..=100 decision priority onto the four levels.
    pub fn from_decision_scale(priority: u32) -> Self {
        let level = (priority as f32 / PRIORITY_SCALE_STEP as f32).round();
        Self::from_level(level.clamp(0.0, 3.0) as u8)
    }

    /// Scale value that [`Priority::from_decision_scale`] maps back to this level.
    pub fn to_decision_scale(self) -> u32 {
        u32::from(self.level()) * PRIORITY_SCALE_STEP
    }
}

pub fn clamp_unit(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}
