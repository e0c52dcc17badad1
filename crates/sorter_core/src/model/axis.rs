//! Actuator axis state as seen by the dashboard.
//!
//! The motion state is an open label: the controller may push values this
//! backend does not know about, and they round-trip unchanged.

use crate::model::coerce;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MotionState {
    Idle,
    Moving,
    Homing,
    /// Any label outside the canonical three, kept verbatim.
    Other(String),
}

impl MotionState {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Idle => "IDLE",
            Self::Moving => "MOVING",
            Self::Homing => "HOMING",
            Self::Other(label) => label.as_str(),
        }
    }
}

impl From<String> for MotionState {
    fn from(value: String) -> Self {
        match value.as_str() {
            "IDLE" => Self::Idle,
            "MOVING" => Self::Moving,
            "HOMING" => Self::Homing,
            _ => Self::Other(value),
        }
    }
}

impl From<MotionState> for String {
    fn from(value: MotionState) -> Self {
        match value {
            MotionState::Other(label) => label,
            canonical => canonical.as_str().to_string(),
        }
    }
}

impl Display for MotionState {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Full axis snapshot; every fanout `axis` message carries one of these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AxisState {
    pub state: MotionState,
    pub homed: bool,
    pub pos_mm: f64,
    /// Time of the last mutation; `None` until the first one.
    pub ts: Option<String>,
}

impl Default for AxisState {
    /// Process-start state: idle, homed, at the origin.
    fn default() -> Self {
        Self {
            state: MotionState::Idle,
            homed: true,
            pos_mm: 0.0,
            ts: None,
        }
    }
}

/// Direct state push from the dashboard or controller.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AxisStatePatch {
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub homed: Option<bool>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub pos_mm: Option<f64>,
    #[serde(default)]
    pub ts: Option<String>,
}
