//! Pending controller commands: a single slot per command kind.

use crate::model::coerce;
use serde::{Deserialize, Serialize};

/// Latest intent per command kind; not an ordered stream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PendingCommands {
    pub jog_mm: Option<f64>,
    pub home: bool,
}

/// Dashboard enqueue request; only present fields overwrite their slot.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommandPatch {
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub jog_mm: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_bool")]
    pub home: Option<bool>,
}

impl CommandPatch {
    pub fn is_empty(&self) -> bool {
        self.jog_mm.is_none() && self.home.is_none()
    }
}
