//! Motion/alert configuration record and its partial-update contract.
//!
//! # Invariants
//! - `bin_positions_mm` always holds exactly one position per canonical bin.
//! - `threshold_percent` is always within `[10, 95]` after a successful merge.
//! - A merge never partially applies: either every present field is taken or
//!   the previous record is kept as-is.

use crate::model::bin::CANONICAL_BIN_IDS;
use crate::model::coerce;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const THRESHOLD_PERCENT_MIN: i64 = 10;
pub const THRESHOLD_PERCENT_MAX: i64 = 95;

const BIN_COUNT: usize = CANONICAL_BIN_IDS.len();

/// Singleton configuration served to the controller and the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MotionConfig {
    pub steps_per_mm: f64,
    pub v_max_mm_s: f64,
    pub a_max_mm_s2: f64,
    /// Ordered by bin id.
    pub bin_positions_mm: [i64; BIN_COUNT],
    pub threshold_percent: i64,
}

impl Default for MotionConfig {
    fn default() -> Self {
        Self {
            steps_per_mm: 2.5,
            v_max_mm_s: 120.0,
            a_max_mm_s2: 400.0,
            bin_positions_mm: [0, 120, 240],
            threshold_percent: 80,
        }
    }
}

/// Partial update; `None` (omitted or `null`) keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigPatch {
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub steps_per_mm: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub v_max_mm_s: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    pub a_max_mm_s2: Option<f64>,
    #[serde(default, deserialize_with = "coerce::opt_i64_list")]
    pub bin_positions_mm: Option<Vec<i64>>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub threshold_percent: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigValidationError {
    /// `bin_positions_mm` was present with the wrong number of entries.
    BinPositionsLength { expected: usize, actual: usize },
}

impl Display for ConfigValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BinPositionsLength { expected, actual } => write!(
                f,
                "bin_positions_mm must be a list of {expected} integers, got {actual}"
            ),
        }
    }
}

impl Error for ConfigValidationError {}

impl MotionConfig {
    /// Returns the record with `patch` applied on top of `self`.
    ///
    /// `threshold_percent` is clamped into range instead of rejected.
    pub fn merged(&self, patch: &ConfigPatch) -> Result<MotionConfig, ConfigValidationError> {
        let bin_positions_mm = match patch.bin_positions_mm.as_deref() {
            None => self.bin_positions_mm,
            Some(positions) => {
                <[i64; BIN_COUNT]>::try_from(positions).map_err(|_| {
                    ConfigValidationError::BinPositionsLength {
                        expected: BIN_COUNT,
                        actual: positions.len(),
                    }
                })?
            }
        };

        Ok(MotionConfig {
            steps_per_mm: patch.steps_per_mm.unwrap_or(self.steps_per_mm),
            v_max_mm_s: patch.v_max_mm_s.unwrap_or(self.v_max_mm_s),
            a_max_mm_s2: patch.a_max_mm_s2.unwrap_or(self.a_max_mm_s2),
            bin_positions_mm,
            threshold_percent: clamp_threshold(
                patch.threshold_percent.unwrap_or(self.threshold_percent),
            ),
        })
    }
}

/// Clamps an alert threshold into `[10, 95]`.
pub fn clamp_threshold(value: i64) -> i64 {
    value.clamp(THRESHOLD_PERCENT_MIN, THRESHOLD_PERCENT_MAX)
}

/// Config as shown to the dashboard, with bin capacities for reference.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigView {
    #[serde(flatten)]
    pub config: MotionConfig,
    pub bins_capacity_kg: Vec<f64>,
}

/// Compact motion parameters polled by the controller firmware.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FirmwareAxisConfig {
    pub steps_per_mm: f64,
    pub vmax: f64,
    pub acc: f64,
    pub positions_mm: [i64; BIN_COUNT],
}

impl From<&MotionConfig> for FirmwareAxisConfig {
    fn from(config: &MotionConfig) -> Self {
        Self {
            steps_per_mm: config.steps_per_mm,
            vmax: config.v_max_mm_s,
            acc: config.a_max_mm_s2,
            positions_mm: config.bin_positions_mm,
        }
    }
}
