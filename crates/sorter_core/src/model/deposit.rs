//! Deposit ledger records and the controller's deposit report.
//!
//! # Invariants
//! - A `DepositEvent` is immutable once appended; its identity is its
//!   insertion order in the ledger.
//! - `fill_percent` is the controller's snapshot at capture time and is
//!   never recomputed.

use crate::model::bin::{is_canonical_bin, BinId, CANONICAL_BIN_IDS};
use crate::model::coerce;
use crate::model::time::normalize_timestamp;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

const DEFAULT_MATERIAL: &str = "Desconocido";

/// Largest accepted `|delta_g|` (1000 t). Keeps every ledger sum far from
/// `i64` overflow.
pub const MAX_DELTA_G_ABS: i64 = 1_000_000_000;

/// One controller-reported waste drop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    /// UTC, second precision, `YYYY-MM-DDTHH:MM:SSZ`.
    pub ts: String,
    pub bin: BinId,
    pub material: String,
    /// Signed gram delta; negative values are corrections.
    pub delta_g: i64,
    pub fill_percent: i64,
}

/// Inbound deposit telemetry as sent by the controller.
///
/// Numeric fields accept JSON numbers or numeric strings.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct DepositReport {
    #[serde(default)]
    pub ts: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub bin: Option<i64>,
    #[serde(default)]
    pub material: Option<String>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub delta_g: Option<i64>,
    /// Older firmware name for `delta_g`.
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub weight_grams: Option<i64>,
    #[serde(default, deserialize_with = "coerce::opt_i64")]
    pub fill_percent: Option<i64>,
}

/// Rejection reasons for a deposit report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DepositValidationError {
    MissingBin,
    UnknownBin(i64),
    InvalidTimestamp(String),
    DeltaOutOfRange(i64),
}

impl Display for DepositValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingBin => write!(f, "bin is required"),
            Self::UnknownBin(bin) => write!(
                f,
                "bin must be one of {CANONICAL_BIN_IDS:?}, got {bin}"
            ),
            Self::InvalidTimestamp(raw) => {
                write!(f, "ts must be an ISO-8601 timestamp, got `{raw}`")
            }
            Self::DeltaOutOfRange(delta_g) => write!(
                f,
                "delta_g must be within ±{MAX_DELTA_G_ABS} g, got {delta_g}"
            ),
        }
    }
}

impl Error for DepositValidationError {}

impl DepositReport {
    /// Validates the report and builds the ledger event.
    ///
    /// `now` is used when the controller did not stamp the event.
    pub fn into_event(self, now: &str) -> Result<DepositEvent, DepositValidationError> {
        let bin = self.bin.ok_or(DepositValidationError::MissingBin)?;
        if !is_canonical_bin(bin) {
            return Err(DepositValidationError::UnknownBin(bin));
        }

        let ts = match self.ts.as_deref().map(str::trim) {
            None | Some("") => now.to_string(),
            Some(raw) => normalize_timestamp(raw)
                .ok_or_else(|| DepositValidationError::InvalidTimestamp(raw.to_string()))?,
        };

        let delta_g = self.delta_g.or(self.weight_grams).unwrap_or(0);
        if delta_g.unsigned_abs() > MAX_DELTA_G_ABS.unsigned_abs() {
            return Err(DepositValidationError::DeltaOutOfRange(delta_g));
        }

        let material = self
            .material
            .map(|material| material.trim().to_string())
            .filter(|material| !material.is_empty())
            .unwrap_or_else(|| DEFAULT_MATERIAL.to_string());

        Ok(DepositEvent {
            ts,
            bin,
            material,
            delta_g,
            fill_percent: self.fill_percent.unwrap_or(0),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{DepositReport, DepositValidationError, MAX_DELTA_G_ABS};

    const NOW: &str = "2024-05-01T12:00:00Z";

    #[test]
    fn minimal_report_fills_defaults() {
        let report: DepositReport = serde_json::from_str(r#"{"bin": 1, "delta_g": 300}"#).unwrap();
        let event = report.into_event(NOW).unwrap();
        assert_eq!(event.ts, NOW);
        assert_eq!(event.material, "Desconocido");
        assert_eq!(event.delta_g, 300);
        assert_eq!(event.fill_percent, 0);
    }

    #[test]
    fn weight_grams_is_used_when_delta_is_absent() {
        let report: DepositReport =
            serde_json::from_str(r#"{"bin": "2", "weight_grams": 125.8}"#).unwrap();
        let event = report.into_event(NOW).unwrap();
        assert_eq!(event.bin, 2);
        assert_eq!(event.delta_g, 125);
    }

    #[test]
    fn delta_g_wins_over_weight_grams() {
        let report: DepositReport =
            serde_json::from_str(r#"{"bin": 3, "delta_g": -50, "weight_grams": 999}"#).unwrap();
        assert_eq!(report.into_event(NOW).unwrap().delta_g, -50);
    }

    #[test]
    fn controller_timestamp_is_normalized() {
        let report: DepositReport =
            serde_json::from_str(r#"{"bin": 1, "ts": "2024-04-30T21:00:00-03:00"}"#).unwrap();
        assert_eq!(report.into_event(NOW).unwrap().ts, "2024-05-01T00:00:00Z");
    }

    #[test]
    fn rejects_unknown_bin_and_bad_timestamp() {
        let unknown: DepositReport = serde_json::from_str(r#"{"bin": 0}"#).unwrap();
        assert_eq!(
            unknown.into_event(NOW).unwrap_err(),
            DepositValidationError::UnknownBin(0)
        );

        let missing = DepositReport::default();
        assert_eq!(
            missing.into_event(NOW).unwrap_err(),
            DepositValidationError::MissingBin
        );

        let bad_ts: DepositReport =
            serde_json::from_str(r#"{"bin": 1, "ts": "not-a-time"}"#).unwrap();
        assert!(matches!(
            bad_ts.into_event(NOW).unwrap_err(),
            DepositValidationError::InvalidTimestamp(_)
        ));
    }

    #[test]
    fn oversized_delta_is_rejected_both_ways() {
        let at_bound: DepositReport =
            serde_json::from_str(r#"{"bin": 1, "delta_g": -1000000000}"#).unwrap();
        assert_eq!(at_bound.into_event(NOW).unwrap().delta_g, -MAX_DELTA_G_ABS);

        let huge: DepositReport =
            serde_json::from_str(r#"{"bin": 1, "weight_grams": 9223372036854775807}"#).unwrap();
        assert_eq!(
            huge.into_event(NOW).unwrap_err(),
            DepositValidationError::DeltaOutOfRange(i64::MAX)
        );

        let negative: DepositReport =
            serde_json::from_str(r#"{"bin": 2, "delta_g": "-1000000001"}"#).unwrap();
        assert!(matches!(
            negative.into_event(NOW).unwrap_err(),
            DepositValidationError::DeltaOutOfRange(_)
        ));
    }

    #[test]
    fn non_numeric_delta_fails_to_decode() {
        let result = serde_json::from_str::<DepositReport>(r#"{"bin": 1, "delta_g": "lots"}"#);
        assert!(result.is_err());
    }
}
