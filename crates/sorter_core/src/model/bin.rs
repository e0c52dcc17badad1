//! Bin reference data and derived fill views.
//!
//! # Invariants
//! - The bin set is fixed to ids `1..=3`.
//! - `grams(bin)` is the all-time sum of ledger deltas for the bin.
//! - `percent(bin) = round(grams / (capacity_kg * 1000) * 100)`, not clamped:
//!   an over-filled bin reports more than 100.

use serde::{Deserialize, Serialize};

/// Ledger-level bin identifier.
pub type BinId = i64;

/// The only bin ids the system recognizes, in display order.
pub const CANONICAL_BIN_IDS: [BinId; 3] = [1, 2, 3];

const DEFAULT_CAPACITY_KG: f64 = 5.0;

/// Static reference row for one physical receptacle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bin {
    pub id: BinId,
    pub name: String,
    /// Declared capacity; always > 0 for canonical rows.
    pub capacity_kg: f64,
}

impl Bin {
    /// Default reference rows used to seed and repair the `bins` table.
    pub fn canonical() -> Vec<Bin> {
        CANONICAL_BIN_IDS
            .iter()
            .map(|id| Self::canonical_default(*id))
            .collect()
    }

    /// Default row for a canonical id. Non-canonical ids get a generic name.
    pub fn canonical_default(id: BinId) -> Bin {
        let name = match id {
            1 => "Metal",
            2 => "Orgánico",
            3 => "Resto",
            _ => "Desconocido",
        };
        Bin {
            id,
            name: name.to_string(),
            capacity_kg: DEFAULT_CAPACITY_KG,
        }
    }
}

/// Returns whether `id` belongs to the canonical bin set.
pub fn is_canonical_bin(id: BinId) -> bool {
    CANONICAL_BIN_IDS.contains(&id)
}

/// Live fill view for one bin, computed at read time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinView {
    pub id: BinId,
    pub name: String,
    pub grams: i64,
    pub percent: i64,
    pub capacity_kg: f64,
}

impl BinView {
    pub fn from_bin(bin: &Bin, grams: i64) -> Self {
        Self {
            id: bin.id,
            name: bin.name.clone(),
            grams,
            percent: fill_percent(grams, bin.capacity_kg),
            capacity_kg: bin.capacity_kg,
        }
    }
}

/// Rounded fill percentage of `grams` against a capacity in kilograms.
///
/// A non-positive capacity yields 0 instead of dividing by zero.
pub fn fill_percent(grams: i64, capacity_kg: f64) -> i64 {
    if capacity_kg <= 0.0 || !capacity_kg.is_finite() {
        return 0;
    }
    (grams as f64 / (capacity_kg * 1000.0) * 100.0).round() as i64
}
