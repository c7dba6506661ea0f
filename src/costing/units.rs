// src/costing/units.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Measurement units a material can be purchased or consumed in.
///
/// Closed set: two mass units, two volume units, and a discrete "units"
/// family for things counted by the piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kilograms,
    Grams,
    Liters,
    Milliliters,
    Units,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnitFamily {
    Mass,
    Volume,
    Discrete,
}

impl Unit {
    pub const ALL: [Unit; 5] = [
        Unit::Kilograms,
        Unit::Grams,
        Unit::Liters,
        Unit::Milliliters,
        Unit::Units,
    ];

    /// Conversion factor relative to the family's smallest unit
    /// (grams for mass, milliliters for volume, 1 for discrete).
    pub fn factor(self) -> f64 {
        match self {
            Unit::Kilograms => 1000.0,
            Unit::Grams => 1.0,
            Unit::Liters => 1000.0,
            Unit::Milliliters => 1.0,
            Unit::Units => 1.0,
        }
    }

    pub fn family(self) -> UnitFamily {
        match self {
            Unit::Kilograms | Unit::Grams => UnitFamily::Mass,
            Unit::Liters | Unit::Milliliters => UnitFamily::Volume,
            Unit::Units => UnitFamily::Discrete,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Unit::Kilograms => "kilograms",
            Unit::Grams => "grams",
            Unit::Liters => "liters",
            Unit::Milliliters => "milliliters",
            Unit::Units => "units",
        }
    }

    /// Parses the stored lowercase unit name. Returns `None` for anything
    /// outside the closed set (bad rows are skipped by the engine, not fatal).
    pub fn parse(s: &str) -> Option<Unit> {
        match s {
            "kilograms" => Some(Unit::Kilograms),
            "grams" => Some(Unit::Grams),
            "liters" => Some(Unit::Liters),
            "milliliters" => Some(Unit::Milliliters),
            "units" => Some(Unit::Units),
            _ => None,
        }
    }
}

impl fmt::Display for Unit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ConvertError {
    /// selected unit and native unit belong to different families
    /// (e.g. liters requested of a material purchased in grams).
    FamilyMismatch { selected: Unit, native: Unit },
    /// The conversion produced a non-finite quantity.
    NonFinite,
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::FamilyMismatch { selected, native } => write!(
                f,
                "cannot convert {selected} to {native}: units belong to different families"
            ),
            ConvertError::NonFinite => write!(f, "conversion produced a non-finite quantity"),
        }
    }
}

impl std::error::Error for ConvertError {}

/// Converts `quantity` expressed in `selected` into the material's `native`
/// unit: `quantity * factor(selected) / factor(native)`.
///
/// Cross-family pairs are rejected rather than numerically computed; the
/// result would be physically meaningless.
pub fn convert(quantity: f64, selected: Unit, native: Unit) -> Result<f64, ConvertError> {
    if selected.family() != native.family() {
        return Err(ConvertError::FamilyMismatch { selected, native });
    }
    let converted = quantity * (selected.factor() / native.factor());
    if !converted.is_finite() {
        return Err(ConvertError::NonFinite);
    }
    Ok(converted)
}
