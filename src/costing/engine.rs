// src/costing/engine.rs
//
// The costing engine proper: pure, synchronous functions over an explicit
// snapshot of materials. No I/O, no database, no shared state; callers
// re-invoke it with fresh inputs whenever their view of the data changes.
use crate::costing::units::{convert, ConvertError, Unit};
use std::collections::HashMap;
use std::fmt;

/// A material as the engine sees it: the purchase record that fixes its
/// base cost per native unit. `native_unit` is `None` when the stored unit
/// name failed to parse; that material's contributions are skipped.
#[derive(Debug, Clone)]
pub struct MaterialSnapshot {
    pub id: i64,
    pub name: String,
    pub cost: f64,
    pub quantity: f64,
    pub native_unit: Option<Unit>,
}

impl MaterialSnapshot {
    /// Price of one native unit of the material: cost / quantity.
    pub fn base_cost_per_unit(&self) -> f64 {
        self.cost / self.quantity
    }
}

/// How much of a material one unit of a product consumes, in a unit the
/// preparer picked (same family as the material's native unit).
#[derive(Debug, Clone, PartialEq)]
pub struct Requirement {
    pub material_id: i64,
    pub required_quantity: f64,
    pub selected_unit: Unit,
}

/// Per-material problems recovered by skipping that contribution.
/// These ride along in API responses and are logged; they never abort
/// the aggregate computation.
#[derive(Debug, Clone, PartialEq)]
pub enum CostingWarning {
    /// The requirement references a material that no longer resolves
    /// (deleted after the product was composed). Contribution counts as zero.
    MissingMaterial { material_id: i64 },
    /// Cost-per-unit or conversion came out non-finite or negative,
    /// or the stored unit name is not one of the recognized five.
    InvalidUnitData { material_id: i64, name: String },
    /// Every contribution was skipped (or there were none); the computed
    /// unit cost of 0 is a data-quality signal, not a real zero-cost product.
    NoValidContributions,
}

impl fmt::Display for CostingWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostingWarning::MissingMaterial { material_id } => write!(
                f,
                "material {material_id} no longer exists; its contribution was treated as zero"
            ),
            CostingWarning::InvalidUnitData { material_id, name } => write!(
                f,
                "material {material_id} ({name}) has invalid cost or unit data; skipped"
            ),
            CostingWarning::NoValidContributions => {
                write!(f, "no valid material contributions; unit cost of 0.00 is not meaningful")
            }
        }
    }
}

/// Fatal costing failures. These reject the whole create/update operation;
/// nothing partial is persisted.
#[derive(Debug, Clone, PartialEq)]
pub enum CostingError {
    /// Selected unit and the material's native unit belong to different
    /// families. Caught at requirement-edit time.
    FamilyMismatch {
        material: String,
        selected: Unit,
        native: Unit,
    },
    /// profit margin or sales volume is not a finite number.
    NonFiniteInput { field: &'static str },
    /// A derived value (sale price or total profit) came out non-finite.
    NonFiniteResult,
}

impl fmt::Display for CostingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostingError::FamilyMismatch {
                material,
                selected,
                native,
            } => write!(
                f,
                "material '{material}' is measured in {native}; {selected} is not a compatible unit"
            ),
            CostingError::NonFiniteInput { field } => {
                write!(f, "{field} must be a finite number")
            }
            CostingError::NonFiniteResult => {
                write!(f, "derived price values are not finite; check material data")
            }
        }
    }
}

impl std::error::Error for CostingError {}

/// Result of the aggregation step: the full-precision unit cost plus any
/// per-material warnings that were recovered by skipping.
#[derive(Debug, Clone, PartialEq)]
pub struct CostSummary {
    pub unit_cost: f64,
    pub warnings: Vec<CostingWarning>,
}

/// Sums each requirement's share of its material's purchase cost:
/// `(cost / quantity) * convert(required_quantity, selected, native)`.
///
/// A requirement whose material is missing, or whose numbers come out
/// non-finite or negative, is skipped with a warning. A cross-family unit
/// pair is a hard error: it means the requirement itself is malformed.
pub fn unit_cost(
    requirements: &[Requirement],
    materials: &HashMap<i64, MaterialSnapshot>,
) -> Result<CostSummary, CostingError> {
    let mut total = 0.0f64;
    let mut valid = 0usize;
    let mut warnings = Vec::new();

    for req in requirements {
        let Some(material) = materials.get(&req.material_id) else {
            warnings.push(CostingWarning::MissingMaterial {
                material_id: req.material_id,
            });
            continue;
        };

        let Some(native_unit) = material.native_unit else {
            warnings.push(CostingWarning::InvalidUnitData {
                material_id: material.id,
                name: material.name.clone(),
            });
            continue;
        };

        let converted = match convert(req.required_quantity, req.selected_unit, native_unit) {
            Ok(q) => q,
            Err(ConvertError::FamilyMismatch { selected, native }) => {
                return Err(CostingError::FamilyMismatch {
                    material: material.name.clone(),
                    selected,
                    native,
                });
            }
            Err(ConvertError::NonFinite) => {
                warnings.push(CostingWarning::InvalidUnitData {
                    material_id: material.id,
                    name: material.name.clone(),
                });
                continue;
            }
        };

        let base_cost = material.base_cost_per_unit();
        if !base_cost.is_finite() || base_cost < 0.0 || converted < 0.0 {
            warnings.push(CostingWarning::InvalidUnitData {
                material_id: material.id,
                name: material.name.clone(),
            });
            continue;
        }

        total += base_cost * converted;
        valid += 1;
    }

    if valid == 0 {
        warnings.push(CostingWarning::NoValidContributions);
    }

    Ok(CostSummary {
        unit_cost: total,
        warnings,
    })
}

/// `unit_cost * (1 + margin/100)`.
pub fn sale_price(unit_cost: f64, profit_margin_percent: f64) -> f64 {
    unit_cost * (1.0 + profit_margin_percent / 100.0)
}

/// `(sale_price - unit_cost) * approx_sales_volume`.
pub fn total_profit(sale_price: f64, unit_cost: f64, approx_sales_volume: f64) -> f64 {
    (sale_price - unit_cost) * approx_sales_volume
}

/// The three derived product fields, held at full precision. Rounding to
/// two places happens once, at the storage/display boundary, never between
/// chained recalculations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Derived {
    pub unit_cost: f64,
    pub sale_price: f64,
    pub total_profit: f64,
}

impl Derived {
    pub fn rounded(self) -> Derived {
        Derived {
            unit_cost: round2(self.unit_cost),
            sale_price: round2(self.sale_price),
            total_profit: round2(self.total_profit),
        }
    }
}

/// Derives sale price and projected profit from an already-aggregated unit
/// cost. Non-finite inputs or results reject the whole operation.
pub fn derive(
    unit_cost: f64,
    profit_margin_percent: f64,
    approx_sales_volume: f64,
) -> Result<Derived, CostingError> {
    if !profit_margin_percent.is_finite() {
        return Err(CostingError::NonFiniteInput {
            field: "profit margin",
        });
    }
    if !approx_sales_volume.is_finite() {
        return Err(CostingError::NonFiniteInput {
            field: "approximate sales volume",
        });
    }
    if !unit_cost.is_finite() {
        return Err(CostingError::NonFiniteResult);
    }

    let price = sale_price(unit_cost, profit_margin_percent);
    let profit = total_profit(price, unit_cost, approx_sales_volume);
    if !price.is_finite() || !profit.is_finite() {
        return Err(CostingError::NonFiniteResult);
    }

    Ok(Derived {
        unit_cost,
        sale_price: price,
        total_profit: profit,
    })
}

pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Formats a derived value the way it is presented and stored: fixed to
/// two decimal places.
pub fn fixed2(value: f64) -> String {
    format!("{value:.2}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flour_10_for_2kg() -> MaterialSnapshot {
        MaterialSnapshot {
            id: 1,
            name: "flour".into(),
            cost: 10.0,
            quantity: 2.0,
            native_unit: Some(Unit::Kilograms),
        }
    }

    fn snapshot(materials: Vec<MaterialSnapshot>) -> HashMap<i64, MaterialSnapshot> {
        materials.into_iter().map(|m| (m.id, m)).collect()
    }

    #[test]
    fn base_cost_per_unit_is_cost_over_quantity() {
        let m = flour_10_for_2kg();
        assert_eq!(m.base_cost_per_unit(), 5.0);
        // pure: repeated calls agree
        assert_eq!(m.base_cost_per_unit(), m.base_cost_per_unit());
    }

    #[test]
    fn worked_example_from_the_product_form() {
        // cost 10 for 2 kg, 500 g required -> 5/kg * 0.5 kg = 2.5
        let materials = snapshot(vec![flour_10_for_2kg()]);
        let reqs = [Requirement {
            material_id: 1,
            required_quantity: 500.0,
            selected_unit: Unit::Grams,
        }];
        let summary = unit_cost(&reqs, &materials).unwrap();
        assert_eq!(summary.unit_cost, 2.5);
        assert!(summary.warnings.is_empty());

        let derived = derive(summary.unit_cost, 20.0, 100.0).unwrap();
        assert_eq!(fixed2(derived.sale_price), "3.00");
        assert_eq!(fixed2(derived.total_profit), "50.00");
    }

    #[test]
    fn empty_requirement_set_costs_zero_with_warning() {
        let summary = unit_cost(&[], &HashMap::new()).unwrap();
        assert_eq!(summary.unit_cost, 0.0);
        assert_eq!(summary.warnings, vec![CostingWarning::NoValidContributions]);
    }

    #[test]
    fn missing_material_is_skipped_not_fatal() {
        let materials = snapshot(vec![flour_10_for_2kg()]);
        let reqs = [
            Requirement {
                material_id: 99,
                required_quantity: 1.0,
                selected_unit: Unit::Units,
            },
            Requirement {
                material_id: 1,
                required_quantity: 1.0,
                selected_unit: Unit::Kilograms,
            },
        ];
        let summary = unit_cost(&reqs, &materials).unwrap();
        assert_eq!(summary.unit_cost, 5.0);
        assert_eq!(
            summary.warnings,
            vec![CostingWarning::MissingMaterial { material_id: 99 }]
        );
    }

    #[test]
    fn unparseable_stored_unit_is_skipped() {
        let mut bad = flour_10_for_2kg();
        bad.native_unit = None;
        let materials = snapshot(vec![bad]);
        let reqs = [Requirement {
            material_id: 1,
            required_quantity: 1.0,
            selected_unit: Unit::Grams,
        }];
        let summary = unit_cost(&reqs, &materials).unwrap();
        assert_eq!(summary.unit_cost, 0.0);
        assert!(matches!(
            summary.warnings[0],
            CostingWarning::InvalidUnitData { material_id: 1, .. }
        ));
        assert!(summary.warnings.contains(&CostingWarning::NoValidContributions));
    }

    #[test]
    fn zero_quantity_material_is_skipped_as_invalid() {
        // cost / 0 is +inf, which must not poison the sum
        let mut degenerate = flour_10_for_2kg();
        degenerate.quantity = 0.0;
        let mut sugar = flour_10_for_2kg();
        sugar.id = 2;
        sugar.name = "sugar".into();
        let materials = snapshot(vec![degenerate, sugar]);
        let reqs = [
            Requirement {
                material_id: 1,
                required_quantity: 100.0,
                selected_unit: Unit::Grams,
            },
            Requirement {
                material_id: 2,
                required_quantity: 1.0,
                selected_unit: Unit::Kilograms,
            },
        ];
        let summary = unit_cost(&reqs, &materials).unwrap();
        assert_eq!(summary.unit_cost, 5.0);
        assert_eq!(summary.warnings.len(), 1);
    }

    #[test]
    fn cross_family_requirement_is_fatal() {
        let materials = snapshot(vec![flour_10_for_2kg()]);
        let reqs = [Requirement {
            material_id: 1,
            required_quantity: 1.0,
            selected_unit: Unit::Liters,
        }];
        let err = unit_cost(&reqs, &materials).unwrap_err();
        assert!(matches!(err, CostingError::FamilyMismatch { .. }));
    }

    #[test]
    fn recompute_is_idempotent_under_noop_edit_cycles() {
        // toggling a material off then back on with the same quantity/unit
        // must reproduce the original unit cost exactly
        let materials = snapshot(vec![flour_10_for_2kg()]);
        let req = Requirement {
            material_id: 1,
            required_quantity: 750.0,
            selected_unit: Unit::Grams,
        };
        let before = unit_cost(std::slice::from_ref(&req), &materials).unwrap();
        let removed = unit_cost(&[], &materials).unwrap();
        assert_eq!(removed.unit_cost, 0.0);
        let after = unit_cost(&[req], &materials).unwrap();
        assert_eq!(before.unit_cost, after.unit_cost);
    }

    #[test]
    fn derivation_uses_full_precision_until_the_end() {
        // 1/3-ish unit cost: rounding before the margin step would drift
        let unit = 10.0 / 3.0;
        let derived = derive(unit, 30.0, 3.0).unwrap();
        assert!((derived.sale_price - unit * 1.3).abs() < 1e-12);
        assert!((derived.total_profit - (derived.sale_price - unit) * 3.0).abs() < 1e-12);
        let rounded = derived.rounded();
        assert_eq!(fixed2(rounded.unit_cost), "3.33");
        assert_eq!(fixed2(rounded.sale_price), "4.33");
        assert_eq!(fixed2(rounded.total_profit), "3.00");
    }

    #[test]
    fn non_finite_inputs_reject_the_derivation() {
        assert_eq!(
            derive(1.0, f64::NAN, 10.0).unwrap_err(),
            CostingError::NonFiniteInput {
                field: "profit margin"
            }
        );
        assert_eq!(
            derive(1.0, 20.0, f64::INFINITY).unwrap_err(),
            CostingError::NonFiniteInput {
                field: "approximate sales volume"
            }
        );
        assert_eq!(
            derive(f64::NAN, 20.0, 10.0).unwrap_err(),
            CostingError::NonFiniteResult
        );
    }

    #[test]
    fn zero_margin_and_zero_volume_are_valid() {
        let derived = derive(2.5, 0.0, 0.0).unwrap();
        assert_eq!(derived.sale_price, 2.5);
        assert_eq!(derived.total_profit, 0.0);
    }

    #[test]
    fn warnings_render_for_the_api_response() {
        let w = CostingWarning::MissingMaterial { material_id: 7 };
        assert!(w.to_string().contains("material 7"));
        let e = CostingError::FamilyMismatch {
            material: "milk".into(),
            selected: Unit::Grams,
            native: Unit::Liters,
        };
        assert!(e.to_string().contains("milk"));
    }
}
