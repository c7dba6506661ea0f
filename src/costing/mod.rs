// src/costing/mod.rs
//
// Pure costing engine: unit conversion, cost aggregation, price derivation.
// Everything here is synchronous and side-effect free; the HTTP handlers
// feed it snapshots and persist what comes back.
pub mod engine;
pub mod units;

pub use engine::{
    derive, fixed2, round2, unit_cost, CostSummary, CostingError, CostingWarning, Derived,
    MaterialSnapshot, Requirement,
};
pub use units::{convert, Unit, UnitFamily};
