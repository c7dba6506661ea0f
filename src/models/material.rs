// src/models/material.rs
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// A registered raw input: `cost` is what the owner paid for `quantity`
/// of the material, measured in `unit` (its native unit).
#[derive(Debug, FromRow)]
pub struct Material {
    pub id: i64,
    pub name: String,
    pub cost: f64,
    pub quantity: f64,
    pub unit: String,
    pub owner_id: i64,
    pub created_at: Option<DateTime<Utc>>,
}

impl Material {
    /// Snapshot handed to the costing engine. An unrecognized stored unit
    /// becomes `native_unit: None`, which the engine skips with a warning.
    pub fn snapshot(&self) -> crate::costing::MaterialSnapshot {
        crate::costing::MaterialSnapshot {
            id: self.id,
            name: self.name.clone(),
            cost: self.cost,
            quantity: self.quantity,
            native_unit: crate::costing::Unit::parse(&self.unit),
        }
    }
}
