// src/dtos/material.rs
use crate::costing::Unit;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateMaterialRequest {
    pub name: String,
    pub cost: f64,
    pub quantity: f64,
    pub unit: Unit,
}

impl CreateMaterialRequest {
    /// Mirrors the registration form rules: a name, and strictly positive
    /// finite cost and quantity. The unit is already a member of the closed
    /// enum by the time deserialization succeeds.
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Material name is required".into());
        }
        if !self.cost.is_finite() || self.cost <= 0.0 {
            return Err("Cost must be a positive number".into());
        }
        if !self.quantity.is_finite() || self.quantity <= 0.0 {
            return Err("Quantity must be a positive number".into());
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct MaterialResponse {
    pub id: i64,
    pub name: String,
    pub cost: f64,
    pub quantity: f64,
    pub unit: String,
    pub created_at: Option<String>,
}

impl From<crate::models::material::Material> for MaterialResponse {
    fn from(material: crate::models::material::Material) -> Self {
        Self {
            id: material.id,
            name: material.name,
            cost: material.cost,
            quantity: material.quantity,
            unit: material.unit,
            created_at: material.created_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> CreateMaterialRequest {
        CreateMaterialRequest {
            name: "flour".into(),
            cost: 10.0,
            quantity: 2.0,
            unit: Unit::Kilograms,
        }
    }

    #[test]
    fn accepts_a_well_formed_material() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_blank_name_and_non_positive_numbers() {
        let mut m = valid();
        m.name = "   ".into();
        assert!(m.validate().is_err());

        let mut m = valid();
        m.cost = 0.0;
        assert!(m.validate().is_err());

        let mut m = valid();
        m.quantity = -1.0;
        assert!(m.validate().is_err());

        let mut m = valid();
        m.cost = f64::NAN;
        assert!(m.validate().is_err());
    }

    #[test]
    fn unit_names_deserialize_lowercase() {
        let m: CreateMaterialRequest = serde_json::from_str(
            r#"{"name":"milk","cost":4.5,"quantity":2,"unit":"liters"}"#,
        )
        .unwrap();
        assert_eq!(m.unit, Unit::Liters);
        assert!(serde_json::from_str::<CreateMaterialRequest>(
            r#"{"name":"milk","cost":4.5,"quantity":2,"unit":"gallons"}"#
        )
        .is_err());
    }

    #[test]
    fn non_numeric_cost_fails_deserialization() {
        assert!(serde_json::from_str::<CreateMaterialRequest>(
            r#"{"name":"milk","cost":"abc","quantity":2,"unit":"liters"}"#
        )
        .is_err());
    }
}
