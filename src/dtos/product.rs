// src/dtos/product.rs
use crate::costing::{fixed2, Unit};
use crate::models::product::{Product, ProductMaterial};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct RequirementInput {
    pub material_id: i64,
    pub required_quantity: f64,
    pub selected_unit: Unit,
}

/// Payload for both create and update: an edit replaces the whole
/// requirement set and the editable scalars, and the server recomputes the
/// derived fields from scratch. Clients cannot send unit_cost/sale_price/
/// total_profit at all.
#[derive(Debug, Deserialize)]
pub struct SaveProductRequest {
    pub name: String,
    pub approx_sales_volume: f64,
    pub profit_margin_percent: f64,
    pub materials: Vec<RequirementInput>,
}

impl SaveProductRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err("Product name is required".into());
        }
        if !self.approx_sales_volume.is_finite() || self.approx_sales_volume < 0.0 {
            return Err("Approximate sales volume must be a non-negative number".into());
        }
        if !self.profit_margin_percent.is_finite() {
            return Err("Profit margin must be a number".into());
        }
        if self.materials.is_empty() {
            return Err("Select at least one material for the product".into());
        }
        let mut seen = std::collections::HashSet::new();
        for req in &self.materials {
            if !req.required_quantity.is_finite() || req.required_quantity <= 0.0 {
                return Err(format!(
                    "Required quantity for material {} must be a positive number",
                    req.material_id
                ));
            }
            if !seen.insert(req.material_id) {
                return Err(format!("Material {} is listed twice", req.material_id));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
pub struct RequirementResponse {
    pub material_id: i64,
    pub required_quantity: f64,
    pub selected_unit: String,
}

impl From<ProductMaterial> for RequirementResponse {
    fn from(pm: ProductMaterial) -> Self {
        Self {
            material_id: pm.material_id,
            required_quantity: pm.required_quantity,
            selected_unit: pm.selected_unit,
        }
    }
}

/// Derived money fields go out as strings fixed to two decimal places,
/// the same presentation the stored values use.
#[derive(Debug, Serialize)]
pub struct ProductResponse {
    pub id: i64,
    pub name: String,
    pub approx_sales_volume: f64,
    pub profit_margin_percent: f64,
    pub unit_cost: String,
    pub sale_price: String,
    pub total_profit: String,
    pub materials: Vec<RequirementResponse>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub created_at: Option<String>,
}

impl ProductResponse {
    pub fn new(product: Product, materials: Vec<ProductMaterial>, warnings: Vec<String>) -> Self {
        Self {
            id: product.id,
            name: product.name,
            approx_sales_volume: product.approx_sales_volume,
            profit_margin_percent: product.profit_margin_percent,
            unit_cost: fixed2(product.unit_cost),
            sale_price: fixed2(product.sale_price),
            total_profit: fixed2(product.total_profit),
            materials: materials.into_iter().map(RequirementResponse::from).collect(),
            warnings,
            created_at: product.created_at.map(|dt| dt.to_rfc3339()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid() -> SaveProductRequest {
        SaveProductRequest {
            name: "bread".into(),
            approx_sales_volume: 100.0,
            profit_margin_percent: 20.0,
            materials: vec![RequirementInput {
                material_id: 1,
                required_quantity: 500.0,
                selected_unit: Unit::Grams,
            }],
        }
    }

    #[test]
    fn accepts_a_well_formed_product() {
        assert!(valid().validate().is_ok());
    }

    #[test]
    fn rejects_missing_name_or_materials() {
        let mut p = valid();
        p.name = "".into();
        assert!(p.validate().is_err());

        let mut p = valid();
        p.materials.clear();
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_bad_scalars() {
        let mut p = valid();
        p.approx_sales_volume = -5.0;
        assert!(p.validate().is_err());

        let mut p = valid();
        p.approx_sales_volume = f64::NAN;
        assert!(p.validate().is_err());

        let mut p = valid();
        p.profit_margin_percent = f64::INFINITY;
        assert!(p.validate().is_err());

        let mut p = valid();
        p.materials[0].required_quantity = 0.0;
        assert!(p.validate().is_err());
    }

    #[test]
    fn rejects_duplicate_material_entries() {
        let mut p = valid();
        p.materials.push(RequirementInput {
            material_id: 1,
            required_quantity: 200.0,
            selected_unit: Unit::Grams,
        });
        assert!(p.validate().is_err());
    }

    #[test]
    fn non_numeric_margin_fails_deserialization() {
        // the original form let these arrive as strings and rejected at save
        // time; here the type boundary rejects them before the handler runs
        assert!(serde_json::from_str::<SaveProductRequest>(
            r#"{"name":"bread","approx_sales_volume":100,
                "profit_margin_percent":"twenty","materials":[]}"#
        )
        .is_err());
    }

    #[test]
    fn zero_volume_and_zero_margin_are_allowed() {
        let mut p = valid();
        p.approx_sales_volume = 0.0;
        p.profit_margin_percent = 0.0;
        assert!(p.validate().is_ok());
    }
}
