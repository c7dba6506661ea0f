// src/models/product.rs
use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Product row. The three derived columns are stored rounded to two places
/// and are always recomputed from the requirement rows on every edit; they
/// are never written from client input.
#[derive(Debug, FromRow)]
pub struct Product {
    pub id: i64,
    pub name: String,
    pub owner_id: i64,
    pub approx_sales_volume: f64,
    pub profit_margin_percent: f64,
    pub unit_cost: f64,
    pub sale_price: f64,
    pub total_profit: f64,
    pub created_at: Option<DateTime<Utc>>,
}

/// One row of product_materials: how much of a material one unit of the
/// product consumes, in the unit the preparer selected.
#[derive(Debug, FromRow)]
pub struct ProductMaterial {
    pub product_id: i64,
    pub material_id: i64,
    pub required_quantity: f64,
    pub selected_unit: String,
}
