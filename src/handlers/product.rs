// src/handlers/product.rs
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use sqlx::{PgConnection, PgPool};
use std::collections::HashMap;
use tracing::{error, instrument, warn};

use crate::costing::{self, MaterialSnapshot, Requirement};
use crate::dtos::product::{ProductResponse, SaveProductRequest};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::material::Material;
use crate::models::product::{Product, ProductMaterial};
use crate::state::AppState;

// GET /products - List the caller's products with their requirement sets
#[instrument(skip(state, auth))]
pub async fn get_products(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<ProductResponse>>, AppError> {
    let products = sqlx::query_as::<_, Product>(
        "SELECT id, name, owner_id, approx_sales_volume, profit_margin_percent,
                unit_cost, sale_price, total_profit, created_at
         FROM products WHERE owner_id = $1 ORDER BY name",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db_pool)
    .await
    .map_err(|e| {
        error!(?e, "Failed to fetch products");
        AppError::from(e)
    })?;

    let mut response = Vec::with_capacity(products.len());
    for product in products {
        let requirements = fetch_requirements(&state.db_pool, product.id).await?;
        response.push(ProductResponse::new(product, requirements, Vec::new()));
    }
    Ok(Json(response))
}

// GET /products/:id - Get single product
#[instrument(skip(state, auth), fields(id))]
pub async fn get_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<ProductResponse>, AppError> {
    let product = fetch_owned_product(&state.db_pool, id, auth.user_id)
        .await?
        .ok_or_else(|| AppError::not_found("Product not found"))?;

    let requirements = fetch_requirements(&state.db_pool, product.id).await?;
    Ok(Json(ProductResponse::new(product, requirements, Vec::new())))
}

// POST /products - Create a product: validate, cost it, persist atomically
#[instrument(skip(state, auth, payload))]
pub async fn create_product(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<SaveProductRequest>,
) -> Result<(StatusCode, Json<ProductResponse>), AppError> {
    payload.validate().map_err(AppError::validation)?;

    let mut tx = state.db_pool.begin().await?;

    let (derived, warnings) = cost_requirements(&mut tx, &payload, auth.user_id).await?;

    let product = sqlx::query_as::<_, Product>(
        "INSERT INTO products
            (name, owner_id, approx_sales_volume, profit_margin_percent,
             unit_cost, sale_price, total_profit)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING id, name, owner_id, approx_sales_volume, profit_margin_percent,
                   unit_cost, sale_price, total_profit, created_at",
    )
    .bind(payload.name.trim())
    .bind(auth.user_id)
    .bind(payload.approx_sales_volume)
    .bind(payload.profit_margin_percent)
    .bind(derived.unit_cost)
    .bind(derived.sale_price)
    .bind(derived.total_profit)
    .fetch_one(&mut *tx)
    .await?;

    insert_requirements(&mut tx, product.id, &payload).await?;
    tx.commit().await?;

    let requirements = fetch_requirements(&state.db_pool, product.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(ProductResponse::new(product, requirements, warnings)),
    ))
}

// PUT /products/:id - Replace the requirement set and scalars, recompute
//
// The edit is wholesale: old requirement rows are dropped and the derived
// fields are recomputed from the new set, so repeating the same edit (or
// toggling a material off and back on unchanged) lands on identical values.
#[instrument(skip(state, auth, payload), fields(id))]
pub async fn update_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<SaveProductRequest>,
) -> Result<Json<ProductResponse>, AppError> {
    payload.validate().map_err(AppError::validation)?;

    let mut tx = state.db_pool.begin().await?;

    let existing = sqlx::query_as::<_, Product>(
        "SELECT id, name, owner_id, approx_sales_volume, profit_margin_percent,
                unit_cost, sale_price, total_profit, created_at
         FROM products WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(auth.user_id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or_else(|| AppError::not_found("Product not found"))?;

    let (derived, warnings) = cost_requirements(&mut tx, &payload, auth.user_id).await?;

    let product = sqlx::query_as::<_, Product>(
        "UPDATE products SET
            name = $1, approx_sales_volume = $2, profit_margin_percent = $3,
            unit_cost = $4, sale_price = $5, total_profit = $6
         WHERE id = $7
         RETURNING id, name, owner_id, approx_sales_volume, profit_margin_percent,
                   unit_cost, sale_price, total_profit, created_at",
    )
    .bind(payload.name.trim())
    .bind(payload.approx_sales_volume)
    .bind(payload.profit_margin_percent)
    .bind(derived.unit_cost)
    .bind(derived.sale_price)
    .bind(derived.total_profit)
    .bind(existing.id)
    .fetch_one(&mut *tx)
    .await?;

    sqlx::query("DELETE FROM product_materials WHERE product_id = $1")
        .bind(existing.id)
        .execute(&mut *tx)
        .await?;
    insert_requirements(&mut tx, existing.id, &payload).await?;
    tx.commit().await?;

    let requirements = fetch_requirements(&state.db_pool, product.id).await?;
    Ok(Json(ProductResponse::new(product, requirements, warnings)))
}

// DELETE /products/:id - Delete product (requirement rows cascade)
#[instrument(skip(state, auth), fields(id))]
pub async fn delete_product(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("DELETE FROM products WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Product not found"));
    }

    Ok(Json(()))
}

/// Loads the caller's current material snapshot and runs the costing engine
/// over the requested requirement set. Cross-family units or a non-finite
/// derivation reject the operation; per-material problems become warnings.
async fn cost_requirements(
    tx: &mut PgConnection,
    payload: &SaveProductRequest,
    owner_id: i64,
) -> Result<(costing::Derived, Vec<String>), AppError> {
    let materials = sqlx::query_as::<_, Material>(
        "SELECT id, name, cost, quantity, unit, owner_id, created_at
         FROM materials WHERE owner_id = $1",
    )
    .bind(owner_id)
    .fetch_all(&mut *tx)
    .await?;

    let snapshot: HashMap<i64, MaterialSnapshot> =
        materials.iter().map(|m| (m.id, m.snapshot())).collect();

    let requirements: Vec<Requirement> = payload
        .materials
        .iter()
        .map(|r| Requirement {
            material_id: r.material_id,
            required_quantity: r.required_quantity,
            selected_unit: r.selected_unit,
        })
        .collect();

    let summary = costing::unit_cost(&requirements, &snapshot)?;
    for warning in &summary.warnings {
        warn!(product = %payload.name, %warning, "Costing warning");
    }

    let derived = costing::derive(
        summary.unit_cost,
        payload.profit_margin_percent,
        payload.approx_sales_volume,
    )?
    .rounded();

    let warnings = summary.warnings.iter().map(|w| w.to_string()).collect();
    Ok((derived, warnings))
}

async fn insert_requirements(
    tx: &mut PgConnection,
    product_id: i64,
    payload: &SaveProductRequest,
) -> Result<(), AppError> {
    for req in &payload.materials {
        sqlx::query(
            "INSERT INTO product_materials
                (product_id, material_id, required_quantity, selected_unit)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(product_id)
        .bind(req.material_id)
        .bind(req.required_quantity)
        .bind(req.selected_unit.as_str())
        .execute(&mut *tx)
        .await?;
    }
    Ok(())
}

async fn fetch_requirements(
    pool: &PgPool,
    product_id: i64,
) -> Result<Vec<ProductMaterial>, AppError> {
    Ok(sqlx::query_as::<_, ProductMaterial>(
        "SELECT product_id, material_id, required_quantity, selected_unit
         FROM product_materials WHERE product_id = $1 ORDER BY material_id",
    )
    .bind(product_id)
    .fetch_all(pool)
    .await?)
}

async fn fetch_owned_product(
    pool: &PgPool,
    id: i64,
    owner_id: i64,
) -> Result<Option<Product>, AppError> {
    Ok(sqlx::query_as::<_, Product>(
        "SELECT id, name, owner_id, approx_sales_volume, profit_margin_percent,
                unit_cost, sale_price, total_profit, created_at
         FROM products WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(owner_id)
    .fetch_optional(pool)
    .await?)
}
