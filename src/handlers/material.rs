// src/handlers/material.rs
use axum::{
    extract::{Extension, Path, State},
    http::StatusCode,
    Json,
};
use tracing::{error, instrument};

use crate::dtos::material::{CreateMaterialRequest, MaterialResponse};
use crate::error::AppError;
use crate::middleware::auth::AuthContext;
use crate::models::material::Material;
use crate::state::AppState;

// GET /materials - List the caller's materials
#[instrument(skip(state, auth))]
pub async fn get_materials(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<Vec<MaterialResponse>>, AppError> {
    match sqlx::query_as::<_, Material>(
        "SELECT id, name, cost, quantity, unit, owner_id, created_at
         FROM materials WHERE owner_id = $1 ORDER BY name",
    )
    .bind(auth.user_id)
    .fetch_all(&state.db_pool)
    .await
    {
        Ok(materials) => {
            let response = materials.into_iter().map(MaterialResponse::from).collect();
            Ok(Json(response))
        }
        Err(e) => {
            error!(?e, "Failed to fetch materials");
            Err(e.into())
        }
    }
}

// GET /materials/:id - Get single material
#[instrument(skip(state, auth), fields(id))]
pub async fn get_material(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<MaterialResponse>, AppError> {
    let material = sqlx::query_as::<_, Material>(
        "SELECT id, name, cost, quantity, unit, owner_id, created_at
         FROM materials WHERE id = $1 AND owner_id = $2",
    )
    .bind(id)
    .bind(auth.user_id)
    .fetch_optional(&state.db_pool)
    .await?
    .ok_or_else(|| AppError::not_found("Material not found"))?;

    Ok(Json(MaterialResponse::from(material)))
}

// POST /materials - Register a new material
#[instrument(skip(state, auth, payload))]
pub async fn create_material(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
    Json(payload): Json<CreateMaterialRequest>,
) -> Result<(StatusCode, Json<MaterialResponse>), AppError> {
    payload.validate().map_err(AppError::validation)?;

    let material = sqlx::query_as::<_, Material>(
        "INSERT INTO materials (name, cost, quantity, unit, owner_id)
         VALUES ($1, $2, $3, $4, $5)
         RETURNING id, name, cost, quantity, unit, owner_id, created_at",
    )
    .bind(payload.name.trim())
    .bind(payload.cost)
    .bind(payload.quantity)
    .bind(payload.unit.as_str())
    .bind(auth.user_id)
    .fetch_one(&state.db_pool)
    .await?;

    Ok((StatusCode::CREATED, Json(MaterialResponse::from(material))))
}

// DELETE /materials/:id - Delete material
//
// Products keep their requirement rows; the dangling reference surfaces as
// a missing-material warning the next time such a product is recalculated.
#[instrument(skip(state, auth), fields(id))]
pub async fn delete_material(
    Path(id): Path<i64>,
    State(state): State<AppState>,
    Extension(auth): Extension<AuthContext>,
) -> Result<Json<()>, AppError> {
    let result = sqlx::query("DELETE FROM materials WHERE id = $1 AND owner_id = $2")
        .bind(id)
        .bind(auth.user_id)
        .execute(&state.db_pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::not_found("Material not found"));
    }

    Ok(Json(()))
}
