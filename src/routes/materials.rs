use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use crate::handlers::material::{create_material, delete_material, get_material, get_materials};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/materials", get(get_materials).post(create_material))
        .route("/materials/{id}", get(get_material).delete(delete_material))
        .route_layer(from_fn(require_auth))
}
