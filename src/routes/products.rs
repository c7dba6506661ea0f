use axum::{
    middleware::from_fn,
    routing::get,
    Router,
};
use crate::handlers::product::{
    create_product, delete_product, get_product, get_products, update_product,
};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/products", get(get_products).post(create_product))
        .route(
            "/products/{id}",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route_layer(from_fn(require_auth))
}
