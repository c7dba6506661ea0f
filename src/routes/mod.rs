pub mod materials;
pub mod products;
pub mod users;

use crate::state::AppState;
use axum::Router;

pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(materials::routes())
        .merge(products::routes())
        .merge(users::routes())
}
