use axum::{
    middleware::from_fn,
    routing::{get, post},
    Router,
};
use crate::handlers::user::{get_me, login_user, register_user};
use crate::middleware::auth::require_auth;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    let public = Router::new()
        .route("/auth/register", post(register_user))
        .route("/auth/login", post(login_user));

    let protected = Router::new()
        .route("/auth/me", get(get_me))
        .route_layer(from_fn(require_auth));

    public.merge(protected)
}
