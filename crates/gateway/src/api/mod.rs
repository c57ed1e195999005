pub mod auth;
pub mod callback;
pub mod health;
pub mod sessions;

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the API router.
///
/// The webhook callback authenticates with the channel signature and the
/// health probe is open.  Everything under `/v1/sessions` sits behind the
/// bearer-token middleware.
pub fn router(state: AppState) -> Router<AppState> {
    let public = Router::new()
        .route(&state.config.server.callback_path, post(callback::callback))
        .route("/v1/health", get(health::health));

    let protected = Router::new()
        .route("/v1/sessions", get(sessions::list_sessions))
        .route_layer(middleware::from_fn_with_state(
            state,
            auth::require_api_token,
        ));

    public.merge(protected)
}
