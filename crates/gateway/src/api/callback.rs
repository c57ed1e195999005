//! Webhook callback endpoint.
//!
//! The raw body is verified against `X-Line-Signature` before it is parsed.
//! The whole batch is dispatched before the response is written, so the
//! status code reflects only signature and envelope problems; per-event
//! failures are handled inside the dispatcher.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Json, Response};

use lr_line::signature::{verify_signature, SIGNATURE_HEADER};
use lr_line::CallbackRequest;

use crate::state::AppState;

fn api_error(status: StatusCode, msg: impl Into<String>) -> Response {
    (status, Json(serde_json::json!({ "error": msg.into() }))).into_response()
}

pub async fn callback(State(state): State<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    if let Some(secret) = &state.channel_secret {
        let signature = headers.get(SIGNATURE_HEADER).and_then(|v| v.to_str().ok());
        if let Err(e) = verify_signature(secret, &body, signature) {
            tracing::warn!(error = %e, "webhook signature rejected");
            return api_error(StatusCode::BAD_REQUEST, "invalid signature");
        }
    }

    let request: CallbackRequest = match serde_json::from_slice(&body) {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!(error = %e, "malformed webhook body");
            return api_error(StatusCode::BAD_REQUEST, format!("malformed body: {e}"));
        }
    };

    tracing::debug!(
        destination = request.destination.as_deref().unwrap_or(""),
        events = request.events.len(),
        "webhook batch received"
    );

    let outcomes = state.dispatcher.dispatch(&request.events).await;

    Json(serde_json::json!({ "events": outcomes.len() })).into_response()
}
