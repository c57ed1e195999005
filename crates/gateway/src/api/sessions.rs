use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /v1/sessions
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let mut entries = state.sessions.list();
    entries.sort_by_key(|e| e.created_at());

    let sessions: Vec<serde_json::Value> = entries
        .iter()
        .map(|e| {
            serde_json::json!({
                "identity": e.identity.as_str(),
                "kind": e.identity.kind(),
                "session_id": e.session_id(),
                "created_at": e.created_at().to_rfc3339(),
                "exchanges": e.session.exchanges(),
            })
        })
        .collect();

    Json(serde_json::json!({
        "count": sessions.len(),
        "sessions": sessions,
    }))
}
