use serde::Serialize;

/// Structured trace events emitted across all relay crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    EventReceived {
        kind: String,
        identity: String,
    },
    SessionResolved {
        identity: String,
        session_id: String,
        is_new: bool,
    },
    SessionReset {
        identity: String,
        old_session_id: Option<String>,
        new_session_id: String,
    },
    LlmRequest {
        model: String,
        kind: String,
        duration_ms: u64,
        prompt_tokens: Option<u32>,
        completion_tokens: Option<u32>,
    },
    ReplySent {
        identity: String,
        chars: usize,
    },
    MessageRecorded {
        identity: String,
        role: String,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "lr_event");
    }
}
