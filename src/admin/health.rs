use axum::extract::State;
use axum::response::Json;
use serde_json::{Value, json};

use crate::state::AppState;

pub async fn health_check(State(state): State<AppState>) -> Json<Value> {
    let storage_ok = state.kv.get(&state.config.storage.content_key).await.is_ok();

    let status = if storage_ok { "ok" } else { "degraded" };

    Json(json!({
        "status": status,
        "version": env!("CARGO_PKG_VERSION"),
        "storage": if storage_ok { "connected" } else { "error" },
        "backend": if state.backend.is_configured() { "configured" } else { "unconfigured" },
        "contact": if state.contact.is_simulated() { "simulated" } else { "live" },
    }))
}
