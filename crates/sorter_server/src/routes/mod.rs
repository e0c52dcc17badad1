//! REST surface under `/api`.

mod axis;
mod inventory;
mod settings;

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use std::collections::HashMap;

pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(inventory::ping))
        .route("/bins", get(inventory::bins))
        .route("/deposits", post(inventory::record_deposit))
        .route("/deposits/recent", get(inventory::recent_deposits))
        .route("/deposits/history", get(inventory::deposit_history))
        .route("/weights", post(inventory::weights))
        .route("/config", get(settings::get_config).post(settings::update_config))
        .route("/axis", get(settings::firmware_axis))
        .route("/axis/state", get(axis::get_state).post(axis::set_state))
        .route("/axis/jog", post(axis::jog))
        .route("/axis/home", post(axis::home))
        .route("/axis/command", post(axis::enqueue_command))
        .route("/axis/pending_commands", get(axis::pending_commands))
}

/// Reads an optional non-negative integer query parameter.
fn query_u32(params: &HashMap<String, String>, key: &str) -> Result<Option<u32>, AppError> {
    let Some(raw) = params.get(key).map(|raw| raw.trim()) else {
        return Ok(None);
    };
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| {
        AppError::Validation(format!("{key} must be a non-negative integer, got `{raw}`"))
    })
}
