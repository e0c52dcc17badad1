//! Actuator axis handlers: live state, dashboard commands and the
//! controller's command poll.

use crate::error::AppError;
use crate::response::{ok, ok_with, parse_body};
use crate::state::AppState;
use axum::{body::Bytes, extract::State, http::StatusCode, response::Response};
use log::{debug, info};
use serde::Deserialize;
use serde_json::json;
use sorter_core::model::coerce;
use sorter_core::{AxisStatePatch, CommandPatch};

#[derive(Debug, Default, Deserialize)]
struct JogRequest {
    #[serde(default, deserialize_with = "coerce::opt_f64")]
    mm: Option<f64>,
}

pub async fn get_state(State(state): State<AppState>) -> Response {
    ok(state.axis.snapshot())
}

pub async fn set_state(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let patch: AxisStatePatch = parse_body(&body)?;
    Ok(ok_with(StatusCode::ACCEPTED, state.axis.set_state(patch)))
}

pub async fn jog(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let request: JogRequest = parse_body(&body)?;
    let mm = request.mm.unwrap_or(0.0);
    let snapshot = state.axis.jog(mm);
    Ok(ok(json!({ "moved_mm": mm, "new_position": snapshot.pos_mm })))
}

/// Starts homing; the completion lands on the `axis` topic after the
/// configured delay.
pub async fn home(State(state): State<AppState>) -> Response {
    let (snapshot, _completion) = state.axis.home();
    info!(
        "event=axis_home module=server status=scheduled delay_ms={}",
        state.axis.homing_delay().as_millis()
    );
    ok_with(StatusCode::ACCEPTED, snapshot)
}

pub async fn enqueue_command(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let patch: CommandPatch = parse_body(&body)?;
    if patch.is_empty() {
        debug!("event=command_enqueue module=server status=noop");
    } else {
        state.commands.enqueue(&patch);
    }
    Ok(ok(json!({ "received": true })))
}

/// Destructive read polled by the controller.
pub async fn pending_commands(State(state): State<AppState>) -> Response {
    ok(json!({ "commands": state.commands.drain() }))
}
