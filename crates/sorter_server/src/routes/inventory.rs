//! Bin fill, deposit ledger and weight telemetry handlers.

use super::query_u32;
use crate::error::AppError;
use crate::response::{ok, ok_with, parse_body};
use crate::state::AppState;
use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use log::info;
use serde_json::{json, Value};
use sorter_core::model::time::{now_timestamp, utc_today};
use sorter_core::service::history_service::HISTORY_MAX_DAYS;
use sorter_core::{
    BinService, DepositReport, HistoryService, LedgerService, SqliteBinRepository,
    SqliteLedgerRepository, Topic,
};
use std::collections::HashMap;

pub async fn ping() -> Json<Value> {
    Json(json!({ "pong": sorter_core::ping(), "version": sorter_core::core_version() }))
}

pub async fn bins(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let views = state
        .with_conn(|conn| {
            let service =
                BinService::new(SqliteBinRepository::new(conn), SqliteLedgerRepository::new(conn));
            Ok(service.compute_bin_views()?)
        })
        .await?;
    Ok(Json(json!(views)))
}

pub async fn recent_deposits(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, AppError> {
    let limit = query_u32(&params, "limit")?.unwrap_or(0);
    let events = state
        .with_conn(move |conn| {
            Ok(LedgerService::new(SqliteLedgerRepository::new(conn)).recent(limit)?)
        })
        .await?;
    Ok(Json(json!(events)))
}

pub async fn record_deposit(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let report: DepositReport = parse_body(&body)?;
    let event = state
        .with_conn(move |conn| {
            let service = LedgerService::new(SqliteLedgerRepository::new(conn));
            Ok(service.record(report, &now_timestamp())?)
        })
        .await?;

    info!(
        "event=deposit_record module=server status=ok bin={} delta_g={} material={}",
        event.bin, event.delta_g, event.material
    );
    state.fanout.publish(Topic::Deposit, &event);
    Ok(ok_with(StatusCode::CREATED, event))
}

/// `days` defaults to 7 and is rejected above 366, so the series width
/// always equals the request.
pub async fn deposit_history(
    State(state): State<AppState>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Response, AppError> {
    let days = query_u32(&params, "days")?.unwrap_or(0);
    if days > HISTORY_MAX_DAYS {
        return Err(AppError::Validation(format!(
            "days must be at most {HISTORY_MAX_DAYS}, got {days}"
        )));
    }
    let history = state
        .with_conn(move |conn| {
            let service = HistoryService::new(SqliteLedgerRepository::new(conn));
            Ok(service.compute_history(days, utc_today())?)
        })
        .await?;
    Ok(ok(history))
}

/// Relays a raw weight report to dashboards. Nothing is stored.
pub async fn weights(State(state): State<AppState>, body: Bytes) -> Result<Response, AppError> {
    let report: Value = parse_body(&body)?;
    if !report.is_object() {
        return Err(AppError::Validation(
            "weight report must be a JSON object".to_string(),
        ));
    }

    let sessions = state.fanout.publish_value(Topic::WeightsUpdate, report);
    Ok(ok_with(StatusCode::ACCEPTED, json!({ "published": sessions })))
}
