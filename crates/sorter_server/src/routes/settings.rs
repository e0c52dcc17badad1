//! Persisted motion/alert configuration handlers.

use crate::error::AppError;
use crate::response::{ok, parse_body};
use crate::state::AppState;
use axum::{body::Bytes, extract::State, response::Response, Json};
use serde_json::json;
use sorter_core::{
    BinService, ConfigPatch, ConfigService, ConfigView, FirmwareAxisConfig, SqliteBinRepository,
    SqliteConfigRepository, SqliteLedgerRepository,
};

pub async fn get_config(State(state): State<AppState>) -> Result<Json<ConfigView>, AppError> {
    let view = state
        .with_conn(|conn| {
            let bins_capacity_kg =
                BinService::new(SqliteBinRepository::new(conn), SqliteLedgerRepository::new(conn))
                    .capacities_kg()?;
            let config = ConfigService::new(SqliteConfigRepository::new(conn)).get()?;
            Ok(ConfigView {
                config,
                bins_capacity_kg,
            })
        })
        .await?;
    Ok(Json(view))
}

pub async fn update_config(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Response, AppError> {
    let patch: ConfigPatch = parse_body(&body)?;
    let config = state
        .with_conn(move |conn| {
            Ok(ConfigService::new(SqliteConfigRepository::new(conn)).update(&patch)?)
        })
        .await?;
    Ok(ok(json!({ "saved": true, "config": config })))
}

/// Minimal motion parameters for the controller firmware.
pub async fn firmware_axis(
    State(state): State<AppState>,
) -> Result<Json<FirmwareAxisConfig>, AppError> {
    let config = state
        .with_conn(|conn| Ok(ConfigService::new(SqliteConfigRepository::new(conn)).get()?))
        .await?;
    Ok(Json(FirmwareAxisConfig::from(&config)))
}
