//! HTTP request handlers.

use super::AppState;
use crate::store::{
    Check, CheckCreate, CheckResult, CheckUpdate, Device, DeviceCreate, DeviceUpdate, Layout,
    LayoutCreate, LayoutUpdate, Link, LinkCreate, LinkUpdate, StoreError,
};

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
};
use serde_json::json;
use uuid::Uuid;

// ============================================================================
// Health
// ============================================================================

pub async fn handle_health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

// ============================================================================
// Devices
// ============================================================================

pub async fn handle_list_devices(State(state): State<AppState>) -> Json<Vec<Device>> {
    Json(state.store.list_devices())
}

pub async fn handle_create_device(
    State(state): State<AppState>,
    Json(req): Json<DeviceCreate>,
) -> impl IntoResponse {
    (StatusCode::CREATED, Json(state.store.create_device(req)))
}

pub async fn handle_get_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Device>, StoreError> {
    Ok(Json(state.store.get_device(id)?))
}

pub async fn handle_update_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<DeviceUpdate>,
) -> Result<Json<Device>, StoreError> {
    Ok(Json(state.store.update_device(id, req)?))
}

pub async fn handle_delete_device(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.store.delete_device(id);
    StatusCode::NO_CONTENT
}

// ============================================================================
// Layouts
// ============================================================================

pub async fn handle_list_layouts(State(state): State<AppState>) -> Json<Vec<Layout>> {
    Json(state.store.list_layouts())
}

pub async fn handle_create_layout(
    State(state): State<AppState>,
    Json(req): Json<LayoutCreate>,
) -> Result<impl IntoResponse, StoreError> {
    let layout = state.store.create_layout(req)?;
    Ok((StatusCode::CREATED, Json(layout)))
}

pub async fn handle_get_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Layout>, StoreError> {
    Ok(Json(state.store.get_layout(id)?))
}

pub async fn handle_update_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LayoutUpdate>,
) -> Result<Json<Layout>, StoreError> {
    Ok(Json(state.store.update_layout(id, req)?))
}

pub async fn handle_delete_layout(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    state.store.delete_layout(id);
    StatusCode::NO_CONTENT
}

// ============================================================================
// Links
// ============================================================================

pub async fn handle_list_links(State(state): State<AppState>) -> Json<Vec<Link>> {
    Json(state.store.list_links())
}

pub async fn handle_create_link(
    State(state): State<AppState>,
    Json(req): Json<LinkCreate>,
) -> Result<impl IntoResponse, StoreError> {
    let link = state.store.create_link(req)?;
    Ok((StatusCode::CREATED, Json(link)))
}

pub async fn handle_get_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Link>, StoreError> {
    Ok(Json(state.store.get_link(id)?))
}

pub async fn handle_update_link(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<LinkUpdate>,
) -> Result<Json<Link>, StoreError> {
    Ok(Json(state.store.update_link(id, req)?))
}

pub async fn handle_delete_link(State(state): State<AppState>, Path(id): Path<Uuid>) -> StatusCode {
    state.store.delete_link(id);
    StatusCode::NO_CONTENT
}

// ============================================================================
// Checks
// ============================================================================

pub async fn handle_list_checks(State(state): State<AppState>) -> Json<Vec<Check>> {
    Json(state.store.list_checks())
}

pub async fn handle_create_check(
    State(state): State<AppState>,
    Json(req): Json<CheckCreate>,
) -> Result<impl IntoResponse, StoreError> {
    let check = state.store.create_check(req)?;
    if let Some(scheduler) = &state.scheduler {
        scheduler.add_check(&check).await;
    }
    Ok((StatusCode::CREATED, Json(check)))
}

pub async fn handle_get_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Check>, StoreError> {
    Ok(Json(state.store.get_check(id)?))
}

pub async fn handle_update_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<CheckUpdate>,
) -> Result<Json<Check>, StoreError> {
    let check = state.store.update_check(id, req)?;
    // Restart the probe loop so the new cadence takes effect.
    if let Some(scheduler) = &state.scheduler {
        scheduler.remove_check(check.id).await;
        scheduler.add_check(&check).await;
    }
    Ok(Json(check))
}

pub async fn handle_delete_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> StatusCode {
    if let Some(scheduler) = &state.scheduler {
        scheduler.remove_check(id).await;
    }
    state.store.delete_check(id);
    StatusCode::NO_CONTENT
}

pub async fn handle_run_check(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CheckResult>, StoreError> {
    Ok(Json(state.runner.run(id).await?))
}
