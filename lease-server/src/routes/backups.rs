use crate::error::AppError;
use crate::routes::blocking;
use crate::state::AppState;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use lease_backup::{
    BackupList, BackupRecord, BackupStatus, CreateBackupRequest, OperationOutcome, RestoreOutcome,
};
use serde::Deserialize;
use std::sync::Arc;

pub fn router(_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_backups).post(create_backup))
        .route("/status", get(backup_status))
        .route("/{id}", delete(delete_backup))
        .route("/{id}/restore", post(restore_backup))
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBackupBody {
    pub reason: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorQuery {
    pub user_id: Option<i64>,
}

async fn list_backups(
    State(state): State<Arc<AppState>>,
) -> Result<Json<OperationOutcome<BackupList>>, AppError> {
    let service = state.backups.clone();
    let list = blocking(move || Ok(service.list_backups()?)).await?;
    Ok(Json(OperationOutcome::ok(list)))
}

async fn create_backup(
    State(state): State<Arc<AppState>>,
    body: Option<Json<CreateBackupBody>>,
) -> Result<(StatusCode, Json<OperationOutcome<BackupRecord>>), AppError> {
    // The body is optional; a bare POST is a backup with default provenance
    let body = body.map(|Json(body)| body).unwrap_or_default();
    let request = CreateBackupRequest::new(
        body.reason.unwrap_or_else(|| "api".to_string()),
        body.user_id,
    );
    let service = state.backups.clone();
    let record = blocking(move || Ok(service.create_backup(request)?)).await?;
    Ok((StatusCode::CREATED, Json(OperationOutcome::ok(record))))
}

async fn restore_backup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<OperationOutcome<RestoreOutcome>>, AppError> {
    let service = state.backups.clone();
    let outcome = blocking(move || Ok(service.restore_backup(&id, actor.user_id)?)).await?;
    Ok(Json(OperationOutcome::ok(outcome)))
}

async fn delete_backup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(actor): Query<ActorQuery>,
) -> Result<Json<OperationOutcome<BackupRecord>>, AppError> {
    let service = state.backups.clone();
    let record = blocking(move || Ok(service.delete_backup(&id, actor.user_id)?)).await?;
    Ok(Json(OperationOutcome::ok(record)))
}

async fn backup_status(State(state): State<Arc<AppState>>) -> Json<OperationOutcome<BackupStatus>> {
    Json(OperationOutcome::ok(state.backups.status()))
}
