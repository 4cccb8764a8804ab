use crate::error::AppError;
use crate::models::store;
use crate::routes::blocking;
use crate::state::AppState;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use std::sync::Arc;

const STATUSES: &[&str] = &["active", "closed"];

pub fn router(_state: Arc<AppState>) -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(list_stores).post(create_store))
        .route("/{id}", get(get_store).put(update_store).delete(delete_store))
}

async fn list_stores(State(state): State<Arc<AppState>>) -> Result<Json<Vec<store::Store>>, AppError> {
    let db = state.db();
    let stores = blocking(move || {
        let conn = db.get().map_err(anyhow::Error::from)?;
        Ok(store::find_all(&conn)?)
    })
    .await?;
    Ok(Json(stores))
}

async fn get_store(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<Json<store::Store>, AppError> {
    let db = state.db();
    let found = blocking(move || {
        let conn = db.get().map_err(anyhow::Error::from)?;
        Ok(store::find_by_id(&conn, id)?)
    })
    .await?;
    found
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
}

// Every mutation checks the restore guard inside the blocking task while
// holding the pool, so a restore cannot reopen it between check and write.

async fn create_store(
    State(state): State<Arc<AppState>>,
    Json(body): Json<store::CreateStoreRequest>,
) -> Result<(StatusCode, Json<store::Store>), AppError> {
    if body.store_code.trim().is_empty() || body.name.trim().is_empty() {
        return Err(AppError::BadRequest("storeCode and name are required".into()));
    }

    let backups = state.backups.clone();
    let live = state.store.clone();
    let created = blocking(move || {
        let pool = live.lock_pool();
        backups.ensure_writable()?;
        let conn = pool.get().map_err(anyhow::Error::from)?;
        if store::find_by_code(&conn, &body.store_code)?.is_some() {
            return Err(AppError::BadRequest(format!(
                "store code {} already exists",
                body.store_code
            )));
        }
        Ok(store::create(&conn, &body)?)
    })
    .await?;

    tracing::info!(store_id = created.id, code = %created.store_code, "Store created");
    Ok((StatusCode::CREATED, Json(created)))
}

async fn update_store(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(body): Json<store::UpdateStoreRequest>,
) -> Result<Json<store::Store>, AppError> {
    if let Some(status) = &body.status {
        if !STATUSES.contains(&status.as_str()) {
            return Err(AppError::BadRequest(format!("invalid status: {status}")));
        }
    }

    let backups = state.backups.clone();
    let live = state.store.clone();
    let updated = blocking(move || {
        let pool = live.lock_pool();
        backups.ensure_writable()?;
        let conn = pool.get().map_err(anyhow::Error::from)?;
        Ok(store::update(&conn, id, &body)?)
    })
    .await?;
    updated
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Store not found".into()))
}

async fn delete_store(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<StatusCode, AppError> {
    let backups = state.backups.clone();
    let live = state.store.clone();
    let deleted = blocking(move || {
        let pool = live.lock_pool();
        backups.ensure_writable()?;
        let conn = pool.get().map_err(anyhow::Error::from)?;
        Ok(store::delete(&conn, id)?)
    })
    .await?;

    if deleted {
        tracing::info!(store_id = id, "Store deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound("Store not found".into()))
    }
}
