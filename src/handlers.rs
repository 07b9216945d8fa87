use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::ApiError;
use crate::phone::normalize;
use crate::response::{
    CreatedResponse, HealthResponse, RecordResponse, RecordsResponse, StatsResponse,
    UpdatedResponse,
};
use crate::store::{KeyValueStore, WriteOutcome, ALL_KEYS};
use crate::validation::{CreateRecord, UpdateRecord};

/// Expiration applied on every successful create or update.
pub const RECORD_TTL_DAYS: u64 = 30;
pub const RECORD_TTL_SECONDS: u64 = RECORD_TTL_DAYS * 24 * 60 * 60;

/// Shared application state: the store handle, nothing else. Records live
/// only in the store; handlers keep no cache.
pub struct AppState {
    pub store: Arc<dyn KeyValueStore>,
}

pub type SharedState = Arc<AppState>;

/// GET /health — genuine connectivity probe against the store.
pub async fn health_check(
    State(state): State<SharedState>,
) -> Result<Json<HealthResponse>, ApiError> {
    if state.store.ping().await {
        Ok(Json(HealthResponse::healthy()))
    } else {
        error!("Health check failed: store did not answer ping");
        Err(ApiError::Unavailable("Redis connection failed".to_string()))
    }
}

/// GET /phones/{phone}
pub async fn get_address(
    State(state): State<SharedState>,
    Path(phone): Path<String>,
) -> Result<Json<RecordResponse>, ApiError> {
    let phone = normalize(&phone);

    match state.store.get(&phone).await {
        Some(address) => {
            info!(phone, "Retrieved address");
            Ok(Json(RecordResponse::found(phone, address)))
        }
        None => {
            warn!(phone, "Phone not found");
            Err(ApiError::NotFound(format!(
                "Address not found for phone: {phone}"
            )))
        }
    }
}

/// POST /phones
pub async fn create_record(
    State(state): State<SharedState>,
    Json(payload): Json<CreateRecord>,
) -> Result<impl IntoResponse, ApiError> {
    let payload = payload.into_validated()?;

    // Conditional write instead of exists-then-set: two concurrent creates
    // for the same phone cannot both win.
    match state
        .store
        .set_if_absent(&payload.phone, &payload.address, RECORD_TTL_SECONDS)
        .await
    {
        WriteOutcome::Applied => {
            info!(phone = %payload.phone, "Created record");
            Ok((
                StatusCode::CREATED,
                Json(CreatedResponse::new(
                    payload.phone,
                    payload.address,
                    RECORD_TTL_DAYS,
                )),
            ))
        }
        WriteOutcome::Skipped => {
            let existing_address = state.store.get(&payload.phone).await;
            warn!(phone = %payload.phone, "Phone already exists");
            Err(ApiError::Conflict {
                phone: payload.phone,
                existing_address,
            })
        }
        WriteOutcome::Failed => {
            error!(phone = %payload.phone, "Failed to create record");
            Err(ApiError::StoreFailure(
                "Failed to create record in Redis".to_string(),
            ))
        }
    }
}

/// PUT /phones/{phone}
pub async fn update_address(
    State(state): State<SharedState>,
    Path(phone): Path<String>,
    Json(payload): Json<UpdateRecord>,
) -> Result<Json<UpdatedResponse>, ApiError> {
    let phone = normalize(&phone);
    let payload = payload.into_validated()?;

    // SET XX: replaces the value and starts a fresh 30-day window, but never
    // creates a record that is not already there.
    match state
        .store
        .set_if_present(&phone, &payload.address, RECORD_TTL_SECONDS)
        .await
    {
        WriteOutcome::Applied => {
            info!(phone, "Updated address");
            Ok(Json(UpdatedResponse::new(phone, payload.address)))
        }
        WriteOutcome::Skipped => {
            warn!(phone, "Cannot update - phone not found");
            Err(ApiError::NotFound(format!("Phone {phone} not found")))
        }
        WriteOutcome::Failed => {
            error!(phone, "Failed to update record");
            Err(ApiError::StoreFailure(
                "Failed to update record in Redis".to_string(),
            ))
        }
    }
}

/// DELETE /phones/{phone}
pub async fn delete_record(
    State(state): State<SharedState>,
    Path(phone): Path<String>,
) -> Result<StatusCode, ApiError> {
    let phone = normalize(&phone);

    if !state.store.exists(&phone).await {
        warn!(phone, "Cannot delete - phone not found");
        return Err(ApiError::NotFound(format!("Phone {phone} not found")));
    }

    if !state.store.delete(&phone).await {
        error!(phone, "Failed to delete record");
        return Err(ApiError::StoreFailure(
            "Failed to delete record from Redis".to_string(),
        ));
    }

    info!(phone, "Deleted record");
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(default = "default_limit")]
    pub limit: i64,
}

fn default_limit() -> i64 {
    100
}

/// GET /admin/records?limit=N — debugging aid, not a paginated API: the full
/// key set is enumerated and the limit only truncates the fetched prefix.
pub async fn list_records(
    State(state): State<SharedState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<RecordsResponse>, ApiError> {
    let all_keys = state.store.keys(ALL_KEYS).await;
    let total_records = all_keys.len();

    let selected: &[String] = if query.limit > 0 {
        let take = (query.limit as usize).min(all_keys.len());
        &all_keys[..take]
    } else {
        &all_keys
    };

    let mut records = HashMap::with_capacity(selected.len());
    for key in selected {
        // A key can expire or be deleted between enumeration and fetch;
        // such keys are skipped rather than reported with empty values.
        if let Some(value) = state.store.get(key).await {
            records.insert(key.clone(), value);
        }
    }

    Ok(Json(RecordsResponse {
        total_records,
        displayed_records: records.len(),
        records,
    }))
}

/// GET /admin/stats — key count only, values are not fetched.
pub async fn get_stats(
    State(state): State<SharedState>,
) -> Result<Json<StatsResponse>, ApiError> {
    let all_keys = state.store.keys(ALL_KEYS).await;
    let connected = state.store.ping().await;

    Ok(Json(StatsResponse::new(all_keys.len(), connected)))
}
