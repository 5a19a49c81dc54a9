//! RTO status API endpoints.

use std::sync::Arc;

use axum::{
    Extension, Json,
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};
use chrono::{SubsecRound, Utc};
use entities::{RtoStatusEntry, RtoStatusUpload, UserRole};
use rto_protocol::{requests::*, responses::*};
use rto_store::{HistoryFilter, RtoStore};
use serde_json::Value;

use crate::error::{ServerError, ServerResult};
use crate::extract::{ApiJson, ApiQuery};
use crate::middleware::AuthenticatedUser;
use crate::services::export::{self, ExportFormat};
use crate::state::AppState;

/// Roles that can see the dashboard.
const DASHBOARD_ROLES: [UserRole; 4] = UserRole::ALL;

const NOT_AUTHORIZED_TO_VIEW: &str = "Forbidden: You are not authorized to view this data.";

/// Uploads a new status snapshot. Only the configured uploader may call it.
pub async fn upload_status<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    body: Result<ApiJson<Value>, ServerError>,
) -> ServerResult<Json<UploadStatusResponse>> {
    if !state.config.is_uploader(&caller.email) {
        tracing::warn!(user_id = caller.id, "Upload attempt by non-uploader");
        return Err(ServerError::PermissionDenied(
            "Forbidden: You are not authorized to upload RTO status.".to_string(),
        ));
    }

    let ApiJson(body) = body?;
    let upload = RtoStatusUpload::from_json(&body)?;

    let entry = state
        .store
        .append_status(upload, &caller.email, Utc::now().trunc_subsecs(3))
        .await?;

    tracing::info!(entry_id = entry.id, uploaded_by = %entry.uploaded_by, "RTO status uploaded");

    Ok(Json(UploadStatusResponse {
        message: "RTO status counts uploaded successfully.".to_string(),
        id: entry.id,
    }))
}

async fn latest_entry<S: RtoStore>(state: &AppState<S>) -> ServerResult<RtoStatusEntry> {
    state
        .store
        .latest_status()
        .await?
        .ok_or_else(|| ServerError::NotFound("No RTO status has been uploaded yet.".to_string()))
}

/// Returns the most recent upload as stored.
pub async fn get_latest<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ServerResult<Json<RtoStatusEntry>> {
    caller.require_any_role(&DASHBOARD_ROLES, NOT_AUTHORIZED_TO_VIEW)?;
    Ok(Json(latest_entry(&state).await?))
}

/// Returns the most recent upload with dashboard aggregations.
pub async fn get_summary<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
) -> ServerResult<Json<DashboardSummary>> {
    caller.require_any_role(&DASHBOARD_ROLES, NOT_AUTHORIZED_TO_VIEW)?;
    let entry = latest_entry(&state).await?;
    Ok(Json(DashboardSummary::from_entry(&entry)))
}

/// Lists uploads, most recent first.
pub async fn list_history<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<HistoryQuery>,
) -> ServerResult<Json<StatusHistoryResponse>> {
    caller.require_role(UserRole::Manager, NOT_AUTHORIZED_TO_VIEW)?;

    let history = state
        .store
        .list_status_history(HistoryFilter {
            limit: query.limit,
            offset: query.offset,
            ..Default::default()
        })
        .await?;

    Ok(Json(history))
}

/// Picks the entries an export query refers to.
async fn select_entries<S: RtoStore>(
    state: &AppState<S>,
    query: &ExportQuery,
) -> ServerResult<Vec<RtoStatusEntry>> {
    if let Some(id) = query.id.as_deref().filter(|id| !id.is_empty()) {
        let id: u64 = id
            .parse()
            .map_err(|_| ServerError::InvalidRequest("Invalid history id.".to_string()))?;
        return Ok(state.store.get_status(id).await?.into_iter().collect());
    }

    let (Some(start), Some(end)) = (
        query.start_date.as_deref().filter(|s| !s.is_empty()),
        query.end_date.as_deref().filter(|s| !s.is_empty()),
    ) else {
        return Err(ServerError::InvalidRequest(
            "An ID or a start/end date range is required.".to_string(),
        ));
    };

    let invalid_date = || ServerError::InvalidRequest("Invalid start or end date.".to_string());
    let filter = HistoryFilter {
        uploaded_from: Some(export::parse_range_start(start).ok_or_else(invalid_date)?),
        uploaded_to: Some(export::parse_range_end(end).ok_or_else(invalid_date)?),
        ..Default::default()
    };

    let mut entries = state.store.list_status_history(filter).await?;
    // Reports read oldest first, like the stored history.
    entries.reverse();
    Ok(entries)
}

/// Exports one upload or a date range of uploads as a spreadsheet.
pub async fn export_history<S: RtoStore>(
    State(state): State<Arc<AppState<S>>>,
    Extension(caller): Extension<AuthenticatedUser>,
    ApiQuery(query): ApiQuery<ExportQuery>,
) -> ServerResult<Response> {
    caller.require_role(UserRole::Manager, "Manager access required")?;

    let format = match query.format.as_deref() {
        None | Some("") => ExportFormat::default(),
        Some(raw) => raw.parse().map_err(ServerError::InvalidRequest)?,
    };

    let entries = select_entries(&state, &query).await?;
    if entries.is_empty() {
        return Err(ServerError::NotFound(
            "No history found for the selected criteria.".to_string(),
        ));
    }

    let bytes = export::render(format, &entries)?;

    tracing::info!(
        entries = entries.len(),
        format = format.extension(),
        user_id = caller.id,
        "RTO history exported"
    );

    Ok((
        [
            (header::CONTENT_TYPE, format.mime_type().to_string()),
            (header::CONTENT_DISPOSITION, format.content_disposition()),
        ],
        bytes,
    )
        .into_response())
}
