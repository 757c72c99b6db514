//! HTTP route handlers for Axum.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use tracing::warn;

use crate::{
    api::types::{InsightDto, InsightRequest, ReloadDto},
    data::comments::{ThemeKey, ThemeKind},
};

use super::AppState;

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

/// Lookup by theme type and name; unknown themes answer with an empty insight.
pub async fn theme_insight(
    State(state): State<AppState>,
    Json(request): Json<InsightRequest>,
) -> ApiResult<InsightDto> {
    let kind: ThemeKind = request
        .theme_type
        .parse()
        .map_err(|err: String| (StatusCode::BAD_REQUEST, err))?;
    let key = ThemeKey::new(kind, request.theme_name);
    let table = state.cache.table();
    let found = table.get(&key.table_key()).is_some();
    if !found {
        warn!(theme = %key, "no stored insight for theme");
    }
    Ok(Json(InsightDto {
        key: key.table_key(),
        found,
        insight: table.lookup(&key),
    }))
}

/// Exact table-key lookup, e.g. `base_theme_Compensation`.
pub async fn insight_by_key(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> ApiResult<InsightDto> {
    let table = state.cache.table();
    match table.get(&key) {
        Some(insight) => Ok(Json(InsightDto {
            key,
            found: true,
            insight: insight.clone(),
        })),
        None => Err((StatusCode::NOT_FOUND, format!("no insight stored under `{key}`"))),
    }
}

/// Drop the cached table and re-read it from disk.
pub async fn reload(State(state): State<AppState>) -> Json<ReloadDto> {
    state.cache.invalidate();
    Json(ReloadDto {
        entries: state.cache.table().len(),
    })
}
