//! Axum route handlers for the skills filter.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::Profile;
use crate::skills::{all_skills, filter, parse_selection};
use crate::state::AppState;
use crate::store::{CorruptRow, ProfileStore, TableScan};

#[derive(Debug, Serialize)]
pub struct ProfileListResponse {
    pub store_initialized: bool,
    pub selected: Vec<String>,
    pub total: usize,
    pub profiles: Vec<Profile>,
    pub corrupt_rows: Vec<CorruptRow>,
}

#[derive(Debug, Serialize)]
pub struct SkillListResponse {
    pub skills: Vec<String>,
}

/// GET /api/v1/profiles?skills=Python&skills=SQL
///
/// One skill per `skills` key, so names containing commas stay selectable.
/// Every selected skill must match.
pub async fn handle_list_profiles(
    State(state): State<AppState>,
    Query(params): Query<Vec<(String, String)>>,
) -> Result<Json<ProfileListResponse>, AppError> {
    let store_initialized = state.store.exists();
    let scan = load(state.store).await?;
    let selected = parse_selection(
        params
            .into_iter()
            .filter(|(key, _)| key == "skills")
            .map(|(_, value)| value),
    );

    let profiles: Vec<Profile> = filter(&scan.rows, &selected).into_iter().cloned().collect();

    Ok(Json(ProfileListResponse {
        store_initialized,
        selected: selected.into_iter().collect(),
        total: profiles.len(),
        profiles,
        corrupt_rows: scan.corrupt,
    }))
}

/// GET /api/v1/skills
///
/// Every skill present in the store, sorted, for the multi-select.
pub async fn handle_list_skills(
    State(state): State<AppState>,
) -> Result<Json<SkillListResponse>, AppError> {
    let scan = load(state.store).await?;
    Ok(Json(SkillListResponse {
        skills: all_skills(&scan.rows).into_iter().collect(),
    }))
}

async fn load(store: ProfileStore) -> Result<TableScan, AppError> {
    let scan = tokio::task::spawn_blocking(move || store.load())
        .await
        .map_err(|e| AppError::Internal(e.into()))??;
    Ok(scan)
}
