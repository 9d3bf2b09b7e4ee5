use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::request_id::RequestId;
use crate::models::{ContentItem, Genre, Profile};
use crate::services::catalog::{HomeFeed, Playback};
use crate::services::{ProfileSession, Selection};

use super::AppState;

// Request/Response types

/// Public view of a profile; the PIN itself never leaves the server
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ProfileResponse {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub is_kid: bool,
    pub locked: bool,
}

impl From<&Profile> for ProfileResponse {
    fn from(profile: &Profile) -> Self {
        Self {
            id: profile.id.clone(),
            name: profile.name.clone(),
            avatar: profile.avatar.clone(),
            is_kid: profile.is_kid,
            locked: profile.is_locked(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SelectionResponse {
    pub status: String,
    pub profile: Option<ProfileResponse>,
    pub previous: Option<ProfileResponse>,
    /// Consecutive wrong PINs for the pending profile
    pub failed_attempts: u32,
    /// Keypad digits typed so far
    pub pin_entered: usize,
}

impl From<&Selection> for SelectionResponse {
    fn from(selection: &Selection) -> Self {
        let previous = match selection {
            Selection::Pending { previous, .. } => previous.as_ref().map(ProfileResponse::from),
            _ => None,
        };
        Self {
            status: selection.status().to_string(),
            profile: selection.displayed().map(ProfileResponse::from),
            previous,
            failed_attempts: 0,
            pin_entered: 0,
        }
    }
}

impl From<&ProfileSession> for SelectionResponse {
    fn from(session: &ProfileSession) -> Self {
        Self {
            failed_attempts: session.pending_failures(),
            pin_entered: session.pad_entered(),
            ..Self::from(&session.current())
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateProfileRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: String,
    #[serde(default)]
    pub pin: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SelectProfileRequest {
    pub profile_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmRequest {
    pub pin: String,
}

#[derive(Debug, Deserialize)]
pub struct KeypadRequest {
    pub digits: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct WatchlistEntryResponse {
    pub item_id: u64,
    pub in_list: bool,
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    q: String,
}

#[derive(Debug, Serialize)]
pub struct TrailerResponse {
    pub key: String,
    pub name: String,
}

// Handlers

pub async fn health_check() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "healthy" })))
}

async fn active_profile(state: &AppState) -> AppResult<Profile> {
    state.session.read().await.active()
}

pub async fn list_profiles(State(state): State<AppState>) -> Json<Vec<ProfileResponse>> {
    let profiles = state.profiles.list_profiles();
    Json(profiles.iter().map(ProfileResponse::from).collect())
}

pub async fn create_profile(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<CreateProfileRequest>,
) -> AppResult<(StatusCode, Json<ProfileResponse>)> {
    let profile = state.profiles.create_profile(&request.name).map_err(|e| {
        tracing::info!(request_id = %request_id, error = %e, "Profile creation refused");
        e
    })?;
    Ok((StatusCode::CREATED, Json(ProfileResponse::from(&profile))))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(request): Json<UpdateProfileRequest>,
) -> AppResult<Json<ProfileResponse>> {
    let profile = state
        .profiles
        .update_profile(&id, &request.name, request.pin.as_deref())?;
    // A new PIN starts with a clean failure count
    state.session.read().await.gate().reset(&id);
    Ok(Json(ProfileResponse::from(&profile)))
}

pub async fn delete_profile(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<StatusCode> {
    // Held so a concurrent confirm cannot commit the profile being removed
    let mut session = state.session.write().await;
    state.profiles.remove_profile(&id)?;
    if session.current().displayed().map(|p| p.id.as_str()) == Some(id.as_str()) {
        session.cancel();
    }
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_session(State(state): State<AppState>) -> Json<SelectionResponse> {
    let session = state.session.read().await;
    Json(SelectionResponse::from(&*session))
}

pub async fn select_profile(
    State(state): State<AppState>,
    Json(request): Json<SelectProfileRequest>,
) -> AppResult<Json<SelectionResponse>> {
    let mut session = state.session.write().await;
    session.select(&request.profile_id)?;
    Ok(Json(SelectionResponse::from(&*session)))
}

pub async fn confirm_profile(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<ConfirmRequest>,
) -> AppResult<Json<SelectionResponse>> {
    let mut session = state.session.write().await;
    if let Err(e) = session.confirm(&request.pin) {
        tracing::info!(request_id = %request_id, error = %e, "Profile confirmation failed");
        return Err(e);
    }
    Ok(Json(SelectionResponse::from(&*session)))
}

/// Keypad entry for the pending profile; the fourth digit submits the code
pub async fn key_in(
    State(state): State<AppState>,
    Extension(request_id): Extension<RequestId>,
    Json(request): Json<KeypadRequest>,
) -> AppResult<Json<SelectionResponse>> {
    let mut session = state.session.write().await;
    if let Err(e) = session.key_in(&request.digits) {
        tracing::info!(request_id = %request_id, error = %e, "Keypad confirmation failed");
        return Err(e);
    }
    Ok(Json(SelectionResponse::from(&*session)))
}

pub async fn keypad_backspace(State(state): State<AppState>) -> Json<SelectionResponse> {
    let mut session = state.session.write().await;
    session.backspace();
    Json(SelectionResponse::from(&*session))
}

pub async fn clear_keypad(State(state): State<AppState>) -> Json<SelectionResponse> {
    let mut session = state.session.write().await;
    session.clear_pad();
    Json(SelectionResponse::from(&*session))
}

pub async fn cancel_selection(State(state): State<AppState>) -> Json<SelectionResponse> {
    let mut session = state.session.write().await;
    session.cancel();
    Json(SelectionResponse::from(&*session))
}

/// Signs out; also used when entering profile management
pub async fn sign_out(State(state): State<AppState>) -> AppResult<StatusCode> {
    state.session.write().await.sign_out()?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn browse(State(state): State<AppState>) -> AppResult<Json<HomeFeed>> {
    let viewer = active_profile(&state).await?;
    Ok(Json(state.catalog.home_feed(&viewer).await))
}

pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<ContentItem>>> {
    let viewer = active_profile(&state).await?;
    Ok(Json(state.catalog.search(&viewer, &params.q).await))
}

pub async fn genres(State(state): State<AppState>) -> Json<Vec<Genre>> {
    Json(state.catalog.genres().await)
}

pub async fn title_details(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<ContentItem>> {
    let viewer = active_profile(&state).await?;
    Ok(Json(state.catalog.details(&viewer, id).await?))
}

pub async fn title_trailer(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<TrailerResponse>> {
    let viewer = active_profile(&state).await?;
    let trailer = state
        .catalog
        .trailer_for(&viewer, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No trailer available for title {}", id)))?;
    Ok(Json(TrailerResponse {
        key: trailer.key,
        name: trailer.name,
    }))
}

pub async fn watch(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> AppResult<Json<Playback>> {
    let viewer = active_profile(&state).await?;
    Ok(Json(state.catalog.watch(&viewer, id).await?))
}

pub async fn get_watchlist(State(state): State<AppState>) -> AppResult<Json<Vec<ContentItem>>> {
    let viewer = active_profile(&state).await?;
    Ok(Json(state.watchlist.list(&viewer.id)))
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Json(item): Json<ContentItem>,
) -> AppResult<StatusCode> {
    let viewer = active_profile(&state).await?;
    if !state.catalog.policy().is_permitted(&item, viewer.is_kid) {
        return Err(AppError::ContentBlocked);
    }
    state.watchlist.add(&viewer.id, item)?;
    Ok(StatusCode::CREATED)
}

pub async fn watchlist_entry(
    State(state): State<AppState>,
    Path(item_id): Path<u64>,
) -> AppResult<Json<WatchlistEntryResponse>> {
    let viewer = active_profile(&state).await?;
    Ok(Json(WatchlistEntryResponse {
        item_id,
        in_list: state.watchlist.contains(&viewer.id, item_id),
    }))
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path(item_id): Path<u64>,
) -> AppResult<StatusCode> {
    let viewer = active_profile(&state).await?;
    state.watchlist.remove(&viewer.id, item_id)?;
    Ok(StatusCode::NO_CONTENT)
}
