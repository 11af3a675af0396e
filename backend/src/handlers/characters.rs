use super::{ApiJson, ApiPath, synced_json};
use crate::AppState;
use crate::error::ApiError;
use axum::{Json, extract::State, response::Response};
use shared::models::{Character, CharacterDraft, CharacterId};

pub async fn list_characters(State(state): State<AppState>) -> Json<Vec<Character>> {
    Json(state.store.lock().await.list().to_vec())
}

pub async fn create_character(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CharacterDraft>,
) -> Result<Response, ApiError> {
    let synced = state.store.lock().await.create(payload).await?;
    Ok(synced_json(synced))
}

pub async fn update_character(
    State(state): State<AppState>,
    ApiPath(character_id): ApiPath<CharacterId>,
    ApiJson(payload): ApiJson<CharacterDraft>,
) -> Result<Response, ApiError> {
    let synced = state
        .store
        .lock()
        .await
        .update(character_id, payload)
        .await?;
    Ok(synced_json(synced))
}

pub async fn delete_character(
    State(state): State<AppState>,
    ApiPath(character_id): ApiPath<CharacterId>,
) -> Result<Response, ApiError> {
    let synced = state.store.lock().await.delete(character_id).await?;
    Ok(synced_json(synced))
}
