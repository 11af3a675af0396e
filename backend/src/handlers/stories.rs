use super::ApiJson;
use crate::AppState;
use crate::error::ApiError;
use axum::{Json, extract::State};
use shared::StoryRequest;
use shared::models::{GenerateStoryRequest, GenerationResult, GenerationStatus, StoryOptions};

pub async fn story_options() -> Json<StoryOptions> {
    Json(StoryOptions::default())
}

pub async fn generate_story(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<GenerateStoryRequest>,
) -> Result<Json<GenerationResult>, ApiError> {
    let characters = state.store.lock().await.list().to_vec();
    let request = StoryRequest::new(characters, payload.genre, payload.tone)?;

    let result = state
        .generator
        .generate(&request.prompt(), &payload.history)
        .await?;
    Ok(Json(result))
}

pub async fn story_status(State(state): State<AppState>) -> Json<GenerationStatus> {
    Json(state.generator.status().await)
}
