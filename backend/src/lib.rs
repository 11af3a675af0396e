mod dbs;
mod error;
mod generation;
mod handlers;
mod openai;

pub use crate::dbs::{DatabaseConfig, FileBlobStore, PostgresPersistence};
pub use crate::error::{ApiError, BackendError, ErrorBody};
pub use crate::generation::{GenerationError, GenerationService, Generator};
pub use crate::handlers::SYNC_ERROR_HEADER;
pub use crate::openai::OpenAiService;

use crate::handlers::{
    create_character, delete_character, generate_story, list_characters, story_options,
    story_status, update_character,
};
use axum::{
    Router,
    routing::{get, post, put},
};
use shared::CharacterStore;
use shared::models::GenerationSettings;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;

#[derive(Clone, Debug)]
pub struct BackendConfig {
    pub database: DatabaseConfig,
    pub generation: GenerationSettings,
}

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<CharacterStore>>,
    pub generator: Arc<Generator>,
}

impl AppState {
    pub fn new(store: CharacterStore, generator: Generator) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            generator: Arc::new(generator),
        }
    }

    pub async fn from_config(config: &BackendConfig) -> Result<Self, BackendError> {
        let persistence = config.database.connect().await?;
        let opened = CharacterStore::open(persistence).await;
        if let Some(e) = &opened.sync_error {
            tracing::warn!("Character store opened without saved data: {}", e);
        }

        let service = Arc::new(OpenAiService::new(config.generation.clone()));
        let timeout = Duration::from_secs(config.generation.timeout_secs);
        Ok(Self::new(opened.value, Generator::new(service, timeout)))
    }
}

/// Adds the API routes to `router` and attaches the state.
pub fn routes(router: Router<AppState>, state: AppState) -> Router<()> {
    router
        .route("/api/health", get(|| async { "OK" }))
        .route(
            "/api/characters",
            get(list_characters).post(create_character),
        )
        .route(
            "/api/characters/{character_id}",
            put(update_character).delete(delete_character),
        )
        .route("/api/story-options", get(story_options))
        .route("/api/stories", post(generate_story))
        .route("/api/stories/status", get(story_status))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn init(
    router: Router<AppState>,
    config: BackendConfig,
) -> Result<Router<()>, BackendError> {
    let state = AppState::from_config(&config).await?;
    Ok(routes(router, state))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::tests::FakeService;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use http_body_util::BodyExt;
    use serde::de::DeserializeOwned;
    use serde_json::json;
    use shared::models::{Character, CharacterDraft, GenerationResult, GenerationStatus};
    use shared::persistence::{BlobPersistence, MemoryBlobStore};
    use tower::ServiceExt;

    async fn app_with(service: Arc<FakeService>) -> (Router, AppState) {
        let persistence = Arc::new(BlobPersistence::new(MemoryBlobStore::new()));
        let store = CharacterStore::open(persistence).await.into_value();
        let state = AppState::new(store, Generator::new(service, Duration::from_secs(30)));
        (routes(Router::new(), state.clone()), state)
    }

    async fn app() -> Router {
        app_with(Arc::new(FakeService::replying("A tale"))).await.0
    }

    fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn empty_request(method: &str, uri: &str) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .body(Body::empty())
            .unwrap()
    }

    async fn read_json<T: DeserializeOwned>(response: axum::response::Response) -> T {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn create(app: &Router, name: &str) -> Character {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/characters",
                json!({"name": name, "description": "A knight", "personality": "Brave"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        read_json(response).await
    }

    #[tokio::test]
    async fn characters_crud() {
        let app = app().await;
        let rose = create(&app, "Rose").await;
        let ivy = create(&app, "Ivy").await;
        assert!(ivy.id > rose.id);

        let response = app
            .clone()
            .oneshot(json_request(
                "PUT",
                &format!("/api/characters/{}", rose.id),
                json!({"name": "Rose", "description": "A retired knight", "personality": "Weary"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let updated: Character = read_json(response).await;
        assert_eq!(updated.description, "A retired knight");

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", &format!("/api/characters/{}", ivy.id)))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get(SYNC_ERROR_HEADER).is_none());

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/characters"))
            .await
            .unwrap();
        let characters: Vec<Character> = read_json(response).await;
        assert_eq!(characters, vec![updated]);
    }

    #[tokio::test]
    async fn validation_and_not_found_statuses() {
        let app = app().await;
        create(&app, "Rose").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/characters",
                json!({"name": "ROSE", "description": "A knight", "personality": "Brave"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "validation");

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/characters",
                json!({"name": "Ivy", "description": "  ", "personality": "Brave"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/api/characters/42"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "not_found");
        assert_eq!(body.message, "Character 42 not found");
    }

    #[tokio::test]
    async fn story_needs_characters_genre_and_tone() {
        let service = Arc::new(FakeService::replying("A tale"));
        let (app, _) = app_with(service.clone()).await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/stories",
                json!({"genre": "Fantasy", "tone": "Happy"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        create(&app, "Rose").await;
        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/stories", json!({"genre": "Fantasy"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "precondition");
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn story_is_generated_and_recorded() {
        let service = Arc::new(FakeService::replying("A tale"));
        let (app, state) = app_with(service.clone()).await;
        state
            .store
            .lock()
            .await
            .create(CharacterDraft::new("Rose", "A knight", "Brave"))
            .await
            .unwrap();

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/stories",
                json!({"genre": "Sci-Fi", "tone": "Funny", "history": []}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let result: GenerationResult = read_json(response).await;
        let prompt = "Characters:\nRose: A knight (Brave)\nThis is a Sci-Fi story in a Funny tone.";
        assert_eq!(result.text, format!("A tale [{} prompt bytes]", prompt.len()));

        let response = app
            .clone()
            .oneshot(empty_request("GET", "/api/stories/status"))
            .await
            .unwrap();
        let status: GenerationStatus = read_json(response).await;
        assert_eq!(status.last_result, Some(result));
        assert!(!status.in_flight);
    }

    #[tokio::test]
    async fn service_failure_is_bad_gateway() {
        let service = Arc::new(FakeService::failing(GenerationError::Service(
            "connection refused".to_string(),
        )));
        let (app, _) = app_with(service).await;
        create(&app, "Rose").await;

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/stories",
                json!({"genre": "Mystery", "tone": "Sad"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "generation");
        assert!(body.message.contains("connection refused"));
    }

    #[tokio::test]
    async fn busy_generator_is_conflict() {
        let gate = Arc::new(tokio::sync::Notify::new());
        let service = Arc::new(FakeService::gated("A tale", gate.clone()));
        let (app, state) = app_with(service.clone()).await;
        create(&app, "Rose").await;

        let first = tokio::spawn({
            let app = app.clone();
            async move {
                app.oneshot(json_request(
                    "POST",
                    "/api/stories",
                    json!({"genre": "Romance", "tone": "Happy"}),
                ))
                .await
                .unwrap()
            }
        });
        while !state.generator.is_busy() {
            tokio::task::yield_now().await;
        }

        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/api/stories",
                json!({"genre": "Romance", "tone": "Happy"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CONFLICT);

        gate.notify_one();
        assert_eq!(first.await.unwrap().status(), StatusCode::OK);
        assert_eq!(service.calls(), 1);
    }

    #[tokio::test]
    async fn story_options_list_genres_and_tones() {
        let app = app().await;
        let response = app
            .oneshot(empty_request("GET", "/api/story-options"))
            .await
            .unwrap();
        let options: serde_json::Value = read_json(response).await;
        assert_eq!(options["genres"][3]["value"], "Sci-Fi");
        assert_eq!(options["tones"][0]["emoji"], "😊");
    }

    #[tokio::test]
    async fn malformed_requests_get_json_errors() {
        let app = app().await;
        create(&app, "Rose").await;

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/stories", json!({"genre": "Horror"})))
            .await
            .unwrap();
        assert!(response.status().is_client_error());
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "invalid_body");

        let response = app
            .clone()
            .oneshot(json_request("POST", "/api/characters", json!({"name": "Ivy"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "invalid_body");

        let response = app
            .clone()
            .oneshot(empty_request("DELETE", "/api/characters/abc"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: ErrorBody = read_json(response).await;
        assert_eq!(body.error, "invalid_path");
    }

    #[tokio::test]
    async fn genre_and_tone_are_accepted_in_any_case() {
        let service = Arc::new(FakeService::replying("A tale"));
        let (app, _) = app_with(service.clone()).await;
        create(&app, "Rose").await;

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/stories",
                json!({"genre": "sci-fi", "tone": "FUNNY"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(service.calls(), 1);
    }

    /// Saves always fail with a message that is not a valid header value as-is.
    struct UnwritablePersistence;

    #[async_trait::async_trait]
    impl shared::CharacterPersistence for UnwritablePersistence {
        async fn load(&self) -> shared::persistence::SyncResult<Vec<Character>> {
            Ok(Vec::new())
        }

        async fn save(&self, _: &[Character]) -> shared::persistence::SyncResult<()> {
            Err(shared::StoreSyncError::Write(
                "disk full\nretry later \u{2014} café".to_string(),
            ))
        }
    }

    #[tokio::test]
    async fn sync_failure_header_survives_awkward_messages() {
        let store = CharacterStore::open(Arc::new(UnwritablePersistence))
            .await
            .into_value();
        let service = Arc::new(FakeService::replying("A tale"));
        let state = AppState::new(store, Generator::new(service, Duration::from_secs(30)));
        let app = routes(Router::new(), state);

        let response = app
            .oneshot(json_request(
                "POST",
                "/api/characters",
                json!({"name": "Rose", "description": "A knight", "personality": "Brave"}),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let header = response.headers()[SYNC_ERROR_HEADER].to_str().unwrap();
        assert!(header.starts_with("Failed to write stored characters: disk full retry later"));
    }
}
