use async_trait::async_trait;
use shared::models::{GenerationResult, GenerationStatus, Turn};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("A story is already being generated")]
    Busy,
    #[error("Story generation timed out after {}s", .0.as_secs())]
    Timeout(Duration),
    #[error("Missing API Key")]
    MissingApiKey,
    #[error("Generation service error: {0}")]
    Service(String),
    #[error("Malformed response from generation service: {0}")]
    MalformedResponse(String),
}

/// External text generation endpoint.
#[async_trait]
pub trait GenerationService: Send + Sync {
    async fn complete(&self, prompt: &str, history: &[Turn]) -> Result<String, GenerationError>;
}

/// Clears the in-flight flag when dropped, including when the call is cancelled.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

#[derive(Default)]
struct Outcome {
    last_result: Option<GenerationResult>,
    last_error: Option<String>,
}

/// Runs one generation call at a time against a [`GenerationService`].
///
/// A call made while another is pending fails with [`GenerationError::Busy`]
/// instead of being queued. Failures never leave the generator stuck.
pub struct Generator {
    service: Arc<dyn GenerationService>,
    timeout: Duration,
    in_flight: AtomicBool,
    outcome: RwLock<Outcome>,
}

impl Generator {
    pub fn new(service: Arc<dyn GenerationService>, timeout: Duration) -> Self {
        Self {
            service,
            timeout,
            in_flight: AtomicBool::new(false),
            outcome: RwLock::new(Outcome::default()),
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub async fn status(&self) -> GenerationStatus {
        let outcome = self.outcome.read().await;
        GenerationStatus {
            in_flight: self.is_busy(),
            last_result: outcome.last_result.clone(),
            last_error: outcome.last_error.clone(),
        }
    }

    pub async fn generate(
        &self,
        prompt: &str,
        history: &[Turn],
    ) -> Result<GenerationResult, GenerationError> {
        let _in_flight = InFlight::acquire(&self.in_flight).ok_or_else(|| {
            tracing::debug!("Rejected generation request while another is pending");
            GenerationError::Busy
        })?;

        tracing::debug!("Generating story from prompt:\n{}", prompt);
        let result =
            match tokio::time::timeout(self.timeout, self.service.complete(prompt, history)).await
            {
                Ok(result) => result,
                Err(_) => Err(GenerationError::Timeout(self.timeout)),
            };

        let mut outcome = self.outcome.write().await;
        match result {
            Ok(text) => {
                let result = GenerationResult { text };
                outcome.last_result = Some(result.clone());
                outcome.last_error = None;
                tracing::info!("Generated story ({} chars)", result.text.len());
                Ok(result)
            }
            Err(e) => {
                tracing::error!("Story generation failed: {}", e);
                outcome.last_error = Some(e.to_string());
                Err(e)
            }
        }
    }
}
