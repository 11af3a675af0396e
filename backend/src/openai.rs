use crate::generation::{GenerationError, GenerationService};
use async_openai::{
    Client,
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestAssistantMessageContent,
        ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
        ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
    },
};
use async_trait::async_trait;
use shared::models::{GenerationSettings, ROLE_ASSISTANT, ROLE_USER, Turn};

const SYSTEM_PROMPT: &str = "You are a storyteller. Write a short, self-contained story \
featuring the characters you are given, in the requested genre and tone.";

/// Story generation over any OpenAI-compatible chat completion API.
pub struct OpenAiService {
    client: Client<OpenAIConfig>,
    settings: GenerationSettings,
}

impl OpenAiService {
    pub fn new(settings: GenerationSettings) -> Self {
        let config = OpenAIConfig::new()
            .with_api_key(settings.api_key.clone())
            .with_api_base(settings.api_base.clone());

        Self {
            client: Client::with_config(config),
            settings,
        }
    }
}

/// System instruction, then prior turns, then the story prompt as the user's turn.
fn build_messages(
    prompt: &str,
    history: &[Turn],
) -> Result<Vec<ChatCompletionRequestMessage>, OpenAIError> {
    let mut messages = Vec::with_capacity(history.len() + 2);
    messages.push(ChatCompletionRequestMessage::System(
        ChatCompletionRequestSystemMessageArgs::default()
            .content(SYSTEM_PROMPT)
            .build()?,
    ));

    for turn in history {
        if turn.role == ROLE_USER {
            messages.push(ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(turn.content.clone())
                    .build()?,
            ));
        } else if turn.role == ROLE_ASSISTANT {
            messages.push(ChatCompletionRequestMessage::Assistant(
                ChatCompletionRequestAssistantMessageArgs::default()
                    .content(ChatCompletionRequestAssistantMessageContent::Text(
                        turn.content.clone(),
                    ))
                    .build()?,
            ));
        } else {
            tracing::warn!("Skipping conversation turn with unknown role {:?}", turn.role);
        }
    }

    messages.push(ChatCompletionRequestMessage::User(
        ChatCompletionRequestUserMessageArgs::default()
            .content(prompt)
            .build()?,
    ));
    Ok(messages)
}

#[async_trait]
impl GenerationService for OpenAiService {
    async fn complete(&self, prompt: &str, history: &[Turn]) -> Result<String, GenerationError> {
        if self.settings.api_key.is_empty() {
            return Err(GenerationError::MissingApiKey);
        }

        let messages = build_messages(prompt, history)
            .map_err(|e| GenerationError::Service(format!("Failed to build request: {}", e)))?;
        let request = CreateChatCompletionRequestArgs::default()
            .model(self.settings.model.clone())
            .messages(messages)
            .temperature(self.settings.temperature)
            .max_tokens(self.settings.max_tokens)
            .build()
            .map_err(|e| GenerationError::Service(format!("Failed to build request: {}", e)))?;

        let response = match self.client.chat().create(request).await {
            Ok(response) => response,
            Err(e @ OpenAIError::JSONDeserialize(..)) => {
                return Err(GenerationError::MalformedResponse(e.to_string()));
            }
            Err(e) => return Err(GenerationError::Service(e.to_string())),
        };

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| GenerationError::MalformedResponse("no story text returned".to_string()))
    }
}
