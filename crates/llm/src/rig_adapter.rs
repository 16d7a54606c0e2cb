use futures::future::BoxFuture;
use rig::OneOrMany;
use rig::completion::message::{AssistantContent, ImageMediaType, MimeType, UserContent};
use rig::completion::{CompletionModel, Message as RigMessage};
use rig::prelude::CompletionClient;
use rig::providers::gemini;
use snafu::{ResultExt, ensure};

use super::provider::{
    CompletionsFailedSnafu, EmptyContentSnafu, HttpClientSnafu, LlmProvider, MissingApiKeySnafu,
    ProviderConfig, ProviderMessage, ProviderResult, ReplyRequest, Role,
};

/// Provider id of the Gemini adapter.
pub const RIG_GEMINI_PROVIDER_ID: &str = "gemini";
/// Model used when settings do not name one.
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash";

/// Gemini provider backed by rig-core.
pub struct RigGeminiAdapter {
    config: ProviderConfig,
}

impl RigGeminiAdapter {
    /// Creates an adapter; the API key must be present.
    pub fn new(config: ProviderConfig) -> ProviderResult<Self> {
        ensure!(
            !config.api_key.is_empty(),
            MissingApiKeySnafu {
                stage: "rig-adapter-new",
                provider_id: config.provider_id.clone(),
            }
        );

        Ok(Self { config })
    }

    fn build_client(config: &ProviderConfig) -> ProviderResult<gemini::Client> {
        let mut builder = gemini::Client::builder().api_key(config.api_key.as_str());
        if !config.endpoint.is_empty() {
            builder = builder.base_url(config.endpoint.as_str());
        }
        builder.build().context(HttpClientSnafu {
            stage: "build-client",
        })
    }

    fn to_rig_message(message: &ProviderMessage) -> RigMessage {
        match message.role {
            Role::User => RigMessage::user(message.content.clone()),
            Role::Assistant => RigMessage::assistant(message.content.clone()),
        }
    }

    /// Builds the user turn: the inline image part (when present) precedes the text part.
    fn prompt_message(request: &ReplyRequest) -> ProviderResult<RigMessage> {
        let mut parts = Vec::with_capacity(2);

        if let Some(image) = &request.image {
            parts.push(UserContent::image_base64(
                image.data.clone(),
                ImageMediaType::from_mime_type(&image.mime_type),
                None,
            ));
        }
        parts.push(UserContent::text(request.text.clone()));

        let content = OneOrMany::many(parts).map_err(|_| {
            EmptyContentSnafu {
                stage: "build-prompt",
                model_id: request.model_id.clone(),
            }
            .build()
        })?;

        Ok(RigMessage::User { content })
    }

    fn reply_text(choice: &OneOrMany<AssistantContent>) -> String {
        choice
            .iter()
            .filter_map(|content| match content {
                AssistantContent::Text(text) => Some(text.text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    async fn complete(config: ProviderConfig, request: ReplyRequest) -> ProviderResult<String> {
        let client = Self::build_client(&config)?;
        let model = client.completion_model(request.model_id.clone());

        let prompt = Self::prompt_message(&request)?;
        let history = request
            .history
            .iter()
            .map(Self::to_rig_message)
            .collect::<Vec<_>>();

        tracing::debug!(
            model_id = %request.model_id,
            history_len = history.len(),
            has_image = request.image.is_some(),
            "sending completion request"
        );

        let mut builder = model.completion_request(prompt).messages(history);

        if let Some(preamble) = request.preamble.as_ref().filter(|p| !p.trim().is_empty()) {
            builder = builder.preamble(preamble.clone());
        }

        let response = builder.send().await.context(CompletionsFailedSnafu {
            stage: "send-completion",
        })?;

        Ok(Self::reply_text(&response.choice))
    }
}

impl LlmProvider for RigGeminiAdapter {
    fn id(&self) -> &str {
        &self.config.provider_id
    }

    fn default_model(&self) -> &str {
        DEFAULT_GEMINI_MODEL
    }

    fn generate_reply(&self, request: ReplyRequest) -> BoxFuture<'_, ProviderResult<String>> {
        Box::pin(Self::complete(self.config.clone(), request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{InlineImage, ProviderError};

    #[test]
    fn adapter_requires_api_key() {
        let result = RigGeminiAdapter::new(ProviderConfig::new("gemini", "   ", ""));

        assert!(matches!(
            result,
            Err(ProviderError::MissingApiKey {
                stage: "rig-adapter-new",
                ..
            })
        ));
    }

    #[test]
    fn prompt_without_image_is_a_single_text_part() {
        let request = ReplyRequest::new(DEFAULT_GEMINI_MODEL, "hello");

        let RigMessage::User { content } =
            RigGeminiAdapter::prompt_message(&request).expect("prompt")
        else {
            panic!("prompt must be a user message");
        };

        assert_eq!(content.len(), 1);
        assert!(matches!(content.first(), UserContent::Text(text) if text.text == "hello"));
    }

    #[test]
    fn prompt_with_image_puts_image_first() {
        let request = ReplyRequest::new(DEFAULT_GEMINI_MODEL, "look")
            .with_image(InlineImage::new("image/png", "aGVsbG8="));

        let RigMessage::User { content } =
            RigGeminiAdapter::prompt_message(&request).expect("prompt")
        else {
            panic!("prompt must be a user message");
        };

        let parts = content.iter().collect::<Vec<_>>();
        assert_eq!(parts.len(), 2);
        assert!(matches!(parts[0], UserContent::Image(_)));
        assert!(matches!(parts[1], UserContent::Text(text) if text.text == "look"));
    }

    #[test]
    fn reply_text_joins_text_parts_only() {
        let choice = OneOrMany::many(vec![
            AssistantContent::text("Hi "),
            AssistantContent::text("there"),
        ])
        .expect("non-empty");

        assert_eq!(RigGeminiAdapter::reply_text(&choice), "Hi there");
    }
}
