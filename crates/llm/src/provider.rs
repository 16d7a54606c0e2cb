use futures::future::BoxFuture;
use snafu::Snafu;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderConfig {
    pub provider_id: String,
    pub api_key: String,
    /// Overrides the provider's base URL when non-empty.
    pub endpoint: String,
}

impl ProviderConfig {
    /// Creates a provider config with every field trimmed.
    pub fn new(
        provider_id: impl Into<String>,
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            provider_id: provider_id.into().trim().to_string(),
            api_key: api_key.into().trim().to_string(),
            endpoint: endpoint.into().trim().to_string(),
        }
    }
}

/// Speaker of one prior turn when history is threaded into a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderMessage {
    pub role: Role,
    pub content: String,
}

impl ProviderMessage {
    /// Creates one prior turn for the given speaker.
    pub fn new(role: Role, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Image sent inline with the prompt. `data` is raw base64, never a data URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineImage {
    pub mime_type: String,
    pub data: String,
}

impl InlineImage {
    /// Creates an inline image from a MIME type and a raw base64 payload.
    pub fn new(mime_type: impl Into<String>, data: impl Into<String>) -> Self {
        Self {
            mime_type: mime_type.into(),
            data: data.into(),
        }
    }
}

/// One "generate reply" call: optional inline image followed by a text part.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplyRequest {
    pub model_id: String,
    pub preamble: Option<String>,
    pub history: Vec<ProviderMessage>,
    pub image: Option<InlineImage>,
    pub text: String,
}

impl ReplyRequest {
    /// Creates a text-only request without preamble or history.
    pub fn new(model_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            model_id: model_id.into(),
            preamble: None,
            history: Vec::new(),
            image: None,
            text: text.into(),
        }
    }

    /// Sets the system instruction sent ahead of the conversation.
    pub fn with_preamble(mut self, preamble: impl Into<String>) -> Self {
        self.preamble = Some(preamble.into());
        self
    }

    /// Sets prior turns, oldest first.
    pub fn with_history(mut self, history: Vec<ProviderMessage>) -> Self {
        self.history = history;
        self
    }

    /// Attaches an image sent before the text part.
    pub fn with_image(mut self, image: InlineImage) -> Self {
        self.image = Some(image);
        self
    }
}

/// Result type used by every provider operation.
pub type ProviderResult<T> = Result<T, ProviderError>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum ProviderError {
    #[snafu(display("missing API key for provider '{provider_id}'"))]
    MissingApiKey {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("provider '{provider_id}' is not supported"))]
    UnsupportedProvider {
        stage: &'static str,
        provider_id: String,
    },
    #[snafu(display("http client failed on `{stage}`, {source}"))]
    HttpClient {
        stage: &'static str,
        source: rig::http_client::Error,
    },
    #[snafu(display("reply request for model '{model_id}' has no content parts"))]
    EmptyContent {
        stage: &'static str,
        model_id: String,
    },
    #[snafu(display("completions failed on `{stage}`, {source}"))]
    CompletionsFailed {
        stage: &'static str,
        source: rig::completion::CompletionError,
    },
}

impl ProviderError {
    /// Returns the pipeline stage where the error was raised.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingApiKey { stage, .. }
            | Self::UnsupportedProvider { stage, .. }
            | Self::HttpClient { stage, .. }
            | Self::EmptyContent { stage, .. }
            | Self::CompletionsFailed { stage, .. } => stage,
        }
    }
}

/// A backend able to answer one chat turn.
pub trait LlmProvider: Send + Sync {
    /// Stable provider identifier, such as `gemini`.
    fn id(&self) -> &str;
    /// Model used when settings do not name one.
    fn default_model(&self) -> &str;
    /// Resolves to the reply text, which may be empty when the model returned no text parts.
    fn generate_reply(&self, request: ReplyRequest) -> BoxFuture<'_, ProviderResult<String>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_config_trims_every_field() {
        let config = ProviderConfig::new(" gemini ", "  key\n", "\thttps://example.test ");

        assert_eq!(config.provider_id, "gemini");
        assert_eq!(config.api_key, "key");
        assert_eq!(config.endpoint, "https://example.test");
    }

    #[test]
    fn reply_request_builder_keeps_image_ahead_of_text() {
        let request = ReplyRequest::new("gemini-2.5-flash", "what is this?")
            .with_preamble("be brief")
            .with_image(InlineImage::new("image/png", "iVBORw0KGgo="));

        assert_eq!(request.preamble.as_deref(), Some("be brief"));
        assert_eq!(
            request.image,
            Some(InlineImage::new("image/png", "iVBORw0KGgo="))
        );
        assert_eq!(request.text, "what is this?");
        assert!(request.history.is_empty());
    }

    #[test]
    fn errors_report_their_stage() {
        let error = ProviderError::MissingApiKey {
            stage: "create-provider",
            provider_id: "gemini".to_string(),
        };

        assert_eq!(error.stage(), "create-provider");
        assert_eq!(error.to_string(), "missing API key for provider 'gemini'");
    }
}
