use std::sync::Arc;

use telechat_llm::{
    InlineImage, LlmProvider, ProviderError, ProviderMessage, ProviderResult, ReplyRequest, Role,
};

use super::events::{ExchangeReply, OutboundTurn};
use super::message::{Message, MessageId, Sender};

/// System instruction sent with every request.
pub const SYSTEM_INSTRUCTION: &str = "You are a helpful, witty, and friendly participant in a chat room. Keep your responses concise and conversational, similar to how people chat on Telegram. If sent an image, describe it or comment on it naturally.";

/// Shown for every failed exchange, whatever the cause.
pub const FALLBACK_REPLY: &str = "Sorry, I'm having trouble connecting to the network right now.";

/// Shown when the model answered without any text.
pub const EMPTY_REPLY: &str = "I saw that, but I'm not sure what to say.";

/// Translates a local send into one provider call and back into reply text.
///
/// The gateway keeps no state between calls. It never retries and never
/// returns an error: failures are logged and answered with [`FALLBACK_REPLY`].
pub struct MessageGateway {
    provider: Option<Arc<dyn LlmProvider>>,
    model_id: String,
    include_history: bool,
}

impl MessageGateway {
    /// Creates a gateway; `None` answers every send with the fallback.
    pub fn new(provider: Option<Arc<dyn LlmProvider>>, model_id: impl Into<String>) -> Self {
        Self {
            provider,
            model_id: model_id.into(),
            include_history: false,
        }
    }

    /// Threads prior text turns into the request instead of sending only the new turn.
    pub fn with_history(mut self, include_history: bool) -> Self {
        self.include_history = include_history;
        self
    }

    /// True when a provider is available.
    pub fn is_configured(&self) -> bool {
        self.provider.is_some()
    }

    /// Builds the provider request for one outbound turn.
    pub fn build_request(&self, turn: &OutboundTurn) -> ReplyRequest {
        let mut request = ReplyRequest::new(self.model_id.clone(), turn.text.clone())
            .with_preamble(SYSTEM_INSTRUCTION);

        // Non-image attachments stay on the visible message only.
        if let Some(attachment) = turn.attachment.as_ref().filter(|a| a.is_image()) {
            request = request.with_image(InlineImage::new(
                attachment.mime_type.clone(),
                attachment.base64_payload(),
            ));
        }

        if self.include_history {
            request = request.with_history(history_messages(&turn.history));
        }

        request
    }

    /// Runs one exchange and always yields a reply to show.
    pub async fn exchange(&self, turn: &OutboundTurn) -> ExchangeReply {
        match self.generate(turn).await {
            Ok(text) if text.trim().is_empty() => ExchangeReply::generated(EMPTY_REPLY),
            Ok(text) => ExchangeReply::generated(text),
            Err(error) => {
                tracing::error!(
                    chat_id = turn.target.chat_id.0,
                    turn_id = turn.target.turn_id.0,
                    stage = error.stage(),
                    error = %error,
                    "reply generation failed; answering with fallback"
                );
                ExchangeReply::fallback(FALLBACK_REPLY)
            }
        }
    }

    async fn generate(&self, turn: &OutboundTurn) -> ProviderResult<String> {
        let Some(provider) = &self.provider else {
            return Err(ProviderError::MissingApiKey {
                stage: "gateway-generate",
                provider_id: telechat_llm::RIG_GEMINI_PROVIDER_ID.to_string(),
            });
        };

        let request = self.build_request(turn);
        tracing::debug!(
            provider_id = provider.id(),
            model_id = %request.model_id,
            has_image = request.image.is_some(),
            "generating reply"
        );
        provider.generate_reply(request).await
    }
}

/// Prior text turns as provider messages; the welcome banner is not context.
fn history_messages(history: &[Message]) -> Vec<ProviderMessage> {
    history
        .iter()
        .filter(|message| message.id != MessageId::WELCOME)
        .filter(|message| !message.body.trim().is_empty())
        .map(|message| {
            let role = match message.sender {
                Sender::Me => Role::User,
                Sender::Other => Role::Assistant,
            };
            ProviderMessage::new(role, message.body.clone())
        })
        .collect()
}
