use std::sync::Arc;

mod provider;
mod rig_adapter;

pub use provider::{
    InlineImage, LlmProvider, ProviderConfig, ProviderError, ProviderMessage, ProviderResult,
    ReplyRequest, Role,
};
pub use rig_adapter::{DEFAULT_GEMINI_MODEL, RIG_GEMINI_PROVIDER_ID, RigGeminiAdapter};

/// Creates the provider named by `config.provider_id`; blank selects Gemini.
pub fn create_provider(mut config: ProviderConfig) -> ProviderResult<Arc<dyn LlmProvider>> {
    if config.provider_id.trim().is_empty() {
        config.provider_id = RIG_GEMINI_PROVIDER_ID.to_string();
    }

    match config.provider_id.as_str() {
        "gemini" | "google" | "rig-gemini" => {
            config.provider_id = RIG_GEMINI_PROVIDER_ID.to_string();
            Ok(Arc::new(RigGeminiAdapter::new(config)?))
        }
        _ => Err(ProviderError::UnsupportedProvider {
            stage: "create-provider",
            provider_id: config.provider_id,
        }),
    }
}
