use snafu::{ResultExt, Whatever};
use telechat::app::ChatApp;
use telechat::chat::MessageGateway;
use telechat::settings::{API_KEY_ENV, SettingsStore};
use telechat::terminal;
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Whatever> {
    // Logs go to stderr so they never interleave with the chat transcript.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let store = SettingsStore::load();
    let settings = store.settings().clone();
    tracing::info!(
        path = %store.config_path().display(),
        provider_id = %settings.provider_id,
        model = %settings.model_name,
        include_history = settings.include_history,
        "settings loaded"
    );

    let provider = match settings.to_provider_config() {
        Some(config) => {
            let provider = telechat_llm::create_provider(config)
                .whatever_context("failed to initialize the reply provider")?;
            tracing::debug!(
                provider_id = provider.id(),
                default_model = provider.default_model(),
                "reply provider ready"
            );
            Some(provider)
        }
        None => {
            tracing::warn!(
                env = API_KEY_ENV,
                "no API key configured, replies will use the fallback message"
            );
            None
        }
    };

    let gateway = MessageGateway::new(provider, settings.model_name.clone())
        .with_history(settings.include_history);
    let (app, completions) = ChatApp::new(gateway, &settings);

    terminal::run(
        app,
        completions,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
    )
    .await
    .whatever_context("terminal session failed")
}
