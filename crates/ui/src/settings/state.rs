use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Json, Serialized},
};
use serde::{Deserialize, Serialize};
use snafu::{ResultExt, Snafu};
use telechat_llm::{DEFAULT_GEMINI_MODEL, ProviderConfig, RIG_GEMINI_PROVIDER_ID};

use crate::session::DEFAULT_ROOM_ENTRY_DELAY;

/// Directory under the platform config dir holding the settings file.
pub const SETTINGS_DIRECTORY_NAME: &str = "telechat";
/// File name of the JSON settings file.
pub const SETTINGS_FILE_NAME: &str = "settings.json";
/// Environment variable holding the Gemini API key.
pub const API_KEY_ENV: &str = "API_KEY";

/// Startup configuration for the provider, the gateway and the room entry delay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_provider_id")]
    pub provider_id: String,
    #[serde(default)]
    pub api_key: String,
    /// Empty means the provider's own endpoint.
    #[serde(default)]
    pub endpoint: String,
    #[serde(default = "default_model_name")]
    pub model_name: String,
    #[serde(default)]
    pub include_history: bool,
    #[serde(default = "default_room_entry_delay_ms")]
    pub room_entry_delay_ms: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            provider_id: default_provider_id(),
            api_key: String::new(),
            endpoint: String::new(),
            model_name: default_model_name(),
            include_history: false,
            room_entry_delay_ms: default_room_entry_delay_ms(),
        }
    }
}

impl Settings {
    /// `None` when no API key is configured; the gateway then answers every
    /// send with its fallback reply.
    pub fn to_provider_config(&self) -> Option<ProviderConfig> {
        if self.api_key.trim().is_empty() {
            return None;
        }

        Some(ProviderConfig::new(
            &self.provider_id,
            &self.api_key,
            &self.endpoint,
        ))
    }

    /// Fixed latency between submitting a room form and opening the chat.
    pub fn room_entry_delay(&self) -> Duration {
        Duration::from_millis(self.room_entry_delay_ms)
    }

    /// Trims every text field; blank provider and model fall back to defaults.
    pub fn normalized(mut self) -> Self {
        self.provider_id = non_blank_or(self.provider_id, default_provider_id);
        self.api_key = self.api_key.trim().to_string();
        self.endpoint = self.endpoint.trim().to_string();
        self.model_name = non_blank_or(self.model_name, default_model_name);
        self
    }
}

/// Settings resolved once at startup from defaults, the JSON file and the environment.
pub struct SettingsStore {
    settings: Settings,
    config_path: PathBuf,
}

impl SettingsStore {
    /// Returns `<config dir>/telechat`, or `.telechat` when the platform has none.
    pub fn default_config_dir() -> PathBuf {
        dirs::config_dir()
            .map(|path| path.join(SETTINGS_DIRECTORY_NAME))
            .unwrap_or_else(|| PathBuf::from(".telechat"))
    }

    /// Returns the default settings file path.
    pub fn default_config_path() -> PathBuf {
        Self::default_config_dir().join(SETTINGS_FILE_NAME)
    }

    /// Loads settings from `config_path` and the environment.
    ///
    /// A malformed file is logged and skipped; `API_KEY` still applies.
    pub fn new(config_path: PathBuf) -> Self {
        let figment = Self::figment(&config_path).merge(api_key_env());
        let settings = match extract(figment, &config_path) {
            Ok(settings) => settings,
            Err(error) => {
                tracing::warn!(
                    stage = error.stage(),
                    error = %error,
                    "failed to load settings file, using defaults and environment"
                );
                Self::defaults_with_env(&config_path)
            }
        };

        Self {
            settings,
            config_path,
        }
    }

    /// Loads settings from the default config path.
    pub fn load() -> Self {
        Self::new(Self::default_config_path())
    }

    /// Returns the resolved settings.
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the settings file path this store was loaded from.
    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Defaults merged with the settings file, when present.
    pub fn figment(path: &Path) -> Figment {
        let figment = Figment::from(Serialized::defaults(Settings::default()));
        if path.exists() {
            figment.merge(Json::file(path))
        } else {
            tracing::info!(path = %path.display(), "settings file not found, using defaults");
            figment
        }
    }

    fn defaults_with_env(path: &Path) -> Settings {
        extract(defaults_with_env_figment(), path).unwrap_or_else(|error| {
            tracing::warn!(stage = error.stage(), error = %error, "ignoring environment settings");
            Settings::default()
        })
    }
}

fn defaults_with_env_figment() -> Figment {
    Figment::from(Serialized::defaults(Settings::default())).merge(api_key_env())
}

fn api_key_env() -> Env {
    Env::raw().only(&[API_KEY_ENV])
}

fn extract(figment: Figment, path: &Path) -> Result<Settings, SettingsError> {
    let settings = figment.extract::<Settings>().context(ExtractSnafu {
        stage: "extract-settings",
        path: path.to_path_buf(),
    })?;
    Ok(settings.normalized())
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum SettingsError {
    #[snafu(display("failed to read settings from {path:?} on `{stage}`: {source}"))]
    Extract {
        stage: &'static str,
        path: PathBuf,
        #[snafu(source(from(figment::Error, Box::new)))]
        source: Box<figment::Error>,
    },
}

impl SettingsError {
    /// Returns the loading stage where the error was raised.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Extract { stage, .. } => stage,
        }
    }
}

fn non_blank_or(value: String, default: fn() -> String) -> String {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        default()
    } else {
        trimmed.to_string()
    }
}

fn default_provider_id() -> String {
    RIG_GEMINI_PROVIDER_ID.to_string()
}

fn default_model_name() -> String {
    DEFAULT_GEMINI_MODEL.to_string()
}

fn default_room_entry_delay_ms() -> u64 {
    DEFAULT_ROOM_ENTRY_DELAY.as_millis() as u64
}
