pub mod state;

pub use state::{API_KEY_ENV, Settings, SettingsError, SettingsStore};
