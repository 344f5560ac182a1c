use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::chat::{ChatSession, ChatStore};
use crate::constants::{defaults, endpoints, limits, models, paths};
use crate::error::ChatError;
use crate::llm::{CompletionOptions, PollinationsClient, RetryPolicy};
use crate::storage::{FileBackend, Storage};

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Settings {
    #[serde(default)]
    pub api: ApiSettings,
    #[serde(default)]
    pub chat: ChatSettings,
    #[serde(default)]
    pub storage: StorageSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ApiSettings {
    pub base_url: String,
    pub timeout_secs: u64,
    pub retry_attempts: u32,
    pub retry_base_delay_ms: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChatSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
    pub max_message_chars: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    /// Overrides the platform data directory.
    pub data_dir: Option<PathBuf>,
    pub persist: bool,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: endpoints::POLLINATIONS_TEXT_URL.to_string(),
            timeout_secs: defaults::REQUEST_TIMEOUT_SECS,
            retry_attempts: defaults::RETRY_ATTEMPTS,
            retry_base_delay_ms: defaults::RETRY_BASE_DELAY_MS,
        }
    }
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            model: models::DEFAULT_MODEL.to_string(),
            temperature: defaults::TEMPERATURE,
            max_tokens: Some(defaults::MAX_TOKENS),
            max_message_chars: limits::MAX_MESSAGE_CHARS,
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            persist: true,
        }
    }
}

impl Settings {
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(paths::CONFIG_DIR)
            .join(paths::CONFIG_FILE)
    }

    pub fn load() -> Self {
        Self::load_from(&Self::config_path())
    }

    /// Read settings from `path`, falling back to defaults when the file is
    /// missing or unreadable.
    pub fn load_from(path: &std::path::Path) -> Self {
        if path.exists() {
            match std::fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => tracing::warn!(path = %path.display(), error = %e, "invalid config, using defaults"),
                },
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "unreadable config, using defaults"),
            }
        }
        Self::default()
    }

    pub fn save(&self) -> Result<(), ChatError> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<(), ChatError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| ChatError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(
            self.api.retry_attempts,
            Duration::from_millis(self.api.retry_base_delay_ms),
        )
    }

    /// Completion options from settings. Errors if any value is out of range.
    pub fn completion_options(&self) -> Result<CompletionOptions, ChatError> {
        let options = CompletionOptions::default()
            .with_model(self.chat.model.clone())
            .with_temperature(self.chat.temperature)
            .with_max_tokens(self.chat.max_tokens);
        options.validate()?;
        Ok(options)
    }

    pub fn build_client(&self) -> PollinationsClient {
        PollinationsClient::new()
            .with_base_url(self.api.base_url.clone())
            .with_timeout(Duration::from_secs(self.api.timeout_secs))
            .with_retry(self.retry_policy())
    }

    /// Storage for the transcript: a file store when persistence is on,
    /// otherwise an in-memory one. An unusable data directory degrades to
    /// in-memory storage.
    pub fn build_storage(&self) -> Storage {
        if !self.storage.persist {
            return Storage::in_memory();
        }
        let backend = match &self.storage.data_dir {
            Some(dir) => FileBackend::with_dir(dir.clone()),
            None => FileBackend::new(),
        };
        match backend {
            Ok(backend) => Storage::new(Box::new(backend)),
            Err(e) => {
                tracing::warn!(error = %e, "data directory unavailable, keeping the conversation in memory");
                Storage::in_memory()
            }
        }
    }

    /// A ready-to-use session, hydrated from saved state.
    pub fn build_session(&self) -> Result<ChatSession, ChatError> {
        let options = self.completion_options()?;
        let mut store = ChatStore::new(self.build_storage());
        store.hydrate();

        Ok(ChatSession::new(store, Box::new(self.build_client()))
            .with_options(options)
            .with_max_message_chars(self.chat.max_message_chars))
    }
}
