use crate::constants::{
    API_KEY_ENV, APP_NAME, DEFAULT_INPUT_PLACEHOLDER, DEFAULT_MODEL, DEFAULT_PAGE_TITLE,
    DEFAULT_TITLE, GEMINI_API_BASE, MODEL_ENV,
};
use crate::errors::{ChatError, ChatResult};
use serde::{Deserialize, Serialize};
use std::{env, fmt, fs, path::Path, path::PathBuf};

#[derive(Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: String,
    pub model: String,
    pub api_base: String,
    pub page_title: String,
    pub title: String,
    pub input_placeholder: String,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            model: DEFAULT_MODEL.to_string(),
            api_base: GEMINI_API_BASE.to_string(),
            page_title: DEFAULT_PAGE_TITLE.to_string(),
            title: DEFAULT_TITLE.to_string(),
            input_placeholder: DEFAULT_INPUT_PLACEHOLDER.to_string(),
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .field("api_base", &self.api_base)
            .field("page_title", &self.page_title)
            .field("title", &self.title)
            .field("input_placeholder", &self.input_placeholder)
            .field("log_level", &self.log_level)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    /// Loads the config from the default location, applies environment
    /// overrides and validates the result.
    pub fn load() -> ChatResult<Config> {
        let config_path = get_config_path()?;
        let mut config = load_or_create(&config_path)?;
        config.apply_overrides(|key| env::var(key).ok());
        validate_config(&config)?;
        Ok(config)
    }

    /// Overrides file values with whatever `lookup` returns for the secret
    /// and model variables. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(API_KEY_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_key = key.trim().to_string();
        }
        if let Some(model) = lookup(MODEL_ENV).filter(|v| !v.trim().is_empty()) {
            self.model = model.trim().to_string();
        }
    }

    pub fn log_dir(&self) -> ChatResult<PathBuf> {
        match &self.log_dir {
            Some(dir) => Ok(dir.clone()),
            None => Ok(config_dir()?.join("logs")),
        }
    }
}

/// Reads the config at `path`, writing a default one first if none exists.
pub fn load_or_create(path: &Path) -> ChatResult<Config> {
    if path.exists() {
        let config_str = fs::read_to_string(path)
            .map_err(|e| ChatError::config_error(format!("Failed to read config file: {}", e)))?;

        return serde_json::from_str(&config_str)
            .map_err(|e| ChatError::config_error(format!("Failed to parse config: {}", e)));
    }

    let config = Config::default();
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            ChatError::config_error(format!("Failed to create config directory: {}", e))
        })?;
    }

    let config_str = serde_json::to_string_pretty(&config)
        .map_err(|e| ChatError::config_error(format!("Failed to serialize config: {}", e)))?;

    fs::write(path, config_str)
        .map_err(|e| ChatError::config_error(format!("Failed to write config file: {}", e)))?;

    Ok(config)
}

fn config_dir() -> ChatResult<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| ChatError::config_error("Could not determine home directory"))?;

    Ok(home_dir.join(".config").join(APP_NAME))
}

pub fn get_config_path() -> ChatResult<PathBuf> {
    Ok(config_dir()?.join("config.json"))
}

pub fn validate_config(config: &Config) -> ChatResult<()> {
    if config.api_key.trim().is_empty() {
        return Err(ChatError::config_error(format!(
            "{} is not set; export it or add api_key to the config file",
            API_KEY_ENV
        )));
    }

    if config.model.trim().is_empty() {
        return Err(ChatError::config_error("Model name is required"));
    }

    if config.api_base.trim().is_empty() {
        return Err(ChatError::config_error("api_base is required"));
    }

    Ok(())
}
