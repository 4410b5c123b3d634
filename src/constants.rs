// UI Constants
pub const USER_LABEL: &str = "You";
pub const MODEL_LABEL: &str = "Gemini";
pub const SPINNER_INTERVAL_MS: u64 = 80;
pub const EVENT_POLL_MS: u64 = 100;

// API Constants
pub const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";
pub const GEMINI_API_VERSION: &str = "v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

// Config Constants
pub const APP_NAME: &str = "gemchat";
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";
pub const MODEL_ENV: &str = "GEMINI_MODEL";
pub const DEFAULT_PAGE_TITLE: &str = "My AI App";
pub const DEFAULT_TITLE: &str = "Chat with Gemini AI";
pub const DEFAULT_INPUT_PLACEHOLDER: &str = "What is up?";
