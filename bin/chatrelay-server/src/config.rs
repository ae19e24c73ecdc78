//! Server configuration, loaded from environment variables at startup.

/// Runtime configuration for chatrelay-server.
///
/// Every field has a default so the server starts without any environment
/// variables set; only the provider key is needed for generation to work.
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// sqlx SQLite URL for the conversation log and vector index
    /// (default: `"sqlite://chatrelay.db"`). The file is created if missing.
    pub database_url: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Optional directory for daily-rotated log files.
    pub log_dir: Option<String>,

    /// Comma-separated list of allowed CORS origins. `None` allows any origin.
    pub cors_allowed_origins: Option<String>,

    /// Serve Swagger UI and the OpenAPI document.
    pub enable_swagger: bool,

    /// Provider settings for chat, completion and embedding calls.
    pub provider: ProviderConfig,

    /// Number of passages retrieved for domain-augmented replies.
    pub match_count: usize,

    /// How many persisted messages seed the conversation context.
    /// `0` disables seeding: every request is answered without history.
    pub history_turns: usize,
}

/// Settings for the OpenAI-compatible generation provider.
#[derive(Clone)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub chat_model: String,
    pub completion_model: String,
    pub embedding_model: String,
    pub temperature: f32,
    pub timeout_secs: u64,
}

// The key must never reach the logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("chat_model", &self.chat_model)
            .field("completion_model", &self.completion_model)
            .field("embedding_model", &self.embedding_model)
            .field("temperature", &self.temperature)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self {
            bind_address: env_or("CHATRELAY_BIND", "0.0.0.0:3000"),
            database_url: env_or("CHATRELAY_DATABASE_URL", "sqlite://chatrelay.db"),
            log_level: env_or("CHATRELAY_LOG", "info"),
            log_json: env_flag("CHATRELAY_LOG_JSON", false),
            log_dir: env_opt("CHATRELAY_LOG_DIR"),
            cors_allowed_origins: env_opt("CHATRELAY_CORS_ORIGINS"),
            enable_swagger: env_flag("CHATRELAY_ENABLE_SWAGGER", true),
            provider: ProviderConfig {
                api_key: env_opt("OPENAI_API_KEY"),
                base_url: env_or("CHATRELAY_OPENAI_BASE_URL", "https://api.openai.com/v1"),
                chat_model: env_or("CHATRELAY_CHAT_MODEL", "gpt-3.5-turbo"),
                completion_model: env_or("CHATRELAY_COMPLETION_MODEL", "gpt-3.5-turbo-instruct"),
                embedding_model: env_or("CHATRELAY_EMBEDDING_MODEL", "text-embedding-ada-002"),
                temperature: parse_env("CHATRELAY_TEMPERATURE", 0.7),
                timeout_secs: parse_env("CHATRELAY_PROVIDER_TIMEOUT_SECS", 120),
            },
            match_count: parse_env("CHATRELAY_MATCH_COUNT", 4),
            history_turns: parse_env("CHATRELAY_HISTORY_TURNS", 20),
        }
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_owned())
}

/// Unset and blank values both count as absent.
fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_flag(key: &str, default: bool) -> bool {
    std::env::var(key)
        .map(|v| parse_flag(&v).unwrap_or(default))
        .unwrap_or(default)
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim() {
        "1" => Some(true),
        "0" => Some(false),
        v if v.eq_ignore_ascii_case("true") => Some(true),
        v if v.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
