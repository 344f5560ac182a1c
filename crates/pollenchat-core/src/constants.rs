/// pollenchat: centralized constants.
/// Limits, endpoints and storage keys live here and nowhere else.

// ─── Models ───────────────────────────────────────────────────────────────────

pub mod models {
    pub const OPENAI: &str = "openai";
    pub const CLAUDE: &str = "claude";
    pub const MISTRAL: &str = "mistral";
    pub const LLAMA: &str = "llama";
    pub const QWEN: &str = "qwen";
    pub const DEEPSEEK: &str = "deepseek";

    /// Models the text endpoint accepts, paired with their display names.
    pub const CATALOGUE: &[(&str, &str)] = &[
        (OPENAI, "OpenAI GPT"),
        (CLAUDE, "Anthropic Claude"),
        (MISTRAL, "Mistral AI"),
        (LLAMA, "Meta LLaMA"),
        (QWEN, "Alibaba Qwen"),
        (DEEPSEEK, "DeepSeek"),
    ];

    pub const DEFAULT_MODEL: &str = OPENAI;
}

// ─── API Endpoints ────────────────────────────────────────────────────────────

pub mod endpoints {
    pub const POLLINATIONS_TEXT_URL: &str = "https://text.pollinations.ai";
    pub const USER_AGENT: &str = concat!("pollenchat/", env!("CARGO_PKG_VERSION"));
}

// ─── Default Settings ─────────────────────────────────────────────────────────

pub mod defaults {
    pub const TEMPERATURE: f64 = 0.7;
    pub const MAX_TOKENS: u32 = 1000;
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;
    pub const CONNECTION_TEST_TIMEOUT_SECS: u64 = 5;
    pub const RETRY_ATTEMPTS: u32 = 3;
    pub const RETRY_BASE_DELAY_MS: u64 = 1000;
    pub const CONNECTION_TEST_PROMPT: &str = "Hello";
}

// ─── Resource Limits ──────────────────────────────────────────────────────────

pub mod limits {
    pub const MAX_MESSAGE_CHARS: usize = 2000;
    pub const MIN_TEMPERATURE: f64 = 0.0;
    pub const MAX_TEMPERATURE: f64 = 1.0;
    pub const MIN_MAX_TOKENS: u32 = 1;
    pub const MAX_MAX_TOKENS: u32 = 4000;
}

// ─── Storage ──────────────────────────────────────────────────────────────────

pub mod storage_keys {
    pub const MESSAGES: &str = "chat_messages";
    pub const CONVERSATION_ID: &str = "chat_conversation_id";
}

// ─── Config Paths ─────────────────────────────────────────────────────────────

pub mod paths {
    pub const CONFIG_DIR: &str = "pollenchat";
    pub const CONFIG_FILE: &str = "config.toml";
    pub const DATA_DIR: &str = "pollenchat";
}
