pub mod error;
pub mod constants;
pub mod config;
pub mod storage;
pub mod llm;
pub mod chat;

// Re-export key types
pub use error::{ChatError, Result};
pub use config::Settings;
pub use storage::{FileBackend, MemoryBackend, Storage, StorageBackend};
pub use llm::{CompletionClient, CompletionOptions, PollinationsClient, RetryPolicy};
pub use chat::{
    ChatAction, ChatExport, ChatSession, ChatState, ChatStore, Message, MessageStats,
    MessageStatus, MessageUpdate, Role, SendOutcome,
};
