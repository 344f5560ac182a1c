use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    #[serde(alias = "ai")]
    Assistant,
}

impl Role {
    pub fn label(&self) -> &'static str {
        match self {
            Self::User => "You",
            Self::Assistant => "Assistant",
        }
    }
}

/// Delivery status of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Sending,
    Sent,
    Failed,
    Received,
}

impl std::fmt::Display for MessageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Sending => "sending",
            Self::Sent => "sent",
            Self::Failed => "failed",
            Self::Received => "received",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    pub status: MessageStatus,
}

impl Message {
    /// A user message, created optimistically as `sent`.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(Role::User, content, MessageStatus::Sent)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(Role::Assistant, content, MessageStatus::Received)
    }

    fn new(role: Role, content: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            id: generate_id("msg"),
            role,
            content: content.into(),
            timestamp: Utc::now().timestamp_millis(),
            status,
        }
    }

    pub fn is_user(&self) -> bool {
        self.role == Role::User
    }

    pub fn is_failed(&self) -> bool {
        self.status == MessageStatus::Failed
    }
}

/// Partial update merged into an existing message by id.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MessageUpdate {
    pub status: Option<MessageStatus>,
    pub content: Option<String>,
}

impl MessageUpdate {
    pub fn status(status: MessageStatus) -> Self {
        Self {
            status: Some(status),
            content: None,
        }
    }
}

/// Counts over the current transcript.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageStats {
    pub total: usize,
    pub user: usize,
    pub assistant: usize,
    pub failed: usize,
    pub sending: usize,
}

impl MessageStats {
    pub fn from_messages(messages: &[Message]) -> Self {
        let mut stats = Self {
            total: messages.len(),
            ..Self::default()
        };
        for m in messages {
            match m.role {
                Role::User => stats.user += 1,
                Role::Assistant => stats.assistant += 1,
            }
            match m.status {
                MessageStatus::Failed => stats.failed += 1,
                MessageStatus::Sending => stats.sending += 1,
                _ => {}
            }
        }
        stats
    }
}

/// Opaque locally-unique identifier, e.g. `msg_1f0c…`.
pub fn generate_id(prefix: &str) -> String {
    format!("{}_{}", prefix, Uuid::new_v4().simple())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constructors() {
        let user = Message::user("Hello");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.status, MessageStatus::Sent);
        assert!(user.id.starts_with("msg_"));
        assert!(user.timestamp > 0);

        let reply = Message::assistant("Hi");
        assert_eq!(reply.role, Role::Assistant);
        assert_eq!(reply.status, MessageStatus::Received);
        assert_ne!(user.id, reply.id);
    }

    #[test]
    fn test_serialized_shape() {
        let msg = Message {
            id: "msg_1".into(),
            role: Role::Assistant,
            content: "Hi".into(),
            timestamp: 1_700_000_000_000,
            status: MessageStatus::Received,
        };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["role"], "assistant");
        assert_eq!(json["status"], "received");
        assert_eq!(json["timestamp"], 1_700_000_000_000i64);
    }

    #[test]
    fn test_legacy_ai_role_alias() {
        let raw = r#"{"id":"m","role":"ai","content":"x","timestamp":1,"status":"received"}"#;
        let msg: Message = serde_json::from_str(raw).unwrap();
        assert_eq!(msg.role, Role::Assistant);
    }

    #[test]
    fn test_stats_counts() {
        let mut failed = Message::user("a");
        failed.status = MessageStatus::Failed;
        let mut sending = Message::user("b");
        sending.status = MessageStatus::Sending;
        let messages = vec![failed, sending, Message::user("c"), Message::assistant("d")];

        let stats = MessageStats::from_messages(&messages);
        assert_eq!(
            stats,
            MessageStats {
                total: 4,
                user: 3,
                assistant: 1,
                failed: 1,
                sending: 1,
            }
        );
    }
}
