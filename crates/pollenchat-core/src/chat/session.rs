use crate::chat::export::{render_text, ChatExport};
use crate::chat::message::{generate_id, Message, MessageStats, MessageStatus, MessageUpdate, Role};
use crate::chat::state::ChatState;
use crate::chat::store::ChatStore;
use crate::constants::limits;
use crate::error::Result;
use crate::llm::{CompletionClient, CompletionOptions};
use chrono::{Local, Utc};
use std::sync::{Mutex, MutexGuard};
use tokio::sync::watch;

const NOTHING_TO_RETRY: &str = "No failed message to retry";

/// Why a send or retry was refused before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// A completion request is already outstanding.
    Busy,
    /// The previous error has not been dismissed.
    UnresolvedError,
    EmptyContent,
    TooLong { chars: usize, max: usize },
    NotFound(String),
    NotUserMessage(String),
    NothingToRetry,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Busy => write!(f, "A message is already being sent"),
            Self::UnresolvedError => write!(f, "Dismiss the current error before sending"),
            Self::EmptyContent => write!(f, "Message content cannot be empty"),
            Self::TooLong { chars, max } => {
                write!(f, "Message is too long ({chars} characters, limit is {max})")
            }
            Self::NotFound(id) => write!(f, "Message not found: {id}"),
            Self::NotUserMessage(id) => write!(f, "Only user messages can be retried: {id}"),
            Self::NothingToRetry => write!(f, "{NOTHING_TO_RETRY}"),
        }
    }
}

/// Result of a send or retry.
#[derive(Debug, Clone, PartialEq)]
pub enum SendOutcome {
    /// The endpoint answered; `reply` was appended.
    Delivered { message_id: String, reply: Message },
    /// Every attempt failed; the user message is now `failed`.
    Failed { message_id: String, error: String },
    /// The conversation was cleared while the request was in flight; the
    /// reply was dropped.
    Abandoned { message_id: String },
    Rejected(Rejection),
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, Self::Delivered { .. })
    }
}

/// High-level conversation operations over a [`ChatStore`] and a
/// [`CompletionClient`].
///
/// The store lock is only held between awaits, never across one, so a
/// second send issued while one is in flight sees `is_loading` and is
/// rejected instead of interleaving.
pub struct ChatSession {
    store: Mutex<ChatStore>,
    client: Box<dyn CompletionClient>,
    options: CompletionOptions,
    max_message_chars: usize,
}

impl ChatSession {
    pub fn new(store: ChatStore, client: Box<dyn CompletionClient>) -> Self {
        Self {
            store: Mutex::new(store),
            client,
            options: CompletionOptions::default(),
            max_message_chars: limits::MAX_MESSAGE_CHARS,
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_max_message_chars(mut self, max: usize) -> Self {
        self.max_message_chars = max;
        self
    }

    fn store(&self) -> MutexGuard<'_, ChatStore> {
        self.store.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn state(&self) -> ChatState {
        self.store().state().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.store().subscribe()
    }

    pub fn options(&self) -> &CompletionOptions {
        &self.options
    }

    pub fn can_send_message(&self) -> bool {
        let store = self.store();
        !store.state().is_loading && store.state().error.is_none()
    }

    /// Send `content` as a new user message and wait for the reply.
    pub async fn send_message(&self, content: &str) -> SendOutcome {
        let (message_id, history) = {
            let mut store = self.store();
            let state = store.state();

            if state.is_loading {
                tracing::warn!("send rejected: request already in flight");
                return SendOutcome::Rejected(Rejection::Busy);
            }
            if state.error.is_some() {
                tracing::warn!("send rejected: unresolved error");
                return SendOutcome::Rejected(Rejection::UnresolvedError);
            }
            if let Err(rejection) = self.check_content(content) {
                store.set_error(Some(rejection.to_string()));
                return SendOutcome::Rejected(rejection);
            }

            let message = Message::user(content.trim());
            let message_id = message.id.clone();
            store.append_message(message);
            store.set_loading(true);
            store.set_error(None);
            (message_id, store.state().messages.clone())
        };

        tracing::info!(id = %message_id, "sending message");
        self.deliver(message_id, &history, false).await
    }

    /// Resend a user message in place: its status goes `sending`, then
    /// `sent` or `failed`. No new user message is appended.
    pub async fn retry_message(&self, id: &str) -> SendOutcome {
        let history = {
            let mut store = self.store();
            let state = store.state();

            if state.is_loading {
                tracing::warn!(id, "retry rejected: request already in flight");
                return SendOutcome::Rejected(Rejection::Busy);
            }
            let Some(index) = state.messages.iter().position(|m| m.id == id) else {
                tracing::warn!(id, "retry target not found");
                return SendOutcome::Rejected(Rejection::NotFound(id.to_string()));
            };
            if state.messages[index].role != Role::User {
                tracing::warn!(id, "retry target is not a user message");
                return SendOutcome::Rejected(Rejection::NotUserMessage(id.to_string()));
            }

            // the prompt is the last user message, so send history only up to the target
            let history = state.messages[..=index].to_vec();
            store.update_message(id, MessageUpdate::status(MessageStatus::Sending));
            store.set_error(None);
            store.set_loading(true);
            history
        };

        tracing::info!(id, "retrying message");
        self.deliver(id.to_string(), &history, true).await
    }

    /// Retry the most recent failed user message.
    pub async fn retry_last_message(&self) -> SendOutcome {
        let target = {
            let mut store = self.store();
            if store.state().is_loading {
                return SendOutcome::Rejected(Rejection::Busy);
            }
            let failed = store
                .state()
                .last_failed_user_message()
                .map(|m| m.id.clone());
            match failed {
                Some(id) => id,
                None => {
                    store.set_error(Some(NOTHING_TO_RETRY.to_string()));
                    return SendOutcome::Rejected(Rejection::NothingToRetry);
                }
            }
        };
        self.retry_message(&target).await
    }

    async fn deliver(&self, message_id: String, history: &[Message], in_place: bool) -> SendOutcome {
        let result = self.client.complete(history, &self.options).await;

        let mut store = self.store();
        let still_present = store.state().find(&message_id).is_some();

        let outcome = match result {
            _ if !still_present => {
                tracing::info!(id = %message_id, "conversation cleared mid-request, dropping result");
                SendOutcome::Abandoned { message_id }
            }
            Ok(text) => {
                if in_place {
                    store.update_message(&message_id, MessageUpdate::status(MessageStatus::Sent));
                }
                let reply = Message::assistant(text);
                store.append_message(reply.clone());
                if store.state().conversation_id.is_none() {
                    store.set_conversation_id(Some(generate_id("conv")));
                }
                SendOutcome::Delivered { message_id, reply }
            }
            Err(e) => {
                tracing::warn!(id = %message_id, error = %e, "message delivery failed");
                let error = e.to_string();
                store.update_message(&message_id, MessageUpdate::status(MessageStatus::Failed));
                store.set_error(Some(error.clone()));
                SendOutcome::Failed { message_id, error }
            }
        };

        store.set_loading(false);
        outcome
    }

    fn check_content(&self, content: &str) -> std::result::Result<(), Rejection> {
        if content.trim().is_empty() {
            return Err(Rejection::EmptyContent);
        }
        let chars = content.chars().count();
        if chars > self.max_message_chars {
            return Err(Rejection::TooLong {
                chars,
                max: self.max_message_chars,
            });
        }
        Ok(())
    }

    /// Empty the conversation and its saved copy. Does nothing unless the
    /// caller has confirmed the intent. Returns whether anything was cleared.
    pub fn clear_messages(&self, confirmed: bool) -> bool {
        if !confirmed {
            return false;
        }
        tracing::info!("clearing conversation");
        self.store().clear();
        true
    }

    pub fn dismiss_error(&self) {
        self.store().set_error(None);
    }

    pub fn update_message_status(&self, id: &str, status: MessageStatus) {
        self.store().update_message(id, MessageUpdate::status(status));
    }

    pub fn export_as_text(&self) -> String {
        render_text(self.store().state(), &Local::now())
    }

    pub fn export_as_json(&self) -> Result<String> {
        ChatExport::from_state(self.store().state(), Utc::now()).to_json()
    }

    pub fn get_message_stats(&self) -> MessageStats {
        MessageStats::from_messages(&self.store().state().messages)
    }

    pub fn last_message(&self) -> Option<Message> {
        self.store().state().messages.last().cloned()
    }

    pub fn last_user_message(&self) -> Option<Message> {
        self.last_with_role(Role::User)
    }

    pub fn last_assistant_message(&self) -> Option<Message> {
        self.last_with_role(Role::Assistant)
    }

    fn last_with_role(&self, role: Role) -> Option<Message> {
        self.store()
            .state()
            .messages
            .iter()
            .rev()
            .find(|m| m.role == role)
            .cloned()
    }

    pub fn has_failed_messages(&self) -> bool {
        self.store().state().messages.iter().any(|m| m.is_failed())
    }

    pub fn failed_messages(&self) -> Vec<Message> {
        self.store()
            .state()
            .messages
            .iter()
            .filter(|m| m.is_failed())
            .cloned()
            .collect()
    }
}
