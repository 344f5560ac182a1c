use crate::chat::message::{Message, MessageStatus, MessageUpdate, Role};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatState {
    pub messages: Vec<Message>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub conversation_id: Option<String>,
}

impl ChatState {
    pub fn find(&self, id: &str) -> Option<&Message> {
        self.messages.iter().find(|m| m.id == id)
    }

    pub fn last_failed_user_message(&self) -> Option<&Message> {
        self.messages
            .iter()
            .rev()
            .find(|m| m.is_user() && m.is_failed())
    }
}

/// Every way the conversation state can change.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatAction {
    AddMessage(Message),
    UpdateMessage { id: String, update: MessageUpdate },
    SetLoading(bool),
    SetError(Option<String>),
    ClearMessages,
    LoadMessages(Vec<Message>),
    SetConversationId(Option<String>),
}

/// Apply one action to a state, producing the next state.
pub fn reduce(state: &ChatState, action: ChatAction) -> ChatState {
    let mut next = state.clone();
    match action {
        ChatAction::AddMessage(message) => {
            next.messages.push(message);
            next.error = None;
        }
        ChatAction::UpdateMessage { id, update } => {
            if let Some(message) = next.messages.iter_mut().find(|m| m.id == id) {
                apply_update(message, update);
            }
        }
        ChatAction::SetLoading(loading) => {
            next.is_loading = loading;
        }
        ChatAction::SetError(error) => {
            if error.is_some() {
                next.is_loading = false;
            }
            next.error = error;
        }
        ChatAction::ClearMessages => {
            next.messages.clear();
            next.error = None;
            next.conversation_id = None;
        }
        ChatAction::LoadMessages(messages) => {
            next.messages = messages;
        }
        ChatAction::SetConversationId(id) => {
            next.conversation_id = id;
        }
    }
    next
}

fn apply_update(message: &mut Message, update: MessageUpdate) {
    if let Some(status) = update.status {
        // assistant replies stay `received`
        if message.role == Role::Assistant && status != MessageStatus::Received {
            tracing::warn!(id = %message.id, %status, "ignoring status change on assistant message");
        } else {
            message.status = status;
        }
    }
    if let Some(content) = update.content {
        message.content = content;
    }
}
