use crate::chat::message::{Message, MessageUpdate};
use crate::chat::state::{reduce, ChatAction, ChatState};
use crate::constants::storage_keys;
use crate::storage::Storage;
use tokio::sync::watch;

/// Owner of the conversation state.
///
/// All mutations go through [`ChatStore::dispatch`]: the reducer builds the
/// next state, which replaces the old one whole, then the persistence side
/// effects run and subscribers are notified.
pub struct ChatStore {
    state: ChatState,
    storage: Storage,
    notify: watch::Sender<ChatState>,
}

impl ChatStore {
    pub fn new(storage: Storage) -> Self {
        let (notify, _) = watch::channel(ChatState::default());
        Self {
            state: ChatState::default(),
            storage,
            notify,
        }
    }

    pub fn in_memory() -> Self {
        Self::new(Storage::in_memory())
    }

    /// Restore the transcript and conversation id saved by a previous run.
    pub fn hydrate(&mut self) {
        let saved: Vec<Message> = self.storage.get(storage_keys::MESSAGES, Vec::new());
        let saved_id: Option<String> = self.storage.get(storage_keys::CONVERSATION_ID, None);

        if !saved.is_empty() {
            tracing::info!(count = saved.len(), "restored saved messages");
            self.load(saved);
        }
        if saved_id.is_some() {
            self.set_conversation_id(saved_id);
        }
    }

    pub fn state(&self) -> &ChatState {
        &self.state
    }

    /// Receiver that observes every state published after a transition.
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.notify.subscribe()
    }

    pub fn dispatch(&mut self, action: ChatAction) {
        let is_clear = matches!(action, ChatAction::ClearMessages);
        let next = reduce(&self.state, action);
        let messages_changed = next.messages != self.state.messages;
        let id_changed = next.conversation_id != self.state.conversation_id;
        self.state = next;

        if is_clear {
            self.storage.remove(storage_keys::MESSAGES);
            self.storage.remove(storage_keys::CONVERSATION_ID);
        } else {
            if messages_changed && !self.state.messages.is_empty() {
                self.storage.set(storage_keys::MESSAGES, &self.state.messages);
            }
            if id_changed {
                if let Some(id) = &self.state.conversation_id {
                    self.storage.set(storage_keys::CONVERSATION_ID, id);
                }
            }
        }

        self.notify.send_replace(self.state.clone());
    }

    pub fn append_message(&mut self, message: Message) {
        self.dispatch(ChatAction::AddMessage(message));
    }

    pub fn update_message(&mut self, id: impl Into<String>, update: MessageUpdate) {
        self.dispatch(ChatAction::UpdateMessage {
            id: id.into(),
            update,
        });
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.dispatch(ChatAction::SetLoading(loading));
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.dispatch(ChatAction::SetError(error));
    }

    pub fn clear(&mut self) {
        self.dispatch(ChatAction::ClearMessages);
    }

    pub fn load(&mut self, messages: Vec<Message>) {
        self.dispatch(ChatAction::LoadMessages(messages));
    }

    pub fn set_conversation_id(&mut self, id: Option<String>) {
        self.dispatch(ChatAction::SetConversationId(id));
    }
}
