mod message;
mod state;
mod store;
mod session;
pub mod export;

pub use message::{generate_id, Message, MessageStats, MessageStatus, MessageUpdate, Role};
pub use state::{reduce, ChatAction, ChatState};
pub use store::ChatStore;
pub use session::{ChatSession, Rejection, SendOutcome};
pub use export::ChatExport;
