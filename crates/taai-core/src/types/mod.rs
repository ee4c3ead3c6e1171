pub mod message;
pub mod session;

pub use message::{ChatMessage, HistoryTurn, Message, MessageId, Role, WELCOME_MESSAGE_ID};
pub use session::{ChatSession, DEFAULT_SESSION_TITLE, TITLE_MAX_CHARS};
