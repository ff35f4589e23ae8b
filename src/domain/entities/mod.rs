pub mod chat_message;
pub mod content;
pub mod user;
