//! Answer synthesis: prompt construction and the chat-completions client

pub mod chat;
pub mod prompt;

pub use chat::ChatClient;
pub use prompt::{PromptBuilder, NOT_AVAILABLE};
