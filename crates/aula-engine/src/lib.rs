//! aula-engine: Headless engine for an educational chat assistant
//!
//! This crate provides the conversation logic for aula, including:
//! - Conversation state (message list, loading flag, welcome flag)
//! - Prompt assembly over a role-prefixed transcript
//! - A backend client with reply-envelope normalization
//! - Optional spoken rendering of replies

pub mod backend;
pub mod config;
pub mod message;
pub mod session;
pub mod speech;
pub mod store;
pub mod transcript;

// Re-export commonly used types
pub use backend::{
    normalize, BackendError, Generate, GenerateRequest, GenerateResponse, HttpBackend,
    ReplyEnvelope,
};
pub use config::{BackendConfig, Config, ConfigError, SpeechConfig, API_KEY_ENV};
pub use message::{Message, Role};
pub use session::{is_greeting_reply, ChatSession, WELCOME_TEXT};
pub use speech::{CommandSpeech, NullSpeech, Speech, SpeechError, Utterance};
pub use store::{FileWelcomeStore, MemoryWelcomeStore, StoreError, WelcomeStore};
pub use transcript::Transcript;

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
