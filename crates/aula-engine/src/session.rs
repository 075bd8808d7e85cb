//! Conversation state for a chat session.
//!
//! A session owns the displayed message list, the loading flag, the
//! transcript sent to the backend, and the persisted welcome flag. All
//! state flows through the session object; nothing is shared globally.

use chrono::{DateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use crate::backend::Generate;
use crate::message::Message;
use crate::speech::{Speech, Utterance};
use crate::store::WelcomeStore;
use crate::transcript::Transcript;

/// Fixed greeting shown (and spoken) when a conversation starts.
pub const WELCOME_TEXT: &str = "¡Hola! Soy Aula, tu asistente virtual para Ciencias de la Computación y Digitalización.\nEstoy aquí para ayudarte a descubrir la programación y el mundo digital.\n¿Sobre qué tema te gustaría aprender hoy?";

/// A single chat conversation.
pub struct ChatSession {
    /// Unique session identifier (UUID).
    id: String,
    /// When the session was created.
    started_at: DateTime<Utc>,
    messages: Vec<Message>,
    loading: bool,
    should_scroll: bool,
    welcome_spoken: bool,
    current_utterance: Option<Utterance>,
    transcript: Transcript,
    generator: Box<dyn Generate>,
    store: Box<dyn WelcomeStore>,
    speech: Box<dyn Speech>,
    locale: String,
}

impl ChatSession {
    /// Create a session over the given backend, flag store, and
    /// playback capability.
    pub fn new(
        generator: Box<dyn Generate>,
        store: Box<dyn WelcomeStore>,
        speech: Box<dyn Speech>,
        locale: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            started_at: Utc::now(),
            messages: Vec::new(),
            loading: false,
            should_scroll: false,
            welcome_spoken: false,
            current_utterance: None,
            transcript: Transcript::new(),
            generator,
            store,
            speech,
            locale: locale.into(),
        }
    }

    /// Session identifier.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// When the session was created.
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Displayed messages, oldest first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Whether a generate call is outstanding.
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// The outbound transcript.
    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    /// Consume the pending scroll request, if any.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.should_scroll)
    }

    /// Show the greeting and, on the first-ever run, persist the flag
    /// and speak the greeting aloud.
    pub fn initialize(&mut self) {
        self.messages.push(Message::assistant(WELCOME_TEXT));

        let seen = self.store.is_set().unwrap_or_else(|e| {
            warn!(error = %e, "welcome flag unreadable, assuming first run");
            false
        });

        if seen {
            // Greeting already happened in an earlier session.
            self.should_scroll = true;
            return;
        }

        if let Err(e) = self.store.set() {
            warn!(error = %e, "failed to persist welcome flag");
        }
        self.transcript.mark_welcome_shown();
        self.speak(WELCOME_TEXT);
        self.welcome_spoken = true;
        self.should_scroll = true;
    }

    /// Send a student message to the backend and append the reply.
    ///
    /// Empty or whitespace-only input is ignored. Transport failures
    /// become a visible assistant-role error message; there is no
    /// retry. Nothing prevents a second call while one is outstanding;
    /// each completion settles the loading flag on its own.
    pub async fn submit(&mut self, input: &str) {
        let text = input.trim();
        if text.is_empty() {
            return;
        }

        self.messages.push(Message::user(text));
        self.transcript.record_user(text);
        self.loading = true;
        self.should_scroll = true;

        let prompt = self.transcript.build_prompt();
        let result = self.generator.generate(&prompt).await;
        match result {
            Ok(reply) => {
                self.messages.push(Message::assistant(&reply));
                self.transcript.record_assistant(&reply);
                self.loading = false;
                self.should_scroll = true;

                // Skip playback when the reply just restates the
                // already-spoken greeting.
                if !(self.welcome_spoken && is_greeting_reply(&reply)) {
                    self.speak(&reply);
                }
            }
            Err(e) => {
                warn!(error = %e, "generate call failed");
                let error_text = format!("Error: {e}");
                self.messages.push(Message::assistant(&error_text));
                self.transcript.record_assistant(&error_text);
                self.loading = false;
                self.should_scroll = true;
            }
        }
    }

    /// Start a new conversation: drop all state, clear the persisted
    /// flag, and run `initialize` again.
    pub fn reset(&mut self) {
        self.messages.clear();
        self.transcript.reset();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "failed to clear welcome flag");
        }
        self.stop_speaking();
        self.welcome_spoken = false;
        self.loading = false;
        self.initialize();
    }

    /// Start an utterance, superseding any prior one.
    fn speak(&mut self, text: &str) {
        self.stop_speaking();
        match self.speech.start(text, &self.locale) {
            Ok(utterance) => self.current_utterance = Some(utterance),
            Err(e) => warn!(error = %e, "spoken playback failed"),
        }
    }

    fn stop_speaking(&mut self) {
        if let Some(mut utterance) = self.current_utterance.take() {
            self.speech.stop(&mut utterance);
        }
    }
}

/// Whether a reply looks like a restatement of the fixed greeting.
///
/// Matches replies whose trimmed, lowercased text starts with a "hola"
/// variant or carries the assistant's self-introduction markers.
pub fn is_greeting_reply(reply: &str) -> bool {
    let r = reply.trim().to_lowercase();
    if r.is_empty() {
        return false;
    }
    if r.starts_with("¡hola") || r.starts_with("hola") {
        return true;
    }
    if r.contains("soy aula") || r.contains("tu asistente virtual") {
        return true;
    }
    regex::Regex::new(r"sobre qué tema te gustaría|estoy aquí para ayudarte")
        .map(|re| re.is_match(&r))
        .unwrap_or(false)
}
