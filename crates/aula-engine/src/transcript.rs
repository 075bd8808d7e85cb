//! Prompt assembly over a flat conversation transcript.
//!
//! The transcript mirrors the displayed conversation as role-prefixed
//! text lines and is the only representation ever sent to the backend.
//! It is append-only between resets: lines are never edited or removed
//! once recorded.

use std::fmt::Write;

/// System instruction block sent ahead of every transcript.
const SYSTEM_PROMPT: &str = r#"You are **Aula**, a virtual study assistant for **Computer Science and Digital Skills**, helping secondary-school students.

Your goal is to teach clearly, with enthusiasm and patience, like an approachable teacher. Answer in the language the student writes in.

The introductory greeting is shown to the student by the interface exactly once. Do not repeat the introduction in your replies.

Topics you cover:
- Programming (algorithms, binary, pseudocode)
- Variables, control structures, functions
- OOP, databases, networks, cybersecurity
- Digital transformation, AI, bits and bytes, history of computing

If a question falls outside the subject, say so kindly and offer something related to technology instead.

Style: explain with everyday examples (games, social media, apps), keep a positive and encouraging tone, and never repeat the introduction."#;

/// Marker line recorded once the greeting has been displayed.
const WELCOME_MARKER: &str =
    "System: The welcome greeting was already shown to the student. Do not repeat it.";

/// Flat ordered transcript of role-prefixed lines.
///
/// Owned by a conversation session; there is no shared global history.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    lines: Vec<String>,
    welcome_marked: bool,
}

impl Transcript {
    /// Create an empty transcript.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a student line.
    pub fn record_user(&mut self, text: &str) {
        self.lines.push(format!("Student: {text}"));
    }

    /// Append an assistant line.
    pub fn record_assistant(&mut self, text: &str) {
        self.lines.push(format!("Assistant: {text}"));
    }

    /// Record that the greeting was already displayed.
    ///
    /// The marker text itself is appended, not the full greeting, so the
    /// backend never sees the greeting twice. Idempotent per session.
    pub fn mark_welcome_shown(&mut self) {
        if !self.welcome_marked {
            self.welcome_marked = true;
            self.lines.push(WELCOME_MARKER.to_string());
        }
    }

    /// Build the full prompt: instruction block plus the transcript,
    /// most-recent-last.
    pub fn build_prompt(&self) -> String {
        let mut prompt = String::new();
        prompt.push_str(SYSTEM_PROMPT);
        prompt.push_str("\n\nConversation history:\n");
        for line in &self.lines {
            let _ = writeln!(prompt, "{line}");
        }
        prompt.trim_end().to_string()
    }

    /// Empty the transcript and clear the welcome marker.
    pub fn reset(&mut self) {
        self.lines.clear();
        self.welcome_marked = false;
    }

    /// Number of recorded lines.
    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The recorded lines, oldest first.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }
}
