//! Spoken rendering of assistant replies.
//!
//! Playback is fire-and-forget: starting an utterance returns a handle
//! and the audio plays in the background. Stopping an utterance is
//! idempotent. Playback failures never reach chat state; callers log
//! them and move on.

use std::process::Stdio;

use thiserror::Error;
use tokio::process::{Child, Command};

/// Error type for playback operations.
#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("speech command is empty")]
    EmptyCommand,

    #[error("speech command not found: {0}")]
    CommandNotFound(String),

    #[error("failed to start speech command: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Handle for an in-flight utterance.
///
/// Dropping the handle lets playback run to completion; the child is
/// still reaped on process exit via `kill_on_drop`.
#[derive(Debug, Default)]
pub struct Utterance {
    child: Option<Child>,
}

/// Cancellable playback capability.
pub trait Speech: Send + Sync {
    /// Begin speaking `text` in the given locale; returns a handle to
    /// the running utterance.
    fn start(&self, text: &str, locale: &str) -> Result<Utterance, SpeechError>;

    /// Stop a running utterance. Safe to call more than once.
    fn stop(&self, utterance: &mut Utterance);
}

/// Playback via an external text-to-speech command.
///
/// The argv may contain a `{locale}` placeholder; the utterance text is
/// appended as the final argument.
#[derive(Debug, Clone)]
pub struct CommandSpeech {
    argv: Vec<String>,
}

impl CommandSpeech {
    /// Probe the command on PATH and build the backend.
    ///
    /// Failing here, rather than on every utterance, lets callers fall
    /// back to [`NullSpeech`] once at startup.
    pub fn new(argv: Vec<String>) -> Result<Self, SpeechError> {
        let Some(program) = argv.first() else {
            return Err(SpeechError::EmptyCommand);
        };
        which::which(program)
            .map_err(|_| SpeechError::CommandNotFound(program.clone()))?;
        Ok(Self { argv })
    }
}

impl Speech for CommandSpeech {
    fn start(&self, text: &str, locale: &str) -> Result<Utterance, SpeechError> {
        let mut cmd = Command::new(&self.argv[0]);
        for arg in &self.argv[1..] {
            cmd.arg(arg.replace("{locale}", locale));
        }
        cmd.arg(text);

        cmd.stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true);

        let child = cmd.spawn().map_err(SpeechError::Spawn)?;
        Ok(Utterance { child: Some(child) })
    }

    fn stop(&self, utterance: &mut Utterance) {
        if let Some(mut child) = utterance.child.take() {
            // The child may already have exited; nothing to do then.
            let _ = child.start_kill();
        }
    }
}

/// Silent backend used when speech is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSpeech;

impl Speech for NullSpeech {
    fn start(&self, _text: &str, _locale: &str) -> Result<Utterance, SpeechError> {
        Ok(Utterance::default())
    }

    fn stop(&self, _utterance: &mut Utterance) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_command_rejected() {
        let result = CommandSpeech::new(vec![]);
        assert!(matches!(result, Err(SpeechError::EmptyCommand)));
    }

    #[test]
    fn test_missing_command_rejected() {
        let result = CommandSpeech::new(vec!["definitely-not-a-real-tts-binary".into()]);
        assert!(matches!(result, Err(SpeechError::CommandNotFound(_))));
    }

    #[test]
    fn test_null_speech_start_and_stop() {
        let speech = NullSpeech;
        let mut utterance = speech.start("hola", "es-ES").expect("start utterance");
        speech.stop(&mut utterance);
        speech.stop(&mut utterance);
    }

    #[tokio::test]
    async fn test_command_speech_stop_is_idempotent() {
        // `sleep` stands in for a TTS binary: the utterance text becomes
        // its duration argument.
        let speech = match CommandSpeech::new(vec!["sleep".into()]) {
            Ok(s) => s,
            // Environment without `sleep` on PATH; nothing to test.
            Err(SpeechError::CommandNotFound(_)) => return,
            Err(e) => panic!("unexpected error: {e}"),
        };

        let mut utterance = speech.start("5", "es-ES").expect("spawn sleep");
        speech.stop(&mut utterance);
        speech.stop(&mut utterance);
    }
}
