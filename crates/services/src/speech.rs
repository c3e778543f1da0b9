use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::error::SpeechError;

/// Text-to-speech and audio playback backend.
#[async_trait]
pub trait SpeechOutput: Send + Sync {
    /// # Errors
    ///
    /// Returns `SpeechError` if the text cannot be spoken.
    async fn speak(&self, text: &str) -> Result<(), SpeechError>;

    /// # Errors
    ///
    /// Returns `SpeechError` if the audio asset cannot be played.
    async fn play_audio(&self, audio_ref: &str) -> Result<(), SpeechError>;
}

/// Backend for environments without audio; it only logs.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentSpeech;

#[async_trait]
impl SpeechOutput for SilentSpeech {
    async fn speak(&self, text: &str) -> Result<(), SpeechError> {
        debug!(text, "speak");
        Ok(())
    }

    async fn play_audio(&self, audio_ref: &str) -> Result<(), SpeechError> {
        debug!(audio_ref, "play audio");
        Ok(())
    }
}

/// Fire-and-forget front for a `SpeechOutput`: failures are logged and dropped.
#[derive(Clone)]
pub struct Narrator {
    output: Arc<dyn SpeechOutput>,
}

impl Narrator {
    #[must_use]
    pub fn new(output: Arc<dyn SpeechOutput>) -> Self {
        Self { output }
    }

    #[must_use]
    pub fn silent() -> Self {
        Self::new(Arc::new(SilentSpeech))
    }

    pub async fn speak(&self, text: &str) {
        if let Err(err) = self.output.speak(text).await {
            warn!(error = %err, "text-to-speech failed");
        }
    }

    pub async fn play_audio(&self, audio_ref: &str) {
        if let Err(err) = self.output.play_audio(audio_ref).await {
            warn!(error = %err, audio_ref, "audio playback failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder {
        spoken: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SpeechOutput for Recorder {
        async fn speak(&self, text: &str) -> Result<(), SpeechError> {
            self.spoken.lock().unwrap().push(text.to_owned());
            Ok(())
        }

        async fn play_audio(&self, audio_ref: &str) -> Result<(), SpeechError> {
            Err(SpeechError::MissingAudio(audio_ref.to_owned()))
        }
    }

    #[tokio::test]
    async fn narrator_forwards_and_swallows_failures() {
        let recorder = Arc::new(Recorder::default());
        let narrator = Narrator::new(Arc::clone(&recorder) as Arc<dyn SpeechOutput>);

        narrator.speak("Hello").await;
        narrator.play_audio("vocab-missing.mp3").await;

        assert_eq!(*recorder.spoken.lock().unwrap(), vec!["Hello".to_owned()]);
    }

    #[tokio::test]
    async fn silent_speech_never_fails() {
        let narrator = Narrator::silent();
        narrator.speak("anything").await;
        narrator.play_audio("vocab-cappuccino.mp3").await;
    }
}
