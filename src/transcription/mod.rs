pub mod deepgram;

pub use deepgram::*;

use std::path::Path;

use anyhow::Result;
use async_trait::async_trait;

use crate::models::Transcription;
use crate::serialized::Serialized;

/// Black-box speech-to-text capability
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe the audio file at `audio` into ordered segments
    async fn transcribe(&self, audio: &Path) -> Result<Transcription>;
}

#[async_trait]
impl<T: Transcriber + ?Sized> Transcriber for Box<T> {
    async fn transcribe(&self, audio: &Path) -> Result<Transcription> {
        (**self).transcribe(audio).await
    }
}

#[async_trait]
impl<T: Transcriber + ?Sized> Transcriber for Serialized<T> {
    async fn transcribe(&self, audio: &Path) -> Result<Transcription> {
        let (_guard, inner) = self.acquire().await;
        inner.transcribe(audio).await
    }
}
