//! Backend capabilities the engine consumes.
//!
//! Both are best-effort: the engine stays playable, silently, when no
//! backend is configured or every call fails. Implementations live in the
//! `wordquiz-voices` crate.

use async_trait::async_trait;

use crate::model::NarrationRequest;

// ---------------------------------------------------------------------------
// Speech
// ---------------------------------------------------------------------------

/// A text-to-speech backend.
#[async_trait]
pub trait VoiceBackend: Send + Sync {
    /// Human-readable backend name (e.g. "espeak").
    fn name(&self) -> &str;

    /// One-time initialization, run lazily before the first utterance.
    async fn warm_up(&self) -> anyhow::Result<()> {
        Ok(())
    }

    /// Speak `request`, resolving once the utterance has finished.
    async fn speak(&self, request: &NarrationRequest) -> anyhow::Result<()>;

    /// Abort whatever this backend is currently saying, if anything.
    fn cancel(&self) {}
}

// ---------------------------------------------------------------------------
// Non-speech cues
// ---------------------------------------------------------------------------

/// A fire-and-forget sound effect player.
pub trait CueBackend: Send + Sync {
    fn name(&self) -> &str;

    /// Play the "that's right!" sound. Must not block.
    fn play_success_cue(&self);
}
