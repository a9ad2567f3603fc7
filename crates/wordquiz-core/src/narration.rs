//! Narration orchestration.
//!
//! The [`Narrator`] is the single gate between the game loop and the voice
//! backend. It holds a one-slot mutex for the utterance in flight: a request
//! arriving while the slot is taken is dropped, never queued, so the engine
//! cannot talk over itself. Every failure mode (no backend, failed warm-up,
//! backend error, hung backend) ends up as a [`NarrationOutcome`] and a log
//! line; none of them reach the game state.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};

use crate::model::NarrationRequest;
use crate::traits::{CueBackend, VoiceBackend};

/// Upper bound on a single utterance; some backends never report completion.
pub const DEFAULT_NARRATION_TIMEOUT: Duration = Duration::from_secs(4);

/// Why a request was not handed to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Narration is switched off.
    Disabled,
    /// Another utterance from this narrator is still playing.
    Busy,
    /// No backend, or it failed to initialize.
    Unavailable,
}

/// How a `speak` call ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrationOutcome {
    Spoken,
    Skipped(SkipReason),
    Failed,
    TimedOut,
}

impl NarrationOutcome {
    pub fn was_spoken(&self) -> bool {
        matches!(self, NarrationOutcome::Spoken)
    }
}

pub struct Narrator {
    voice: Option<Arc<dyn VoiceBackend>>,
    cue: Option<Arc<dyn CueBackend>>,
    enabled: AtomicBool,
    timeout: Duration,
    slot: Mutex<()>,
    ready: OnceCell<bool>,
}

impl Narrator {
    pub fn new(
        voice: Option<Arc<dyn VoiceBackend>>,
        cue: Option<Arc<dyn CueBackend>>,
        timeout: Duration,
    ) -> Self {
        Self {
            voice,
            cue,
            enabled: AtomicBool::new(true),
            timeout,
            slot: Mutex::new(()),
            ready: OnceCell::new(),
        }
    }

    /// A narrator with no backends at all.
    pub fn silent() -> Self {
        Self::new(None, None, DEFAULT_NARRATION_TIMEOUT)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Relaxed);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Relaxed)
    }

    /// Whether an utterance from this narrator is playing right now.
    pub fn is_speaking(&self) -> bool {
        self.slot.try_lock().is_err()
    }

    /// Speak `text` unless disabled, busy or without a working backend.
    ///
    /// Resolves on completion, error, or after the narration timeout,
    /// whichever comes first.
    pub async fn speak(&self, text: &str, locale: &str) -> NarrationOutcome {
        if !self.is_enabled() {
            return NarrationOutcome::Skipped(SkipReason::Disabled);
        }
        let Some(voice) = &self.voice else {
            return NarrationOutcome::Skipped(SkipReason::Unavailable);
        };
        let Ok(_slot) = self.slot.try_lock() else {
            debug!(text, "narration busy, dropping request");
            return NarrationOutcome::Skipped(SkipReason::Busy);
        };
        if !self.ensure_ready(voice).await {
            return NarrationOutcome::Skipped(SkipReason::Unavailable);
        }

        voice.cancel();
        let request = NarrationRequest {
            text: text.to_string(),
            locale: locale.to_string(),
        };

        match tokio::time::timeout(self.timeout, voice.speak(&request)).await {
            Ok(Ok(())) => {
                debug!(voice = voice.name(), text, "spoken");
                NarrationOutcome::Spoken
            }
            Ok(Err(e)) => {
                warn!(voice = voice.name(), "narration failed: {e:#}");
                NarrationOutcome::Failed
            }
            Err(_) => {
                warn!(
                    voice = voice.name(),
                    "narration did not finish within {}ms",
                    self.timeout.as_millis()
                );
                voice.cancel();
                NarrationOutcome::TimedOut
            }
        }
    }

    /// Play the success cue. Independent of the speech slot and of the
    /// narration switch.
    pub fn play_success_cue(&self) {
        if let Some(cue) = &self.cue {
            cue.play_success_cue();
        }
    }

    /// Warm the backend up once; later calls reuse the first result.
    async fn ensure_ready(&self, voice: &Arc<dyn VoiceBackend>) -> bool {
        *self
            .ready
            .get_or_init(|| async {
                match tokio::time::timeout(self.timeout, voice.warm_up()).await {
                    Ok(Ok(())) => true,
                    Ok(Err(e)) => {
                        warn!(
                            voice = voice.name(),
                            "voice unavailable, continuing silently: {e:#}"
                        );
                        false
                    }
                    Err(_) => {
                        warn!(voice = voice.name(), "voice warm-up timed out");
                        false
                    }
                }
            })
            .await
    }
}
