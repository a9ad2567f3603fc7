//! Mock backends for testing.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use wordquiz_core::model::NarrationRequest;
use wordquiz_core::traits::{CueBackend, VoiceBackend};

/// A voice that records every request instead of speaking it.
///
/// Latency and failure are configurable so tests can exercise the
/// narrator's busy, failure and timeout paths.
#[derive(Default)]
pub struct MockVoice {
    latency: Duration,
    fail_speak: bool,
    fail_warm_up: bool,
    /// Number of `speak` calls made.
    call_count: AtomicU32,
    cancel_count: AtomicU32,
    spoken: Mutex<Vec<NarrationRequest>>,
}

impl MockVoice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Each utterance takes `latency` to finish.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    /// Every `speak` call returns an error after recording the request.
    pub fn failing() -> Self {
        Self {
            fail_speak: true,
            ..Self::default()
        }
    }

    /// Warm-up fails, so the voice is never used.
    pub fn unavailable() -> Self {
        Self {
            fail_warm_up: true,
            ..Self::default()
        }
    }

    pub fn call_count(&self) -> u32 {
        self.call_count.load(Ordering::Relaxed)
    }

    pub fn cancel_count(&self) -> u32 {
        self.cancel_count.load(Ordering::Relaxed)
    }

    /// Texts of every request received, in order.
    pub fn spoken_texts(&self) -> Vec<String> {
        self.spoken
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .map(|r| r.text.clone())
            .collect()
    }

    pub fn last_request(&self) -> Option<NarrationRequest> {
        self.spoken
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .last()
            .cloned()
    }
}

#[async_trait]
impl VoiceBackend for MockVoice {
    fn name(&self) -> &str {
        "mock"
    }

    async fn warm_up(&self) -> anyhow::Result<()> {
        if self.fail_warm_up {
            anyhow::bail!("mock voice unavailable");
        }
        Ok(())
    }

    async fn speak(&self, request: &NarrationRequest) -> anyhow::Result<()> {
        self.call_count.fetch_add(1, Ordering::Relaxed);
        self.spoken
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(request.clone());

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.fail_speak {
            anyhow::bail!("mock voice failure");
        }
        Ok(())
    }

    fn cancel(&self) {
        self.cancel_count.fetch_add(1, Ordering::Relaxed);
    }
}

/// A cue backend that counts how often it was played.
#[derive(Debug, Default)]
pub struct MockCue {
    plays: AtomicU32,
}

impl MockCue {
    pub fn plays(&self) -> u32 {
        self.plays.load(Ordering::Relaxed)
    }
}

impl CueBackend for MockCue {
    fn name(&self) -> &str {
        "mock"
    }

    fn play_success_cue(&self) {
        self.plays.fetch_add(1, Ordering::Relaxed);
    }
}
