//! Fallback backends: the terminal bell, and silence.

use std::io::Write;

use async_trait::async_trait;

use wordquiz_core::model::NarrationRequest;
use wordquiz_core::traits::{CueBackend, VoiceBackend};

/// Rings the terminal bell on stderr.
#[derive(Debug, Default)]
pub struct BellCue;

impl CueBackend for BellCue {
    fn name(&self) -> &str {
        "bell"
    }

    fn play_success_cue(&self) {
        let mut stderr = std::io::stderr();
        let _ = stderr.write_all(b"\x07");
        let _ = stderr.flush();
    }
}

#[derive(Debug, Default)]
pub struct SilentCue;

impl CueBackend for SilentCue {
    fn name(&self) -> &str {
        "none"
    }

    fn play_success_cue(&self) {}
}

/// A voice that never initializes, so the narrator skips every request.
#[derive(Debug, Default)]
pub struct SilentVoice;

#[async_trait]
impl VoiceBackend for SilentVoice {
    fn name(&self) -> &str {
        "silent"
    }

    async fn warm_up(&self) -> anyhow::Result<()> {
        anyhow::bail!("silent voice selected")
    }

    async fn speak(&self, _request: &NarrationRequest) -> anyhow::Result<()> {
        Ok(())
    }
}
