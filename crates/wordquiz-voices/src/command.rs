//! External TTS program backend (espeak-ng, say, piper wrappers, ...).

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::process::Command;
use tokio::sync::Notify;
use tracing::{debug, instrument};

use wordquiz_core::model::NarrationRequest;
use wordquiz_core::traits::VoiceBackend;

use crate::error::VoiceError;

/// Speaks by running one program per utterance.
///
/// `args` may contain `{text}` and `{locale}` placeholders. When no argument
/// mentions `{text}`, the text is appended as the last argument.
pub struct CommandVoice {
    name: String,
    program: String,
    args: Vec<String>,
    cancel: Notify,
    running: AtomicBool,
}

impl CommandVoice {
    pub fn new(name: impl Into<String>, program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            args,
            cancel: Notify::new(),
            running: AtomicBool::new(false),
        }
    }

    /// `espeak-ng -v <locale> <text>`
    pub fn espeak() -> Self {
        Self::new(
            "espeak",
            "espeak-ng",
            vec!["-v".into(), "{locale}".into(), "{text}".into()],
        )
    }

    /// macOS `say`.
    pub fn say() -> Self {
        Self::new("say", "say", vec!["{text}".into()])
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Whether a child process is speaking right now.
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    fn render_args(&self, request: &NarrationRequest) -> Vec<String> {
        let mut has_text = false;
        let mut args: Vec<String> = self
            .args
            .iter()
            .map(|arg| {
                has_text |= arg.contains("{text}");
                arg.replace("{locale}", &request.locale)
                    .replace("{text}", &request.text)
            })
            .collect();
        if !has_text {
            args.push(request.text.clone());
        }
        args
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl<'a> RunningGuard<'a> {
    fn set(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag)
    }
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[async_trait]
impl VoiceBackend for CommandVoice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn warm_up(&self) -> anyhow::Result<()> {
        match find_program(&self.program) {
            Some(path) => {
                debug!(voice = %self.name, path = %path.display(), "found TTS program");
                Ok(())
            }
            None => Err(VoiceError::Spawn {
                program: self.program.clone(),
                reason: "not found on PATH".into(),
            }
            .into()),
        }
    }

    #[instrument(skip(self, request), fields(voice = %self.name, locale = %request.locale))]
    async fn speak(&self, request: &NarrationRequest) -> anyhow::Result<()> {
        // Registered before spawning so a cancel can never slip between the
        // spawn and the select below.
        let cancelled = self.cancel.notified();

        let mut child = Command::new(&self.program)
            .args(self.render_args(request))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| VoiceError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            })?;
        let _running = RunningGuard::set(&self.running);

        let status = tokio::select! {
            status = child.wait() => Some(status),
            _ = cancelled => None,
        };

        match status {
            Some(Ok(status)) if status.success() => Ok(()),
            Some(Ok(status)) => Err(VoiceError::CommandFailed {
                program: self.program.clone(),
                status: status.to_string(),
            }
            .into()),
            Some(Err(e)) => Err(VoiceError::Spawn {
                program: self.program.clone(),
                reason: e.to_string(),
            }
            .into()),
            None => {
                let _ = child.start_kill();
                let _ = child.wait().await;
                debug!("utterance cancelled");
                Ok(())
            }
        }
    }

    fn cancel(&self) {
        self.cancel.notify_waiters();
    }
}

fn find_program(program: &str) -> Option<PathBuf> {
    let candidate = Path::new(program);
    if candidate.components().count() > 1 {
        return candidate.is_file().then(|| candidate.to_path_buf());
    }
    let paths = std::env::var_os("PATH")?;
    std::env::split_paths(&paths)
        .map(|dir| dir.join(program))
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    fn request(text: &str) -> NarrationRequest {
        NarrationRequest {
            text: text.into(),
            locale: "en-GB".into(),
        }
    }

    #[test]
    fn placeholders_are_filled() {
        let voice = CommandVoice::espeak();
        assert_eq!(
            voice.render_args(&request("Lion")),
            vec!["-v", "en-GB", "Lion"]
        );
    }

    #[test]
    fn text_is_appended_without_placeholder() {
        let voice = CommandVoice::new("custom", "speak", vec!["--rate".into(), "120".into()]);
        assert_eq!(
            voice.render_args(&request("Find the cow")),
            vec!["--rate", "120", "Find the cow"]
        );
    }

    #[tokio::test]
    async fn missing_program_fails_warm_up() {
        let voice = CommandVoice::new("ghost", "definitely-not-a-tts-program-42", vec![]);
        let err = voice.warm_up().await.unwrap_err();
        assert!(err.to_string().contains("not found on PATH"));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn exit_status_is_reported() {
        let ok = CommandVoice::new("ok", "true", vec![]);
        ok.warm_up().await.unwrap();
        ok.speak(&request("hello")).await.unwrap();

        let failing = CommandVoice::new("bad", "false", vec![]);
        let err = failing.speak(&request("hello")).await.unwrap_err();
        assert!(err.to_string().contains("exited"));
        assert!(!failing.is_running());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn cancel_kills_the_child() {
        let voice = Arc::new(CommandVoice::new(
            "sleepy",
            "sh",
            vec!["-c".into(), "sleep 30".into(), "{text}".into()],
        ));
        let task = tokio::spawn({
            let voice = voice.clone();
            async move { voice.speak(&request("ignored")).await }
        });

        for _ in 0..200 {
            if voice.is_running() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert!(voice.is_running());

        voice.cancel();
        let result = tokio::time::timeout(Duration::from_secs(5), task)
            .await
            .expect("speak did not return after cancel")
            .unwrap();
        assert!(result.is_ok());
        assert!(!voice.is_running());
    }
}
