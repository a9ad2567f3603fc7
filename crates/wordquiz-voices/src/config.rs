//! Voice configuration and factory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use wordquiz_core::traits::{CueBackend, VoiceBackend};

use crate::command::CommandVoice;
use crate::cue::{BellCue, SilentCue, SilentVoice};
use crate::http::HttpVoice;

/// Configuration for a single voice backend.
///
/// Note: Custom Debug impl masks API keys to prevent accidental exposure in logs.
#[derive(Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum VoiceConfig {
    /// External TTS program, one process per utterance.
    Command {
        program: String,
        #[serde(default)]
        args: Vec<String>,
    },
    /// Speech daemon reached over HTTP.
    Http {
        #[serde(default = "default_http_url")]
        base_url: String,
        #[serde(default)]
        api_key: Option<String>,
        #[serde(default)]
        voice: Option<String>,
    },
    Silent,
}

impl std::fmt::Debug for VoiceConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoiceConfig::Command { program, args } => f
                .debug_struct("Command")
                .field("program", program)
                .field("args", args)
                .finish(),
            VoiceConfig::Http {
                base_url,
                api_key,
                voice,
            } => f
                .debug_struct("Http")
                .field("base_url", base_url)
                .field("api_key", &api_key.as_ref().map(|_| "***"))
                .field("voice", voice)
                .finish(),
            VoiceConfig::Silent => f.write_str("Silent"),
        }
    }
}

impl VoiceConfig {
    /// Short human-readable backend kind.
    pub fn kind(&self) -> &'static str {
        match self {
            VoiceConfig::Command { .. } => "command",
            VoiceConfig::Http { .. } => "http",
            VoiceConfig::Silent => "silent",
        }
    }

    /// Where the backend lives: the program name or the daemon URL.
    pub fn target(&self) -> String {
        match self {
            VoiceConfig::Command { program, .. } => program.clone(),
            VoiceConfig::Http { base_url, .. } => base_url.clone(),
            VoiceConfig::Silent => "-".into(),
        }
    }
}

fn default_http_url() -> String {
    "http://localhost:5002".to_string()
}

/// Which success cue to play.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueKind {
    #[default]
    Bell,
    None,
}

/// Top-level wordquiz configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordquizConfig {
    /// Voice configurations keyed by name.
    #[serde(default)]
    pub voices: HashMap<String, VoiceConfig>,
    /// Voice used when none is requested. `None` plays silently.
    #[serde(default)]
    pub default_voice: Option<String>,
    /// Start games with narration switched on.
    #[serde(default = "default_narration_enabled")]
    pub narration_enabled: bool,
    /// Upper bound on one utterance, in milliseconds.
    #[serde(default = "default_narration_timeout_ms")]
    pub narration_timeout_ms: u64,
    #[serde(default)]
    pub success_cue: CueKind,
    /// Directory searched for category catalogs.
    #[serde(default = "default_catalog_dir")]
    pub catalog_dir: PathBuf,
}

fn default_narration_enabled() -> bool {
    true
}
fn default_narration_timeout_ms() -> u64 {
    4000
}
fn default_catalog_dir() -> PathBuf {
    PathBuf::from("./catalogs")
}

impl Default for WordquizConfig {
    fn default() -> Self {
        Self {
            voices: HashMap::new(),
            default_voice: None,
            narration_enabled: default_narration_enabled(),
            narration_timeout_ms: default_narration_timeout_ms(),
            success_cue: CueKind::default(),
            catalog_dir: default_catalog_dir(),
        }
    }
}

impl WordquizConfig {
    pub fn narration_timeout(&self) -> Duration {
        Duration::from_millis(self.narration_timeout_ms)
    }
}

/// Resolve environment variable references like `${VAR_NAME}` in a string.
fn resolve_env_vars(s: &str) -> String {
    expand_vars(s, |name| std::env::var(name).ok())
}

/// Single left-to-right pass: substituted values are copied verbatim and
/// never scanned again.
fn expand_vars(s: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut result = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        result.push_str(&rest[..start]);
        let var_name = &rest[start + 2..start + len];
        result.push_str(&lookup(var_name).unwrap_or_default());
        rest = &rest[start + len + 1..];
    }
    result.push_str(rest);
    result
}

/// Resolve env vars in a voice config.
fn resolve_voice_config(config: &VoiceConfig) -> VoiceConfig {
    match config {
        VoiceConfig::Command { program, args } => VoiceConfig::Command {
            program: resolve_env_vars(program),
            args: args.iter().map(|a| resolve_env_vars(a)).collect(),
        },
        VoiceConfig::Http {
            base_url,
            api_key,
            voice,
        } => VoiceConfig::Http {
            base_url: resolve_env_vars(base_url),
            api_key: api_key.as_ref().map(|k| resolve_env_vars(k)),
            voice: voice.as_ref().map(|v| resolve_env_vars(v)),
        },
        VoiceConfig::Silent => VoiceConfig::Silent,
    }
}

/// Apply `WORDQUIZ_VOICE` and `WORDQUIZ_NARRATION` overrides.
fn apply_env_overrides(config: &mut WordquizConfig, var: impl Fn(&str) -> Option<String>) {
    if let Some(voice) = var("WORDQUIZ_VOICE").filter(|v| !v.is_empty()) {
        config.default_voice = Some(voice);
    }
    if let Some(narration) = var("WORDQUIZ_NARRATION") {
        match narration.to_ascii_lowercase().as_str() {
            "off" | "0" | "false" | "no" => config.narration_enabled = false,
            "on" | "1" | "true" | "yes" => config.narration_enabled = true,
            other => tracing::warn!("ignoring WORDQUIZ_NARRATION={other}"),
        }
    }
}

/// Load configuration from well-known paths.
///
/// Search order:
/// 1. `wordquiz.toml` in the current directory
/// 2. `~/.config/wordquiz/config.toml`
///
/// Environment variable overrides: `WORDQUIZ_VOICE`, `WORDQUIZ_NARRATION`.
pub fn load_config() -> Result<WordquizConfig> {
    load_config_from(None)
}

/// Load config from an explicit path, or search the default locations.
pub fn load_config_from(path: Option<&Path>) -> Result<WordquizConfig> {
    let config_path = if let Some(p) = path {
        if p.exists() {
            Some(p.to_path_buf())
        } else {
            anyhow::bail!("config file not found: {}", p.display());
        }
    } else {
        let local = PathBuf::from("wordquiz.toml");
        if local.exists() {
            Some(local)
        } else {
            dirs_path()
                .map(|home| home.join("config.toml"))
                .filter(|global| global.exists())
        }
    };

    let mut config = match config_path {
        Some(path) => {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read config: {}", path.display()))?;
            toml::from_str::<WordquizConfig>(&content)
                .with_context(|| format!("failed to parse config: {}", path.display()))?
        }
        None => WordquizConfig::default(),
    };

    apply_env_overrides(&mut config, |name| std::env::var(name).ok());

    config.voices = config
        .voices
        .iter()
        .map(|(k, v)| (k.clone(), resolve_voice_config(v)))
        .collect();

    Ok(config)
}

fn dirs_path() -> Option<PathBuf> {
    std::env::var("HOME")
        .ok()
        .map(|h| PathBuf::from(h).join(".config").join("wordquiz"))
}

/// Create a voice instance from its configuration.
pub fn create_voice(name: &str, config: &VoiceConfig) -> Result<Arc<dyn VoiceBackend>> {
    match config {
        VoiceConfig::Command { program, args } => {
            Ok(Arc::new(CommandVoice::new(name, program, args.clone())))
        }
        VoiceConfig::Http {
            base_url,
            api_key,
            voice,
        } => Ok(Arc::new(HttpVoice::new(
            name,
            base_url,
            api_key.clone(),
            voice.clone(),
        )?)),
        VoiceConfig::Silent => Ok(Arc::new(SilentVoice)),
    }
}

/// Pick the voice named by `requested`, else the configured default.
///
/// Returns `None` when neither names a voice. The built-in names `espeak`
/// and `say` work without a config entry.
pub fn resolve_voice(
    config: &WordquizConfig,
    requested: Option<&str>,
) -> Result<Option<Arc<dyn VoiceBackend>>> {
    let Some(name) = requested.or(config.default_voice.as_deref()) else {
        return Ok(None);
    };

    if let Some(voice_config) = config.voices.get(name) {
        return create_voice(name, voice_config).map(Some);
    }
    match name {
        "espeak" => Ok(Some(Arc::new(CommandVoice::espeak()))),
        "say" => Ok(Some(Arc::new(CommandVoice::say()))),
        "silent" | "none" => Ok(Some(Arc::new(SilentVoice))),
        _ => {
            let mut known: Vec<&str> = config.voices.keys().map(String::as_str).collect();
            known.sort_unstable();
            anyhow::bail!("voice '{name}' not configured. Available: {known:?}")
        }
    }
}

/// Create the success cue backend.
pub fn create_cue(kind: CueKind) -> Arc<dyn CueBackend> {
    match kind {
        CueKind::Bell => Arc::new(BellCue),
        CueKind::None => Arc::new(SilentCue),
    }
}
