//! HTTP speech daemon backend.
//!
//! Talks to a local or remote TTS daemon with a tiny JSON protocol:
//! `GET /health`, `POST /speak {text, locale, voice?}`, `POST /cancel`.

use std::time::Duration;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, instrument};

use wordquiz_core::model::NarrationRequest;
use wordquiz_core::traits::VoiceBackend;

use crate::error::VoiceError;

const DEFAULT_BASE_URL: &str = "http://localhost:5002";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Speech daemon reached over HTTP.
pub struct HttpVoice {
    name: String,
    base_url: String,
    api_key: Option<String>,
    voice: Option<String>,
    client: reqwest::Client,
}

impl HttpVoice {
    pub fn new(
        name: impl Into<String>,
        base_url: &str,
        api_key: Option<String>,
        voice: Option<String>,
    ) -> anyhow::Result<Self> {
        let base = if base_url.is_empty() {
            DEFAULT_BASE_URL
        } else {
            base_url
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(DEFAULT_TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            name: name.into(),
            base_url: base.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|k| !k.is_empty()),
            voice,
            client,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn post(&self, endpoint: &str) -> reqwest::RequestBuilder {
        let request = self.client.post(format!("{}{}", self.base_url, endpoint));
        match &self.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }

    fn classify(&self, e: reqwest::Error) -> VoiceError {
        if e.is_timeout() {
            VoiceError::Timeout(DEFAULT_TIMEOUT_SECS)
        } else if e.is_connect() {
            VoiceError::NetworkError(format!(
                "speech daemon not reachable at {}",
                self.base_url
            ))
        } else {
            VoiceError::NetworkError(e.to_string())
        }
    }
}

#[derive(Serialize)]
struct SpeakBody<'a> {
    text: &'a str,
    locale: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    voice: Option<&'a str>,
}

#[async_trait]
impl VoiceBackend for HttpVoice {
    fn name(&self) -> &str {
        &self.name
    }

    async fn warm_up(&self) -> anyhow::Result<()> {
        let response = self
            .client
            .get(format!("{}/health", self.base_url))
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        if status >= 400 {
            return Err(VoiceError::ApiError {
                status,
                message: "health check failed".into(),
            }
            .into());
        }
        debug!(voice = %self.name, url = %self.base_url, "speech daemon is up");
        Ok(())
    }

    #[instrument(skip(self, request), fields(voice = %self.name, locale = %request.locale))]
    async fn speak(&self, request: &NarrationRequest) -> anyhow::Result<()> {
        let body = SpeakBody {
            text: &request.text,
            locale: &request.locale,
            voice: self.voice.as_deref(),
        };

        let response = self
            .post("/speak")
            .json(&body)
            .send()
            .await
            .map_err(|e| self.classify(e))?;

        let status = response.status().as_u16();
        match status {
            401 | 403 => {
                let body = response.text().await.unwrap_or_default();
                Err(VoiceError::Unauthorized(body).into())
            }
            404 => Err(VoiceError::NotFound(format!(
                "no speech endpoint at {}/speak (voice {:?})",
                self.base_url, self.voice
            ))
            .into()),
            s if s >= 400 => {
                let message = response.text().await.unwrap_or_default();
                Err(VoiceError::ApiError { status, message }.into())
            }
            _ => Ok(()),
        }
    }

    fn cancel(&self) {
        // Fire and forget; only possible from inside a runtime.
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            return;
        };
        let request = self.post("/cancel");
        handle.spawn(async move {
            if let Err(e) = request.send().await {
                debug!("cancel request failed: {e}");
            }
        });
    }
}
