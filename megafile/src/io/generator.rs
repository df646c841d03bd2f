//! Text-generation transport.
//!
//! The [`TextGenerator`] trait decouples the sub-agents from the remote
//! service. Tests use scripted generators that return predetermined replies
//! without touching the network.

use std::time::Duration;

use anyhow::{Context, Result, bail};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::io::credential::Credential;

/// Header carrying the API key.
const API_KEY_HEADER: &str = "x-goog-api-key";
/// Bytes of an error body kept in the error message.
const ERROR_BODY_LIMIT: usize = 512;

/// Abstraction over text-generation backends.
pub trait TextGenerator {
    /// Send `prompt` and return the generated text.
    ///
    /// An `Ok` result may be empty; callers decide whether that is usable.
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Generator that POSTs to a `generateContent` endpoint.
pub struct HttpGenerator {
    client: Client,
    endpoint: String,
    credential: Credential,
}

impl HttpGenerator {
    /// Build a client whose requests give up after `timeout`.
    pub fn new(
        endpoint: impl Into<String>,
        credential: Credential,
        timeout: Duration,
    ) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("build http client")?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
            credential,
        })
    }
}

impl TextGenerator for HttpGenerator {
    #[instrument(skip_all, fields(prompt_bytes = prompt.len()))]
    fn generate(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(&self.endpoint)
            .header(API_KEY_HEADER, self.credential.expose())
            .json(&body)
            .send()
            .context("send generate request")?;

        let status = response.status();
        let text = response.text().context("read generate response")?;
        if !status.is_success() {
            warn!(status = status.as_u16(), "generate request rejected");
            bail!(
                "generate request failed with status {status}: {}",
                truncate(&text, ERROR_BODY_LIMIT)
            );
        }

        let generated = extract_text(&text);
        debug!(response_bytes = generated.len(), "generate request completed");
        Ok(generated)
    }
}

/// Pull the generated text out of a response body.
///
/// Joins every text part of the first candidate. Missing fields and malformed
/// JSON yield an empty string.
pub fn extract_text(body: &str) -> String {
    let Ok(response) = serde_json::from_str::<GenerateResponse>(body) else {
        return String::new();
    };
    response
        .candidates
        .into_iter()
        .next()
        .and_then(|candidate| candidate.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|part| part.text)
                .collect::<String>()
        })
        .unwrap_or_default()
}

fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }
    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}
