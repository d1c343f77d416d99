use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use async_trait::async_trait;
use note_types::{ApiError, NoteDraft, NoteId, NoteRecord, NoteUpdate, NotesApi, RemoteConfig};
use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

const MAX_ERROR_MESSAGE_CHARS: usize = 300;

/// [`NotesApi`] over HTTP. A configured session cookie seeds the client's
/// cookie jar; cookies the server sets later replace it there and are replayed
/// on every request.
pub struct HttpNotesApi {
    client: Client,
    base: Url,
}

impl HttpNotesApi {
    pub fn new(config: &RemoteConfig) -> Result<Self> {
        let base = Url::parse(config.base_url.trim())
            .with_context(|| format!("invalid notes base url `{}`", config.base_url))?;
        if base.cannot_be_a_base() {
            bail!("notes base url `{}` cannot carry a path", config.base_url);
        }

        let jar = Jar::default();
        if let Some(cookie) = config.session_cookie.as_deref() {
            seed_cookies(&jar, cookie, &base);
        }

        let mut headers = HeaderMap::new();
        apply_extra_headers(&mut headers, &config.extra_headers)?;

        let mut builder = Client::builder()
            .cookie_provider(Arc::new(jar))
            .default_headers(headers);
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder.build().context("failed to build http client")?;

        Ok(Self { client, base })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(["api", "notes"]).extend(segments);
        }
        url
    }

    async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request
            .send()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))?;
        let status = response.status();
        debug!(url = %response.url(), %status, "notes api response");
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            message: error_message(status, &body),
        })
    }
}

#[async_trait]
impl NotesApi for HttpNotesApi {
    async fn list_notes(&self) -> Result<Vec<NoteRecord>, ApiError> {
        let response = self.send(self.client.get(self.endpoint(&[]))).await?;
        let payload: Value = read_json(response).await?;
        let Value::Array(items) = payload else {
            warn!("notes listing was not a json array; treating it as empty");
            return Ok(Vec::new());
        };

        Ok(items
            .into_iter()
            .filter_map(|item| match serde_json::from_value::<NoteRecord>(item) {
                Ok(record) => Some(record),
                Err(err) => {
                    warn!(error = %err, "skipping malformed note record");
                    None
                }
            })
            .collect())
    }

    async fn create_note(&self, draft: &NoteDraft) -> Result<NoteRecord, ApiError> {
        let request = self.client.post(self.endpoint(&[])).json(draft);
        read_json(self.send(request).await?).await
    }

    async fn update_note(&self, id: &NoteId, update: &NoteUpdate) -> Result<NoteRecord, ApiError> {
        let request = self.client.put(self.endpoint(&[id.as_str()])).json(update);
        read_json(self.send(request).await?).await
    }

    async fn delete_note(&self, id: &NoteId) -> Result<(), ApiError> {
        self.send(self.client.delete(self.endpoint(&[id.as_str()])))
            .await
            .map(|_| ())
    }

    async fn health(&self) -> Result<String, ApiError> {
        let response = self.send(self.client.get(self.endpoint(&["health"]))).await?;
        response
            .text()
            .await
            .map_err(|err| ApiError::Transport(err.to_string()))
    }
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let text = response
        .text()
        .await
        .map_err(|err| ApiError::Transport(err.to_string()))?;
    serde_json::from_str(&text).map_err(|err| ApiError::InvalidResponse(err.to_string()))
}

/// Human-readable reason for a failed request: the server's JSON `message` or
/// `error` field, else the raw body, else the status reason phrase.
pub fn error_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(text) = fields
                .get(key)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|text| !text.is_empty())
            {
                return text.to_owned();
            }
        }
    }

    if !body.is_empty() {
        return body.chars().take(MAX_ERROR_MESSAGE_CHARS).collect();
    }
    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_owned()
}

/// Adds each `name=value` pair of a `Cookie`-style string to the jar, scoped
/// to the server's host.
fn seed_cookies(jar: &Jar, cookies: &str, base: &Url) {
    for pair in cookies
        .split(';')
        .map(str::trim)
        .filter(|pair| pair.contains('='))
    {
        jar.add_cookie_str(&format!("{pair}; Path=/"), base);
    }
}

fn apply_extra_headers(headers: &mut HeaderMap, extra_headers: &[(String, String)]) -> Result<()> {
    for (key, value) in extra_headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|_| anyhow!("invalid header name: {key}"))?;
        let value =
            HeaderValue::from_str(value).map_err(|_| anyhow!("invalid header value for {key}"))?;
        headers.insert(name, value);
    }
    Ok(())
}
