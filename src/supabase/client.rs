//! PostgREST client for the Supabase `leads` table.
//!
//! Uses reqwest with the project's anon key sent both as `apikey` and as a
//! Bearer token. All calls target `{url}/rest/v1/{table}`.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use serde::Deserialize;
use url::Url;

use super::{LeadGateway, NewLead, RawLead, SupabaseConfig};
use crate::error::RemoteError;
use crate::types::LeadPatch;

/// Error body returned by PostgREST (`code`/`message`) or Supabase auth
/// (`error`/`error_description`, `msg`).
#[derive(Debug, Default, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    code: Option<serde_json::Value>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
    #[serde(default)]
    hint: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    msg: Option<String>,
}

pub struct SupabaseClient {
    client: reqwest::Client,
    table_url: Url,
    anon_key: String,
}

impl SupabaseClient {
    pub fn new(config: &SupabaseConfig) -> Result<Self, RemoteError> {
        let anon_key = config
            .anon_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| RemoteError::NotConfigured("no anon key".to_string()))?;
        let table_url = table_url(&config.url, &config.table)?;

        Ok(Self {
            client: reqwest::Client::new(),
            table_url,
            anon_key,
        })
    }

    fn headers(&self) -> Result<HeaderMap, RemoteError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| RemoteError::NotConfigured(format!("invalid anon key: {}", e)))?;
        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.anon_key))
            .map_err(|e| RemoteError::NotConfigured(format!("invalid anon key: {}", e)))?;
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        Ok(headers)
    }

    fn url_for_id(&self, id: &str) -> Url {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));
        url
    }

    async fn send(request: reqwest::RequestBuilder) -> Result<reqwest::Response, RemoteError> {
        let resp = request.send().await.map_err(|e| {
            if e.is_connect() || e.is_timeout() {
                RemoteError::Unavailable(e.to_string())
            } else {
                RemoteError::Http(e)
            }
        })?;
        Self::check(resp).await
    }

    async fn check(resp: reqwest::Response) -> Result<reqwest::Response, RemoteError> {
        let status = resp.status();
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(parse_api_error(status.as_u16(), &body))
    }
}

#[async_trait]
impl LeadGateway for SupabaseClient {
    async fn list_leads(&self) -> Result<Vec<RawLead>, RemoteError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("order", "created_at.desc");

        let request = self
            .client
            .get(url)
            .headers(self.headers()?);
        let resp = Self::send(request).await?;

        let text = resp.text().await?;
        serde_json::from_str(&text)
            .map_err(|e| RemoteError::Decode(format!("list leads: {}", e)))
    }

    async fn create_lead(&self, lead: &NewLead) -> Result<RawLead, RemoteError> {
        let mut url = self.table_url.clone();
        url.query_pairs_mut().append_pair("select", "*");

        let request = self
            .client
            .post(url)
            .headers(self.headers()?)
            .header("Prefer", "return=representation")
            .json(&[lead]);
        let resp = Self::send(request).await?;

        let text = resp.text().await?;
        let rows: Vec<RawLead> = serde_json::from_str(&text)
            .map_err(|e| RemoteError::Decode(format!("create lead: {}", e)))?;
        rows.into_iter().next().ok_or(RemoteError::MissingRecord)
    }

    async fn update_lead(&self, id: &str, patch: &LeadPatch) -> Result<(), RemoteError> {
        let request = self
            .client
            .patch(self.url_for_id(id))
            .headers(self.headers()?)
            .header("Prefer", "return=minimal")
            .json(patch);
        Self::send(request).await?;
        Ok(())
    }

    async fn delete_lead(&self, id: &str) -> Result<(), RemoteError> {
        let request = self
            .client
            .delete(self.url_for_id(id))
            .headers(self.headers()?);
        let resp = Self::send(request).await?;
        log::debug!("Supabase delete {} -> {}", id, resp.status());
        Ok(())
    }
}

/// `{base}/rest/v1/{table}`, tolerant of a trailing slash on the base.
fn table_url(base: &str, table: &str) -> Result<Url, RemoteError> {
    let base = base.trim();
    if base.is_empty() {
        return Err(RemoteError::NotConfigured("no Supabase URL".to_string()));
    }
    let normalized = format!("{}/", base.trim_end_matches('/'));
    Url::parse(&normalized)
        .and_then(|u| u.join(&format!("rest/v1/{}", table)))
        .map_err(|e| RemoteError::NotConfigured(format!("invalid Supabase URL '{}': {}", base, e)))
}

/// Turn a non-2xx response into a classified error.
fn parse_api_error(status: u16, body: &str) -> RemoteError {
    let parsed: ApiErrorBody = serde_json::from_str(body).unwrap_or_default();

    let code = match parsed.code {
        Some(serde_json::Value::String(s)) => s,
        Some(other) => other.to_string(),
        None => String::new(),
    };

    let mut message = parsed
        .message
        .or(parsed.error_description)
        .or(parsed.msg)
        .or(parsed.error)
        .unwrap_or_else(|| body.trim().to_string());
    if let Some(details) = parsed.details.filter(|d| !d.is_empty()) {
        message = format!("{} ({})", message, details);
    }
    if let Some(hint) = parsed.hint.filter(|h| !h.is_empty()) {
        log::debug!("Supabase hint: {}", hint);
    }

    RemoteError::Api {
        status,
        code,
        message,
    }
}
