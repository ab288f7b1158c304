//! HTTP client for the Publer API.
//!
//! Every operation goes through [`PublerClient::request`], which attaches the
//! credentials, encodes the query and body, performs a single round trip and
//! decodes whatever the server sent back.

mod account;
mod error;
mod media;
mod posts;
mod query;

use std::fmt;

use reqwest::header::{HeaderValue, AUTHORIZATION, CONTENT_TYPE};
use reqwest::multipart::Form;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;
use url::Url;

pub use error::ClientError;
pub use media::{mime_for_path, ListMediaParams, MediaUpload};
pub use query::{Query, QueryValue};

pub const DEFAULT_BASE_URL: &str = "https://app.publer.com/api/v1";
pub const WORKSPACE_HEADER: &str = "Publer-Workspace-Id";

pub type Result<T, E = ClientError> = std::result::Result<T, E>;

/// Request payload.
#[derive(Debug)]
pub enum RequestBody {
    /// Serialized as JSON with `Content-Type: application/json`.
    Json(Value),
    /// Sent as-is; reqwest supplies the boundary-bearing content type.
    Multipart(Form),
}

/// Per-call parameters for [`PublerClient::request`].
#[derive(Debug, Default)]
pub struct RequestOptions {
    pub query: Option<Query>,
    pub body: Option<RequestBody>,
    pub workspace: Option<String>,
}

impl RequestOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn query(mut self, query: Query) -> Self {
        self.query = Some(query);
        self
    }

    pub fn json(mut self, body: Value) -> Self {
        self.body = Some(RequestBody::Json(body));
        self
    }

    pub fn multipart(mut self, form: Form) -> Self {
        self.body = Some(RequestBody::Multipart(form));
        self
    }

    /// Use `workspace` instead of the client's default workspace.
    pub fn workspace(mut self, workspace: impl Into<String>) -> Self {
        self.workspace = Some(workspace.into());
        self
    }
}

#[derive(Clone)]
pub struct PublerClient {
    client: Client,
    base_url: String,
    token: String,
    workspace: Option<String>,
}

impl fmt::Debug for PublerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PublerClient")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("workspace", &self.workspace)
            .finish()
    }
}

impl PublerClient {
    pub fn new(token: impl Into<String>) -> Result<Self> {
        Self::with_base_url(token, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(token: impl Into<String>, base_url: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("publer-cli/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.into(),
            workspace: None,
        })
    }

    /// Default workspace sent with every request that does not override it.
    pub fn with_workspace(mut self, workspace: Option<String>) -> Self {
        self.workspace = workspace;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn workspace(&self) -> Option<&str> {
        self.workspace.as_deref()
    }

    fn url(&self, path: &str, query: Option<&Query>) -> Result<Url, ClientError> {
        let joined = if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        };
        let mut url = Url::parse(&joined).map_err(|source| ClientError::InvalidUrl {
            url: joined.clone(),
            source,
        })?;
        if let Some(query) = query {
            query.apply_to(&mut url);
        }
        Ok(url)
    }

    /// Perform one request and return the decoded payload.
    ///
    /// Non-empty bodies are parsed as JSON; text that is not valid JSON is
    /// returned as a [`Value::String`] and an empty body as [`Value::Null`].
    /// Any status outside 200-299 becomes [`ClientError::Api`].
    pub async fn request(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<Value> {
        let url = self.url(path, options.query.as_ref())?;
        debug!(%method, %url, "sending request");

        let authorization = HeaderValue::from_str(&format!("Bearer-API {}", self.token))
            .map_err(|source| ClientError::InvalidHeader {
                name: "Authorization",
                source,
            })?;
        let mut request = self
            .client
            .request(method, url)
            .header(AUTHORIZATION, authorization);

        if let Some(workspace) = options.workspace.as_deref().or(self.workspace.as_deref()) {
            let value = HeaderValue::from_str(workspace).map_err(|source| {
                ClientError::InvalidHeader {
                    name: WORKSPACE_HEADER,
                    source,
                }
            })?;
            request = request.header(WORKSPACE_HEADER, value);
        }

        request = match options.body {
            Some(RequestBody::Json(body)) => request
                .header(CONTENT_TYPE, "application/json")
                .body(body.to_string()),
            Some(RequestBody::Multipart(form)) => request.multipart(form),
            None => request,
        };

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(status = status.as_u16(), bytes = text.len(), "received response");

        let payload = decode_payload(&text);
        if !status.is_success() {
            return Err(ClientError::Api {
                status: status.as_u16(),
                status_text: status.canonical_reason().unwrap_or_default().to_string(),
                payload,
            });
        }
        Ok(payload)
    }

    /// Like [`request`](Self::request), deserializing the payload into `T`.
    pub async fn request_as<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        options: RequestOptions,
    ) -> Result<T> {
        let payload = self.request(method, path, options).await?;
        serde_json::from_value(payload).map_err(ClientError::Decode)
    }
}

fn decode_payload(text: &str) -> Value {
    if text.is_empty() {
        return Value::Null;
    }
    serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string()))
}
