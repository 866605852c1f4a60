//! The network seam between the controller and the chat server.

use std::error::Error as StdError;
use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response};
use tracing::debug;

use crate::api::html::{extract_reply, extract_transcript};
use crate::api::{SendMessageForm, ServerReply, TranscriptEntry};
use crate::utils::url::construct_api_url;

#[derive(Debug)]
pub enum TransportError {
    /// The request never got a response (connect, DNS, TLS, ...).
    Request(reqwest::Error),
    /// The transport timeout elapsed before the server answered.
    Timeout { url: String },
    /// The server answered with a non-2xx status.
    Status { status: u16, url: String },
    /// A structured reply came back with `ok: false`.
    Rejected { url: String },
    /// The body could not be read.
    Body(reqwest::Error),
    /// A JSON body did not match the reply shape.
    Decode(serde_json::Error),
    /// The HTTP client could not be built.
    Client(reqwest::Error),
}

impl fmt::Display for TransportError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransportError::Request(err) => write!(f, "Request failed: {err}"),
            TransportError::Timeout { url } => write!(f, "Request to {url} timed out"),
            TransportError::Status { status, url } => {
                write!(f, "Server returned HTTP {status} for {url}")
            }
            TransportError::Rejected { url } => write!(f, "Server rejected the message at {url}"),
            TransportError::Body(err) => write!(f, "Failed to read response body: {err}"),
            TransportError::Decode(err) => write!(f, "Malformed JSON reply: {err}"),
            TransportError::Client(err) => write!(f, "Failed to build HTTP client: {err}"),
        }
    }
}

impl StdError for TransportError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            TransportError::Request(err)
            | TransportError::Body(err)
            | TransportError::Client(err) => Some(err),
            TransportError::Decode(err) => Some(err),
            _ => None,
        }
    }
}

impl TransportError {
    fn from_send(err: reqwest::Error, url: &str) -> Self {
        if err.is_timeout() {
            TransportError::Timeout {
                url: url.to_string(),
            }
        } else {
            TransportError::Request(err)
        }
    }
}

#[async_trait]
pub trait ChatTransport: Send + Sync {
    /// Send one user message and return the server's reply.
    async fn send_message(&self, text: &str) -> Result<ServerReply, TransportError>;

    /// Ask the server to forget the conversation.
    async fn clear(&self) -> Result<(), TransportError>;

    /// Fetch the conversation the server already holds for this session.
    async fn load_transcript(&self) -> Result<Vec<TranscriptEntry>, TransportError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub base_url: String,
    pub send_path: String,
    pub clear_path: String,
}

impl Endpoints {
    pub fn send_url(&self) -> String {
        construct_api_url(&self.base_url, &self.send_path)
    }

    pub fn clear_url(&self) -> String {
        construct_api_url(&self.base_url, &self.clear_path)
    }

    pub fn index_url(&self) -> String {
        construct_api_url(&self.base_url, "")
    }
}

/// reqwest-backed transport. Keeps a cookie store because the server ties
/// its conversation memory to a session cookie.
pub struct HttpTransport {
    client: Client,
    endpoints: Endpoints,
}

impl HttpTransport {
    pub fn new(endpoints: Endpoints, timeout: Option<Duration>) -> Result<Self, TransportError> {
        let mut builder = Client::builder().cookie_store(true);
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build().map_err(TransportError::Client)?;
        Ok(Self { client, endpoints })
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    fn check_status(response: Response, url: &str) -> Result<Response, TransportError> {
        let status = response.status();
        if status.is_success() {
            Ok(response)
        } else {
            Err(TransportError::Status {
                status: status.as_u16(),
                url: url.to_string(),
            })
        }
    }
}

fn is_json(response: &Response) -> bool {
    response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Turn a 2xx body into a reply. JSON bodies must say `ok`; anything else
/// is treated as a rendered page.
pub fn decode_reply(body: &str, json: bool, url: &str) -> Result<ServerReply, TransportError> {
    if !json {
        return Ok(extract_reply(body));
    }
    let reply: ServerReply = serde_json::from_str(body).map_err(TransportError::Decode)?;
    if !reply.ok {
        return Err(TransportError::Rejected {
            url: url.to_string(),
        });
    }
    Ok(reply)
}

#[async_trait]
impl ChatTransport for HttpTransport {
    async fn send_message(&self, text: &str) -> Result<ServerReply, TransportError> {
        let url = self.endpoints.send_url();
        debug!(%url, bytes = text.len(), "sending message");

        let response = self
            .client
            .post(&url)
            .form(&SendMessageForm { user_message: text })
            .send()
            .await
            .map_err(|err| TransportError::from_send(err, &url))?;
        let response = Self::check_status(response, &url)?;

        let json = is_json(&response);
        let body = response.text().await.map_err(TransportError::Body)?;
        decode_reply(&body, json, &url)
    }

    async fn clear(&self) -> Result<(), TransportError> {
        let url = self.endpoints.clear_url();
        debug!(%url, "clearing conversation");
        let response = self
            .client
            .post(&url)
            .send()
            .await
            .map_err(|err| TransportError::from_send(err, &url))?;
        Self::check_status(response, &url)?;
        Ok(())
    }

    async fn load_transcript(&self) -> Result<Vec<TranscriptEntry>, TransportError> {
        let url = self.endpoints.index_url();
        debug!(%url, "loading transcript");
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| TransportError::from_send(err, &url))?;
        let response = Self::check_status(response, &url)?;
        let page = response.text().await.map_err(TransportError::Body)?;
        Ok(extract_transcript(&page))
    }
}
