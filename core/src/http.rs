//! HTTP transport types exchanged with the caller-supplied request function.
//!
//! # Design
//! These types describe requests and responses as plain data. The core never
//! touches the network: the adapter hands an `ExternalRequest` to the caller's
//! request function and receives an `ExternalResponse` back, which it then
//! normalizes. Bodies on both sides may be raw bytes or text, so `Body` keeps
//! both representations (plus a catch-all JSON value) and converts lazily.

use std::fmt;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request or response body.
///
/// `Value` covers bodies that are neither bytes nor text. They are coerced to
/// their string form before any byte or text view is taken.
#[derive(Debug, Clone, PartialEq)]
pub enum Body {
    Bytes(Bytes),
    Text(String),
    Value(serde_json::Value),
}

impl Body {
    /// Raw byte view. Text is UTF-8 encoded; values are stringified first.
    pub fn to_bytes(&self) -> Bytes {
        match self {
            Body::Bytes(bytes) => bytes.clone(),
            Body::Text(text) => Bytes::copy_from_slice(text.as_bytes()),
            Body::Value(value) => Bytes::from(stringify_value(value)),
        }
    }

    /// Text view. Bytes are decoded as UTF-8, replacing invalid sequences
    /// with U+FFFD.
    pub fn to_text(&self) -> String {
        match self {
            Body::Bytes(bytes) => String::from_utf8_lossy(bytes).into_owned(),
            Body::Text(text) => text.clone(),
            Body::Value(value) => stringify_value(value),
        }
    }

    pub fn is_bytes(&self) -> bool {
        matches!(self, Body::Bytes(_))
    }
}

/// A JSON string stringifies to its contents; anything else to its JSON text.
fn stringify_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        Body::Bytes(bytes)
    }
}

impl From<Vec<u8>> for Body {
    fn from(bytes: Vec<u8>) -> Self {
        Body::Bytes(Bytes::from(bytes))
    }
}

impl From<&'static [u8]> for Body {
    fn from(bytes: &'static [u8]) -> Self {
        Body::Bytes(Bytes::from_static(bytes))
    }
}

impl From<String> for Body {
    fn from(text: String) -> Self {
        Body::Text(text)
    }
}

impl From<&str> for Body {
    fn from(text: &str) -> Self {
        Body::Text(text.to_string())
    }
}

impl From<serde_json::Value> for Body {
    fn from(value: serde_json::Value) -> Self {
        Body::Value(value)
    }
}

/// A response header value. Repeated headers (e.g. `set-cookie`) arrive as
/// `Multiple`, in the order the transport saw them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValue {
    Single(String),
    Multiple(Vec<String>),
}

impl HeaderValue {
    /// The single value, or the first of a repeated header.
    pub fn first(&self) -> Option<&str> {
        match self {
            HeaderValue::Single(value) => Some(value),
            HeaderValue::Multiple(values) => values.first().map(String::as_str),
        }
    }
}

impl From<String> for HeaderValue {
    fn from(value: String) -> Self {
        HeaderValue::Single(value)
    }
}

impl From<&str> for HeaderValue {
    fn from(value: &str) -> Self {
        HeaderValue::Single(value.to_string())
    }
}

impl From<Vec<String>> for HeaderValue {
    fn from(values: Vec<String>) -> Self {
        HeaderValue::Multiple(values)
    }
}

/// The request handed to the caller-supplied request function.
///
/// Query parameters are passed through untouched; URL-encoding them is the
/// request function's job.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, serde_json::Value)>,
    pub body: Option<Body>,
}

/// What the caller-supplied request function must produce.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalResponse {
    pub status: u16,
    pub headers: Vec<(String, HeaderValue)>,
    pub body: Body,
    /// URL after any redirects the transport followed.
    pub final_url: String,
}

/// The transport-independent response returned to the client.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedResponse {
    pub status: u16,
    /// Header names are lower-cased; values are unchanged.
    pub headers: Vec<(String, HeaderValue)>,
    pub final_url: String,
    /// Present only when the content type is JSON and the text parses.
    pub json: Option<serde_json::Value>,
    pub text: String,
    pub raw: Bytes,
}
