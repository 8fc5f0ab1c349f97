//! Normalization of request-function results.

use serde::de::DeserializeOwned;

use crate::headers::{self, HEADER_CONTENT_TYPE};
use crate::http::{ExternalResponse, HeaderValue, NormalizedResponse};

const JSON_MEDIA_TYPE: &str = "application/json";

/// Turn whatever the request function returned into a `NormalizedResponse`.
///
/// Never fails: a JSON content type with an unparsable body just leaves
/// `json` empty.
pub fn decode(external: ExternalResponse) -> NormalizedResponse {
    let raw = external.body.to_bytes();
    let text = external.body.to_text();

    let json = headers::lookup(&external.headers, HEADER_CONTENT_TYPE)
        .filter(|content_type| content_type.contains(JSON_MEDIA_TYPE))
        .and_then(|_| try_parse_json(&text));

    NormalizedResponse {
        status: external.status,
        headers: headers::lowercase_keys(&external.headers),
        final_url: external.final_url,
        json,
        text,
        raw,
    }
}

/// Parse `text` as JSON, discarding the error.
pub fn try_parse_json(text: &str) -> Option<serde_json::Value> {
    serde_json::from_str(text).ok()
}

impl NormalizedResponse {
    /// Header value by name, ignoring case.
    pub fn header(&self, name: &str) -> Option<&str> {
        headers::lookup(&self.headers, name)
    }

    /// Every value of a possibly repeated header.
    pub fn header_all(&self, name: &str) -> Vec<&str> {
        match self.headers.iter().find(|(key, _)| key.eq_ignore_ascii_case(name)) {
            Some((_, HeaderValue::Single(value))) => vec![value.as_str()],
            Some((_, HeaderValue::Multiple(values))) => values.iter().map(String::as_str).collect(),
            None => Vec::new(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Deserialize the JSON view into `T`. `None` when there is no JSON view
    /// or it does not fit `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Option<T> {
        self.json.as_ref().and_then(|value| T::deserialize(value).ok())
    }
}
