//! Request descriptions and multipart payloads.
//!
//! # Design
//! These are the client-facing inputs to `TransportAdapter::request`. Shapes
//! are validated where they are built (`RequestBuilder::build`,
//! `MultipartPayload::insert`), so the adapter and encoder can treat them as
//! well-formed without re-checking.

use std::fmt::Display;

use serde::Serialize;

use crate::error::RequestError;
use crate::http::{Body, HttpMethod};

/// An internal request, before translation for the request function.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescription {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, serde_json::Value)>,
    pub body: Option<Body>,
    pub multipart: Option<MultipartPayload>,
}

impl RequestDescription {
    pub fn builder(method: HttpMethod, url: impl Into<String>) -> RequestBuilder {
        RequestBuilder {
            method,
            url: url.into(),
            headers: Vec::new(),
            query: Vec::new(),
            body: None,
            multipart: None,
            error: None,
        }
    }

    pub fn get(url: impl Into<String>) -> RequestBuilder {
        Self::builder(HttpMethod::Get, url)
    }

    pub fn post(url: impl Into<String>) -> RequestBuilder {
        Self::builder(HttpMethod::Post, url)
    }
}

/// Builder for [`RequestDescription`].
///
/// The first invalid input is remembered and reported by [`build`](Self::build).
#[derive(Debug)]
pub struct RequestBuilder {
    method: HttpMethod,
    url: String,
    headers: Vec<(String, String)>,
    query: Vec<(String, serde_json::Value)>,
    body: Option<Body>,
    multipart: Option<MultipartPayload>,
    error: Option<RequestError>,
}

impl RequestBuilder {
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        if !is_token(&name) {
            self.fail(RequestError::InvalidHeaderName(name));
        } else if has_line_break(&value) {
            self.fail(RequestError::InvalidHeaderValue(name));
        } else {
            self.headers.push((name, value));
        }
        self
    }

    pub fn query<T: Serialize>(mut self, name: impl Into<String>, value: T) -> Self {
        match serde_json::to_value(value) {
            Ok(value) => self.query.push((name.into(), value)),
            Err(e) => self.fail(RequestError::SerializationError(e.to_string())),
        }
        self
    }

    pub fn body(mut self, body: impl Into<Body>) -> Self {
        self.body = Some(body.into());
        self
    }

    pub fn multipart(mut self, payload: MultipartPayload) -> Self {
        self.multipart = Some(payload);
        self
    }

    pub fn build(self) -> Result<RequestDescription, RequestError> {
        if let Some(e) = self.error {
            return Err(e);
        }
        if self.url.trim().is_empty() {
            return Err(RequestError::EmptyUrl);
        }
        Ok(RequestDescription {
            method: self.method,
            url: self.url,
            headers: self.headers,
            query: self.query,
            body: self.body,
            multipart: self.multipart,
        })
    }

    fn fail(&mut self, error: RequestError) {
        self.error.get_or_insert(error);
    }
}

/// One multipart field: content plus optional filename and content type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub content: Body,
    pub filename: Option<String>,
    pub content_type: Option<String>,
}

impl FieldValue {
    pub fn new(content: impl Into<Body>) -> Self {
        Self {
            content: content.into(),
            filename: None,
            content_type: None,
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::new(Body::Text(content.into()))
    }

    pub fn bytes(content: impl Into<bytes::Bytes>) -> Self {
        Self::new(Body::Bytes(content.into()))
    }

    /// A field whose content is the `Display` form of `value`, e.g. a number.
    pub fn display(value: impl Display) -> Self {
        Self::text(value.to_string())
    }

    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

/// Ordered multipart fields. Insertion order is wire order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MultipartPayload {
    fields: Vec<(String, FieldValue)>,
}

impl MultipartPayload {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a field. Names must be unique within the payload.
    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) -> Result<(), RequestError> {
        let name = name.into();
        if name.is_empty() || has_line_break(&name) || name.contains('"') {
            return Err(RequestError::InvalidFieldName(name));
        }
        if self.get(&name).is_some() {
            return Err(RequestError::DuplicateField(name));
        }
        if let Some(filename) = &value.filename {
            if has_line_break(filename) || filename.contains('"') {
                return Err(RequestError::InvalidFilename(name));
            }
        }
        if let Some(content_type) = &value.content_type {
            if has_line_break(content_type) {
                return Err(RequestError::InvalidContentType(name));
            }
        }
        self.fields.push((name, value));
        Ok(())
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Result<Self, RequestError> {
        self.insert(name, value)?;
        Ok(self)
    }

    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.fields.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

fn has_line_break(s: &str) -> bool {
    s.contains(['\r', '\n'])
}

/// RFC 9110 `token`: the characters allowed in a header name.
fn is_token(s: &str) -> bool {
    !s.is_empty()
        && s.bytes().all(|b| {
            b.is_ascii_alphanumeric()
                || matches!(
                    b,
                    b'!' | b'#' | b'$' | b'%' | b'&' | b'\'' | b'*' | b'+' | b'-' | b'.' | b'^' | b'_' | b'`' | b'|' | b'~'
                )
        })
}
