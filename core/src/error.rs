//! Error types for building request descriptions.
//!
//! # Design
//! The adapter itself has one failure path: the request function's own error,
//! returned unchanged as `F::Error`. Everything detectable locally is caught
//! earlier, when the caller assembles a `RequestDescription` or a
//! `MultipartPayload`, so values that would corrupt the wire never reach the
//! adapter.

/// Errors returned while constructing requests and multipart payloads.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RequestError {
    /// The request URL was empty or whitespace.
    #[error("request url is empty")]
    EmptyUrl,

    /// A header name was empty or contained characters outside the HTTP token
    /// set.
    #[error("invalid header name: {0:?}")]
    InvalidHeaderName(String),

    /// A header value contained CR or LF.
    #[error("invalid value for header {0:?}")]
    InvalidHeaderValue(String),

    /// The multipart payload already holds a field with this name.
    #[error("duplicate multipart field: {0:?}")]
    DuplicateField(String),

    /// A field name was empty or contained `"`, CR or LF.
    #[error("invalid multipart field name: {0:?}")]
    InvalidFieldName(String),

    /// A filename contained `"`, CR or LF.
    #[error("invalid filename for field {0:?}")]
    InvalidFilename(String),

    /// A field content type contained CR or LF.
    #[error("invalid content type for field {0:?}")]
    InvalidContentType(String),

    /// A query parameter value could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    SerializationError(String),
}
