//! multipart/form-data encoding.
//!
//! # Design
//! Encoding is pure apart from the boundary token, which comes from a
//! [`BoundaryGenerator`]. The default generator mixes a constant prefix, the
//! current time and random hex; tests swap in [`FixedBoundary`] to assert
//! exact wire bytes. Field content is never scanned for the boundary.

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use bytes::{Bytes, BytesMut};
use rand::Rng;

use crate::types::MultipartPayload;

pub const BOUNDARY_PREFIX: &str = "----TransportFormBoundary";

/// Source of boundary tokens.
pub trait BoundaryGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// Prefix + Unix millis (hex) + 64 random bits (hex).
///
/// Collision resistant in practice, not cryptographically secure.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomBoundary;

impl BoundaryGenerator for RandomBoundary {
    fn generate(&self) -> String {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        let random: u64 = rand::rng().random();
        format!("{BOUNDARY_PREFIX}{millis:x}{random:016x}")
    }
}

/// Always returns the same token.
#[derive(Debug, Clone)]
pub struct FixedBoundary(pub String);

impl FixedBoundary {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }
}

impl BoundaryGenerator for FixedBoundary {
    fn generate(&self) -> String {
        self.0.clone()
    }
}

/// An encoded multipart body and the boundary it was framed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub bytes: Bytes,
    pub boundary: String,
}

impl EncodedBody {
    /// Value for the `content-type` header of a request carrying this body.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }
}

#[derive(Clone)]
pub struct MultipartEncoder {
    generator: Arc<dyn BoundaryGenerator>,
}

impl Default for MultipartEncoder {
    fn default() -> Self {
        Self::new(RandomBoundary)
    }
}

impl std::fmt::Debug for MultipartEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipartEncoder").finish_non_exhaustive()
    }
}

impl MultipartEncoder {
    pub fn new(generator: impl BoundaryGenerator + 'static) -> Self {
        Self {
            generator: Arc::new(generator),
        }
    }

    pub fn encode(&self, payload: &MultipartPayload) -> EncodedBody {
        let boundary = self.generator.generate();
        let mut buf = BytesMut::new();

        for (name, field) in payload.iter() {
            buf.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
            buf.extend_from_slice(format!("Content-Disposition: form-data; name=\"{name}\"").as_bytes());
            if let Some(filename) = &field.filename {
                buf.extend_from_slice(format!("; filename=\"{filename}\"").as_bytes());
            }
            if let Some(content_type) = &field.content_type {
                buf.extend_from_slice(format!("\r\nContent-Type: {content_type}").as_bytes());
            }
            buf.extend_from_slice(b"\r\n\r\n");
            buf.extend_from_slice(&field.content.to_bytes());
            buf.extend_from_slice(b"\r\n");
        }
        buf.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());

        tracing::trace!(fields = payload.len(), len = buf.len(), "encoded multipart body");
        EncodedBody {
            bytes: buf.freeze(),
            boundary,
        }
    }
}
