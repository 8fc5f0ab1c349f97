//! Delegated HTTP transport core for session clients.
//!
//! # Overview
//! Translates internal request descriptions into plain-data requests for a
//! caller-supplied request function, and normalizes whatever that function
//! returns (host-does-IO pattern). The core encodes multipart bodies itself so
//! request functions that only accept pre-encoded bodies still work, and it
//! decodes responses into one uniform shape with lower-cased headers, text
//! and byte views, and best-effort JSON.
//!
//! # Design
//! - `TransportAdapter` holds only configuration; every request builds and
//!   drops its own intermediate values.
//! - The request function's error type flows through untouched
//!   (`RequestFn::Error`). Local anomalies degrade to absent optional fields.
//! - Boundary generation sits behind `BoundaryGenerator` so multipart wire
//!   bytes are reproducible in tests.

pub mod adapter;
pub mod config;
pub mod error;
pub mod headers;
pub mod http;
pub mod multipart;
pub mod response;
pub mod types;

pub use adapter::{RequestFn, TransportAdapter};
pub use config::AdapterConfig;
pub use error::RequestError;
pub use http::{Body, ExternalRequest, ExternalResponse, HeaderValue, HttpMethod, NormalizedResponse};
pub use multipart::{BoundaryGenerator, EncodedBody, FixedBoundary, MultipartEncoder, RandomBoundary};
pub use response::{decode, try_parse_json};
pub use types::{FieldValue, MultipartPayload, RequestBuilder, RequestDescription};
