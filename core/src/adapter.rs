//! Orchestration between internal request descriptions and the caller's
//! request function.
//!
//! # Design
//! `TransportAdapter` owns no transport. Each call to `request` translates a
//! `RequestDescription` into an `ExternalRequest`, hands it to the
//! caller-supplied [`RequestFn`] exactly once, and normalizes the result.
//! Nothing survives between calls except the configuration, so concurrent
//! calls on one adapter are independent. Retries, timeouts and cancellation
//! belong to the request function.

use std::future::Future;

use crate::config::AdapterConfig;
use crate::headers::{self, HEADER_CONTENT_TYPE, HEADER_USER_AGENT};
use crate::http::{ExternalRequest, ExternalResponse, NormalizedResponse};
use crate::multipart::{BoundaryGenerator, MultipartEncoder};
use crate::response;
use crate::types::RequestDescription;

/// The caller-supplied transport.
///
/// Implemented for any `Fn(ExternalRequest) -> impl Future<Output =
/// Result<ExternalResponse, E>>`, so an async closure is usually enough.
///
/// # Example
///
/// ```rust
/// use std::convert::Infallible;
/// use transport_core::{Body, ExternalRequest, ExternalResponse, TransportAdapter};
///
/// let adapter = TransportAdapter::new(|req: ExternalRequest| async move {
///     Ok::<_, Infallible>(ExternalResponse {
///         status: 200,
///         headers: Vec::new(),
///         body: Body::from("ok"),
///         final_url: req.url,
///     })
/// });
/// # let _ = adapter;
/// ```
pub trait RequestFn: Send + Sync {
    /// Transport failure. Returned to the caller of `request` unchanged.
    type Error;

    fn send(
        &self,
        request: ExternalRequest,
    ) -> impl Future<Output = Result<ExternalResponse, Self::Error>> + Send;
}

impl<F, Fut, E> RequestFn for F
where
    F: Fn(ExternalRequest) -> Fut + Send + Sync,
    Fut: Future<Output = Result<ExternalResponse, E>> + Send,
{
    type Error = E;

    fn send(
        &self,
        request: ExternalRequest,
    ) -> impl Future<Output = Result<ExternalResponse, Self::Error>> + Send {
        self(request)
    }
}

/// Translates requests for a caller-supplied [`RequestFn`].
#[derive(Debug)]
pub struct TransportAdapter<F> {
    request_fn: F,
    config: AdapterConfig,
    encoder: MultipartEncoder,
}

impl<F: RequestFn> TransportAdapter<F> {
    pub fn new(request_fn: F) -> Self {
        Self::with_config(request_fn, AdapterConfig::default())
    }

    pub fn with_config(request_fn: F, config: AdapterConfig) -> Self {
        Self {
            request_fn,
            config,
            encoder: MultipartEncoder::default(),
        }
    }

    /// Replace the boundary source used for multipart bodies.
    pub fn with_boundary_generator(mut self, generator: impl BoundaryGenerator + 'static) -> Self {
        self.encoder = MultipartEncoder::new(generator);
        self
    }

    /// Set the user agent after construction.
    ///
    /// Needs `&mut self`, so it cannot run while requests borrow the adapter.
    pub fn set_user_agent(&mut self, user_agent: impl Into<String>) {
        self.config.user_agent = Some(user_agent.into());
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.config.effective_user_agent()
    }

    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    /// Build the request the request function will see.
    ///
    /// A caller-specified `user-agent` (any case) takes precedence over the
    /// configured one. A multipart payload replaces the body and every
    /// caller `content-type` header.
    pub fn prepare(&self, description: RequestDescription) -> ExternalRequest {
        let RequestDescription {
            method,
            url,
            mut headers,
            query,
            mut body,
            multipart,
        } = description;

        if let Some(user_agent) = self.user_agent() {
            if !headers::contains(&headers, HEADER_USER_AGENT) {
                headers.push((HEADER_USER_AGENT.to_string(), user_agent.to_string()));
            }
        }

        if let Some(payload) = multipart {
            let encoded = self.encoder.encode(&payload);
            headers.retain(|(name, _)| !name.eq_ignore_ascii_case(HEADER_CONTENT_TYPE));
            headers.push((HEADER_CONTENT_TYPE.to_string(), encoded.content_type()));
            body = Some(encoded.bytes.into());
        }

        ExternalRequest {
            method,
            url,
            headers,
            query,
            body,
        }
    }

    /// Send `description` through the request function and normalize the
    /// response. The request function's error is returned as-is.
    pub async fn request(&self, description: RequestDescription) -> Result<NormalizedResponse, F::Error> {
        let multipart = description.multipart.is_some();
        let external = self.prepare(description);
        tracing::debug!(method = %external.method, url = %external.url, multipart, "dispatching request");

        let raw = match self.request_fn.send(external).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::debug!("request function failed");
                return Err(e);
            }
        };

        let normalized = response::decode(raw);
        tracing::debug!(
            status = normalized.status,
            final_url = %normalized.final_url,
            json = normalized.json.is_some(),
            "response decoded"
        );
        Ok(normalized)
    }
}

#[cfg(test)]
mod tests {
    use std::convert::Infallible;
    use std::sync::{Arc, Mutex};

    use serde_json::json;

    use super::*;
    use crate::http::{Body, HeaderValue, HttpMethod};
    use crate::multipart::FixedBoundary;
    use crate::types::{FieldValue, MultipartPayload};

    type Seen = Arc<Mutex<Vec<ExternalRequest>>>;

    fn json_response(url: &str) -> ExternalResponse {
        ExternalResponse {
            status: 200,
            headers: vec![(
                "Content-Type".to_string(),
                HeaderValue::from("application/json; charset=utf-8"),
            )],
            body: Body::from(r#"{"a":1}"#),
            final_url: url.to_string(),
        }
    }

    fn recording(config: AdapterConfig) -> (TransportAdapter<impl RequestFn<Error = Infallible>>, Seen) {
        let seen: Seen = Arc::default();
        let sink = Arc::clone(&seen);
        let adapter = TransportAdapter::with_config(
            move |req: ExternalRequest| {
                let sink = Arc::clone(&sink);
                async move {
                    let response = json_response(&req.url);
                    sink.lock().unwrap().push(req);
                    Ok::<_, Infallible>(response)
                }
            },
            config,
        );
        (adapter, seen)
    }

    fn only(seen: &Seen) -> ExternalRequest {
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1, "request function must be called exactly once");
        seen[0].clone()
    }

    #[tokio::test]
    async fn plain_request_passes_through() {
        let (adapter, seen) = recording(AdapterConfig::default());
        let description = RequestDescription::post("https://api.example.com/login")
            .header("Accept", "application/json")
            .query("steamid", 76561197960287930u64)
            .body(vec![1u8, 2, 3])
            .build()
            .unwrap();

        let response = adapter.request(description).await.unwrap();
        assert_eq!(response.status, 200);
        assert_eq!(response.json, Some(json!({"a": 1})));
        assert_eq!(response.final_url, "https://api.example.com/login");

        let sent = only(&seen);
        assert_eq!(sent.method, HttpMethod::Post);
        assert_eq!(sent.headers, vec![("Accept".to_string(), "application/json".to_string())]);
        assert_eq!(sent.query, vec![("steamid".to_string(), json!(76561197960287930u64))]);
        assert_eq!(sent.body, Some(Body::from(vec![1u8, 2, 3])));
    }

    #[tokio::test]
    async fn missing_body_stays_missing() {
        let (adapter, seen) = recording(AdapterConfig::default());
        adapter
            .request(RequestDescription::get("https://example.com").build().unwrap())
            .await
            .unwrap();
        assert_eq!(only(&seen).body, None);
    }

    #[tokio::test]
    async fn configured_user_agent_is_added() {
        let (adapter, seen) = recording(AdapterConfig::new().with_user_agent("client/1.0"));
        adapter
            .request(RequestDescription::get("https://example.com").build().unwrap())
            .await
            .unwrap();
        assert_eq!(headers::lookup(&only(&seen).headers, "user-agent"), Some("client/1.0"));
    }

    #[tokio::test]
    async fn caller_user_agent_wins() {
        let (adapter, seen) = recording(AdapterConfig::new().with_user_agent("client/1.0"));
        let description = RequestDescription::get("https://example.com")
            .header("User-Agent", "custom/9")
            .build()
            .unwrap();
        adapter.request(description).await.unwrap();
        assert_eq!(
            only(&seen).headers,
            vec![("User-Agent".to_string(), "custom/9".to_string())]
        );
    }

    #[tokio::test]
    async fn set_user_agent_applies_to_later_requests() {
        let (mut adapter, seen) = recording(AdapterConfig::default());
        assert_eq!(adapter.user_agent(), None);
        adapter.set_user_agent("late/2");
        assert_eq!(adapter.user_agent(), Some("late/2"));
        adapter
            .request(RequestDescription::get("https://example.com").build().unwrap())
            .await
            .unwrap();
        assert_eq!(
            only(&seen).headers,
            vec![("user-agent".to_string(), "late/2".to_string())]
        );
    }

    #[tokio::test]
    async fn multipart_sets_body_and_content_type() {
        let (adapter, seen) = recording(AdapterConfig::default());
        let adapter = adapter.with_boundary_generator(FixedBoundary::new("tok"));
        let payload = MultipartPayload::new()
            .with_field("foo", FieldValue::text("bar"))
            .unwrap();
        let description = RequestDescription::post("https://example.com/upload")
            .header("Content-Type", "application/json")
            .header("X-Keep", "1")
            .body("ignored")
            .multipart(payload)
            .build()
            .unwrap();

        adapter.request(description).await.unwrap();
        let sent = only(&seen);
        assert_eq!(
            sent.headers,
            vec![
                ("X-Keep".to_string(), "1".to_string()),
                (
                    "content-type".to_string(),
                    "multipart/form-data; boundary=tok".to_string()
                ),
            ]
        );
        let body = sent.body.unwrap().to_text();
        assert_eq!(
            body,
            "--tok\r\nContent-Disposition: form-data; name=\"foo\"\r\n\r\nbar\r\n--tok--\r\n"
        );
    }

    #[tokio::test]
    async fn multipart_without_headers_gets_boundary_header() {
        let (adapter, seen) = recording(AdapterConfig::default());
        let description = RequestDescription::post("https://example.com")
            .multipart(MultipartPayload::new())
            .build()
            .unwrap();
        adapter.request(description).await.unwrap();
        let sent = only(&seen);
        let content_type = headers::lookup(&sent.headers, "content-type").unwrap();
        assert!(content_type.contains("multipart/form-data; boundary="));
        let boundary = content_type.rsplit('=').next().unwrap();
        assert_eq!(
            sent.body.unwrap().to_bytes().as_ref(),
            format!("--{boundary}--\r\n").as_bytes()
        );
    }

    #[derive(Debug, PartialEq)]
    enum TransportDown {
        Refused(&'static str),
    }

    #[tokio::test]
    async fn transport_error_is_returned_unchanged() {
        let calls = Arc::new(Mutex::new(0u32));
        let counter = Arc::clone(&calls);
        let adapter = TransportAdapter::new(move |_req: ExternalRequest| {
            *counter.lock().unwrap() += 1;
            async { Err::<ExternalResponse, _>(TransportDown::Refused("connection refused")) }
        });
        let err = adapter
            .request(RequestDescription::get("https://example.com").build().unwrap())
            .await
            .unwrap_err();
        assert_eq!(err, TransportDown::Refused("connection refused"));
        assert_eq!(*calls.lock().unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_requests_are_independent() {
        let (adapter, seen) = recording(AdapterConfig::new().with_user_agent("ua"));
        let a = RequestDescription::get("https://example.com/a").build().unwrap();
        let b = RequestDescription::get("https://example.com/b").build().unwrap();
        let (ra, rb) = tokio::join!(adapter.request(a), adapter.request(b));
        assert_eq!(ra.unwrap().final_url, "https://example.com/a");
        assert_eq!(rb.unwrap().final_url, "https://example.com/b");
        assert_eq!(seen.lock().unwrap().len(), 2);
    }
}
