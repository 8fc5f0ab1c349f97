use axum::{
    body::Bytes,
    extract::{Multipart, Path, Query},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{any, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// Everything the server saw of an `/echo` request.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EchoReport {
    pub method: String,
    pub headers: Vec<(String, String)>,
    pub query: Vec<(String, String)>,
    pub body: String,
}

/// One part of an `/upload` request, as parsed by axum's multipart reader.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UploadedPart {
    pub name: Option<String>,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    pub content: String,
}

pub fn app() -> Router {
    Router::new()
        .route("/echo", any(echo))
        .route("/upload", post(upload))
        .route("/text", get(text))
        .route("/broken-json", get(broken_json))
        .route("/redirect", get(redirect))
        .route("/cookies", get(cookies))
        .route("/status/{code}", get(status))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn echo(
    method: Method,
    headers: HeaderMap,
    Query(query): Query<Vec<(String, String)>>,
    body: Bytes,
) -> Json<EchoReport> {
    let headers = headers
        .iter()
        .map(|(name, value)| {
            (
                name.as_str().to_string(),
                String::from_utf8_lossy(value.as_bytes()).into_owned(),
            )
        })
        .collect();
    tracing::debug!(%method, "echo");
    Json(EchoReport {
        method: method.to_string(),
        headers,
        query,
        body: String::from_utf8_lossy(&body).into_owned(),
    })
}

async fn upload(mut multipart: Multipart) -> Result<Json<Vec<UploadedPart>>, StatusCode> {
    let mut parts = Vec::new();
    while let Some(field) = multipart.next_field().await.map_err(|_| StatusCode::BAD_REQUEST)? {
        let name = field.name().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let content = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        parts.push(UploadedPart {
            name,
            filename,
            content_type,
            content: String::from_utf8_lossy(&content).into_owned(),
        });
    }
    tracing::debug!(parts = parts.len(), "upload parsed");
    Ok(Json(parts))
}

async fn text() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/plain; charset=utf-8")], "plain text body")
}

async fn broken_json() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "application/json")], "not json")
}

async fn redirect() -> Redirect {
    Redirect::to("/echo")
}

async fn cookies() -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    headers.append(header::SET_COOKIE, HeaderValue::from_static("a=1"));
    headers.append(header::SET_COOKIE, HeaderValue::from_static("b=2"));
    (headers, "ok")
}

async fn status(Path(code): Path<u16>) -> (StatusCode, Json<serde_json::Value>) {
    let status = StatusCode::from_u16(code).unwrap_or(StatusCode::BAD_REQUEST);
    (status, Json(serde_json::json!({ "status": status.as_u16() })))
}
