//! In-process stand-in for the MockServer control plane.
//!
//! Implements just enough of the administrative API for the client's tests
//! and the demo program: expectations are registered, matched by method and
//! path, counted, verified and cleared. Any request outside `/mockserver/*`
//! is served from the registered expectations.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::put,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{debug, info};
use uuid::Uuid;

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct RequestMatcher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

impl RequestMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        let method_ok = self
            .method
            .as_deref()
            .map_or(true, |m| m.eq_ignore_ascii_case(method.as_str()));
        let path_ok = self.path.as_deref().map_or(true, |p| p == path);
        method_ok && path_ok
    }
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CannedResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Expectation {
    pub id: String,
    pub http_request: RequestMatcher,
    #[serde(default)]
    pub http_response: CannedResponse,
}

#[derive(Deserialize)]
struct RawExpectation {
    id: Option<String>,
    #[serde(rename = "httpRequest")]
    http_request: Option<RequestMatcher>,
    #[serde(rename = "httpResponse", default)]
    http_response: CannedResponse,
}

#[derive(Deserialize)]
pub struct ExpectationId {
    pub id: String,
}

#[derive(Clone, Copy, Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Times {
    pub at_least: Option<u32>,
    pub at_most: Option<u32>,
}

impl Times {
    fn satisfied_by(&self, hits: u32) -> bool {
        let at_least = self.at_least.unwrap_or(1);
        hits >= at_least && self.at_most.map_or(true, |at_most| hits <= at_most)
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Verification {
    pub expectation_id: ExpectationId,
    #[serde(default)]
    pub times: Times,
}

struct Entry {
    expectation: Expectation,
    hits: u32,
}

#[derive(Default)]
pub struct ServerState {
    entries: Vec<Entry>,
}

impl ServerState {
    fn upsert(&mut self, expectation: Expectation) {
        match self
            .entries
            .iter_mut()
            .find(|e| e.expectation.id == expectation.id)
        {
            Some(entry) => entry.expectation = expectation,
            None => self.entries.push(Entry {
                expectation,
                hits: 0,
            }),
        }
    }

    fn hits(&self, id: &str) -> u32 {
        self.entries
            .iter()
            .find(|e| e.expectation.id == id)
            .map_or(0, |e| e.hits)
    }
}

pub type Db = Arc<RwLock<ServerState>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(ServerState::default()));
    Router::new()
        .route("/mockserver/expectation", put(create_expectation))
        .route("/mockserver/verify", put(verify))
        .route("/mockserver/clear", put(clear))
        .fallback(serve_expectation)
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// Parse one expectation or an array of them. `Err(400)` for anything that is
/// not JSON, `Err(406)` for JSON that is not a usable expectation.
fn parse_expectations(body: &[u8]) -> Result<Vec<Expectation>, StatusCode> {
    let value: Value = serde_json::from_slice(body).map_err(|_| StatusCode::BAD_REQUEST)?;
    let items = match value {
        Value::Array(items) => items,
        other => vec![other],
    };
    items
        .into_iter()
        .map(|item| {
            let raw: RawExpectation =
                serde_json::from_value(item).map_err(|_| StatusCode::NOT_ACCEPTABLE)?;
            let http_request = raw.http_request.ok_or(StatusCode::NOT_ACCEPTABLE)?;
            Ok(Expectation {
                id: raw.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
                http_request,
                http_response: raw.http_response,
            })
        })
        .collect()
}

async fn create_expectation(State(db): State<Db>, body: Bytes) -> Response {
    let expectations = match parse_expectations(&body) {
        Ok(expectations) => expectations,
        Err(status) => {
            debug!(%status, "rejected expectation");
            let reason = if status == StatusCode::BAD_REQUEST {
                "incorrect request format"
            } else {
                "invalid expectation"
            };
            return (status, reason).into_response();
        }
    };
    let mut state = db.write().await;
    for expectation in &expectations {
        info!(id = %expectation.id, "registered expectation");
        state.upsert(expectation.clone());
    }
    (StatusCode::CREATED, Json(expectations)).into_response()
}

async fn verify(State(db): State<Db>, body: Bytes) -> Response {
    let verification: Verification = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(_) => return (StatusCode::BAD_REQUEST, "incorrect request format").into_response(),
    };
    let id = verification.expectation_id.id;
    let hits = db.read().await.hits(&id);
    if verification.times.satisfied_by(hits) {
        debug!(%id, hits, "verification passed");
        return StatusCode::ACCEPTED.into_response();
    }
    info!(%id, hits, "verification failed");
    (
        StatusCode::NOT_ACCEPTABLE,
        format!("Request not found for expectation {id}, matched {hits} times"),
    )
        .into_response()
}

async fn clear(State(db): State<Db>) -> StatusCode {
    let mut state = db.write().await;
    state.entries.clear();
    info!("cleared expectations and recorded requests");
    StatusCode::OK
}

async fn serve_expectation(State(db): State<Db>, method: Method, uri: Uri) -> Response {
    let mut state = db.write().await;
    let entry = state
        .entries
        .iter_mut()
        .find(|e| e.expectation.http_request.matches(&method, uri.path()));
    let Some(entry) = entry else {
        debug!(%method, path = uri.path(), "no matching expectation");
        return StatusCode::NOT_FOUND.into_response();
    };
    entry.hits += 1;

    let response = &entry.expectation.http_response;
    let status = response
        .status_code
        .and_then(|code| StatusCode::from_u16(code).ok())
        .unwrap_or(StatusCode::OK);
    match &response.body {
        None => status.into_response(),
        Some(Value::String(text)) => (status, text.clone()).into_response(),
        Some(json) => (
            status,
            [(header::CONTENT_TYPE, "application/json")],
            json.to_string(),
        )
            .into_response(),
    }
}
