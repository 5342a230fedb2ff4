//! Invocation ingest endpoint.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{header, HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use spectacle_forwarder::{Invocation, Outcome};
use spectacle_types::{EventData, RequestHeaders, TagConfig};

use crate::cookies::RequestCookies;
use crate::AppState;

/// Body of `POST /collect`.
#[derive(Debug, Deserialize)]
pub struct CollectRequest {
    /// Tag configuration, camelCase as in the tag template.
    #[serde(default)]
    pub tag: TagConfig,
    /// Normalized event data.
    #[serde(default)]
    pub event: EventData,
}

/// Response body of `POST /collect`.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CollectResponse {
    pub outcome: String,
    /// Upstream status for delivered events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    /// Why nothing was sent, for skipped events.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl CollectResponse {
    fn from_outcome(outcome: &Outcome) -> (StatusCode, Self) {
        let mut body = Self {
            outcome: outcome.label().to_string(),
            status: None,
            reason: None,
            error: None,
        };

        let status = match outcome {
            Outcome::Delivered { status } => {
                body.status = Some(*status);
                StatusCode::OK
            }
            Outcome::Dispatched => StatusCode::OK,
            Outcome::Skipped(reason) => {
                body.reason = Some(reason.as_str().to_string());
                StatusCode::OK
            }
            Outcome::Failed(e) => {
                body.error = Some(e.to_string());
                if e.is_invocation_error() {
                    StatusCode::BAD_REQUEST
                } else if e.is_upstream_error() {
                    StatusCode::BAD_GATEWAY
                } else {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            }
        };

        (status, body)
    }
}

/// `POST /collect`: runs one invocation and returns its outcome.
///
/// Identity cookies written during the invocation are returned as
/// `Set-Cookie` headers.
pub async fn collect_handler(
    Extension(state): Extension<Arc<AppState>>,
    headers: HeaderMap,
    Json(request): Json<CollectRequest>,
) -> Response {
    let tag = state.tag_defaults.apply(request.tag);
    let request_headers = request_headers(&headers);
    let mut cookies = RequestCookies::from_headers(&headers);

    let outcome = state
        .forwarder
        .handle(Invocation {
            tag: &tag,
            event: &request.event,
            headers: &request_headers,
            cookies: &mut cookies,
            container: state.container,
        })
        .await;

    if let Outcome::Failed(e) = &outcome {
        tracing::info!(method_type = %tag.method_type, error = %e, "invocation failed");
    }

    let (status, body) = CollectResponse::from_outcome(&outcome);
    let mut response = (status, Json(body)).into_response();
    for cookie in cookies.set_cookie_headers() {
        match HeaderValue::from_str(&cookie) {
            Ok(value) => {
                response.headers_mut().append(header::SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, "dropping unrepresentable cookie"),
        }
    }
    response
}

fn request_headers(headers: &HeaderMap) -> RequestHeaders {
    headers
        .iter()
        .filter_map(|(name, value)| Some((name.as_str(), value.to_str().ok()?)))
        .collect()
}
