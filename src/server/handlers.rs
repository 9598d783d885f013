//! Route handlers.

use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderName, StatusCode, header},
    response::{Html, IntoResponse, Response},
};
use bytes::Bytes;
use futures::StreamExt;
use serde::Serialize;
use std::convert::Infallible;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use super::{AppState, SERVICE_NAME};
use crate::error::SessionError;
use crate::metrics::MetricsController;
use crate::session::{ChannelSink, StreamSession};

const INDEX_HTML: &str = include_str!("../../assets/index.html");

const X_ACCEL_BUFFERING: HeaderName = HeaderName::from_static("x-accel-buffering");

const PROMETHEUS_CONTENT_TYPE: &str = "text/plain; version=0.0.4";

pub(super) async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Serialize)]
pub(super) struct HealthStatus {
    status: &'static str,
    service: &'static str,
}

pub(super) async fn health() -> Json<HealthStatus> {
    Json(HealthStatus {
        status: "ok",
        service: SERVICE_NAME,
    })
}

pub(super) async fn metrics(State(state): State<AppState>) -> Response {
    if !state.metrics_enabled {
        return (StatusCode::SERVICE_UNAVAILABLE, "Metrics disabled\n").into_response();
    }

    match MetricsController::get() {
        Ok(controller) => (
            [(header::CONTENT_TYPE, PROMETHEUS_CONTENT_TYPE)],
            controller.render(),
        )
            .into_response(),
        Err(e) => (StatusCode::SERVICE_UNAVAILABLE, format!("{e}\n")).into_response(),
    }
}

/// Open a stream session and hand its frames to the response body.
///
/// The session runs on its own task. When the client goes away hyper drops
/// the body, which closes the channel and ends the session.
pub(super) async fn stream(State(state): State<AppState>) -> Result<Response, SessionError> {
    let (sink, rx) = ChannelSink::new(state.stream.channel_capacity);

    let session = StreamSession::open(
        state.fetcher.clone(),
        sink,
        state.stream.interval(),
        state.shutdown.child_token(),
    )?;

    debug!("Stream session started");
    tokio::spawn(session.run());

    Ok(event_stream(rx))
}

fn event_stream(rx: mpsc::Receiver<Bytes>) -> Response {
    let body = Body::from_stream(ReceiverStream::new(rx).map(Ok::<_, Infallible>));

    (
        [
            (header::CONTENT_TYPE, "text/event-stream"),
            (header::CACHE_CONTROL, "no-cache"),
            (header::CONNECTION, "keep-alive"),
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (X_ACCEL_BUFFERING, "no"),
        ],
        body,
    )
        .into_response()
}

impl IntoResponse for SessionError {
    fn into_response(self) -> Response {
        warn!(error = %self, "Refusing stream");
        (StatusCode::INTERNAL_SERVER_ERROR, self.to_string()).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn test_health_payload() {
        let body = serde_json::to_string(&health().await.0).unwrap();

        assert_eq!(body, r#"{"status":"ok","service":"brewery-stream"}"#);
    }

    #[tokio::test]
    async fn test_session_error_is_500() {
        let response = SessionError::StreamingUnsupported.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"SSE not supported");
    }

    #[tokio::test]
    async fn test_event_stream_headers() {
        let (_tx, rx) = mpsc::channel(1);
        let response = event_stream(rx);
        let headers = response.headers();

        assert_eq!(headers[header::CONTENT_TYPE], "text/event-stream");
        assert_eq!(headers[header::CACHE_CONTROL], "no-cache");
        assert_eq!(headers[header::CONNECTION], "keep-alive");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers["x-accel-buffering"], "no");
    }

    #[test]
    fn test_index_is_embedded() {
        assert!(INDEX_HTML.contains("new EventSource('/stream')"));
    }
}
