//! HTTP Server for the ironlog API.
//!
//! Provides REST endpoints for uploading an export and getting analytics back.
//!
//! # API Endpoints
//!
//! | Method | Path              | Description                          |
//! |--------|-------------------|--------------------------------------|
//! | GET    | `/health`         | Health check                         |
//! | POST   | `/api/upload`     | Upload CSV export for analysis       |
//! | GET    | `/api/logs`       | SSE stream for real-time logs        |
//!
//! `/api/upload` accepts `period`, `top`, `strictDates` and `strictColumns`
//! as query parameters.

use axum::{
    extract::{Multipart, Query},
    http::{header, Method, StatusCode},
    response::{sse::Event, Json, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::CorsLayer;

use super::logs::{log_error, log_info, log_success, LogStage, LOG_BROADCASTER};
use super::types::{error_response, UploadQuery, UploadResponse};
use crate::error::ServerError;
use crate::transform::{ingest_bytes, DatePolicy, IngestOptions};

type Rejection = (StatusCode, Json<Value>);

/// Build the router. Split out of [`start_server`] so it can be driven in tests.
pub fn router() -> Router {
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE]);

    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/upload", post(upload_csv))
        .route("/api/logs", get(sse_logs))
        .layer(cors)
}

/// Start the HTTP server
pub async fn start_server(port: u16) -> Result<(), Box<dyn std::error::Error>> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr).await?;

    log_success(LogStage::Server, format!("ironlog server running on http://localhost:{}", port));
    log_info(LogStage::Server, "POST /api/upload - Upload CSV export");
    log_info(LogStage::Server, "GET  /api/logs   - SSE log stream");
    log_info(LogStage::Server, "GET  /health     - Health check");

    axum::serve(listener, router()).await?;

    Ok(())
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "ironlog",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "upload": "POST /api/upload",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    // Lagged receivers just drop the entries they missed.
    let stream = BroadcastStream::new(rx).filter_map(|result| {
        let entry = result.ok()?;
        let json = serde_json::to_string(&entry).ok()?;
        Some(Ok(Event::default().data(json)))
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// Upload CSV endpoint
async fn upload_csv(
    Query(query): Query<UploadQuery>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, Rejection> {
    let mut file_data: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| reject(ServerError::BadRequest(format!("Multipart error: {}", e))))?
    {
        if field.name() == Some("file") {
            file_name = field.file_name().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| reject(ServerError::BadRequest(format!("Read error: {}", e))))?;
            file_data = Some(bytes.to_vec());
        }
    }

    let bytes = file_data
        .ok_or_else(|| reject(ServerError::BadRequest("No file provided".into())))?;

    log_info(
        LogStage::Server,
        format!(
            "New upload: {} ({} bytes)",
            file_name.as_deref().unwrap_or("unknown"),
            bytes.len()
        ),
    );

    let options = IngestOptions {
        delimiter: None,
        date_policy: if query.strict_dates { DatePolicy::Strict } else { DatePolicy::Lenient },
        strict_columns: query.strict_columns,
    };

    let report = ingest_bytes(&bytes, options).map_err(|e| reject(e.into()))?;
    let response = UploadResponse::from_report(report, &query.analytics_options());

    log_success(
        LogStage::Server,
        format!(
            "Upload {}: {} workouts, status {}",
            response.job_id, response.metadata.total_workouts, response.status
        ),
    );

    Ok(Json(response))
}

fn status_for(err: &ServerError) -> StatusCode {
    match err {
        ServerError::Ingest(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
        ServerError::Source(_) => StatusCode::BAD_GATEWAY,
        ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn reject(err: ServerError) -> Rejection {
    log_error(LogStage::Server, err.to_string());
    (status_for(&err), Json(error_response(&err.to_string())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{FormatError, IngestError, SourceError};

    #[test]
    fn test_status_mapping() {
        let ingest = ServerError::from(IngestError::from(FormatError::EmptyInput));
        assert_eq!(status_for(&ingest), StatusCode::UNPROCESSABLE_ENTITY);

        let missing = ServerError::from(IngestError::MissingColumn { column: "reps".into() });
        assert_eq!(status_for(&missing), StatusCode::UNPROCESSABLE_ENTITY);

        let bad = ServerError::BadRequest("No file provided".into());
        assert_eq!(status_for(&bad), StatusCode::BAD_REQUEST);

        let upstream = ServerError::from(SourceError::RequestFailed("timeout".into()));
        assert_eq!(status_for(&upstream), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn test_reject_body() {
        let (status, Json(body)) = reject(ServerError::from(IngestError::from(FormatError::MissingHeader)));
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(body["status"], "error");
        assert!(body["error"].as_str().unwrap().starts_with("Ingest error"));
    }

    #[tokio::test]
    async fn test_health() {
        let Json(body) = health().await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "ironlog");
    }

    #[test]
    fn test_router_builds() {
        let _ = router();
    }
}
