//! # HTTP shell for the document generator
//!
//! Accepts a zip bundle (spreadsheet + `img/` tree) via multipart
//! upload and responds with a zip of the rendered documents.
//!
//! ## Usage
//!
//! ```bash
//! etiketka serve --listen 0.0.0.0:8080
//! ```
//!
//! Each request gets its own temporary work directory and its own
//! engine instance; nothing is shared between requests.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::fs;
use std::sync::Arc;
use uuid::Uuid;

use crate::{
    archive,
    batch::BatchRunner,
    config::Config,
    error::EtiketkaError,
    observer::ConsoleObserver,
};

/// Uploaded bundles are capped at 64 MiB.
const MAX_UPLOAD_BYTES: usize = 64 * 1024 * 1024;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to listen on (e.g., "0.0.0.0:8080")
    pub listen_addr: String,
    /// Render PNG previews next to the PDFs
    pub raster_previews: bool,
}

/// Start the HTTP server.
pub async fn serve(config: ServerConfig) -> Result<(), EtiketkaError> {
    let app_state = Arc::new(config.clone());

    let app = Router::new()
        .route("/health", get(health_handler))
        .route("/process", post(process_handler))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .with_state(app_state);

    println!("etiketka server listening on {}", config.listen_addr);

    let listener = tokio::net::TcpListener::bind(&config.listen_addr)
        .await
        .map_err(|e| {
            EtiketkaError::Transport(format!("failed to bind {}: {e}", config.listen_addr))
        })?;

    axum::serve(listener, app)
        .await
        .map_err(|e| EtiketkaError::Transport(format!("server error: {e}")))?;

    Ok(())
}

async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// JSON body for failed requests.
#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// Handle POST /process - run one batch over the uploaded bundle.
async fn process_handler(
    State(config): State<Arc<ServerConfig>>,
    mut multipart: Multipart,
) -> Response {
    // First uploaded file wins, whatever the field is called.
    let upload = loop {
        match multipart.next_field().await {
            Ok(Some(field)) => {
                if field.file_name().is_some() || field.name() == Some("archive") {
                    match field.bytes().await {
                        Ok(bytes) => break bytes,
                        Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
                    }
                }
            }
            Ok(None) => {
                return error_response(StatusCode::BAD_REQUEST, "no archive in upload");
            }
            Err(e) => return error_response(StatusCode::BAD_REQUEST, &e.to_string()),
        }
    };

    if upload.is_empty() {
        return error_response(StatusCode::BAD_REQUEST, "empty archive");
    }

    let previews = config.raster_previews;
    let result =
        tokio::task::spawn_blocking(move || process_bundle(&upload, previews)).await;

    match result {
        Ok(Ok(zip_bytes)) => (
            [
                (header::CONTENT_TYPE, "application/zip"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"result.zip\"",
                ),
            ],
            zip_bytes,
        )
            .into_response(),
        Ok(Err(e)) => error_response(StatusCode::UNPROCESSABLE_ENTITY, &e.to_string()),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, &format!("task error: {e}")),
    }
}

/// Run one batch in an isolated work directory and return the packed
/// result bytes.
fn process_bundle(upload: &[u8], raster_previews: bool) -> Result<Vec<u8>, EtiketkaError> {
    let work = tempfile::Builder::new()
        .prefix(&format!("etiketka-{}", Uuid::new_v4()))
        .tempdir()?;

    let bundle_path = work.path().join("bundle.zip");
    fs::write(&bundle_path, upload)?;

    let input_dir = work.path().join("input");
    fs::create_dir_all(&input_dir)?;
    archive::unpack(&bundle_path, &input_dir)?;

    let spreadsheet = archive::find_spreadsheet(&input_dir)
        .ok_or_else(|| EtiketkaError::Archive("no spreadsheet in archive".to_string()))?;
    let base_dir = archive::find_image_base(&input_dir).unwrap_or_else(|| input_dir.clone());
    let output_dir = work.path().join("output");

    let mut config = Config::new(base_dir, output_dir.clone());
    config.raster_previews = raster_previews;

    let observer = ConsoleObserver;
    let runner = BatchRunner::new(config, &observer);
    let summary = runner.process(&spreadsheet)?;
    if !summary.succeeded() {
        return Err(EtiketkaError::Spreadsheet(
            "no documents were produced".to_string(),
        ));
    }

    let result_path = work.path().join("result.zip");
    archive::pack(&output_dir, &result_path)?;
    Ok(fs::read(&result_path)?)
}

fn error_response(status: StatusCode, message: &str) -> Response {
    (
        status,
        Json(ErrorBody {
            error: message.to_string(),
        }),
    )
        .into_response()
}
