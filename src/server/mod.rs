//! Endpoint service: the link store and blob publish endpoints on top of the
//! local filesystem, plus the rendered gallery page.
//!
//! | Route | Methods | Purpose |
//! |---|---|---|
//! | `/api/links` | GET, POST, OPTIONS | whole-collection load / replace |
//! | `/api/upload` | POST, OPTIONS | store a base64 blob, return its URL |
//! | `/blobs/{key}` | GET | serve a stored blob |
//! | `/` | GET | gallery page, `?category=` filters |
//!
//! Every response carries permissive CORS headers. Other methods on the API
//! routes answer 405 with `{"error": "Method not allowed"}`.

mod routes;
pub mod storage;

use actix_web::dev::Server;
use actix_web::error::{InternalError, JsonPayloadError};
use actix_web::http::StatusCode;
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpRequest, HttpResponse, HttpServer, ResponseError, web};
use serde_json::json;
use std::net::{SocketAddr, TcpListener};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub use routes::configure;
use storage::{FileBlobStore, FileLinkRepository};

use crate::config::AppConfig;
use crate::html::PageSettings;
use crate::render::RenderOptions;

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ResponseError for ServerError {
    fn status_code(&self) -> StatusCode {
        StatusCode::INTERNAL_SERVER_ERROR
    }

    fn error_response(&self) -> HttpResponse {
        tracing::error!(error = %self, "request failed");
        HttpResponse::InternalServerError().json(json!({ "error": self.to_string() }))
    }
}

/// Shared state handed to every handler.
pub struct AppData {
    pub links: FileLinkRepository,
    pub blobs: FileBlobStore,
    pub seed_file: Option<PathBuf>,
    pub page: PageSettings,
    pub render: RenderOptions,
}

impl AppData {
    pub fn new(config: &AppConfig, public_url: &str) -> Self {
        let data_dir = Path::new(&config.server.data_dir);
        Self {
            links: FileLinkRepository::new(data_dir),
            blobs: FileBlobStore::new(data_dir, public_url),
            seed_file: config.server.seed_file.as_ref().map(PathBuf::from),
            page: PageSettings::from_config(config),
            render: RenderOptions::from_config(&config.gallery),
        }
    }
}

/// CORS headers attached to every response.
pub fn cors_headers() -> DefaultHeaders {
    DefaultHeaders::new()
        .add(("Access-Control-Allow-Origin", "*"))
        .add(("Access-Control-Allow-Methods", "GET, POST, OPTIONS"))
        .add(("Access-Control-Allow-Headers", "Content-Type"))
}

/// JSON extractor settings: size ceiling, and `{error}` bodies on rejection.
pub fn json_config(limit: usize) -> web::JsonConfig {
    web::JsonConfig::default()
        .limit(limit)
        .error_handler(json_error)
}

fn json_error(err: JsonPayloadError, _req: &HttpRequest) -> actix_web::Error {
    let status = match &err {
        JsonPayloadError::Overflow { .. } | JsonPayloadError::OverflowKnownLength { .. } => {
            StatusCode::PAYLOAD_TOO_LARGE
        }
        _ => StatusCode::BAD_REQUEST,
    };
    let response = HttpResponse::build(status).json(json!({ "error": err.to_string() }));
    InternalError::from_response(err, response).into()
}

/// A bound, not yet running server.
pub struct BoundServer {
    pub server: Server,
    pub addr: SocketAddr,
    pub public_url: String,
}

/// Bind the configured address and build the server.
///
/// The returned [`Server`] does nothing until awaited or spawned.
pub fn bind(config: &AppConfig) -> Result<BoundServer, ServerError> {
    let listener = TcpListener::bind(&config.server.bind)?;
    let addr = listener.local_addr()?;
    let public_url = if config.server.public_url.is_empty() {
        format!("http://{addr}")
    } else {
        config.server.public_url.trim_end_matches('/').to_string()
    };

    let data = web::Data::new(AppData::new(config, &public_url));
    let limit = config.server.max_upload_bytes;
    let server = HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .app_data(json_config(limit))
            .wrap(cors_headers())
            .wrap(Logger::default())
            .configure(configure)
    })
    .listen(listener)?
    .run();

    tracing::info!(%addr, data_dir = %config.server.data_dir, "listening");
    Ok(BoundServer {
        server,
        addr,
        public_url,
    })
}

/// Bind and serve until shutdown.
pub async fn run(config: &AppConfig) -> Result<(), ServerError> {
    let bound = bind(config)?;
    bound.server.await?;
    Ok(())
}
