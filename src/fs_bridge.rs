//! Local filesystem bridge
//!
//! A small companion server that lets the browser workspace list
//! directories and open files with the desktop's default application.

use crate::logging::{log_debug, log_info, log_warn};
use axum::extract::Query;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "ico"];
const CODE_EXTENSIONS: &[&str] = &[
    "js", "ts", "py", "html", "css", "json", "jsx", "tsx", "rs", "go",
];
const DOCUMENT_EXTENSIONS: &[&str] = &[
    "pdf", "doc", "docx", "txt", "md", "rtf", "xls", "xlsx", "ppt", "pptx",
];

/// Well-known user directories
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonPaths {
    pub home: PathBuf,
    pub desktop: PathBuf,
    pub documents: PathBuf,
    pub downloads: PathBuf,
}

impl CommonPaths {
    pub fn detect() -> Self {
        let home = dirs::home_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            desktop: dirs::desktop_dir().unwrap_or_else(|| home.join("Desktop")),
            documents: dirs::document_dir().unwrap_or_else(|| home.join("Documents")),
            downloads: dirs::download_dir().unwrap_or_else(|| home.join("Downloads")),
            home,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FileKind {
    Folder,
    Image,
    Code,
    Document,
    Other,
}

impl FileKind {
    pub fn classify(name: &str, is_dir: bool) -> Self {
        if is_dir {
            return FileKind::Folder;
        }
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .unwrap_or_default();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Image
        } else if CODE_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Code
        } else if DOCUMENT_EXTENSIONS.contains(&ext.as_str()) {
            FileKind::Document
        } else {
            FileKind::Other
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
    pub size: u64,
    pub modified: Option<DateTime<Utc>>,
    #[serde(rename = "type")]
    pub kind: FileKind,
}

/// Folders first, then case-insensitive name
fn listing_order(a: &FileEntry, b: &FileEntry) -> Ordering {
    b.is_directory
        .cmp(&a.is_directory)
        .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
}

/// Read one directory level
pub async fn read_dir(dir: &Path) -> std::io::Result<Vec<FileEntry>> {
    let mut reader = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();

    while let Some(entry) = reader.next_entry().await? {
        let path = entry.path();
        let name = entry.file_name().to_string_lossy().into_owned();
        // Metadata follows symlinks; a dangling link still gets listed.
        let metadata = tokio::fs::metadata(&path).await.ok();
        let is_dir = match &metadata {
            Some(m) => m.is_dir(),
            None => entry.file_type().await.map(|t| t.is_dir()).unwrap_or(false),
        };

        entries.push(FileEntry {
            kind: FileKind::classify(&name, is_dir),
            size: metadata.as_ref().map(|m| m.len()).unwrap_or(0),
            modified: metadata
                .as_ref()
                .and_then(|m| m.modified().ok())
                .map(DateTime::<Utc>::from),
            is_directory: is_dir,
            name,
            path,
        });
    }

    entries.sort_by(listing_order);
    Ok(entries)
}

#[derive(Debug, Deserialize)]
struct PathQuery {
    path: Option<String>,
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "error": message.into() }))).into_response()
}

async fn paths() -> Json<CommonPaths> {
    Json(CommonPaths::detect())
}

async fn list(Query(query): Query<PathQuery>) -> Response {
    let dir = match query.path.filter(|p| !p.trim().is_empty()) {
        Some(path) => PathBuf::from(path),
        None => CommonPaths::detect().desktop,
    };

    match read_dir(&dir).await {
        Ok(files) => {
            log_debug!(path = %dir.display(), count = files.len(), "Listed directory");
            Json(json!({ "path": dir, "files": files })).into_response()
        }
        Err(e) => {
            log_warn!(path = %dir.display(), error = %e, "Cannot read directory");
            error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Cannot read directory: {e}"),
            )
        }
    }
}

fn opener(path: &str) -> tokio::process::Command {
    if cfg!(target_os = "windows") {
        let mut cmd = tokio::process::Command::new("cmd");
        cmd.args(["/C", "start", ""]).arg(path);
        cmd
    } else if cfg!(target_os = "macos") {
        let mut cmd = tokio::process::Command::new("open");
        cmd.arg(path);
        cmd
    } else {
        let mut cmd = tokio::process::Command::new("xdg-open");
        cmd.arg(path);
        cmd
    }
}

async fn open(Query(query): Query<PathQuery>) -> Response {
    let Some(path) = query.path.filter(|p| !p.trim().is_empty()) else {
        return error_response(StatusCode::BAD_REQUEST, "Missing 'path' parameter");
    };

    match opener(&path).status().await {
        Ok(status) if status.success() => {
            log_info!(path = %path, "Opened file");
            Json(json!({ "success": true })).into_response()
        }
        Ok(status) => error_response(
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Opener exited with {status}"),
        ),
        Err(e) => error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

async fn status() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "paths": CommonPaths::detect(),
    }))
}

async fn not_found() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

pub fn router() -> Router {
    Router::new()
        .route("/paths", get(paths))
        .route("/list", get(list))
        .route("/open", get(open))
        .route("/status", get(status))
        .fallback(not_found)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
}

/// Run the filesystem bridge until Ctrl-C
pub async fn serve(addr: &str) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let paths = CommonPaths::detect();
    log_info!(
        address = %addr,
        desktop = %paths.desktop.display(),
        documents = %paths.documents.display(),
        downloads = %paths.downloads.display(),
        "Filesystem bridge listening"
    );

    axum::serve(listener, router())
        .with_graceful_shutdown(crate::server::shutdown_signal())
        .await?;
    Ok(())
}
