//! HTTP server for typj (made by FontLab https://www.fontlab.com/)
//!
//! `POST /scan` runs one complete detection per request on a blocking task,
//! so the render loop never sits on the request executor.

use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task;
use typj_core::backend::LibraryOptions;
use typj_core::candidate::Candidate;
use typj_core::config::ScanConfig;
use typj_core::output::filter_verdict;
use typj_core::scan::ScanSummary;
use typj_core::store::{ScanEntry, Verdict};

use crate::{compile_patterns, detect, library_options, DetectRequest};

/// Parameters for one scan.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct ScanRequest {
    /// Font directories to load
    pub paths: Vec<PathBuf>,
    /// Include the platform's installed fonts
    pub system_fonts: bool,
    /// Follow symbolic links while walking paths
    pub follow_symlinks: bool,
    /// Scan these family names instead of every face in the library
    pub names: Option<Vec<String>>,
    /// Regex patterns candidate identities must match
    pub name_patterns: Vec<String>,
    /// Candidates verified per batch
    pub batch_size: Option<usize>,
    /// Only return fonts that render Japanese
    pub supported_only: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ScanResponse {
    pub entries: Vec<ScanEntry>,
    pub summary: ScanSummary,
}

/// Bind and serve until the process is stopped.
pub async fn serve(bind: &str) -> Result<()> {
    let listener = TcpListener::bind(bind)
        .await
        .with_context(|| format!("binding HTTP server to {bind}"))?;
    log::info!("listening on {bind}");

    axum::serve(listener, router())
        .await
        .context("serving HTTP")?;
    Ok(())
}

pub fn router() -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/scan", post(scan_handler))
}

async fn scan_handler(
    Json(req): Json<ScanRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    if req.paths.is_empty() && !req.system_fonts {
        return Err((
            StatusCode::BAD_REQUEST,
            "at least one font path or system_fonts is required".to_string(),
        ));
    }

    if matches!(req.batch_size, Some(0)) {
        return Err((
            StatusCode::BAD_REQUEST,
            "batch_size must be at least 1 when provided".to_string(),
        ));
    }

    let mut config = ScanConfig::default();
    if let Some(batch_size) = req.batch_size {
        config.batch_size = batch_size;
    }
    // requests should not idle between batches
    config.yield_delay_ms = 0;

    let detect_request = DetectRequest {
        library: build_library_options(&req).map_err(to_bad_request)?,
        names: req
            .names
            .as_ref()
            .map(|names| names.iter().map(Candidate::named).collect()),
        name_patterns: compile_patterns(&req.name_patterns).map_err(to_bad_request)?,
        config,
    };

    let detection = task::spawn_blocking(move || detect(&detect_request, |_| {}))
        .await
        .map_err(|e| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("task join error: {e}"),
            )
        })?
        .map_err(to_bad_request)?;

    let entries = if req.supported_only {
        filter_verdict(detection.entries, Verdict::Supported)
    } else {
        detection.entries
    };

    Ok(Json(ScanResponse {
        entries,
        summary: detection.summary,
    }))
}

fn build_library_options(req: &ScanRequest) -> Result<LibraryOptions> {
    library_options(&req.paths, req.system_fonts, req.follow_symlinks)
}

fn to_bad_request(err: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("{err:#}"))
}
