//! Error types for the detection pipeline (made by FontLab https://www.fontlab.com/)

use thiserror::Error;

/// Failures that stop a scan session from doing its job.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The candidate source could not enumerate anything; the session stays empty.
    #[error("font enumeration failed: {reason:#}")]
    Enumeration { reason: anyhow::Error },

    #[error("scan session is {state}, expected idle")]
    InvalidState { state: &'static str },

    #[error("invalid scan configuration: {0}")]
    Config(String),
}

/// A single render or readback went wrong. Always recovered as `Unsupported`.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("no font selected on the surface")]
    NoActiveFont,

    /// Neither the named family nor any fallback maps the glyph.
    #[error("no face draws {ch:?} for {family}")]
    NoCoverage { ch: char, family: String },

    #[error("glyph {ch:?} could not be rasterized with {family}")]
    Rasterize { ch: char, family: String },

    #[error("pixel buffers differ in size: {left} vs {right} bytes")]
    SizeMismatch { left: usize, right: usize },

    #[error("rendering backend failed: {0}")]
    Backend(String),
}

/// A font did not become ready. Rendering proceeds with whatever is available.
#[derive(Debug, Error)]
pub enum ReadinessError {
    #[error("no face registered for family {0:?}")]
    UnknownFamily(String),

    #[error("loading {family:?}: {source}")]
    Load {
        family: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{family:?} is not a parseable font face")]
    Unparseable { family: String },
}
