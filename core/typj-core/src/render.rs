//! Rendering backend contract (made by FontLab https://www.fontlab.com/)
//!
//! The comparator never looks inside a font. It asks a [`FontLoader`] to make a
//! family ready and draws through a [`Surface`], then reads pixels back.

use async_trait::async_trait;

use crate::error::{ReadinessError, RenderError};

/// Generic family a backend substitutes when the named font lacks a glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenericFamily {
    SansSerif,
    Serif,
}

impl GenericFamily {
    pub fn css_name(self) -> &'static str {
        match self {
            GenericFamily::SansSerif => "sans-serif",
            GenericFamily::Serif => "serif",
        }
    }
}

/// "family, generic" font selection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontSpec {
    pub family: String,
    pub fallback: GenericFamily,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, fallback: GenericFamily) -> Self {
        Self {
            family: family.into(),
            fallback,
        }
    }
}

impl std::fmt::Display for FontSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "\"{}\", {}", self.family, self.fallback.css_name())
    }
}

/// Glyph placement: `x` is the horizontal centre, `y` the top of the em box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Anchor {
    pub x: f32,
    pub y: f32,
}

impl Anchor {
    /// Top-centre of a `width`-wide surface.
    pub fn top_center(width: u32) -> Self {
        Self {
            x: width as f32 / 2.0,
            y: 0.0,
        }
    }
}

/// RGBA8 pixels read back from a surface, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

impl PixelBuffer {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Self {
        Self {
            width,
            height,
            rgba,
        }
    }

    /// Solid black pixels carrying the given coverage mask as alpha.
    pub fn from_alpha(width: u32, height: u32, alpha: &[u8]) -> Self {
        let mut rgba = Vec::with_capacity(alpha.len() * 4);
        for &a in alpha {
            rgba.extend_from_slice(&[0, 0, 0, a]);
        }
        Self::new(width, height, rgba)
    }

    pub fn alpha(&self) -> impl Iterator<Item = u8> + '_ {
        self.rgba.chunks_exact(4).map(|px| px[3])
    }
}

/// Count positions whose alpha differs by more than `delta`.
pub fn alpha_diff(a: &PixelBuffer, b: &PixelBuffer, delta: u8) -> Result<usize, RenderError> {
    if a.rgba.len() != b.rgba.len() || a.width != b.width {
        return Err(RenderError::SizeMismatch {
            left: a.rgba.len(),
            right: b.rgba.len(),
        });
    }

    Ok(a
        .alpha()
        .zip(b.alpha())
        .filter(|(x, y)| x.abs_diff(*y) > delta)
        .count())
}

/// Makes named fonts ready for drawing. Shared by reference so a whole batch
/// can be awaited at once.
#[async_trait]
pub trait FontLoader: Send + Sync {
    async fn ensure_ready(&self, family: &str, px: f32) -> Result<(), ReadinessError>;
}

/// Off-screen raster target. Exclusively borrowed while drawing.
pub trait Surface {
    fn size(&self) -> (u32, u32);

    fn clear(&mut self);

    fn set_font(&mut self, spec: &FontSpec) -> Result<(), RenderError>;

    /// Draw `ch` in solid black at `px` pixels with the active font.
    fn fill_glyph(&mut self, ch: char, px: f32, anchor: Anchor) -> Result<(), RenderError>;

    fn read_pixels(&self) -> Result<PixelBuffer, RenderError>;
}
