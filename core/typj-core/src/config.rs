//! Scan and comparator tunables (made by FontLab https://www.fontlab.com/)

use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ScanError;

/// Hiragana "a": present in every Japanese face, absent from Latin-only ones.
pub const DEFAULT_PROBE: char = '\u{3042}';

/// Largest canvas edge accepted from configuration.
pub const MAX_CANVAS_SIDE: u32 = 4096;

/// Render geometry and the thresholds calibrated against it.
///
/// The thresholds only mean something at this resolution; change the canvas
/// or glyph size and both thresholds need recalibrating.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompareConfig {
    pub probe: char,
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub glyph_px: f32,
    /// Minimum alpha difference (0-255) for a pixel to count as differing.
    pub alpha_delta: u8,
    /// Differing pixel count at which the two renders are considered distinct.
    pub diff_threshold: usize,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            probe: DEFAULT_PROBE,
            canvas_width: 30,
            canvas_height: 30,
            glyph_px: 20.0,
            alpha_delta: 50,
            diff_threshold: 20,
        }
    }
}

/// Families a backend may substitute when the candidate lacks the probe glyph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackFamilies {
    pub sans_serif: Vec<String>,
    pub serif: Vec<String>,
}

impl Default for FallbackFamilies {
    fn default() -> Self {
        let owned =
            |names: &[&str]| -> Vec<String> { names.iter().map(|n| n.to_string()).collect() };
        Self {
            sans_serif: owned(&[
                "Hiragino Sans",
                "Hiragino Kaku Gothic ProN",
                "Yu Gothic",
                "Meiryo",
                "MS Gothic",
                "Noto Sans CJK JP",
                "Noto Sans JP",
                "Source Han Sans JP",
                "IPAexGothic",
                "IPAGothic",
                "VL Gothic",
                "TakaoGothic",
            ]),
            serif: owned(&[
                "Hiragino Mincho ProN",
                "Yu Mincho",
                "MS Mincho",
                "Noto Serif CJK JP",
                "Noto Serif JP",
                "Source Han Serif JP",
                "IPAexMincho",
                "IPAMincho",
                "TakaoMincho",
            ]),
        }
    }
}

/// Everything a scan session can be tuned with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub batch_size: usize,
    /// Pause between batches; zero means a bare task yield.
    pub yield_delay_ms: u64,
    pub compare: CompareConfig,
    pub fallbacks: FallbackFamilies,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            batch_size: 50,
            yield_delay_ms: 10,
            compare: CompareConfig::default(),
            fallbacks: FallbackFamilies::default(),
        }
    }
}

impl ScanConfig {
    /// Read a JSON config file; missing keys take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let config: ScanConfig = serde_json::from_str(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn yield_delay(&self) -> Duration {
        Duration::from_millis(self.yield_delay_ms)
    }

    pub fn validate(&self) -> Result<(), ScanError> {
        if self.batch_size == 0 {
            return Err(ScanError::Config("batch_size must be at least 1".into()));
        }
        let cmp = &self.compare;
        if cmp.canvas_width == 0 || cmp.canvas_height == 0 {
            return Err(ScanError::Config("canvas must be at least 1x1".into()));
        }
        if cmp.canvas_width > MAX_CANVAS_SIDE || cmp.canvas_height > MAX_CANVAS_SIDE {
            return Err(ScanError::Config(format!(
                "canvas {}x{} exceeds {MAX_CANVAS_SIDE}x{MAX_CANVAS_SIDE}",
                cmp.canvas_width, cmp.canvas_height
            )));
        }
        if !(cmp.glyph_px.is_finite() && cmp.glyph_px > 0.0) {
            return Err(ScanError::Config(format!(
                "glyph_px must be positive, got {}",
                cmp.glyph_px
            )));
        }
        Ok(())
    }
}
