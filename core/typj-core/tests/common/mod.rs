//! Scripted rendering backend for exercising the pipeline without host fonts.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use typj_core::compare::Comparator;
use typj_core::config::CompareConfig;
use typj_core::error::{ReadinessError, RenderError};
use typj_core::render::{Anchor, FontLoader, FontSpec, GenericFamily, PixelBuffer, Surface};

pub const SIDE: u32 = 10;

/// How a scripted family behaves when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyphs {
    /// Same shape under both fallbacks.
    Owns,
    /// Host sans and serif substitutes diverge.
    Lacks,
    /// Readback blows up.
    Broken,
}

#[derive(Debug, Default)]
pub struct CallLog {
    pub readiness: Vec<String>,
    pub rendered: Vec<String>,
}

#[derive(Clone, Default)]
pub struct ScriptedLoader {
    pub log: Arc<Mutex<CallLog>>,
    pub unready: Arc<HashSet<String>>,
}

#[async_trait]
impl FontLoader for ScriptedLoader {
    async fn ensure_ready(&self, family: &str, _px: f32) -> Result<(), ReadinessError> {
        self.log.lock().readiness.push(family.to_string());
        if self.unready.contains(family) {
            return Err(ReadinessError::UnknownFamily(family.to_string()));
        }
        Ok(())
    }
}

pub struct ScriptedSurface {
    pub log: Arc<Mutex<CallLog>>,
    glyphs: HashMap<String, Glyphs>,
    active: Option<FontSpec>,
    pixels: Vec<u8>,
    broken_read: bool,
}

impl Surface for ScriptedSurface {
    fn size(&self) -> (u32, u32) {
        (SIDE, SIDE)
    }

    fn clear(&mut self) {
        self.pixels = vec![0; (SIDE * SIDE) as usize];
        self.broken_read = false;
    }

    fn set_font(&mut self, spec: &FontSpec) -> Result<(), RenderError> {
        self.active = Some(spec.clone());
        Ok(())
    }

    fn fill_glyph(&mut self, _ch: char, _px: f32, _anchor: Anchor) -> Result<(), RenderError> {
        let spec = self.active.clone().ok_or(RenderError::NoActiveFont)?;
        if spec.fallback == GenericFamily::SansSerif {
            self.log.lock().rendered.push(spec.family.clone());
        }

        let behaviour = self.glyphs.get(&spec.family).copied().unwrap_or(Glyphs::Lacks);
        self.pixels = match (behaviour, spec.fallback) {
            (Glyphs::Owns, _) => block_mask(0, 5),
            (Glyphs::Lacks, GenericFamily::SansSerif) => block_mask(0, 5),
            (Glyphs::Lacks, GenericFamily::Serif) => block_mask(5, 10),
            (Glyphs::Broken, _) => {
                self.broken_read = true;
                block_mask(0, 5)
            }
        };
        Ok(())
    }

    fn read_pixels(&self) -> Result<PixelBuffer, RenderError> {
        if self.broken_read {
            return Err(RenderError::Backend("surface lost".into()));
        }
        Ok(PixelBuffer::from_alpha(SIDE, SIDE, &self.pixels))
    }
}

/// Rows `from..to` fully inked.
fn block_mask(from: u32, to: u32) -> Vec<u8> {
    (0..SIDE * SIDE)
        .map(|i| if (from..to).contains(&(i / SIDE)) { 255 } else { 0 })
        .collect()
}

pub type ScriptedComparator = Comparator<ScriptedLoader, ScriptedSurface>;

/// Comparator whose fonts behave as scripted; unlisted families lack the glyph.
pub fn scripted(glyphs: &[(&str, Glyphs)]) -> (ScriptedComparator, Arc<Mutex<CallLog>>) {
    scripted_with_unready(glyphs, &[])
}

pub fn scripted_with_unready(
    glyphs: &[(&str, Glyphs)],
    unready: &[&str],
) -> (ScriptedComparator, Arc<Mutex<CallLog>>) {
    let log = Arc::new(Mutex::new(CallLog::default()));
    let loader = ScriptedLoader {
        log: Arc::clone(&log),
        unready: Arc::new(unready.iter().map(|s| s.to_string()).collect()),
    };
    let surface = ScriptedSurface {
        log: Arc::clone(&log),
        glyphs: glyphs
            .iter()
            .map(|(name, g)| (name.to_string(), *g))
            .collect(),
        active: None,
        pixels: vec![0; (SIDE * SIDE) as usize],
        broken_read: false,
    };
    let config = CompareConfig {
        canvas_width: SIDE,
        canvas_height: SIDE,
        ..CompareConfig::default()
    };
    (Comparator::new(loader, surface, config), log)
}
