//! Alpha canvas rasterized with swash.

use std::collections::HashMap;
use std::sync::Arc;

use swash::scale::image::Content;
use swash::scale::{Render, ScaleContext, Source};
use swash::zeno::Format;

use super::library::{FontLibrary, LoadedFace};
use crate::config::FallbackFamilies;
use crate::error::RenderError;
use crate::render::{Anchor, FontSpec, GenericFamily, PixelBuffer, Surface};

/// Off-screen surface that resolves glyphs the way a text stack does: the
/// named family if it maps the character, otherwise the first fallback face
/// of the requested generic family that does. When neither maps it, drawing
/// fails instead of leaving a blank or `.notdef` canvas.
pub struct SwashSurface {
    library: FontLibrary,
    fallbacks: FallbackFamilies,
    context: ScaleContext,
    width: u32,
    height: u32,
    coverage: Vec<u8>,
    active: Option<FontSpec>,
    resolved_fallbacks: HashMap<(GenericFamily, char), Option<(Arc<LoadedFace>, u16)>>,
}

impl SwashSurface {
    pub fn new(library: FontLibrary, fallbacks: FallbackFamilies, width: u32, height: u32) -> Self {
        Self {
            library,
            fallbacks,
            context: ScaleContext::new(),
            width,
            height,
            coverage: vec![0; width as usize * height as usize],
            active: None,
            resolved_fallbacks: HashMap::new(),
        }
    }

    /// Families tried, in order, when the named family cannot draw a glyph.
    pub fn fallback_chain(&self, generic: GenericFamily) -> Vec<String> {
        let configured = match generic {
            GenericFamily::SansSerif => &self.fallbacks.sans_serif,
            GenericFamily::Serif => &self.fallbacks.serif,
        };
        let mut chain = configured.clone();
        let host_default = self.library.generic_family_name(generic);
        if !chain.contains(&host_default) {
            chain.push(host_default);
        }
        chain
    }

    /// Whether some fallback face of `generic` can draw `ch`.
    pub fn has_fallback_for(&mut self, generic: GenericFamily, ch: char) -> bool {
        self.fallback_face(generic, ch).is_some()
    }

    fn fallback_face(
        &mut self,
        generic: GenericFamily,
        ch: char,
    ) -> Option<(Arc<LoadedFace>, u16)> {
        if let Some(resolved) = self.resolved_fallbacks.get(&(generic, ch)) {
            return resolved.clone();
        }

        let resolved = self.fallback_chain(generic).iter().find_map(|family| {
            let face = self.library.load_now(family)?;
            let glyph = face.glyph_for(ch);
            (glyph != 0).then_some((face, glyph))
        });
        if let Some((face, _)) = &resolved {
            log::debug!("{} fallback for {ch:?} is {}", generic.css_name(), face.family());
        }
        self.resolved_fallbacks.insert((generic, ch), resolved.clone());
        resolved
    }

    fn resolve(
        &mut self,
        spec: &FontSpec,
        ch: char,
    ) -> Result<(Arc<LoadedFace>, u16), RenderError> {
        if let Some(face) = self.library.ready_face(&spec.family) {
            let glyph = face.glyph_for(ch);
            if glyph != 0 {
                return Ok((face, glyph));
            }
        }

        self.fallback_face(spec.fallback, ch)
            .ok_or_else(|| RenderError::NoCoverage {
                ch,
                family: spec.to_string(),
            })
    }
}

impl Surface for SwashSurface {
    fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn clear(&mut self) {
        self.coverage.iter_mut().for_each(|a| *a = 0);
    }

    fn set_font(&mut self, spec: &FontSpec) -> Result<(), RenderError> {
        self.active = Some(spec.clone());
        Ok(())
    }

    fn fill_glyph(&mut self, ch: char, px: f32, anchor: Anchor) -> Result<(), RenderError> {
        let spec = self.active.clone().ok_or(RenderError::NoActiveFont)?;
        let (face, glyph) = self.resolve(&spec, ch)?;

        let font = face.font_ref();
        let ascent = font.metrics(&[]).scale(px).ascent;
        let advance = font.glyph_metrics(&[]).scale(px).advance_width(glyph);

        let mut scaler = self.context.builder(font).size(px).hint(false).build();
        let image = Render::new(&[Source::Outline])
            .format(Format::Alpha)
            .render(&mut scaler, glyph)
            .ok_or_else(|| RenderError::Rasterize {
                ch,
                family: face.family().to_string(),
            })?;

        let bytes_per_pixel = match image.content {
            Content::Mask => 1,
            Content::SubpixelMask | Content::Color => 4,
        };

        let origin_x = (anchor.x - advance / 2.0).round() as i32;
        let baseline = (anchor.y + ascent).round() as i32;
        let placement = image.placement;

        for row in 0..placement.height as i32 {
            let y = baseline - placement.top + row;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for col in 0..placement.width as i32 {
                let x = origin_x + placement.left + col;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let src = (row as usize * placement.width as usize + col as usize)
                    * bytes_per_pixel
                    + (bytes_per_pixel - 1);
                let dst = y as usize * self.width as usize + x as usize;
                let alpha = image.data.get(src).copied().unwrap_or(0);
                self.coverage[dst] = self.coverage[dst].max(alpha);
            }
        }

        Ok(())
    }

    fn read_pixels(&self) -> Result<PixelBuffer, RenderError> {
        Ok(PixelBuffer::from_alpha(self.width, self.height, &self.coverage))
    }
}
