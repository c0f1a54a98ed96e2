//! Render-based verification of Japanese support (made by FontLab https://www.fontlab.com/)

use crate::config::CompareConfig;
use crate::error::RenderError;
use crate::render::{alpha_diff, Anchor, FontLoader, FontSpec, GenericFamily, PixelBuffer, Surface};
use crate::store::Verdict;

/// Draws the probe glyph twice, once with a sans-serif and once with a serif
/// fallback behind the candidate, and compares coverage.
///
/// A font that owns the glyph wins name resolution in both contexts, so the two
/// renders match. A font without it gets the host's sans and serif Japanese
/// defaults instead, which look different.
pub struct Comparator<L, S> {
    loader: L,
    surface: S,
    config: CompareConfig,
}

impl<L, S> Comparator<L, S>
where
    L: FontLoader,
    S: Surface,
{
    pub fn new(loader: L, surface: S, config: CompareConfig) -> Self {
        Self {
            loader,
            surface,
            config,
        }
    }

    pub fn loader(&self) -> &L {
        &self.loader
    }

    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    pub fn into_parts(self) -> (L, S) {
        (self.loader, self.surface)
    }

    /// Resolve one candidate. Never fails: render errors answer `Unsupported`.
    pub async fn compare(&mut self, identity: &str) -> Verdict {
        if let Err(err) = self
            .loader
            .ensure_ready(identity, self.config.glyph_px)
            .await
        {
            log::debug!("{identity}: not ready ({err}), rendering anyway");
        }

        match self.measure(identity) {
            Ok(diff) => {
                let verdict = self.verdict_for(diff);
                log::debug!("{identity}: {diff} differing pixels -> {}", verdict.as_str());
                verdict
            }
            Err(err) => {
                log::debug!("{identity}: render failed ({err}), treating as unsupported");
                Verdict::Unsupported
            }
        }
    }

    /// Differing pixel count between the sans and serif renders.
    pub fn measure(&mut self, identity: &str) -> Result<usize, RenderError> {
        let sans = self.render_with(identity, GenericFamily::SansSerif)?;
        let serif = self.render_with(identity, GenericFamily::Serif)?;
        alpha_diff(&sans, &serif, self.config.alpha_delta)
    }

    fn verdict_for(&self, diff: usize) -> Verdict {
        if diff < self.config.diff_threshold {
            Verdict::Supported
        } else {
            Verdict::Unsupported
        }
    }

    fn render_with(
        &mut self,
        identity: &str,
        fallback: GenericFamily,
    ) -> Result<PixelBuffer, RenderError> {
        let (width, _) = self.surface.size();
        self.surface.clear();
        self.surface.set_font(&FontSpec::new(identity, fallback))?;
        self.surface.fill_glyph(
            self.config.probe,
            self.config.glyph_px,
            Anchor::top_center(width),
        )?;
        self.surface.read_pixels()
    }
}
