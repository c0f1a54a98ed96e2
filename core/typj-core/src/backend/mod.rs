//! Concrete rendering backend: fontdb for the font library, swash for pixels
//! (made by FontLab https://www.fontlab.com/)

mod library;
mod surface;

pub use library::{FontLibrary, LibraryOptions, LoadedFace};
pub use surface::SwashSurface;

use crate::compare::Comparator;
use crate::config::ScanConfig;
use crate::render::GenericFamily;

/// Comparator wired to a host font library.
pub type HostComparator = Comparator<FontLibrary, SwashSurface>;

/// Build a comparator over `library` sized and tuned by `config`.
///
/// Warns when a generic family has no face for the probe glyph: candidates
/// lacking the glyph then fail to render and read as unsupported.
pub fn host_comparator(library: &FontLibrary, config: &ScanConfig) -> HostComparator {
    let cmp = &config.compare;
    let mut surface = SwashSurface::new(
        library.clone(),
        config.fallbacks.clone(),
        cmp.canvas_width,
        cmp.canvas_height,
    );

    for generic in [GenericFamily::SansSerif, GenericFamily::Serif] {
        if !surface.has_fallback_for(generic, cmp.probe) {
            log::warn!(
                "no {} fallback face draws {:?}; fonts without it will all read unsupported",
                generic.css_name(),
                cmp.probe
            );
        }
    }

    Comparator::new(library.clone(), surface, cmp.clone())
}
