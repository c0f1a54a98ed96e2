//! Runs the real fontdb + swash backend against the fixture fonts in
//! `tests/fonts` and `tests/collection` (rebuilt by `tests/fonts/build_fixtures.py`).
//!
//! Fixture glyphs are rectangles on a 1000-unit em with an 880 ascent:
//! - "Typj Fixture Sans": U+3042 spans x 100..450, y 0..800; "A" spans 300..700, 0..600
//! - "Typj Fixture Serif": U+3042 spans x 550..900, y 0..800; same "A"
//! - "Typj Fixture Latin": "A" only

#![cfg(feature = "swash-backend")]

use std::path::PathBuf;

use typj_core::backend::{host_comparator, FontLibrary, LibraryOptions, SwashSurface};
use typj_core::candidate::{CandidateSource, StaticSource};
use typj_core::config::{FallbackFamilies, ScanConfig, DEFAULT_PROBE};
use typj_core::error::RenderError;
use typj_core::render::{
    alpha_diff, Anchor, FontLoader, FontSpec, GenericFamily, PixelBuffer, Surface,
};
use typj_core::scan::{ScanSession, ScanState};
use typj_core::store::Verdict;

const SANS: &str = "Typj Fixture Sans";
const SERIF: &str = "Typj Fixture Serif";
const LATIN: &str = "Typj Fixture Latin";

fn fixture_root(dir: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests").join(dir)
}

fn fixture_library() -> FontLibrary {
    FontLibrary::load(&LibraryOptions {
        roots: vec![fixture_root("fonts")],
        ..LibraryOptions::default()
    })
    .expect("load fixture fonts")
}

/// Fixture faces stand in for the host's Japanese sans and serif defaults.
fn fixture_config() -> ScanConfig {
    ScanConfig {
        batch_size: 2,
        yield_delay_ms: 0,
        fallbacks: FallbackFamilies {
            sans_serif: vec![SANS.to_string()],
            serif: vec![SERIF.to_string()],
        },
        ..ScanConfig::default()
    }
}

/// Config whose fallback families are not installed.
fn no_fallback_config() -> ScanConfig {
    ScanConfig {
        fallbacks: FallbackFamilies {
            sans_serif: vec!["Absent Gothic".to_string()],
            serif: vec!["Absent Mincho".to_string()],
        },
        ..fixture_config()
    }
}

fn render(
    surface: &mut SwashSurface,
    family: &str,
    fallback: GenericFamily,
    ch: char,
) -> PixelBuffer {
    surface.clear();
    surface
        .set_font(&FontSpec::new(family, fallback))
        .expect("set font");
    surface
        .fill_glyph(ch, 20.0, Anchor::top_center(30))
        .expect("fill glyph");
    surface.read_pixels().expect("read pixels")
}

fn alpha_at(pixels: &PixelBuffer, x: u32, y: u32) -> u8 {
    pixels.rgba[((y * pixels.width + x) * 4 + 3) as usize]
}

/// Inclusive (left, top, right, bottom) of pixels with any coverage.
fn ink_bounds(pixels: &PixelBuffer) -> Option<(u32, u32, u32, u32)> {
    let mut bounds: Option<(u32, u32, u32, u32)> = None;
    for y in 0..pixels.height {
        for x in 0..pixels.width {
            if alpha_at(pixels, x, y) == 0 {
                continue;
            }
            bounds = Some(match bounds {
                None => (x, y, x, y),
                Some((l, t, r, b)) => (l.min(x), t.min(y), r.max(x), b.max(y)),
            });
        }
    }
    bounds
}

#[test]
fn fixture_fonts_enumerate_with_family_names() {
    let library = fixture_library();

    let mut names: Vec<String> = library
        .enumerate()
        .expect("enumerate")
        .into_iter()
        .map(|c| c.identity)
        .collect();
    names.sort();

    assert_eq!(names, vec![LATIN, SANS, SERIF]);
}

#[tokio::test]
async fn glyph_is_drawn_top_centred() {
    let library = fixture_library();
    library.ensure_ready(LATIN, 20.0).await.expect("ready");
    let mut surface = SwashSurface::new(library, FallbackFamilies::default(), 30, 30);

    let pixels = render(&mut surface, LATIN, GenericFamily::SansSerif, 'A');

    // "A" is 8 px wide and 12 px tall; baseline sits at the 17.6 px ascent.
    let (left, top, right, bottom) = ink_bounds(&pixels).expect("glyph has ink");
    let right_margin = pixels.width - 1 - right;
    assert!(
        left.abs_diff(right_margin) <= 1,
        "left {left}, right margin {right_margin}"
    );
    assert!((5..=7).contains(&top), "top row {top}");
    assert!((16..=18).contains(&bottom), "bottom row {bottom}");
    assert_eq!(alpha_at(&pixels, 15, 12), 255);
    assert_eq!(alpha_at(&pixels, 15, 1), 0);
}

#[tokio::test]
async fn repeated_fills_composite_by_maximum() {
    let library = fixture_library();
    library.ensure_ready(SANS, 20.0).await.expect("ready");
    let mut surface = SwashSurface::new(library, FallbackFamilies::default(), 30, 30);

    let once = render(&mut surface, SANS, GenericFamily::SansSerif, DEFAULT_PROBE);
    surface
        .fill_glyph(DEFAULT_PROBE, 20.0, Anchor::top_center(30))
        .expect("second fill");
    let twice = surface.read_pixels().expect("read pixels");

    assert_eq!(once, twice);
    assert!(once.alpha().any(|a| a == 255));
}

#[test]
fn sans_and_serif_fallbacks_diverge_at_default_geometry() {
    let library = fixture_library();
    let config = fixture_config();
    let cmp = &config.compare;
    let mut surface = SwashSurface::new(
        library,
        config.fallbacks.clone(),
        cmp.canvas_width,
        cmp.canvas_height,
    );

    let missing = "Not Installed";
    let sans = render(&mut surface, missing, GenericFamily::SansSerif, cmp.probe);
    let serif = render(&mut surface, missing, GenericFamily::Serif, cmp.probe);

    let diff = alpha_diff(&sans, &serif, cmp.alpha_delta).expect("same size");
    assert!(diff >= cmp.diff_threshold, "diff {diff}");
}

#[tokio::test]
async fn fixture_faces_get_expected_verdicts() {
    let library = fixture_library();
    let mut comparator = host_comparator(&library, &fixture_config());

    assert_eq!(comparator.compare(SANS).await, Verdict::Supported);
    assert_eq!(comparator.compare(SERIF).await, Verdict::Supported);
    assert_eq!(comparator.compare(LATIN).await, Verdict::Unsupported);
    assert_eq!(
        comparator.compare("Not Installed Font").await,
        Verdict::Unsupported
    );
}

#[tokio::test]
async fn uncovered_probe_fails_closed_without_fallbacks() {
    let library = fixture_library();
    let config = no_fallback_config();
    let mut comparator = host_comparator(&library, &config);

    assert_eq!(comparator.compare(LATIN).await, Verdict::Unsupported);
    assert_eq!(
        comparator.compare("Not Installed Font").await,
        Verdict::Unsupported
    );
    // a face that owns the glyph needs no fallback
    assert_eq!(comparator.compare(SANS).await, Verdict::Supported);

    let err = comparator.measure("Not Installed Font").unwrap_err();
    assert!(matches!(err, RenderError::NoCoverage { .. }), "{err}");
}

#[tokio::test]
async fn fixture_scan_resolves_every_font() {
    let library = fixture_library();
    let config = fixture_config();
    let mut session = ScanSession::new(config.clone()).expect("session");
    session.ingest(&library).expect("ingest");
    let mut comparator = host_comparator(&library, &config);

    let summary = session
        .start_scan(&mut comparator, |_| {}, |_| {})
        .await
        .expect("scan");

    let store = session.store();
    assert_eq!(summary.outcome, ScanState::Complete);
    assert_eq!(summary.total, 3);
    assert_eq!(store.get(SANS), Some(Verdict::Supported));
    assert_eq!(store.get(SERIF), Some(Verdict::Supported));
    assert_eq!(store.get(LATIN), Some(Verdict::Unsupported));
}

#[tokio::test]
async fn named_candidates_missing_from_the_library_are_unsupported() {
    let library = fixture_library();
    let config = fixture_config();
    let mut session = ScanSession::new(config.clone()).expect("session");
    session
        .ingest(&StaticSource::from_names(["Missing Face", SANS]))
        .expect("ingest");
    let mut comparator = host_comparator(&library, &config);

    session
        .start_scan(&mut comparator, |_| {}, |_| {})
        .await
        .expect("scan");

    assert_eq!(session.store().get("Missing Face"), Some(Verdict::Unsupported));
    assert_eq!(session.store().get(SANS), Some(Verdict::Supported));
}

#[tokio::test]
async fn collection_faces_load_by_index() {
    let library = FontLibrary::load(&LibraryOptions {
        roots: vec![fixture_root("collection")],
        ..LibraryOptions::default()
    })
    .expect("load collection");
    assert_eq!(library.face_count(), 2);

    library
        .ensure_ready("Typj Pair Serif", 20.0)
        .await
        .expect("second face loads");
    library
        .ensure_ready("Typj Pair Latin", 20.0)
        .await
        .expect("first face loads");

    let serif = library.ready_face("Typj Pair Serif").expect("cached");
    let latin = library.ready_face("Typj Pair Latin").expect("cached");
    assert_ne!(serif.glyph_for(DEFAULT_PROBE), 0);
    assert_eq!(latin.glyph_for(DEFAULT_PROBE), 0);
    assert_ne!(latin.glyph_for('A'), 0);
}

#[tokio::test]
async fn ready_faces_are_cached() {
    let library = fixture_library();

    library
        .ensure_ready(SERIF, 20.0)
        .await
        .expect("fixture font loads");
    let first = library.ready_face(SERIF).expect("cached");
    library.ensure_ready(SERIF, 20.0).await.expect("still ready");
    let second = library.ready_face(SERIF).expect("cached");

    assert!(std::sync::Arc::ptr_eq(&first, &second));
}
