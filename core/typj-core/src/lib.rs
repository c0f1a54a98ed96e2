/// typj-core: The patient proofreader of Japanese fonts
///
/// Some fonts announce their talents in their names. Others keep quiet and
/// have to be asked to write something. This library does both: it listens
/// for the names that give a font away, and for the shy ones it draws a
/// single hiragana and watches what comes out.
///
/// ## Two Passes Over Every Collection
///
/// **Listening**: A name-based triage that costs nothing
/// - Recognises the usual suspects (Gothic, Mincho, Hiragino, Meiryo, ...)
/// - Only ever says "yes" or "not sure", never "no"
///
/// **Watching**: Drawing the glyph and comparing the ink
/// - Renders `あ` twice, once with a sans-serif safety net, once with serif
/// - A font that really owns the glyph draws the same shape both times
/// - A font that doesn't gets replaced by two different host fonts
/// - Works through the collection in small batches, stepping aside between
///   them so nobody waits on the whole run
///
/// ## A Sample Conversation
///
/// ```rust,no_run
/// use typj_core::backend::{host_comparator, FontLibrary, LibraryOptions};
/// use typj_core::config::ScanConfig;
/// use typj_core::scan::ScanSession;
///
/// # async fn run() -> anyhow::Result<()> {
/// let config = ScanConfig::default();
/// let library = FontLibrary::load(&LibraryOptions {
///     system_fonts: true,
///     ..LibraryOptions::default()
/// })?;
///
/// let mut session = ScanSession::new(config.clone())?;
/// session.ingest(&library)?;
///
/// let mut comparator = host_comparator(&library, &config);
/// session
///     .start_scan(
///         &mut comparator,
///         |progress| println!("{}/{}", progress.processed, progress.total),
///         |summary| println!("{} fonts write Japanese", summary.supported),
///     )
///     .await?;
///
/// for entry in session.store().entries() {
///     println!("{}: {}", entry.display_label, entry.verdict.as_str());
/// }
/// # Ok(())
/// # }
/// ```
///
/// ## The Cast of Characters
///
/// - [`scan::ScanSession`]: Owns one run from ingestion to the last batch
/// - [`store::ResultStore`]: The ledger everyone may peek at, mid-scan included
/// - [`compare::Comparator`]: The careful eye behind the two renders
/// - [`render::Surface`] / [`render::FontLoader`]: What a rendering backend provides
/// - [`backend::FontLibrary`]: Host fonts, courtesy of fontdb and swash
///
/// ---
///
/// Crafted with care at FontLab https://www.fontlab.com/

#[cfg(feature = "swash-backend")]
pub mod backend;
pub mod candidate;
pub mod classify;
pub mod compare;
pub mod config;
pub mod error;
pub mod output;
pub mod render;
pub mod scan;
pub mod store;
