//! fontdb-backed font library: candidate enumeration and font readiness.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use fontdb::{Database, Family, FaceInfo, Language, Query, Source, ID};
use parking_lot::Mutex;
use swash::{CacheKey, FontRef};
use walkdir::WalkDir;

use crate::candidate::{Candidate, CandidateSource};
use crate::error::ReadinessError;
use crate::render::{FontLoader, GenericFamily};

/// Parsed face data kept alive for rasterization.
///
/// Owns the bytes and rebuilds a borrowed [`FontRef`] on demand.
pub struct LoadedFace {
    family: String,
    data: Arc<Vec<u8>>,
    offset: u32,
    key: CacheKey,
}

impl LoadedFace {
    pub fn parse(family: &str, data: Vec<u8>, index: u32) -> Option<Self> {
        let (offset, key) = {
            let font = FontRef::from_index(&data, index as usize)?;
            (font.offset, font.key)
        };
        Some(Self {
            family: family.to_string(),
            data: Arc::new(data),
            offset,
            key,
        })
    }

    pub fn family(&self) -> &str {
        &self.family
    }

    pub fn font_ref(&self) -> FontRef<'_> {
        FontRef {
            data: self.data.as_slice(),
            offset: self.offset,
            key: self.key,
        }
    }

    /// Glyph id for `ch`, or 0 when the face does not map it.
    pub fn glyph_for(&self, ch: char) -> u16 {
        self.font_ref().charmap().map(ch)
    }
}

impl std::fmt::Debug for LoadedFace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadedFace")
            .field("family", &self.family)
            .field("data_len", &self.data.len())
            .finish()
    }
}

struct LibraryInner {
    db: Database,
    ready: Mutex<HashMap<String, Arc<LoadedFace>>>,
}

/// Host fonts registered in a fontdb [`Database`].
///
/// Cheap to clone; the candidate source, the loader and the surface all share
/// one database and one cache of ready faces.
#[derive(Clone)]
pub struct FontLibrary {
    inner: Arc<LibraryInner>,
}

impl std::fmt::Debug for FontLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontLibrary")
            .field("faces", &self.inner.db.len())
            .field("ready", &self.inner.ready.lock().len())
            .finish()
    }
}

/// Where a [`FontLibrary`] should look for fonts.
#[derive(Debug, Clone, Default)]
pub struct LibraryOptions {
    pub roots: Vec<PathBuf>,
    pub system_fonts: bool,
    pub follow_symlinks: bool,
}

impl FontLibrary {
    pub fn from_database(db: Database) -> Self {
        Self {
            inner: Arc::new(LibraryInner {
                db,
                ready: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Walk `opts.roots` and optionally the platform font directories.
    ///
    /// A missing root is an error; an unreadable font file is skipped.
    pub fn load(opts: &LibraryOptions) -> Result<Self> {
        let mut db = Database::new();

        for path in font_files(&opts.roots, opts.follow_symlinks)? {
            if let Err(err) = db.load_font_file(&path) {
                log::warn!("skipping {}: {err}", path.display());
            }
        }

        if opts.system_fonts {
            db.load_system_fonts();
        }

        log::info!("font library holds {} faces", db.len());
        Ok(Self::from_database(db))
    }

    /// Library over in-memory font blobs.
    pub fn from_font_data<I>(blobs: I) -> Self
    where
        I: IntoIterator<Item = Vec<u8>>,
    {
        let mut db = Database::new();
        for blob in blobs {
            db.load_font_data(blob);
        }
        Self::from_database(db)
    }

    pub fn face_count(&self) -> usize {
        self.inner.db.len()
    }

    /// Face already made ready for `family`.
    pub fn ready_face(&self, family: &str) -> Option<Arc<LoadedFace>> {
        self.inner.ready.lock().get(family).cloned()
    }

    /// Load `family` synchronously, for fallback faces that must be usable
    /// without an async readiness step.
    pub fn load_now(&self, family: &str) -> Option<Arc<LoadedFace>> {
        if let Some(face) = self.ready_face(family) {
            return Some(face);
        }

        let id = self.face_id(family)?;
        let face = self
            .inner
            .db
            .with_face_data(id, |data, index| LoadedFace::parse(family, data.to_vec(), index))??;
        Some(self.remember(face))
    }

    /// Family name the database substitutes for a generic family.
    pub fn generic_family_name(&self, generic: GenericFamily) -> String {
        let family = match generic {
            GenericFamily::SansSerif => Family::SansSerif,
            GenericFamily::Serif => Family::Serif,
        };
        self.inner.db.family_name(&family).to_string()
    }

    fn face_id(&self, family: &str) -> Option<ID> {
        self.inner.db.query(&Query {
            families: &[Family::Name(family)],
            ..Query::default()
        })
    }

    fn remember(&self, face: LoadedFace) -> Arc<LoadedFace> {
        let face = Arc::new(face);
        self.inner
            .ready
            .lock()
            .entry(face.family().to_string())
            .or_insert_with(|| Arc::clone(&face))
            .clone()
    }

    async fn read_face(&self, family: &str, id: ID) -> Result<LoadedFace, ReadinessError> {
        let unknown = || ReadinessError::UnknownFamily(family.to_string());
        let (source, index) = {
            let info = self.inner.db.face(id).ok_or_else(unknown)?;
            (info.source.clone(), info.index)
        };

        let bytes = match source {
            Source::File(path) => {
                tokio::fs::read(&path)
                    .await
                    .map_err(|source| ReadinessError::Load {
                        family: family.to_string(),
                        source,
                    })?
            }
            _ => self
                .inner
                .db
                .with_face_data(id, |data, _| data.to_vec())
                .ok_or_else(unknown)?,
        };

        LoadedFace::parse(family, bytes, index).ok_or_else(|| ReadinessError::Unparseable {
            family: family.to_string(),
        })
    }
}

#[async_trait]
impl FontLoader for FontLibrary {
    async fn ensure_ready(&self, family: &str, _px: f32) -> Result<(), ReadinessError> {
        let cached = self.ready_face(family).is_some();
        if cached {
            return Ok(());
        }

        let id = self
            .face_id(family)
            .ok_or_else(|| ReadinessError::UnknownFamily(family.to_string()))?;
        let face = self.read_face(family, id).await?;
        self.remember(face);
        Ok(())
    }
}

impl CandidateSource for FontLibrary {
    fn enumerate(&self) -> Result<Vec<Candidate>> {
        if self.inner.db.is_empty() {
            return Err(anyhow!("no fonts available to enumerate"));
        }

        Ok(self.inner.db.faces().filter_map(candidate_for).collect())
    }
}

/// Font files below `roots`, each listed once even when roots overlap.
fn font_files(roots: &[PathBuf], follow_symlinks: bool) -> Result<BTreeSet<PathBuf>> {
    let mut files = BTreeSet::new();
    for root in roots {
        if !root.exists() {
            return Err(anyhow!("root path does not exist: {}", root.display()));
        }

        for entry in WalkDir::new(root).follow_links(follow_symlinks) {
            let entry = entry.with_context(|| format!("walking {}", root.display()))?;
            if entry.file_type().is_file() && has_font_extension(entry.path()) {
                files.insert(entry.into_path());
            }
        }
    }
    Ok(files)
}

fn has_font_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            ["ttf", "otf", "ttc", "otc"]
                .iter()
                .any(|known| ext.eq_ignore_ascii_case(known))
        })
}

/// English family name as identity, Japanese family name (when the face
/// carries one) as label.
fn candidate_for(face: &FaceInfo) -> Option<Candidate> {
    let identity = face
        .families
        .iter()
        .find(|(_, lang)| *lang == Language::English_UnitedStates)
        .or_else(|| face.families.first())
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())?;

    let label = face
        .families
        .iter()
        .find(|(_, lang)| *lang == Language::Japanese_Japan)
        .map(|(name, _)| name.trim())
        .filter(|name| !name.is_empty())
        .unwrap_or(identity);

    Some(Candidate::new(identity, label))
}
