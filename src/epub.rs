//! The resolved EPUB package and its load pipeline.

pub mod errors;

mod consts;
mod locator;
mod manifest;
mod parser;
mod toc;

pub use self::consts::media_type_for_path;
pub use self::manifest::{Manifest, ManifestItem};
pub use self::toc::TocEntry;

use self::errors::EpubResult;
use crate::archive::{self, FileTable};
use crate::limits::Limits;
use crate::reader::Reader;

/// Package-level bibliographic metadata.
///
/// Fields the package document omits hold the `"unknown"` sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    title: String,
    creator: String,
}

impl Metadata {
    pub(crate) fn new(title: String, creator: String) -> Self {
        Self { title, creator }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn creator(&self) -> &str {
        &self.creator
    }
}

/// A fully resolved EPUB package.
///
/// Produced by a single pass over an in-memory archive: container and
/// package parsing, chapter loading, and table-of-contents resolution all
/// happen inside [`open`](Epub::open). The value owns everything it hands
/// out; nothing aliases the input buffer or any previous load.
///
/// # Examples
/// ```no_run
/// # use std::error::Error;
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let bytes = std::fs::read("example.epub")?;
/// let epub = quire::Epub::open(&bytes)?;
///
/// println!("{} by {}", epub.metadata().title(), epub.metadata().creator());
/// for entry in epub.toc() {
///     println!("- {}", entry.title());
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Epub {
    metadata: Metadata,
    manifest: Manifest,
    spine: Vec<String>,
    chapters: Vec<String>,
    toc: Vec<TocEntry>,
    base_path: String,
    files: FileTable,
    limits: Limits,
}

impl Epub {
    /// Load a package from the raw bytes of an `.epub` file with default
    /// [`Limits`].
    pub fn open(data: &[u8]) -> EpubResult<Self> {
        Self::open_with(data, Limits::default())
    }

    /// Load a package with explicit [`Limits`].
    pub fn open_with(data: &[u8], limits: Limits) -> EpubResult<Self> {
        let files = archive::read_archive(data, &limits)?;
        let parsed = parser::PackageParser::new(&files, &limits).parse()?;

        Ok(Self {
            metadata: parsed.metadata,
            manifest: parsed.manifest,
            spine: parsed.spine,
            chapters: parsed.chapters,
            toc: parsed.toc,
            base_path: parsed.base_path,
            files,
            limits,
        })
    }

    pub fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Manifest ids of the readable content documents, in reading order.
    /// Guaranteed non-empty.
    pub fn spine(&self) -> &[String] {
        &self.spine
    }

    /// Decoded chapter documents, positionally aligned with
    /// [`spine`](Self::spine). A chapter whose file is missing or over the
    /// configured cap holds a placeholder marker instead.
    pub fn chapters(&self) -> &[String] {
        &self.chapters
    }

    pub fn chapter(&self, index: usize) -> Option<&str> {
        self.chapters.get(index).map(String::as_str)
    }

    pub fn toc(&self) -> &[TocEntry] {
        &self.toc
    }

    /// Directory prefix of the package document, trailing slash included;
    /// empty when it sits at the archive root.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    /// All archive paths in the file table, in lexicographic order.
    pub fn file_names(&self) -> impl Iterator<Item = &str> {
        self.files.names()
    }

    /// Raw contents of an archive file by exact path.
    pub fn read_file(&self, path: &str) -> Option<&[u8]> {
        self.files.get(path)
    }

    /// Archive path of the asset `reference` points at, as written inside
    /// the chapter at `chapter_index`. Tries the full ordered strategy
    /// list of the asset locator; `None` when nothing matches.
    pub fn resolve_asset_path(&self, reference: &str, chapter_index: usize) -> Option<String> {
        locator::resolve(
            reference,
            &self.base_path,
            self.chapter_path(chapter_index).as_deref(),
            &self.files,
        )
    }

    /// Bytes of the asset `reference` points at. Matches larger than
    /// [`Limits::max_asset_size`] resolve to `None`.
    pub fn resolve_asset(&self, reference: &str, chapter_index: usize) -> Option<&[u8]> {
        let path = self.resolve_asset_path(reference, chapter_index)?;
        let data = self.files.get(&path)?;
        (data.len() <= self.limits.max_asset_size).then_some(data)
    }

    /// A cursor for sequential chapter navigation.
    pub fn reader(&self) -> Reader<'_> {
        Reader::new(self)
    }

    /// Full archive path of the spine document at `chapter_index`.
    fn chapter_path(&self, chapter_index: usize) -> Option<String> {
        let id = self.spine.get(chapter_index)?;
        let item = self.manifest.get(id)?;
        Some(format!("{}{}", self.base_path, item.href()))
    }
}
