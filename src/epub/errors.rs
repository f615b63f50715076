//! Error-related types for an [`Epub`](super::Epub).

pub use crate::archive::{ArchiveError, ArchiveResult};

/// Alias for `Result<T, EpubError>`.
pub type EpubResult<T> = Result<T, EpubError>;

/// Possible errors while loading an [`Epub`](super::Epub).
///
/// Every variant here is fatal for a load; conditions the loader can
/// degrade around (a corrupt entry, a missing chapter file, an unusable
/// table of contents) never surface as errors.
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum EpubError {
    /// The byte buffer is not a readable ZIP container.
    #[error(transparent)]
    Archive(#[from] ArchiveError),

    /// `META-INF/container.xml` is absent or carries no usable
    /// `rootfile` `full-path` attribute.
    #[error("`{path}` is missing or names no package document")]
    MissingContainer {
        /// The container path that was looked up.
        path: String,
    },

    /// The package document named by the container is not in the archive.
    #[error("package document `{path}` is not present in the archive")]
    MissingOpf {
        /// The package document path from the container.
        path: String,
    },

    /// The package document cannot be parsed as XML.
    #[error("package document `{path}` is malformed: {source}")]
    InvalidOpf {
        /// The package document path.
        path: String,
        /// The underlying parser error.
        source: quick_xml::Error,
    },

    /// The spine lists no XHTML or HTML content documents.
    #[error("package document `{path}` declares no readable spine entries")]
    NoReadableSpine {
        /// The package document path.
        path: String,
    },
}
