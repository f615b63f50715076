//! ZIP container access.
//!
//! This layer turns an in-memory ZIP archive into a [`FileTable`] of
//! decompressed contents. It is deliberately self-contained: the central
//! directory walk, local header validation, and DEFLATE decompression are
//! all implemented in-crate so that a hostile or truncated archive can
//! never do worse than produce a typed error or a partial table.

mod bytes;
mod errors;
mod inflate;
mod zip;

pub use self::errors::{ArchiveError, ArchiveResult, InflateError};
pub use self::zip::{FileTable, read_archive};
