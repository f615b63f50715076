//! # quire
//!
//! An EPUB reading core built for hostile input: a self-contained ZIP
//! parser and DEFLATE decoder feed a package resolver that degrades
//! gracefully around the malformed archives real ebooks ship with.
//!
//! Loading never touches the filesystem or network; the caller hands in
//! the archive bytes and receives an owned [`Epub`] — metadata, chapters
//! in reading order, a table of contents, and asset lookup.
//!
//! ## Examples
//! Opening a book and walking its chapters:
//! ```no_run
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! let bytes = std::fs::read("example.epub")?;
//! let epub = quire::Epub::open(&bytes)?;
//!
//! println!("Title = {}", epub.metadata().title());
//!
//! let mut reader = epub.reader();
//! println!("{}", reader.current());
//! while let Some(content) = reader.next() {
//!     println!("{content}");
//! }
//! # Ok(())
//! # }
//! ```
//! Resolving an image referenced from a chapter:
//! ```no_run
//! # use std::error::Error;
//! # fn main() -> Result<(), Box<dyn Error>> {
//! # let bytes = std::fs::read("example.epub")?;
//! # let epub = quire::Epub::open(&bytes)?;
//! if let Some(image) = epub.resolve_asset("../Images/cover.jpg", 0) {
//!     println!("cover is {} bytes", image.len());
//! }
//! # Ok(())
//! # }
//! ```

pub mod archive;
pub mod epub;

mod limits;
mod reader;
mod util;

pub use self::archive::FileTable;
pub use self::epub::{Epub, Manifest, ManifestItem, Metadata, TocEntry};
pub use self::limits::Limits;
pub use self::reader::Reader;

pub mod errors {
    pub use super::archive::{ArchiveError, ArchiveResult, InflateError};
    pub use super::epub::errors::{EpubError, EpubResult};
}
