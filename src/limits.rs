/// Byte-size caps applied while loading an archive and querying its contents.
///
/// The defaults mirror the sizes a reading application can realistically
/// hand to a rendering surface; all of them can be raised or lowered per
/// load via [`Epub::open_with`](crate::Epub::open_with).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest accepted compressed payload for a single archive entry.
    /// Entries above the cap are skipped, not fatal. Default: 50 MiB.
    ///
    /// The same cap bounds the decompressed output of each entry, so a
    /// crafted archive cannot expand into unbounded memory.
    pub max_entry_size: usize,
    /// Largest asset [`Epub::resolve_asset`](crate::Epub::resolve_asset)
    /// will hand out; larger matches resolve to `None`. Default: 5 MiB.
    pub max_asset_size: usize,
    /// Largest spine document loaded as chapter text; larger documents are
    /// replaced by the unavailable-content placeholder. Default: 30 MiB.
    pub max_chapter_size: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_entry_size: 50 * 1024 * 1024,
            max_asset_size: 5 * 1024 * 1024,
            max_chapter_size: 30 * 1024 * 1024,
        }
    }
}
