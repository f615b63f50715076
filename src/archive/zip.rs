//! ZIP central-directory parsing and entry extraction.

use super::bytes::ByteCursor;
use super::errors::{ArchiveError, ArchiveResult};
use super::inflate;
use crate::limits::Limits;
use log::{debug, warn};
use rayon::prelude::*;
use std::collections::BTreeMap;

const EOCD_SIG: u32 = 0x0605_4b50;
const CENTRAL_SIG: u32 = 0x0201_4b50;
const LOCAL_SIG: u32 = 0x0403_4b50;

/// Fixed sizes of the three record types, excluding variable fields.
const EOCD_LEN: usize = 22;
const CENTRAL_LEN: usize = 46;
const LOCAL_LEN: usize = 30;

/// Sanity bound on file name lengths, well above anything a real EPUB
/// contains. Not a limit of the ZIP format itself.
const MAX_NAME_LEN: usize = 1024;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATE: u16 = 8;

/// Entries written in streaming mode defer their sizes to a trailing data
/// descriptor; the central directory holds the real values.
const FLAG_DATA_DESCRIPTOR: u16 = 1 << 3;

/// One central-directory record, kept only until its payload is extracted.
#[derive(Debug, Clone)]
struct ArchiveEntry {
    name: String,
    local_header_offset: usize,
    compressed_size: usize,
    uncompressed_size: usize,
    flags: u16,
    method: u16,
}

/// Decompressed archive contents keyed by exact archive path.
///
/// Keys are stored as the archive declares them, never normalized;
/// normalization happens at lookup time in the asset locator. The map is
/// ordered so fallback scans over file names are deterministic.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct FileTable {
    entries: BTreeMap<String, Vec<u8>>,
}

impl FileTable {
    /// Contents of `name`, by exact key.
    pub fn get(&self, name: &str) -> Option<&[u8]> {
        self.entries.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// All archive paths, in lexicographic order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.entries
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn insert(&mut self, name: String, data: Vec<u8>) {
        self.entries.insert(name, data);
    }
}

/// Parse a ZIP archive held entirely in memory into a [`FileTable`].
///
/// A missing or inconsistent end-of-central-directory record is fatal.
/// Everything below that degrades: a malformed central-directory record
/// stops the walk but keeps the entries parsed so far, and an entry whose
/// local header, payload bounds, size, compression method, or DEFLATE
/// stream is unusable is skipped with a warning. Duplicate names resolve
/// to the last central-directory occurrence.
pub fn read_archive(data: &[u8], limits: &Limits) -> ArchiveResult<FileTable> {
    let cursor = ByteCursor::new(data);
    let (cd_offset, entry_count) = find_central_directory(&cursor)?;
    let entries = walk_central_directory(&cursor, cd_offset, entry_count);
    debug!(
        "central directory at {cd_offset} yielded {} of {entry_count} declared entries",
        entries.len()
    );

    // Entries are independent; decompress them in parallel and fold the
    // results back in walk order so duplicate names stay last-wins.
    let extracted: Vec<Option<(String, Vec<u8>)>> = entries
        .into_par_iter()
        .map(|entry| {
            let payload = extract_entry(&cursor, &entry, limits)?;
            Some((entry.name, payload))
        })
        .collect();

    let mut files = FileTable::default();
    for (name, payload) in extracted.into_iter().flatten() {
        files.insert(name, payload);
    }
    Ok(files)
}

/// Scan backward for an end-of-central-directory record whose directory
/// offset and size are consistent with the buffer, so a signature embedded
/// in a trailing comment cannot be mistaken for the real trailer.
fn find_central_directory(cursor: &ByteCursor<'_>) -> ArchiveResult<(usize, u16)> {
    let len = cursor.len();
    let Some(mut pos) = len.checked_sub(EOCD_LEN) else {
        return Err(ArchiveError::NoCentralDirectory { len });
    };

    loop {
        if cursor.u32_at(pos)? == EOCD_SIG {
            let entry_count = cursor.u16_at(pos + 10)?;
            let cd_size = cursor.u32_at(pos + 12)? as usize;
            let cd_offset = cursor.u32_at(pos + 16)? as usize;
            match cd_offset.checked_add(cd_size) {
                Some(end) if end <= len => return Ok((cd_offset, entry_count)),
                _ => debug!("rejecting end-of-central-directory candidate at {pos}"),
            }
        }
        if pos == 0 {
            return Err(ArchiveError::NoCentralDirectory { len });
        }
        pos -= 1;
    }
}

/// Walk up to `count` central-directory records. The first malformed
/// record stops the walk; whatever parsed before it is kept.
fn walk_central_directory(
    cursor: &ByteCursor<'_>,
    cd_offset: usize,
    count: u16,
) -> Vec<ArchiveEntry> {
    let mut entries = Vec::with_capacity(usize::from(count));
    let mut pos = cd_offset;

    for index in 0..count {
        match parse_central_entry(*cursor, pos) {
            Ok((entry, next)) => {
                entries.push(entry);
                pos = next;
            }
            Err(error) => {
                warn!("stopping central directory walk at entry {index}: {error}");
                break;
            }
        }
    }
    entries
}

fn parse_central_entry(
    mut cursor: ByteCursor<'_>,
    pos: usize,
) -> ArchiveResult<(ArchiveEntry, usize)> {
    cursor.seek(pos)?;
    if cursor.read_u32()? != CENTRAL_SIG {
        return Err(ArchiveError::BadSignature {
            expected: CENTRAL_SIG,
            offset: pos,
        });
    }
    cursor.skip(4)?; // version made by, version needed
    let flags = cursor.read_u16()?;
    let method = cursor.read_u16()?;
    cursor.skip(8)?; // mod time, mod date, crc-32
    let compressed_size = cursor.read_u32()? as usize;
    let uncompressed_size = cursor.read_u32()? as usize;
    let name_len = usize::from(cursor.read_u16()?);
    let extra_len = usize::from(cursor.read_u16()?);
    let comment_len = usize::from(cursor.read_u16()?);
    cursor.skip(8)?; // disk number, internal and external attributes
    let local_header_offset = cursor.read_u32()? as usize;

    if name_len == 0 || name_len > MAX_NAME_LEN {
        return Err(ArchiveError::SuspectNameLength {
            len: name_len,
            offset: pos,
        });
    }
    let name = String::from_utf8_lossy(cursor.read_slice(name_len)?).into_owned();
    let next = pos + CENTRAL_LEN + name_len + extra_len + comment_len;

    Ok((
        ArchiveEntry {
            name,
            local_header_offset,
            compressed_size,
            uncompressed_size,
            flags,
            method,
        },
        next,
    ))
}

fn extract_entry(
    cursor: &ByteCursor<'_>,
    entry: &ArchiveEntry,
    limits: &Limits,
) -> Option<Vec<u8>> {
    match read_payload(*cursor, entry, limits) {
        Ok(payload) => Some(payload),
        Err(error) => {
            warn!("skipping archive entry `{}`: {error}", entry.name);
            None
        }
    }
}

/// Validate an entry's local header and decompress its payload.
fn read_payload(
    mut cursor: ByteCursor<'_>,
    entry: &ArchiveEntry,
    limits: &Limits,
) -> ArchiveResult<Vec<u8>> {
    let base = entry.local_header_offset;
    cursor.seek(base)?;
    if cursor.read_u32()? != LOCAL_SIG {
        return Err(ArchiveError::BadSignature {
            expected: LOCAL_SIG,
            offset: base,
        });
    }
    cursor.skip(2)?; // version needed
    let flags = cursor.read_u16()?;
    let method = cursor.read_u16()?;
    cursor.skip(8)?; // mod time, mod date, crc-32
    let mut compressed_size = cursor.read_u32()? as usize;
    let mut uncompressed_size = cursor.read_u32()? as usize;
    let name_len = usize::from(cursor.read_u16()?);
    let extra_len = usize::from(cursor.read_u16()?);

    // Streaming-mode writers leave the sizes zero here and record them in
    // a data descriptor after the payload; the central directory already
    // carries the real values.
    if compressed_size == 0 && (flags | entry.flags) & FLAG_DATA_DESCRIPTOR != 0 {
        compressed_size = entry.compressed_size;
        uncompressed_size = entry.uncompressed_size;
    }
    if compressed_size > limits.max_entry_size {
        return Err(ArchiveError::EntryTooLarge {
            size: compressed_size,
            cap: limits.max_entry_size,
        });
    }
    if method != entry.method {
        debug!(
            "entry `{}`: local method {method} differs from central directory {}",
            entry.name, entry.method
        );
    }

    let payload_offset = base + LOCAL_LEN + name_len + extra_len;
    let payload = cursor.slice_at(payload_offset, compressed_size)?;

    let data = match method {
        METHOD_STORED => payload.to_vec(),
        METHOD_DEFLATE => inflate::inflate(payload, limits.max_entry_size)?,
        other => return Err(ArchiveError::UnsupportedMethod { method: other }),
    };
    if uncompressed_size != 0 && data.len() != uncompressed_size {
        debug!(
            "entry `{}`: decompressed to {} bytes, header declared {uncompressed_size}",
            entry.name,
            data.len()
        );
    }
    Ok(data)
}
