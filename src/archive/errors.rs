/// Alias for `Result<T, ArchiveError>`.
pub type ArchiveResult<T> = Result<T, ArchiveError>;

/// Possible errors while reading a ZIP container.
///
/// Only [`NoCentralDirectory`](ArchiveError::NoCentralDirectory) is fatal
/// for a whole load; the remaining variants describe a single entry and
/// are reported through the `log` facade while the load continues.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ArchiveError {
    /// A read would extend past the end of the buffer.
    #[error("read of {len} bytes at offset {offset} exceeds buffer of {available} bytes")]
    OutOfBounds {
        /// Offset the read started from.
        offset: usize,
        /// Length of the attempted read.
        len: usize,
        /// Total buffer length.
        available: usize,
    },

    /// No self-consistent end-of-central-directory record exists.
    ///
    /// The buffer is either not a ZIP archive or is truncated before its
    /// trailer.
    #[error("no valid end-of-central-directory record within {len} bytes")]
    NoCentralDirectory {
        /// Length of the scanned buffer.
        len: usize,
    },

    /// A record does not start with its required signature.
    #[error("expected signature {expected:#010x} at offset {offset}")]
    BadSignature {
        /// The signature that should be present.
        expected: u32,
        /// Offset of the malformed record.
        offset: usize,
    },

    /// A central-directory file name length is zero or implausibly large.
    #[error("file name length {len} at offset {offset} is outside the accepted range")]
    SuspectNameLength {
        /// The declared file name length.
        len: usize,
        /// Offset of the central-directory record.
        offset: usize,
    },

    /// An entry's compressed payload exceeds the configured cap.
    #[error("compressed payload of {size} bytes exceeds the {cap} byte cap")]
    EntryTooLarge {
        /// Declared compressed size.
        size: usize,
        /// The configured [`Limits::max_entry_size`](crate::Limits::max_entry_size).
        cap: usize,
    },

    /// An entry uses a compression method other than stored or DEFLATE.
    #[error("unsupported compression method {method}")]
    UnsupportedMethod {
        /// The raw method id from the local header.
        method: u16,
    },

    /// An entry's DEFLATE stream is malformed.
    #[error(transparent)]
    Inflate(#[from] InflateError),
}

/// Possible errors while decompressing a raw DEFLATE stream.
#[non_exhaustive]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum InflateError {
    /// The stream ended mid-block.
    #[error("unexpected end of compressed input")]
    UnexpectedEnd,

    /// A block header used the reserved block type `11`.
    #[error("reserved block type in stream header")]
    ReservedBlockType,

    /// A stored block's length field does not match its complement.
    #[error("stored block length check failed")]
    StoredLengthMismatch,

    /// A Huffman code-length assignment is over-subscribed or unusable.
    #[error("invalid Huffman code lengths")]
    InvalidCodeLengths,

    /// A bit sequence decodes to no symbol in the active table.
    #[error("undecodable symbol in compressed stream")]
    InvalidSymbol,

    /// A back-reference points before the start of the output.
    #[error("back-reference distance {distance} exceeds the {available} bytes produced so far")]
    DistanceTooFar {
        /// Requested back-reference distance.
        distance: usize,
        /// Output bytes available to reference.
        available: usize,
    },

    /// The decompressed output grew past the caller-supplied cap.
    #[error("decompressed output exceeds the {limit} byte cap")]
    OutputLimit {
        /// The configured output cap.
        limit: usize,
    },
}
