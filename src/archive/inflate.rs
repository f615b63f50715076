//! Raw DEFLATE (RFC 1951) decompression.
//!
//! Decodes stored, fixed-Huffman, and dynamic-Huffman blocks from a raw
//! stream with no zlib header or trailer, as ZIP compression method 8
//! requires. The whole output produced so far serves as the back-reference
//! window, since entries are decompressed in one piece.

use super::errors::InflateError;

/// Longest Huffman code permitted by DEFLATE.
const MAX_BITS: usize = 15;
/// Literal/length alphabet size (including the two reserved symbols).
const LITLEN_SYMBOLS: usize = 288;
/// Distance alphabet size.
const DIST_SYMBOLS: usize = 30;

/// Base lengths for symbols 257..=285 (RFC 1951 §3.2.5).
#[rustfmt::skip]
const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31,
    35, 43, 51, 59, 67, 83, 99, 115, 131, 163, 195, 227, 258,
];
#[rustfmt::skip]
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2,
    3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];

/// Base distances for symbols 0..=29 (RFC 1951 §3.2.5).
#[rustfmt::skip]
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193,
    257, 385, 513, 769, 1025, 1537, 2049, 3073, 4097, 6145,
    8193, 12289, 16385, 24577,
];
#[rustfmt::skip]
const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6,
    7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13,
];

/// Transmission order of the code-length code lengths (RFC 1951 §3.2.7).
const CLEN_ORDER: [usize; 19] = [
    16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15,
];

/// LSB-first bit reader over a byte slice.
struct BitReader<'a> {
    input: &'a [u8],
    pos: usize,
    bit_buf: u32,
    bit_count: u32,
}

impl<'a> BitReader<'a> {
    fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            bit_buf: 0,
            bit_count: 0,
        }
    }

    /// Read `count` bits (`count <= 16`), least significant bit first.
    fn bits(&mut self, count: u32) -> Result<u32, InflateError> {
        debug_assert!(count <= 16);
        while self.bit_count < count {
            let byte = *self
                .input
                .get(self.pos)
                .ok_or(InflateError::UnexpectedEnd)?;
            self.pos += 1;
            self.bit_buf |= u32::from(byte) << self.bit_count;
            self.bit_count += 8;
        }
        let value = self.bit_buf & ((1u32 << count) - 1);
        self.bit_buf >>= count;
        self.bit_count -= count;
        Ok(value)
    }

    /// Discard bits up to the next byte boundary.
    fn align(&mut self) {
        let partial = self.bit_count % 8;
        self.bit_buf >>= partial;
        self.bit_count -= partial;
        // Whole bytes left in the buffer are handed back to the input
        self.pos -= (self.bit_count / 8) as usize;
        self.bit_buf = 0;
        self.bit_count = 0;
    }

    /// Read `len` byte-aligned bytes. Callers must [`align`](Self::align)
    /// first.
    fn take(&mut self, len: usize) -> Result<&'a [u8], InflateError> {
        debug_assert_eq!(0, self.bit_count);
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.input.len())
            .ok_or(InflateError::UnexpectedEnd)?;
        let bytes = &self.input[self.pos..end];
        self.pos = end;
        Ok(bytes)
    }
}

/// Canonical Huffman decoding table: symbol counts per code length plus
/// symbols sorted by (length, symbol value).
struct Huffman {
    count: [u16; MAX_BITS + 1],
    symbol: Vec<u16>,
}

impl Huffman {
    /// Build a table from per-symbol code lengths. Returns `None` when no
    /// symbol has a code at all; rejects over-subscribed assignments.
    fn build(lengths: &[u8]) -> Result<Option<Self>, InflateError> {
        let mut count = [0u16; MAX_BITS + 1];
        for &len in lengths {
            if usize::from(len) > MAX_BITS {
                return Err(InflateError::InvalidCodeLengths);
            }
            count[usize::from(len)] += 1;
        }
        if usize::from(count[0]) == lengths.len() {
            return Ok(None);
        }

        // Kraft check: the assignment must not claim more codes of any
        // length than the prefix tree can hold
        let mut left = 1i32;
        for len in 1..=MAX_BITS {
            left = (left << 1) - i32::from(count[len]);
            if left < 0 {
                return Err(InflateError::InvalidCodeLengths);
            }
        }

        let mut offsets = [0u16; MAX_BITS + 1];
        for len in 1..MAX_BITS {
            offsets[len + 1] = offsets[len] + count[len];
        }

        let mut symbol = vec![0u16; lengths.len()];
        for (sym, &len) in lengths.iter().enumerate() {
            if len != 0 {
                symbol[usize::from(offsets[usize::from(len)])] = sym as u16;
                offsets[usize::from(len)] += 1;
            }
        }
        Ok(Some(Self { count, symbol }))
    }

    /// Decode one symbol, walking code lengths shortest-first.
    fn decode(&self, reader: &mut BitReader<'_>) -> Result<u16, InflateError> {
        let mut code = 0u32;
        let mut first = 0u32;
        let mut index = 0u32;

        for len in 1..=MAX_BITS {
            code |= reader.bits(1)?;
            let count = u32::from(self.count[len]);
            if code - first < count {
                return Ok(self.symbol[(index + (code - first)) as usize]);
            }
            index += count;
            first = (first + count) << 1;
            code <<= 1;
        }
        Err(InflateError::InvalidSymbol)
    }
}

/// Decompress a raw DEFLATE stream, bounding the output at `max_output`
/// bytes so a crafted stream cannot expand without limit. Trailing bytes
/// after the final block are ignored.
pub(crate) fn inflate(input: &[u8], max_output: usize) -> Result<Vec<u8>, InflateError> {
    let mut reader = BitReader::new(input);
    let mut output = Vec::new();

    loop {
        let last_block = reader.bits(1)? == 1;
        match reader.bits(2)? {
            0b00 => stored_block(&mut reader, &mut output, max_output)?,
            0b01 => {
                let (litlen, dist) = fixed_tables()?;
                compressed_block(&mut reader, &mut output, &litlen, dist.as_ref(), max_output)?;
            }
            0b10 => {
                let (litlen, dist) = dynamic_tables(&mut reader)?;
                compressed_block(&mut reader, &mut output, &litlen, dist.as_ref(), max_output)?;
            }
            _ => return Err(InflateError::ReservedBlockType),
        }
        if last_block {
            return Ok(output);
        }
    }
}

fn stored_block(
    reader: &mut BitReader<'_>,
    output: &mut Vec<u8>,
    max_output: usize,
) -> Result<(), InflateError> {
    reader.align();
    let header = reader.take(4)?;
    let len = u16::from_le_bytes([header[0], header[1]]);
    let nlen = u16::from_le_bytes([header[2], header[3]]);
    if len != !nlen {
        return Err(InflateError::StoredLengthMismatch);
    }
    let data = reader.take(usize::from(len))?;
    if output.len() + data.len() > max_output {
        return Err(InflateError::OutputLimit { limit: max_output });
    }
    output.extend_from_slice(data);
    Ok(())
}

/// Fixed-Huffman tables (RFC 1951 §3.2.6).
fn fixed_tables() -> Result<(Huffman, Option<Huffman>), InflateError> {
    let mut litlen_lens = [0u8; LITLEN_SYMBOLS];
    for (sym, len) in litlen_lens.iter_mut().enumerate() {
        *len = match sym {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
    }
    let dist_lens = [5u8; 32];

    let litlen = Huffman::build(&litlen_lens)?.ok_or(InflateError::InvalidCodeLengths)?;
    let dist = Huffman::build(&dist_lens)?;
    Ok((litlen, dist))
}

/// Read the dynamic code-length headers and build the block's tables
/// (RFC 1951 §3.2.7).
fn dynamic_tables(reader: &mut BitReader<'_>) -> Result<(Huffman, Option<Huffman>), InflateError> {
    let hlit = reader.bits(5)? as usize + 257;
    let hdist = reader.bits(5)? as usize + 1;
    let hclen = reader.bits(4)? as usize + 4;
    if hlit > LITLEN_SYMBOLS - 2 || hdist > DIST_SYMBOLS {
        return Err(InflateError::InvalidCodeLengths);
    }

    let mut clen_lens = [0u8; 19];
    for &position in CLEN_ORDER.iter().take(hclen) {
        clen_lens[position] = reader.bits(3)? as u8;
    }
    let clen_table = Huffman::build(&clen_lens)?.ok_or(InflateError::InvalidCodeLengths)?;

    // Literal/length and distance lengths share one run-length coded list
    let mut lengths = [0u8; LITLEN_SYMBOLS + DIST_SYMBOLS];
    let total = hlit + hdist;
    let mut index = 0;
    while index < total {
        let symbol = clen_table.decode(reader)?;
        let (repeat, value) = match symbol {
            0..=15 => {
                lengths[index] = symbol as u8;
                index += 1;
                continue;
            }
            16 => {
                if index == 0 {
                    return Err(InflateError::InvalidCodeLengths);
                }
                (3 + reader.bits(2)? as usize, lengths[index - 1])
            }
            17 => (3 + reader.bits(3)? as usize, 0),
            18 => (11 + reader.bits(7)? as usize, 0),
            _ => return Err(InflateError::InvalidSymbol),
        };
        if index + repeat > total {
            return Err(InflateError::InvalidCodeLengths);
        }
        for _ in 0..repeat {
            lengths[index] = value;
            index += 1;
        }
    }

    // The end-of-block code must be assigned
    if lengths[256] == 0 {
        return Err(InflateError::InvalidCodeLengths);
    }

    let litlen = Huffman::build(&lengths[..hlit])?.ok_or(InflateError::InvalidCodeLengths)?;
    let dist = Huffman::build(&lengths[hlit..total])?;
    Ok((litlen, dist))
}

fn compressed_block(
    reader: &mut BitReader<'_>,
    output: &mut Vec<u8>,
    litlen: &Huffman,
    dist: Option<&Huffman>,
    max_output: usize,
) -> Result<(), InflateError> {
    loop {
        let symbol = litlen.decode(reader)?;
        match symbol {
            0..=255 => {
                if output.len() >= max_output {
                    return Err(InflateError::OutputLimit { limit: max_output });
                }
                output.push(symbol as u8);
            }
            256 => return Ok(()),
            _ => {
                let index = usize::from(symbol) - 257;
                if index >= LENGTH_BASE.len() {
                    return Err(InflateError::InvalidSymbol);
                }
                let length = usize::from(LENGTH_BASE[index])
                    + reader.bits(u32::from(LENGTH_EXTRA[index]))? as usize;

                let dist_table = dist.ok_or(InflateError::InvalidSymbol)?;
                let dist_sym = usize::from(dist_table.decode(reader)?);
                if dist_sym >= DIST_BASE.len() {
                    return Err(InflateError::InvalidSymbol);
                }
                let distance = usize::from(DIST_BASE[dist_sym])
                    + reader.bits(u32::from(DIST_EXTRA[dist_sym]))? as usize;

                if distance > output.len() {
                    return Err(InflateError::DistanceTooFar {
                        distance,
                        available: output.len(),
                    });
                }
                if output.len() + length > max_output {
                    return Err(InflateError::OutputLimit { limit: max_output });
                }
                // Copy byte-by-byte: the reference may overlap the bytes
                // it is producing
                let start = output.len() - distance;
                for offset in 0..length {
                    let byte = output[start + offset];
                    output.push(byte);
                }
            }
        }
    }
}
