//! Shared test support: byte-exact in-memory ZIP construction.

use flate2::Compression;
use flate2::write::DeflateEncoder;
use std::io::Write;

const LOCAL_SIG: u32 = 0x0403_4b50;
const CENTRAL_SIG: u32 = 0x0201_4b50;
const EOCD_SIG: u32 = 0x0605_4b50;

struct Entry {
    name: String,
    payload: Vec<u8>,
    method: u16,
    uncompressed_size: u32,
    streaming: bool,
}

/// Assembles a ZIP archive record by record, so tests control the exact
/// bytes the parser sees.
#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<Entry>,
    comment: Vec<u8>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an uncompressed entry.
    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            payload: data.to_vec(),
            method: 0,
            uncompressed_size: data.len() as u32,
            streaming: false,
        });
        self
    }

    /// Add a DEFLATE-compressed entry.
    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let payload = encoder.finish().unwrap();

        self.entries.push(Entry {
            name: name.to_string(),
            payload,
            method: 8,
            uncompressed_size: data.len() as u32,
            streaming: false,
        });
        self
    }

    /// Add a DEFLATE-compressed entry written the way streaming encoders
    /// do: zero sizes in the local header, flag bit 3 set, and a data
    /// descriptor after the payload. Only the central directory carries
    /// the real sizes.
    #[allow(dead_code)]
    pub fn streaming(mut self, name: &str, data: &[u8]) -> Self {
        let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(data).unwrap();
        let payload = encoder.finish().unwrap();

        self.entries.push(Entry {
            name: name.to_string(),
            payload,
            method: 8,
            uncompressed_size: data.len() as u32,
            streaming: true,
        });
        self
    }

    /// Add an entry with an arbitrary method id and raw payload.
    #[allow(dead_code)]
    pub fn raw_method(mut self, name: &str, method: u16, payload: &[u8]) -> Self {
        self.entries.push(Entry {
            name: name.to_string(),
            payload: payload.to_vec(),
            method,
            uncompressed_size: payload.len() as u32,
            streaming: false,
        });
        self
    }

    /// Append an archive comment to the end-of-central-directory record.
    pub fn comment(mut self, comment: &[u8]) -> Self {
        self.comment = comment.to_vec();
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut local_offsets = Vec::new();

        for entry in &self.entries {
            let flags: u16 = if entry.streaming { 1 << 3 } else { 0 };
            let (local_compressed, local_uncompressed) = if entry.streaming {
                (0u32, 0u32)
            } else {
                (entry.payload.len() as u32, entry.uncompressed_size)
            };

            local_offsets.push(out.len() as u32);
            out.extend_from_slice(&LOCAL_SIG.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&flags.to_le_bytes());
            out.extend_from_slice(&entry.method.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes()); // mod time + date
            out.extend_from_slice(&0u32.to_le_bytes()); // crc-32 (unchecked)
            out.extend_from_slice(&local_compressed.to_le_bytes());
            out.extend_from_slice(&local_uncompressed.to_le_bytes());
            out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // extra length
            out.extend_from_slice(entry.name.as_bytes());
            out.extend_from_slice(&entry.payload);

            if entry.streaming {
                // Data descriptor: signature, crc-32, sizes
                out.extend_from_slice(&0x0807_4b50u32.to_le_bytes());
                out.extend_from_slice(&0u32.to_le_bytes());
                out.extend_from_slice(&(entry.payload.len() as u32).to_le_bytes());
                out.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            }
        }

        let cd_offset = out.len() as u32;
        for (entry, local_offset) in self.entries.iter().zip(&local_offsets) {
            let flags: u16 = if entry.streaming { 1 << 3 } else { 0 };
            out.extend_from_slice(&CENTRAL_SIG.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes()); // version made by
            out.extend_from_slice(&20u16.to_le_bytes()); // version needed
            out.extend_from_slice(&flags.to_le_bytes());
            out.extend_from_slice(&entry.method.to_le_bytes());
            out.extend_from_slice(&0u32.to_le_bytes()); // mod time + date
            out.extend_from_slice(&0u32.to_le_bytes()); // crc-32
            out.extend_from_slice(&(entry.payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&entry.uncompressed_size.to_le_bytes());
            out.extend_from_slice(&(entry.name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes()); // extra length
            out.extend_from_slice(&0u16.to_le_bytes()); // comment length
            out.extend_from_slice(&0u16.to_le_bytes()); // disk number
            out.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
            out.extend_from_slice(&0u32.to_le_bytes()); // external attributes
            out.extend_from_slice(&local_offset.to_le_bytes());
            out.extend_from_slice(entry.name.as_bytes());
        }
        let cd_size = out.len() as u32 - cd_offset;

        out.extend_from_slice(&EOCD_SIG.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes()); // disk number
        out.extend_from_slice(&0u16.to_le_bytes()); // central directory disk
        out.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&cd_size.to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&(self.comment.len() as u16).to_le_bytes());
        out.extend_from_slice(&self.comment);
        out
    }
}

/// Central-directory offset from a comment-free archive's trailer.
#[allow(dead_code)]
pub fn cd_offset(archive: &[u8]) -> usize {
    let at = archive.len() - 22 + 16;
    u32::from_le_bytes([
        archive[at],
        archive[at + 1],
        archive[at + 2],
        archive[at + 3],
    ]) as usize
}

/// Start offsets of each central-directory record in a comment-free
/// archive built by [`ZipBuilder`] (no extra fields or comments).
#[allow(dead_code)]
pub fn cd_record_offsets(archive: &[u8]) -> Vec<usize> {
    let mut offsets = Vec::new();
    let mut pos = cd_offset(archive);
    while pos + 46 <= archive.len() - 22 {
        let sig = u32::from_le_bytes([
            archive[pos],
            archive[pos + 1],
            archive[pos + 2],
            archive[pos + 3],
        ]);
        if sig != CENTRAL_SIG {
            break;
        }
        offsets.push(pos);
        let name_len = u16::from_le_bytes([archive[pos + 28], archive[pos + 29]]) as usize;
        pos += 46 + name_len;
    }
    offsets
}

pub const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

#[allow(dead_code)]
pub const TWO_CHAPTER_OPF: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" unique-identifier="uid" version="2.0">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/">
    <dc:title>The Riddle of the Sands</dc:title>
    <dc:creator>Erskine Childers</dc:creator>
  </metadata>
  <manifest>
    <item id="ch1" href="Text/chapter-one.xhtml" media-type="application/xhtml+xml"/>
    <item id="ch2" href="Text/chapter-two.xhtml" media-type="application/xhtml+xml"/>
    <item id="cover" href="Images/cover.jpg" media-type="image/jpeg"/>
    <item id="css" href="Styles/main.css" media-type="text/css"/>
  </manifest>
  <spine>
    <itemref idref="ch1"/>
    <itemref idref="ch2"/>
  </spine>
</package>"#;

#[allow(dead_code)]
pub const CH1: &str = r#"<html><body><p>The first chapter.</p></body></html>"#;
#[allow(dead_code)]
pub const CH2: &str = r#"<html><body><p>The second chapter.</p></body></html>"#;

/// A complete two-chapter book with a cover image and no NCX.
#[allow(dead_code)]
pub fn two_chapter_book() -> ZipBuilder {
    ZipBuilder::new()
        .stored("mimetype", b"application/epub+zip")
        .deflated("META-INF/container.xml", CONTAINER_XML.as_bytes())
        .deflated("OEBPS/content.opf", TWO_CHAPTER_OPF.as_bytes())
        .deflated("OEBPS/Text/chapter-one.xhtml", CH1.as_bytes())
        .deflated("OEBPS/Text/chapter-two.xhtml", CH2.as_bytes())
        .stored("OEBPS/Images/cover.jpg", &[0xff, 0xd8, 0xff, 0xe0, 0x00])
        .deflated("OEBPS/Styles/main.css", b"body { margin: 0; }")
}
