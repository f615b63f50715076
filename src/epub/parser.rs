//! Container → package document → table-of-contents pipeline.

mod container;
mod opf;
mod toc;

use super::consts;
use super::errors::EpubResult;
use super::manifest::Manifest;
use super::toc::TocEntry;
use super::Metadata;
use crate::archive::FileTable;
use crate::limits::Limits;
use crate::util::uri;
use log::warn;
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use std::borrow::Cow;

/// Everything the parse pipeline produces; the caller assembles it with
/// the file table into the final package value.
pub(crate) struct ParsedPackage {
    pub(crate) metadata: Metadata,
    pub(crate) manifest: Manifest,
    pub(crate) spine: Vec<String>,
    pub(crate) chapters: Vec<String>,
    pub(crate) toc: Vec<TocEntry>,
    pub(crate) base_path: String,
}

pub(crate) struct PackageParser<'a> {
    files: &'a FileTable,
    limits: &'a Limits,
}

impl<'a> PackageParser<'a> {
    pub(crate) fn new(files: &'a FileTable, limits: &'a Limits) -> Self {
        Self { files, limits }
    }

    pub(crate) fn parse(&self) -> EpubResult<ParsedPackage> {
        let opf_path = self.locate_opf()?;
        let opf = self.parse_opf(&opf_path)?;
        let toc = self.parse_toc(&opf);
        let chapters = self.load_chapters(&opf);

        Ok(ParsedPackage {
            metadata: opf.metadata,
            manifest: opf.manifest,
            spine: opf.spine,
            chapters,
            toc,
            base_path: opf.base_path,
        })
    }

    /// Decode every spine document as text, positionally aligned with the
    /// spine. A missing or oversized document becomes a placeholder, never
    /// a failure.
    fn load_chapters(&self, opf: &opf::OpfData) -> Vec<String> {
        opf.spine
            .iter()
            .map(|id| {
                let Some(item) = opf.manifest.get(id) else {
                    return consts::CHAPTER_UNAVAILABLE.to_string();
                };
                let path = format!("{}{}", opf.base_path, item.href());
                match self.files.get(&path) {
                    Some(data) if data.len() <= self.limits.max_chapter_size => {
                        String::from_utf8_lossy(data).into_owned()
                    }
                    Some(data) => {
                        warn!(
                            "chapter `{path}` is {} bytes, over the {} byte cap",
                            data.len(),
                            self.limits.max_chapter_size
                        );
                        consts::CHAPTER_UNAVAILABLE.to_string()
                    }
                    None => {
                        warn!("chapter `{path}` is not present in the archive");
                        consts::CHAPTER_UNAVAILABLE.to_string()
                    }
                }
            })
            .collect()
    }
}

/// Value of `name` on `element`, unescaped. Undecodable values fall back
/// to lossy UTF-8 rather than failing the surrounding parse.
fn attr(element: &BytesStart<'_>, name: &str) -> Option<String> {
    let attribute = element.try_get_attribute(name).ok().flatten()?;
    Some(match attribute.unescape_value() {
        Ok(value) => value.into_owned(),
        Err(_) => String::from_utf8_lossy(&attribute.value).into_owned(),
    })
}

/// Collect the text content of `start` up to its matching end tag,
/// skipping nested markup.
fn read_text(
    reader: &mut Reader<&[u8]>,
    start: &BytesStart<'_>,
) -> Result<String, quick_xml::Error> {
    let mut value = String::new();
    loop {
        match reader.read_event()? {
            Event::Text(text) => {
                let text = text
                    .xml_content()
                    .unwrap_or_else(|_| String::from_utf8_lossy(&text).into_owned().into());
                push_trimmed(&mut value, &text);
            }
            Event::CData(cdata) => {
                let text: Cow<'_, str> = String::from_utf8_lossy(&cdata);
                push_trimmed(&mut value, &text);
            }
            Event::End(end) if end.name() == start.name() => break,
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(value)
}

fn push_trimmed(value: &mut String, text: &str) {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return;
    }
    if !value.is_empty() {
        value.push(' ');
    }
    value.push_str(trimmed);
}

/// Directory prefix of the package document, trailing slash included;
/// empty when it sits at the archive root.
fn base_path_of(opf_path: &str) -> String {
    uri::parent_dir(opf_path).to_string()
}
