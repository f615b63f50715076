use super::opf::OpfData;
use super::{PackageParser, attr, read_text};
use crate::epub::consts::{self, bytes};
use crate::epub::toc::TocEntry;
use crate::util::uri;
use log::{debug, warn};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

impl PackageParser<'_> {
    /// Produce the table of contents: from the NCX when one is present
    /// and parsable, otherwise synthesized one entry per spine item.
    /// This step never fails a load.
    pub(super) fn parse_toc(&self, opf: &OpfData) -> Vec<TocEntry> {
        if let Some(data) = self.find_ncx(opf) {
            match parse_ncx(data, opf) {
                Ok(entries) => return entries,
                Err(error) => {
                    warn!("table of contents unusable ({error}); synthesizing from spine");
                }
            }
        } else {
            debug!("no ncx in archive; synthesizing table of contents from spine");
        }
        synthesize_toc(opf)
    }

    /// The conventional `toc.ncx` beside the package document wins; then
    /// the manifest is searched for an NCX declaration, in document order.
    fn find_ncx(&self, opf: &OpfData) -> Option<&[u8]> {
        let conventional = format!("{}{}", opf.base_path, consts::NCX_FILENAME);
        if let Some(data) = self.files.get(&conventional) {
            return Some(data);
        }
        opf.manifest
            .iter()
            .find(|item| item.media_type() == consts::NCX_MIME)
            .and_then(|item| self.files.get(&format!("{}{}", opf.base_path, item.href())))
    }
}

struct Draft {
    title: Option<String>,
    src: Option<String>,
}

/// Flatten the NCX nav points, in document order of their start tags.
/// Each entry resolves to the first spine item whose href is a substring
/// of the entry's source, falling back to the entry's own ordinal.
fn parse_ncx(data: &[u8], opf: &OpfData) -> Result<Vec<TocEntry>, quick_xml::Error> {
    let mut reader = Reader::from_reader(data);
    let mut drafts: Vec<Draft> = Vec::new();
    // Indices of the nav points still open, innermost last
    let mut open: Vec<usize> = Vec::new();
    let mut in_label = false;

    loop {
        match reader.read_event()? {
            Event::Start(el) => match el.local_name().as_ref() {
                bytes::NAV_POINT => {
                    drafts.push(Draft {
                        title: None,
                        src: None,
                    });
                    open.push(drafts.len() - 1);
                }
                bytes::NAV_LABEL => in_label = true,
                bytes::TEXT if in_label => {
                    let text = read_text(&mut reader, &el)?;
                    if let Some(&index) = open.last() {
                        let draft = &mut drafts[index];
                        if draft.title.is_none() && !text.is_empty() {
                            draft.title = Some(text);
                        }
                    }
                }
                bytes::CONTENT => apply_src(&mut drafts, &open, &el),
                _ => {}
            },
            Event::Empty(el) if el.local_name().as_ref() == bytes::CONTENT => {
                apply_src(&mut drafts, &open, &el);
            }
            Event::End(el) => match el.local_name().as_ref() {
                bytes::NAV_POINT => {
                    open.pop();
                }
                bytes::NAV_LABEL => in_label = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(drafts
        .into_iter()
        .enumerate()
        .map(|(index, draft)| {
            let title = draft
                .title
                .unwrap_or_else(|| format!("Chapter {}", index + 1));
            let src = draft.src.unwrap_or_default();
            let spine_index = opf
                .spine
                .iter()
                .position(|id| {
                    opf.manifest
                        .get(id)
                        .is_some_and(|item| src.contains(item.href()))
                })
                .unwrap_or(index);
            TocEntry::new(title, src, spine_index)
        })
        .collect())
}

fn apply_src(drafts: &mut [Draft], open: &[usize], el: &BytesStart<'_>) {
    let (Some(&index), Some(src)) = (open.last(), attr(el, consts::SRC)) else {
        return;
    };
    let draft = &mut drafts[index];
    if draft.src.is_none() {
        draft.src = Some(src);
    }
}

/// One entry per spine item, titled from the href's file name.
fn synthesize_toc(opf: &OpfData) -> Vec<TocEntry> {
    opf.spine
        .iter()
        .enumerate()
        .map(|(index, id)| {
            let href = opf.manifest.get(id).map(|item| item.href()).unwrap_or("");
            let title =
                title_from_href(href).unwrap_or_else(|| format!("Chapter {}", index + 1));
            TocEntry::new(title, href.to_string(), index)
        })
        .collect()
}

/// Derive a display title from a file name: extension stripped, `-`/`_`
/// replaced by spaces, each word capitalized. `index` and empty names
/// carry no information and yield `None`.
fn title_from_href(href: &str) -> Option<String> {
    let filename = uri::file_name(href);
    let stem = filename
        .rsplit_once('.')
        .map(|(stem, _)| stem)
        .unwrap_or(filename);
    if stem.is_empty() || stem == "index" {
        return None;
    }

    let words: Vec<String> = stem
        .split(['-', '_'])
        .filter(|word| !word.is_empty())
        .map(capitalize)
        .collect();
    (!words.is_empty()).then(|| words.join(" "))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::title_from_href;

    #[test]
    fn test_title_from_href() {
        #[rustfmt::skip]
        let expected = [
            (Some("Chapter One"), "Text/chapter-one.xhtml"),
            (Some("Front Matter 01"), "front_matter-01.html"),
            (Some("Prologue"), "prologue.xhtml"),
            (Some("Ch1"), "ch1.xhtml"),
            (None, "index.xhtml"),
            (None, ""),
            (None, "Text/.xhtml"),
        ];

        for (expect, href) in expected {
            assert_eq!(expect.map(String::from), title_from_href(href), "{href}");
        }
    }
}
