use super::{PackageParser, attr, base_path_of, read_text};
use crate::epub::Metadata;
use crate::epub::consts::{self, bytes};
use crate::epub::errors::{EpubError, EpubResult};
use crate::epub::manifest::{Manifest, ManifestItem};
use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};

/// Everything a package document contributes to the parse.
pub(super) struct OpfData {
    pub(super) metadata: Metadata,
    pub(super) manifest: Manifest,
    pub(super) spine: Vec<String>,
    pub(super) base_path: String,
}

/// The package-document section the event stream is currently inside.
#[derive(PartialEq, Eq, Clone, Copy)]
enum Section {
    None,
    Metadata,
    Manifest,
    Spine,
}

impl PackageParser<'_> {
    /// Parse the package document: metadata with sentinel defaults, the
    /// manifest in document order, and the spine filtered to readable
    /// content documents.
    pub(super) fn parse_opf(&self, opf_path: &str) -> EpubResult<OpfData> {
        let data = self.files.get(opf_path).ok_or_else(|| EpubError::MissingOpf {
            path: opf_path.to_string(),
        })?;
        let invalid = |source| EpubError::InvalidOpf {
            path: opf_path.to_string(),
            source,
        };

        let mut reader = Reader::from_reader(data);
        let mut section = Section::None;
        let mut title: Option<String> = None;
        let mut creator: Option<String> = None;
        let mut manifest = Manifest::default();
        let mut spine = Vec::new();

        loop {
            match reader.read_event().map_err(invalid)? {
                Event::Start(el) => match el.local_name().as_ref() {
                    bytes::METADATA => section = Section::Metadata,
                    bytes::MANIFEST => section = Section::Manifest,
                    bytes::SPINE => section = Section::Spine,
                    bytes::TITLE if section == Section::Metadata && title.is_none() => {
                        title = non_empty(read_text(&mut reader, &el).map_err(invalid)?);
                    }
                    bytes::CREATOR if section == Section::Metadata && creator.is_none() => {
                        creator = non_empty(read_text(&mut reader, &el).map_err(invalid)?);
                    }
                    bytes::ITEM if section == Section::Manifest => push_item(&mut manifest, &el),
                    bytes::ITEMREF if section == Section::Spine => {
                        push_itemref(&mut spine, &manifest, &el);
                    }
                    _ => {}
                },
                Event::Empty(el) => match el.local_name().as_ref() {
                    bytes::ITEM if section == Section::Manifest => push_item(&mut manifest, &el),
                    bytes::ITEMREF if section == Section::Spine => {
                        push_itemref(&mut spine, &manifest, &el);
                    }
                    _ => {}
                },
                Event::End(el) => match el.local_name().as_ref() {
                    bytes::METADATA | bytes::MANIFEST | bytes::SPINE => section = Section::None,
                    _ => {}
                },
                Event::Eof => break,
                _ => {}
            }
        }

        if spine.is_empty() {
            return Err(EpubError::NoReadableSpine {
                path: opf_path.to_string(),
            });
        }

        Ok(OpfData {
            metadata: Metadata::new(
                title.unwrap_or_else(|| consts::UNKNOWN.to_string()),
                creator.unwrap_or_else(|| consts::UNKNOWN.to_string()),
            ),
            manifest,
            spine,
            base_path: base_path_of(opf_path),
        })
    }
}

fn non_empty(text: String) -> Option<String> {
    (!text.is_empty()).then_some(text)
}

/// Manifest items need both an id and an href to be addressable; anything
/// else is dropped.
fn push_item(manifest: &mut Manifest, el: &BytesStart<'_>) {
    let (Some(id), Some(href)) = (attr(el, consts::ID), attr(el, consts::HREF)) else {
        return;
    };
    let media_type = attr(el, consts::MEDIA_TYPE).unwrap_or_default();
    manifest.push(ManifestItem::new(id, href, media_type));
}

/// Only itemrefs pointing at readable content documents join the spine.
fn push_itemref(spine: &mut Vec<String>, manifest: &Manifest, el: &BytesStart<'_>) {
    let Some(idref) = attr(el, consts::IDREF) else {
        return;
    };
    let readable = manifest
        .get(&idref)
        .is_some_and(|item| consts::READABLE_MIME.contains(&item.media_type()));
    if readable {
        spine.push(idref);
    }
}
