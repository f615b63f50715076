use super::PackageParser;
use super::attr;
use crate::epub::consts::{self, bytes};
use crate::epub::errors::{EpubError, EpubResult};
use quick_xml::Reader;
use quick_xml::events::Event;

impl PackageParser<'_> {
    /// Locate the package document through `META-INF/container.xml`.
    ///
    /// Multiple `rootfile` elements are possible; the first one carrying a
    /// `full-path` attribute is the default rendition and wins. A missing
    /// container file, a container naming no package document, and a
    /// container too broken to reach one are all the same failure to the
    /// caller.
    pub(super) fn locate_opf(&self) -> EpubResult<String> {
        let missing = || EpubError::MissingContainer {
            path: consts::CONTAINER_PATH.to_string(),
        };
        let data = self.files.get(consts::CONTAINER_PATH).ok_or_else(missing)?;

        let mut reader = Reader::from_reader(data);
        loop {
            match reader.read_event() {
                Ok(Event::Start(el) | Event::Empty(el))
                    if el.local_name().as_ref() == bytes::ROOT_FILE =>
                {
                    if let Some(path) = attr(&el, consts::FULL_PATH) {
                        return Ok(path.trim_start_matches('/').to_string());
                    }
                }
                Ok(Event::Eof) | Err(_) => return Err(missing()),
                _ => {}
            }
        }
    }
}
