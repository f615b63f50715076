// Well-known archive paths
pub(crate) const CONTAINER_PATH: &str = "META-INF/container.xml";
pub(crate) const NCX_FILENAME: &str = "toc.ncx";

// Media types
pub(crate) const XHTML_MIME: &str = "application/xhtml+xml";
pub(crate) const HTML_MIME: &str = "text/html";
pub(crate) const NCX_MIME: &str = "application/x-dtbncx+xml";

/// The kinds of content a spine entry may carry for end-user reading.
pub(crate) const READABLE_MIME: [&str; 2] = [XHTML_MIME, HTML_MIME];

// Attributes
pub(crate) const FULL_PATH: &str = "full-path";
pub(crate) const ID: &str = "id";
pub(crate) const HREF: &str = "href";
pub(crate) const MEDIA_TYPE: &str = "media-type";
pub(crate) const IDREF: &str = "idref";
pub(crate) const SRC: &str = "src";

// Elements, matched against local names
pub(crate) mod bytes {
    pub(crate) const ROOT_FILE: &[u8] = b"rootfile";
    pub(crate) const METADATA: &[u8] = b"metadata";
    pub(crate) const MANIFEST: &[u8] = b"manifest";
    pub(crate) const SPINE: &[u8] = b"spine";
    pub(crate) const ITEM: &[u8] = b"item";
    pub(crate) const ITEMREF: &[u8] = b"itemref";
    pub(crate) const TITLE: &[u8] = b"title";
    pub(crate) const CREATOR: &[u8] = b"creator";
    pub(crate) const NAV_POINT: &[u8] = b"navPoint";
    pub(crate) const NAV_LABEL: &[u8] = b"navLabel";
    pub(crate) const TEXT: &[u8] = b"text";
    pub(crate) const CONTENT: &[u8] = b"content";
}

/// Sentinel for absent metadata fields.
pub(crate) const UNKNOWN: &str = "unknown";

/// Placeholder chapter body when the spine target is missing or over the
/// configured cap.
pub(crate) const CHAPTER_UNAVAILABLE: &str = "<p>chapter content unavailable</p>";

/// Conventional asset directories producers scatter images into, tried
/// when direct resolution fails.
pub(crate) const ASSET_DIRS: [&str; 16] = [
    "Images/",
    "images/",
    "img/",
    "graphics/",
    "Graphics/",
    "OEBPS/Images/",
    "OEBPS/images/",
    "OEBPS/img/",
    "Text/Images/",
    "Text/images/",
    "epub/Images/",
    "epub/images/",
    "assets/",
    "Assets/",
    "media/",
    "Media/",
];

/// Extensions recognized by the last-resort file-name scan.
pub(crate) const IMAGE_EXTENSIONS: [&str; 9] = [
    "jpg", "jpeg", "png", "gif", "svg", "webp", "bmp", "tiff", "tif",
];

/// Media type for an asset path, by extension. Anything unrecognized is
/// reported as JPEG, the dominant format in practice.
pub fn media_type_for_path(path: &str) -> &'static str {
    let extension = path.rsplit_once('.').map(|(_, ext)| ext).unwrap_or("");
    if extension.eq_ignore_ascii_case("png") {
        "image/png"
    } else if extension.eq_ignore_ascii_case("gif") {
        "image/gif"
    } else if extension.eq_ignore_ascii_case("svg") {
        "image/svg+xml"
    } else if extension.eq_ignore_ascii_case("webp") {
        "image/webp"
    } else if extension.eq_ignore_ascii_case("bmp") {
        "image/bmp"
    } else if extension.eq_ignore_ascii_case("tiff") || extension.eq_ignore_ascii_case("tif") {
        "image/tiff"
    } else {
        "image/jpeg"
    }
}
