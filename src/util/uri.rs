use std::borrow::Cow;

/// Directory prefix of `href`, **including** the trailing slash.
///
/// Empty when `href` has no directory component, so the result can always
/// be prepended to a sibling file name.
pub(crate) fn parent_dir(href: &str) -> &str {
    href.rfind('/').map_or("", |index| &href[..=index])
}

/// File-name component of `href` (everything after the last slash).
pub(crate) fn file_name(href: &str) -> &str {
    href.rsplit('/').next().unwrap_or(href)
}

pub(crate) fn decode(encoded: &str) -> Cow<'_, str> {
    percent_encoding::percent_decode_str(encoded).decode_utf8_lossy()
}

/// Resolve `relative` against the directory `base`, segment-wise:
/// `..` pops a segment, `.` and empty segments are dropped.
///
/// Operates on `/`-separated segments directly; archive paths are not
/// filesystem paths and must not pick up platform separator behavior.
pub(crate) fn resolve(base: &str, relative: &str) -> String {
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();

    for segment in relative.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
