//! Ordered fallback resolution of asset references.
//!
//! EPUB producers express image paths in wildly different ways: relative
//! to the chapter, relative to the package document, percent-encoded,
//! wrongly cased, or pointing at a directory layout that only resembles
//! the real one. Resolution is therefore an explicit ordered list of
//! candidate strategies; the first candidate present in the file table
//! wins.

use super::consts::{ASSET_DIRS, IMAGE_EXTENSIONS};
use crate::archive::FileTable;
use crate::util::uri;
use log::debug;

/// Resolve `reference` (as written inside chapter markup) to an archive
/// path. `chapter_path` is the full archive path of the chapter the
/// reference appeared in, when known.
pub(crate) fn resolve(
    reference: &str,
    base_path: &str,
    chapter_path: Option<&str>,
    files: &FileTable,
) -> Option<String> {
    for candidate in candidates(reference, base_path, chapter_path) {
        if files.contains(&candidate) {
            return Some(candidate);
        }
    }
    filename_scan(reference, files)
}

/// Candidate archive paths in resolution priority order.
fn candidates(reference: &str, base_path: &str, chapter_path: Option<&str>) -> Vec<String> {
    let mut paths = Vec::new();

    // 1–2. Relative to the chapter's directory, then the package base
    push_resolved(&mut paths, reference, base_path, chapter_path);

    // 3. Conventional asset directories, by bare file name
    let filename = uri::file_name(reference);
    for dir in ASSET_DIRS {
        paths.push(format!("{base_path}{dir}{filename}"));
        paths.push(format!("{dir}{filename}"));
    }

    // 4. The raw reference, taken as archive-root-relative
    paths.push(reference.trim_start_matches('/').to_string());

    // 5. Percent-decoded retry of the relative strategies
    let decoded = uri::decode(reference);
    if decoded != reference {
        push_resolved(&mut paths, &decoded, base_path, chapter_path);
    }

    // 6. Case-folded retries
    let lower = reference.to_lowercase();
    if lower != reference {
        push_resolved(&mut paths, &lower, base_path, chapter_path);
    }
    let upper = reference.to_uppercase();
    if upper != reference {
        push_resolved(&mut paths, &upper, base_path, chapter_path);
    }

    paths
}

fn push_resolved(
    paths: &mut Vec<String>,
    reference: &str,
    base_path: &str,
    chapter_path: Option<&str>,
) {
    if let Some(chapter) = chapter_path {
        paths.push(uri::resolve(uri::parent_dir(chapter), reference));
    }
    paths.push(uri::resolve(base_path, reference));
    paths.push(format!("{base_path}{reference}"));
}

/// 7. Last resort: accept any file with a recognized image extension
/// whose bare file name matches the reference's, case-insensitively. The
/// file table iterates in a fixed order, so the first match is stable.
fn filename_scan(reference: &str, files: &FileTable) -> Option<String> {
    let target = uri::file_name(reference);
    if target.is_empty() {
        return None;
    }
    let found = files
        .names()
        .find(|name| has_image_extension(name) && uri::file_name(name).eq_ignore_ascii_case(target))
        .map(str::to_string);
    if let Some(ref path) = found {
        debug!("asset `{reference}` matched `{path}` by file name scan");
    }
    found
}

fn has_image_extension(path: &str) -> bool {
    path.rsplit_once('.').is_some_and(|(_, extension)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| extension.eq_ignore_ascii_case(known))
    })
}
