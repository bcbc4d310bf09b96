use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Extensions scanned when the configuration does not name any.
pub const DEFAULT_EXTENSIONS: [&str; 5] = ["jpg", "jpeg", "tif", "tiff", "png"];

/// Checks if a directory entry is hidden (starts with '.').
fn is_hidden(entry: &DirEntry) -> bool {
    entry
        .file_name()
        .to_str()
        .is_some_and(|s| s.starts_with('.'))
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| extensions.iter().any(|allowed| allowed.eq_ignore_ascii_case(ext)))
}

/// Lists image files in `dir`, sorted by path.
///
/// Only direct children are listed unless `recursive` is set. Matching on `extensions` ignores
/// case. Unreadable entries abort the listing.
///
/// # Errors
///
/// Propagates I/O errors hit during traversal.
pub fn list_image_files(
    dir: &Path,
    recursive: bool,
    include_hidden: bool,
    extensions: &[String],
) -> Result<Vec<PathBuf>, walkdir::Error> {
    let mut walker = WalkDir::new(dir).sort_by_file_name();
    if !recursive {
        walker = walker.max_depth(1);
    }
    walker
        .into_iter()
        // The root itself may be ".", which would count as hidden.
        .filter_entry(|e| include_hidden || e.depth() == 0 || !is_hidden(e))
        .filter_map(|entry| match entry {
            Ok(entry) if entry.file_type().is_file() && has_extension(entry.path(), extensions) => {
                Some(Ok(entry.into_path()))
            }
            Ok(_) => None,
            Err(e) => Some(Err(e)),
        })
        .collect()
}
