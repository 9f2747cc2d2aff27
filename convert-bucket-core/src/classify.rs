//! Pure helpers deciding whether and how an object key is processed.
//!
//! Paths are object-store keys, always `/`-separated, so these work on `&str`
//! rather than `std::path` (whose separator depends on the host).

use serde::Serialize;

/// Extensions converted to PDF.
pub const DOCUMENT_EXTENSIONS: [&str; 6] = [".doc", ".docx", ".ppt", ".pptx", ".xls", ".xlsx"];
/// Extensions compressed as images.
pub const IMAGE_EXTENSIONS: [&str; 4] = [".jpg", ".png", ".tiff", ".gif"];

/// File category, derived from the key's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Category {
    Document,
    Image,
    Unrecognized,
}

/// An object key together with its category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFile {
    pub path: String,
    pub category: Category,
}

impl ClassifiedFile {
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        let category = classify(&path);
        Self { path, category }
    }
}

/// Case-sensitive classification by extension.
pub fn classify(object_key: &str) -> Category {
    let ext = extension(object_key);
    if DOCUMENT_EXTENSIONS.contains(&ext) {
        Category::Document
    } else if IMAGE_EXTENSIONS.contains(&ext) {
        Category::Image
    } else {
        Category::Unrecognized
    }
}

/// True iff the key's parent directory has a segment exactly equal to `source_folder`.
pub fn should_process(object_key: &str, source_folder: &str) -> bool {
    parent_dir(object_key)
        .split('/')
        .any(|segment| segment == source_folder)
}

/// The compression endpoint only accepts JPEG input; `.jpg` keys skip the intermediate hop.
pub fn is_jpeg(object_key: &str) -> bool {
    extension(object_key) == ".jpg"
}

/// Key under which converted output is stored.
///
/// The first segment of the parent directory equal to `source_folder` is swapped for
/// `destination_folder`; the file name is the one reported by the conversion service.
pub fn destination_key(
    object_key: &str,
    source_folder: &str,
    destination_folder: &str,
    file_name: &str,
) -> String {
    let mut replaced = false;
    let dir = parent_dir(object_key)
        .split('/')
        .map(|segment| {
            if !replaced && segment == source_folder {
                replaced = true;
                destination_folder
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/");
    format!("{dir}/{file_name}")
}

/// Directory part of a key: `a/b/c.txt` -> `a/b`, `c.txt` -> `.`.
pub fn parent_dir(object_key: &str) -> &str {
    let trimmed = object_key.trim_end_matches('/');
    if trimmed.is_empty() {
        return if object_key.starts_with('/') { "/" } else { "." };
    }
    match trimmed.rfind('/') {
        Some(0) => "/",
        Some(idx) => &trimmed[..idx],
        None => ".",
    }
}

/// Extension including the leading dot, or `""`. Dotfiles such as `.env` have none.
pub fn extension(object_key: &str) -> &str {
    let trimmed = object_key.trim_end_matches('/');
    let file_name = trimmed.rsplit('/').next().unwrap_or(trimmed);
    match file_name.rfind('.') {
        None | Some(0) => "",
        Some(idx) => &file_name[idx..],
    }
}
