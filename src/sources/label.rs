//! Labels for scanned roots.
//!
//! A root is labelled by its drive letter (if any) and its top-level folder,
//! so `E:\Media\#Sorted` becomes `E_Media`. Parsing is done on the path text
//! with both `/` and `\` accepted as separators, which keeps labels identical
//! whichever platform computes them.

use std::path::Path;

use unicode_normalization::UnicodeNormalization;

/// Folder name used when a root has no folder component.
pub const ROOT_FOLDER_NAME: &str = "root";

/// Compute the label for a scanned root.
///
/// ```
/// use codesweep::sources::derive_root_label;
/// use std::path::Path;
///
/// assert_eq!(derive_root_label(Path::new(r"E:\Media\#Sorted")), "E_Media");
/// assert_eq!(derive_root_label(Path::new("/#Archive/films")), "Archive");
/// ```
#[must_use]
pub fn derive_root_label(root: &Path) -> String {
    let raw = root.to_string_lossy();
    let trimmed = raw.trim_end_matches(['/', '\\']);
    let (drive, rest) = split_drive(trimmed);

    let folder = rest
        .split(['/', '\\'])
        .map(|part| part.replace('#', ""))
        .find(|part| !part.is_empty() && part != "." && part != "..")
        .unwrap_or_else(|| ROOT_FOLDER_NAME.to_string());

    let label = match drive {
        Some(letter) => format!("{letter}_{folder}"),
        None => folder,
    };
    label.nfc().collect()
}

/// Split a leading `X:` drive designator from the path text.
fn split_drive(path: &str) -> (Option<char>, &str) {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
            (Some(letter.to_ascii_uppercase()), &path[2..])
        }
        _ => (None, path),
    }
}
