//! Folder-name classification.
//!
//! Media folders conventionally carry a trailing release year, e.g.
//! `Inception (2010)`. This module splits that marker off to produce a clean
//! title for metadata lookup, and knows which directory names are
//! housekeeping entries rather than media folders.

/// Title and optional year extracted from a folder name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    /// Folder name with the trailing year marker removed.
    pub title: String,
    /// Release year, if the folder name carried one.
    pub year: Option<u16>,
}

/// Reserved directory names that never count as media folders.
const RESERVED_NAMES: &[&str] = &[
    "System Volume Information",
    "$RECYCLE.BIN",
    "lost+found",
    "@eaDir",
];

/// Classify a folder name into a title and optional release year.
///
/// Only a *trailing* `(YYYY)` marker is stripped; bracketed segments earlier
/// in the name are part of the title. Names without a marker come back
/// unchanged with no year. Never fails.
pub fn classify(folder_name: &str) -> Classification {
    match split_trailing_year(folder_name) {
        Some((title, year)) => Classification {
            title: title.to_string(),
            year: Some(year),
        },
        None => Classification {
            title: folder_name.to_string(),
            year: None,
        },
    }
}

/// True for hidden (dot-prefixed) and reserved system directory names.
pub fn is_system_entry(name: &str) -> bool {
    name.starts_with('.') || RESERVED_NAMES.contains(&name)
}

/// Split `"Title (YYYY)"` into `("Title", YYYY)`.
///
/// The marker must sit at the end of the name (trailing whitespace ignored)
/// and contain exactly four ASCII digits.
fn split_trailing_year(name: &str) -> Option<(&str, u16)> {
    let rest = name.trim_end().strip_suffix(')')?;
    let open = rest.rfind('(')?;
    let digits = &rest[open + 1..];
    if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let year = digits.parse().ok()?;
    Some((rest[..open].trim_end(), year))
}
