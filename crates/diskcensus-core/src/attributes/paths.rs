/// Pure path helpers for resolving feature files to drive letters.
///
/// The registry and the tool report paths in several spellings
/// (`C:\x`, `\??\C:\x`, `\\?\C:\x`, `?:\x`, `%SystemRoot%\x`); everything
/// here normalises them without touching the filesystem.
use std::path::{Path, PathBuf};

/// Upper-case drive letter a path lives on, if it is a drive-letter path.
pub fn drive_letter_of(path: &Path) -> Option<char> {
    let text = path.to_string_lossy();
    let text = text
        .strip_prefix(r"\??\")
        .or_else(|| text.strip_prefix(r"\\?\"))
        .or_else(|| text.strip_prefix(r"\\.\"))
        .unwrap_or(&text);
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(letter), Some(':')) if letter.is_ascii_alphabetic() => {
            Some(letter.to_ascii_uppercase())
        }
        _ => None,
    }
}

/// Path part of a paging-file registry entry such as `C:\pagefile.sys 0 0`.
///
/// A `?:` drive means "the system drive" and is replaced by `system_drive`
/// when known. Returns `None` for blank entries.
pub fn parse_paging_entry(entry: &str, system_drive: Option<char>) -> Option<PathBuf> {
    let mut parts: Vec<&str> = entry.split_whitespace().collect();
    // Trailing initial/maximum sizes.
    for _ in 0..2 {
        if parts.len() > 1 && parts.last().is_some_and(|p| p.parse::<u64>().is_ok()) {
            parts.pop();
        }
    }
    let path = parts.join(" ");
    if path.is_empty() {
        return None;
    }
    match (path.strip_prefix("?:"), system_drive) {
        (Some(rest), Some(drive)) => Some(PathBuf::from(format!("{drive}:{rest}"))),
        _ => Some(PathBuf::from(path)),
    }
}

/// Expand `%NAME%` references using `lookup`. Unknown names are left as-is.
pub fn expand_env(text: &str, lookup: impl Fn(&str) -> Option<String>) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(start) = rest.find('%') {
        let after = &rest[start + 1..];
        let Some(len) = after.find('%') else {
            break;
        };
        let name = &after[..len];
        out.push_str(&rest[..start]);
        match lookup(name) {
            Some(value) if !name.is_empty() => out.push_str(&value),
            _ => {
                out.push('%');
                out.push_str(name);
                out.push('%');
            }
        }
        rest = &after[len + 1..];
    }
    out.push_str(rest);
    out
}
