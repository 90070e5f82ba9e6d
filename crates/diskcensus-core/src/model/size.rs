/// Size normalisation: converting between the tool's rendered sizes
/// ("953 GB") and byte counts.
///
/// All units are binary multiples (KB = 1024) labelled with the short forms
/// the tool itself prints. Floating point is only used at the formatting
/// boundary and when scaling a fractional input.
use regex::Regex;
use std::sync::LazyLock;

const KB: u64 = 1024;
const MB: u64 = KB * 1024;
const GB: u64 = MB * 1024;
const TB: u64 = GB * 1024;

static SIZE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*(\d+)(?:\.(\d+))?\s*(B|KB|MB|GB|TB)\s*$")
        .expect("static regex must compile")
});

/// Parse a rendered size such as `"953 GB"` or `"1.5 TB"` into bytes.
///
/// Returns `None` for anything that is not `<number>[.<fraction>] <unit>`.
/// That is an expected outcome for blank or sentinel size cells, not an error.
pub fn to_bytes(text: &str) -> Option<u64> {
    let caps = SIZE_TOKEN.captures(text)?;
    let whole: u64 = caps[1].parse().ok()?;
    let multiplier = match caps[3].to_ascii_uppercase().as_str() {
        "B" => 1,
        "KB" => KB,
        "MB" => MB,
        "GB" => GB,
        "TB" => TB,
        _ => return None,
    };

    let mut bytes = whole.checked_mul(multiplier)?;
    if let Some(fraction) = caps.get(2) {
        let digits = fraction.as_str();
        let value: f64 = format!("0.{digits}").parse().ok()?;
        bytes = bytes.checked_add((value * multiplier as f64).round() as u64)?;
    }
    Some(bytes)
}

/// Format a byte count with the largest unit in which the value is at least 1.
///
/// Bytes are printed as an integer; every other unit gets exactly one
/// fractional digit. This is lossy: the result need not parse back to the
/// same byte count.
pub fn to_human(bytes: u64) -> String {
    let b = bytes as f64;
    if bytes < KB {
        format!("{bytes} B")
    } else if bytes < MB {
        format!("{:.1} KB", b / KB as f64)
    } else if bytes < GB {
        format!("{:.1} MB", b / MB as f64)
    } else if bytes < TB {
        format!("{:.1} GB", b / GB as f64)
    } else {
        format!("{:.1} TB", b / TB as f64)
    }
}
