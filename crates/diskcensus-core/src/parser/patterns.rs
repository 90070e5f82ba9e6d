/// Shared regexes for the tool's output.
use regex::Regex;
use std::sync::LazyLock;

pub(super) static PATTERNS: LazyLock<OutputPatterns> = LazyLock::new(OutputPatterns::new);

pub(super) struct OutputPatterns {
    /// `Volume ###`, `Disk ###`, `Partition ###` in any language.
    pub table_header: Regex,
    /// Dashes and spaces only, at least one dash.
    pub divider: Regex,
    /// A sliced numbering cell: `Volume 3`, `* Disk 0`, or a bare `3`.
    pub numbered_field: Regex,
    /// A raw line whose leading token is followed by a numeral.
    pub numbered_line: Regex,
    /// Two or more whitespace characters: an approximate column break.
    pub column_break: Regex,
    /// `key : value` property lines.
    pub property: Regex,
    /// "Disk 3 is now the selected disk."
    pub selected_disk: Regex,
    pub drive_letter: Regex,
    pub size: Regex,
}

impl OutputPatterns {
    fn new() -> Self {
        // Compile-time constant patterns; a failure here is a programmer error.
        let compile = |pattern: &str| Regex::new(pattern).expect("static regex must compile");
        Self {
            table_header: compile(r"^\s*\S+\s+###(?:\s|$)"),
            divider: compile(r"^[ \t]*-[- \t]*$"),
            numbered_field: compile(r"^(?:\*\s*)?(?:\S+\s+)?(\d+)$"),
            numbered_line: compile(r"^\s*(?:\*\s*)?\S+\s+(\d+)(?:\s|$)"),
            column_break: compile(r"\s{2,}"),
            property: compile(r"^\s*([^:]*?)\s*:\s*(.*?)\s*$"),
            selected_disk: compile(r"(?i)^\s*disk\s+(\d+)\s+is\s+now\s+(?:the\s+)?selected"),
            drive_letter: compile(r"^[A-Za-z]$"),
            size: compile(r"(?i)^\d+(?:\.\d+)?\s*(?:B|KB|MB|GB|TB)$"),
        }
    }
}

/// Split a raw row on column breaks, dropping a leading `*` selection mark.
pub(super) fn row_tokens(line: &str) -> Vec<&str> {
    let trimmed = line.trim();
    let trimmed = trimmed.strip_prefix('*').map_or(trimmed, str::trim_start);
    PATTERNS
        .column_break
        .split(trimmed)
        .filter(|t| !t.is_empty())
        .collect()
}

/// The number inside a numbering cell, if the cell is one.
pub(super) fn numbered(field: &str) -> Option<u32> {
    PATTERNS
        .numbered_field
        .captures(field.trim())
        .and_then(|c| c[1].parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_marker_is_language_independent() {
        assert!(PATTERNS.table_header.is_match("  Volume ###  Ltr  Label"));
        assert!(PATTERNS.table_header.is_match("  Datenträger ###  Status"));
        assert!(PATTERNS.table_header.is_match("  Partition ###"));
        assert!(!PATTERNS.table_header.is_match("  Volume 3     C"));
        assert!(!PATTERNS.table_header.is_match("###"));
    }

    #[test]
    fn test_divider() {
        assert!(PATTERNS.divider.is_match("  ----------  ---  -----"));
        assert!(!PATTERNS.divider.is_match("  Volume ###"));
        assert!(!PATTERNS.divider.is_match("   "));
    }

    #[test]
    fn test_numbered_field() {
        assert_eq!(numbered("Volume 3"), Some(3));
        assert_eq!(numbered("* Disk 0"), Some(0));
        assert_eq!(numbered("12"), Some(12));
        assert_eq!(numbered("Volume"), None);
        assert_eq!(numbered("Volume ###"), None);
        assert_eq!(numbered(""), None);
    }

    #[test]
    fn test_selected_disk_marker() {
        let caps = PATTERNS
            .selected_disk
            .captures("Disk 1 is now the selected disk.")
            .unwrap();
        assert_eq!(&caps[1], "1");
        assert!(PATTERNS.selected_disk.is_match("disk 12 is now selected"));
        assert!(!PATTERNS.selected_disk.is_match("There is no disk selected."));
    }

    #[test]
    fn test_row_tokens_collapse_column_gaps() {
        assert_eq!(
            row_tokens("  Volume 1     D   Data Disk    NTFS   Partition    931 GB  Healthy"),
            ["Volume 1", "D", "Data Disk", "NTFS", "Partition", "931 GB", "Healthy"]
        );
        assert_eq!(row_tokens("* Disk 0    Online"), ["Disk 0", "Online"]);
    }
}
