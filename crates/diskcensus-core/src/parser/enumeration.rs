/// Disk numbers from the `list disk` capture.
use super::patterns::{numbered, row_tokens, PATTERNS};
use super::table::{find_tables, slice_fields};
use crate::model::DiskSummary;
use std::collections::BTreeSet;
use tracing::debug;

/// Number, Status, Size, Free, Dyn, Gpt.
const DISK_LIST_FIELDS: usize = 6;

/// Parse the disk listing into summaries, in listing order.
///
/// Divider-anchored tables are tried first. If none yields rows, any line
/// after a `<token> ###` header whose leading token is followed by a numeral
/// is read with whitespace tokens instead; the Dyn/Gpt markers cannot be
/// placed reliably that way and are left `false`. Duplicate numbers keep
/// their first row.
pub fn parse_disk_list(lines: &[String]) -> Vec<DiskSummary> {
    let mut seen = BTreeSet::new();

    let from_tables: Vec<DiskSummary> = find_tables(lines)
        .iter()
        .flat_map(|table| {
            table.rows.iter().filter_map(move |row| {
                let f = slice_fields(row, &table.spans, DISK_LIST_FIELDS);
                Some(DiskSummary {
                    number: numbered(&f[0])?,
                    status: f[1].clone(),
                    size: f[2].clone(),
                    free: f[3].clone(),
                    dynamic: f[4] == "*",
                    gpt: f[5] == "*",
                })
            })
        })
        .filter(|d| seen.insert(d.number))
        .collect();
    if !from_tables.is_empty() {
        return from_tables;
    }

    let Some(header) = lines.iter().position(|l| PATTERNS.table_header.is_match(l)) else {
        debug!("disk listing has no table header");
        return Vec::new();
    };
    let summaries: Vec<DiskSummary> = lines[header + 1..]
        .iter()
        .filter(|l| PATTERNS.numbered_line.is_match(l))
        .filter_map(|l| {
            let tokens = row_tokens(l);
            let number = numbered(tokens.first()?)?;
            let mut sizes = tokens.iter().skip(1).filter(|t| PATTERNS.size.is_match(t));
            Some(DiskSummary {
                number,
                status: tokens
                    .get(1)
                    .filter(|t| !PATTERNS.size.is_match(t))
                    .map(|t| t.to_string())
                    .unwrap_or_default(),
                size: sizes.next().map(|t| t.to_string()).unwrap_or_default(),
                free: sizes.next().map(|t| t.to_string()).unwrap_or_default(),
                dynamic: false,
                gpt: false,
            })
        })
        .filter(|d| seen.insert(d.number))
        .collect();
    debug!(disks = summaries.len(), "disk listing read by token fallback");
    summaries
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_fixture_lists_two_disks() {
        let capture = lines(include_str!("../../tests/fixtures/list_disk.txt"));
        let disks = parse_disk_list(&capture);
        assert_eq!(disks.len(), 2);
        assert_eq!(
            disks[0],
            DiskSummary {
                number: 0,
                status: "Online".into(),
                size: "953 GB".into(),
                free: "1024 KB".into(),
                dynamic: false,
                gpt: true,
            }
        );
        assert_eq!(disks[1].number, 1);
        assert_eq!(disks[1].free, "0 B");
    }

    #[test]
    fn test_token_fallback_without_table_rows() {
        // Header present but rows misaligned under a divider that is too short.
        let capture = lines(
            concat!(
                "  Disk ###  Status\n",
                "  ---\n",
                "  Disk 4    Online     20 GB      0 B\n",
                "  Disk 7    Offline    10 GB   10 GB",
            ),
        );
        let disks = parse_disk_list(&capture);
        assert_eq!(disks.iter().map(|d| d.number).collect::<Vec<_>>(), [4, 7]);
        assert_eq!(disks[0].size, "20 GB");
        assert_eq!(disks[1].status, "Offline");
        assert_eq!(disks[1].free, "10 GB");
    }

    #[test]
    fn test_no_header_means_no_disks() {
        let capture = lines("Microsoft DiskPart version 10.0\nThere are no fixed disks to show.");
        assert!(parse_disk_list(&capture).is_empty());
    }

    #[test]
    fn test_duplicate_numbers_are_dropped() {
        let capture = lines(
            "  Disk ###  Status\n  --------  ------\n  Disk 0    Online\n  Disk 0    Online",
        );
        assert_eq!(parse_disk_list(&capture).len(), 1);
    }
}
