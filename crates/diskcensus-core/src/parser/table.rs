/// Fixed-width table tokenizer.
///
/// Column boundaries come from the divider line under a header when there is
/// one: every maximal dash run is a column. That anchors parsing on the
/// tool's own declared widths rather than on header words. Without a divider
/// the header's non-space runs are used instead, which is weaker because a
/// value containing a space can straddle two columns.
///
/// Offsets and lengths are in characters, not bytes, so labels with
/// non-ASCII text slice safely.
use super::patterns::{numbered, PATTERNS};

/// A column's position within a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span {
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(start: usize, len: usize) -> Self {
        Self { start, len }
    }
}

/// Compute column spans for `header`, preferring `divider` when it has dashes.
///
/// In the header fallback the numbering marker `###` stays attached to the
/// token before it, and each span is widened up to the next column's start,
/// since header words are usually narrower than their values.
///
/// Returns an empty list only for a blank header (or blank header and no
/// usable divider).
pub fn compute_spans(header: &str, divider: Option<&str>) -> Vec<Span> {
    if let Some(divider) = divider.filter(|d| d.contains('-')) {
        return runs(divider, |c| c == '-');
    }

    let chars: Vec<char> = header.chars().collect();
    let mut merged: Vec<Span> = Vec::new();
    for span in runs(header, |c| !c.is_whitespace()) {
        let text: String = chars[span.start..span.start + span.len].iter().collect();
        match merged.last_mut() {
            Some(prev) if text == "###" => prev.len = span.start + span.len - prev.start,
            _ => merged.push(span),
        }
    }

    let total = chars.len();
    for i in 0..merged.len() {
        let end = merged.get(i + 1).map_or(total, |next| next.start);
        merged[i].len = end - merged[i].start;
    }
    merged
}

/// Maximal runs of characters satisfying `pred`, as spans.
fn runs(line: &str, pred: impl Fn(char) -> bool) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut start: Option<usize> = None;
    let mut count = 0;
    for (i, c) in line.chars().enumerate() {
        count = i + 1;
        match (pred(c), start) {
            (true, None) => start = Some(i),
            (false, Some(s)) => {
                spans.push(Span::new(s, i - s));
                start = None;
            }
            _ => {}
        }
    }
    if let Some(s) = start {
        spans.push(Span::new(s, count - s));
    }
    spans
}

/// Slice `line` into exactly `count` trimmed fields.
///
/// Field `i` is taken from span `i`; the last span runs to the end of the
/// line so an over-long trailing value is not cut. Fields with no span, or
/// whose span starts past the end of the line, are empty.
pub fn slice_fields(line: &str, spans: &[Span], count: usize) -> Vec<String> {
    let chars: Vec<char> = line.chars().collect();
    (0..count)
        .map(|i| {
            let Some(span) = spans.get(i) else {
                return String::new();
            };
            if span.start >= chars.len() {
                return String::new();
            }
            let end = if i + 1 == spans.len() {
                chars.len()
            } else {
                (span.start + span.len).min(chars.len())
            };
            chars[span.start..end]
                .iter()
                .collect::<String>()
                .trim()
                .to_owned()
        })
        .collect()
}

/// One `<token> ###` table found in a block of lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table<'a> {
    /// Index of the header line within the block.
    pub header_index: usize,
    pub has_divider: bool,
    pub spans: Vec<Span>,
    /// Consecutive data rows whose numbering cell holds a number.
    pub rows: Vec<&'a str>,
}

impl Table<'_> {
    pub fn columns(&self) -> usize {
        self.spans.len()
    }
}

/// Every table in `lines`, in order.
///
/// Each header match starts a new table; a block may hold several (for
/// example a volume table followed by a partition table). Rows are consumed
/// until the first line whose first field is not a numbering cell.
pub fn find_tables(lines: &[String]) -> Vec<Table<'_>> {
    let mut tables = Vec::new();
    for (i, line) in lines.iter().enumerate() {
        if !PATTERNS.table_header.is_match(line) {
            continue;
        }

        let divider = lines
            .get(i + 1)
            .map(String::as_str)
            .filter(|d| PATTERNS.divider.is_match(d));
        let spans = compute_spans(line, divider);
        let first_row = i + 1 + usize::from(divider.is_some());

        let rows = lines
            .iter()
            .skip(first_row)
            .map(String::as_str)
            .take_while(|row| {
                slice_fields(row, &spans, 1)
                    .first()
                    .is_some_and(|cell| numbered(cell).is_some())
            })
            .collect();

        tables.push(Table {
            header_index: i,
            has_divider: divider.is_some(),
            spans,
            rows,
        });
    }
    tables
}

#[cfg(test)]
mod tests {
    use super::*;

    const HEADER: &str = "Volume ###  Ltr  Label  Fs  Type  Size  Status  Info";
    const DIVIDER: &str = "----------  ---  -----  --  ----  ----  ------  ----";

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_divider_spans_follow_dash_runs() {
        let spans = compute_spans(HEADER, Some(DIVIDER));
        assert_eq!(
            spans,
            [
                Span::new(0, 10),
                Span::new(12, 3),
                Span::new(17, 5),
                Span::new(24, 2),
                Span::new(28, 4),
                Span::new(34, 4),
                Span::new(40, 6),
                Span::new(48, 4),
            ]
        );
    }

    #[test]
    fn test_divider_row_slices_into_eight_fields() {
        let spans = compute_spans(HEADER, Some(DIVIDER));
        let row = "Volume 1    C    OS     NT  Part  9 GB  Health  Boot";
        let fields = slice_fields(row, &spans, 8);
        assert_eq!(
            fields,
            ["Volume 1", "C", "OS", "NT", "Part", "9 GB", "Health", "Boot"]
        );
        for pair in spans.windows(2) {
            assert!(pair[0].start + pair[0].len <= pair[1].start);
        }
    }

    #[test]
    fn test_divider_without_dashes_falls_back_to_header() {
        let spans = compute_spans("Volume ###  Ltr", Some("   "));
        assert_eq!(spans, [Span::new(0, 12), Span::new(12, 3)]);
    }

    /// Without a divider, `###` stays in the numbering column and spans widen
    /// to the next column.
    #[test]
    fn test_header_fallback_keeps_marker_with_token() {
        let spans = compute_spans("  Partition ###  Type      Size", None);
        assert_eq!(
            spans,
            [Span::new(2, 15), Span::new(17, 10), Span::new(27, 4)]
        );
    }

    /// `Volume ###` is one numbering column, not two.
    #[test]
    fn test_header_fallback_numbering_marker_is_one_column() {
        assert_eq!(
            compute_spans("Volume ###  Ltr", None),
            [Span::new(0, 12), Span::new(12, 3)]
        );
    }

    #[test]
    fn test_empty_header_has_no_spans() {
        assert!(compute_spans("", None).is_empty());
        assert!(compute_spans("    ", None).is_empty());
        assert_eq!(compute_spans("Info", None).len(), 1);
    }

    #[test]
    fn test_slice_out_of_range_fields_are_empty() {
        let spans = [Span::new(0, 4), Span::new(6, 4)];
        assert_eq!(slice_fields("abcd", &spans, 3), ["abcd", "", ""]);
        assert_eq!(slice_fields("", &spans, 2), ["", ""]);
    }

    #[test]
    fn test_last_field_runs_to_end_of_line() {
        let spans = [Span::new(0, 2), Span::new(3, 2)];
        assert_eq!(slice_fields("ab cdefg", &spans, 2), ["ab", "cdefg"]);
    }

    /// Non-ASCII labels do not shift later columns.
    #[test]
    fn test_slicing_is_character_based() {
        let spans = [Span::new(0, 7), Span::new(8, 4)];
        assert_eq!(slice_fields("Données NTFS", &spans, 2), ["Données", "NTFS"]);
    }

    #[test]
    fn test_find_tables_stops_at_first_non_numbered_row() {
        let block = lines(
            concat!(
                "  Volume ###  Ltr  Label\n",
                "  ----------  ---  -----\n",
                "  Volume 0     C    OS\n",
                "  Volume 1     D    Data\n",
                "\n",
                "  Volume 9     E    Late",
            ),
        );
        let tables = find_tables(&block);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].has_divider);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].columns(), 3);
    }

    #[test]
    fn test_find_tables_reports_every_header() {
        let block = lines(
            concat!(
                "  Volume ###  Ltr\n",
                "  ----------  ---\n",
                "  Volume 0     C\n",
                "\n",
                "  Partition ###  Type\n",
                "  -------------  ----\n",
                "  Partition 1    Primary\n",
                "  Partition 2    Recovery",
            ),
        );
        let tables = find_tables(&block);
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows, ["  Volume 0     C"]);
        assert_eq!(tables[1].rows.len(), 2);
        assert_eq!(tables[1].header_index, 4);
    }

    #[test]
    fn test_find_tables_without_divider() {
        let block = lines("  Disk ###  Status\n  Disk 0    Online\n  Disk 1    Offline");
        let tables = find_tables(&block);
        assert_eq!(tables.len(), 1);
        assert!(!tables[0].has_divider);
        assert_eq!(tables[0].rows.len(), 2);
    }
}
