/// Tiered volume row parser.
///
/// Each tier is a pure function over a disk block with the same contract,
/// tried in fixed order; the first tier that yields at least one record wins:
///
/// 1. **Span**: slice volume-table rows at the divider's column spans.
/// 2. **Token**: collapse column gaps and classify each token against a
///    closed vocabulary. Survives shifted columns, but the vocabulary is
///    English-only.
/// 3. **Partition**: synthesise `RAW` volumes from the partition table so
///    unformatted disks still show up.
///
/// When every tier comes back empty the disk gets a single sentinel record,
/// so a disk never has an empty volume list.
use super::patterns::{numbered, row_tokens, PATTERNS};
use super::table::{find_tables, slice_fields, Table};
use crate::model::{VolumeRecord, UNFORMATTED_INFO};
use tracing::debug;

/// Volume, Ltr, Label, Fs, Type, Size, Status, Info.
pub const VOLUME_FIELDS: usize = 8;

/// Partition, Type, Size, Offset.
pub const PARTITION_FIELDS: usize = 4;

/// Tables narrower than this are partition listings, not volume tables.
pub const MIN_VOLUME_COLUMNS: usize = 5;

/// Filesystem tag forced onto partition-derived volumes.
pub const RAW_FILESYSTEM: &str = "RAW";

/// Type tag forced onto partition-derived volumes.
pub const PARTITION_KIND: &str = "Partition";

type Tier = fn(&[String]) -> Vec<VolumeRecord>;

const TIERS: [(&str, Tier); 3] = [
    ("span", parse_span_rows),
    ("token", parse_token_rows),
    ("partition", parse_partition_rows),
];

// Tier-2 vocabulary. English tags only. "Unknown" is left out of the
// statuses because it is also a partition type.
const FILESYSTEMS: &[&str] = &[
    "NTFS", "FAT", "FAT32", "exFAT", "ReFS", "RAW", "UDF", "CDFS", "CSVFS",
];
const VOLUME_KINDS: &[&str] = &[
    "Partition", "Removable", "Simple", "Mirror", "Stripe", "RAID-5", "Spanned", "DVD-ROM",
    "CD-ROM",
];
const STATUSES: &[&str] = &[
    "Healthy", "No Media", "Failed", "Failed Rd", "Rebuild", "At Risk", "Offline", "Formatting",
    "Unusable",
];
const INFO_TAGS: &[&str] = &["System", "Boot", "Pagefile", "Crashdump", "Hibernate", "Hidden"];

/// Parse a disk block into volume records. Never returns an empty vec.
pub fn parse_volumes(block: &[String]) -> Vec<VolumeRecord> {
    for (name, tier) in TIERS {
        let rows = tier(block);
        if !rows.is_empty() {
            debug!(tier = name, rows = rows.len(), "volume rows parsed");
            return rows;
        }
    }
    debug!(lines = block.len(), "no tier produced volume rows; using sentinel");
    vec![VolumeRecord::sentinel()]
}

fn is_volume_table(table: &Table<'_>) -> bool {
    table.columns() >= MIN_VOLUME_COLUMNS
}

/// Tier 1: positional slicing of every volume-shaped table.
pub fn parse_span_rows(block: &[String]) -> Vec<VolumeRecord> {
    find_tables(block)
        .iter()
        .filter(|t| is_volume_table(t))
        .flat_map(|table| {
            table.rows.iter().map(move |row| {
                let mut f = slice_fields(row, &table.spans, VOLUME_FIELDS).into_iter();
                let mut next = || f.next().unwrap_or_default();
                VolumeRecord {
                    volume: next(),
                    letter: next(),
                    label: next(),
                    filesystem: next(),
                    kind: next(),
                    size: next(),
                    status: next(),
                    info: next(),
                    ..VolumeRecord::default()
                }
            })
        })
        .collect()
}

/// Which volume field a free-standing token belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TokenClass {
    Letter,
    Filesystem,
    Kind,
    Size,
    Status,
    Info,
}

fn in_vocabulary(token: &str, vocabulary: &[&str]) -> bool {
    vocabulary.iter().any(|v| v.eq_ignore_ascii_case(token))
}

fn classify(token: &str) -> Option<TokenClass> {
    if PATTERNS.drive_letter.is_match(token) {
        Some(TokenClass::Letter)
    } else if in_vocabulary(token, FILESYSTEMS) {
        Some(TokenClass::Filesystem)
    } else if in_vocabulary(token, VOLUME_KINDS) {
        Some(TokenClass::Kind)
    } else if PATTERNS.size.is_match(token) {
        Some(TokenClass::Size)
    } else if in_vocabulary(token, STATUSES) {
        Some(TokenClass::Status)
    } else if token
        .split(',')
        .all(|part| in_vocabulary(part.trim(), INFO_TAGS))
    {
        Some(TokenClass::Info)
    } else {
        None
    }
}

/// Build a record from one raw row by vocabulary, not position.
///
/// Rows with no volume-only evidence (a drive letter, filesystem, or
/// status) are rejected so partition rows are left for tier 3.
fn classify_row(line: &str) -> Option<VolumeRecord> {
    let tokens = row_tokens(line);
    let (volume, rest) = tokens.split_first()?;
    numbered(volume)?;

    let mut rec = VolumeRecord {
        volume: (*volume).to_owned(),
        ..VolumeRecord::default()
    };
    for &token in rest {
        let slot = match classify(token) {
            Some(TokenClass::Letter) => &mut rec.letter,
            Some(TokenClass::Filesystem) => &mut rec.filesystem,
            Some(TokenClass::Kind) => &mut rec.kind,
            Some(TokenClass::Size) => &mut rec.size,
            Some(TokenClass::Status) => &mut rec.status,
            Some(TokenClass::Info) => &mut rec.info,
            None => &mut rec.label,
        };
        if slot.is_empty() {
            *slot = token.to_owned();
        } else if rec.label.is_empty() {
            rec.label = token.to_owned();
        }
    }

    let has_evidence =
        !rec.letter.is_empty() || !rec.filesystem.is_empty() || !rec.status.is_empty();
    has_evidence.then_some(rec)
}

/// Tier 2: vocabulary classification of lines that look like numbered rows.
pub fn parse_token_rows(block: &[String]) -> Vec<VolumeRecord> {
    block
        .iter()
        .filter(|l| PATTERNS.numbered_line.is_match(l))
        .filter_map(|l| classify_row(l))
        .collect()
}

/// A partition row's four fields.
struct PartitionRow {
    partition: String,
    kind: String,
    size: String,
    offset: String,
}

fn partition_rows_by_span(block: &[String]) -> Vec<PartitionRow> {
    find_tables(block)
        .iter()
        .filter(|t| !is_volume_table(t))
        .flat_map(|table| {
            table.rows.iter().map(move |row| {
                let mut f = slice_fields(row, &table.spans, PARTITION_FIELDS).into_iter();
                let mut next = || f.next().unwrap_or_default();
                PartitionRow {
                    partition: next(),
                    kind: next(),
                    size: next(),
                    offset: next(),
                }
            })
        })
        .collect()
}

fn partition_rows_by_token(block: &[String]) -> Vec<PartitionRow> {
    block
        .iter()
        .filter(|l| PATTERNS.numbered_line.is_match(l))
        .filter_map(|l| {
            let tokens = row_tokens(l);
            let (partition, rest) = tokens.split_first()?;
            numbered(partition)?;
            let mut sizes = rest.iter().filter(|t| PATTERNS.size.is_match(t));
            let size = sizes.next()?.to_string();
            let offset = sizes.next().map(|t| t.to_string()).unwrap_or_default();
            let kind = rest
                .iter()
                .find(|t| !PATTERNS.size.is_match(t))
                .map(|t| t.to_string())
                .unwrap_or_default();
            Some(PartitionRow {
                partition: (*partition).to_owned(),
                kind,
                size,
                offset,
            })
        })
        .collect()
}

/// Tier 3: one unformatted `RAW` volume per partition-table row.
pub fn parse_partition_rows(block: &[String]) -> Vec<VolumeRecord> {
    let mut rows = partition_rows_by_span(block);
    if rows.is_empty() {
        rows = partition_rows_by_token(block);
    }
    rows.into_iter()
        .map(|p| {
            debug!(
                partition = %p.partition,
                partition_type = %p.kind,
                offset = %p.offset,
                "synthesising RAW volume"
            );
            VolumeRecord {
                volume: p.partition,
                filesystem: RAW_FILESYSTEM.to_owned(),
                kind: PARTITION_KIND.to_owned(),
                size: p.size,
                info: UNFORMATTED_INFO.to_owned(),
                ..VolumeRecord::default()
            }
        })
        .collect()
}
