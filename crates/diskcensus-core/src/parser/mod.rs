/// Translation of the partitioning tool's console text into records.
///
/// - [`table`]: Column span detection and fixed-width slicing.
/// - [`sections`]: Splits a batched capture into per-disk blocks.
/// - [`enumeration`]: Disk numbers from the `list disk` capture.
/// - [`detail`]: Disk properties from the head of a disk block.
/// - [`volumes`]: The tiered volume row parser.
///
/// Table structure is found through the `<token> ###` numbering header and
/// dash dividers, which do not depend on the tool's display language. Two
/// things do: the "disk N is now the selected disk" marker and the tier-2
/// token vocabulary. Both are English-only.
pub mod detail;
pub mod enumeration;
pub mod sections;
pub mod table;
pub mod volumes;

mod patterns;

pub use detail::{parse_disk_header, DiskHeader};
pub use enumeration::parse_disk_list;
pub use sections::split;
pub use table::{compute_spans, find_tables, slice_fields, Span, Table};
pub use volumes::parse_volumes;
