/// Disk properties from the head of a disk's detail block.
///
/// The tool prints a description line followed by `key : value` lines in a
/// fixed order. Keys are localised, so values are assigned by position
/// rather than by key text. The yes/no attribute lines that follow the
/// location path are deliberately ignored; those booleans are fused from
/// non-text sources (see [`crate::attributes`]).
use super::patterns::PATTERNS;
use crate::model::ConnectionInfo;

/// Ordinal positions of the property lines the inventory keeps.
const DISK_ID: usize = 0;
const BUS_TYPE: usize = 1;
const STATUS: usize = 2;
const PATH: usize = 3;
const TARGET: usize = 4;
const LUN_ID: usize = 5;
const LOCATION_PATH: usize = 6;

/// Text-derived identity of one disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiskHeader {
    pub description: String,
    pub disk_id: String,
    pub bus_type: String,
    pub status: String,
    pub connection: ConnectionInfo,
}

/// Parse the property section of a disk block.
///
/// The section is the first run of non-blank lines in the block, cut short
/// by a table header if one appears before a blank line. Missing properties
/// are left empty / `None`.
pub fn parse_disk_header(block: &[String]) -> DiskHeader {
    let section = block
        .iter()
        .map(|l| l.trim())
        .skip_while(|l| l.is_empty())
        .take_while(|l| !l.is_empty() && !PATTERNS.table_header.is_match(l));

    let mut header = DiskHeader::default();
    let mut values: Vec<String> = Vec::new();
    for line in section {
        match PATTERNS.property.captures(line) {
            Some(caps) if !caps[1].is_empty() => values.push(caps[2].to_owned()),
            _ if values.is_empty() && header.description.is_empty() => {
                header.description = line.to_owned();
            }
            _ => {}
        }
    }

    let take = |i: usize| values.get(i).filter(|v| !v.is_empty()).cloned();
    header.disk_id = take(DISK_ID).unwrap_or_default();
    header.bus_type = take(BUS_TYPE).unwrap_or_default();
    header.status = take(STATUS).unwrap_or_default();
    header.connection = ConnectionInfo {
        path: take(PATH),
        target: take(TARGET),
        lun_id: take(LUN_ID),
        location_path: take(LOCATION_PATH),
    };
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::sections::split;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_owned).collect()
    }

    #[test]
    fn test_header_from_fixture() {
        let capture = lines(include_str!("../../tests/fixtures/detail_batch.txt"));
        let blocks = split(&capture);

        let disk0 = parse_disk_header(&blocks[&0]);
        assert_eq!(disk0.description, "Samsung SSD 970 EVO Plus 1TB");
        assert_eq!(disk0.disk_id, "{5C1F8B2A-3D4E-4F60-9A7B-1C2D3E4F5A6B}");
        assert_eq!(disk0.bus_type, "NVMe");
        assert_eq!(disk0.status, "Online");
        assert_eq!(disk0.connection.path.as_deref(), Some("0"));
        assert_eq!(disk0.connection.lun_id.as_deref(), Some("0"));
        assert_eq!(
            disk0.connection.location_path.as_deref(),
            Some("PCIROOT(0)#PCI(1D00)#PCI(0000)#NVME(P00T00L00)")
        );

        let disk1 = parse_disk_header(&blocks[&1]);
        assert_eq!(disk1.disk_id, "A1B2C3D4");
        assert_eq!(disk1.connection.path.as_deref(), Some("1"));
        assert_eq!(disk1.connection.location_path.as_deref(), Some("UNAVAILABLE"));
    }

    /// Keys in another language still land in the right fields.
    #[test]
    fn test_properties_assigned_by_position() {
        let block = lines(
            concat!(
                "\n",
                "Disco virtuale\n",
                "ID disco: 1234ABCD\n",
                "Tipo   : SAS\n",
                "Stato : In linea\n",
                "Percorso   : 2\n",
                "Destinazione : 5\n",
                "ID LUN : 7\n",
                "Percorso di posizione : UNAVAILABLE\n",
            ),
        );
        let header = parse_disk_header(&block);
        assert_eq!(header.description, "Disco virtuale");
        assert_eq!(header.disk_id, "1234ABCD");
        assert_eq!(header.bus_type, "SAS");
        assert_eq!(header.connection.target.as_deref(), Some("5"));
        assert_eq!(header.connection.lun_id.as_deref(), Some("7"));
    }

    #[test]
    fn test_empty_block_gives_empty_header() {
        assert_eq!(parse_disk_header(&[]), DiskHeader::default());
    }

    #[test]
    fn test_section_stops_at_table_header() {
        let block = lines("Model X\nDisk ID: 01\n  Volume ###  Ltr\n  Volume 0     C");
        let header = parse_disk_header(&block);
        assert_eq!(header.disk_id, "01");
        assert!(header.bus_type.is_empty());
        assert_eq!(header.connection, ConnectionInfo::default());
    }
}
