/// Disk and volume records produced by one inventory run.
use serde::Serialize;

use super::size;

/// Info tag of the placeholder volume emitted when a disk yields no rows.
pub const NO_VOLUMES_INFO: &str = "No volumes found";

/// Info tag of volumes synthesised from partition-table rows.
pub const UNFORMATTED_INFO: &str = "Unformatted";

/// One row of the tool's disk listing, before any detail is gathered.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiskSummary {
    pub number: u32,
    pub status: String,
    pub size: String,
    pub free: String,
    /// `*` in the Dyn column.
    pub dynamic: bool,
    /// `*` in the Gpt column.
    pub gpt: bool,
}

/// Location of the disk on its bus. Opaque tokens, never parsed further.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ConnectionInfo {
    pub path: Option<String>,
    pub target: Option<String>,
    pub lun_id: Option<String>,
    /// May be the tool's literal "UNAVAILABLE" marker.
    pub location_path: Option<String>,
}

/// Boolean disk attributes. Absence of evidence is `false`, never unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AttributeSet {
    pub current_read_only: bool,
    pub read_only: bool,
    pub boot_disk: bool,
    pub pagefile_disk: bool,
    pub hibernation_file_disk: bool,
    pub crashdump_disk: bool,
    pub clustered_disk: bool,
}

impl AttributeSet {
    /// Column names in export order, paired with [`AttributeSet::values`].
    pub const NAMES: [&'static str; 7] = [
        "current_read_only",
        "read_only",
        "boot_disk",
        "pagefile_disk",
        "hibernation_file_disk",
        "crashdump_disk",
        "clustered_disk",
    ];

    pub fn values(&self) -> [bool; 7] {
        [
            self.current_read_only,
            self.read_only,
            self.boot_disk,
            self.pagefile_disk,
            self.hibernation_file_disk,
            self.crashdump_disk,
            self.clustered_disk,
        ]
    }
}

/// A single volume row, as rendered by the tool plus derived sizes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VolumeRecord {
    /// Numbering token, e.g. "Volume 1".
    pub volume: String,
    pub letter: String,
    pub label: String,
    pub filesystem: String,
    pub kind: String,
    /// Size exactly as the tool printed it.
    pub size: String,
    pub status: String,
    pub info: String,
    pub size_bytes: Option<u64>,
    /// Always computed from `size_bytes` when that is present.
    pub size_human: Option<String>,
}

impl VolumeRecord {
    /// The placeholder standing in for "no volume data" on a disk.
    pub fn sentinel() -> Self {
        Self {
            info: NO_VOLUMES_INFO.to_owned(),
            ..Self::default()
        }
    }

    pub fn is_sentinel(&self) -> bool {
        self.volume.is_empty() && self.info == NO_VOLUMES_INFO
    }

    /// Fill `size_bytes` and `size_human` from the rendered `size` text.
    ///
    /// Both stay `None` when the text is not a recognisable size, so the
    /// pair is always consistent.
    pub fn normalise_size(&mut self) {
        self.size_bytes = size::to_bytes(&self.size);
        self.size_human = self.size_bytes.map(size::to_human);
    }
}

/// One physical disk with everything known about it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiskRecord {
    pub number: u32,
    /// Bus type label, e.g. "NVMe" or "USB".
    pub bus_type: String,
    pub description: String,
    /// GUID or short hex signature, kept opaque.
    pub disk_id: String,
    pub status: String,
    pub size: String,
    pub size_bytes: Option<u64>,
    pub free: String,
    pub free_bytes: Option<u64>,
    pub dynamic: bool,
    pub gpt: bool,
    pub connection: ConnectionInfo,
    pub attributes: AttributeSet,
    /// Never empty: a disk without volume data carries one sentinel entry.
    pub volumes: Vec<VolumeRecord>,
}
