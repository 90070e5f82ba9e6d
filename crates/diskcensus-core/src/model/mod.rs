/// Data model for a disk inventory run.
///
/// Records are built fresh from each capture and never mutated after
/// assembly.
pub mod disk;
pub mod size;

pub use disk::{
    AttributeSet, ConnectionInfo, DiskRecord, DiskSummary, VolumeRecord, NO_VOLUMES_INFO,
    UNFORMATTED_INFO,
};
