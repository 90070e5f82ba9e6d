/// One inventory run: enumerate, detail, parse, fuse.
///
/// The run issues exactly two tool invocations, in order. Either one
/// failing aborts the run. Everything after the captures is per-disk and
/// cannot fail: a disk with unusable text still yields a record carrying
/// the sentinel volume.
use crate::attributes::{AttributeFuser, AttributeSource};
use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use crate::model::{size, DiskRecord, DiskSummary};
use crate::parser::{parse_disk_header, parse_disk_list, parse_volumes, split};
use crate::runner::{script, CommandRunner};
use tracing::{debug, info, warn};

pub struct DiskInventory<'a, R> {
    runner: R,
    source: &'a dyn AttributeSource,
    config: InventoryConfig,
}

impl<'a, R: CommandRunner> DiskInventory<'a, R> {
    pub fn new(runner: R, source: &'a dyn AttributeSource, config: InventoryConfig) -> Self {
        Self {
            runner,
            source,
            config,
        }
    }

    /// Run the tool twice and assemble one record per listed disk, in disk
    /// number order.
    pub fn collect(&self) -> Result<Vec<DiskRecord>> {
        let listing = self
            .runner
            .run(&script::list_disks(), self.config.enumeration_timeout)?;
        let summaries = parse_disk_list(&listing);
        if summaries.is_empty() {
            return Err(InventoryError::NoDisksDetected);
        }
        let numbers: Vec<u32> = summaries.iter().map(|s| s.number).collect();
        info!(disks = ?numbers, "disks enumerated");

        let capture = self
            .runner
            .run(&script::detail_batch(&numbers), self.config.detail_timeout)?;
        let mut blocks = split(&capture);

        let mut fuser = AttributeFuser::new(self.source);
        let records: Vec<DiskRecord> = summaries
            .into_iter()
            .map(|summary| {
                let block = blocks.remove(&summary.number).unwrap_or_else(|| {
                    warn!(disk = summary.number, "disk missing from detail capture");
                    Vec::new()
                });
                assemble(summary, &block, &mut fuser)
            })
            .collect();

        info!(disks = records.len(), "inventory complete");
        Ok(records)
    }
}

/// Build one disk's record from its enumeration row and detail block.
fn assemble(summary: DiskSummary, block: &[String], fuser: &mut AttributeFuser<'_>) -> DiskRecord {
    let header = parse_disk_header(block);
    let mut volumes = parse_volumes(block);
    for volume in &mut volumes {
        volume.normalise_size();
    }
    debug!(disk = summary.number, volumes = volumes.len(), "disk assembled");

    let status = if summary.status.is_empty() {
        header.status
    } else {
        summary.status
    };

    DiskRecord {
        number: summary.number,
        bus_type: header.bus_type,
        description: header.description,
        disk_id: header.disk_id,
        status,
        size_bytes: size::to_bytes(&summary.size),
        size: summary.size,
        free_bytes: size::to_bytes(&summary.free),
        free: summary.free,
        dynamic: summary.dynamic,
        gpt: summary.gpt,
        connection: header.connection,
        attributes: fuser.fuse(summary.number),
        volumes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::NullAttributeSource;
    use std::cell::RefCell;
    use std::time::Duration;

    const LIST_DISK: &str = include_str!("../tests/fixtures/list_disk.txt");
    const DETAIL_BATCH: &str = include_str!("../tests/fixtures/detail_batch.txt");

    /// Replays canned captures and records every script it was given.
    struct CannedRunner {
        listing: Vec<String>,
        detail: Vec<String>,
        scripts: RefCell<Vec<(String, Duration)>>,
    }

    impl CannedRunner {
        fn new(listing: &str, detail: &str) -> Self {
            Self {
                listing: listing.lines().map(str::to_owned).collect(),
                detail: detail.lines().map(str::to_owned).collect(),
                scripts: RefCell::new(Vec::new()),
            }
        }
    }

    impl CommandRunner for CannedRunner {
        fn run(&self, script: &str, timeout: Duration) -> Result<Vec<String>> {
            self.scripts.borrow_mut().push((script.to_owned(), timeout));
            if script.starts_with("list disk") {
                Ok(self.listing.clone())
            } else {
                Ok(self.detail.clone())
            }
        }
    }

    /// Enumeration runs first with its own timeout; one batched detail call follows.
    #[test]
    fn test_collect_issues_two_calls_in_order() {
        let runner = CannedRunner::new(LIST_DISK, DETAIL_BATCH);
        let config = InventoryConfig::default();
        let inventory = DiskInventory::new(&runner, &NullAttributeSource, config.clone());
        inventory.collect().unwrap();

        let scripts = runner.scripts.borrow();
        assert_eq!(scripts.len(), 2);
        assert_eq!(scripts[0], (script::list_disks(), config.enumeration_timeout));
        assert_eq!(scripts[1], (script::detail_batch(&[0, 1]), config.detail_timeout));
    }

    #[test]
    fn test_collect_assembles_disks_with_sizes() {
        let runner = CannedRunner::new(LIST_DISK, DETAIL_BATCH);
        let inventory =
            DiskInventory::new(&runner, &NullAttributeSource, InventoryConfig::default());
        let disks = inventory.collect().unwrap();

        assert_eq!(disks.len(), 2);
        let d0 = &disks[0];
        assert_eq!(d0.number, 0);
        assert_eq!(d0.bus_type, "NVMe");
        assert_eq!(d0.size_bytes, Some(953 * 1024 * 1024 * 1024));
        assert_eq!(d0.free_bytes, Some(1024 * 1024));
        assert!(d0.gpt);
        assert_eq!(d0.volumes.len(), 3);
        assert_eq!(d0.volumes[0].letter, "C");
        assert_eq!(d0.volumes[0].size_bytes, Some(952 * 1024 * 1024 * 1024));
        assert_eq!(d0.volumes[0].size_human.as_deref(), Some("952.0 GB"));

        assert_eq!(disks[1].volumes[0].letter, "D");
        assert_eq!(disks[1].free_bytes, Some(0));
    }

    #[test]
    fn test_disk_missing_from_detail_gets_sentinel() {
        let detail: String = DETAIL_BATCH
            .split("Disk 1 is now the selected disk.")
            .next()
            .unwrap()
            .to_owned();
        let runner = CannedRunner::new(LIST_DISK, &detail);
        let inventory =
            DiskInventory::new(&runner, &NullAttributeSource, InventoryConfig::default());
        let disks = inventory.collect().unwrap();

        assert_eq!(disks.len(), 2);
        assert_eq!(disks[1].volumes.len(), 1);
        assert!(disks[1].volumes[0].is_sentinel());
        assert_eq!(disks[1].status, "Online");
    }

    /// No disk rows stops the run before the detail call.
    #[test]
    fn test_empty_listing_is_no_disks_detected() {
        let runner = CannedRunner::new("\r\nMicrosoft DiskPart\r\n", DETAIL_BATCH);
        let inventory =
            DiskInventory::new(&runner, &NullAttributeSource, InventoryConfig::default());
        let err = inventory.collect().unwrap_err();
        assert!(matches!(err, InventoryError::NoDisksDetected));
        assert_eq!(runner.scripts.borrow().len(), 1);
    }
}
