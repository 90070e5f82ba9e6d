/// Report assembly and writers.
///
/// JSON carries the whole nested report. CSV is flat: one row per volume,
/// with the owning disk's columns repeated, so a disk with only the
/// sentinel volume still produces exactly one row.
use crate::error::ExportError;
use crate::model::DiskRecord;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::io::Write;

#[derive(Debug, Clone, Serialize)]
pub struct InventoryReport {
    pub collected_at: DateTime<Local>,
    pub disks: Vec<DiskRecord>,
}

impl InventoryReport {
    /// Stamp `disks` with the current local time.
    pub fn new(disks: Vec<DiskRecord>) -> Self {
        Self {
            collected_at: Local::now(),
            disks,
        }
    }

    /// Keep only the listed disk numbers. An empty filter keeps everything.
    pub fn retain_disks(&mut self, wanted: &[u32]) {
        if !wanted.is_empty() {
            self.disks.retain(|d| wanted.contains(&d.number));
        }
    }
}

/// Flat CSV row. Field order is the column order.
#[derive(Serialize)]
struct CsvRow<'a> {
    disk: u32,
    bus_type: &'a str,
    description: &'a str,
    disk_id: &'a str,
    disk_status: &'a str,
    disk_size: &'a str,
    disk_size_bytes: Option<u64>,
    disk_free: &'a str,
    dynamic: bool,
    gpt: bool,
    location_path: &'a str,
    current_read_only: bool,
    read_only: bool,
    boot_disk: bool,
    pagefile_disk: bool,
    hibernation_file_disk: bool,
    crashdump_disk: bool,
    clustered_disk: bool,
    volume: &'a str,
    letter: &'a str,
    label: &'a str,
    filesystem: &'a str,
    kind: &'a str,
    size: &'a str,
    size_bytes: Option<u64>,
    size_human: Option<&'a str>,
    status: &'a str,
    info: &'a str,
}

pub fn write_json<W: Write>(report: &InventoryReport, mut out: W) -> Result<(), ExportError> {
    serde_json::to_writer_pretty(&mut out, report)?;
    writeln!(out)?;
    Ok(())
}

pub fn write_csv<W: Write>(report: &InventoryReport, out: W) -> Result<(), ExportError> {
    let mut writer = csv::Writer::from_writer(out);
    for disk in &report.disks {
        let a = &disk.attributes;
        for v in &disk.volumes {
            writer.serialize(CsvRow {
                disk: disk.number,
                bus_type: &disk.bus_type,
                description: &disk.description,
                disk_id: &disk.disk_id,
                disk_status: &disk.status,
                disk_size: &disk.size,
                disk_size_bytes: disk.size_bytes,
                disk_free: &disk.free,
                dynamic: disk.dynamic,
                gpt: disk.gpt,
                location_path: disk.connection.location_path.as_deref().unwrap_or(""),
                current_read_only: a.current_read_only,
                read_only: a.read_only,
                boot_disk: a.boot_disk,
                pagefile_disk: a.pagefile_disk,
                hibernation_file_disk: a.hibernation_file_disk,
                crashdump_disk: a.crashdump_disk,
                clustered_disk: a.clustered_disk,
                volume: &v.volume,
                letter: &v.letter,
                label: &v.label,
                filesystem: &v.filesystem,
                kind: &v.kind,
                size: &v.size,
                size_bytes: v.size_bytes,
                size_human: v.size_human.as_deref(),
                status: &v.status,
                info: &v.info,
            })?;
        }
    }
    writer.flush()?;
    Ok(())
}

/// Human-readable summary: one heading per disk, one line per volume.
pub fn write_table<W: Write>(report: &InventoryReport, mut out: W) -> Result<(), ExportError> {
    writeln!(
        out,
        "Collected {}",
        report.collected_at.format("%Y-%m-%d %H:%M:%S")
    )?;
    for disk in &report.disks {
        writeln!(out)?;
        writeln!(
            out,
            "Disk {}  {}  {}  {}  {} (free {})",
            disk.number, disk.bus_type, disk.description, disk.status, disk.size, disk.free
        )?;

        let set: Vec<&str> = disk
            .attributes
            .values()
            .iter()
            .zip(crate::model::AttributeSet::NAMES)
            .filter(|(on, _)| **on)
            .map(|(_, name)| name)
            .collect();
        if !set.is_empty() {
            writeln!(out, "  attributes: {}", set.join(", "))?;
        }

        writeln!(
            out,
            "  {:<10} {:<3} {:<12} {:<6} {:<10} {:>10} {:<10} {}",
            "Volume", "Ltr", "Label", "Fs", "Type", "Size", "Status", "Info"
        )?;
        for v in &disk.volumes {
            writeln!(
                out,
                "  {:<10} {:<3} {:<12} {:<6} {:<10} {:>10} {:<10} {}",
                v.volume,
                v.letter,
                v.label,
                v.filesystem,
                v.kind,
                v.size_human.as_deref().unwrap_or(&v.size),
                v.status,
                v.info
            )?;
        }
    }
    Ok(())
}
