/// DiskCensus Core: diskpart capture, table parsing, and attribute fusion.
///
/// This crate contains all inventory logic with no presentation concerns.
/// The binary in the workspace root is a thin CLI over [`inventory`].
///
/// # Modules
///
/// - [`model`]: Disk, volume, and attribute records plus size normalisation.
/// - [`runner`]: Bounded execution of the external partitioning tool.
/// - [`parser`]: Column tokenizer, section splitter, and the tiered row parser.
/// - [`attributes`]: Fusion of externally sourced boolean disk attributes.
/// - [`platform`]: Windows attribute probes and elevation checks.
/// - [`inventory`]: Orchestrates a full run into `DiskRecord`s.
/// - [`export`]: CSV and JSON report writers.
pub mod attributes;
pub mod config;
pub mod error;
pub mod export;
pub mod inventory;
pub mod model;
pub mod parser;
pub mod platform;
pub mod runner;

pub use config::InventoryConfig;
pub use error::InventoryError;
pub use inventory::DiskInventory;
