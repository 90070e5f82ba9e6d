/// Attribute fusion: boolean disk attributes from non-text sources.
///
/// The tool prints read-only/boot/pagefile/... as localised yes/no text.
/// Rather than match those words, each boolean is derived from an
/// [`AttributeSource`]: disk properties by disk number, a drive-letter map,
/// and the paths of the pagefile, hibernation file, and crash dump.
///
/// Derivation is best-effort. Every attribute is first a [`Derivation`]
/// (an optional value plus the reason it is missing), then resolved to
/// `false` with the reason logged. Nothing here can fail a run.
pub mod paths;

use crate::model::AttributeSet;
use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;
use tracing::debug;

/// Why a probe could not answer.
#[derive(Debug, thiserror::Error)]
pub enum ProbeError {
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),
    #[error("{what} failed: {detail}")]
    Query { what: &'static str, detail: String },
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Per-disk flags reported by the system, each possibly unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiskProperties {
    pub is_read_only: Option<bool>,
    pub is_current_read_only: Option<bool>,
    pub is_boot: Option<bool>,
    pub is_system: Option<bool>,
    pub is_clustered: Option<bool>,
}

/// Lookups the fuser consumes. Implementations should not cache across
/// runs; the fuser caches within one.
pub trait AttributeSource {
    /// `Ok(None)` when the system has nothing for this disk.
    fn disk_properties(&self, disk: u32) -> Result<Option<DiskProperties>, ProbeError>;
    /// Upper-case drive letter to disk number.
    fn drive_letters(&self) -> Result<HashMap<char, u32>, ProbeError>;
    fn pagefile_paths(&self) -> Result<Vec<PathBuf>, ProbeError>;
    /// `Ok(None)` when hibernation is off.
    fn hibernation_file(&self) -> Result<Option<PathBuf>, ProbeError>;
    fn crashdump_paths(&self) -> Result<Vec<PathBuf>, ProbeError>;
}

/// A source with no knowledge at all; every attribute resolves to `false`.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullAttributeSource;

impl AttributeSource for NullAttributeSource {
    fn disk_properties(&self, _disk: u32) -> Result<Option<DiskProperties>, ProbeError> {
        Ok(None)
    }

    fn drive_letters(&self) -> Result<HashMap<char, u32>, ProbeError> {
        Ok(HashMap::new())
    }

    fn pagefile_paths(&self) -> Result<Vec<PathBuf>, ProbeError> {
        Ok(Vec::new())
    }

    fn hibernation_file(&self) -> Result<Option<PathBuf>, ProbeError> {
        Ok(None)
    }

    fn crashdump_paths(&self) -> Result<Vec<PathBuf>, ProbeError> {
        Ok(Vec::new())
    }
}

/// One attribute before it is forced to a boolean.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Derivation {
    pub value: Option<bool>,
    /// Set whenever `value` is `None`.
    pub reason: Option<String>,
}

impl Derivation {
    pub fn known(value: bool) -> Self {
        Self {
            value: Some(value),
            reason: None,
        }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Self {
            value: None,
            reason: Some(reason.into()),
        }
    }

    fn from_flag(flag: Option<bool>, what: &str) -> Self {
        flag.map_or_else(|| Self::unknown(format!("no {what} flag reported")), Self::known)
    }

    /// Collapse to a boolean, logging why when the value was unknown.
    pub fn resolve(self, disk: u32, attribute: &str) -> bool {
        if let Some(reason) = &self.reason {
            debug!(disk, attribute, %reason, "attribute defaulted to false");
        }
        self.value.unwrap_or(false)
    }
}

/// Disks hosting a feature file, or why they could not be determined.
type FeatureDisks = Result<BTreeSet<u32>, String>;

/// One disk's probe result, with failures kept as their message.
type CachedProperties = Result<Option<DiskProperties>, String>;

/// Fuses attributes for every disk of one run.
///
/// Holds the run-scoped cache: the letter map and feature sets are resolved
/// once on construction, and disk properties once per disk number.
pub struct AttributeFuser<'a> {
    source: &'a dyn AttributeSource,
    pagefile: FeatureDisks,
    hibernation: FeatureDisks,
    crashdump: FeatureDisks,
    properties: HashMap<u32, CachedProperties>,
}

impl<'a> AttributeFuser<'a> {
    pub fn new(source: &'a dyn AttributeSource) -> Self {
        let letters = source.drive_letters().map_err(|e| e.to_string());
        let pagefile = resolve_feature(&letters, source.pagefile_paths(), "pagefile");
        let hibernation = resolve_feature(
            &letters,
            source.hibernation_file().map(|p| p.into_iter().collect()),
            "hibernation file",
        );
        let crashdump = resolve_feature(&letters, source.crashdump_paths(), "crash dump");
        Self {
            source,
            pagefile,
            hibernation,
            crashdump,
            properties: HashMap::new(),
        }
    }

    fn properties(&mut self, disk: u32) -> &CachedProperties {
        let source = self.source;
        self.properties
            .entry(disk)
            .or_insert_with(|| source.disk_properties(disk).map_err(|e| e.to_string()))
    }

    /// Every attribute of `disk` as a named derivation, in
    /// [`AttributeSet::NAMES`] order.
    pub fn derive(&mut self, disk: u32) -> [(&'static str, Derivation); 7] {
        let props = self.properties(disk).clone();
        let current_read_only =
            property_flag(&props, "current read-only", |p| p.is_current_read_only);
        let read_only = property_flag(&props, "read-only", |p| p.is_read_only);
        let boot = property_flag(&props, "boot/system", |p| match (p.is_boot, p.is_system) {
            (Some(true), _) | (_, Some(true)) => Some(true),
            (None, None) => None,
            _ => Some(false),
        });
        let clustered = property_flag(&props, "clustered", |p| p.is_clustered);

        let [n0, n1, n2, n3, n4, n5, n6] = AttributeSet::NAMES;
        [
            (n0, current_read_only),
            (n1, read_only),
            (n2, boot),
            (n3, membership(&self.pagefile, disk)),
            (n4, membership(&self.hibernation, disk)),
            (n5, membership(&self.crashdump, disk)),
            (n6, clustered),
        ]
    }

    /// The complete, total attribute set for `disk`.
    pub fn fuse(&mut self, disk: u32) -> AttributeSet {
        let [cro, ro, boot, page, hib, dump, clu] =
            self.derive(disk).map(|(name, d)| d.resolve(disk, name));
        AttributeSet {
            current_read_only: cro,
            read_only: ro,
            boot_disk: boot,
            pagefile_disk: page,
            hibernation_file_disk: hib,
            crashdump_disk: dump,
            clustered_disk: clu,
        }
    }
}

fn property_flag(
    props: &CachedProperties,
    what: &str,
    pick: impl Fn(&DiskProperties) -> Option<bool>,
) -> Derivation {
    match props {
        Ok(Some(p)) => Derivation::from_flag(pick(p), what),
        Ok(None) => Derivation::unknown("no properties reported for disk"),
        Err(e) => Derivation::unknown(e.clone()),
    }
}

fn membership(disks: &FeatureDisks, disk: u32) -> Derivation {
    match disks {
        Ok(set) => Derivation::known(set.contains(&disk)),
        Err(reason) => Derivation::unknown(reason.clone()),
    }
}

/// Map feature file paths to the disks that host them.
fn resolve_feature(
    letters: &Result<HashMap<char, u32>, String>,
    files: Result<Vec<PathBuf>, ProbeError>,
    feature: &str,
) -> FeatureDisks {
    let files = files.map_err(|e| format!("{feature} lookup: {e}"))?;
    let letters = letters
        .as_ref()
        .map_err(|e| format!("drive letter map: {e}"))?;

    let mut disks = BTreeSet::new();
    for path in &files {
        let disk = paths::drive_letter_of(path).and_then(|l| letters.get(&l).copied());
        match disk {
            Some(n) => {
                disks.insert(n);
            }
            None => debug!(feature, path = %path.display(), "feature path not on a mapped drive"),
        }
    }
    Ok(disks)
}
