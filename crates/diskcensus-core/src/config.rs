/// Run configuration: which tool to drive and how long to wait for it.
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Default wait for the `list disk` enumeration call.
pub const DEFAULT_ENUMERATION_TIMEOUT: Duration = Duration::from_secs(60);

/// Default wait for the batched detail call. It covers every disk in one
/// process, so it gets a longer budget than enumeration.
pub const DEFAULT_DETAIL_TIMEOUT: Duration = Duration::from_secs(300);

/// Liveness poll interval while the tool runs.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Pause after exit before the exit code is read.
pub const DEFAULT_SETTLE_GRACE: Duration = Duration::from_millis(250);

/// Run settings. In JSON, timeouts are whole seconds and the two short
/// pauses are milliseconds (`poll_interval_ms`, `settle_grace_ms`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InventoryConfig {
    /// Program that executes the generated script.
    pub tool: PathBuf,
    /// Flag placed before the script path (`/s` for diskpart). `None`
    /// passes the script path as the only argument.
    pub script_flag: Option<String>,
    #[serde(with = "duration_secs")]
    pub enumeration_timeout: Duration,
    #[serde(with = "duration_secs")]
    pub detail_timeout: Duration,
    #[serde(rename = "poll_interval_ms", with = "duration_millis")]
    pub poll_interval: Duration,
    #[serde(rename = "settle_grace_ms", with = "duration_millis")]
    pub settle_grace: Duration,
}

mod duration_secs {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        duration.as_secs().serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        // Sub-millisecond precision is not configurable.
        (duration.as_millis() as u64).serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

impl Default for InventoryConfig {
    fn default() -> Self {
        Self {
            tool: PathBuf::from("diskpart"),
            script_flag: Some("/s".to_owned()),
            enumeration_timeout: DEFAULT_ENUMERATION_TIMEOUT,
            detail_timeout: DEFAULT_DETAIL_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_grace: DEFAULT_SETTLE_GRACE,
        }
    }
}

impl InventoryConfig {
    /// Apply a single timeout to both calls, as the CLI's `--timeout` does.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.enumeration_timeout = timeout;
        self.detail_timeout = timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// A fresh config drives diskpart with `/s` and gives detail more time.
    #[test]
    fn test_default_targets_diskpart() {
        let cfg = InventoryConfig::default();
        assert_eq!(cfg.tool, PathBuf::from("diskpart"));
        assert_eq!(cfg.script_flag.as_deref(), Some("/s"));
        assert!(cfg.detail_timeout > cfg.enumeration_timeout);
    }

    /// `--timeout` applies to both tool invocations.
    #[test]
    fn test_with_timeout_sets_both_calls() {
        let cfg = InventoryConfig::default().with_timeout(Duration::from_secs(5));
        assert_eq!(cfg.enumeration_timeout, Duration::from_secs(5));
        assert_eq!(cfg.detail_timeout, Duration::from_secs(5));
    }

    /// Missing fields in a serialised config fall back to defaults.
    #[test]
    fn test_partial_config_deserialises_with_defaults() {
        let cfg: InventoryConfig = serde_json::from_str(r#"{"tool":"C:\\diskpart.exe"}"#).unwrap();
        assert_eq!(cfg.tool, PathBuf::from("C:\\diskpart.exe"));
        assert_eq!(cfg.poll_interval, DEFAULT_POLL_INTERVAL);
    }

    /// Durations read as plain numbers: seconds for timeouts, milliseconds
    /// for the poll and settle pauses.
    #[test]
    fn test_durations_are_plain_numbers_in_json() {
        let cfg: InventoryConfig = serde_json::from_str(
            r#"{
                "enumeration_timeout": 30,
                "detail_timeout": 300,
                "poll_interval_ms": 500,
                "settle_grace_ms": 100
            }"#,
        )
        .unwrap();
        assert_eq!(cfg.enumeration_timeout, Duration::from_secs(30));
        assert_eq!(cfg.detail_timeout, Duration::from_secs(300));
        assert_eq!(cfg.poll_interval, Duration::from_millis(500));
        assert_eq!(cfg.settle_grace, Duration::from_millis(100));

        let json = serde_json::to_value(InventoryConfig::default()).unwrap();
        assert_eq!(json["detail_timeout"], 300);
        assert_eq!(json["settle_grace_ms"], 250);
    }
}
