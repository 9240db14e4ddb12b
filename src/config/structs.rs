use super::impls::deserialize_level_filter;
use serde::Deserialize;
use std::{collections::HashMap, path::PathBuf, time::Duration};

pub const DEFAULT_CONNECTED_ATTR: &str = "tsumufs.connected";
pub const DEFAULT_PAUSE_ATTR: &str = "tsumufs.pause-sync";
pub const DEFAULT_VERSION_ATTR: &str = "tsumufs.version";
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(1000);
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1000);

/* One layer of configuration as read from a config file. Every field is
 * optional so layers can be merged, closest file first. */
#[derive(Deserialize, Default, Clone, Debug)]
#[serde(deny_unknown_fields)]
pub struct PartialConfig {
    #[serde(deserialize_with = "deserialize_level_filter", default)]
    pub log_level: Option<log::LevelFilter>,
    pub mount_root: Option<String>,
    pub base_dir: Option<String>,
    pub connected_attr: Option<String>,
    pub pause_attr: Option<String>,
    pub version_attr: Option<String>,
    pub poll_interval_ms: Option<u64>,
    pub settle_delay_ms: Option<u64>,
    pub resume_sync: Option<bool>,
    pub probes: Option<Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: log::LevelFilter,
    /// Directory whose extended attributes carry the readiness and pause
    /// signals. The directory probes run relative to it.
    pub mount_root: PathBuf,
    /// Directory the file probes create and truncate their files in.
    pub base_dir: PathBuf,
    pub connected_attr: String,
    pub pause_attr: String,
    pub version_attr: String,
    pub poll_interval: Duration,
    pub settle_delay: Duration,
    pub resume_sync: bool,
    /// Names of the probes to run. `None` runs the whole registry.
    pub probes: Option<Vec<String>>,
    /// Where each setting came from (default, a config file path, or
    /// environment).
    pub sources: HashMap<String, String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: log::LevelFilter::Info,
            mount_root: PathBuf::from("."),
            base_dir: PathBuf::from("."),
            connected_attr: DEFAULT_CONNECTED_ATTR.to_string(),
            pause_attr: DEFAULT_PAUSE_ATTR.to_string(),
            version_attr: DEFAULT_VERSION_ATTR.to_string(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            settle_delay: DEFAULT_SETTLE_DELAY,
            resume_sync: false,
            probes: None,
            sources: HashMap::new(),
        }
    }
}
