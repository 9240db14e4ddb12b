use super::structs::Config;

use serde::Deserialize;
use std::{
    fmt::{self, Display},
    str::FromStr,
};

impl Config {
    fn write_setting(
        &self,
        f: &mut fmt::Formatter<'_>,
        key: &str,
        value: impl Display,
    ) -> fmt::Result {
        write!(f, "{}={}", key, value)?;
        if let Some(source) = self.sources.get(key) {
            write!(f, " ({})", source)?;
        }
        Ok(())
    }
}

/* One `key=value (source)` line per setting. The source is left off for
 * configs that weren't resolved from files or the environment. */
impl Display for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let probes = self
            .probes
            .as_ref()
            .map_or_else(|| "all".to_string(), |probes| probes.join(","));
        let mount_root = self.mount_root.display();
        let base_dir = self.base_dir.display();
        let poll_interval_ms = self.poll_interval.as_millis();
        let settle_delay_ms = self.settle_delay.as_millis();
        let settings: [(&str, &dyn Display); 10] = [
            ("log_level", &self.log_level),
            ("mount_root", &mount_root),
            ("base_dir", &base_dir),
            ("connected_attr", &self.connected_attr),
            ("pause_attr", &self.pause_attr),
            ("version_attr", &self.version_attr),
            ("poll_interval_ms", &poll_interval_ms),
            ("settle_delay_ms", &settle_delay_ms),
            ("resume_sync", &self.resume_sync),
            ("probes", &probes),
        ];
        for (i, (key, value)) in settings.into_iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            self.write_setting(f, key, value)?;
        }
        Ok(())
    }
}

pub(crate) fn deserialize_level_filter<'de, D>(
    deserializer: D,
) -> Result<Option<log::LevelFilter>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    s.map_or(Ok(None), |s| {
        log::LevelFilter::from_str(&s)
            .map(Some)
            .map_err(serde::de::Error::custom)
    })
}
