use super::PartialConfig;
use crate::config::Config;
use crate::probes;
use anyhow::{Context, Result, anyhow};
use log::trace;
use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/** Resolves the run configuration from config files and the process
 * environment. */
pub fn resolve_config() -> Result<Config> {
    let config_paths = find_config_files()?;
    resolve_config_with(&config_paths, |key| std::env::var(key).ok())
}

/* Same as resolve_config, with the config file candidates and the
 * environment lookup supplied by the caller. */
pub fn resolve_config_with<F>(config_paths: &[PathBuf], env: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    let (mut partial_config, mut sources) = load_partial(config_paths)?;
    let env = |key: &str| env(key).filter(|value| !value.is_empty());

    if let Some(log_level) = env("FSPROBE_LOG_LEVEL") {
        let log_level = log::LevelFilter::from_str(&log_level)
            .map_err(|_| anyhow!("Invalid log level: {}", log_level))?;
        partial_config.log_level = Some(log_level);
        sources.insert("log_level".into(), "environment".into());
    }

    if let Some(mount_root) = env("FSPROBE_MOUNT_ROOT") {
        partial_config.mount_root = Some(mount_root);
        sources.insert("mount_root".into(), "environment".into());
    }

    // USR_DIR is what the functional test driver exports for per-user runs,
    // so it wins over our own variable.
    if let Some(base_dir) = env("USR_DIR").or_else(|| env("FSPROBE_BASE_DIR"))
    {
        partial_config.base_dir = Some(base_dir);
        sources.insert("base_dir".into(), "environment".into());
    }

    for (key, var, slot) in [
        (
            "connected_attr",
            "FSPROBE_CONNECTED_ATTR",
            &mut partial_config.connected_attr,
        ),
        ("pause_attr", "FSPROBE_PAUSE_ATTR", &mut partial_config.pause_attr),
        (
            "version_attr",
            "FSPROBE_VERSION_ATTR",
            &mut partial_config.version_attr,
        ),
    ] {
        if let Some(value) = env(var) {
            *slot = Some(value);
            sources.insert(key.into(), "environment".into());
        }
    }

    for (key, var, slot) in [
        (
            "poll_interval_ms",
            "FSPROBE_POLL_INTERVAL_MS",
            &mut partial_config.poll_interval_ms,
        ),
        (
            "settle_delay_ms",
            "FSPROBE_SETTLE_DELAY_MS",
            &mut partial_config.settle_delay_ms,
        ),
    ] {
        if let Some(value) = env(var) {
            let millis = u64::from_str(&value)
                .map_err(|_| anyhow!("Invalid value for {}: {}", var, value))?;
            *slot = Some(millis);
            sources.insert(key.into(), "environment".into());
        }
    }

    if let Some(resume_sync) = env("FSPROBE_RESUME_SYNC") {
        let resume_sync = bool::from_str(&resume_sync).map_err(|_| {
            anyhow!("Invalid value for FSPROBE_RESUME_SYNC: {}", resume_sync)
        })?;
        partial_config.resume_sync = Some(resume_sync);
        sources.insert("resume_sync".into(), "environment".into());
    }

    if let Some(probes) = env("FSPROBE_PROBES") {
        let probes: Vec<String> = probes
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        if !probes.is_empty() {
            partial_config.probes = Some(probes);
            sources.insert("probes".into(), "environment".into());
        }
    }

    // If nothing else, fill in with the defaults
    let defaults = Config::default();
    for key in [
        "log_level",
        "mount_root",
        "base_dir",
        "connected_attr",
        "pause_attr",
        "version_attr",
        "poll_interval_ms",
        "settle_delay_ms",
        "resume_sync",
        "probes",
    ] {
        if !sources.contains_key(key) {
            sources.insert(key.into(), "default".into());
        }
    }

    let config = Config {
        log_level: partial_config.log_level.unwrap_or(defaults.log_level),
        mount_root: partial_config
            .mount_root
            .map_or(defaults.mount_root, PathBuf::from),
        base_dir: partial_config
            .base_dir
            .map_or(defaults.base_dir, PathBuf::from),
        connected_attr: partial_config
            .connected_attr
            .unwrap_or(defaults.connected_attr),
        pause_attr: partial_config.pause_attr.unwrap_or(defaults.pause_attr),
        version_attr: partial_config
            .version_attr
            .unwrap_or(defaults.version_attr),
        poll_interval: partial_config
            .poll_interval_ms
            .map_or(defaults.poll_interval, Duration::from_millis),
        settle_delay: partial_config
            .settle_delay_ms
            .map_or(defaults.settle_delay, Duration::from_millis),
        resume_sync: partial_config.resume_sync.unwrap_or(defaults.resume_sync),
        probes: partial_config.probes,
        sources,
    };

    validate_config(&config)?;

    trace!("Mount root: {}", config.mount_root.display());
    trace!("Base dir: {}", config.base_dir.display());

    Ok(config)
}

fn validate_config(config: &Config) -> Result<()> {
    for (key, name) in [
        ("connected_attr", &config.connected_attr),
        ("pause_attr", &config.pause_attr),
        ("version_attr", &config.version_attr),
    ] {
        if name.is_empty() || name.contains('\0') {
            return Err(anyhow!("Invalid attribute name for {}: {:?}", key, name));
        }
    }

    if config.poll_interval.is_zero() {
        return Err(anyhow!("poll_interval_ms must be greater than zero"));
    }

    if let Some(selected) = &config.probes {
        if selected.is_empty() {
            return Err(anyhow!("probes must name at least one probe"));
        }
        let known = probes::probe_names();
        for name in selected {
            if !known.contains(&name.as_str()) {
                return Err(anyhow!(
                    "Unknown probe '{}'. Valid probes are: {}",
                    name,
                    known.join(", ")
                ));
            }
        }
    }

    Ok(())
}

pub fn load_partial(
    config_paths: &[PathBuf],
) -> Result<(PartialConfig, HashMap<String, String>)> {
    let mut sources = HashMap::new();
    let mut merged_config = PartialConfig::default();

    for path in config_paths.iter().filter(|path| path.is_file()) {
        let config_str = std::fs::read_to_string(path).context(format!(
            "Failed to read config file {}",
            path.display()
        ))?;

        let config: PartialConfig = toml::from_str(&config_str).context(
            format!("Failed to parse config file {}", path.display()),
        )?;

        merge_configs(
            &mut merged_config,
            &mut sources,
            config,
            &path.display().to_string(),
        );
        trace!("Loaded config file: {}", path.display());
    }

    if sources.is_empty() {
        trace!("No config files found, using default config");
    }

    Ok((merged_config, sources))
}

/** Returns the config file candidates, closest first */
fn find_config_files() -> Result<Vec<PathBuf>> {
    let current_dir =
        std::env::current_dir().context("Failed to get current directory")?;
    Ok(vec![
        current_dir.join(".fsprobe.toml"),
        PathBuf::from("/etc/fsprobe.toml"),
    ])
}

/* Fills in whatever `merged` does not have yet from `config`. Files are
 * visited closest first, so the first file to set a key wins. */
fn merge_configs(
    merged: &mut PartialConfig,
    sources: &mut HashMap<String, String>,
    config: PartialConfig,
    source: &str,
) {
    macro_rules! merge {
        ($($field:ident),*) => {
            $(
                if merged.$field.is_none() && config.$field.is_some() {
                    merged.$field = config.$field;
                    sources.insert(stringify!($field).into(), source.into());
                }
            )*
        };
    }

    merge!(
        log_level,
        mount_root,
        base_dir,
        connected_attr,
        pause_attr,
        version_attr,
        poll_interval_ms,
        settle_delay_ms,
        resume_sync,
        probes
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rstest::*;
    use std::path::Path;

    struct ConfigDir {
        path: PathBuf,
    }

    impl ConfigDir {
        fn write(&self, name: &str, contents: &str) -> PathBuf {
            let path = self.path.join(name);
            std::fs::write(&path, contents).unwrap();
            path
        }
    }

    impl Drop for ConfigDir {
        fn drop(&mut self) {
            let _ = std::fs::remove_dir_all(&self.path);
        }
    }

    #[fixture]
    fn config_dir() -> ConfigDir {
        let rid: String = (0..10)
            .map(|_| rand::rng().sample(rand::distr::Alphanumeric) as char)
            .collect();
        let path = Path::new("generated-test-data").join(format!("config-{}", rid));
        std::fs::create_dir_all(&path).unwrap();
        ConfigDir { path }
    }

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_defaults() {
        let config = resolve_config_with(&[], no_env).unwrap();
        assert_eq!(config.mount_root, PathBuf::from("."));
        assert_eq!(config.base_dir, PathBuf::from("."));
        assert_eq!(config.connected_attr, "tsumufs.connected");
        assert_eq!(config.pause_attr, "tsumufs.pause-sync");
        assert_eq!(config.poll_interval, Duration::from_secs(1));
        assert!(!config.resume_sync);
        assert!(config.probes.is_none());
        assert_eq!(config.sources["base_dir"], "default");
    }

    #[test]
    fn test_usr_dir_wins_over_base_dir_variable() {
        let config = resolve_config_with(&[], |key| match key {
            "USR_DIR" => Some("alice".to_string()),
            "FSPROBE_BASE_DIR" => Some("bob".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_dir, PathBuf::from("alice"));
        assert_eq!(config.sources["base_dir"], "environment");
    }

    #[test]
    fn test_empty_variables_are_ignored() {
        let config = resolve_config_with(&[], |key| match key {
            "USR_DIR" => Some(String::new()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.base_dir, PathBuf::from("."));
    }

    #[rstest]
    fn test_closest_file_wins_and_env_overrides(config_dir: ConfigDir) {
        let near = config_dir.write(
            "near.toml",
            r#"
            base_dir = "near"
            poll_interval_ms = 50
            "#,
        );
        let far = config_dir.write(
            "far.toml",
            r#"
            base_dir = "far"
            pause_attr = "user.pause"
            settle_delay_ms = 0
            "#,
        );

        let config = resolve_config_with(&[near.clone(), far.clone()], |key| {
            (key == "FSPROBE_POLL_INTERVAL_MS").then(|| "5".to_string())
        })
        .unwrap();

        assert_eq!(config.base_dir, PathBuf::from("near"));
        assert_eq!(config.pause_attr, "user.pause");
        assert_eq!(config.poll_interval, Duration::from_millis(5));
        assert_eq!(config.settle_delay, Duration::ZERO);
        assert_eq!(config.sources["base_dir"], near.display().to_string());
        assert_eq!(config.sources["pause_attr"], far.display().to_string());
        assert_eq!(config.sources["poll_interval_ms"], "environment");
    }

    #[rstest]
    fn test_broken_config_file_is_an_error(config_dir: ConfigDir) {
        let path = config_dir.write("broken.toml", "base_dir = [");
        assert!(resolve_config_with(&[path], no_env).is_err());

        let path = config_dir.write("unknown.toml", "colour = \"blue\"");
        assert!(resolve_config_with(&[path], no_env).is_err());

        // an empty selection would pass without testing anything
        let path = config_dir.write("empty.toml", "probes = []");
        let err = resolve_config_with(&[path], no_env).unwrap_err();
        assert!(err.to_string().contains("at least one probe"));
    }

    #[test]
    fn test_missing_config_files_are_skipped() {
        let missing = PathBuf::from("generated-test-data/does-not-exist.toml");
        assert!(resolve_config_with(&[missing], no_env).is_ok());
    }

    #[rstest]
    #[case("FSPROBE_LOG_LEVEL", "chatty")]
    #[case("FSPROBE_POLL_INTERVAL_MS", "soon")]
    #[case("FSPROBE_POLL_INTERVAL_MS", "0")]
    #[case("FSPROBE_RESUME_SYNC", "maybe")]
    #[case("FSPROBE_PROBES", "dir-exists,no-such-probe")]
    fn test_invalid_environment_values(#[case] var: &str, #[case] value: &str) {
        let result = resolve_config_with(&[], |key| {
            (key == var).then(|| value.to_string())
        });
        assert!(result.is_err(), "{}={} should be rejected", var, value);
    }

    #[test]
    fn test_probe_selection() {
        let config = resolve_config_with(&[], |key| {
            (key == "FSPROBE_PROBES")
                .then(|| " single-write , multiple-write ".to_string())
        })
        .unwrap();
        assert_eq!(
            config.probes,
            Some(vec!["single-write".to_string(), "multiple-write".to_string()])
        );
    }
}
