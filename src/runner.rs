use crate::assertions::CheckpointFailure;
use crate::attributes::{AttributeChannel, Xattr};
use crate::config::Config;
use crate::handshake::{pause_sync, report_version, resume_sync, wait_ready};
use crate::outln;
use crate::probes::{self, Probe, ProbePaths};
use anyhow::Result;
use log::{debug, info};
use std::time::Duration;

#[derive(Debug, PartialEq, Eq)]
pub enum RunResult {
    Passed { probes: usize },
    Failed(CheckpointFailure),
}

impl RunResult {
    pub fn is_success(&self) -> bool {
        matches!(self, RunResult::Passed { .. })
    }

    pub fn exit_code(&self) -> i32 {
        if self.is_success() { 0 } else { 1 }
    }
}

/** Runs `probes` in order and stops at the first one that fails. */
pub fn run_sequence(probes: &[&Probe], paths: &ProbePaths) -> RunResult {
    for probe in probes {
        for role in probe.paths {
            debug!("{}: {:?} = {}", probe.name, role, paths.get(*role).display());
        }
        if let Err(failure) = (probe.run)(paths) {
            return RunResult::Failed(failure);
        }
    }
    RunResult::Passed {
        probes: probes.len(),
    }
}

/** The full run against the mounted filesystem: wait for it to connect,
 * pause background sync, then run `selected` in order.
 *
 * Errors are environment problems (wrong filesystem, attribute not readable,
 * pause rejected) and mean no probe ran. Probe failures come back as
 * RunResult::Failed. */
pub fn run_with<C>(
    config: &Config,
    selected: &[&Probe],
    channel: &C,
    sleep: &mut dyn FnMut(Duration),
) -> Result<RunResult>
where
    C: AttributeChannel + ?Sized,
{
    let paths = ProbePaths::from_config(config);
    outln!(
        "Using existing file path: {}, new file path: {}",
        paths.existing_file.display(),
        paths.new_file.display()
    );

    wait_ready(
        channel,
        &config.mount_root,
        &config.connected_attr,
        config.poll_interval,
        sleep,
    )?;
    report_version(channel, &config.mount_root, &config.version_attr);
    sleep(config.settle_delay);

    pause_sync(channel, &config.mount_root, &config.pause_attr)?;
    sleep(config.settle_delay);

    info!("Running {} probe(s)", selected.len());
    let result = run_sequence(selected, &paths);

    if result.is_success() && config.resume_sync {
        resume_sync(channel, &config.mount_root, &config.pause_attr)?;
    }

    Ok(result)
}

pub fn run(config: &Config) -> Result<RunResult> {
    let selected = probes::select(config.probes.as_deref());
    run_with(config, &selected, &Xattr, &mut std::thread::sleep)
}
