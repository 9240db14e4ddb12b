use crate::attributes::AttributeChannel;
use crate::outln;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::path::Path;
use std::time::Duration;

/// The readiness attribute reports connected only when its value is exactly
/// this literal.
pub const CONNECTED: &[u8] = b"1";

pub fn is_connected(value: &[u8]) -> bool {
    value == CONNECTED
}

/** Blocks until the filesystem mounted at `path` reports itself connected.
 *
 * The readiness attribute is re-read every `poll_interval`; a value other than
 * "1" means the filesystem is still mounting and we keep waiting. Failing to
 * read the attribute at all means `path` is not the filesystem we expect and
 * is returned as an error. There is no timeout. */
pub fn wait_ready<C>(
    channel: &C,
    path: &Path,
    attribute: &str,
    poll_interval: Duration,
    sleep: &mut dyn FnMut(Duration),
) -> Result<()>
where
    C: AttributeChannel + ?Sized,
{
    let mut polls = 0usize;
    loop {
        let value = channel.get(path, attribute).with_context(|| {
            format!(
                "Unable to read readiness attribute {} from {}",
                attribute,
                path.display()
            )
        })?;
        polls += 1;

        if is_connected(&value) {
            debug!("Connected after {} poll(s)", polls);
            outln!("Mounted.");
            return Ok(());
        }

        debug!(
            "{} = {:?}, not connected yet",
            attribute,
            String::from_utf8_lossy(&value)
        );
        outln!("Waiting for filesystem to mount.");
        sleep(poll_interval);
    }
}

/* Logs the version the filesystem reports about itself. Purely
 * informational, a missing attribute is not an error. */
pub fn report_version<C>(channel: &C, path: &Path, attribute: &str)
where
    C: AttributeChannel + ?Sized,
{
    match channel.get(path, attribute) {
        Ok(version) => info!(
            "Filesystem version: {}",
            String::from_utf8_lossy(&version).trim()
        ),
        Err(e) => warn!("Unable to read filesystem version: {}", e),
    }
}
