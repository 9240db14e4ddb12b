use crate::attributes::{AttributeChannel, SetMode};
use anyhow::{Context, Result};
use log::info;
use std::path::Path;

/** Tells the filesystem to stop synchronising with the backing server so the
 * probes see a stable local cache.
 *
 * The attribute is replaced, never created: if it is absent, `path` is not a
 * mount of the filesystem we are testing and the run must not go ahead. */
pub fn pause_sync<C>(channel: &C, path: &Path, attribute: &str) -> Result<()>
where
    C: AttributeChannel + ?Sized,
{
    channel
        .set(path, attribute, b"1", SetMode::ReplaceOnly)
        .with_context(|| {
            format!("Unable to set {} on {}", attribute, path.display())
        })?;
    info!("Background sync paused");
    Ok(())
}

/* Clears the pause set by pause_sync. */
pub fn resume_sync<C>(channel: &C, path: &Path, attribute: &str) -> Result<()>
where
    C: AttributeChannel + ?Sized,
{
    channel
        .set(path, attribute, b"0", SetMode::ReplaceOnly)
        .with_context(|| {
            format!("Unable to clear {} on {}", attribute, path.display())
        })?;
    info!("Background sync resumed");
    Ok(())
}
