use super::ProbePaths;
use crate::assertions::{CheckpointFailure, ProbeTracker};
use crate::util::{close, file_len, ftruncate, open_rw, path_len, truncate, unlink, write_fully};
use log::debug;
use nix::errno::Errno;

/// Written back after truncating the existing file so it is not left empty
/// by the fd variant.
pub const TRUNCATE_MARKER: &[u8] = b"blah\n";

pub const FTRUNCATE_EXISTING_CHECKPOINTS: &[&str] = &[
    "open",
    "ftruncate",
    "fstat",
    "length is zero",
    "write marker",
    "close",
    "stat",
    "length is marker length",
];

pub const TRUNCATE_EXISTING_CHECKPOINTS: &[&str] = &["truncate", "stat", "length is zero"];

pub const FTRUNCATE_MISSING_CHECKPOINTS: &[&str] =
    &["open with O_CREAT", "ftruncate", "close", "unlink"];

pub const TRUNCATE_MISSING_CHECKPOINTS: &[&str] = &["truncate fails with ENOENT"];

/** ftruncate(fd, 0) on an existing file, then write a marker line back. */
pub fn ftruncate_existing(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = &paths.existing_file;
    let mut t =
        ProbeTracker::begin("ftruncate-existing", FTRUNCATE_EXISTING_CHECKPOINTS);

    if let Ok(len) = path_len(path) {
        debug!("{} is {} bytes before truncation", path.display(), len);
    }

    let mut file = t.check(open_rw(path, None), || {
        format!("Unable to open {}", path.display())
    })?;

    t.check(ftruncate(&file, 0), || {
        format!("Unable to ftruncate {}", path.display())
    })?;

    let len = t.check(file_len(&file), || {
        format!("Unable to fstat {} after ftruncate", path.display())
    })?;
    t.ensure(len == 0, || {
        format!("{} is {} bytes after ftruncate to 0", path.display(), len)
    })?;

    t.check(write_fully(&mut file, TRUNCATE_MARKER), || {
        format!("Unable to write to {}", path.display())
    })?;

    t.check(close(file), || format!("Unable to close {}", path.display()))?;

    let len = t.check(path_len(path), || {
        format!("Unable to stat {}", path.display())
    })?;
    t.ensure(len == TRUNCATE_MARKER.len() as u64, || {
        format!(
            "{} is {} bytes, expected {} after writing the marker",
            path.display(),
            len,
            TRUNCATE_MARKER.len()
        )
    })?;

    t.complete(true)
}

/** truncate(path, 0) on an existing file. */
pub fn truncate_existing(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = &paths.existing_file;
    let mut t =
        ProbeTracker::begin("truncate-existing", TRUNCATE_EXISTING_CHECKPOINTS);

    t.check(truncate(path, 0), || {
        format!("Unable to truncate {}", path.display())
    })?;

    let len = t.check(path_len(path), || {
        format!("Unable to stat {} after truncate", path.display())
    })?;
    t.ensure(len == 0, || {
        format!("{} is {} bytes after truncate to 0", path.display(), len)
    })?;

    t.complete(true)
}

/** Create a file, ftruncate it through the new descriptor, then remove it. */
pub fn ftruncate_missing(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = &paths.new_file;
    let mut t =
        ProbeTracker::begin("ftruncate-missing", FTRUNCATE_MISSING_CHECKPOINTS);

    let file = t.check(open_rw(path, Some(0o644)), || {
        format!("Unable to open {}", path.display())
    })?;

    t.check(ftruncate(&file, 0), || {
        format!("Unable to ftruncate {}", path.display())
    })?;

    t.check(close(file), || format!("Unable to close {}", path.display()))?;

    t.check(unlink(path), || format!("Unable to unlink {}", path.display()))?;

    t.complete(true)
}

/** truncate(path, 0) on a path that does not exist must fail with ENOENT
 * and must not create anything. */
pub fn truncate_missing(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = &paths.new_file;
    let mut t =
        ProbeTracker::begin("truncate-missing", TRUNCATE_MISSING_CHECKPOINTS);

    t.expect_errno(truncate(path, 0), Errno::ENOENT, || {
        format!("truncate of nonexisting file {}", path.display())
    })?;

    t.complete(true)
}
