use super::ProbePaths;
use crate::assertions::{CheckpointFailure, ProbeTracker};
use crate::util::errno_of;
use nix::errno::Errno;
use nix::sys::stat::{Mode, SFlag, stat, umask};
use nix::unistd::mkdir;

const DIR_MODE: u32 = 0o755;

pub const DIR_EXISTS_CHECKPOINTS: &[&str] = &["mkdir fails with EEXIST"];

pub const DIR_MISSING_CHECKPOINTS: &[&str] = &[
    "mkdir",
    "stat",
    "is a directory",
    "mode is 0755",
    "rmdir",
    "stat after rmdir fails with ENOENT",
];

/** mkdir of a directory that already exists must fail with EEXIST. */
pub fn dir_exists(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = paths.existing_dir.as_path();
    let mut t = ProbeTracker::begin("dir-exists", DIR_EXISTS_CHECKPOINTS);

    t.expect_errno(
        mkdir(path, Mode::from_bits_truncate(DIR_MODE)),
        Errno::EEXIST,
        || format!("mkdir of existing directory {}", path.display()),
    )?;

    t.complete(true)
}

/** mkdir of a fresh directory succeeds, stat reports a 0755 directory, and
 * the directory can be removed again. */
pub fn dir_missing(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = paths.missing_dir.as_path();
    let mut t = ProbeTracker::begin("dir-missing", DIR_MISSING_CHECKPOINTS);

    // Pin the umask so the mode we read back is the mode we asked for. The
    // umask is process-wide: files other threads create in this window get
    // 022 too, so callers running probes on threads must serialize them.
    let old_umask = umask(Mode::from_bits_truncate(0o022));
    let created = mkdir(path, Mode::from_bits_truncate(DIR_MODE));
    umask(old_umask);
    t.check(created, || format!("Unable to mkdir {}", path.display()))?;

    let st = t.check(stat(path), || {
        format!("Unable to stat previously made dir {}", path.display())
    })?;

    let file_type = st.st_mode & SFlag::S_IFMT.bits();
    t.ensure(file_type == SFlag::S_IFDIR.bits(), || {
        format!(
            "Stat mode of {} shows as not dir\nMode was {:o}",
            path.display(),
            st.st_mode
        )
    })?;

    let permissions = st.st_mode & 0o777;
    t.ensure(permissions == DIR_MODE, || {
        format!(
            "Stat mode of {} shows as not {:o}\nMode was {:o}",
            path.display(),
            DIR_MODE,
            st.st_mode
        )
    })?;

    t.check(
        std::fs::remove_dir(path).map_err(|e| errno_of(&e)),
        || format!("Attempt to rmdir {} failed", path.display()),
    )?;

    t.expect_errno(stat(path), Errno::ENOENT, || {
        format!("stat of removed dir {}", path.display())
    })?;

    t.complete(true)
}
