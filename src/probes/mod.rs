mod mkdir;
mod truncate;
mod write;

pub use mkdir::*;
pub use truncate::*;
pub use write::*;

use crate::assertions::CheckpointFailure;
use crate::config::Config;
use std::path::{Path, PathBuf};

pub const EXISTING_DIR: &str = "dir";
pub const MISSING_DIR: &str = "this.file.shouldnt.exist";
pub const EXISTING_FILE: &str = "regular.file";
pub const NEW_FILE: &str = "this.file.shouldnt.exist";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathRole {
    ExistingDir,
    MissingDir,
    ExistingFile,
    NewFile,
}

/* Every path a probe may touch, resolved once at startup. Directory probes
 * work relative to the mount root, file probes relative to the base dir. */
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbePaths {
    pub existing_dir: PathBuf,
    pub missing_dir: PathBuf,
    pub existing_file: PathBuf,
    pub new_file: PathBuf,
}

impl ProbePaths {
    pub fn new(mount_root: &Path, base_dir: &Path) -> Self {
        Self {
            existing_dir: mount_root.join(EXISTING_DIR),
            missing_dir: mount_root.join(MISSING_DIR),
            existing_file: base_dir.join(EXISTING_FILE),
            new_file: base_dir.join(NEW_FILE),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(&config.mount_root, &config.base_dir)
    }

    pub fn get(&self, role: PathRole) -> &Path {
        match role {
            PathRole::ExistingDir => &self.existing_dir,
            PathRole::MissingDir => &self.missing_dir,
            PathRole::ExistingFile => &self.existing_file,
            PathRole::NewFile => &self.new_file,
        }
    }
}

pub type ProbeFn = fn(&ProbePaths) -> Result<(), CheckpointFailure>;

pub struct Probe {
    pub name: &'static str,
    /// The checkpoints the probe asserts, in order.
    pub checkpoints: &'static [&'static str],
    pub paths: &'static [PathRole],
    pub run: ProbeFn,
}

/* Order matters: existence checks come before anything that mutates, the
 * missing-file truncate runs before the write probes create that file, and
 * single-write runs before multiple-write. */
pub static REGISTRY: [Probe; 8] = [
    Probe {
        name: "dir-exists",
        checkpoints: DIR_EXISTS_CHECKPOINTS,
        paths: &[PathRole::ExistingDir],
        run: dir_exists,
    },
    Probe {
        name: "dir-missing",
        checkpoints: DIR_MISSING_CHECKPOINTS,
        paths: &[PathRole::MissingDir],
        run: dir_missing,
    },
    Probe {
        name: "ftruncate-existing",
        checkpoints: FTRUNCATE_EXISTING_CHECKPOINTS,
        paths: &[PathRole::ExistingFile],
        run: ftruncate_existing,
    },
    Probe {
        name: "truncate-existing",
        checkpoints: TRUNCATE_EXISTING_CHECKPOINTS,
        paths: &[PathRole::ExistingFile],
        run: truncate_existing,
    },
    Probe {
        name: "ftruncate-missing",
        checkpoints: FTRUNCATE_MISSING_CHECKPOINTS,
        paths: &[PathRole::NewFile],
        run: ftruncate_missing,
    },
    Probe {
        name: "truncate-missing",
        checkpoints: TRUNCATE_MISSING_CHECKPOINTS,
        paths: &[PathRole::NewFile],
        run: truncate_missing,
    },
    Probe {
        name: "single-write",
        checkpoints: SINGLE_WRITE_CHECKPOINTS,
        paths: &[PathRole::NewFile],
        run: single_write,
    },
    Probe {
        name: "multiple-write",
        checkpoints: MULTIPLE_WRITE_CHECKPOINTS,
        paths: &[PathRole::NewFile],
        run: multiple_write,
    },
];

pub fn probe_names() -> Vec<&'static str> {
    REGISTRY.iter().map(|probe| probe.name).collect()
}

/* The probes to run, in registry order whatever order they were
 * selected in. */
pub fn select(selected: Option<&[String]>) -> Vec<&'static Probe> {
    REGISTRY
        .iter()
        .filter(|probe| {
            selected.is_none_or(|names| names.iter().any(|n| n == probe.name))
        })
        .collect()
}
