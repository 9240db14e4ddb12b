//! Out-of-band signalling with the filesystem under test.
//!
//! The caching filesystem exposes its state and accepts commands through
//! extended attributes on the root of the mount. Nothing here retries or
//! decides whether an error is fatal; that is up to the caller.

#[cfg(test)]
pub mod memory;
mod xattr;

pub use xattr::Xattr;

use nix::errno::Errno;
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetMode {
    /// Create the attribute if it is missing.
    Upsert,
    /// Fail with ENODATA if the attribute does not already exist.
    ReplaceOnly,
}

pub trait AttributeChannel {
    fn get(&self, path: &Path, name: &str) -> Result<Vec<u8>, AttributeError>;

    fn set(
        &self,
        path: &Path,
        name: &str,
        value: &[u8],
        mode: SetMode,
    ) -> Result<(), AttributeError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeError {
    pub path: PathBuf,
    pub name: String,
    pub errno: Errno,
}

impl AttributeError {
    pub fn new(path: &Path, name: &str, errno: Errno) -> Self {
        Self {
            path: path.to_path_buf(),
            name: name.to_string(),
            errno,
        }
    }
}

impl fmt::Display for AttributeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "attribute {} on {}: Errno {}: {}",
            self.name,
            self.path.display(),
            self.errno as i32,
            self.errno.desc()
        )
    }
}

impl std::error::Error for AttributeError {}
