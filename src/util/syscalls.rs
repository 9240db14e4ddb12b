use super::errno_of;
use nix::errno::Errno;
use std::fs::{File, OpenOptions};
use std::os::unix::fs::OpenOptionsExt;
use std::os::unix::io::IntoRawFd;
use std::path::Path;

/* Thin wrappers that report failures as the errno the kernel returned, which
 * is what the probes assert on. */

/// open(path, O_RDWR), adding O_CREAT with `create_mode` when given.
pub fn open_rw(path: &Path, create_mode: Option<u32>) -> Result<File, Errno> {
    let mut options = OpenOptions::new();
    options.read(true).write(true);
    if let Some(mode) = create_mode {
        options.create(true).mode(mode);
    }
    options.open(path).map_err(|e| errno_of(&e))
}

/// close(2) with its result, which dropping a File throws away.
pub fn close(file: File) -> Result<(), Errno> {
    nix::unistd::close(file.into_raw_fd())
}

pub fn ftruncate(file: &File, len: u64) -> Result<(), Errno> {
    file.set_len(len).map_err(|e| errno_of(&e))
}

pub fn truncate(path: &Path, len: libc::off_t) -> Result<(), Errno> {
    nix::unistd::truncate(path, len)
}

pub fn file_len(file: &File) -> Result<u64, Errno> {
    file.metadata().map(|m| m.len()).map_err(|e| errno_of(&e))
}

pub fn path_len(path: &Path) -> Result<u64, Errno> {
    std::fs::metadata(path)
        .map(|m| m.len())
        .map_err(|e| errno_of(&e))
}

pub fn unlink(path: &Path) -> Result<(), Errno> {
    nix::unistd::unlink(path)
}
