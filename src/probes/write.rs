use super::ProbePaths;
use crate::assertions::{CheckpointFailure, ProbeTracker};
use crate::util::{close, errno_of, open_rw, write_fully};
use nix::errno::Errno;
use std::fs::File;
use std::io::{Read, Seek};
use std::path::Path;

pub const WRITE_MARKER: &[u8] = b"Zorba!\n";
pub const WRITE_REPEAT: usize = 5;

pub const SINGLE_WRITE_CHECKPOINTS: &[&str] = &[
    "open with O_CREAT",
    "write",
    "tell",
    "offset is marker length",
    "close",
    "contents",
];

pub const MULTIPLE_WRITE_CHECKPOINTS: &[&str] = &[
    "open with O_CREAT",
    "repeated writes",
    "tell",
    "offset is repeated marker length",
    "close",
    "contents",
];

fn offset(file: &mut File) -> Result<u64, Errno> {
    file.stream_position().map_err(|e| errno_of(&e))
}

fn leading_bytes(path: &Path, len: usize) -> Result<Vec<u8>, Errno> {
    let mut buffer = Vec::with_capacity(len);
    File::open(path)
        .and_then(|f| f.take(len as u64).read_to_end(&mut buffer))
        .map_err(|e| errno_of(&e))?;
    Ok(buffer)
}

fn check_contents(
    t: &mut ProbeTracker,
    path: &Path,
    expected: &[u8],
) -> Result<(), CheckpointFailure> {
    match leading_bytes(path, expected.len()) {
        Ok(contents) => t.ensure(contents == expected, || {
            format!(
                "{} starts with {:?}, expected {:?}",
                path.display(),
                String::from_utf8_lossy(&contents),
                String::from_utf8_lossy(expected)
            )
        }),
        Err(errno) => Err(t.fail(
            format!("Unable to read back {}", path.display()),
            Some(errno),
        )),
    }
}

/** Create (or open) the test file and write the marker once. */
pub fn single_write(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = &paths.new_file;
    let mut t = ProbeTracker::begin("single-write", SINGLE_WRITE_CHECKPOINTS);

    let mut file = t.check(open_rw(path, Some(0o644)), || {
        format!("Unable to open {}", path.display())
    })?;

    t.check(write_fully(&mut file, WRITE_MARKER), || {
        format!("Unable to write to {}", path.display())
    })?;

    let position = t.check(offset(&mut file), || {
        format!("Unable to get offset of {}", path.display())
    })?;
    t.ensure(position == WRITE_MARKER.len() as u64, || {
        format!("Offset is {} after writing {} bytes", position, WRITE_MARKER.len())
    })?;

    t.check(close(file), || format!("Unable to close {}", path.display()))?;

    check_contents(&mut t, path, WRITE_MARKER)?;

    t.complete(true)
}

/** Open the same file without truncating it and write the marker
 * WRITE_REPEAT times through one descriptor. Writing starts at offset 0, so
 * whatever single-write left behind is overwritten. */
pub fn multiple_write(paths: &ProbePaths) -> Result<(), CheckpointFailure> {
    let path = &paths.new_file;
    let mut t =
        ProbeTracker::begin("multiple-write", MULTIPLE_WRITE_CHECKPOINTS);

    let mut file = t.check(open_rw(path, Some(0o644)), || {
        format!("Unable to create file {}", path.display())
    })?;

    let mut failed = None;
    for i in 1..=WRITE_REPEAT {
        if let Err(errno) = write_fully(&mut file, WRITE_MARKER) {
            failed = Some((i, errno));
            break;
        }
    }
    if let Some((i, errno)) = failed {
        return Err(t.fail(
            format!(
                "Unable to write to file {} (write {} of {})",
                path.display(),
                i,
                WRITE_REPEAT
            ),
            Some(errno),
        ));
    }
    t.pass();

    let expected = WRITE_MARKER.repeat(WRITE_REPEAT);
    let position = t.check(offset(&mut file), || {
        format!("Unable to get offset of {}", path.display())
    })?;
    t.ensure(position == expected.len() as u64, || {
        format!("Offset is {} after writing {} bytes", position, expected.len())
    })?;

    t.check(close(file), || format!("Unable to close {}", path.display()))?;

    check_contents(&mut t, path, &expected)?;

    t.complete(true)
}
