use nix::errno::Errno;
use std::io::{ErrorKind, Write};

/* Writes all of `data`, looping over short writes. A write that makes no
 * progress is retried; only an error from the underlying write ends the loop.
 * Interrupted writes are retried as well. */
pub fn write_fully<W: Write>(writer: &mut W, data: &[u8]) -> Result<(), Errno> {
    let mut total = 0;
    while total < data.len() {
        match writer.write(&data[total..]) {
            Ok(written) => total += written,
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(errno_of(&e)),
        }
    }
    Ok(())
}

/* Maps an io::Error back onto the errno the syscall reported. Errors that
 * did not come from the OS are reported as EIO. */
pub fn errno_of(e: &std::io::Error) -> Errno {
    e.raw_os_error().map_or(Errno::EIO, Errno::from_raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;

    /* Accepts at most `chunk` bytes per call and reports a zero-length
     * write every other call. */
    struct Trickle {
        chunk: usize,
        stall: bool,
        data: Vec<u8>,
        calls: usize,
    }

    impl Write for Trickle {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.calls += 1;
            self.stall = !self.stall;
            if self.stall {
                return Ok(0);
            }
            let n = buf.len().min(self.chunk);
            self.data.extend_from_slice(&buf[..n]);
            Ok(n)
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    struct Broken;

    impl Write for Broken {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::from_raw_os_error(libc::ENOSPC))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_partial_and_zero_writes_are_retried() {
        let mut w = Trickle {
            chunk: 2,
            stall: false,
            data: Vec::new(),
            calls: 0,
        };
        write_fully(&mut w, b"Zorba!\n").unwrap();
        assert_eq!(w.data, b"Zorba!\n");
        // 4 productive writes, each preceded by a stalled one
        assert_eq!(w.calls, 8);
    }

    #[test]
    fn test_error_is_reported_with_errno() {
        assert_eq!(write_fully(&mut Broken, b"x"), Err(Errno::ENOSPC));
    }

    #[test]
    fn test_non_os_error_maps_to_eio() {
        let e = io::Error::new(io::ErrorKind::Other, "synthetic");
        assert_eq!(errno_of(&e), Errno::EIO);
    }
}
