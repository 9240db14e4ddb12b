use super::{AttributeChannel, AttributeError, SetMode};
use log::trace;
use nix::errno::Errno;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::Path;

/* Extended attributes through getxattr(2)/setxattr(2). Symlinks are
 * followed, the attributes of interest live on the mount root directory. */
#[derive(Debug, Default, Clone, Copy)]
pub struct Xattr;

fn to_cstrings(
    path: &Path,
    name: &str,
) -> Result<(CString, CString), AttributeError> {
    let invalid = |_| AttributeError::new(path, name, Errno::EINVAL);
    let path_cstr = CString::new(path.as_os_str().as_bytes()).map_err(invalid)?;
    let name_cstr = CString::new(name).map_err(invalid)?;
    Ok((path_cstr, name_cstr))
}

impl AttributeChannel for Xattr {
    fn get(&self, path: &Path, name: &str) -> Result<Vec<u8>, AttributeError> {
        let (path_cstr, name_cstr) = to_cstrings(path, name)?;

        // Status attributes are a handful of bytes, so start small and only
        // ask the kernel for the real size if that doesn't fit.
        let mut buffer = vec![0u8; 64];
        loop {
            let result = unsafe {
                libc::getxattr(
                    path_cstr.as_ptr(),
                    name_cstr.as_ptr(),
                    buffer.as_mut_ptr() as *mut libc::c_void,
                    buffer.len(),
                )
            };

            if result >= 0 {
                buffer.truncate(result as usize);
                trace!(
                    "getxattr({}, {}) = {:?}",
                    path.display(),
                    name,
                    String::from_utf8_lossy(&buffer)
                );
                return Ok(buffer);
            }

            let errno = Errno::last();
            if errno != Errno::ERANGE {
                return Err(AttributeError::new(path, name, errno));
            }

            let size = unsafe {
                libc::getxattr(
                    path_cstr.as_ptr(),
                    name_cstr.as_ptr(),
                    std::ptr::null_mut(),
                    0,
                )
            };
            if size < 0 {
                return Err(AttributeError::new(path, name, Errno::last()));
            }
            // The value may have grown between the two calls; go around again.
            buffer.resize(size as usize + 1, 0);
        }
    }

    fn set(
        &self,
        path: &Path,
        name: &str,
        value: &[u8],
        mode: SetMode,
    ) -> Result<(), AttributeError> {
        let (path_cstr, name_cstr) = to_cstrings(path, name)?;
        let flags = match mode {
            SetMode::Upsert => 0,
            SetMode::ReplaceOnly => libc::XATTR_REPLACE,
        };

        let result = unsafe {
            libc::setxattr(
                path_cstr.as_ptr(),
                name_cstr.as_ptr(),
                value.as_ptr() as *const libc::c_void,
                value.len(),
                flags,
            )
        };
        trace!(
            "setxattr({}, {}, {:?}, {:?}) = {}",
            path.display(),
            name,
            String::from_utf8_lossy(value),
            mode,
            result
        );

        if result < 0 {
            return Err(AttributeError::new(path, name, Errno::last()));
        }
        Ok(())
    }
}
