use log::warn;
use rand::Rng;
use rstest::*;
use std::ffi::CString;
use std::os::unix::ffi::OsStrExt;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use std::sync::{Mutex, MutexGuard};

const TEST_DATA_DIR: &str = "generated-test-data";

/* dir-missing pins the process umask, so tests sharing this process take
 * turns with their scratch trees. */
static SERIAL: Mutex<()> = Mutex::new(());

pub fn rid() -> String {
    let mut rng = rand::rng();
    (0..10)
        .map(|_| rng.sample(rand::distr::Alphanumeric) as char)
        .collect()
}

/* A freshly populated test tree, laid out the way the functional test
 * driver unpacks it onto the mount: an existing directory `dir` and a
 * non-empty `regular.file`. */
pub struct Scratch {
    pub root: PathBuf,
    /* When debug mode is on, the tree is left behind on drop */
    pub debug_mode: bool,
    _serial: MutexGuard<'static, ()>,
}

impl Scratch {
    pub fn new() -> Self {
        // a failed test poisons the lock; the next one still gets a turn
        let serial = SERIAL.lock().unwrap_or_else(|e| e.into_inner());
        let root = Path::new(TEST_DATA_DIR).join(format!("fsprobe-test-{}", rid()));
        std::fs::create_dir_all(root.join("dir")).unwrap();
        std::fs::write(root.join("regular.file"), "some existing content\n").unwrap();
        let root = root.canonicalize().unwrap();
        Self {
            root,
            debug_mode: false,
            _serial: serial,
        }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /* Sets a user xattr on the root. Returns false if the filesystem the
     * test data lives on doesn't support them. */
    pub fn set_attr(&self, name: &str, value: &[u8]) -> bool {
        let path = CString::new(self.root.as_os_str().as_bytes()).unwrap();
        let name = CString::new(name).unwrap();
        let result = unsafe {
            libc::setxattr(
                path.as_ptr(),
                name.as_ptr(),
                value.as_ptr() as *const libc::c_void,
                value.len(),
                0,
            )
        };
        if result != 0 {
            println!(
                "setxattr not available on {}: {}",
                self.root.display(),
                std::io::Error::last_os_error()
            );
        }
        result == 0
    }

    /* Runs the fsprobe binary with the scratch tree as its working
     * directory and a clean fsprobe environment. */
    pub fn run_binary(&self, env: &[(&str, &str)]) -> Output {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_fsprobe"));
        cmd.current_dir(&self.root);
        for (key, _) in std::env::vars() {
            if key.starts_with("FSPROBE_") || key == "USR_DIR" {
                cmd.env_remove(key);
            }
        }
        cmd.env("FSPROBE_SETTLE_DELAY_MS", "0");
        cmd.env("FSPROBE_POLL_INTERVAL_MS", "10");
        cmd.envs(env.iter().copied());
        println!("Running {:?} in {}", cmd.get_program(), self.root.display());

        let output = cmd.output().unwrap();
        println!("stdout: {}", String::from_utf8_lossy(&output.stdout));
        println!("stderr: {}", String::from_utf8_lossy(&output.stderr));
        output
    }
}

impl Drop for Scratch {
    fn drop(&mut self) {
        if self.debug_mode {
            warn!("Debug mode is on, *NOT* cleaning up {}", self.root.display());
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.root) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!("Failed to remove {}: {}", self.root.display(), e);
            }
        }
    }
}

#[fixture]
pub fn scratch() -> Scratch {
    Scratch::new()
}
