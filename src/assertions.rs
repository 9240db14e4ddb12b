//! Checkpoint bookkeeping for probes.
//!
//! A probe opens a [`ProbeTracker`], routes every observation through it, and
//! returns the first [`CheckpointFailure`] with `?`. Nothing records a failure
//! and carries on: once a checkpoint fails the filesystem is in a state nobody
//! has diagnosed yet, so the runner stops at the first failure.

use crate::outln;
use log::{error, trace};
use nix::errno::Errno;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckpointFailure {
    pub probe: &'static str,
    /// 1-based index of the failing checkpoint within the probe.
    pub checkpoint: usize,
    pub label: String,
    pub message: String,
    pub errno: Option<Errno>,
}

impl fmt::Display for CheckpointFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: checkpoint {} ({}): {}",
            self.probe, self.checkpoint, self.label, self.message
        )?;
        if let Some(errno) = self.errno {
            write!(f, "\nErrno {}: {}", errno as i32, errno.desc())?;
        }
        Ok(())
    }
}

impl std::error::Error for CheckpointFailure {}

pub struct ProbeTracker {
    probe: &'static str,
    labels: &'static [&'static str],
    passed: usize,
}

impl ProbeTracker {
    pub fn begin(probe: &'static str, labels: &'static [&'static str]) -> Self {
        outln!("[ RUN  ] {}", probe);
        Self {
            probe,
            labels,
            passed: 0,
        }
    }

    pub fn passed(&self) -> usize {
        self.passed
    }

    fn current_label(&self) -> String {
        self.labels
            .get(self.passed)
            .map_or_else(|| format!("checkpoint {}", self.passed + 1), |l| l.to_string())
    }

    pub fn pass(&mut self) {
        trace!(
            "{}: checkpoint {} ({}) ok",
            self.probe,
            self.passed + 1,
            self.current_label()
        );
        self.passed += 1;
    }

    pub fn fail(
        &mut self,
        message: impl Into<String>,
        errno: Option<Errno>,
    ) -> CheckpointFailure {
        let failure = CheckpointFailure {
            probe: self.probe,
            checkpoint: self.passed + 1,
            label: self.current_label(),
            message: message.into(),
            errno,
        };
        outln!("[ FAIL ] {}", self.probe);
        error!("{}", failure);
        failure
    }

    /// Passes if `result` is Ok and hands back its value.
    pub fn check<T>(
        &mut self,
        result: Result<T, Errno>,
        message: impl FnOnce() -> String,
    ) -> Result<T, CheckpointFailure> {
        match result {
            Ok(value) => {
                self.pass();
                Ok(value)
            }
            Err(errno) => Err(self.fail(message(), Some(errno))),
        }
    }

    /// Passes only if `result` failed with exactly `expected`.
    pub fn expect_errno<T>(
        &mut self,
        result: Result<T, Errno>,
        expected: Errno,
        message: impl FnOnce() -> String,
    ) -> Result<(), CheckpointFailure> {
        match result {
            Err(errno) if errno == expected => {
                self.pass();
                Ok(())
            }
            Err(errno) => Err(self.fail(
                format!("{} (expected {})", message(), expected),
                Some(errno),
            )),
            Ok(_) => Err(self.fail(
                format!("{} (succeeded, expected {})", message(), expected),
                None,
            )),
        }
    }

    pub fn ensure(
        &mut self,
        condition: bool,
        message: impl FnOnce() -> String,
    ) -> Result<(), CheckpointFailure> {
        if condition {
            self.pass();
            Ok(())
        } else {
            Err(self.fail(message(), None))
        }
    }

    /* Closes the probe. A probe that reaches this point without `ok` has
     * failed without saying which checkpoint broke; that is still a
     * failure. */
    pub fn complete(mut self, ok: bool) -> Result<(), CheckpointFailure> {
        if !ok {
            return Err(self.fail("probe finished without succeeding", None));
        }
        outln!("[  OK  ] {} ({} checkpoints)", self.probe, self.passed);
        Ok(())
    }
}
