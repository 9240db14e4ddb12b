#![allow(clippy::print_stdout)]

use std::io::Write;

/* Console progress goes to stdout and is flushed per line so that it
 * interleaves sensibly with the logger's stderr output when both are piped
 * into the same file by a test driver. */
pub fn print_output(printed_output: &str) {
    let stdout = std::io::stdout();
    let mut lock = stdout.lock();
    let _ = writeln!(lock, "{}", printed_output);
    let _ = lock.flush();
}

#[macro_export]
macro_rules! outln {
    ( $fmt:expr $(, $args:expr)*) => {
        $crate::util::print_output(&format!($fmt $(, $args)*))
    };
}
