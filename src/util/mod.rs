mod output;
mod syscalls;
mod write_fully;

pub use output::*;
pub use syscalls::*;
pub use write_fully::*;
