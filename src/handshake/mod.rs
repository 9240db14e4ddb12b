mod readiness;
mod sync;

pub use readiness::*;
pub use sync::*;
