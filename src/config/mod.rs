pub mod impls;
pub mod resolve;
pub mod structs;

pub use resolve::{resolve_config, resolve_config_with};
pub use structs::*;
