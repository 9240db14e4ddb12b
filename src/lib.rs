#![allow(clippy::collapsible_else_if, clippy::collapsible_if, clippy::module_inception)]
#![deny(
    clippy::get_unwrap,
    clippy::panic,
    clippy::print_stdout,
    clippy::unwrap_used,
    clippy::use_debug,
    clippy::used_underscore_binding,
    clippy::used_underscore_items
)]

pub mod assertions;
pub mod attributes;
pub mod config;
pub mod handshake;
pub mod logger;
pub mod probes;
pub mod runner;
pub mod util;
