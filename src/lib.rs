//! rasctl -- command-line client for a Result Archive Store.
//!
//! This crate provides the library behind `rasctl runs get` (query the
//! archive, follow every page, render the runs) and `rasctl runs cancel`
//! (stop a run by name or every run in a group).

pub mod api;
pub mod config;
pub mod console;
pub mod format;
pub mod lists;
pub mod runs;

pub use api::RasClient;
pub use config::RasctlConfig;
pub use console::{Console, MemoryConsole, StdoutConsole};
pub use runs::{Result, RunsError};
