//! `stockroom` command-line front end: configuration and the interactive menu.

pub mod config;
pub mod menu;

pub use config::CliConfig;
pub use menu::{Command, Session, open_inventory};
