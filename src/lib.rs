pub mod cli;
pub mod config;
pub mod contacts;
pub mod export;

pub use cli::{Cli, CliHandler, RunMode};
pub use config::{AccountConfig, AppConfig};
