pub mod commands;
mod output;

pub use commands::{Cli, Commands, SearchArgs, run};
