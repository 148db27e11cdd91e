//! Interactive terminal UI: one session, driven from the keyboard
mod app;
mod events;
mod layout;
mod rendering;
mod terminal;
mod timestamps;

use std::env;

use anyhow::{Context, Result};
pub use app::App;

use self::terminal::TerminalManager;
use crate::api::ApiClient;
use crate::config::Config;
use crate::session::Session;

/// Run the interactive TUI until the user quits.
///
/// Exports land in the current working directory.
pub fn run_interactive(config: &Config) -> Result<()> {
    let api = ApiClient::from_config(config)?;
    let session = Session::from_config(config);
    let export_dir = env::current_dir().context("Failed to resolve current directory")?;
    let mut app = App::new(api, session, config.status_refresh_interval(), export_dir);

    tracing::info!(api_url = %config.api_url, "starting interactive session");
    let mut manager = TerminalManager::new()?;
    let res = app.run(manager.terminal_mut());
    manager.restore()?;

    res
}
