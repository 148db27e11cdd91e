use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use crossterm::style::Stylize;

use super::output::{print_account, print_leads, print_usage};
use crate::api::{ApiClient, ClientError, LeadApi};
use crate::config::{Config, ConfigOverrides, PAGE_SIZES};
use crate::export::{default_file_name, export_to_file};
use crate::logging::{LogTarget, init_logging};
use crate::models::{DEFAULT_COUNT, LeadFilter};
use crate::session::{EMPTY_FIELDS_MESSAGE, Session, StatusRefresh};
use crate::tui::run_interactive;

#[derive(Parser)]
#[command(name = "lead-search")]
#[command(version = "0.1.0")]
#[command(about = "Search a lead-generation API for business contacts", long_about = None)]
pub struct Cli {
    /// Config file (default: <config dir>/lead-search/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Base URL of the lead API, overriding config and LEAD_API_URL
    #[arg(long, global = true, value_name = "URL")]
    pub api_url: Option<String>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for leads and print one page of results
    Search(SearchArgs),
    /// Show tier and usage for the configured key
    Status,
    /// Exchange a license key for a premium API key
    Activate {
        license_key: String,
    },
    /// Check a premium key and show its tier
    Login {
        premium_key: String,
    },
    /// Release the current key on the server
    Logout,
    /// Open the interactive terminal UI
    Interactive,
}

#[derive(Args, Debug, Clone)]
pub struct SearchArgs {
    /// What to search for, e.g. "dentist"
    pub keyword: String,

    /// Where to search, e.g. "Berlin"
    pub location: String,

    /// Number of leads to request (clamped to the tier's range)
    #[arg(short, long, default_value_t = DEFAULT_COUNT)]
    pub count: u32,

    /// Page of results to print, starting at 1
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
    pub page: u32,

    /// Rows per page: 5, 10, 20 or 50
    #[arg(long, value_parser = parse_page_size)]
    pub page_size: Option<usize>,

    /// Only show and export leads with an email address
    #[arg(long)]
    pub email_only: bool,

    /// Write the results to CSV; defaults to <keyword>_<location>_leads.csv
    #[arg(long, value_name = "PATH")]
    pub export: Option<Option<PathBuf>>,
}

fn parse_page_size(value: &str) -> Result<usize, String> {
    let size: usize = value.parse().map_err(|_| format!("'{}' is not a number", value))?;
    if PAGE_SIZES.contains(&size) {
        Ok(size)
    } else {
        Err(format!("page size must be one of {:?}", PAGE_SIZES))
    }
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("Use --help for usage information");
        return Ok(());
    };

    let log_target = match command {
        Commands::Interactive => LogTarget::default_file()?,
        _ => LogTarget::Stderr,
    };
    init_logging(cli.verbose, &log_target)?;

    let overrides = ConfigOverrides { config_path: cli.config, api_url: cli.api_url };
    let config = Config::load(&overrides)?;

    if let Commands::Interactive = command {
        return run_interactive(&config);
    }

    let api = ApiClient::from_config(&config)?;
    let mut session = Session::from_config(&config);
    let mut stdout = io::stdout().lock();

    match &command {
        Commands::Search(args) => search(&api, &mut session, args, &mut stdout),
        Commands::Status => show_status(&api, &mut session, &mut stdout),
        Commands::Activate { license_key } => activate(&api, &mut session, license_key, &mut stdout),
        Commands::Login { premium_key } => login(&api, &mut session, premium_key, &mut stdout),
        Commands::Logout => logout(&api, &mut session, &mut stdout),
        Commands::Interactive => Ok(()),
    }
}

fn search(api: &dyn LeadApi, session: &mut Session, args: &SearchArgs, out: &mut dyn Write) -> Result<()> {
    if let Some(size) = args.page_size {
        session.set_page_size(size);
    }

    if args.keyword.trim().is_empty() || args.location.trim().is_empty() {
        return Err(ClientError::validation(EMPTY_FIELDS_MESSAGE).into());
    }

    // The requested count is clamped to the key's tier, which only /status knows
    match session.refresh_status(api) {
        Ok(StatusRefresh::Updated) => {}
        Ok(StatusRefresh::FellBackToFree) => {
            eprintln!(
                "{}",
                "warning: the server did not recognize this key; searching as the free tier".yellow()
            );
        }
        Err(err) => {
            tracing::warn!(error = %err, "tier lookup before search failed");
            let warning =
                format!("warning: could not check the account tier ({}); searching as the free tier", err);
            eprintln!("{}", warning.yellow());
        }
    }

    let summary = session.submit_search(api, &args.keyword, &args.location, args.count)?;
    if summary.counts.total == 0 {
        writeln!(out, "{}", summary.message().yellow())?;
        return Ok(());
    }
    writeln!(out, "{}", summary.message().green())?;

    let filter = if args.email_only { LeadFilter::WithEmail } else { LeadFilter::All };
    let rows = session.filtered(filter);
    let mut pager = *session.pager();
    pager.go_to(args.page as usize - 1, rows.len());
    print_leads(out, pager.slice(&rows))?;
    writeln!(out, "{}", pager.label(rows.len()))?;
    print_usage(out, session.usage())?;

    if let Some(target) = &args.export {
        let file_name = default_file_name(session.last_query(), filter);
        let path = export_path(target.as_deref(), &file_name);
        let written = export_to_file(&path, session.results(), filter)?;
        writeln!(out, "Exported {} rows to {}", written, path.display())?;
    }
    Ok(())
}

/// No path: default name in the working directory; a directory: default name inside it
fn export_path(target: Option<&Path>, file_name: &str) -> PathBuf {
    match target {
        None => PathBuf::from(file_name),
        Some(dir) if dir.is_dir() => dir.join(file_name),
        Some(path) => path.to_path_buf(),
    }
}

fn show_status(api: &dyn LeadApi, session: &mut Session, out: &mut dyn Write) -> Result<()> {
    if session.refresh_status(api)? == StatusRefresh::FellBackToFree {
        eprintln!("{}", "warning: the server did not recognize this key; showing the free tier".yellow());
    }
    print_account(out, session.account(), false)?;
    print_usage(out, session.usage())?;
    Ok(())
}

fn activate(api: &dyn LeadApi, session: &mut Session, license_key: &str, out: &mut dyn Write) -> Result<()> {
    let account = session.activate(api, license_key)?;
    writeln!(out, "{}", "License activated.".green())?;
    print_account(out, account, true)?;
    writeln!(out, "Set LEAD_API_KEY to this key to use it in later runs.")?;
    Ok(())
}

fn login(api: &dyn LeadApi, session: &mut Session, premium_key: &str, out: &mut dyn Write) -> Result<()> {
    let account = session.login(api, premium_key)?;
    writeln!(out, "{}", "Logged in.".green())?;
    print_account(out, account, false)?;
    Ok(())
}

fn logout(api: &dyn LeadApi, session: &mut Session, out: &mut dyn Write) -> Result<()> {
    if let Err(err) = session.logout(api) {
        eprintln!("{}", format!("warning: logout request failed: {}", err).yellow());
    }
    writeln!(out, "Logged out; back on the free tier.")?;
    print_account(out, session.account(), false)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::api::{ScrapeResponse, StatusResponse, TransportError};
    use crate::models::{AccountState, Lead, SearchQuery, Tier, UsageState};

    #[derive(Default)]
    struct ScriptedApi {
        leads: Vec<Lead>,
        quota_hit: bool,
        last_query: RefCell<Option<SearchQuery>>,
        status_code: Option<u16>,
        status_tier: Option<&'static str>,
        status_calls: RefCell<usize>,
    }

    impl LeadApi for ScriptedApi {
        fn scrape(&self, _api_key: &str, query: &SearchQuery) -> Result<ScrapeResponse, ClientError> {
            *self.last_query.borrow_mut() = Some(query.clone());
            if self.quota_hit {
                return Err(ClientError::QuotaExceeded {
                    message: "Daily limit reached".to_string(),
                    used: Some(3),
                    limit: Some(3),
                });
            }
            let usage = UsageState { daily: 1, daily_limit: 3, ..Default::default() };
            Ok(ScrapeResponse { results: self.leads.clone(), usage: Some(usage), stats: None })
        }

        fn status(&self, _api_key: &str) -> Result<StatusResponse, ClientError> {
            *self.status_calls.borrow_mut() += 1;
            match self.status_code {
                Some(status) => Err(ClientError::Api { status, message: "Unknown key".to_string() }),
                None => Ok(StatusResponse {
                    tier: self.status_tier.unwrap_or("starter").to_string(),
                    usage: UsageState { daily: 2, daily_limit: 10, ..Default::default() },
                    reset: None,
                }),
            }
        }

        fn activate(&self, _api_key: &str, _license_key: &str) -> Result<AccountState, ClientError> {
            Ok(AccountState::new(Tier::Enterprise, "ent-key-full-value"))
        }

        fn login(&self, premium_key: &str) -> Result<AccountState, ClientError> {
            Ok(AccountState::new(Tier::Pro, premium_key))
        }

        fn logout(&self, _api_key: &str) -> Result<(), ClientError> {
            Err(ClientError::Transport(TransportError::Timeout(15)))
        }
    }

    fn dentists() -> Vec<Lead> {
        (0..7)
            .map(|i| Lead {
                name: format!("Zahnarzt {}", i),
                email: (i < 4).then(|| format!("p{}@ex.de", i)),
                ..Default::default()
            })
            .collect()
    }

    fn args(extra: &[&str]) -> SearchArgs {
        let mut argv = vec!["lead-search", "search", "dentist", "Berlin"];
        argv.extend_from_slice(extra);
        match Cli::try_parse_from(argv).unwrap().command {
            Some(Commands::Search(args)) => args,
            _ => panic!("expected search command"),
        }
    }

    fn run_search(api: &ScriptedApi, extra: &[&str]) -> (Result<()>, String) {
        let mut session = Session::new("free-key-0001", 10);
        let mut out = Vec::new();
        let result = search(api, &mut session, &args(extra), &mut out);
        (result, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_cli_parses_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["lead-search", "status", "--api-url", "http://x:1", "-v"]).unwrap();
        assert_eq!(cli.api_url.as_deref(), Some("http://x:1"));
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Status)));
    }

    #[test]
    fn test_search_args_defaults() {
        let args = args(&[]);
        assert_eq!(args.count, DEFAULT_COUNT);
        assert_eq!(args.page, 1);
        assert!(args.page_size.is_none());
        assert!(args.export.is_none());
    }

    #[test]
    fn test_export_flag_with_and_without_path() {
        assert_eq!(args(&["--export"]).export, Some(None));
        assert_eq!(args(&["--export", "out.csv"]).export, Some(Some(PathBuf::from("out.csv"))));
    }

    #[test]
    fn test_invalid_page_size_and_page_rejected() {
        let argv = ["lead-search", "search", "a", "b", "--page-size", "7"];
        assert!(Cli::try_parse_from(argv).is_err());
        let argv = ["lead-search", "search", "a", "b", "--page", "0"];
        assert!(Cli::try_parse_from(argv).is_err());
    }

    #[test]
    fn test_search_prints_summary_and_page() {
        let api = ScriptedApi { leads: dentists(), ..Default::default() };
        let (result, text) = run_search(&api, &[]);

        assert!(result.is_ok());
        assert!(text.contains("7 leads (4 with email)"));
        assert!(text.contains("Zahnarzt 6"));
        assert!(text.contains("Page 1 of 1"));
        assert!(text.contains("Daily usage: 1/3"));
    }

    #[test]
    fn test_search_clamps_count_to_tier() {
        let api = ScriptedApi { leads: dentists(), ..Default::default() };
        let _ = run_search(&api, &["--count", "500"]);
        assert_eq!(api.last_query.borrow().as_ref().unwrap().count, 50);
    }

    #[test]
    fn test_search_uses_tier_reported_by_status() {
        let api = ScriptedApi { leads: dentists(), status_tier: Some("pro"), ..Default::default() };
        let (result, _) = run_search(&api, &["--count", "100"]);

        assert!(result.is_ok());
        assert_eq!(*api.status_calls.borrow(), 1);
        assert_eq!(api.last_query.borrow().as_ref().unwrap().count, 100);
    }

    #[test]
    fn test_search_falls_back_to_free_clamp_when_status_fails() {
        let api = ScriptedApi { leads: dentists(), status_code: Some(500), ..Default::default() };
        let (result, _) = run_search(&api, &["--count", "100"]);

        assert!(result.is_ok());
        assert_eq!(api.last_query.borrow().as_ref().unwrap().count, 20);
    }

    #[test]
    fn test_search_blank_fields_skip_all_requests() {
        let api = ScriptedApi { leads: dentists(), ..Default::default() };
        let mut session = Session::new("free-key-0001", 10);
        let mut blank = args(&[]);
        blank.keyword = "   ".to_string();

        let err = search(&api, &mut session, &blank, &mut Vec::new()).unwrap_err();

        assert_eq!(err.to_string(), EMPTY_FIELDS_MESSAGE);
        assert_eq!(*api.status_calls.borrow(), 0);
        assert!(api.last_query.borrow().is_none());
    }

    #[test]
    fn test_search_email_only_pages_filtered_rows() {
        let api = ScriptedApi { leads: dentists(), ..Default::default() };
        let (_, text) = run_search(&api, &["--email-only", "--page-size", "5"]);

        assert!(text.contains("Zahnarzt 3"));
        assert!(!text.contains("Zahnarzt 4"));
        assert!(text.contains("Page 1 of 1"));
    }

    #[test]
    fn test_search_page_past_end_is_clamped() {
        let api = ScriptedApi { leads: dentists(), ..Default::default() };
        let (_, text) = run_search(&api, &["--page-size", "5", "--page", "9"]);

        assert!(text.contains("Page 2 of 2"));
        assert!(text.contains("Zahnarzt 6"));
        assert!(!text.contains("Zahnarzt 0"));
    }

    #[test]
    fn test_search_exports_into_directory() {
        let dir = tempfile::tempdir().unwrap();
        let api = ScriptedApi { leads: dentists(), ..Default::default() };
        let dir_arg = dir.path().to_string_lossy().to_string();
        let (result, text) = run_search(&api, &["--email-only", "--export", &dir_arg]);

        assert!(result.is_ok());
        assert!(text.contains("Exported 4 rows"));
        let csv = std::fs::read_to_string(dir.path().join("dentist_Berlin_email_leads.csv")).unwrap();
        assert_eq!(csv.lines().count(), 5);
    }

    #[test]
    fn test_search_quota_error_propagates() {
        let api = ScriptedApi { quota_hit: true, ..Default::default() };
        let (result, text) = run_search(&api, &[]);

        let err = result.unwrap_err();
        assert_eq!(err.to_string(), "Daily limit reached (3 of 3 used)");
        assert!(text.is_empty());
    }

    #[test]
    fn test_search_no_results_message() {
        let api = ScriptedApi::default();
        let (result, text) = run_search(&api, &["--export"]);

        assert!(result.is_ok());
        assert!(text.contains("No leads found."));
    }

    #[test]
    fn test_export_path_resolution() {
        assert_eq!(export_path(None, "a_b_leads.csv"), PathBuf::from("a_b_leads.csv"));
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(export_path(Some(dir.path()), "x.csv"), dir.path().join("x.csv"));
        assert_eq!(export_path(Some(Path::new("custom.csv")), "x.csv"), PathBuf::from("custom.csv"));
    }

    #[test]
    fn test_status_prints_mirrored_state() {
        let api = ScriptedApi::default();
        let mut session = Session::new("free-key-0001", 10);
        let mut out = Vec::new();
        show_status(&api, &mut session, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Tier: starter"));
        assert!(text.contains("Daily usage: 2/10 (20%)"));
    }

    #[test]
    fn test_status_unknown_key_falls_back() {
        let api = ScriptedApi { status_code: Some(401), ..Default::default() };
        let mut session = Session::new("free-key-0001", 10);
        let mut out = Vec::new();
        show_status(&api, &mut session, &mut out).unwrap();

        assert!(String::from_utf8(out).unwrap().contains("Tier: free"));
    }

    #[test]
    fn test_status_server_error_fails() {
        let api = ScriptedApi { status_code: Some(500), ..Default::default() };
        let mut session = Session::new("free-key-0001", 10);
        assert!(show_status(&api, &mut session, &mut Vec::new()).is_err());
    }

    #[test]
    fn test_activate_prints_full_new_key() {
        let api = ScriptedApi::default();
        let mut session = Session::new("free-key-0001", 10);
        let mut out = Vec::new();
        activate(&api, &mut session, "LIC-1", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Tier: enterprise"));
        assert!(text.contains("API key: ent-key-full-value"));
    }

    #[test]
    fn test_login_masks_key() {
        let api = ScriptedApi::default();
        let mut session = Session::new("free-key-0001", 10);
        let mut out = Vec::new();
        login(&api, &mut session, "pro-key-abcd", &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Tier: pro"));
        assert!(text.contains("********abcd"));
        assert!(!text.contains("pro-key-abcd"));
    }

    #[test]
    fn test_blank_license_rejected() {
        let api = ScriptedApi::default();
        let mut session = Session::new("free-key-0001", 10);
        let err = activate(&api, &mut session, "   ", &mut Vec::new()).unwrap_err();
        assert_eq!(err.to_string(), "Please enter a license key.");
    }

    #[test]
    fn test_logout_succeeds_locally_when_server_fails() {
        let api = ScriptedApi::default();
        let mut session = Session::new("free-key-0001", 10);
        login(&api, &mut session, "pro-key-abcd", &mut Vec::new()).unwrap();

        let mut out = Vec::new();
        logout(&api, &mut session, &mut out).unwrap();

        assert_eq!(session.account(), &AccountState::free("free-key-0001"));
        assert!(String::from_utf8(out).unwrap().contains("back on the free tier"));
    }
}
