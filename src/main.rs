//! `idx-scrape` command line entry point
//!
//! Records go to stdout (or `--output`); logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use chrono::{Duration, Local, NaiveDate};
use clap::{Parser, Subcommand, ValueEnum};
use tracing::{error, info};

use idx_scrape::config::default_date_window;
use idx_scrape::output::{write_csv, write_json};
use idx_scrape::utils::DEFAULT_LOOKBACK_DAYS;
use idx_scrape::{HarvestConfig, HarvestResult, OutputFormat, save_csv, save_json};

#[derive(Parser)]
#[command(
    name = "idx-scrape",
    about = "Harvest IDX announcements by keyword, escalating past anti-bot refusals",
    version
)]
struct Cli {
    #[command(flatten)]
    run: RunArgs,

    /// Log level (trace, debug, info, warn, error). RUST_LOG takes precedence.
    #[arg(long, default_value = "info", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Query every keyword and write the merged records (default).
    Fetch,

    /// Open a visible browser, log in by hand, and save the session.
    Login,
}

#[derive(Clone, Copy, ValueEnum)]
enum FormatArg {
    Csv,
    Json,
}

#[derive(clap::Args)]
struct RunArgs {
    /// Output file; stdout when omitted.
    #[arg(short, long, global = true)]
    output: Option<PathBuf>,

    /// Output format; guessed from the output extension, else CSV.
    #[arg(long, value_enum, global = true)]
    format: Option<FormatArg>,

    /// Keyword to query (repeatable). Defaults to the corporate-action list.
    #[arg(short, long = "keyword", global = true)]
    keywords: Vec<String>,

    /// First day of the window, YYYYMMDD.
    #[arg(long, value_parser = parse_query_date, global = true)]
    date_from: Option<NaiveDate>,

    /// Last day of the window, YYYYMMDD. Defaults to today.
    #[arg(long, value_parser = parse_query_date, global = true)]
    date_to: Option<NaiveDate>,

    #[arg(long, global = true)]
    page_size: Option<u32>,

    /// Ceiling on pages fetched per keyword.
    #[arg(long, global = true)]
    max_pages: Option<u32>,

    /// Storage-state file holding the persisted session.
    #[arg(long, global = true)]
    storage_state: Option<PathBuf>,

    /// Cookie-only export written next to every session save.
    #[arg(long, global = true)]
    export_cookies: Option<PathBuf>,

    /// Skip the cookie-only export.
    #[arg(long, global = true, conflicts_with = "export_cookies")]
    no_export_cookies: bool,

    /// Raw Cookie header (`a=1; b=2`) merged into the stored session.
    #[arg(long, env = "IDX_COOKIE", global = true)]
    cookie: Option<String>,

    /// Bearer token for session reuse.
    #[arg(long, env = "IDX_AUTH_TOKEN", hide_env_values = true, global = true)]
    auth_token: Option<String>,

    /// Proxy URL; a bare host:port gets http://.
    #[arg(long, env = "IDX_PROXY", global = true)]
    proxy: Option<String>,

    /// Allow a visible browser that waits for you to clear a challenge.
    #[arg(long, global = true)]
    interactive: bool,

    /// Keep every reply the server returns, without re-checking keywords.
    #[arg(long, global = true)]
    no_client_filter: bool,

    /// Walk the full tier chain for every page instead of starting at the last working tier.
    #[arg(long, global = true)]
    full_chain: bool,
}

fn parse_query_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y%m%d")
        .or_else(|_| NaiveDate::parse_from_str(value, "%Y-%m-%d"))
        .map_err(|e| format!("expected YYYYMMDD: {e}"))
}

impl RunArgs {
    fn date_window(&self) -> (NaiveDate, NaiveDate) {
        match (self.date_from, self.date_to) {
            (Some(from), Some(to)) => (from, to),
            (Some(from), None) => (from, Local::now().date_naive()),
            (None, Some(to)) => (to - Duration::days(DEFAULT_LOOKBACK_DAYS), to),
            (None, None) => default_date_window(Local::now().date_naive()),
        }
    }

    fn config(&self) -> HarvestResult<HarvestConfig> {
        let mut builder = HarvestConfig::builder()
            .cookie_header(self.cookie.clone())
            .auth_token(self.auth_token.clone())
            .proxy_url(self.proxy.clone())
            .allow_interactive(self.interactive)
            .client_filter(!self.no_client_filter)
            .remember_proven_strategy(!self.full_chain);

        if !self.keywords.is_empty() {
            builder = builder.keywords(self.keywords.iter().cloned());
        }
        if let Some(size) = self.page_size {
            builder = builder.page_size(size);
        }
        if let Some(pages) = self.max_pages {
            builder = builder.max_pages(pages);
        }
        if let Some(path) = &self.storage_state {
            builder = builder.storage_state_path(path.clone());
        }
        if self.no_export_cookies {
            builder = builder.cookie_export_path(None);
        } else if let Some(path) = &self.export_cookies {
            builder = builder.cookie_export_path(Some(path.clone()));
        }

        let (from, to) = self.date_window();
        builder.date_window(from, to).build()
    }

    fn format(&self) -> OutputFormat {
        match self.format {
            Some(FormatArg::Csv) => OutputFormat::Csv,
            Some(FormatArg::Json) => OutputFormat::Json,
            None => self
                .output
                .as_deref()
                .and_then(OutputFormat::from_path)
                .unwrap_or_default(),
        }
    }
}

async fn run_fetch(args: &RunArgs) -> HarvestResult<()> {
    let config = args.config()?;
    let report = idx_scrape::harvest(&config).await?;

    for summary in &report.keywords {
        info!(
            keyword = %summary.keyword,
            pages = summary.pages,
            replies = summary.replies,
            "{}",
            summary.stop_reason
        );
    }

    match (&args.output, args.format()) {
        (Some(path), OutputFormat::Csv) => save_csv(&report.records, path)?,
        (Some(path), OutputFormat::Json) => save_json(&report.records, path)?,
        (None, OutputFormat::Csv) => write_csv(&report.records, std::io::stdout().lock())?,
        (None, OutputFormat::Json) => write_json(&report.records, std::io::stdout().lock())?,
    }
    Ok(())
}

async fn run_login(args: &RunArgs) -> HarvestResult<()> {
    let config = args.config()?;
    let session = idx_scrape::login(&config).await?;
    info!(
        cookies = session.cookies().len(),
        auth = session.has_auth_signal(),
        "Login session captured"
    );
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command.unwrap_or(Commands::Fetch) {
        Commands::Fetch => run_fetch(&cli.run).await,
        Commands::Login => run_login(&cli.run).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            if e.is_auth_required() {
                error!("Run `idx-scrape login` or pass --interactive to refresh the session");
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
