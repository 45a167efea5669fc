//! CLI argument definitions for earnvar.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `scan` | Scan a day's earnings calendar for significant movers |
//! | `symbol` | Compute the variance history of one symbol |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--threshold` | `5` | Percent a sample must exceed to be significant |
//! | `--max-lookback-days` | `30` | Pre-market walk-back limit |
//! | `--workers` | cpus + 4, max 32 | Concurrent per-date lookups |
//! | `--timeout-ms` | `10000` | Per-request timeout |
//! | `--max-attempts` | `7` | Attempts per request while rate limited |
//! | `--jitter` | `false` | Randomize retry delays by up to half |
//!
//! # Examples
//!
//! ```bash
//! # Scan today's calendar against two broker lists
//! earnvar scan --watchlist iq_option.txt:"IQ Option" --watchlist moneta.txt:Moneta
//!
//! # Inspect one symbol as a table
//! earnvar symbol NVDA --timing after-hours --format table
//! ```

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use earnvar_core::{parse_iso_date, DuplicatePolicy, ReportTiming, VarianceMethod};
use time::Date;

/// Post-earnings variance scanner.
#[derive(Debug, Parser)]
#[command(
    name = "earnvar",
    author,
    version,
    about = "Post-earnings price variance scanner",
    long_about = "earnvar reads a day's earnings calendar, looks up every reporting \
company's past report dates, and measures how far the stock moved after each \
report. Companies with at least one move above the threshold are listed."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Keep a symbol when any variance is strictly above this percentage.
    #[arg(long, global = true, default_value_t = earnvar_core::DEFAULT_THRESHOLD)]
    pub threshold: i64,

    /// Calendar days a pre-market lookup may walk back before giving up.
    #[arg(long, global = true, default_value_t = earnvar_core::DEFAULT_MAX_LOOKBACK_DAYS)]
    pub max_lookback_days: u32,

    /// Concurrent per-date lookups (defaults to cpus + 4, at most 32).
    #[arg(long, global = true)]
    pub workers: Option<usize>,

    /// Count a repeated report date only once.
    #[arg(long, global = true, default_value_t = false)]
    pub dedupe_dates: bool,

    /// Variance formula.
    #[arg(long, global = true, value_enum, default_value_t = MethodArg::CloseToClose)]
    pub method: MethodArg,

    /// Per-request timeout in milliseconds.
    #[arg(long, global = true, default_value_t = 10_000)]
    pub timeout_ms: u64,

    /// Attempts per request while the upstream answers 403.
    #[arg(long, global = true, default_value_t = 7)]
    pub max_attempts: u32,

    /// Randomize each retry delay by up to half in either direction.
    #[arg(long, global = true, default_value_t = false)]
    pub jitter: bool,

    /// Upstream API base URL.
    #[arg(long, global = true, default_value = earnvar_core::adapters::nasdaq::DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Log line format on stderr. Verbosity follows RUST_LOG.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Scan a day's earnings calendar.
    Scan(ScanArgs),
    /// Compute the variance history of a single symbol.
    Symbol(SymbolArgs),
}

#[derive(Debug, Args)]
pub struct ScanArgs {
    /// Calendar day (YYYY-MM-DD). Defaults to today in UTC.
    #[arg(long, value_parser = parse_date_arg)]
    pub date: Option<Date>,

    /// Watch-list file, optionally labelled as FILE:LABEL. Repeatable.
    #[arg(long = "watchlist", value_parser = parse_watchlist_arg)]
    pub watchlists: Vec<WatchlistArg>,
}

#[derive(Debug, Args)]
pub struct SymbolArgs {
    /// Ticker to analyze.
    pub symbol: String,

    /// Report timing used to resolve trading days.
    #[arg(long, value_enum, default_value_t = TimingArg::AfterHours)]
    pub timing: TimingArg,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchlistArg {
    pub path: PathBuf,
    pub label: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TimingArg {
    PreMarket,
    AfterHours,
    Unspecified,
}

impl From<TimingArg> for ReportTiming {
    fn from(value: TimingArg) -> Self {
        match value {
            TimingArg::PreMarket => Self::PreMarket,
            TimingArg::AfterHours => Self::AfterHours,
            TimingArg::Unspecified => Self::Unspecified,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MethodArg {
    CloseToClose,
    OpenToClose,
}

impl From<MethodArg> for VarianceMethod {
    fn from(value: MethodArg) -> Self {
        match value {
            MethodArg::CloseToClose => Self::CloseToClose,
            MethodArg::OpenToClose => Self::OpenToClose,
        }
    }
}

impl Cli {
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.dedupe_dates {
            DuplicatePolicy::Dedupe
        } else {
            DuplicatePolicy::Keep
        }
    }
}

fn parse_date_arg(raw: &str) -> Result<Date, String> {
    parse_iso_date(raw).map_err(|error| error.to_string())
}

fn parse_watchlist_arg(raw: &str) -> Result<WatchlistArg, String> {
    let (path, label) = match raw.rsplit_once(':') {
        Some((path, label)) if !path.is_empty() && !label.trim().is_empty() => {
            (PathBuf::from(path), label.trim().to_string())
        }
        _ => {
            let path = PathBuf::from(raw);
            let label = path
                .file_stem()
                .map(|stem| stem.to_string_lossy().into_owned())
                .ok_or_else(|| format!("watch-list path '{raw}' has no file name"))?;
            (path, label)
        }
    };
    Ok(WatchlistArg { path, label })
}
