mod scan;
mod symbol;

use std::sync::Arc;

use earnvar_core::{
    default_workers, FetchConfig, Fetcher, NasdaqSource, PipelineConfig, ReqwestHttpClient,
    RetryConfig, ScanReport, SymbolVarianceResult, VariancePipeline,
};

use crate::cli::{Cli, Command};
use crate::error::CliError;

/// What a command produced, handed to the renderer.
#[derive(Debug)]
pub enum CommandOutcome {
    Scan(ScanReport),
    Symbol {
        result: SymbolVarianceResult,
        significant: bool,
    },
}

pub async fn run(cli: &Cli) -> Result<CommandOutcome, CliError> {
    let pipeline = build_pipeline(cli);

    match &cli.command {
        Command::Scan(args) => scan::run(args, pipeline).await,
        Command::Symbol(args) => symbol::run(args, &pipeline).await,
    }
}

fn fetch_config(cli: &Cli) -> FetchConfig {
    FetchConfig {
        timeout_ms: cli.timeout_ms,
        retry: RetryConfig::exponential(cli.max_attempts).with_jitter(cli.jitter),
        ..FetchConfig::default()
    }
}

fn build_pipeline(cli: &Cli) -> VariancePipeline {
    let fetcher = Fetcher::new(Arc::new(ReqwestHttpClient::new()), fetch_config(cli));
    let source = Arc::new(NasdaqSource::with_base_url(fetcher, cli.base_url.as_str()));

    let config = PipelineConfig {
        threshold: cli.threshold,
        max_lookback_days: cli.max_lookback_days,
        workers: cli.workers.unwrap_or_else(default_workers),
        duplicate_policy: cli.duplicate_policy(),
        method: cli.method.into(),
        ..PipelineConfig::default()
    };

    VariancePipeline::new(source, config)
}
