use earnvar_core::{NamedList, VariancePipeline, Watchlist};
use time::OffsetDateTime;

use crate::cli::ScanArgs;
use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(args: &ScanArgs, pipeline: VariancePipeline) -> Result<CommandOutcome, CliError> {
    let mut watchlist = Watchlist::unrestricted();
    for entry in &args.watchlists {
        watchlist.push(NamedList::load(&entry.path, entry.label.as_str())?);
    }

    let date = args
        .date
        .unwrap_or_else(|| OffsetDateTime::now_utc().date());
    let report = pipeline.with_watchlist(watchlist).run(date).await?;

    Ok(CommandOutcome::Scan(report))
}
