use earnvar_core::{Symbol, VariancePipeline};

use crate::cli::SymbolArgs;
use crate::error::CliError;

use super::CommandOutcome;

pub async fn run(args: &SymbolArgs, pipeline: &VariancePipeline) -> Result<CommandOutcome, CliError> {
    let symbol = Symbol::parse(&args.symbol)?;
    let result = pipeline.analyze_symbol(&symbol, args.timing.into()).await;
    let significant = pipeline.is_significant(&result);

    Ok(CommandOutcome::Symbol {
        result,
        significant,
    })
}
