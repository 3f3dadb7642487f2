use meteor_imports_core::{BundlerPlugin, SyntheticModule};
use miette::{miette, IntoDiagnostic, Result};

use super::BuildContext;

/// Print the generated entry-aggregator module.
pub fn run(build: &BuildContext) -> Result<()> {
    let result = build
        .plugin
        .load(SyntheticModule::EntryAggregator.resolved_id(), &build.ctx)
        .into_diagnostic()?
        .ok_or_else(|| miette!("entry aggregator module was not loaded"))?;

    print!("{}", result.code);
    Ok(())
}
