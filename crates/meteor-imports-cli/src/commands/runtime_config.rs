use meteor_imports_core::{BundlerPlugin, SyntheticModule};
use miette::{miette, IntoDiagnostic, Result};

use super::BuildContext;

/// Print the generated runtime-config module.
pub fn run(build: &BuildContext) -> Result<()> {
    let result = build
        .plugin
        .load(SyntheticModule::RuntimeConfig.resolved_id(), &build.ctx)
        .into_diagnostic()?
        .ok_or_else(|| miette!("runtime config module was not loaded"))?;

    for path in build.ctx.take_file_dependencies() {
        tracing::debug!("build dependency: {}", path.display());
    }

    print!("{}", result.code);
    Ok(())
}
