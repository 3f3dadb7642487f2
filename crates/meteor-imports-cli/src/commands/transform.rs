use std::path::Path;

use meteor_imports_core::BundlerPlugin;
use miette::{miette, IntoDiagnostic, Result};

use super::BuildContext;

/// Run one compiled file through the transform hook and print or write
/// the result. Files the pipeline would leave alone pass through verbatim.
pub fn run(build: &BuildContext, file: &Path, outfile: Option<&Path>) -> Result<()> {
    let source = meteor_imports_util::fs::read_to_string_lossy(file)
        .map_err(|e| miette!("failed to read {}: {e}", file.display()))?;

    let id = file.to_string_lossy();
    let transformed = build
        .plugin
        .transform(&source, &id, &build.ctx)
        .into_diagnostic()?;

    for warning in build.ctx.take_warnings() {
        tracing::warn!("{warning}");
    }

    let code = match transformed {
        Some(result) => result.code,
        None => source,
    };

    match outfile {
        Some(path) => {
            meteor_imports_util::fs::atomic_write(path, code.as_bytes())
                .into_diagnostic()?;
            tracing::info!("wrote {}", path.display());
        }
        None => print!("{code}"),
    }

    Ok(())
}
