use meteor_imports_core::{classify, TransformKind};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use super::BuildContext;

#[derive(Serialize)]
struct ClassifyReport<'a> {
    path: &'a str,
    transform: &'static str,
    no_parse: bool,
}

/// Classify one resolved path the way the bundler pipeline would.
pub fn run(build: &BuildContext, path: &str, json: bool) -> Result<()> {
    let classification = classify(path, &build.layout);
    let transform = match classification.kind {
        TransformKind::None => "none",
        TransformKind::Package => "package",
        TransformKind::ModuleShim => "module-shim",
        TransformKind::RuntimeConfig => "runtime-config",
    };

    if json {
        let report = ClassifyReport {
            path,
            transform,
            no_parse: classification.no_parse,
        };
        println!("{}", serde_json::to_string_pretty(&report).into_diagnostic()?);
    } else {
        println!("{path}: {transform} (no_parse: {})", classification.no_parse);
    }

    Ok(())
}
