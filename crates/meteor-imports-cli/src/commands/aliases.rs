use meteor_imports_core::{BundlerPlugin, EntryKind};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use super::BuildContext;

#[derive(Serialize)]
struct AliasReport {
    id: String,
    target: String,
}

/// Print the virtual-module alias table by probing the plugin's resolver
/// for every id it is expected to serve.
pub fn run(build: &BuildContext, json: bool) -> Result<()> {
    let scan = build.plugin.current_scan().unwrap_or_default();

    let mut ids = vec![
        "meteor-imports".to_string(),
        "meteor-config".to_string(),
        "meteor-build".to_string(),
        "meteor-packages".to_string(),
    ];
    ids.extend(
        scan.packages
            .iter()
            .filter(|p| p.path.is_some())
            .map(|p| match p.kind {
                EntryKind::Stylesheet => format!("meteor/{}.css", p.name),
                _ => format!("meteor/{}", p.name),
            }),
    );

    let mut report = Vec::new();
    for id in ids {
        if let Some(resolved) = build
            .plugin
            .resolve_id(&id, None, &build.ctx)
            .into_diagnostic()?
        {
            report.push(AliasReport {
                id,
                target: resolved.id,
            });
        }
    }

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else {
        for alias in &report {
            println!("{:<40} -> {}", alias.id, alias.target.replace('\u{0}', "\\0"));
        }
    }

    Ok(())
}
