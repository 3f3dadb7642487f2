use meteor_imports_core::EntryKind;
use miette::{miette, IntoDiagnostic, Result};
use serde::Serialize;

use super::BuildContext;

#[derive(Serialize)]
struct PackageReport<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    path: Option<&'a str>,
    kind: &'static str,
    source_override: bool,
}

/// List the packages retained from the build manifest, in manifest order.
pub fn run(build: &BuildContext, json: bool) -> Result<()> {
    let scan = build
        .plugin
        .current_scan()
        .ok_or_else(|| miette!("no build state"))?;

    if json {
        let report: Vec<PackageReport> = scan
            .packages
            .iter()
            .map(|p| PackageReport {
                name: &p.name,
                path: p.path.as_deref(),
                kind: match p.kind {
                    EntryKind::Script => "js",
                    EntryKind::Stylesheet => "css",
                    EntryKind::Asset => "asset",
                },
                source_override: p.source.is_some(),
            })
            .collect();
        println!(
            "{}",
            serde_json::to_string_pretty(&report).into_diagnostic()?
        );
    } else {
        for package in &scan.packages {
            let detail = package
                .path
                .as_deref()
                .unwrap_or("(source override)");
            println!("{:<40} {detail}", package.name);
        }
    }

    Ok(())
}
