//! Entry aggregator.
//!
//! The one module the host application imports to pull in the whole Meteor
//! client bundle. Emits one require per retained script package, in
//! manifest order. Manifest order is Meteor's own dependency order; this
//! function must never re-sort it.

use crate::aliases::{METEOR_NAMESPACE, RUNTIME_CONFIG_MODULE_ID};
use crate::manifest::{EntryKind, PackageEntry};

/// Generate the entry-aggregator module source.
///
/// Source-injected overrides install their replacement value into the
/// global registry directly instead of importing anything. Stylesheet
/// entries are aliased elsewhere but not auto-imported; CSS wiring belongs
/// to the host.
#[must_use]
pub fn generate_entry(packages: &[PackageEntry]) -> String {
    let mut out = String::new();

    // Runtime config must be installed before any package runs.
    out.push_str(&format!("require(\"{RUNTIME_CONFIG_MODULE_ID}\");\n"));

    for package in packages {
        if package.kind != EntryKind::Script {
            continue;
        }
        if let Some(source) = &package.source {
            out.push_str(&format!(
                "window.Package[\"{}\"] = {source};\n",
                package.name
            ));
        } else {
            out.push_str(&format!(
                "require(\"{METEOR_NAMESPACE}/{}\");\n",
                package.name
            ));
        }
    }

    out
}
