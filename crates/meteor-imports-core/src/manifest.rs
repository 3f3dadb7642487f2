//! Manifest reader.
//!
//! Reads `program.json` from the Meteor build root and turns it into the
//! normalized package list the rest of the pipeline works from. The manifest
//! is re-read on every build; Meteor may have recompiled in between.

use regex_lite::Regex;
use serde::Deserialize;

use crate::config::ResolvedConfig;
use crate::error::Error;
use crate::paths::BuildLayout;

/// Kind of a compiled output entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Script,
    Stylesheet,
    Asset,
}

impl EntryKind {
    fn from_manifest_type(kind: &str) -> Self {
        match kind {
            "js" => Self::Script,
            "css" => Self::Stylesheet,
            _ => Self::Asset,
        }
    }
}

/// One discovered unit of compiled Meteor output.
///
/// Exactly one of `path` and `source` is set: a real entry points at a file
/// under the build root, a source-injected override carries its replacement
/// text directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageEntry {
    /// Package name, with Meteor's `_` separator normalized to `:`.
    pub name: String,
    /// Path relative to the build root.
    pub path: Option<String>,
    pub kind: EntryKind,
    /// Replacement source text from a configured override.
    pub source: Option<String>,
}

/// Result of reading one manifest: the retained package list plus
/// diagnostics and a content fingerprint for rebuild detection.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManifestScan {
    /// Retained packages, in manifest order. Manifest order is Meteor's own
    /// dependency order; nothing downstream may re-sort it.
    pub packages: Vec<PackageEntry>,
    /// Non-fatal diagnostics (dropped entries, unexpected paths).
    pub warnings: Vec<String>,
    /// BLAKE3 digest of the raw manifest bytes.
    pub fingerprint: String,
}

#[derive(Debug, Deserialize)]
struct ProgramJson {
    manifest: Vec<RawEntry>,
}

#[derive(Debug, Deserialize)]
struct RawEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

/// The root application entry script; always dropped, the host application
/// has its own entry point.
const ROOT_APP_ENTRY: &str = "app/app.js";

/// Read and normalize the manifest of the given build.
///
/// Fails with [`Error::BuildNotFound`] when `program.json` is missing or
/// unparsable (the upstream Meteor build has not been run), and with
/// [`Error::DuplicatePackage`] when two manifest entries normalize to the
/// same name.
pub fn scan(layout: &BuildLayout, config: &ResolvedConfig) -> Result<ManifestScan, Error> {
    let path = layout.program_json();
    let bytes = std::fs::read(&path).map_err(|e| Error::BuildNotFound {
        path: path.clone(),
        detail: e.to_string(),
    })?;
    let program: ProgramJson =
        serde_json::from_slice(&bytes).map_err(|e| Error::BuildNotFound {
            path: path.clone(),
            detail: format!("program.json is not valid JSON: {e}"),
        })?;

    let fingerprint = meteor_imports_util::hash::blake3_bytes(&bytes);
    normalize(&program.manifest, config, fingerprint)
}

/// `packages/<name>.<ext>` or `app/<name>.<ext>`; anything else in the
/// manifest is not a package file.
fn entry_pattern() -> Regex {
    Regex::new(r"^(?:packages|app)/(.+)\.(?:js|css)$").unwrap()
}

fn normalize(
    raw: &[RawEntry],
    config: &ResolvedConfig,
    fingerprint: String,
) -> Result<ManifestScan, Error> {
    let pattern = entry_pattern();
    let mut packages: Vec<PackageEntry> = Vec::new();
    let mut warnings = Vec::new();

    for entry in raw {
        let kind = EntryKind::from_manifest_type(&entry.kind);
        if kind == EntryKind::Asset {
            continue;
        }
        if entry.path == ROOT_APP_ENTRY {
            continue;
        }

        let Some(captures) = pattern.captures(&entry.path) else {
            warnings.push(format!(
                "manifest entry '{}' does not look like a package file; skipped",
                entry.path
            ));
            continue;
        };
        // Meteor flattens `author:package` to `author_package` on disk.
        let name = captures[1].replacen('_', ":", 1);

        if config.is_excluded(&name) {
            continue;
        }

        if packages.iter().any(|p| p.name == name && p.kind == kind) {
            return Err(Error::DuplicatePackage { name });
        }

        if let Some(source) = config.source_override(&name) {
            packages.push(PackageEntry {
                name,
                path: None,
                kind,
                source: Some(source.to_string()),
            });
        } else {
            packages.push(PackageEntry {
                name,
                path: Some(entry.path.clone()),
                kind,
                source: None,
            });
        }
    }

    Ok(ManifestScan {
        packages,
        warnings,
        fingerprint,
    })
}
