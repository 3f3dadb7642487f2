//! Alias table builder.
//!
//! Maps virtual module identifiers to resolution targets so the host
//! bundler can import Meteor packages by name (`meteor/<name>`) without
//! knowing the on-disk layout Meteor produced. Two fixed synthetic ids
//! resolve to generated source rather than files.
//!
//! The table is a value, computed fresh from one [`ManifestScan`] and
//! swapped wholesale on rebuild. Nothing ever mutates a live table, which is
//! what makes re-registration across incremental rebuilds idempotent.

use std::path::PathBuf;

use rustc_hash::FxHashMap;

use crate::manifest::{EntryKind, ManifestScan};
use crate::paths::BuildLayout;

/// Namespace prefix for package imports.
pub const METEOR_NAMESPACE: &str = "meteor";

/// Virtual id of the entry-aggregator module (the one module the host
/// application imports).
pub const ENTRY_MODULE_ID: &str = "meteor-imports";

/// Virtual id of the runtime-config module.
pub const RUNTIME_CONFIG_MODULE_ID: &str = "meteor-config";

/// Directory alias for the build root.
pub const BUILD_DIR_ALIAS: &str = "meteor-build";

/// Directory alias for the compiled packages directory.
pub const PACKAGES_DIR_ALIAS: &str = "meteor-packages";

/// Synthetic modules whose source is generated, not read from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticModule {
    RuntimeConfig,
    EntryAggregator,
}

impl SyntheticModule {
    /// Resolved module id, `\0`-prefixed so no filesystem path or other
    /// plugin can collide with it.
    #[must_use]
    pub fn resolved_id(self) -> &'static str {
        match self {
            Self::RuntimeConfig => "\0meteor:config",
            Self::EntryAggregator => "\0meteor:imports",
        }
    }

    /// The synthetic module behind a resolved id, if any.
    #[must_use]
    pub fn from_resolved_id(id: &str) -> Option<Self> {
        match id {
            "\0meteor:config" => Some(Self::RuntimeConfig),
            "\0meteor:imports" => Some(Self::EntryAggregator),
            _ => None,
        }
    }
}

/// What a virtual identifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasTarget {
    /// An absolute file path under the build root.
    File(PathBuf),
    /// An absolute directory path (context-style alias).
    Directory(PathBuf),
    /// Programmatically produced source text.
    Synthetic(SyntheticModule),
}

/// Mapping from virtual module identifier to resolution target.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AliasTable {
    entries: Vec<(String, AliasTarget)>,
    index: FxHashMap<String, usize>,
}

impl AliasTable {
    /// Build the full table for one build: fixed synthetic ids, directory
    /// aliases, then one entry per retained package with a path, in manifest
    /// order (`meteor/<name>` for scripts, `meteor/<name>.css` for
    /// stylesheets).
    #[must_use]
    pub fn build(layout: &BuildLayout, scan: &ManifestScan) -> Self {
        let mut table = Self::default();

        table.insert(
            ENTRY_MODULE_ID,
            AliasTarget::Synthetic(SyntheticModule::EntryAggregator),
        );
        table.insert(
            RUNTIME_CONFIG_MODULE_ID,
            AliasTarget::Synthetic(SyntheticModule::RuntimeConfig),
        );
        table.insert(
            BUILD_DIR_ALIAS,
            AliasTarget::Directory(layout.build_root.clone()),
        );
        table.insert(
            PACKAGES_DIR_ALIAS,
            AliasTarget::Directory(layout.packages_dir.clone()),
        );

        for package in &scan.packages {
            let Some(path) = &package.path else {
                // Source-injected overrides are inlined by the entry
                // aggregator; they have nothing to resolve to.
                continue;
            };
            // A package may ship both a script and a stylesheet under one
            // name; stylesheets get a distinct `.css` id so neither entry
            // shadows the other.
            let id = match package.kind {
                EntryKind::Stylesheet => {
                    format!("{METEOR_NAMESPACE}/{}.css", package.name)
                }
                _ => format!("{METEOR_NAMESPACE}/{}", package.name),
            };
            table.insert(&id, AliasTarget::File(layout.build_root.join(path)));
        }

        table
    }

    fn insert(&mut self, id: &str, target: AliasTarget) {
        debug_assert!(
            !self.index.contains_key(id),
            "alias '{id}' registered twice"
        );
        self.index.insert(id.to_string(), self.entries.len());
        self.entries.push((id.to_string(), target));
    }

    /// Look up a virtual identifier.
    #[must_use]
    pub fn lookup(&self, id: &str) -> Option<&AliasTarget> {
        self.index.get(id).map(|i| &self.entries[*i].1)
    }

    /// Entries in registration order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AliasTarget)> {
        self.entries.iter().map(|(id, t)| (id.as_str(), t))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
