#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]

//! Bridges a pre-built Meteor client program into a host bundler.
//!
//! Meteor compiles its client into a directory of already-packaged files
//! plus a `program.json` manifest. This crate reads that manifest, exposes
//! each compiled package as an importable `meteor/<name>` module, rewrites
//! package sources so they no longer depend on Meteor's own loader
//! conventions, and synthesizes the runtime-config and entry-point modules
//! the framework code expects.
//!
//! ## Pipeline
//!
//! 1. **Manifest** - read `program.json`, filter and name the packages
//! 2. **Aliases** - map `meteor/<name>` (plus fixed synthetic ids) to targets
//! 3. **Rules** - classify each file the bundler loads
//! 4. **Transform** - rewrite package / shim / synthetic sources

pub mod aliases;
pub mod config;
pub mod error;
pub mod format;
pub mod manifest;
pub mod paths;
pub mod plugin;
pub mod rules;
pub mod transform;
pub mod version;

pub use aliases::{AliasTable, AliasTarget, SyntheticModule};
pub use config::{BuildMode, ExcludeRule, MeteorImportsConfig, ResolvedConfig};
pub use error::Error;
pub use manifest::{EntryKind, ManifestScan, PackageEntry};
pub use paths::BuildLayout;
pub use plugin::{
    BundlerPlugin, HookResult, LoadResult, MeteorImportsPlugin, PluginContext, PluginError,
    ResolveIdResult, TransformResult,
};
pub use rules::{classify, Classification, TransformKind};
pub use version::VERSION;
