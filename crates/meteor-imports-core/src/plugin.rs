//! Bundler plugin surface.
//!
//! Rollup-style hook interface: the host bundler drives `build_start`,
//! `resolve_id`, `load` and `transform`, and [`MeteorImportsPlugin`] wires
//! the manifest reader, alias table, rule dispatcher and transformers into
//! those hooks.
//!
//! ## Example
//!
//! ```ignore
//! use meteor_imports_core::{BundlerPlugin, MeteorImportsPlugin, PluginContext};
//!
//! let plugin = MeteorImportsPlugin::new(config);
//! let ctx = PluginContext::new(project_root);
//! plugin.build_start(&ctx)?;
//! if let Some(resolved) = plugin.resolve_id("meteor/tracker", None, &ctx)? {
//!     // hand `resolved.id` back to the bundler
//! }
//! ```

use std::path::PathBuf;
use std::sync::{Mutex, RwLock};

use crate::aliases::{AliasTable, AliasTarget, SyntheticModule};
use crate::config::{MeteorImportsConfig, ResolvedConfig};
use crate::error::Error;
use crate::format::FormatAdapter;
use crate::manifest::{self, ManifestScan};
use crate::paths::{file_stem, BuildLayout};
use crate::rules::{classify, TransformKind};
use crate::transform::{
    generate_entry, load_runtime_config, transform_modules_shim, transform_package,
};

/// Result type for plugin hooks.
pub type HookResult<T> = Result<T, PluginError>;

/// Error from a plugin hook, scoped to the plugin and hook that failed.
#[derive(Debug)]
pub struct PluginError {
    /// Plugin name that caused the error.
    pub plugin: String,
    /// Hook that failed.
    pub hook: &'static str,
    /// Error message.
    pub message: String,
}

impl std::fmt::Display for PluginError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.plugin, self.hook, self.message)
    }
}

impl std::error::Error for PluginError {}

/// Context passed to plugin hooks.
///
/// Owned by the host for the duration of one build. Warnings and file
/// dependencies accumulate here; the host drains them after each
/// compilation.
#[derive(Debug, Default)]
pub struct PluginContext {
    /// Project root the build runs in.
    pub cwd: PathBuf,
    /// Whether this is a watch/dev build.
    pub watch: bool,
    file_dependencies: Mutex<Vec<PathBuf>>,
    warnings: Mutex<Vec<String>>,
}

impl PluginContext {
    /// Create a new plugin context.
    #[must_use]
    pub fn new(cwd: PathBuf) -> Self {
        Self {
            cwd,
            watch: false,
            file_dependencies: Mutex::new(Vec::new()),
            warnings: Mutex::new(Vec::new()),
        }
    }

    /// Register a file whose change should trigger a rebuild.
    pub fn add_file_dependency(&self, path: PathBuf) {
        self.file_dependencies.lock().unwrap().push(path);
    }

    /// Record a non-fatal diagnostic for the host to report.
    pub fn add_warning(&self, message: impl Into<String>) {
        self.warnings.lock().unwrap().push(message.into());
    }

    /// Drain registered file dependencies.
    #[must_use]
    pub fn take_file_dependencies(&self) -> Vec<PathBuf> {
        std::mem::take(&mut self.file_dependencies.lock().unwrap())
    }

    /// Drain recorded warnings.
    #[must_use]
    pub fn take_warnings(&self) -> Vec<String> {
        std::mem::take(&mut self.warnings.lock().unwrap())
    }
}

/// Result of the resolve hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveIdResult {
    /// Resolved module id (a file path or a `\0`-prefixed synthetic id).
    pub id: String,
    /// Whether this module is external (don't bundle).
    pub external: bool,
}

impl ResolveIdResult {
    /// Create a resolved module result.
    pub fn resolved(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            external: false,
        }
    }
}

/// Result of the load hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadResult {
    /// Module source code.
    pub code: String,
}

impl LoadResult {
    /// Create a load result from code.
    pub fn code(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }
}

/// Result of the transform hook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransformResult {
    /// Transformed code.
    pub code: String,
    /// The bundler must not statically analyze this module's dependencies.
    pub no_parse: bool,
}

impl TransformResult {
    /// Create a transform result the bundler may traverse.
    pub fn code(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            no_parse: false,
        }
    }

    /// Create a transform result the bundler must treat as a leaf.
    pub fn opaque(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            no_parse: true,
        }
    }
}

/// The plugin trait the host bundler drives.
///
/// All methods have default implementations that do nothing, so a plugin
/// only implements the hooks it cares about.
pub trait BundlerPlugin: Send + Sync {
    /// Plugin name for debugging and error messages.
    fn name(&self) -> &str;

    /// Called at the start of every build, including incremental rebuilds.
    fn build_start(&self, _ctx: &PluginContext) -> HookResult<()> {
        Ok(())
    }

    /// Resolve a module specifier to an id.
    ///
    /// Return `Some` to handle this resolution, or `None` to let the next
    /// plugin or the default resolver handle it.
    fn resolve_id(
        &self,
        _specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        Ok(None)
    }

    /// Load a module by id.
    fn load(&self, _id: &str, _ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        Ok(None)
    }

    /// Transform module source code.
    fn transform(
        &self,
        _code: &str,
        _id: &str,
        _ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        Ok(None)
    }
}

const PLUGIN_NAME: &str = "meteor-imports";

/// Per-build derived state, swapped wholesale on every `build_start`.
#[derive(Debug)]
struct BuildState {
    config: ResolvedConfig,
    layout: BuildLayout,
    scan: ManifestScan,
    aliases: AliasTable,
}

/// The Meteor bridge plugin.
///
/// Holds the raw user configuration for the lifetime of the host process;
/// everything derived from the manifest lives in [`BuildState`] and is
/// rebuilt per compilation. An unchanged manifest fingerprint
/// short-circuits the rebuild, so repeated `build_start` calls neither
/// accumulate nor leak state.
pub struct MeteorImportsPlugin {
    config: MeteorImportsConfig,
    fmt: FormatAdapter,
    state: RwLock<Option<BuildState>>,
}

impl MeteorImportsPlugin {
    /// Create the plugin from raw configuration. Configuration problems
    /// surface on the first `build_start`.
    #[must_use]
    pub fn new(config: MeteorImportsConfig) -> Self {
        Self {
            config,
            fmt: FormatAdapter::new(),
            state: RwLock::new(None),
        }
    }

    /// The retained package list of the current build, for hosts that want
    /// to report it.
    #[must_use]
    pub fn current_scan(&self) -> Option<ManifestScan> {
        self.state.read().unwrap().as_ref().map(|s| s.scan.clone())
    }

    fn err(hook: &'static str, error: &dyn std::fmt::Display) -> PluginError {
        PluginError {
            plugin: PLUGIN_NAME.to_string(),
            hook,
            message: error.to_string(),
        }
    }

    fn with_state<T>(
        &self,
        hook: &'static str,
        f: impl FnOnce(&BuildState) -> HookResult<T>,
    ) -> HookResult<T> {
        let state = self.state.read().unwrap();
        let Some(state) = state.as_ref() else {
            return Err(Self::err(hook, &"build_start has not run"));
        };
        f(state)
    }

    fn rebuild_state(&self, ctx: &PluginContext) -> Result<(), Error> {
        let config = self.config.resolve()?;
        let layout = BuildLayout::from_config(&config, &ctx.cwd);
        let scan = manifest::scan(&layout, &config)?;

        for warning in config.warnings.iter().chain(&scan.warnings) {
            ctx.add_warning(warning.clone());
        }
        if config.log_included_packages {
            for package in &scan.packages {
                ctx.add_warning(format!("including meteor package '{}'", package.name));
            }
        }

        let mut guard = self.state.write().unwrap();
        // Unchanged manifest: keep the previous table (identical anyway).
        if let Some(previous) = guard.as_ref() {
            if previous.scan.fingerprint == scan.fingerprint && previous.layout == layout {
                return Ok(());
            }
        }
        let aliases = AliasTable::build(&layout, &scan);
        *guard = Some(BuildState {
            config,
            layout,
            scan,
            aliases,
        });
        Ok(())
    }
}

impl BundlerPlugin for MeteorImportsPlugin {
    fn name(&self) -> &str {
        PLUGIN_NAME
    }

    fn build_start(&self, ctx: &PluginContext) -> HookResult<()> {
        self.rebuild_state(ctx)
            .map_err(|e| Self::err("build_start", &e))
    }

    fn resolve_id(
        &self,
        specifier: &str,
        _importer: Option<&str>,
        _ctx: &PluginContext,
    ) -> HookResult<Option<ResolveIdResult>> {
        self.with_state("resolve_id", |state| {
            if let Some(target) = state.aliases.lookup(specifier) {
                return Ok(Some(match target {
                    AliasTarget::File(path) | AliasTarget::Directory(path) => {
                        ResolveIdResult::resolved(path.to_string_lossy())
                    }
                    AliasTarget::Synthetic(module) => {
                        ResolveIdResult::resolved(module.resolved_id())
                    }
                }));
            }

            // Directory aliases also resolve path-style requests beneath
            // them (`meteor-build/program.json`).
            if let Some((head, rest)) = specifier.split_once('/') {
                if let Some(AliasTarget::Directory(dir)) = state.aliases.lookup(head) {
                    return Ok(Some(ResolveIdResult::resolved(
                        dir.join(rest).to_string_lossy(),
                    )));
                }
            }

            Ok(None)
        })
    }

    fn load(&self, id: &str, ctx: &PluginContext) -> HookResult<Option<LoadResult>> {
        let Some(module) = SyntheticModule::from_resolved_id(id) else {
            return Ok(None);
        };
        self.with_state("load", |state| match module {
            SyntheticModule::RuntimeConfig => {
                let mut dependencies = Vec::new();
                let result = load_runtime_config(&state.config, &mut dependencies);
                // Register the settings file even when reading it failed, so
                // a watch build rebuilds once the user fixes it.
                for dependency in dependencies {
                    ctx.add_file_dependency(dependency);
                }
                let code = result.map_err(|e| Self::err("load", &e))?;
                Ok(Some(LoadResult::code(code)))
            }
            SyntheticModule::EntryAggregator => {
                Ok(Some(LoadResult::code(generate_entry(&state.scan.packages))))
            }
        })
    }

    fn transform(
        &self,
        code: &str,
        id: &str,
        ctx: &PluginContext,
    ) -> HookResult<Option<TransformResult>> {
        self.with_state("transform", |state| {
            let classification = classify(id, &state.layout);
            match classification.kind {
                TransformKind::None | TransformKind::RuntimeConfig => Ok(None),
                TransformKind::ModuleShim => {
                    let shim = transform_modules_shim(code, std::path::Path::new(id), &self.fmt)
                        .map_err(|e| Self::err("transform", &e))?;
                    // The shim is also a package; chain the registry-export
                    // rewrite on top so `meteor/modules` imports resolve to
                    // `window.Package["modules"]` like every other package.
                    let out = transform_package(&shim, "modules", &state.config, &self.fmt);
                    Ok(Some(TransformResult::code(out.code)))
                }
                TransformKind::Package => {
                    // The manifest reader only routes `<name>.<ext>` files
                    // here; a stem-less path is a bug, not bad input.
                    let Some(stem) = file_stem(id) else {
                        return Err(Self::err(
                            "transform",
                            &format!("cannot derive package name from '{id}'"),
                        ));
                    };
                    let name = stem.replacen('_', ":", 1);
                    let out = transform_package(code, &name, &state.config, &self.fmt);
                    for warning in out.warnings {
                        ctx.add_warning(warning);
                    }
                    Ok(Some(TransformResult::opaque(out.code)))
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hooks_before_build_start_fail() {
        let plugin = MeteorImportsPlugin::new(MeteorImportsConfig {
            meteor_folder: Some("meteor".into()),
            ..Default::default()
        });
        let ctx = PluginContext::new(PathBuf::from("/app"));
        let err = plugin.resolve_id("meteor/tracker", None, &ctx).unwrap_err();
        assert!(err.to_string().contains("build_start"));
    }

    #[test]
    fn test_build_start_without_meteor_build_fails() {
        let dir = tempfile::tempdir().unwrap();
        let plugin = MeteorImportsPlugin::new(MeteorImportsConfig {
            meteor_folder: Some("meteor".into()),
            ..Default::default()
        });
        let ctx = PluginContext::new(dir.path().to_path_buf());
        let err = plugin.build_start(&ctx).unwrap_err();
        assert_eq!(err.hook, "build_start");
        assert!(err.message.contains("Run Meteor at least once"));
    }

    #[test]
    fn test_context_sinks_drain() {
        let ctx = PluginContext::new(PathBuf::from("/app"));
        ctx.add_warning("one");
        ctx.add_file_dependency(PathBuf::from("/settings.json"));

        assert_eq!(ctx.take_warnings(), vec!["one".to_string()]);
        assert!(ctx.take_warnings().is_empty());
        assert_eq!(ctx.take_file_dependencies().len(), 1);
        assert!(ctx.take_file_dependencies().is_empty());
    }
}
