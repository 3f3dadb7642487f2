//! CLI subcommands.

pub mod aliases;
pub mod classify;
pub mod entry;
pub mod packages;
pub mod runtime_config;
pub mod transform;

use std::path::PathBuf;

use meteor_imports_core::{
    BuildLayout, BundlerPlugin, MeteorImportsConfig, MeteorImportsPlugin, PluginContext,
};
use miette::{IntoDiagnostic, Result};

/// Everything the subcommands need: a plugin that has completed
/// `build_start` against the local Meteor build, plus the derived layout.
pub struct BuildContext {
    pub plugin: MeteorImportsPlugin,
    pub ctx: PluginContext,
    pub layout: BuildLayout,
}

impl BuildContext {
    /// Resolve the config, run the plugin's build start and drain its
    /// warnings into the log.
    pub fn prepare(cwd: PathBuf, config: MeteorImportsConfig) -> Result<Self> {
        let resolved = config.resolve().into_diagnostic()?;
        let layout = BuildLayout::from_config(&resolved, &cwd);

        let plugin = MeteorImportsPlugin::new(config);
        let ctx = PluginContext::new(cwd);
        plugin.build_start(&ctx).into_diagnostic()?;

        for warning in ctx.take_warnings() {
            tracing::warn!("{warning}");
        }

        Ok(Self {
            plugin,
            ctx,
            layout,
        })
    }
}
