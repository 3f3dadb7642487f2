//! Rule dispatcher.
//!
//! Pure per-file classification consulted by the host bundler's pipeline.
//! Compiled Meteor package files reference a runtime loader convention the
//! bundler cannot statically analyze, so every package file except the
//! module-shim aggregator is marked opaque: load it, transform it, but never
//! traverse its own dependency references.

use crate::aliases::SyntheticModule;
use crate::paths::BuildLayout;

/// Which transform applies to a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformKind {
    /// Ordinary bundler handling, nothing of ours applies.
    None,
    /// Compiled package file: expose its global-registry entry.
    Package,
    /// The `modules.js` aggregator: reconcile its internal require with the
    /// bundler's.
    ModuleShim,
    /// The synthetic runtime-config module.
    RuntimeConfig,
}

/// Classification of one resolved module id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    pub kind: TransformKind,
    /// The bundler must treat the file as a leaf: no static dependency
    /// analysis of the transform's output.
    pub no_parse: bool,
}

impl Classification {
    const NONE: Self = Self {
        kind: TransformKind::None,
        no_parse: false,
    };
}

/// Classify a resolved module id. Priority order matters: the synthetic
/// runtime-config id first, then the module shim (the only package file safe
/// to traverse), then every other compiled script under the packages tree.
#[must_use]
pub fn classify(id: &str, layout: &BuildLayout) -> Classification {
    if SyntheticModule::from_resolved_id(id) == Some(SyntheticModule::RuntimeConfig) {
        return Classification {
            kind: TransformKind::RuntimeConfig,
            no_parse: false,
        };
    }

    if layout.is_modules_file(id) {
        return Classification {
            kind: TransformKind::ModuleShim,
            no_parse: false,
        };
    }

    // Only compiled scripts get the package rewrite; stylesheets under
    // packages/ go to the bundler's own CSS handling untouched.
    if layout.contains_package_file(id) && id.ends_with(".js") {
        return Classification {
            kind: TransformKind::Package,
            no_parse: true,
        };
    }

    Classification::NONE
}
