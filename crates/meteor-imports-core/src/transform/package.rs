//! Package source transformer.
//!
//! Rewrites one compiled package file so it works as an ordinary module:
//! the loader-provided `this` becomes `window`, and the module's default
//! export becomes the package's entry in Meteor's global registry. After
//! this step downstream imports read `import Pkg from "meteor/<name>"`
//! instead of poking at `window.Package` themselves.

use crate::config::ResolvedConfig;
use crate::format::FormatAdapter;
use crate::paths::GLOBAL_IMPORTS_PACKAGE;

use super::strip_globals;

/// Output of one package transform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageTransformOutput {
    pub code: String,
    /// Non-fatal diagnostics (the "package has no file content" case).
    pub warnings: Vec<String>,
}

/// Transform one compiled package file.
///
/// `name` is the colon-normalized package name derived from the file name;
/// the manifest reader guarantees it exists for every file routed here.
pub fn transform_package(
    source: &str,
    name: &str,
    config: &ResolvedConfig,
    fmt: &FormatAdapter,
) -> PackageTransformOutput {
    let mut warnings = Vec::new();

    // global-imports is generated without per-file banners; it gets its own
    // global-stripping rewrite and is never treated as empty.
    let source = if name == GLOBAL_IMPORTS_PACKAGE {
        strip_globals(source, config, fmt)
    } else {
        if !fmt.has_file_banner(source) {
            if config.strip_packages_without_files {
                return PackageTransformOutput {
                    code: String::new(),
                    warnings,
                };
            }
            if config.log_packages_without_files {
                warnings.push(format!(
                    "package '{name}' seems to not include any file and can \
                     probably be excluded"
                ));
            }
        }
        source.to_string()
    };

    let mut code = String::with_capacity(source.len() + 160);
    // Compiled package files expect the loader to call them with the global
    // object bound; replicate that with an explicit wrapper.
    code.push_str("(function () {\n");
    code.push_str(&source);
    if !source.ends_with('\n') {
        code.push('\n');
    }
    code.push_str("}).call(window);\n");
    code.push_str(&format!(
        "module.exports = window.Package[\"{name}\"];\n"
    ));
    code.push_str("Object.defineProperty(module.exports, \"__esModule\", { value: true });\n");

    PackageTransformOutput { code, warnings }
}
