//! Layout of a Meteor client build on disk.
//!
//! Meteor writes its compiled web program to
//! `<project>/.meteor/local/build/programs/web.browser`; the compiled
//! packages live in a `packages` subdirectory next to `program.json`.

use std::path::{Path, PathBuf};

use crate::config::{BuildRootSpec, ResolvedConfig};

/// Path parts from a Meteor project folder to its compiled web program.
pub const BUILD_PATH_PARTS: &[&str] = &[".meteor", "local", "build", "programs", "web.browser"];

/// Web program directory name under a `programs` folder.
pub const WEB_PROGRAM: &str = "web.browser";

/// Manifest file name inside the build root.
pub const PROGRAM_JSON: &str = "program.json";

/// The one compiled file that bridges the npm-style module namespace.
pub const MODULES_FILE: &str = "modules.js";

/// The compiled package that re-exports package members into global scope.
pub const GLOBAL_IMPORTS_PACKAGE: &str = "global-imports";

/// Resolved on-disk layout of one Meteor build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildLayout {
    /// Absolute path of the compiled web program (contains `program.json`).
    pub build_root: PathBuf,
    /// Absolute path of the compiled packages directory.
    pub packages_dir: PathBuf,
}

impl BuildLayout {
    /// Derive the layout from the resolved configuration and the build cwd.
    #[must_use]
    pub fn from_config(config: &ResolvedConfig, cwd: &Path) -> Self {
        let build_root = match &config.build_root {
            BuildRootSpec::MeteorFolder(folder) => {
                let mut root = cwd.join(folder);
                for part in BUILD_PATH_PARTS {
                    root.push(part);
                }
                root
            }
            BuildRootSpec::ProgramsFolder(programs) => cwd.join(programs).join(WEB_PROGRAM),
        };
        let packages_dir = build_root.join("packages");
        Self {
            build_root,
            packages_dir,
        }
    }

    /// Absolute path of the build manifest.
    #[must_use]
    pub fn program_json(&self) -> PathBuf {
        self.build_root.join(PROGRAM_JSON)
    }

    /// Is this path inside the compiled packages directory?
    ///
    /// Compares normalized components so the answer does not depend on which
    /// separator the host bundler used.
    #[must_use]
    pub fn contains_package_file(&self, path: &str) -> bool {
        let normalized = normalize_separators(path);
        let prefix = normalize_separators(&self.packages_dir.to_string_lossy());
        normalized
            .strip_prefix(&prefix)
            .is_some_and(|rest| rest.starts_with('/'))
    }

    /// Is this path the module-shim aggregator file (`packages/modules.js`)?
    #[must_use]
    pub fn is_modules_file(&self, path: &str) -> bool {
        self.contains_package_file(path)
            && normalize_separators(path).ends_with(&format!("/{MODULES_FILE}"))
    }
}

/// Replace backslashes with forward slashes.
#[must_use]
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// File stem of a path string (name without directory or extension).
#[must_use]
pub fn file_stem(path: &str) -> Option<&str> {
    let normalized_end = path.rfind(['/', '\\']).map_or(0, |i| i + 1);
    let name = &path[normalized_end..];
    let stem = name.rsplit_once('.').map_or(name, |(stem, _)| stem);
    if stem.is_empty() {
        None
    } else {
        Some(stem)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeteorImportsConfig;

    fn layout(meteor_folder: &str) -> BuildLayout {
        let config = MeteorImportsConfig {
            meteor_folder: Some(meteor_folder.into()),
            ..Default::default()
        };
        BuildLayout::from_config(&config.resolve().unwrap(), Path::new("/app"))
    }

    #[test]
    fn test_layout_from_meteor_folder() {
        let layout = layout("meteor");
        assert_eq!(
            layout.build_root,
            Path::new("/app/meteor/.meteor/local/build/programs/web.browser")
        );
        assert_eq!(layout.packages_dir, layout.build_root.join("packages"));
        assert!(layout.program_json().ends_with("web.browser/program.json"));
    }

    #[test]
    fn test_layout_from_programs_folder() {
        let config = MeteorImportsConfig {
            meteor_programs_folder: Some("build/programs".into()),
            ..Default::default()
        };
        let layout = BuildLayout::from_config(&config.resolve().unwrap(), Path::new("/app"));
        assert_eq!(layout.build_root, Path::new("/app/build/programs/web.browser"));
    }

    #[test]
    fn test_contains_package_file() {
        let layout = layout("meteor");
        let inside = "/app/meteor/.meteor/local/build/programs/web.browser/packages/tracker.js";
        let outside = "/app/meteor/.meteor/local/build/programs/web.browser/program.json";
        assert!(layout.contains_package_file(inside));
        assert!(!layout.contains_package_file(outside));
        assert!(!layout.contains_package_file("/app/src/index.js"));

        // Windows separators.
        let windows = inside.replace('/', "\\");
        assert!(layout.contains_package_file(&windows));
    }

    #[test]
    fn test_is_modules_file() {
        let layout = layout("meteor");
        let shim = "/app/meteor/.meteor/local/build/programs/web.browser/packages/modules.js";
        let pkg = "/app/meteor/.meteor/local/build/programs/web.browser/packages/tracker.js";
        assert!(layout.is_modules_file(shim));
        assert!(!layout.is_modules_file(pkg));
        // Not fooled by a package merely named like the shim elsewhere.
        assert!(!layout.is_modules_file("/app/src/modules.js"));
    }

    #[test]
    fn test_file_stem() {
        assert_eq!(file_stem("packages/tracker.js"), Some("tracker"));
        assert_eq!(file_stem("a\\b\\mongo_id.js"), Some("mongo_id"));
        assert_eq!(file_stem("noext"), Some("noext"));
        assert_eq!(file_stem("dir/.js"), None);
    }
}
