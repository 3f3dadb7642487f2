//! Plugin configuration.
//!
//! The user-facing [`MeteorImportsConfig`] mirrors the option surface of the
//! original webpack plugin (camelCase keys, a few SHOUTY runtime-config
//! overrides, and a free-form remainder that is forwarded into
//! `__meteor_runtime_config__`). It is resolved exactly once per build into
//! an immutable [`ResolvedConfig`] with a documented precedence order:
//! force-excluded names > user config > built-in defaults.

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Error;

/// Package names the host environment manages itself; always excluded, no
/// matter what the user configures.
pub const FORCE_EXCLUDED: &[&str] =
    &["autoupdate", "ecmascript", "hot-code-push", "livedata", "reload"];

/// Build mode the exclusion rules are evaluated against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum BuildMode {
    #[default]
    Development,
    Production,
}

impl BuildMode {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

/// User-facing configuration, as deserialized from the host build setup.
///
/// Unknown keys are collected into `extra` and forwarded verbatim into the
/// generated runtime-config object, matching the original plugin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MeteorImportsConfig {
    /// Meteor project folder, relative to the build cwd. The build output is
    /// expected under `.meteor/local/build/programs/web.browser` inside it.
    pub meteor_folder: Option<String>,

    /// Direct path to the `programs` folder of a Meteor build. Mutually
    /// exclusive with `meteorFolder`.
    pub meteor_programs_folder: Option<String>,

    /// Packages to exclude: a plain list, or a map with per-package rules.
    pub exclude: Option<ExcludeSpec>,

    /// Global-scope names (package or variable) to strip from the
    /// `global-imports` package.
    pub exclude_globals: Option<ExcludeGlobals>,

    /// Emit an empty module for packages whose compiled file contains no
    /// file-boundary markers. Default true.
    pub strip_packages_without_files: Option<bool>,

    /// Record an info line per included package.
    pub log_included_packages: bool,

    /// Record a warning for packages kept despite having no file content.
    pub log_packages_without_files: bool,

    /// Install the generated config into `window.__meteor_runtime_config__`.
    /// Default true.
    pub inject_meteor_runtime_config: Option<bool>,

    /// Port used when deriving `DDP_DEFAULT_CONNECTION_URL`. Default 3000.
    pub ddp_default_connection_port: Option<u16>,

    /// Deprecated spelling of `ddpDefaultConnectionPort`. Migrated with a
    /// warning; the new key wins when both are set.
    #[serde(rename = "DDP_DEFAULT_CONNECTION_PORT")]
    pub ddp_default_connection_port_legacy: Option<u16>,

    /// Explicit DDP connection URL; suppresses derivation from the page
    /// location.
    #[serde(rename = "DDP_DEFAULT_CONNECTION_URL")]
    pub ddp_default_connection_url: Option<String>,

    /// Explicit root URL; suppresses derivation from the page location.
    #[serde(rename = "ROOT_URL")]
    pub root_url: Option<String>,

    /// Inline public settings. Takes precedence over `settingsFilePath`.
    #[serde(rename = "PUBLIC_SETTINGS")]
    pub public_settings: Option<Value>,

    /// Meteor settings file whose `public` key feeds `PUBLIC_SETTINGS`.
    pub settings_file_path: Option<PathBuf>,

    /// Build mode exclusion rules are evaluated against.
    pub build_mode: BuildMode,

    /// Accepted for config compatibility; the autoupdate-version emission
    /// feature is out of scope and the value is ignored.
    pub emit_autoupdate_version: Option<Value>,

    /// Any remaining fields are copied into the runtime-config object.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, Value>,
}

/// `exclude` accepts either a bare list of names or a map of per-name rules.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeSpec {
    Names(Vec<String>),
    Rules(std::collections::BTreeMap<String, ExcludeRuleSpec>),
}

/// One raw exclusion rule from the config map.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeRuleSpec {
    /// `true` excludes unconditionally; `false` is a no-op.
    Flag(bool),
    /// Replacement source text for the package (filesystem lookup skipped).
    Source(String),
    /// Exclude only in the named build mode.
    Mode { mode: BuildMode },
}

/// `excludeGlobals` accepts a single name or a list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ExcludeGlobals {
    One(String),
    Many(Vec<String>),
}

/// A normalized exclusion directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExcludeRule {
    /// Drop the package unconditionally.
    Always,
    /// Drop the package when building in this mode.
    InMode(BuildMode),
    /// Keep the package but replace its source text.
    Source(String),
}

/// Where the Meteor build output lives, relative to the build cwd.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildRootSpec {
    /// A Meteor project folder; the standard build subtree is appended.
    MeteorFolder(String),
    /// A programs folder; `web.browser` is appended.
    ProgramsFolder(String),
}

/// Immutable configuration, resolved once per build.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub build_root: BuildRootSpec,
    pub exclude: FxHashMap<String, ExcludeRule>,
    pub exclude_globals: Vec<String>,
    pub strip_packages_without_files: bool,
    pub log_included_packages: bool,
    pub log_packages_without_files: bool,
    pub inject_runtime_config: bool,
    pub ddp_default_connection_port: u16,
    pub ddp_default_connection_url: Option<String>,
    pub root_url: Option<String>,
    pub public_settings: Option<Value>,
    pub settings_file_path: Option<PathBuf>,
    pub build_mode: BuildMode,
    /// Free-form fields forwarded into the runtime-config object.
    pub extra: serde_json::Map<String, Value>,
    /// Non-fatal diagnostics produced during resolution. The library stays
    /// logging-free; the host decides what to do with these.
    pub warnings: Vec<String>,
}

impl MeteorImportsConfig {
    /// Resolve the raw configuration into an immutable [`ResolvedConfig`].
    ///
    /// Fails on contradictory options (`meteorFolder` together with
    /// `meteorProgramsFolder`, or neither). Everything else degrades to a
    /// recorded warning.
    pub fn resolve(&self) -> Result<ResolvedConfig, Error> {
        let mut warnings = Vec::new();

        let build_root = match (&self.meteor_folder, &self.meteor_programs_folder) {
            (Some(_), Some(_)) => {
                return Err(Error::ConfigInvalid(
                    "meteorFolder and meteorProgramsFolder are mutually exclusive".into(),
                ));
            }
            (Some(folder), None) => BuildRootSpec::MeteorFolder(folder.clone()),
            (None, Some(programs)) => BuildRootSpec::ProgramsFolder(programs.clone()),
            (None, None) => {
                return Err(Error::ConfigInvalid(
                    "one of meteorFolder or meteorProgramsFolder is required".into(),
                ));
            }
        };

        let mut exclude: FxHashMap<String, ExcludeRule> = FxHashMap::default();
        match &self.exclude {
            None => {}
            Some(ExcludeSpec::Names(names)) => {
                for name in names {
                    exclude.insert(name.clone(), ExcludeRule::Always);
                }
            }
            Some(ExcludeSpec::Rules(rules)) => {
                for (name, rule) in rules {
                    let normalized = match rule {
                        ExcludeRuleSpec::Flag(true) => ExcludeRule::Always,
                        ExcludeRuleSpec::Flag(false) => continue,
                        ExcludeRuleSpec::Source(text) => ExcludeRule::Source(text.clone()),
                        ExcludeRuleSpec::Mode { mode } => ExcludeRule::InMode(*mode),
                    };
                    exclude.insert(name.clone(), normalized);
                }
            }
        }

        // Force-excluded names override whatever the user configured,
        // including source replacements.
        for name in FORCE_EXCLUDED {
            if let Some(prev) = exclude.insert((*name).to_string(), ExcludeRule::Always) {
                if prev != ExcludeRule::Always {
                    warnings.push(format!(
                        "package '{name}' is managed by the host environment; \
                         the configured rule for it is ignored"
                    ));
                }
            }
        }

        let exclude_globals = match &self.exclude_globals {
            None => Vec::new(),
            Some(ExcludeGlobals::One(name)) => vec![name.clone()],
            Some(ExcludeGlobals::Many(names)) => names.clone(),
        };

        let ddp_default_connection_port = match (
            self.ddp_default_connection_port,
            self.ddp_default_connection_port_legacy,
        ) {
            (Some(port), Some(legacy)) => {
                warnings.push(format!(
                    "DDP_DEFAULT_CONNECTION_PORT is deprecated; using \
                     ddpDefaultConnectionPort={port} (deprecated value {legacy} ignored)"
                ));
                port
            }
            (Some(port), None) => port,
            (None, Some(legacy)) => {
                warnings.push(
                    "DDP_DEFAULT_CONNECTION_PORT is deprecated; \
                     use ddpDefaultConnectionPort"
                        .into(),
                );
                legacy
            }
            (None, None) => 3000,
        };

        let (public_settings, settings_file_path) =
            match (&self.public_settings, &self.settings_file_path) {
                (Some(inline), Some(path)) => {
                    warnings.push(format!(
                        "both PUBLIC_SETTINGS and settingsFilePath ({}) given; \
                         the inline value wins and the file is not read",
                        path.display()
                    ));
                    (Some(inline.clone()), None)
                }
                (inline, path) => (inline.clone(), path.clone()),
            };

        if self.emit_autoupdate_version.is_some() {
            warnings.push("emitAutoupdateVersion is not supported and is ignored".into());
        }

        Ok(ResolvedConfig {
            build_root,
            exclude,
            exclude_globals,
            strip_packages_without_files: self.strip_packages_without_files.unwrap_or(true),
            log_included_packages: self.log_included_packages,
            log_packages_without_files: self.log_packages_without_files,
            inject_runtime_config: self.inject_meteor_runtime_config.unwrap_or(true),
            ddp_default_connection_port,
            ddp_default_connection_url: self.ddp_default_connection_url.clone(),
            root_url: self.root_url.clone(),
            public_settings,
            settings_file_path,
            build_mode: self.build_mode,
            extra: self.extra.clone(),
            warnings,
        })
    }
}

impl ResolvedConfig {
    /// Does the exclusion set drop this package in the current build mode?
    #[must_use]
    pub fn is_excluded(&self, name: &str) -> bool {
        match self.exclude.get(name) {
            Some(ExcludeRule::Always) => true,
            Some(ExcludeRule::InMode(mode)) => *mode == self.build_mode,
            Some(ExcludeRule::Source(_)) | None => false,
        }
    }

    /// Source-override text for this package, if configured.
    #[must_use]
    pub fn source_override(&self, name: &str) -> Option<&str> {
        match self.exclude.get(name) {
            Some(ExcludeRule::Source(text)) => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_config() -> MeteorImportsConfig {
        MeteorImportsConfig {
            meteor_folder: Some("./meteor".into()),
            ..Default::default()
        }
    }

    #[test]
    fn test_requires_exactly_one_build_root() {
        let neither = MeteorImportsConfig::default();
        assert!(neither.resolve().is_err());

        let both = MeteorImportsConfig {
            meteor_folder: Some("./meteor".into()),
            meteor_programs_folder: Some("./build/programs".into()),
            ..Default::default()
        };
        assert!(both.resolve().is_err());

        assert!(base_config().resolve().is_ok());
    }

    #[test]
    fn test_force_excluded_overrides_user_config() {
        let mut config = base_config();
        let mut rules = std::collections::BTreeMap::new();
        // User tries to keep autoupdate alive with a source override.
        rules.insert("autoupdate".into(), ExcludeRuleSpec::Source("{}".into()));
        config.exclude = Some(ExcludeSpec::Rules(rules));

        let resolved = config.resolve().unwrap();
        assert!(resolved.is_excluded("autoupdate"));
        assert!(resolved.source_override("autoupdate").is_none());
        assert!(!resolved.warnings.is_empty());

        for name in FORCE_EXCLUDED {
            assert!(resolved.is_excluded(name), "{name} must be excluded");
        }
    }

    #[test]
    fn test_exclude_list_and_rules_forms() {
        let mut config = base_config();
        config.exclude = Some(ExcludeSpec::Names(vec!["underscore".into()]));
        let resolved = config.resolve().unwrap();
        assert!(resolved.is_excluded("underscore"));
        assert!(!resolved.is_excluded("tracker"));

        let mut rules = std::collections::BTreeMap::new();
        rules.insert("ddp".into(), ExcludeRuleSpec::Flag(true));
        rules.insert("tracker".into(), ExcludeRuleSpec::Flag(false));
        rules.insert(
            "insecure".into(),
            ExcludeRuleSpec::Mode {
                mode: BuildMode::Production,
            },
        );
        rules.insert("jquery".into(), ExcludeRuleSpec::Source("window.jQuery".into()));
        let mut config = base_config();
        config.exclude = Some(ExcludeSpec::Rules(rules));

        let resolved = config.resolve().unwrap();
        assert!(resolved.is_excluded("ddp"));
        assert!(!resolved.is_excluded("tracker"));
        // Mode rule only bites in its own mode.
        assert!(!resolved.is_excluded("insecure"));
        assert_eq!(resolved.source_override("jquery"), Some("window.jQuery"));

        let mut config = base_config();
        let mut rules = std::collections::BTreeMap::new();
        rules.insert(
            "insecure".into(),
            ExcludeRuleSpec::Mode {
                mode: BuildMode::Production,
            },
        );
        config.exclude = Some(ExcludeSpec::Rules(rules));
        config.build_mode = BuildMode::Production;
        assert!(config.resolve().unwrap().is_excluded("insecure"));
    }

    #[test]
    fn test_deprecated_port_new_key_wins() {
        let mut config = base_config();
        config.ddp_default_connection_port = Some(4000);
        config.ddp_default_connection_port_legacy = Some(9000);

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.ddp_default_connection_port, 4000);
        assert!(resolved
            .warnings
            .iter()
            .any(|w| w.contains("deprecated")));
    }

    #[test]
    fn test_deprecated_port_migrated_when_alone() {
        let mut config = base_config();
        config.ddp_default_connection_port_legacy = Some(9000);

        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.ddp_default_connection_port, 9000);
        assert!(resolved.warnings.iter().any(|w| w.contains("deprecated")));
    }

    #[test]
    fn test_port_defaults_to_3000() {
        assert_eq!(base_config().resolve().unwrap().ddp_default_connection_port, 3000);
    }

    #[test]
    fn test_inline_settings_beat_settings_file() {
        let mut config = base_config();
        config.public_settings = Some(serde_json::json!({"ga": {"id": "UA-1"}}));
        config.settings_file_path = Some(PathBuf::from("settings.json"));

        let resolved = config.resolve().unwrap();
        assert!(resolved.public_settings.is_some());
        assert!(resolved.settings_file_path.is_none());
        assert!(resolved.warnings.iter().any(|w| w.contains("inline value wins")));
    }

    #[test]
    fn test_deserializes_original_plugin_shape() {
        let json = serde_json::json!({
            "meteorFolder": "meteor",
            "exclude": ["underscore"],
            "excludeGlobals": "Symbol",
            "ddpDefaultConnectionPort": 3000,
            "ROOT_URL": "https://app.example.com",
            "PUBLIC_SETTINGS": {},
            "emitAutoupdateVersion": "auto",
            "someCustomFlag": true
        });

        let config: MeteorImportsConfig = serde_json::from_value(json).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.exclude_globals, vec!["Symbol".to_string()]);
        assert_eq!(resolved.root_url.as_deref(), Some("https://app.example.com"));
        assert_eq!(resolved.extra.get("someCustomFlag"), Some(&Value::Bool(true)));
        assert!(resolved.warnings.iter().any(|w| w.contains("emitAutoupdateVersion")));
    }
}
