//! Runtime config synthesizer.
//!
//! Generates the source of the synthetic `meteor-config` module. Framework
//! code reads `window.__meteor_runtime_config__` at startup for its
//! connection URL, root URL and public settings; this module constructs
//! that object at import time. The global is merged into, never replaced:
//! other injected modules may have created it first.

use std::path::{Path, PathBuf};

use serde_json::{Map, Value};

use crate::config::ResolvedConfig;
use crate::error::Error;

/// Load the runtime-config module source, reading the settings file when
/// one is configured.
///
/// Files read along the way are appended to `dependencies` so the host can
/// register them for rebuild tracking. Read or parse failures surface as
/// errors scoped to this one module; inline `PUBLIC_SETTINGS` suppresses
/// the file entirely.
pub fn load_runtime_config(
    config: &ResolvedConfig,
    dependencies: &mut Vec<PathBuf>,
) -> Result<String, Error> {
    let public_settings = match (&config.public_settings, &config.settings_file_path) {
        (Some(_), _) | (None, None) => None,
        (None, Some(path)) => {
            dependencies.push(path.clone());
            Some(read_public_settings(path)?)
        }
    };
    Ok(generate_runtime_config(config, public_settings.as_ref()))
}

fn read_public_settings(path: &Path) -> Result<Value, Error> {
    let bytes = std::fs::read(path).map_err(|source| Error::SettingsRead {
        path: path.to_path_buf(),
        source,
    })?;
    let settings: Value =
        serde_json::from_slice(&bytes).map_err(|source| Error::SettingsParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(settings.get("public").cloned().unwrap_or(Value::Object(Map::new())))
}

/// Generate the module source.
///
/// `public_settings` overrides the inline configuration value when given
/// (it is the settings-file content).
#[must_use]
pub fn generate_runtime_config(
    config: &ResolvedConfig,
    public_settings: Option<&Value>,
) -> String {
    let mut out = String::new();

    if config.inject_runtime_config {
        out.push_str(
            "var config = window.__meteor_runtime_config__ || \
             (window.__meteor_runtime_config__ = {});\n",
        );
    } else {
        out.push_str("var config = {};\n");
    }

    out.push_str(&format!(
        "Object.assign(config, {});\n",
        serde_json::to_string(&client_fields(config, public_settings))
            .unwrap_or_else(|_| "{}".into())
    ));

    if config.ddp_default_connection_url.is_none() {
        out.push_str(&format!(
            "config.DDP_DEFAULT_CONNECTION_URL = window.location.protocol + \
             \"//\" + window.location.hostname + \":\" + \"{}\";\n",
            config.ddp_default_connection_port
        ));
    }
    if config.root_url.is_none() {
        out.push_str(
            "config.ROOT_URL = window.location.protocol + \"//\" + window.location.host;\n",
        );
    }

    // Keep Meteor.settings.public fresh across hot updates.
    out.push_str(
        "if (module.hot && typeof Meteor !== \"undefined\") \
         Meteor.settings.public = config.PUBLIC_SETTINGS || {};\n",
    );

    out
}

/// The fields copied into the runtime-config object: the free-form
/// remainder of the configuration plus the explicit runtime overrides.
/// Internal-only options (exclusion lists, paths, logging flags) never
/// reach the client.
fn client_fields(config: &ResolvedConfig, public_settings: Option<&Value>) -> Map<String, Value> {
    let mut fields = config.extra.clone();
    if let Some(url) = &config.ddp_default_connection_url {
        fields.insert("DDP_DEFAULT_CONNECTION_URL".into(), Value::String(url.clone()));
    }
    if let Some(url) = &config.root_url {
        fields.insert("ROOT_URL".into(), Value::String(url.clone()));
    }
    let settings = public_settings
        .cloned()
        .or_else(|| config.public_settings.clone())
        .unwrap_or(Value::Object(Map::new()));
    fields.insert("PUBLIC_SETTINGS".into(), settings);
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::MeteorImportsConfig;
    use std::path::PathBuf;

    fn resolve(config: MeteorImportsConfig) -> ResolvedConfig {
        MeteorImportsConfig {
            meteor_folder: Some("meteor".into()),
            ..config
        }
        .resolve()
        .unwrap()
    }

    #[test]
    fn test_merges_into_existing_global() {
        let out = generate_runtime_config(&resolve(MeteorImportsConfig::default()), None);
        assert!(out.starts_with(
            "var config = window.__meteor_runtime_config__ || (window.__meteor_runtime_config__ = {});"
        ));
    }

    #[test]
    fn test_injection_disabled_uses_local_object() {
        let config = resolve(MeteorImportsConfig {
            inject_meteor_runtime_config: Some(false),
            ..Default::default()
        });
        let out = generate_runtime_config(&config, None);
        assert!(out.starts_with("var config = {};"));
        assert!(!out.contains("window.__meteor_runtime_config__"));
    }

    #[test]
    fn test_ddp_url_derived_from_page_location_and_port() {
        let config = resolve(MeteorImportsConfig {
            ddp_default_connection_port: Some(3000),
            ..Default::default()
        });
        let out = generate_runtime_config(&config, None);
        // Against protocol=https:, hostname=example.com this evaluates to
        // "https://example.com:3000".
        assert!(out.contains(
            "config.DDP_DEFAULT_CONNECTION_URL = window.location.protocol + \
             \"//\" + window.location.hostname + \":\" + \"3000\";"
        ));
    }

    #[test]
    fn test_explicit_urls_suppress_derivation() {
        let config = resolve(MeteorImportsConfig {
            ddp_default_connection_url: Some("wss://ddp.example.com".into()),
            root_url: Some("https://app.example.com".into()),
            ..Default::default()
        });
        let out = generate_runtime_config(&config, None);
        assert!(!out.contains("window.location.hostname"));
        assert!(!out.contains("config.ROOT_URL = window.location"));
        assert!(out.contains("\"DDP_DEFAULT_CONNECTION_URL\":\"wss://ddp.example.com\""));
        assert!(out.contains("\"ROOT_URL\":\"https://app.example.com\""));
    }

    #[test]
    fn test_internal_options_never_reach_client() {
        let config = resolve(MeteorImportsConfig {
            strip_packages_without_files: Some(false),
            log_included_packages: true,
            settings_file_path: Some(PathBuf::from("settings.json")),
            ..Default::default()
        });
        let out = generate_runtime_config(&config, None);
        assert!(!out.contains("stripPackagesWithoutFiles"));
        assert!(!out.contains("logIncludedPackages"));
        assert!(!out.contains("settings.json"));
    }

    #[test]
    fn test_inline_settings_win_and_file_never_read() {
        let config = resolve(MeteorImportsConfig {
            public_settings: Some(serde_json::json!({"ga": "UA-1"})),
            settings_file_path: Some(PathBuf::from("/definitely/missing/settings.json")),
            ..Default::default()
        });
        // resolve() already dropped the file path; load must not try to
        // read the missing file.
        let mut deps = Vec::new();
        let out = load_runtime_config(&config, &mut deps).unwrap();
        assert!(deps.is_empty());
        assert!(out.contains("\"ga\":\"UA-1\""));
    }

    #[test]
    fn test_settings_file_read_and_registered() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"public": {"feature": true}, "private": {"secret": 1}}"#)
            .unwrap();

        let config = resolve(MeteorImportsConfig {
            settings_file_path: Some(path.clone()),
            ..Default::default()
        });
        let mut deps = Vec::new();
        let out = load_runtime_config(&config, &mut deps).unwrap();
        assert_eq!(deps, vec![path]);
        assert!(out.contains("\"PUBLIC_SETTINGS\":{\"feature\":true}"));
        // Only the public section is consumed.
        assert!(!out.contains("secret"));
    }

    #[test]
    fn test_settings_file_errors_are_scoped_data_errors() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let config = resolve(MeteorImportsConfig {
            settings_file_path: Some(path.clone()),
            ..Default::default()
        });
        let mut deps = Vec::new();
        let err = load_runtime_config(&config, &mut deps).unwrap_err();
        assert!(matches!(err, Error::SettingsRead { .. }));

        std::fs::write(&path, b"{broken").unwrap();
        let err = load_runtime_config(&config, &mut deps).unwrap_err();
        assert!(matches!(err, Error::SettingsParse { .. }));
    }
}
