use std::path::PathBuf;
use thiserror::Error;

/// Core error type for meteor-imports operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(
        "No usable Meteor build at {path}: {detail}. \
         Run Meteor at least once and wait for startup to complete."
    )]
    BuildNotFound { path: PathBuf, detail: String },

    #[error("Duplicate package name '{name}' in manifest")]
    DuplicatePackage { name: String },

    #[error("Invalid configuration: {0}")]
    ConfigInvalid(String),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read settings file at {path}: {source}")]
    SettingsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Settings file at {path} is not valid JSON: {source}")]
    SettingsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(
        "Expected Meteor file-boundary markers in {path} but found none; \
         the Meteor output format may have changed (adapter supports {supported})"
    )]
    FormatMarkersMissing { path: PathBuf, supported: String },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }
}
