/// Crate version from Cargo.toml.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Human-readable version string.
#[must_use]
pub fn version_string() -> String {
    format!("meteor-imports {VERSION}")
}
