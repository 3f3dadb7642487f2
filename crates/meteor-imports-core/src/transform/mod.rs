//! Source transformers.
//!
//! Each transformer takes source text (or, for the synthetic modules,
//! nothing) and produces the text the host bundler should continue with.
//! All of them are pure functions over the resolved configuration and the
//! format adapter; none touch global state.

mod entry;
mod global_imports;
mod modules_shim;
mod package;
mod runtime_config;

pub use entry::generate_entry;
pub use global_imports::strip_globals;
pub use modules_shim::transform_modules_shim;
pub use package::{transform_package, PackageTransformOutput};
pub use runtime_config::{generate_runtime_config, load_runtime_config};
