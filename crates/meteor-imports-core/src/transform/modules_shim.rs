//! Module-shim transformer.
//!
//! `modules.js` is the one compiled package the bundler is allowed to
//! traverse: it carries Meteor's npm-style secondary module namespace. Two
//! rewrites make it coexist with the host bundler:
//!
//! 1. Its internal `require` placeholder is renamed so the bundler's own
//!    `require` resolution never collides with it.
//! 2. Each embedded npm module block is replaced with a native require, so
//!    those modules come from the host bundler's graph instead of the copy
//!    Meteor packaged.

use std::path::Path;

use crate::error::Error;
use crate::format::FormatAdapter;

/// Rewrite `modules.js` source. Fails when the file carries none of the
/// expected boundary markers (upstream format change; a silent pass-through
/// would corrupt the build).
pub fn transform_modules_shim(
    source: &str,
    path: &Path,
    fmt: &FormatAdapter,
) -> Result<String, Error> {
    fmt.self_check(source, path)?;

    let renamed = fmt.rename_require(source);
    Ok(replace_npm_blocks(&renamed, fmt))
}

/// Replace each npm module block with a direct assignment off the module
/// wrapper's arguments (`function (require, exports, module)`), requiring
/// the package natively.
fn replace_npm_blocks(source: &str, fmt: &FormatAdapter) -> String {
    let lines: Vec<&str> = source.lines().collect();
    let blocks = fmt.find_npm_blocks(&lines);
    if blocks.is_empty() {
        return source.to_string();
    }

    let mut out = String::with_capacity(source.len());
    let mut next_block = blocks.iter().peekable();
    let mut i = 0;
    while i < lines.len() {
        if let Some(block) = next_block.peek() {
            if block.start_line == i {
                out.push_str(&format!(
                    "arguments[2].exports = require(\"{}\");\n",
                    block.name
                ));
                i = block.end_line + 1;
                next_block.next();
                continue;
            }
        }
        out.push_str(lines[i]);
        out.push('\n');
        i += 1;
    }
    if !source.ends_with('\n') {
        out.pop();
    }
    out
}
