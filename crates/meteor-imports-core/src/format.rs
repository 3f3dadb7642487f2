//! Format adapter: every structural pattern the transformers match against
//! Meteor's compiled output, in one place.
//!
//! These patterns are versioned against the upstream output format. Meteor
//! concatenates the files of a package with slash-banner boundary comments:
//!
//! ```text
//! /////////////////////////////////////////////////////
//! //                                                 //
//! // packages/tracker/tracker.js                     //
//! //                                                 //
//! /////////////////////////////////////////////////////
//! ```
//!
//! `modules.js` additionally embeds npm modules under `node_modules/...`
//! banners, each section living inside a `function (require, exports,
//! module)` wrapper. If Meteor changes this shape, only this module should
//! need updating; [`FormatAdapter::self_check`] fails loudly rather than
//! passing unrecognized input through.

use std::path::Path;

use regex_lite::Regex;

use crate::error::Error;

/// Upstream output formats these patterns are known to match.
pub const SUPPORTED_FORMAT: &str = "Meteor 1.3 - 1.8 web.browser output";

/// Identifier the module shim's internal `require` is renamed to.
pub const INTERNAL_REQUIRE: &str = "__meteorRequire";

/// A detected npm module block inside `modules.js`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NpmBlock {
    /// Module name as written after `node_modules/`, without the `.js`.
    pub name: String,
    /// First line of the banner (inclusive).
    pub start_line: usize,
    /// Last line of the block (inclusive; the blank line after the closing
    /// banner).
    pub end_line: usize,
}

/// Compiled structural patterns.
#[derive(Debug)]
pub struct FormatAdapter {
    file_banner: Regex,
    npm_path: Regex,
    require_token: Regex,
    global_assignment: Regex,
}

impl Default for FormatAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl FormatAdapter {
    /// Compile the patterns. The expressions are static; a failure here is a
    /// programming error, so this panics rather than returning a result.
    ///
    /// # Panics
    /// Never, for the patterns as written.
    #[must_use]
    pub fn new() -> Self {
        Self {
            // File-boundary banner: runs of slashes and whitespace leading
            // into a "packages/..." or "app/..." header.
            file_banner: Regex::new(r"(?m)(/+\s+)+(packages|app)").unwrap(),
            npm_path: Regex::new(r"node_modules/(\S+)\.js").unwrap(),
            require_token: Regex::new(r"\brequire\b").unwrap(),
            // One line of global-imports.js: `Name = Package['pkg'].Name;`
            // (or Package.pkg / Package["pkg"]). Captures the global variable
            // name and the package name.
            global_assignment: Regex::new(r#"(?m)^([^\s=]*).*Package[.\[]'?"?([^.'"\]]+).*$"#)
                .unwrap(),
        }
    }

    /// Does the source contain at least one file-boundary banner?
    ///
    /// A compiled package without any is a pure re-export wrapper with no
    /// real file content.
    #[must_use]
    pub fn has_file_banner(&self, source: &str) -> bool {
        self.file_banner.is_match(source)
    }

    /// Fail loudly when a file that must contain boundary markers contains
    /// none at all (the upstream format has probably changed).
    pub fn self_check(&self, source: &str, path: &Path) -> Result<(), Error> {
        if self.has_file_banner(source) {
            Ok(())
        } else {
            Err(Error::FormatMarkersMissing {
                path: path.to_path_buf(),
                supported: SUPPORTED_FORMAT.to_string(),
            })
        }
    }

    /// Rename every whole-word `require` token that is not a property
    /// access (`x.require` stays) to [`INTERNAL_REQUIRE`].
    #[must_use]
    pub fn rename_require(&self, source: &str) -> String {
        let mut out = String::with_capacity(source.len() + 64);
        let mut last = 0;
        for m in self.require_token.find_iter(source) {
            if source[..m.start()].ends_with('.') {
                continue;
            }
            out.push_str(&source[last..m.start()]);
            out.push_str(INTERNAL_REQUIRE);
            last = m.end();
        }
        out.push_str(&source[last..]);
        out
    }

    /// Find npm module blocks in `modules.js` source.
    ///
    /// A block is a banner box naming `node_modules/<name>.js`, its body,
    /// and a closing slash line followed by a blank line, with the enclosing
    /// wrapper's `}` right after. Meteor-scoped entries
    /// (`node_modules/meteor/...`, `meteor-*`) are not npm modules and are
    /// not reported.
    #[must_use]
    pub fn find_npm_blocks(&self, lines: &[&str]) -> Vec<NpmBlock> {
        let mut blocks = Vec::new();
        let mut i = 0;
        while i < lines.len() {
            let Some((name, header_end)) = self.banner_header_at(lines, i) else {
                i += 1;
                continue;
            };
            if name.starts_with("meteor/") || name.starts_with("meteor-") {
                i = header_end + 1;
                continue;
            }
            if let Some(close) = find_block_close(lines, header_end + 1) {
                blocks.push(NpmBlock {
                    name,
                    start_line: i,
                    // Include the blank line after the closing banner.
                    end_line: close + 1,
                });
                i = close + 2;
            } else {
                i = header_end + 1;
            }
        }
        blocks
    }

    /// Parse a banner header box starting at line `i`: a slash line, comment
    /// lines one of which names a `node_modules/...js` file, and a closing
    /// slash line. Returns the module name and the index of the closing
    /// slash line.
    fn banner_header_at(&self, lines: &[&str], i: usize) -> Option<(String, usize)> {
        if !is_slash_line(lines[i]) {
            return None;
        }
        let mut name = None;
        let mut j = i + 1;
        while j < lines.len() {
            let line = lines[j];
            if is_slash_line(line) {
                return name.map(|n| (n, j));
            }
            if !line.trim_start().starts_with("//") {
                return None;
            }
            if name.is_none() {
                if let Some(captures) = self.npm_path.captures(line) {
                    name = Some(captures[1].to_string());
                }
            }
            j += 1;
        }
        None
    }

    /// Iterate global-assignment lines of `global-imports.js`, yielding
    /// `(variable name, package name)` per match together with the line span.
    pub fn global_assignments<'a>(
        &'a self,
        source: &'a str,
    ) -> impl Iterator<Item = GlobalAssignment<'a>> + 'a {
        self.global_assignment.captures_iter(source).map(|captures| {
            let whole = captures.get(0).unwrap();
            GlobalAssignment {
                start: whole.start(),
                end: whole.end(),
                var_name: captures.get(1).unwrap().as_str(),
                package: captures.get(2).unwrap().as_str(),
            }
        })
    }
}

/// One matched global-assignment line.
#[derive(Debug, Clone, Copy)]
pub struct GlobalAssignment<'a> {
    pub start: usize,
    pub end: usize,
    pub var_name: &'a str,
    pub package: &'a str,
}

/// A banner line: nothing but slashes, long enough to be a box edge.
fn is_slash_line(line: &str) -> bool {
    let trimmed = line.trim();
    trimmed.len() >= 4 && trimmed.bytes().all(|b| b == b'/')
}

/// The closing slash line of a block body: followed by a blank line and then
/// the enclosing wrapper's `}`.
fn find_block_close(lines: &[&str], from: usize) -> Option<usize> {
    for j in from..lines.len() {
        if is_slash_line(lines[j])
            && lines.get(j + 1).is_some_and(|l| l.trim().is_empty())
            && lines
                .get(j + 2)
                .is_some_and(|l| l.trim_start().starts_with('}'))
        {
            return Some(j);
        }
    }
    None
}
