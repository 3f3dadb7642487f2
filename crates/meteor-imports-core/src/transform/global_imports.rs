//! Global-imports filtering.
//!
//! `global-imports.js` re-exports package members into global scope, one
//! assignment per line (`Tracker = Package.tracker.Tracker;`). Assignments
//! for excluded packages would throw at runtime (the package is gone), and
//! `excludeGlobals` lets applications keep chosen names out of global scope
//! on purpose; matching lines are blanked, the rest pass through.

use crate::config::ResolvedConfig;
use crate::format::FormatAdapter;

/// Remove global assignments for excluded packages and excluded global
/// names (matched against either the variable or the package name).
#[must_use]
pub fn strip_globals(source: &str, config: &ResolvedConfig, fmt: &FormatAdapter) -> String {
    let mut out = String::with_capacity(source.len());
    let mut last = 0;

    for assignment in fmt.global_assignments(source) {
        let drop = config.is_excluded(assignment.package)
            || config
                .exclude_globals
                .iter()
                .any(|g| g == assignment.package || g == assignment.var_name);
        if drop {
            out.push_str(&source[last..assignment.start]);
            last = assignment.end;
        }
    }

    out.push_str(&source[last..]);
    out
}
