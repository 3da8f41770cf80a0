//! Function locator
//!
//! Finds the callable entry point of a submitted program among the globals
//! of its execution context. The contract is that submissions name their
//! entry point `solution`; the remaining conventional names are lenience for
//! legacy content. Arbitrary top-level bindings are deliberately not
//! considered callable entry points, so a submission that only defines
//! `function helper() {}` is reported as having no entry point.

use rquickjs::{Object, Value};

/// Conventional entry-point names, tried in order. `solution` is the
/// documented contract; the rest are best-effort only.
pub const PREFERRED_NAMES: &[&str] = &["solution", "solve", "handler", "fn"];

/// Locate the entry point among the context's global bindings
///
/// Returns the name of the first conventional binding that is callable, or
/// `None` when the submission defines no such function.
pub fn locate_entry_point(globals: &Object<'_>) -> Option<String> {
    for name in PREFERRED_NAMES {
        if let Ok(value) = globals.get::<_, Value>(*name) {
            if value.as_function().is_some() {
                return Some((*name).to_string());
            }
        }
    }
    None
}
