//! Sample values for dynamic path segments.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

/// Sample value for numeric identifiers.
pub const SAMPLE_ID: &str = "1";

/// Sample value for UUID identifiers.
pub const SAMPLE_UUID: &str = "550e8400-e29b-41d4-a716-446655440000";

/// Sample value for any other placeholder.
pub const SAMPLE_DEFAULT: &str = "test";

/// A `{...}` token with non-empty content and no nested braces.
static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{([^{}]+)\}").expect("valid regex"));

/// Replace every placeholder in `path` with a requestable sample value.
///
/// Each occurrence is resolved on its own name:
///
/// ```text
/// {id}, {userId}  -> 1
/// {uuid}          -> 550e8400-e29b-41d4-a716-446655440000
/// {anything}      -> test
/// ```
///
/// Unbalanced braces and empty `{}` are left untouched. With nested braces only
/// the innermost balanced token is replaced, so `{a{b}` becomes `{atest`.
pub fn substitute(path: &str) -> String {
    PLACEHOLDER
        .replace_all(path, |caps: &Captures| sample_value(&caps[1]))
        .into_owned()
}

fn sample_value(token: &str) -> &'static str {
    match token {
        "id" | "userId" => SAMPLE_ID,
        "uuid" => SAMPLE_UUID,
        _ => SAMPLE_DEFAULT,
    }
}
