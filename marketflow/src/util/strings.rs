//! String normalization helpers.

use once_cell::sync::Lazy;
use regex::Regex;

static NON_WORD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^\w\s]").expect("regex for non-word characters"));
static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("regex for whitespace runs"));
static CAMEL_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(.)([A-Z][a-z]+)").expect("regex for camel-case boundaries"));
static DOUBLE_UNDERSCORE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__([A-Z])").expect("regex for doubled underscores"));
static LOWER_UPPER_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"([a-z0-9])([A-Z])").expect("regex for lower-upper boundaries"));

/// Removes every character that is neither a word character nor whitespace,
/// then trims.
#[must_use]
pub fn clear_nonwords(input: &str) -> String {
    NON_WORD.replace_all(input, "").trim().to_string()
}

/// Collapses the input into a dash-separated slug.
#[must_use]
pub fn urlify(input: &str) -> String {
    let cleared = NON_WORD.replace_all(input, "");
    WHITESPACE.replace_all(&cleared, "-").to_string()
}

/// Rewrites the input to snake_case: punctuation removed, whitespace and
/// camel-case boundaries become underscores.
#[must_use]
pub fn to_snake_case(input: &str) -> String {
    let cleared = clear_nonwords(input);
    let underscored = WHITESPACE.replace_all(&cleared, "_").to_string();
    let split = CAMEL_BOUNDARY.replace_all(&underscored, "${1}_${2}").to_string();
    let deduplicated = DOUBLE_UNDERSCORE.replace_all(&split, "_${1}").to_string();
    LOWER_UPPER_BOUNDARY
        .replace_all(&deduplicated, "${1}_${2}")
        .to_lowercase()
}
