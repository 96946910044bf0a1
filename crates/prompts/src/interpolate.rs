// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Template variable interpolation for prompt composition.

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;

/// Regex pattern for `{variable_name}`.
// Allow expect here as the regex is compile-time verified to be valid
#[allow(clippy::expect_used)]
static VAR_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-zA-Z_][a-zA-Z0-9_]*)\}").expect("constant regex pattern is valid"));

/// Interpolate `{name}` placeholders with values from `vars`. Unknown
/// placeholders are left as-is — a composer bug that forgets to supply a
/// variable fails loudly in the rendered prompt text rather than panicking,
/// since prompt templates carry no I/O or panics (doc-prompts is pure).
pub fn interpolate(template: &str, vars: &HashMap<&str, &str>) -> String {
    VAR_PATTERN
        .replace_all(template, |caps: &regex::Captures| match vars.get(&caps[1]) {
            Some(val) => val.to_string(),
            None => caps[0].to_string(),
        })
        .to_string()
}

#[cfg(test)]
#[path = "interpolate_tests.rs"]
mod tests;
