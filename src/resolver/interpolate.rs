//! `${name}` placeholder expansion.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("placeholder pattern is valid"));

/// Outcome of expanding a string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interpolated {
    /// The expanded text. Unresolved tokens are kept verbatim.
    pub value: String,

    /// Names of the tokens no source could resolve, in order of appearance.
    pub unresolved: Vec<String>,
}

impl Interpolated {
    /// Whether every token was resolved.
    pub fn is_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Return the value if every token was resolved.
    pub fn into_resolved(self) -> Option<String> {
        self.is_resolved().then_some(self.value)
    }
}

/// Whether `value` contains at least one `${...}` token.
pub fn has_placeholders(value: &str) -> bool {
    PLACEHOLDER.is_match(value)
}

/// Names of the tokens in `value`, in order of appearance.
pub fn placeholders(value: &str) -> Vec<&str> {
    PLACEHOLDER
        .captures_iter(value)
        .filter_map(|c| c.get(1).map(|m| m.as_str()))
        .collect()
}

/// Replace every token with `lookup(name)`.
///
/// Substituted text is not rescanned; a lookup that wants nested expansion
/// must expand its own result.
pub fn interpolate(value: &str, mut lookup: impl FnMut(&str) -> Option<String>) -> Interpolated {
    let mut unresolved = Vec::new();
    let expanded = PLACEHOLDER.replace_all(value, |caps: &Captures<'_>| {
        let name = &caps[1];
        match lookup(name) {
            Some(resolved) => resolved,
            None => {
                unresolved.push(name.to_string());
                caps[0].to_string()
            }
        }
    });

    Interpolated {
        value: expanded.into_owned(),
        unresolved,
    }
}
