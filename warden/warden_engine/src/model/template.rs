//! Meta-policy template expansion.
//!
//! A reusable policy declaration may reference `{placeholder}` values that
//! are filled in from attributes at the declaration site. Expansion is a
//! pure string rewrite executed once at discovery time; the expanded text
//! is cached alongside the declared policy and never re-expanded per call.

use std::collections::BTreeMap;
use warden_core::error::ConfigError;
use warden_core::types::MemberId;

/// Settings for meta-policy template resolution.
///
/// When no defaults are configured on the locator, templates are not
/// resolved at all and expression text is used verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TemplateDefaults {
    /// Whether a placeholder with no matching attribute is left in place
    /// rather than rejected as a configuration error
    pub ignore_unknown: bool,
}

impl Default for TemplateDefaults {
    fn default() -> Self {
        Self {
            ignore_unknown: false,
        }
    }
}

/// Expand `{placeholder}` references in the expression text.
///
/// A placeholder is a brace-delimited identifier (`[A-Za-z0-9_]+`). Brace
/// sequences that do not form an identifier are copied through untouched,
/// so expression-language syntax that happens to use braces survives.
pub(crate) fn expand(
    member: &MemberId,
    text: &str,
    args: &BTreeMap<String, String>,
    defaults: TemplateDefaults,
) -> Result<String, ConfigError> {
    if !text.contains('{') {
        return Ok(text.to_string());
    }

    let mut expanded = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('{') {
        expanded.push_str(&rest[..open]);
        let tail = &rest[open..];

        match tail[1..].find('}') {
            Some(close) => {
                let name = &tail[1..close + 1];
                let is_identifier = !name.is_empty()
                    && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');

                if is_identifier {
                    match args.get(name) {
                        Some(value) => expanded.push_str(value),
                        None if defaults.ignore_unknown => expanded.push_str(&tail[..close + 2]),
                        None => {
                            return Err(ConfigError::UnknownPlaceholder {
                                member: member.clone(),
                                placeholder: name.to_string(),
                            })
                        }
                    }
                } else {
                    expanded.push_str(&tail[..close + 2]);
                }
                rest = &tail[close + 2..];
            }
            None => {
                // Unbalanced brace; copy the remainder through
                expanded.push_str(tail);
                rest = "";
            }
        }
    }

    expanded.push_str(rest);
    Ok(expanded)
}
