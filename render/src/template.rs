//! `%(name)s`-style placeholder expansion for usage, text and help templates.
//!
//! Only an enumerated set of action attributes can be referenced; see
//! [`TemplateParams::for_action`]. An unknown name is a configuration error.

use std::collections::BTreeMap;

use helpfmt_core::{Action, Help, SUPPRESS};

use crate::error::{FormatError, Result};

/// Rendering of an absent attribute.
const ABSENT: &str = "None";

/// Named values available to a template.
///
/// # Examples
///
/// ```
/// use helpfmt_core::Action;
/// use helpfmt_render::template::{expand, TemplateParams};
///
/// let action = Action::optional(&["--level"], "level")
///     .with_choices(&["low", "high"])
///     .with_default("low");
/// let params = TemplateParams::for_action(&action, "prog");
/// assert_eq!(
///     expand("%(prog)s: one of %(choices)s (default %(default)s)", &params).unwrap(),
///     "prog: one of low, high (default low)"
/// );
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TemplateParams {
    values: BTreeMap<String, String>,
}

impl TemplateParams {
    /// Creates an empty parameter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a parameter set holding only `prog`.
    pub fn with_prog(prog: &str) -> Self {
        let mut params = Self::new();
        params.insert("prog", prog);
        params
    }

    /// Builds the parameters an action's help template may reference:
    /// `prog`, `dest`, `option_strings`, `nargs`, `metavar`, `choices`,
    /// `default`, `required` and `help`.
    ///
    /// Absent attributes render as `None`. Attributes equal to the suppress
    /// sentinel are left out, so referencing them fails.
    pub fn for_action(action: &Action, prog: &str) -> Self {
        let mut params = Self::with_prog(prog);
        params.insert("dest", &action.dest);
        params.insert("option_strings", &action.option_strings.join(", "));
        params.insert(
            "nargs",
            action.nargs.symbol().as_deref().unwrap_or(ABSENT),
        );
        params.insert(
            "metavar",
            &action
                .metavar
                .as_ref()
                .map(|m| m.to_string())
                .unwrap_or_else(|| ABSENT.to_string()),
        );
        params.insert(
            "choices",
            &action
                .choices
                .as_ref()
                .map(|c| c.names().collect::<Vec<_>>().join(", "))
                .unwrap_or_else(|| ABSENT.to_string()),
        );
        params.insert("default", action.default.as_deref().unwrap_or(ABSENT));
        params.insert("required", if action.required { "true" } else { "false" });
        if let Some(Help::Text(help)) = &action.help {
            params.insert("help", help);
        }
        params
    }

    /// Adds or replaces a value. Values equal to the suppress sentinel are
    /// dropped.
    pub fn insert(&mut self, name: &str, value: &str) {
        if value == SUPPRESS {
            self.values.remove(name);
        } else {
            self.values.insert(name.to_string(), value.to_string());
        }
    }

    /// Looks up a value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }
}

/// Expands `%(name)s` placeholders in `template`.
///
/// Supported conversions are `s`, `d` and `i` (inserted as-is) and `r`
/// (single-quoted). `%%` yields a literal `%`; a `%` that starts neither form
/// is kept literally.
///
/// # Errors
///
/// [`UnknownPlaceholder`](FormatError::UnknownPlaceholder) when a name is not
/// in `params`; [`MalformedTemplate`](FormatError::MalformedTemplate) when a
/// placeholder is unterminated or uses another conversion.
pub fn expand(template: &str, params: &TemplateParams) -> Result<String> {
    let malformed = |position: usize| FormatError::MalformedTemplate {
        position,
        template: template.to_string(),
    };

    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    let mut offset = 0;

    while let Some(idx) = rest.find('%') {
        out.push_str(&rest[..idx]);
        let position = offset + idx;
        let after = &rest[idx + 1..];

        let consumed = if after.starts_with('%') {
            out.push('%');
            idx + 2
        } else if let Some(inner) = after.strip_prefix('(') {
            let close = inner.find(')').ok_or_else(|| malformed(position))?;
            let name = &inner[..close];
            let conversion = inner[close + 1..]
                .chars()
                .next()
                .ok_or_else(|| malformed(position))?;
            if !matches!(conversion, 's' | 'd' | 'i' | 'r') {
                return Err(malformed(position));
            }
            let value = params
                .get(name)
                .ok_or_else(|| FormatError::UnknownPlaceholder {
                    name: name.to_string(),
                    template: template.to_string(),
                })?;
            if conversion == 'r' {
                out.push('\'');
                out.push_str(value);
                out.push('\'');
            } else {
                out.push_str(value);
            }
            // "%(" + name + ")" + conversion
            idx + 2 + close + 1 + conversion.len_utf8()
        } else {
            out.push('%');
            idx + 1
        };

        rest = &rest[consumed..];
        offset += consumed;
    }

    out.push_str(rest);
    Ok(out)
}
