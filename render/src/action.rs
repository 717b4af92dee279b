//! Invocation strings and listing entries for individual actions.
//!
//! An action's *invocation* is the left-hand column of the listing:
//! `file`, `-v, --verbose` or `-o FILE, --output FILE`. Its *args* are the
//! value-slot rendering driven by [`Nargs`], e.g. `[X [X ...]]`.

use std::borrow::Cow;

use helpfmt_core::{Action, Metavar, Nargs, SUPPRESS};

use crate::config::HelpStyle;
use crate::context::RenderContext;
use crate::error::{FormatError, Result};
use crate::template::{TemplateParams, expand};
use crate::wrap::{display_width, split_raw, wrap};

/// Narrowest width help strings are wrapped to.
const MIN_HELP_WIDTH: usize = 11;

/// Suffix appended to help strings under [`HelpStyle::ArgumentDefaults`].
const DEFAULT_SUFFIX: &str = " (default: %(default)s)";

/// Returns the metavar used when an action declares none: `dest` for
/// positionals, upper-cased `dest` for optionals.
pub fn default_metavar(action: &Action) -> String {
    if action.is_optional() {
        action.dest.to_uppercase()
    } else {
        action.dest.clone()
    }
}

/// Renders the value slots of `action` according to its arity.
///
/// # Examples
///
/// ```
/// use helpfmt_core::{Action, Nargs};
/// use helpfmt_render::action::format_args;
///
/// let files = Action::positional("file").with_nargs(Nargs::ZeroOrMore);
/// assert_eq!(format_args(&files, "file").unwrap(), "[file [file ...]]");
///
/// let point = Action::optional(&["--at"], "at")
///     .with_nargs(Nargs::Count(2))
///     .with_metavar_tuple(&["X", "Y"]);
/// assert_eq!(format_args(&point, "AT").unwrap(), "X Y");
/// ```
///
/// # Errors
///
/// Returns [`MetavarArity`](FormatError::MetavarArity) when a metavar tuple
/// does not have one name per slot.
pub fn format_args(action: &Action, default_metavar: &str) -> Result<String> {
    let names = |size: usize| metavar_names(action, default_metavar, size);
    let args = match action.nargs {
        Nargs::Single => names(1)?.concat(),
        Nargs::Optional => format!("[{}]", names(1)?.concat()),
        Nargs::ZeroOrMore => {
            let names = names(2)?;
            format!("[{} [{} ...]]", names[0], names[1])
        }
        Nargs::OneOrMore => {
            let names = names(2)?;
            format!("{} [{} ...]", names[0], names[1])
        }
        Nargs::Remainder => "...".to_string(),
        Nargs::Parser => format!("{} ...", names(1)?.concat()),
        Nargs::Count(n) => names(n)?.join(" "),
    };
    Ok(args)
}

/// Renders the left-hand listing column of `action`.
///
/// # Examples
///
/// ```
/// use helpfmt_core::Action;
/// use helpfmt_render::action::format_invocation;
///
/// let output = Action::optional(&["-o", "--output"], "output");
/// assert_eq!(format_invocation(&output).unwrap(), "-o OUTPUT, --output OUTPUT");
///
/// let verbose = Action::flag(&["-v", "--verbose"], "verbose");
/// assert_eq!(format_invocation(&verbose).unwrap(), "-v, --verbose");
/// ```
pub fn format_invocation(action: &Action) -> Result<String> {
    if !action.is_optional() {
        let invocation = match &action.metavar {
            Some(Metavar::Tuple(names)) => names.join(" "),
            _ => metavar_names(action, &default_metavar(action), 1)?
                .into_iter()
                .next()
                .unwrap_or_default(),
        };
        return Ok(invocation);
    }

    if !action.nargs.takes_value() {
        return Ok(action.option_strings.join(", "));
    }

    let args = format_args(action, &default_metavar(action))?;
    Ok(action
        .option_strings
        .iter()
        .map(|option| format!("{option} {args}"))
        .collect::<Vec<_>>()
        .join(", "))
}

/// Width the listing needs for `action` and its visible sub-actions when the
/// action sits at `indent`.
pub(crate) fn invocation_extent(action: &Action, indent: usize, step: usize) -> Result<usize> {
    let mut extent = display_width(&format_invocation(action)?) + indent;
    for sub in action.subactions.iter().filter(|sub| !sub.is_suppressed()) {
        extent = extent.max(invocation_extent(sub, indent + step, step)?);
    }
    Ok(extent)
}

/// Renders one listing entry, followed by its sub-actions one level deeper.
///
/// The help column is `min(longest invocation + 2, max_help_position)`. An
/// invocation too wide for the column puts its help on the next line.
pub(crate) fn format_action(ctx: &mut RenderContext, action: &Action) -> Result<String> {
    let help_position = (ctx.action_max_length + 2).min(ctx.max_help_position);
    let help_width = ctx
        .width
        .saturating_sub(help_position)
        .max(MIN_HELP_WIDTH);
    let action_width = help_position.saturating_sub(ctx.indentation.current + 2);
    let invocation = format_invocation(action)?;
    let indent = ctx.indentation.spaces();

    let mut parts = Vec::new();
    match action.help_template() {
        None => parts.push(format!("{indent}{invocation}\n")),
        Some(template) => {
            let invocation_width = display_width(&invocation);
            let first_indent = if invocation_width <= action_width {
                let padding = " ".repeat(action_width - invocation_width + 2);
                parts.push(format!("{indent}{invocation}{padding}"));
                0
            } else {
                parts.push(format!("{indent}{invocation}\n"));
                help_position
            };

            let help = expand_help(ctx, action, template)?;
            let lines = split_help(ctx.style, &help, help_width);
            let mut lines = lines.iter();
            let first = lines.next().map(String::as_str).unwrap_or_default();
            parts.push(format!("{}{first}\n", " ".repeat(first_indent)));
            for line in lines {
                parts.push(format!("{}{line}\n", " ".repeat(help_position)));
            }
        }
    }

    let visible: Vec<&Action> = action
        .subactions
        .iter()
        .filter(|sub| !sub.is_suppressed())
        .collect();
    if !visible.is_empty() {
        ctx.indentation.indent();
        for sub in visible {
            parts.push(format_action(ctx, sub)?);
        }
        ctx.indentation.dedent()?;
    }

    Ok(parts.concat())
}

fn expand_help(ctx: &RenderContext, action: &Action, template: &str) -> Result<String> {
    let template = if ctx.style == HelpStyle::ArgumentDefaults && shows_default(action, template) {
        Cow::Owned(format!("{template}{DEFAULT_SUFFIX}"))
    } else {
        Cow::Borrowed(template)
    };
    expand(&template, &TemplateParams::for_action(action, &ctx.prog))
}

fn shows_default(action: &Action, template: &str) -> bool {
    !template.contains("%(default)")
        && action.default.as_deref() != Some(SUPPRESS)
        && (action.is_optional() || matches!(action.nargs, Nargs::Optional | Nargs::ZeroOrMore))
}

fn split_help(style: HelpStyle, help: &str, width: usize) -> Vec<String> {
    if style.wraps_help() {
        wrap(help, width)
    } else {
        split_raw(help)
    }
}

fn metavar_names(action: &Action, default_metavar: &str, size: usize) -> Result<Vec<String>> {
    match &action.metavar {
        Some(Metavar::Tuple(names)) if names.len() == size => Ok(names.clone()),
        Some(Metavar::Tuple(names)) => Err(FormatError::MetavarArity {
            dest: action.dest.clone(),
            expected: size,
            actual: names.len(),
        }),
        Some(Metavar::Name(name)) => Ok(vec![name.clone(); size]),
        None => {
            let name = match &action.choices {
                Some(choices) => format!("{{{}}}", choices.names().collect::<Vec<_>>().join(",")),
                None => default_metavar.to_string(),
            };
            Ok(vec![name; size])
        }
    }
}
