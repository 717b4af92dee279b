//! Usage line composition.
//!
//! Optionals are listed before positionals. Mutually-exclusive groups whose
//! members sit next to each other are bracketed as `[a | b]` or `(a | b)`.
//! When the line is too wide it is re-tokenised so bracketed groups stay on
//! one line, then greedily packed under an aligned indent.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use helpfmt_core::{Action, MutexGroup};
use regex::Regex;
use tracing::debug;

use crate::action::{default_metavar, format_args};
use crate::context::RenderContext;
use crate::error::{FormatError, Result};
use crate::template::{TemplateParams, expand};
use crate::wrap::display_width;

/// Prefix used when the caller supplies none.
pub const DEFAULT_USAGE_PREFIX: &str = "usage: ";

static USAGE_TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\(.*?\)+|\[.*?\]+|\S+").expect("static regex must compile")
});

static OPEN_SPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([\[(]) ").expect("static regex must compile"));

static SPACE_CLOSE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r" ([\])])").expect("static regex must compile"));

static EMPTY_BRACKETS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[ *\]").expect("static regex must compile"));

static EMPTY_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\( *\)").expect("static regex must compile"));

static LONE_PARENS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\(([^|]*)\)").expect("static regex must compile"));

/// Produces `prefix + usage + "\n\n"`.
///
/// An explicit `usage` template only has `%(prog)s` expanded. Otherwise the
/// usage is composed from `actions` and `groups`.
pub(crate) fn format_usage(
    ctx: &RenderContext,
    usage: Option<&str>,
    actions: &[Action],
    groups: &[MutexGroup],
    prefix: Option<&str>,
) -> Result<String> {
    let prefix = prefix.unwrap_or(DEFAULT_USAGE_PREFIX);
    let usage = match usage {
        Some(template) if !template.is_empty() => {
            expand(template, &TemplateParams::with_prog(&ctx.prog))?
        }
        _ if actions.is_empty() => ctx.prog.clone(),
        _ => compose(ctx, actions, groups, prefix)?,
    };
    Ok(format!("{prefix}{usage}\n\n"))
}

fn compose(
    ctx: &RenderContext,
    actions: &[Action],
    groups: &[MutexGroup],
    prefix: &str,
) -> Result<String> {
    for group in groups {
        if let Some(missing) = group
            .members
            .iter()
            .find(|member| !actions.iter().any(|action| action.key() == member.as_str()))
        {
            return Err(FormatError::UnknownGroupMember(missing.clone()));
        }
    }

    let (optionals, positionals): (Vec<&Action>, Vec<&Action>) =
        actions.iter().partition(|action| action.is_optional());
    let ordered: Vec<&Action> = optionals.iter().chain(&positionals).copied().collect();

    let prog = ctx.prog.as_str();
    let action_usage = format_actions_usage(&ordered, groups)?;
    let usage = join_nonempty(&[prog, action_usage.as_str()]);

    let text_width = ctx.width.saturating_sub(ctx.indentation.current);
    let prefix_width = display_width(prefix);
    if prefix_width + display_width(&usage) <= text_width {
        return Ok(usage);
    }

    let optional_usage = format_actions_usage(&optionals, groups)?;
    let positional_usage = format_actions_usage(&positionals, groups)?;
    let optional_parts = tokenize(&optional_usage)?;
    let positional_parts = tokenize(&positional_usage)?;

    let prog_width = display_width(prog);
    let lines = if 4 * (prefix_width + prog_width) <= 3 * text_width {
        let indent = " ".repeat(prefix_width + prog_width + 1);
        let with_prog = |parts: &[String]| {
            std::iter::once(prog.to_string())
                .chain(parts.iter().cloned())
                .collect::<Vec<_>>()
        };
        if !optional_parts.is_empty() {
            let mut lines = get_lines(&with_prog(&optional_parts), &indent, Some(prefix), text_width);
            lines.extend(get_lines(&positional_parts, &indent, None, text_width));
            lines
        } else if !positional_parts.is_empty() {
            get_lines(&with_prog(&positional_parts), &indent, Some(prefix), text_width)
        } else {
            vec![prog.to_string()]
        }
    } else {
        let indent = " ".repeat(prefix_width);
        let all_parts: Vec<String> = optional_parts
            .iter()
            .chain(&positional_parts)
            .cloned()
            .collect();
        let mut lines = get_lines(&all_parts, &indent, None, text_width);
        if lines.len() > 1 {
            lines = get_lines(&optional_parts, &indent, None, text_width);
            lines.extend(get_lines(&positional_parts, &indent, None, text_width));
        }
        std::iter::once(prog.to_string()).chain(lines).collect()
    };

    debug!(text_width, lines = lines.len(), "Wrapped usage");
    Ok(lines.join("\n"))
}

/// Renders the action part of a usage line, bracketing contiguous
/// mutually-exclusive groups.
pub(crate) fn format_actions_usage(actions: &[&Action], groups: &[MutexGroup]) -> Result<String> {
    let mut bracketed: Vec<&MutexGroup> = Vec::new();
    let mut inserts: BTreeMap<usize, String> = BTreeMap::new();

    for group in groups {
        let Some(first) = group.members.first() else {
            continue;
        };
        let Some(start) = actions.iter().position(|action| action.key() == first.as_str()) else {
            continue;
        };
        let end = start + group.members.len();
        if end > actions.len()
            || !actions[start..end]
                .iter()
                .zip(&group.members)
                .all(|(action, member)| action.key() == member.as_str())
        {
            continue;
        }

        bracketed.push(group);
        let (open, close) = if group.required { ("(", ")") } else { ("[", "]") };
        match inserts.get_mut(&start) {
            Some(existing) => {
                existing.push(' ');
                existing.push_str(open);
            }
            None => {
                inserts.insert(start, open.to_string());
            }
        }
        match inserts.get_mut(&end) {
            Some(existing) => *existing = format!("{close} {existing}"),
            None => {
                inserts.insert(end, close.to_string());
            }
        }
        for separator in start + 1..end {
            inserts.insert(separator, "|".to_string());
        }
    }

    let mut parts: Vec<String> = Vec::with_capacity(actions.len());
    for (index, action) in actions.iter().enumerate() {
        if action.is_suppressed() {
            parts.push(String::new());
            if inserts.get(&index).is_some_and(|insert| insert == "|") {
                inserts.remove(&index);
            } else if inserts.get(&(index + 1)).is_some_and(|insert| insert == "|") {
                inserts.remove(&(index + 1));
            }
            continue;
        }

        let in_group = bracketed.iter().any(|group| group.contains(action.key()));
        let part = if action.is_optional() {
            let option = &action.option_strings[0];
            let part = if action.nargs.takes_value() {
                format!("{option} {}", format_args(action, &default_metavar(action))?)
            } else {
                option.clone()
            };
            if !action.required && !in_group {
                format!("[{part}]")
            } else {
                part
            }
        } else {
            let part = format_args(action, &default_metavar(action))?;
            if in_group && part.len() >= 2 && part.starts_with('[') && part.ends_with(']') {
                part[1..part.len() - 1].to_string()
            } else {
                part
            }
        };
        parts.push(part);
    }

    for (index, insert) in inserts.into_iter().rev() {
        parts.insert(index, insert);
    }

    let text = parts
        .iter()
        .map(String::as_str)
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ");
    let text = OPEN_SPACE.replace_all(&text, "$1");
    let text = SPACE_CLOSE.replace_all(&text, "$1");
    let text = EMPTY_BRACKETS.replace_all(&text, "");
    let text = EMPTY_PARENS.replace_all(&text, "");
    let text = LONE_PARENS.replace_all(&text, "$1");
    Ok(text.trim().to_string())
}

/// Splits a usage fragment so bracketed groups stay whole. The tokens must
/// rejoin to the input.
fn tokenize(usage: &str) -> Result<Vec<String>> {
    let tokens: Vec<String> = USAGE_TOKEN
        .find_iter(usage)
        .map(|m| m.as_str().to_string())
        .collect();
    if tokens.join(" ") != usage {
        return Err(FormatError::UsageTokenMismatch {
            usage: usage.to_string(),
            tokens,
        });
    }
    Ok(tokens)
}

/// Greedily packs `parts` into lines of at most `text_width` columns. With a
/// prefix, the first line is measured after it and emitted without `indent`.
fn get_lines(parts: &[String], indent: &str, prefix: Option<&str>, text_width: usize) -> Vec<String> {
    let indent_width = display_width(indent);
    let mut lines = Vec::new();
    let mut line: Vec<&str> = Vec::new();
    // Column where the next part starts, counting its separating space.
    let mut line_len = prefix.map(display_width).unwrap_or(indent_width);

    for part in parts {
        let part_width = display_width(part);
        if line_len + part_width > text_width && !line.is_empty() {
            lines.push(format!("{indent}{}", line.join(" ")));
            line.clear();
            line_len = indent_width;
        }
        line.push(part);
        line_len += part_width + 1;
    }
    if !line.is_empty() {
        lines.push(format!("{indent}{}", line.join(" ")));
    }

    if prefix.is_some() {
        if let Some(first) = lines.first_mut() {
            *first = first[indent.len()..].to_string();
        }
    }
    lines
}

fn join_nonempty(parts: &[&str]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty())
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use helpfmt_core::Nargs;

    use super::*;
    use crate::config::HelpStyle;
    use crate::context::Indentation;

    fn context(width: usize) -> RenderContext {
        RenderContext {
            prog: "prog".into(),
            width,
            max_help_position: 24,
            style: HelpStyle::Default,
            indentation: Indentation::new(2),
            action_max_length: 0,
        }
    }

    fn refs(actions: &[Action]) -> Vec<&Action> {
        actions.iter().collect()
    }

    #[test]
    fn test_simple_usage() {
        let actions = vec![
            Action::positional("file"),
            Action::flag(&["-v", "--verbose"], "verbose"),
        ];
        assert_eq!(
            format_usage(&context(40), None, &actions, &[], None).unwrap(),
            "usage: prog [-v] file\n\n"
        );
    }

    #[test]
    fn test_explicit_usage_and_prefix() {
        let ctx = context(40);
        assert_eq!(
            format_usage(&ctx, Some("%(prog)s [opts]"), &[], &[], Some("Usage: ")).unwrap(),
            "Usage: prog [opts]\n\n"
        );
        assert_eq!(
            format_usage(&ctx, None, &[], &[], None).unwrap(),
            "usage: prog\n\n"
        );
    }

    #[test]
    fn test_optional_shapes() {
        let actions = vec![
            Action::optional(&["-o", "--output"], "output"),
            Action::optional(&["--mode"], "mode").required(),
            Action::optional(&["-I"], "include").with_nargs(Nargs::ZeroOrMore),
        ];
        assert_eq!(
            format_actions_usage(&refs(&actions), &[]).unwrap(),
            "[-o OUTPUT] --mode MODE [-I [INCLUDE [INCLUDE ...]]]"
        );
    }

    #[test]
    fn test_optional_group_brackets() {
        let actions = vec![
            Action::flag(&["--json"], "json"),
            Action::flag(&["--yaml"], "yaml"),
            Action::positional("src"),
        ];
        let group = MutexGroup::new(&["--json", "--yaml"]);
        assert_eq!(
            format_actions_usage(&refs(&actions), &[group]).unwrap(),
            "[--json | --yaml] src"
        );
    }

    #[test]
    fn test_required_positional_group() {
        let actions = vec![
            Action::positional("a").with_nargs(Nargs::Optional),
            Action::positional("b"),
        ];
        let group = MutexGroup::required(&["a", "b"]);
        assert_eq!(
            format_actions_usage(&refs(&actions), &[group]).unwrap(),
            "(a | b)"
        );
    }

    #[test]
    fn test_single_member_required_group_loses_parens() {
        let actions = vec![Action::flag(&["--only"], "only")];
        let group = MutexGroup::required(&["--only"]);
        assert_eq!(
            format_actions_usage(&refs(&actions), &[group]).unwrap(),
            "--only"
        );
    }

    #[test]
    fn test_non_contiguous_group_is_skipped() {
        let actions = vec![
            Action::flag(&["-a"], "a"),
            Action::flag(&["-b"], "b"),
            Action::flag(&["-c"], "c"),
        ];
        let group = MutexGroup::new(&["-a", "-c"]);
        assert_eq!(
            format_actions_usage(&refs(&actions), &[group]).unwrap(),
            "[-a] [-b] [-c]"
        );
    }

    #[test]
    fn test_skipped_group_members_keep_own_brackets() {
        let actions = vec![
            Action::flag(&["-a"], "a"),
            Action::flag(&["-b"], "b"),
            Action::flag(&["-c"], "c"),
        ];
        let groups = vec![MutexGroup::new(&["-a", "-b"]), MutexGroup::new(&["-a", "-c"])];
        assert_eq!(
            format_actions_usage(&refs(&actions), &groups).unwrap(),
            "[-a | -b] [-c]"
        );
    }

    #[test]
    fn test_suppressed_member_drops_separator() {
        let actions = vec![
            Action::flag(&["-a"], "a"),
            Action::flag(&["-b"], "b").suppressed(),
            Action::flag(&["-c"], "c"),
        ];
        let group = MutexGroup::new(&["-a", "-b", "-c"]);
        assert_eq!(
            format_actions_usage(&refs(&actions), &[group]).unwrap(),
            "[-a | -c]"
        );
    }

    #[test]
    fn test_adjacent_groups_share_boundary() {
        let actions = vec![
            Action::flag(&["-a"], "a"),
            Action::flag(&["-b"], "b"),
            Action::flag(&["-c"], "c"),
            Action::flag(&["-d"], "d"),
        ];
        let groups = vec![MutexGroup::new(&["-a", "-b"]), MutexGroup::new(&["-c", "-d"])];
        assert_eq!(
            format_actions_usage(&refs(&actions), &groups).unwrap(),
            "[-a | -b] [-c | -d]"
        );
    }

    #[test]
    fn test_unknown_group_member() {
        let actions = vec![Action::flag(&["-a"], "a")];
        let group = MutexGroup::new(&["-a", "--ghost"]);
        assert!(matches!(
            format_usage(&context(40), None, &actions, &[group], None),
            Err(FormatError::UnknownGroupMember(ref key)) if key == "--ghost"
        ));
    }

    #[test]
    fn test_wrapped_usage_aligns_under_prog() {
        let actions = vec![
            Action::optional(&["--alpha"], "alpha"),
            Action::optional(&["--beta"], "beta"),
            Action::optional(&["--gamma"], "gamma"),
            Action::positional("source"),
            Action::positional("target"),
        ];
        let usage = format_usage(&context(42), None, &actions, &[], None).unwrap();
        assert_eq!(
            usage,
            "usage: prog [--alpha ALPHA] [--beta BETA]\n            [--gamma GAMMA]\n            source target\n\n"
        );
    }

    #[test]
    fn test_required_group_stays_atomic_when_wrapping() {
        let actions = vec![
            Action::flag(&["-v"], "verbose"),
            Action::positional("a").with_nargs(Nargs::Optional),
            Action::positional("b").with_nargs(Nargs::Optional),
        ];
        let group = MutexGroup::required(&["a", "b"]);
        let usage = format_usage(&context(20), None, &actions, &[group], None).unwrap();
        assert_eq!(usage, "usage: prog [-v]\n            (a | b)\n\n");
    }

    #[test]
    fn test_long_prog_gets_its_own_line() {
        let mut ctx = context(30);
        ctx.prog = "a-very-long-program".into();
        let actions = vec![
            Action::optional(&["--first"], "first"),
            Action::positional("input"),
        ];
        let usage = format_usage(&ctx, None, &actions, &[], None).unwrap();
        assert_eq!(
            usage,
            "usage: a-very-long-program\n       [--first FIRST] input\n\n"
        );
    }

    #[test]
    fn test_tokenize_keeps_groups() {
        assert_eq!(
            tokenize("[-h] (-a A | -b B) [-x [X ...]] file").unwrap(),
            vec!["[-h]", "(-a A | -b B)", "[-x [X ...]]", "file"]
        );
        assert!(tokenize("").unwrap().is_empty());
    }

    #[test]
    fn test_tokenize_rejects_irregular_spacing() {
        assert!(matches!(
            tokenize("a  b"),
            Err(FormatError::UsageTokenMismatch { .. })
        ));
    }
}
