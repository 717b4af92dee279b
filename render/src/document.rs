//! Rendering of whole [`CommandSpec`]s.

use helpfmt_core::{Action, CommandSpec};
use tracing::debug;

use crate::config::FormatterConfig;
use crate::error::Result;
use crate::formatter::HelpFormatter;

/// Renders the usage block of `spec`, ending with a blank line.
///
/// # Examples
///
/// ```
/// use helpfmt_core::*;
/// use helpfmt_render::{format_usage, FormatterConfig};
///
/// let mut spec = CommandSpec::new("prog");
/// spec.add_argument(Action::positional("file"));
/// spec.add_argument(Action::flag(&["-v", "--verbose"], "verbose"));
///
/// let usage = format_usage(&spec, &FormatterConfig::default().with_width(40)).unwrap();
/// assert_eq!(usage, "usage: prog [-v] file\n\n");
/// ```
pub fn format_usage(spec: &CommandSpec, config: &FormatterConfig) -> Result<String> {
    let formatter = HelpFormatter::new(&spec.prog, config.clone())?;
    let actions: Vec<Action> = spec.actions().cloned().collect();
    formatter.format_usage(
        spec.usage.as_deref(),
        &actions,
        &spec.mutually_exclusive,
        None,
    )
}

/// Renders the full help document of `spec`: usage, description, one section
/// per argument group and the epilog.
///
/// # Examples
///
/// ```
/// use helpfmt_core::*;
/// use helpfmt_render::{format_help, FormatterConfig};
///
/// let mut spec = CommandSpec::new("prog").with_description("Reads a file.");
/// spec.add_argument(Action::positional("file").with_help("input path"));
///
/// let help = format_help(&spec, &FormatterConfig::default().with_width(40)).unwrap();
/// assert_eq!(
///     help,
///     "usage: prog file\n\nReads a file.\n\npositional arguments:\n  file  input path\n"
/// );
/// ```
pub fn format_help(spec: &CommandSpec, config: &FormatterConfig) -> Result<String> {
    let mut formatter = HelpFormatter::new(&spec.prog, config.clone())?;
    let actions: Vec<Action> = spec.actions().cloned().collect();

    formatter.add_usage(
        spec.usage.as_deref(),
        &actions,
        &spec.mutually_exclusive,
        None,
    );
    if let Some(description) = &spec.description {
        formatter.add_text(description);
    }
    for group in &spec.groups {
        formatter.start_section(Some(&group.title));
        if let Some(description) = &group.description {
            formatter.add_text(description);
        }
        formatter.add_arguments(&group.actions)?;
        formatter.end_section()?;
    }
    if let Some(epilog) = &spec.epilog {
        formatter.add_text(epilog);
    }

    debug!(
        prog = %spec.prog,
        groups = spec.groups.len(),
        actions = actions.len(),
        "Rendering help document"
    );
    formatter.format_help()
}

#[cfg(test)]
mod tests {
    use helpfmt_core::{ArgumentGroup, MutexGroup, SUPPRESS};

    use super::*;
    use crate::config::HelpStyle;
    use crate::error::FormatError;

    fn config() -> FormatterConfig {
        FormatterConfig::default().with_width(60)
    }

    #[test]
    fn test_explicit_usage_template() {
        let spec = CommandSpec::new("tool").with_usage("%(prog)s <command> [args]");
        assert_eq!(
            format_usage(&spec, &config()).unwrap(),
            "usage: tool <command> [args]\n\n"
        );
    }

    #[test]
    fn test_suppressed_usage_is_omitted_from_help() {
        let mut spec = CommandSpec::new("tool")
            .with_usage(SUPPRESS)
            .with_description("Does things.");
        spec.add_argument(Action::positional("x"));
        assert_eq!(
            format_help(&spec, &config()).unwrap(),
            "Does things.\n\npositional arguments:\n  x\n"
        );
    }

    #[test]
    fn test_empty_groups_are_omitted() {
        let mut spec = CommandSpec::new("tool");
        spec.add_argument(Action::flag(&["-q"], "quiet").with_help("no output"));
        let help = format_help(&spec, &config()).unwrap();
        assert!(!help.contains("positional arguments"));
        assert_eq!(help, "usage: tool [-q]\n\noptional arguments:\n  -q  no output\n");
    }

    #[test]
    fn test_group_description_and_epilog() {
        let mut spec = CommandSpec::new("tool").with_epilog("See the manual.");
        spec.add_group(
            ArgumentGroup::new("output")
                .with_description("Where results go.")
                .with_action(Action::optional(&["-o"], "out").with_help("file")),
        );
        assert_eq!(
            format_help(&spec, &config()).unwrap(),
            "usage: tool [-o OUT]\n\noutput:\n  Where results go.\n\n  -o OUT  file\n\nSee the manual.\n"
        );
    }

    #[test]
    fn test_unknown_group_member_surfaces() {
        let mut spec = CommandSpec::new("tool");
        spec.add_argument(Action::flag(&["--json"], "json"));
        spec.add_mutually_exclusive(MutexGroup::new(&["--json", "--xml"]));
        assert!(matches!(
            format_help(&spec, &config()),
            Err(FormatError::UnknownGroupMember(_))
        ));
    }

    #[test]
    fn test_argument_defaults_document() {
        let mut spec = CommandSpec::new("tool");
        spec.add_argument(
            Action::optional(&["--level"], "level")
                .with_default("2")
                .with_help("detail level"),
        );
        let config = config().with_style(HelpStyle::ArgumentDefaults);
        let help = format_help(&spec, &config).unwrap();
        assert!(help.contains("--level LEVEL  detail level (default: 2)\n"));
    }
}
