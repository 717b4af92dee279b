use std::sync::LazyLock;

use helpfmt_core::{Action, MutexGroup, SUPPRESS};
use regex::Regex;
use tracing::debug;

use crate::action::invocation_extent;
use crate::config::FormatterConfig;
use crate::context::{Indentation, RenderContext};
use crate::error::{FormatError, Result};
use crate::section::{Item, ROOT, SectionId, SectionTree, UsageRequest};
use crate::usage::format_usage;

static LONG_BREAK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\n\n\n+").expect("static regex must compile"));

/// Builder that accumulates a help document and renders it in one pass.
///
/// Items are recorded in order and rendered only by
/// [`format_help`](HelpFormatter::format_help), once the widest action
/// invocation is known.
///
/// # Examples
///
/// ```
/// use helpfmt_core::Action;
/// use helpfmt_render::{FormatterConfig, HelpFormatter};
///
/// let file = Action::positional("file");
/// let verbose = Action::flag(&["-v", "--verbose"], "verbose").with_help("be verbose");
/// let actions = vec![file.clone(), verbose.clone()];
///
/// let mut formatter = HelpFormatter::new("prog", FormatterConfig::default().with_width(40)).unwrap();
/// formatter.add_usage(None, &actions, &[], None);
/// formatter.start_section(Some("positional arguments"));
/// formatter.add_argument(&file).unwrap();
/// formatter.end_section().unwrap();
/// formatter.start_section(Some("optional arguments"));
/// formatter.add_argument(&verbose).unwrap();
/// formatter.end_section().unwrap();
///
/// assert_eq!(
///     formatter.format_help().unwrap(),
///     "usage: prog [-v] file\n\npositional arguments:\n  file\n\noptional arguments:\n  -v, --verbose  be verbose\n"
/// );
/// ```
#[derive(Debug, Clone)]
pub struct HelpFormatter {
    prog: String,
    width: usize,
    config: FormatterConfig,
    tree: SectionTree,
    current: SectionId,
    indentation: Indentation,
    action_max_length: usize,
}

impl HelpFormatter {
    /// Creates a formatter for `prog`, resolving the width from `config` or
    /// the environment.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidConfig`](FormatError::InvalidConfig) when a setting is
    /// out of range.
    pub fn new(prog: &str, config: FormatterConfig) -> Result<Self> {
        config.validate()?;
        let width = config.resolved_width();
        debug!(prog, width, style = ?config.style, "Created help formatter");
        Ok(Self {
            prog: prog.to_string(),
            width,
            indentation: Indentation::new(config.indent_increment),
            config,
            tree: SectionTree::new(),
            current: ROOT,
            action_max_length: 0,
        })
    }

    /// Program name substituted for `%(prog)s`.
    pub fn prog(&self) -> &str {
        &self.prog
    }

    /// Effective output width.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Opens a nested section. Sections with no visible content are omitted,
    /// heading included.
    pub fn start_section(&mut self, heading: Option<&str>) {
        self.indentation.indent();
        self.current = self.tree.open(self.current, heading);
    }

    /// Closes the innermost open section.
    ///
    /// # Errors
    ///
    /// Returns [`IndentUnderflow`](FormatError::IndentUnderflow) when no
    /// section is open.
    pub fn end_section(&mut self) -> Result<()> {
        let parent = self
            .tree
            .parent(self.current)
            .ok_or(FormatError::IndentUnderflow)?;
        self.indentation.dedent()?;
        self.current = parent;
        Ok(())
    }

    /// Adds a free-text block. Empty and suppressed text is ignored.
    pub fn add_text(&mut self, text: &str) {
        if !text.is_empty() && text != SUPPRESS {
            self.tree.push(self.current, Item::Text(text.to_string()));
        }
    }

    /// Adds a usage block. A suppressed usage is ignored.
    pub fn add_usage(
        &mut self,
        usage: Option<&str>,
        actions: &[Action],
        groups: &[MutexGroup],
        prefix: Option<&str>,
    ) {
        if usage == Some(SUPPRESS) {
            return;
        }
        self.tree.push(
            self.current,
            Item::Usage(UsageRequest {
                usage: usage.map(str::to_string),
                actions: actions.to_vec(),
                groups: groups.to_vec(),
                prefix: prefix.map(str::to_string),
            }),
        );
    }

    /// Adds an action to the listing. Suppressed actions are ignored and do
    /// not widen the help column.
    ///
    /// # Errors
    ///
    /// Returns [`MetavarArity`](FormatError::MetavarArity) when the action's
    /// invocation cannot be rendered.
    pub fn add_argument(&mut self, action: &Action) -> Result<()> {
        if action.is_suppressed() {
            return Ok(());
        }
        let extent = invocation_extent(
            action,
            self.indentation.current,
            self.indentation.step,
        )?;
        self.action_max_length = self.action_max_length.max(extent);
        self.tree.push(self.current, Item::Action(action.clone()));
        Ok(())
    }

    /// Adds several actions in order.
    pub fn add_arguments<'a>(&mut self, actions: impl IntoIterator<Item = &'a Action>) -> Result<()> {
        for action in actions {
            self.add_argument(action)?;
        }
        Ok(())
    }

    /// Renders a usage block immediately, without recording it.
    ///
    /// The result ends with a blank line: `"usage: prog [-v] file\n\n"`.
    pub fn format_usage(
        &self,
        usage: Option<&str>,
        actions: &[Action],
        groups: &[MutexGroup],
        prefix: Option<&str>,
    ) -> Result<String> {
        format_usage(&self.context(), usage, actions, groups, prefix)
    }

    /// Renders the accumulated document.
    ///
    /// Runs of three or more line breaks collapse to one blank line, leading
    /// and trailing line breaks are removed and a single trailing line break
    /// is added. An empty document renders as an empty string.
    pub fn format_help(self) -> Result<String> {
        let mut ctx = self.context();
        let help = self.tree.render(ROOT, &mut ctx)?;
        if help.is_empty() {
            return Ok(help);
        }
        let help = LONG_BREAK.replace_all(&help, "\n\n");
        Ok(format!("{}\n", help.trim_matches('\n')))
    }

    fn context(&self) -> RenderContext {
        RenderContext {
            prog: self.prog.clone(),
            width: self.width,
            max_help_position: self.config.max_help_position,
            style: self.config.style,
            indentation: self.indentation,
            action_max_length: self.action_max_length,
        }
    }
}
