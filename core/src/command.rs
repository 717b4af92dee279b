use serde::{Deserialize, Serialize};

use crate::{Action, ArgumentGroup, MutexGroup};

/// Heading of the default positional section.
pub const POSITIONALS_TITLE: &str = "positional arguments";

/// Heading of the default optional section.
pub const OPTIONALS_TITLE: &str = "optional arguments";

/// Declarative description of one program's help document.
///
/// A spec groups actions into titled [`ArgumentGroup`]s (the sections of the
/// help listing) and declares [`MutexGroup`]s that shape the usage line.
///
/// # Examples
///
/// ```
/// use helpfmt_core::*;
///
/// let mut spec = CommandSpec::new("prog");
/// spec.add_argument(Action::positional("file"));
/// spec.add_argument(Action::flag(&["-v", "--verbose"], "verbose").with_help("be verbose"));
///
/// assert_eq!(spec.groups[0].title, POSITIONALS_TITLE);
/// assert_eq!(spec.groups[0].actions.len(), 1);
/// assert_eq!(spec.groups[1].actions.len(), 1);
/// assert_eq!(spec.actions().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CommandSpec {
    /// Program name substituted for `%(prog)s`.
    pub prog: String,
    /// Explicit usage template; composed from the actions when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<String>,
    /// Text shown between usage and the argument sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Text shown after the argument sections.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub epilog: Option<String>,
    /// Listing sections in display order.
    #[serde(default)]
    pub groups: Vec<ArgumentGroup>,
    /// Mutually-exclusive clusters for the usage line.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub mutually_exclusive: Vec<MutexGroup>,
}

impl CommandSpec {
    /// Creates a spec with the two default sections.
    pub fn new(prog: &str) -> Self {
        Self {
            prog: prog.to_string(),
            groups: vec![
                ArgumentGroup::new(POSITIONALS_TITLE),
                ArgumentGroup::new(OPTIONALS_TITLE),
            ],
            ..Default::default()
        }
    }

    /// Parses a spec from JSON.
    pub fn from_json_str(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Sets the epilog.
    pub fn with_epilog(mut self, epilog: &str) -> Self {
        self.epilog = Some(epilog.to_string());
        self
    }

    /// Sets an explicit usage template.
    pub fn with_usage(mut self, usage: &str) -> Self {
        self.usage = Some(usage.to_string());
        self
    }

    /// Adds an action to the default section matching its kind.
    ///
    /// Falls back to appending a new default section when the spec was built
    /// without one.
    pub fn add_argument(&mut self, action: Action) {
        let title = if action.is_optional() {
            OPTIONALS_TITLE
        } else {
            POSITIONALS_TITLE
        };
        match self.groups.iter_mut().find(|g| g.title == title) {
            Some(group) => group.actions.push(action),
            None => self
                .groups
                .push(ArgumentGroup::new(title).with_action(action)),
        }
    }

    /// Appends a titled section.
    pub fn add_group(&mut self, group: ArgumentGroup) {
        self.groups.push(group);
    }

    /// Declares a mutually-exclusive cluster.
    pub fn add_mutually_exclusive(&mut self, group: MutexGroup) {
        self.mutually_exclusive.push(group);
    }

    /// Iterates over every action in section order.
    pub fn actions(&self) -> impl Iterator<Item = &Action> {
        self.groups.iter().flat_map(|group| group.actions.iter())
    }
}
