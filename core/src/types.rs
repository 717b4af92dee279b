//! Argument descriptor types consumed by the help renderer.
//!
//! This module defines the data model used to describe a program's accepted
//! arguments. The types mirror the information an argument parser holds about
//! each declared argument, restricted to what help rendering needs, and are
//! designed for serialization with [`serde`] so command specs can be loaded
//! from JSON or YAML.

use std::fmt;
use std::str::FromStr;

use serde::de::{self, Deserializer, MapAccess, SeqAccess, Visitor};
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel value meaning "omit this entirely".
///
/// Accepted for action help, explicit usage strings, section headings, text
/// blocks and defaults.
pub const SUPPRESS: &str = "==SUPPRESS==";

/// Error returned when an arity symbol is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NargsError {
    /// The symbol is none of `?`, `*`, `+`, `...`, `A...` or an integer.
    #[error("invalid nargs value: {0:?}")]
    InvalidSymbol(String),
}

/// Arity specification controlling how many values an argument consumes
/// and how its value slots are displayed.
///
/// # Examples
///
/// ```
/// use helpfmt_core::Nargs;
///
/// assert_eq!("?".parse::<Nargs>().unwrap(), Nargs::Optional);
/// assert_eq!("3".parse::<Nargs>().unwrap(), Nargs::Count(3));
/// assert!("x".parse::<Nargs>().is_err());
/// assert!(!Nargs::Count(0).takes_value());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Nargs {
    /// Unspecified: exactly one value, shown as a bare metavar.
    #[default]
    Single,
    /// `?`: zero or one value.
    Optional,
    /// `*`: any number of values.
    ZeroOrMore,
    /// `+`: at least one value.
    OneOrMore,
    /// `...`: all remaining command-line arguments.
    Remainder,
    /// `A...`: a sub-parser command followed by its own arguments.
    Parser,
    /// A fixed number of values. `Count(0)` means the argument takes no value.
    Count(usize),
}

impl Nargs {
    /// Returns `false` only for arguments with zero value slots.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Nargs::Count(0))
    }

    /// Returns the symbolic spelling, or `None` for [`Nargs::Single`].
    pub fn symbol(&self) -> Option<String> {
        match self {
            Nargs::Single => None,
            Nargs::Optional => Some("?".to_string()),
            Nargs::ZeroOrMore => Some("*".to_string()),
            Nargs::OneOrMore => Some("+".to_string()),
            Nargs::Remainder => Some("...".to_string()),
            Nargs::Parser => Some("A...".to_string()),
            Nargs::Count(n) => Some(n.to_string()),
        }
    }
}

impl FromStr for Nargs {
    type Err = NargsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "?" => Ok(Nargs::Optional),
            "*" => Ok(Nargs::ZeroOrMore),
            "+" => Ok(Nargs::OneOrMore),
            "..." => Ok(Nargs::Remainder),
            "A..." => Ok(Nargs::Parser),
            other => other
                .parse::<usize>()
                .map(Nargs::Count)
                .map_err(|_| NargsError::InvalidSymbol(s.to_string())),
        }
    }
}

impl Serialize for Nargs {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Nargs::Single => serializer.serialize_none(),
            Nargs::Count(n) => serializer.serialize_u64(*n as u64),
            other => match other.symbol() {
                Some(symbol) => serializer.serialize_str(&symbol),
                None => serializer.serialize_none(),
            },
        }
    }
}

impl<'de> Deserialize<'de> for Nargs {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Count(usize),
            Symbol(String),
        }

        match Option::<Repr>::deserialize(deserializer)? {
            None => Ok(Nargs::Single),
            Some(Repr::Count(n)) => Ok(Nargs::Count(n)),
            Some(Repr::Symbol(symbol)) => symbol.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Display name(s) for an argument's value slots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Metavar {
    /// One name, repeated for every slot. An empty name is honoured.
    Name(String),
    /// One name per slot.
    Tuple(Vec<String>),
}

impl fmt::Display for Metavar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Metavar::Name(name) => f.write_str(name),
            Metavar::Tuple(names) => write!(f, "({})", names.join(", ")),
        }
    }
}

/// Permitted values of an argument.
///
/// Keyed choices load from either a mapping or an array of `[key, description]`
/// pairs; mapping entries keep their document order.
///
/// # Examples
///
/// ```
/// use helpfmt_core::Choices;
///
/// let list = Choices::List(vec!["json".into(), "yaml".into()]);
/// assert_eq!(list.names().collect::<Vec<_>>(), vec!["json", "yaml"]);
///
/// let keyed: Choices = serde_json::from_str(r#"{"add": "Add a file"}"#).unwrap();
/// assert_eq!(keyed.names().collect::<Vec<_>>(), vec!["add"]);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choices {
    /// Ordered sequence of values.
    List(Vec<String>),
    /// Ordered key to description mapping; only the keys are displayed.
    Keyed(Vec<(String, String)>),
}

impl Choices {
    /// Iterates over the displayed choice names in declaration order.
    pub fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        match self {
            Choices::List(values) => Box::new(values.iter().map(String::as_str)),
            Choices::Keyed(entries) => Box::new(entries.iter().map(|(key, _)| key.as_str())),
        }
    }
}

impl Serialize for Choices {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Choices::List(values) => serializer.collect_seq(values),
            Choices::Keyed(entries) => {
                serializer.collect_map(entries.iter().map(|(key, desc)| (key, desc)))
            }
        }
    }
}

impl<'de> Deserialize<'de> for Choices {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(ChoicesVisitor)
    }
}

struct ChoicesVisitor;

impl<'de> Visitor<'de> for ChoicesVisitor {
    type Value = Choices;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a list of values, a list of [key, description] pairs, or a mapping")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Choices, A::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Entry {
            Name(String),
            Pair(String, String),
        }

        let mut names = Vec::new();
        let mut pairs = Vec::new();
        while let Some(entry) = seq.next_element::<Entry>()? {
            match entry {
                Entry::Name(name) => names.push(name),
                Entry::Pair(key, desc) => pairs.push((key, desc)),
            }
        }
        match (names.is_empty(), pairs.is_empty()) {
            (_, true) => Ok(Choices::List(names)),
            (true, false) => Ok(Choices::Keyed(pairs)),
            (false, false) => Err(de::Error::custom(
                "choices mix plain values with [key, description] pairs",
            )),
        }
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Choices, A::Error> {
        let mut entries = Vec::with_capacity(map.size_hint().unwrap_or(0));
        while let Some((key, desc)) = map.next_entry::<String, String>()? {
            entries.push((key, desc));
        }
        Ok(Choices::Keyed(entries))
    }
}

/// Help template of an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Help {
    /// A `%(name)s`-style template expanded at render time.
    Text(String),
    /// The action is omitted from usage and listing.
    Suppressed,
}

impl From<String> for Help {
    fn from(value: String) -> Self {
        if value == SUPPRESS {
            Help::Suppressed
        } else {
            Help::Text(value)
        }
    }
}

impl From<&str> for Help {
    fn from(value: &str) -> Self {
        Help::from(value.to_string())
    }
}

impl From<Help> for String {
    fn from(value: Help) -> Self {
        match value {
            Help::Text(text) => text,
            Help::Suppressed => SUPPRESS.to_string(),
        }
    }
}

/// Descriptor of one declared command-line argument.
///
/// An action is *optional* iff it has option strings; otherwise it is a
/// positional. Together with [`nargs`](Action::nargs) this fully determines the
/// shape of its invocation string.
///
/// # Examples
///
/// ```
/// use helpfmt_core::{Action, Nargs};
///
/// let file = Action::positional("file");
/// assert!(!file.is_optional());
/// assert_eq!(file.key(), "file");
///
/// let verbose = Action::flag(&["-v", "--verbose"], "verbose").with_help("be verbose");
/// assert!(verbose.is_optional());
/// assert_eq!(verbose.key(), "-v");
/// assert_eq!(verbose.nargs, Nargs::Count(0));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Action {
    /// Internal name, used to derive default metavars.
    pub dest: String,
    /// Flag spellings in declaration order; empty for positionals.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub option_strings: Vec<String>,
    /// Arity of the argument.
    #[serde(default, skip_serializing_if = "is_single")]
    pub nargs: Nargs,
    /// Explicit display name for the value slots.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metavar: Option<Metavar>,
    /// Permitted values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub choices: Option<Choices>,
    /// Default value as displayed in help templates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    /// Help template, or [`Help::Suppressed`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub help: Option<Help>,
    /// Whether an optional must be supplied. Ignored for positionals.
    #[serde(default)]
    pub required: bool,
    /// Nested pseudo-actions (sub-parser commands) rendered beneath this one.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subactions: Vec<Action>,
}

fn is_single(nargs: &Nargs) -> bool {
    *nargs == Nargs::Single
}

impl Action {
    /// Creates a positional argument.
    pub fn positional(dest: &str) -> Self {
        Self {
            dest: dest.to_string(),
            ..Default::default()
        }
    }

    /// Creates an optional argument taking one value.
    pub fn optional(option_strings: &[&str], dest: &str) -> Self {
        Self {
            dest: dest.to_string(),
            option_strings: option_strings.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }

    /// Creates an optional argument with no value slots (a switch).
    pub fn flag(option_strings: &[&str], dest: &str) -> Self {
        Self::optional(option_strings, dest).with_nargs(Nargs::Count(0))
    }

    /// Creates the pseudo-action listed for one sub-parser command.
    ///
    /// Aliases are shown next to the name, e.g. `checkout (co)`.
    ///
    /// # Examples
    ///
    /// ```
    /// use helpfmt_core::{Action, Metavar};
    ///
    /// let co = Action::subcommand("checkout", &["co"], Some("switch branches"));
    /// assert_eq!(co.metavar, Some(Metavar::Name("checkout (co)".into())));
    /// ```
    pub fn subcommand(name: &str, aliases: &[&str], help: Option<&str>) -> Self {
        let metavar = if aliases.is_empty() {
            name.to_string()
        } else {
            format!("{name} ({})", aliases.join(", "))
        };
        Self {
            dest: name.to_string(),
            metavar: Some(Metavar::Name(metavar)),
            help: help.map(Help::from),
            ..Default::default()
        }
    }

    /// Creates a sub-parser action whose commands are listed as sub-actions.
    ///
    /// The command names become the action's choices, so the usage line shows
    /// `{a,b} ...` unless an explicit metavar is set.
    pub fn subparsers(dest: &str, commands: Vec<Action>) -> Self {
        let choices = commands
            .iter()
            .map(|command| {
                let description = match &command.help {
                    Some(Help::Text(text)) => text.clone(),
                    _ => String::new(),
                };
                (command.dest.clone(), description)
            })
            .collect();
        Self {
            dest: dest.to_string(),
            nargs: Nargs::Parser,
            choices: Some(Choices::Keyed(choices)),
            subactions: commands,
            ..Default::default()
        }
    }

    /// Sets the arity.
    pub fn with_nargs(mut self, nargs: Nargs) -> Self {
        self.nargs = nargs;
        self
    }

    /// Sets a single explicit metavar.
    pub fn with_metavar(mut self, metavar: &str) -> Self {
        self.metavar = Some(Metavar::Name(metavar.to_string()));
        self
    }

    /// Sets one metavar per value slot.
    pub fn with_metavar_tuple(mut self, names: &[&str]) -> Self {
        self.metavar = Some(Metavar::Tuple(
            names.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Restricts the argument to a list of values.
    pub fn with_choices(mut self, choices: &[&str]) -> Self {
        self.choices = Some(Choices::List(
            choices.iter().map(|s| s.to_string()).collect(),
        ));
        self
    }

    /// Sets the displayed default value.
    pub fn with_default(mut self, default: &str) -> Self {
        self.default = Some(default.to_string());
        self
    }

    /// Sets the help template.
    pub fn with_help(mut self, help: &str) -> Self {
        self.help = Some(Help::from(help));
        self
    }

    /// Hides the action from usage and listing.
    pub fn suppressed(mut self) -> Self {
        self.help = Some(Help::Suppressed);
        self
    }

    /// Marks an optional as required.
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// Adds a nested pseudo-action.
    pub fn with_subaction(mut self, subaction: Action) -> Self {
        self.subactions.push(subaction);
        self
    }

    /// Returns `true` when the action has option strings.
    pub fn is_optional(&self) -> bool {
        !self.option_strings.is_empty()
    }

    /// Returns `true` when the help is [`Help::Suppressed`].
    pub fn is_suppressed(&self) -> bool {
        matches!(self.help, Some(Help::Suppressed))
    }

    /// Returns the non-empty help template, if any.
    pub fn help_template(&self) -> Option<&str> {
        match &self.help {
            Some(Help::Text(text)) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    /// Identity used by groups: the first option string, or `dest` for
    /// positionals.
    pub fn key(&self) -> &str {
        self.option_strings
            .first()
            .map(String::as_str)
            .unwrap_or(&self.dest)
    }
}

/// Mutually-exclusive cluster of actions rendered as `[a | b]` or `(a | b)`.
///
/// Members are referenced by [`Action::key`].
///
/// # Examples
///
/// ```
/// use helpfmt_core::MutexGroup;
///
/// let group = MutexGroup::required(&["--json", "--yaml"]);
/// assert!(group.required);
/// assert!(group.contains("--yaml"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MutexGroup {
    /// Required groups render with parentheses, others with brackets.
    #[serde(default)]
    pub required: bool,
    /// Member action keys in declaration order.
    pub members: Vec<String>,
}

impl MutexGroup {
    /// Creates a non-required group.
    pub fn new(members: &[&str]) -> Self {
        Self {
            required: false,
            members: members.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Creates a required group.
    pub fn required(members: &[&str]) -> Self {
        Self {
            required: true,
            ..Self::new(members)
        }
    }

    /// Returns `true` if `key` is a member.
    pub fn contains(&self, key: &str) -> bool {
        self.members.iter().any(|m| m == key)
    }
}

/// Titled section of the help listing.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ArgumentGroup {
    /// Section heading, e.g. `positional arguments`.
    pub title: String,
    /// Text shown under the heading, before the actions.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Actions listed in this section.
    #[serde(default)]
    pub actions: Vec<Action>,
}

impl ArgumentGroup {
    /// Creates an empty group with the given title.
    pub fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            ..Default::default()
        }
    }

    /// Sets the description.
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    /// Adds an action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.actions.push(action);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_nargs_symbols_parse() {
        assert_eq!("*".parse::<Nargs>().unwrap(), Nargs::ZeroOrMore);
        assert_eq!("+".parse::<Nargs>().unwrap(), Nargs::OneOrMore);
        assert_eq!("...".parse::<Nargs>().unwrap(), Nargs::Remainder);
        assert_eq!("A...".parse::<Nargs>().unwrap(), Nargs::Parser);
        assert_eq!("0".parse::<Nargs>().unwrap(), Nargs::Count(0));
        assert_eq!(
            "many".parse::<Nargs>(),
            Err(NargsError::InvalidSymbol("many".to_string()))
        );
    }

    #[test]
    fn test_action_deserializes_from_json() {
        let json = r#"{
            "dest": "format",
            "option_strings": ["-f", "--format"],
            "nargs": "?",
            "choices": ["json", "yaml"],
            "help": "output format"
        }"#;
        let action: Action = serde_json::from_str(json).unwrap();
        assert!(action.is_optional());
        assert_eq!(action.nargs, Nargs::Optional);
        assert_eq!(
            action.choices,
            Some(Choices::List(vec!["json".into(), "yaml".into()]))
        );
        assert_eq!(action.help_template(), Some("output format"));
    }

    #[test]
    fn test_nargs_integer_and_absent() {
        let action: Action = serde_json::from_str(r#"{"dest": "point", "nargs": 2}"#).unwrap();
        assert_eq!(action.nargs, Nargs::Count(2));

        let action: Action = serde_json::from_str(r#"{"dest": "file"}"#).unwrap();
        assert_eq!(action.nargs, Nargs::Single);
        assert!(!action.required);
    }

    #[test]
    fn test_invalid_nargs_is_rejected() {
        let result: Result<Action, _> = serde_json::from_str(r#"{"dest": "x", "nargs": "??"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_suppress_sentinel_maps_to_suppressed() {
        let action: Action =
            serde_json::from_str(r#"{"dest": "debug", "help": "==SUPPRESS=="}"#).unwrap();
        assert!(action.is_suppressed());
        assert_eq!(action.help_template(), None);

        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["help"], SUPPRESS);
    }

    #[test]
    fn test_metavar_tuple_and_keyed_choices() {
        let action: Action = serde_json::from_str(
            r#"{"dest": "cmd", "metavar": ["X", "Y"], "choices": [["add", "Add"], ["rm", "Remove"]]}"#,
        )
        .unwrap();
        assert_eq!(
            action.metavar,
            Some(Metavar::Tuple(vec!["X".into(), "Y".into()]))
        );
        let names: Vec<&str> = action.choices.as_ref().unwrap().names().collect();
        assert_eq!(names, vec!["add", "rm"]);
    }

    #[test]
    fn test_keyed_choices_from_mapping_keep_document_order() {
        let from_json: Action = serde_json::from_str(
            r#"{"dest": "cmd", "choices": {"rm": "Remove", "add": "Add"}}"#,
        )
        .unwrap();
        let from_yaml: Action =
            serde_yaml::from_str("dest: cmd\nchoices:\n  rm: Remove\n  add: Add\n").unwrap();

        for action in [&from_json, &from_yaml] {
            let names: Vec<&str> = action.choices.as_ref().unwrap().names().collect();
            assert_eq!(names, vec!["rm", "add"]);
        }
        assert_eq!(
            from_yaml.choices,
            Some(Choices::Keyed(vec![
                ("rm".into(), "Remove".into()),
                ("add".into(), "Add".into()),
            ]))
        );
        assert_eq!(from_json.choices, from_yaml.choices);

        let json = serde_json::to_value(&from_json).unwrap();
        assert_eq!(json["choices"]["add"], "Add");
    }

    #[test]
    fn test_choices_reject_mixed_entries() {
        let result: Result<Action, _> =
            serde_json::from_str(r#"{"dest": "cmd", "choices": ["add", ["rm", "Remove"]]}"#);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("choices mix plain values"), "{err}");
    }

    #[test]
    fn test_subparsers_collects_command_names() {
        let action = Action::subparsers(
            "command",
            vec![
                Action::subcommand("init", &[], Some("create a repo")),
                Action::subcommand("clone", &["cl"], None),
            ],
        );
        assert_eq!(action.nargs, Nargs::Parser);
        assert_eq!(action.subactions.len(), 2);
        let names: Vec<&str> = action.choices.as_ref().unwrap().names().collect();
        assert_eq!(names, vec!["init", "clone"]);
    }

    #[test]
    fn test_empty_help_has_no_template() {
        let action = Action::positional("x").with_help("");
        assert_eq!(action.help_template(), None);
        assert!(!action.is_suppressed());
    }
}
