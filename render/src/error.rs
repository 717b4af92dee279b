//! Error types for help rendering.
//!
//! Configuration errors (bad templates, groups referencing unknown actions,
//! metavar tuples of the wrong size, invalid widths) indicate a defect in the
//! definitions handed to the formatter. Internal invariant violations (indent
//! underflow, usage re-tokenisation mismatch) abort the render instead of
//! producing corrupted output. Neither kind is transient.

use thiserror::Error;

/// Errors that can occur while building or rendering a help document.
#[derive(Debug, Error)]
pub enum FormatError {
    /// A `%(name)s` placeholder names no known parameter.
    #[error("unknown placeholder %({name}) in template: {template:?}")]
    UnknownPlaceholder { name: String, template: String },

    /// A placeholder is unterminated or uses an unsupported conversion.
    #[error("malformed template at byte {position}: {template:?}")]
    MalformedTemplate { position: usize, template: String },

    /// A mutually-exclusive group references an action that is not present.
    #[error("group member {0:?} does not name any action")]
    UnknownGroupMember(String),

    /// A metavar tuple does not provide one name per value slot.
    #[error("metavar tuple for {dest:?} has {actual} name(s), expected {expected}")]
    MetavarArity {
        dest: String,
        expected: usize,
        actual: usize,
    },

    /// More sections were closed than opened.
    #[error("indent decreased below 0")]
    IndentUnderflow,

    /// Splitting a usage string into tokens did not round-trip.
    #[error("usage tokens {tokens:?} do not rejoin to {usage:?}")]
    UsageTokenMismatch { usage: String, tokens: Vec<String> },

    /// Formatter configuration is out of range.
    #[error("invalid formatter configuration: {0}")]
    InvalidConfig(String),

    /// Reading a configuration file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parsing a YAML configuration failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Convenience alias for results with [`FormatError`].
pub type Result<T> = std::result::Result<T, FormatError>;
