//! Deterministic usage and help-text layout for command-line programs.
//!
//! Given argument descriptors from `helpfmt-core`, this crate produces the
//! `usage:` block and the full help listing a CLI prints: usage lines that
//! wrap without splitting bracketed groups, an aligned help column, nested
//! sections and `%(name)s` help templates.
//!
//! # Quick start
//!
//! ```
//! use helpfmt_core::*;
//! use helpfmt_render::{format_help, FormatterConfig};
//!
//! let mut spec = CommandSpec::new("prog");
//! spec.add_argument(Action::positional("file"));
//! spec.add_argument(Action::flag(&["-v", "--verbose"], "verbose").with_help("be verbose"));
//!
//! let help = format_help(&spec, &FormatterConfig::default().with_width(40)).unwrap();
//! assert_eq!(
//!     help,
//!     "usage: prog [-v] file\n\n\
//!      positional arguments:\n  file\n\n\
//!      optional arguments:\n  -v, --verbose  be verbose\n"
//! );
//! ```
//!
//! For finer control, drive a [`HelpFormatter`] directly: open sections, add
//! text and arguments, then call [`HelpFormatter::format_help`].
//!
//! # Logging
//!
//! Width resolution, usage wrapping and document rendering emit `tracing`
//! events at `debug` level. The crate installs no subscriber.

pub mod action;
mod config;
mod context;
mod document;
mod error;
mod formatter;
mod section;
pub mod template;
mod usage;
pub mod wrap;

pub use config::{
    DEFAULT_INDENT_INCREMENT, DEFAULT_MAX_HELP_POSITION, FALLBACK_COLUMNS, FormatterConfig,
    HelpStyle, MIN_WIDTH, detect_columns,
};
pub use document::{format_help, format_usage};
pub use error::{FormatError, Result};
pub use formatter::HelpFormatter;
pub use usage::DEFAULT_USAGE_PREFIX;
