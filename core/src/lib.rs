//! Argument descriptors and command specs for help-text rendering.
//!
//! This crate defines the input model consumed by `helpfmt-render`:
//!
//! - [`Action`]: one declared argument (positional or optional) with its
//!   arity ([`Nargs`]), display name ([`Metavar`]), permitted values
//!   ([`Choices`]) and help template ([`Help`]).
//! - [`MutexGroup`]: a mutually-exclusive cluster shaping the usage line.
//! - [`ArgumentGroup`]: a titled section of the help listing.
//! - [`CommandSpec`]: the full description of one program's help document.
//!
//! All types derive [`serde`] traits so specs can be stored as JSON or YAML.
//!
//! # Example
//!
//! ```
//! use helpfmt_core::*;
//!
//! let mut spec = CommandSpec::new("mycli").with_description("Process files.");
//! spec.add_argument(Action::positional("file").with_nargs(Nargs::OneOrMore));
//! spec.add_argument(
//!     Action::optional(&["-f", "--format"], "format").with_choices(&["json", "yaml"]),
//! );
//! spec.add_argument(Action::flag(&["--debug"], "debug").suppressed());
//!
//! assert_eq!(spec.actions().filter(|a| !a.is_suppressed()).count(), 2);
//! ```

mod command;
mod types;

pub use command::{CommandSpec, OPTIONALS_TITLE, POSITIONALS_TITLE};
pub use types::*;
