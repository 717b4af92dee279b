//! Formatter configuration.
//!
//! Controls the output width, the cap on the help column, the indent step and
//! the [`HelpStyle`] hooks. Configurations can be built in code or loaded from
//! YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! width: 100
//! max_help_position: 30
//! indent_increment: 2
//! style: argument-defaults
//! ```

use std::io::BufReader;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{FormatError, Result};

/// Default cap on the help column.
pub const DEFAULT_MAX_HELP_POSITION: usize = 24;

/// Default number of spaces added per nesting level.
pub const DEFAULT_INDENT_INCREMENT: usize = 2;

/// Column count assumed when neither `COLUMNS` nor the terminal report one.
pub const FALLBACK_COLUMNS: usize = 80;

/// Narrowest width a detected terminal may resolve to.
pub const MIN_WIDTH: usize = 11;

const WIDTH_MARGIN: usize = 2;

/// Selects how free text and help strings are laid out.
///
/// # Examples
///
/// ```
/// use helpfmt_render::HelpStyle;
///
/// let style: HelpStyle = serde_yaml::from_str("raw-text").unwrap();
/// assert_eq!(style, HelpStyle::RawText);
/// assert!(!style.wraps_help());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
pub enum HelpStyle {
    /// Wrap description text and help strings.
    #[default]
    Default,
    /// Keep description and epilog text verbatim; wrap help strings.
    RawDescription,
    /// Keep all text verbatim, split on line breaks only.
    RawText,
    /// Wrap like `Default` and append `(default: ...)` to help strings.
    ArgumentDefaults,
}

impl HelpStyle {
    /// Returns `true` when text blocks are re-flowed.
    pub fn wraps_text(&self) -> bool {
        matches!(self, HelpStyle::Default | HelpStyle::ArgumentDefaults)
    }

    /// Returns `true` when help strings are re-flowed.
    pub fn wraps_help(&self) -> bool {
        !matches!(self, HelpStyle::RawText)
    }
}

/// Layout settings for a [`HelpFormatter`](crate::HelpFormatter).
///
/// # Examples
///
/// ```
/// use helpfmt_render::{FormatterConfig, HelpStyle};
///
/// let config = FormatterConfig::default()
///     .with_width(60)
///     .with_style(HelpStyle::ArgumentDefaults);
/// assert_eq!(config.resolved_width(), 60);
/// assert_eq!(config.max_help_position, 24);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatterConfig {
    /// Target output width; detected from the environment when absent.
    pub width: Option<usize>,
    /// Upper bound of the help column.
    pub max_help_position: usize,
    /// Spaces added per nesting level.
    pub indent_increment: usize,
    /// Layout hooks.
    pub style: HelpStyle,
}

impl Default for FormatterConfig {
    fn default() -> Self {
        Self {
            width: None,
            max_help_position: DEFAULT_MAX_HELP_POSITION,
            indent_increment: DEFAULT_INDENT_INCREMENT,
            style: HelpStyle::Default,
        }
    }
}

impl FormatterConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](FormatError::Io) if the file cannot be read,
    /// [`Yaml`](FormatError::Yaml) if parsing fails, or
    /// [`InvalidConfig`](FormatError::InvalidConfig) if a value is out of range.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_yaml::from_reader(BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Sets an explicit width.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the help column cap.
    pub fn with_max_help_position(mut self, position: usize) -> Self {
        self.max_help_position = position;
        self
    }

    /// Sets the indent step.
    pub fn with_indent_increment(mut self, increment: usize) -> Self {
        self.indent_increment = increment;
        self
    }

    /// Sets the layout style.
    pub fn with_style(mut self, style: HelpStyle) -> Self {
        self.style = style;
        self
    }

    /// Checks that every setting is positive.
    pub fn validate(&self) -> Result<()> {
        if self.width == Some(0) {
            return Err(FormatError::InvalidConfig(
                "width must be positive".to_string(),
            ));
        }
        if self.max_help_position == 0 {
            return Err(FormatError::InvalidConfig(
                "max_help_position must be positive".to_string(),
            ));
        }
        if self.indent_increment == 0 {
            return Err(FormatError::InvalidConfig(
                "indent_increment must be positive".to_string(),
            ));
        }
        Ok(())
    }

    /// Returns the explicit width, or the detected terminal width minus a
    /// margin of two columns, never below [`MIN_WIDTH`].
    pub fn resolved_width(&self) -> usize {
        match self.width {
            Some(width) => width,
            None => {
                let columns = detect_columns();
                let width = width_from_columns(columns);
                debug!(columns, width, "Resolved help width from environment");
                width
            }
        }
    }
}

/// Reports the platform column count: `COLUMNS`, then the terminal size,
/// then [`FALLBACK_COLUMNS`].
pub fn detect_columns() -> usize {
    let from_env = std::env::var("COLUMNS").ok();
    columns_from_env(from_env.as_deref())
        .or_else(|| terminal_size::terminal_size().map(|(w, _)| w.0 as usize))
        .unwrap_or(FALLBACK_COLUMNS)
}

fn columns_from_env(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .filter(|columns| *columns > 0)
}

fn width_from_columns(columns: usize) -> usize {
    columns.saturating_sub(WIDTH_MARGIN).max(MIN_WIDTH)
}
