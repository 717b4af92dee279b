//! Mutable state threaded through one render pass.

use crate::config::HelpStyle;
use crate::error::{FormatError, Result};
use crate::template::{TemplateParams, expand};
use crate::wrap::{fill, fill_raw};

/// Narrowest width free text is wrapped to.
pub(crate) const MIN_TEXT_WIDTH: usize = 11;

/// Current indent depth and nesting level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Indentation {
    pub current: usize,
    pub level: usize,
    pub step: usize,
}

impl Indentation {
    pub fn new(step: usize) -> Self {
        Self {
            current: 0,
            level: 0,
            step,
        }
    }

    pub fn indent(&mut self) {
        self.current += self.step;
        self.level += 1;
    }

    pub fn dedent(&mut self) -> Result<()> {
        if self.level == 0 || self.current < self.step {
            return Err(FormatError::IndentUnderflow);
        }
        self.current -= self.step;
        self.level -= 1;
        Ok(())
    }

    pub fn spaces(&self) -> String {
        " ".repeat(self.current)
    }
}

/// Everything a deferred render item needs. One context serves exactly one
/// render pass.
#[derive(Debug, Clone)]
pub(crate) struct RenderContext {
    pub prog: String,
    pub width: usize,
    pub max_help_position: usize,
    pub style: HelpStyle,
    pub indentation: Indentation,
    pub action_max_length: usize,
}

impl RenderContext {
    /// Renders a free-text block followed by a blank line.
    pub fn format_text(&self, text: &str) -> Result<String> {
        let text = expand(text, &TemplateParams::with_prog(&self.prog))?;
        let indent = self.indentation.spaces();
        let body = if self.style.wraps_text() {
            let text_width = self
                .width
                .saturating_sub(self.indentation.current)
                .max(MIN_TEXT_WIDTH);
            fill(&text, text_width, &indent)
        } else {
            fill_raw(&text, &indent)
        };
        Ok(format!("{body}\n\n"))
    }
}
