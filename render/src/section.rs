//! Deferred section tree.
//!
//! Builder calls only record items; nothing is rendered until the whole tree
//! is known, because the help column depends on every action added.

use helpfmt_core::{Action, MutexGroup, SUPPRESS};
use tracing::debug;

use crate::action::format_action;
use crate::context::RenderContext;
use crate::error::Result;
use crate::usage::format_usage;

/// Index of a section in its [`SectionTree`].
pub(crate) type SectionId = usize;

/// Id of the root section.
pub(crate) const ROOT: SectionId = 0;

/// A pending usage block.
#[derive(Debug, Clone)]
pub(crate) struct UsageRequest {
    pub usage: Option<String>,
    pub actions: Vec<Action>,
    pub groups: Vec<MutexGroup>,
    pub prefix: Option<String>,
}

#[derive(Debug, Clone)]
pub(crate) enum Item {
    Text(String),
    Usage(UsageRequest),
    Action(Action),
    Section(SectionId),
}

#[derive(Debug, Clone)]
pub(crate) struct Section {
    pub parent: Option<SectionId>,
    pub heading: Option<String>,
    pub items: Vec<Item>,
}

/// Arena of sections; children are referenced by index from their parent's
/// items.
#[derive(Debug, Clone)]
pub(crate) struct SectionTree {
    sections: Vec<Section>,
}

impl SectionTree {
    pub fn new() -> Self {
        Self {
            sections: vec![Section {
                parent: None,
                heading: None,
                items: Vec::new(),
            }],
        }
    }

    /// Opens a child of `parent` and returns its id.
    pub fn open(&mut self, parent: SectionId, heading: Option<&str>) -> SectionId {
        let id = self.sections.len();
        self.sections.push(Section {
            parent: Some(parent),
            heading: heading.map(str::to_string),
            items: Vec::new(),
        });
        self.push(parent, Item::Section(id));
        id
    }

    pub fn push(&mut self, id: SectionId, item: Item) {
        self.sections[id].items.push(item);
    }

    pub fn parent(&self, id: SectionId) -> Option<SectionId> {
        self.sections[id].parent
    }

    /// Renders section `id` and everything beneath it.
    ///
    /// A non-root section indents its items one level. An empty section
    /// renders as nothing, heading included.
    pub fn render(&self, id: SectionId, ctx: &mut RenderContext) -> Result<String> {
        let section = &self.sections[id];
        let nested = section.parent.is_some();

        if nested {
            ctx.indentation.indent();
        }
        let mut rendered = Vec::with_capacity(section.items.len());
        for item in &section.items {
            rendered.push(self.render_item(item, ctx)?);
        }
        if nested {
            ctx.indentation.dedent()?;
        }

        let body = join_parts(&rendered);
        debug!(
            section = id,
            heading = ?section.heading,
            items = section.items.len(),
            body_len = body.len(),
            "Rendered section"
        );
        if !nested {
            return Ok(body);
        }
        if body.is_empty() {
            return Ok(String::new());
        }

        let heading = match section.heading.as_deref() {
            Some(heading) if !heading.is_empty() && heading != SUPPRESS => {
                format!("{}{heading}:\n", ctx.indentation.spaces())
            }
            _ => String::new(),
        };
        Ok(join_parts(&["\n".to_string(), heading, body, "\n".to_string()]))
    }

    fn render_item(&self, item: &Item, ctx: &mut RenderContext) -> Result<String> {
        match item {
            Item::Text(text) => ctx.format_text(text),
            Item::Usage(request) => format_usage(
                ctx,
                request.usage.as_deref(),
                &request.actions,
                &request.groups,
                request.prefix.as_deref(),
            ),
            Item::Action(action) => format_action(ctx, action),
            Item::Section(id) => self.render(*id, ctx),
        }
    }
}

/// Concatenates rendered parts, skipping empty and suppressed ones.
pub(crate) fn join_parts(parts: &[String]) -> String {
    parts
        .iter()
        .filter(|part| !part.is_empty() && part.as_str() != SUPPRESS)
        .map(String::as_str)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HelpStyle;
    use crate::context::Indentation;

    fn context() -> RenderContext {
        RenderContext {
            prog: "prog".into(),
            width: 40,
            max_help_position: 24,
            style: HelpStyle::Default,
            indentation: Indentation::new(2),
            action_max_length: 6,
        }
    }

    #[test]
    fn test_empty_section_renders_nothing() {
        let mut tree = SectionTree::new();
        tree.open(ROOT, Some("options"));
        assert_eq!(tree.render(ROOT, &mut context()).unwrap(), "");
    }

    #[test]
    fn test_section_with_heading() {
        let mut tree = SectionTree::new();
        let id = tree.open(ROOT, Some("inputs"));
        tree.push(id, Item::Action(Action::positional("file")));
        assert_eq!(
            tree.render(ROOT, &mut context()).unwrap(),
            "\ninputs:\n  file\n\n"
        );
    }

    #[test]
    fn test_render_logs_each_section() {
        use std::io::Write;
        use std::sync::{Arc, Mutex};

        #[derive(Clone, Default)]
        struct Captured(Arc<Mutex<Vec<u8>>>);

        impl Write for Captured {
            fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
                self.0.lock().unwrap().extend_from_slice(buf);
                Ok(buf.len())
            }

            fn flush(&mut self) -> std::io::Result<()> {
                Ok(())
            }
        }

        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let mut tree = SectionTree::new();
        let id = tree.open(ROOT, Some("inputs"));
        tree.push(id, Item::Action(Action::positional("file")));
        tracing::subscriber::with_default(subscriber, || {
            tree.render(ROOT, &mut context()).unwrap();
        });

        let logs = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let events: Vec<&str> = logs
            .lines()
            .filter(|line| line.contains("Rendered section"))
            .collect();
        assert_eq!(events.len(), 2, "{logs}");
        assert!(events[0].contains(r#"heading=Some("inputs")"#), "{logs}");
        assert!(events[0].contains("body_len=7"), "{logs}");
        assert!(events[1].contains("heading=None"), "{logs}");
    }

    #[test]
    fn test_suppressed_heading_keeps_items() {
        let mut tree = SectionTree::new();
        let id = tree.open(ROOT, Some(SUPPRESS));
        tree.push(id, Item::Action(Action::positional("file")));
        assert_eq!(tree.render(ROOT, &mut context()).unwrap(), "\n  file\n\n");
    }

    #[test]
    fn test_nested_sections_indent_further() {
        let mut tree = SectionTree::new();
        let outer = tree.open(ROOT, Some("outer"));
        let inner = tree.open(outer, Some("inner"));
        tree.push(inner, Item::Text("note".into()));
        assert_eq!(tree.parent(inner), Some(outer));

        let mut ctx = context();
        assert_eq!(
            tree.render(ROOT, &mut ctx).unwrap(),
            "\nouter:\n\n  inner:\n    note\n\n\n\n"
        );
        assert_eq!(ctx.indentation.current, 0);
    }

    #[test]
    fn test_join_parts_skips_suppressed() {
        let parts = vec!["a".to_string(), String::new(), SUPPRESS.to_string(), "b".to_string()];
        assert_eq!(join_parts(&parts), "ab");
    }
}
