/*
 * evaluator.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template rendering.
//!
//! Sections, partials and interpolations are resolved in a single walk over
//! the compiled tree. Rendered partials are not scanned again. Text inserted
//! by a raw interpolation goes through escaped interpolation against the same
//! view, so `{{name}}` tags inside it are expanded; any other tag in it stays
//! verbatim.

use std::fmt::Write;

use tracing::debug;

use crate::ast::{Interpolation, Partial, Section, TemplateNode, TokenKind};
use crate::context::{Value, View};
use crate::error::{TemplateError, TemplateResult};
use crate::escape::Escaped;
use crate::parser::Template;
use crate::resolver::{NullResolver, PartialResolver};
use crate::scanner::scan;

/// Default limit on nested partial inclusions.
pub const DEFAULT_MAX_PARTIAL_DEPTH: usize = 50;

/// Renders compiled templates against views, resolving partials on demand.
pub struct Renderer<'r> {
    resolver: &'r dyn PartialResolver,
    max_partial_depth: usize,
}

impl<'r> Renderer<'r> {
    pub fn new(resolver: &'r dyn PartialResolver) -> Self {
        Self {
            resolver,
            max_partial_depth: DEFAULT_MAX_PARTIAL_DEPTH,
        }
    }

    /// Set the maximum partial nesting depth.
    pub fn with_max_partial_depth(mut self, depth: usize) -> Self {
        self.max_partial_depth = depth;
        self
    }

    /// Render `template` against `view`.
    pub fn render(&self, template: &Template, view: &View) -> TemplateResult<String> {
        let mut out = String::new();
        self.render_nodes(&template.nodes, view, 0, &mut out)?;
        Ok(out)
    }

    fn render_nodes(
        &self,
        nodes: &[TemplateNode],
        view: &View,
        depth: usize,
        out: &mut String,
    ) -> TemplateResult<()> {
        for node in nodes {
            match node {
                TemplateNode::Literal(text) => out.push_str(text),
                TemplateNode::Section(section) => self.render_section(section, view, depth, out)?,
                TemplateNode::Partial(partial) => self.render_partial(partial, view, depth, out)?,
                TemplateNode::Interpolation(interpolation) => {
                    render_interpolation(interpolation, view, out)
                }
            }
        }
        Ok(())
    }

    fn render_section(
        &self,
        section: &Section,
        view: &View,
        depth: usize,
        out: &mut String,
    ) -> TemplateResult<()> {
        match view.get(&section.name) {
            Some(Value::List(items)) => {
                for item in items {
                    let scoped = view.merge(item);
                    self.render_nodes(&section.body, &scoped, depth, out)?;
                }
            }
            Some(Value::Bool(true)) => self.render_nodes(&section.body, view, depth, out)?,
            // Absent, false and scalar values hide the section
            _ => {}
        }
        Ok(())
    }

    fn render_partial(
        &self,
        partial: &Partial,
        view: &View,
        depth: usize,
        out: &mut String,
    ) -> TemplateResult<()> {
        let Some(source) = self.resolver.get_partial(&partial.name) else {
            debug!(name = %partial.name, "Partial not found, leaving tag in place");
            out.push_str(&partial.tag);
            return Ok(());
        };

        if depth >= self.max_partial_depth {
            return Err(TemplateError::RecursivePartial {
                name: partial.name.clone(),
                max_depth: self.max_partial_depth,
            });
        }

        debug!(name = %partial.name, depth, "Rendering partial");
        let template = Template::compile(&source);
        self.render_nodes(&template.nodes, view, depth + 1, out)
    }
}

fn render_interpolation(interpolation: &Interpolation, view: &View, out: &mut String) {
    let text = view.get(&interpolation.name).and_then(Value::to_text);
    match text {
        Some(text) if interpolation.escape => push_escaped(&text, out),
        Some(text) => expand_escaped(&text, view, out),
        None => out.push_str(&interpolation.tag),
    }
}

/// Copy raw substituted `text` to `out`, expanding its `{{name}}` tags.
fn expand_escaped(text: &str, view: &View, out: &mut String) {
    if !text.contains("{{") {
        out.push_str(text);
        return;
    }
    for token in scan(text) {
        let source = &text[token.span];
        match token.kind {
            TokenKind::Escaped { name } => match view.get(&name).and_then(Value::to_text) {
                Some(value) => push_escaped(&value, out),
                None => out.push_str(source),
            },
            _ => out.push_str(source),
        }
    }
}

fn push_escaped(text: &str, out: &mut String) {
    // Writing to a String cannot fail
    let _ = write!(out, "{}", Escaped(text));
}

impl Template {
    /// Render this template with the given view and partial resolver.
    pub fn render(&self, view: &View, resolver: &dyn PartialResolver) -> TemplateResult<String> {
        Renderer::new(resolver).render(self, view)
    }
}

/// Compile and render `source` in one step.
///
/// Without a resolver, partial tags are left in the output verbatim.
pub fn render(
    source: &str,
    view: &View,
    resolver: Option<&dyn PartialResolver>,
) -> TemplateResult<String> {
    let template = Template::compile(source);
    template.render(view, resolver.unwrap_or(&NullResolver))
}
