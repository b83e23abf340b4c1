/*
 * parser.rs
 * Copyright (c) 2025 Posit, PBC
 */

//! Template parser.
//!
//! Folds the scanner's token stream into a tree. Each section open is paired
//! with the nearest following close of the same name, giving every section
//! the shortest enclosed body. Opens without a close, and closes without an
//! open, remain literal text.

use std::path::Path;

use crate::ast::{Interpolation, Partial, Section, TemplateNode, Token, TokenKind};
use crate::scanner::scan;

/// A compiled template ready for rendering.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    /// The parsed template tree.
    pub(crate) nodes: Vec<TemplateNode>,
}

impl Template {
    /// Compile a template from source text.
    ///
    /// Compilation never fails: text that is not valid tag syntax is kept
    /// as literal output.
    pub fn compile(source: &str) -> Self {
        let mut tokens = scan(source);
        let nodes = build(source, &mut tokens);
        Template { nodes }
    }

    /// Compile a template read from a file.
    pub fn compile_from_file(path: &Path) -> std::io::Result<Self> {
        let source = std::fs::read_to_string(path)?;
        Ok(Self::compile(&source))
    }

    /// The parsed template tree.
    pub fn nodes(&self) -> &[TemplateNode] {
        &self.nodes
    }
}

/// Build nodes from a token run, pairing sections by name.
fn build(source: &str, tokens: &mut [Token]) -> Vec<TemplateNode> {
    let mut nodes = Vec::new();
    let mut i = 0;

    while i < tokens.len() {
        let text = &source[tokens[i].span.clone()];
        match &tokens[i].kind {
            TokenKind::Text | TokenKind::SectionClose { .. } => {
                push_literal(&mut nodes, text);
                i += 1;
            }
            TokenKind::SectionOpen { name } => {
                let close = tokens[i + 1..]
                    .iter()
                    .position(|t| matches!(&t.kind, TokenKind::SectionClose { name: n } if n == name))
                    .map(|offset| i + 1 + offset);

                let Some(close) = close else {
                    push_literal(&mut nodes, text);
                    i += 1;
                    continue;
                };

                let name = name.clone();
                trim_leading_newline(source, tokens.get_mut(i + 1));
                trim_leading_newline(source, tokens.get_mut(close + 1));
                let body = build(source, &mut tokens[i + 1..close]);
                nodes.push(TemplateNode::Section(Section { name, body }));
                i = close + 1;
            }
            TokenKind::Partial { name } => {
                nodes.push(TemplateNode::Partial(Partial {
                    name: name.clone(),
                    tag: text.to_string(),
                }));
                i += 1;
            }
            TokenKind::Raw { name } | TokenKind::Escaped { name } => {
                nodes.push(TemplateNode::Interpolation(Interpolation {
                    name: name.clone(),
                    escape: matches!(tokens[i].kind, TokenKind::Escaped { .. }),
                    tag: text.to_string(),
                }));
                i += 1;
            }
        }
    }

    nodes
}

/// Drop one leading whitespace character (a `\r\n` pair counts as one) from a text token.
fn trim_leading_newline(source: &str, token: Option<&mut Token>) {
    let Some(token) = token else {
        return;
    };
    if token.kind != TokenKind::Text {
        return;
    }
    let text = &source[token.span.clone()];
    let skip = if text.starts_with("\r\n") {
        2
    } else {
        match text.chars().next() {
            Some(c) if c.is_whitespace() => c.len_utf8(),
            _ => 0,
        }
    };
    token.span.start += skip;
}

fn push_literal(nodes: &mut Vec<TemplateNode>, text: &str) {
    if text.is_empty() {
        return;
    }
    if let Some(TemplateNode::Literal(previous)) = nodes.last_mut() {
        previous.push_str(text);
    } else {
        nodes.push(TemplateNode::Literal(text.to_string()));
    }
}
