//! MATCH clause to `graph-match` pattern

use super::expression::render_literal;
use super::ClauseTranslator;
use crate::ast::{Expression, MatchClause, NodePattern, PathExpression, RelationshipPattern};
use graphkql_core::{Error, Result};

/// Translates the MATCH clause into a `graph-match` fragment
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphMatchTranslator;

impl ClauseTranslator for GraphMatchTranslator {
    type Clause = MatchClause;
    const CLAUSE: &'static str = "MATCH";

    fn translate(&self, clause: &MatchClause) -> Result<String> {
        if clause.paths.is_empty() {
            return Err(Error::translation(Self::CLAUSE, "MATCH has no patterns"));
        }
        let paths = clause
            .paths
            .iter()
            .map(render_path)
            .collect::<Result<Vec<_>>>()?;

        let marker = if clause.optional { "optional " } else { "" };
        Ok(format!("graph-match {}{}", marker, paths.join(", ")))
    }
}

fn render_path(path: &PathExpression) -> Result<String> {
    let mut out = String::new();
    for (i, node) in path.nodes().iter().enumerate() {
        out.push_str(&render_node(node)?);
        if let Some(rel) = path.relationships().get(i) {
            out.push_str(&render_relationship(rel));
        }
    }
    Ok(out)
}

/// `(var:A|B {key: value})`
pub fn render_node(node: &NodePattern) -> Result<String> {
    let mut out = String::from("(");
    if let Some(var) = &node.variable {
        out.push_str(var);
    }
    if !node.labels.is_empty() {
        out.push(':');
        out.push_str(&node.labels.join("|"));
    }
    if let Some(map) = node.properties.as_ref().filter(|m| !m.entries.is_empty()) {
        let entries = map
            .entries
            .iter()
            .map(|(key, value)| match value {
                Expression::Literal(literal) => Ok(format!("{}: {}", key, render_literal(literal))),
                other => Err(Error::type_mismatch(
                    format!("literal value for property '{}'", key),
                    other.kind_name(),
                )),
            })
            .collect::<Result<Vec<_>>>()?;
        out.push_str(" {");
        out.push_str(&entries.join(", "));
        out.push('}');
    }
    out.push(')');
    Ok(out)
}

/// `-[var:T|U*1..3]->`, or the bare arrow when nothing is bound
pub fn render_relationship(rel: &RelationshipPattern) -> String {
    let mut body = String::new();
    if let Some(var) = &rel.variable {
        body.push_str(var);
    }
    if !rel.rel_types.is_empty() {
        body.push(':');
        body.push_str(&rel.rel_types.join("|"));
    }
    if let Some(length) = rel.length.filter(|l| !l.is_single_hop()) {
        body.push_str(&length.to_quantifier());
    }

    let (prefix, suffix) = (rel.direction.prefix(), rel.direction.suffix());
    if body.is_empty() {
        format!("{}-{}", prefix, suffix)
    } else {
        format!("{}[{}]{}", prefix, body, suffix)
    }
}
