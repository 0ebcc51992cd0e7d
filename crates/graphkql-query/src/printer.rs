//! Renders an AST back into Cypher text
//!
//! Used for `Display` on queries and for showing rewritten queries in
//! optimizer reports. The output re-parses to the same tree for everything
//! the parser accepts.

use std::convert::Infallible;
use std::fmt;
use std::ops::ControlFlow;

use crate::ast::{
    Expression, Literal, LogicalOp, MatchClause, NodePattern, OrderItem, PathExpression, Query,
    RelationshipPattern, ReturnClause, ReturnItem, WhereClause,
};
use crate::visitor::{VisitResult, Visitor};

/// Visitor that writes Cypher source text
#[derive(Debug, Default)]
pub struct CypherPrinter {
    out: String,
}

impl CypherPrinter {
    /// Render a whole query
    pub fn print(query: &Query) -> String {
        let mut printer = Self::default();
        let _ = printer.visit_query(query);
        printer.out
    }

    /// Render a single expression
    pub fn print_expression(expression: &Expression) -> String {
        let mut printer = Self::default();
        let _ = printer.visit_expression(expression);
        printer.out
    }

    fn space(&mut self) {
        if !self.out.is_empty() {
            self.out.push(' ');
        }
    }

    fn child(&mut self, expression: &Expression, parent: LogicalOp) {
        let needs_parens = matches!(
            expression,
            Expression::Logical { op, .. } if *op != LogicalOp::Not && *op != parent
        );
        if needs_parens {
            self.out.push('(');
        }
        let _ = self.visit_expression(expression);
        if needs_parens {
            self.out.push(')');
        }
    }
}

impl Visitor for CypherPrinter {
    type Break = Infallible;

    fn visit_match_clause(&mut self, clause: &MatchClause) -> VisitResult<Infallible> {
        self.space();
        if clause.optional {
            self.out.push_str("OPTIONAL ");
        }
        self.out.push_str("MATCH ");
        for (i, path) in clause.paths.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let _ = self.visit_path(path);
        }
        ControlFlow::Continue(())
    }

    fn visit_path(&mut self, path: &PathExpression) -> VisitResult<Infallible> {
        crate::visitor::walk_path(self, path)
    }

    fn visit_node_pattern(&mut self, node: &NodePattern) -> VisitResult<Infallible> {
        self.out.push('(');
        if let Some(var) = &node.variable {
            self.out.push_str(var);
        }
        for label in &node.labels {
            self.out.push(':');
            self.out.push_str(label);
        }
        if let Some(map) = &node.properties {
            self.out.push_str(" {");
            for (i, (key, value)) in map.entries.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                self.out.push_str(key);
                self.out.push_str(": ");
                let _ = self.visit_expression(value);
            }
            self.out.push('}');
        }
        self.out.push(')');
        ControlFlow::Continue(())
    }

    fn visit_relationship_pattern(&mut self, rel: &RelationshipPattern) -> VisitResult<Infallible> {
        self.out.push_str(rel.direction.prefix());
        self.out.push('[');
        if let Some(var) = &rel.variable {
            self.out.push_str(var);
        }
        if !rel.rel_types.is_empty() {
            self.out.push(':');
            self.out.push_str(&rel.rel_types.join("|"));
        }
        if let Some(length) = &rel.length {
            self.out.push_str(&length.to_string());
        }
        self.out.push(']');
        self.out.push_str(rel.direction.suffix());
        ControlFlow::Continue(())
    }

    fn visit_where_clause(&mut self, clause: &WhereClause) -> VisitResult<Infallible> {
        self.space();
        self.out.push_str("WHERE ");
        self.visit_expression(&clause.predicate)
    }

    fn visit_return_clause(&mut self, clause: &ReturnClause) -> VisitResult<Infallible> {
        self.space();
        self.out.push_str("RETURN ");
        if clause.distinct {
            self.out.push_str("DISTINCT ");
        }
        for (i, item) in clause.items.iter().enumerate() {
            if i > 0 {
                self.out.push_str(", ");
            }
            let _ = self.visit_return_item(item);
        }
        if !clause.order_by.is_empty() {
            self.out.push_str(" ORDER BY ");
            for (i, item) in clause.order_by.iter().enumerate() {
                if i > 0 {
                    self.out.push_str(", ");
                }
                let _ = self.visit_order_item(item);
            }
        }
        if let Some(skip) = clause.skip {
            self.out.push_str(&format!(" SKIP {}", skip));
        }
        if let Some(limit) = clause.limit {
            self.out.push_str(&format!(" LIMIT {}", limit));
        }
        ControlFlow::Continue(())
    }

    fn visit_return_item(&mut self, item: &ReturnItem) -> VisitResult<Infallible> {
        let _ = self.visit_expression(&item.expression);
        if let Some(alias) = &item.alias {
            self.out.push_str(" AS ");
            self.out.push_str(alias);
        }
        ControlFlow::Continue(())
    }

    fn visit_order_item(&mut self, item: &OrderItem) -> VisitResult<Infallible> {
        let _ = self.visit_expression(&item.expression);
        if !item.ascending {
            self.out.push_str(" DESC");
        }
        ControlFlow::Continue(())
    }

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Infallible> {
        match expression {
            Expression::Literal(literal) => {
                let _ = self.visit_literal(literal);
            }
            Expression::Identifier(name) => self.out.push_str(name),
            Expression::Property(p) => {
                self.out.push_str(&p.variable);
                self.out.push('.');
                self.out.push_str(&p.key);
            }
            Expression::Comparison { left, op, right } => {
                let _ = self.visit_expression(left);
                self.out.push(' ');
                self.out.push_str(op.cypher_symbol());
                self.out.push(' ');
                let _ = self.visit_expression(right);
            }
            Expression::Logical { op, operands } => {
                let parts = operands.to_vec();
                if *op == LogicalOp::Not {
                    self.out.push_str("NOT ");
                    for part in parts {
                        self.child(part, LogicalOp::Not);
                    }
                } else {
                    let keyword = if *op == LogicalOp::And { " AND " } else { " OR " };
                    for (i, part) in parts.into_iter().enumerate() {
                        if i > 0 {
                            self.out.push_str(keyword);
                        }
                        self.child(part, *op);
                    }
                }
            }
            Expression::IsNull { operand, negated } => {
                let _ = self.visit_expression(operand);
                self.out
                    .push_str(if *negated { " IS NOT NULL" } else { " IS NULL" });
            }
            Expression::FunctionCall {
                name,
                args,
                distinct,
            } => {
                self.out.push_str(name);
                self.out.push('(');
                if *distinct {
                    self.out.push_str("DISTINCT ");
                }
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let _ = self.visit_expression(arg);
                }
                self.out.push(')');
            }
            Expression::List(items) => {
                self.out.push('[');
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.out.push_str(", ");
                    }
                    let _ = self.visit_expression(item);
                }
                self.out.push(']');
            }
            Expression::Star => self.out.push('*'),
        }
        ControlFlow::Continue(())
    }

    fn visit_literal(&mut self, literal: &Literal) -> VisitResult<Infallible> {
        match literal {
            Literal::Null => self.out.push_str("null"),
            Literal::Boolean(b) => self.out.push_str(if *b { "true" } else { "false" }),
            Literal::Integer(n) => self.out.push_str(&n.to_string()),
            Literal::Float(f) => self.out.push_str(&format_float(*f)),
            Literal::String(s) => {
                self.out.push('\'');
                self.out.push_str(&s.replace('\\', "\\\\").replace('\'', "\\'"));
                self.out.push('\'');
            }
            Literal::Timespan(span) => self.out.push_str(&format!("duration('{}')", span)),
        }
        ControlFlow::Continue(())
    }
}

/// Float text that keeps a decimal point, so `1.0` is not read back as an integer
pub(crate) fn format_float(value: f64) -> String {
    let text = value.to_string();
    if text.contains(['.', 'e', 'E']) || !value.is_finite() {
        text
    } else {
        format!("{}.0", text)
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&CypherPrinter::print(self))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    #[test]
    fn test_print_round_trip() {
        for text in [
            "MATCH (n:Person) RETURN n.name",
            concat!(
                "OPTIONAL MATCH (a:User {name: 'o\\'neil'})",
                "-[r:KNOWS|LIKES*1..3]->(b)<-[:OWNS]-(c) RETURN a"
            ),
            concat!(
                "MATCH (a)-[]-(b), (c) WHERE a.x = 1 AND (b.y < 2.0 OR NOT c.z IS NULL) ",
                "RETURN DISTINCT a AS x, count(*) ORDER BY x DESC SKIP 2 LIMIT 10"
            ),
            "MATCH (p) WHERE p.cmd CONTAINS 'ps' AND p.pid IN [1, 2] AND p.h =~ 'a.*' RETURN p",
        ] {
            let query = parse(text).unwrap();
            let printed = query.to_string();
            assert_eq!(parse(&printed).unwrap(), query, "{printed}");
        }
    }

    #[test]
    fn test_print_exact_text() {
        let query = parse("match (n:Person)-->(m) where n.age >= 21 return n, m limit 3").unwrap();
        assert_eq!(
            query.to_string(),
            "MATCH (n:Person)-[]->(m) WHERE n.age >= 21 RETURN n, m LIMIT 3"
        );
    }

    #[test]
    fn test_nested_logic_gets_parentheses() {
        let query = parse("MATCH (n) WHERE (n.a = 1 OR n.b = 2) AND n.c = 3 RETURN n").unwrap();
        let printed = CypherPrinter::print_expression(&query.where_clause.unwrap().predicate);
        assert_eq!(printed, "(n.a = 1 OR n.b = 2) AND n.c = 3");
    }

    #[test]
    fn test_format_float() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(2.5), "2.5");
    }
}
