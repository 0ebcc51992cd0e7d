//! Immutable AST visitor infrastructure.
//!
//! Every `visit_*` method defaults to walking the node's children, so a
//! visitor only overrides the node families it cares about. Traversal stops
//! as soon as a method returns `ControlFlow::Break`.

use std::ops::ControlFlow;

use crate::ast::{
    Expression, Literal, MatchClause, NodePattern, OrderItem, PathExpression, Property, Query,
    RelationshipPattern, ReturnClause, ReturnItem, WhereClause,
};

macro_rules! try_visit {
    ($expr:expr) => {
        match $expr {
            ControlFlow::Continue(()) => {}
            ControlFlow::Break(b) => return ControlFlow::Break(b),
        }
    };
}

/// Shared type alias for visitor traversal methods.
pub type VisitResult<B> = ControlFlow<B>;

/// Immutable AST visitor.
pub trait Visitor {
    /// Early-exit payload produced when traversal stops.
    type Break;

    fn visit_query(&mut self, query: &Query) -> VisitResult<Self::Break> {
        walk_query(self, query)
    }

    fn visit_match_clause(&mut self, clause: &MatchClause) -> VisitResult<Self::Break> {
        walk_match_clause(self, clause)
    }

    fn visit_path(&mut self, path: &PathExpression) -> VisitResult<Self::Break> {
        walk_path(self, path)
    }

    fn visit_node_pattern(&mut self, node: &NodePattern) -> VisitResult<Self::Break> {
        walk_node_pattern(self, node)
    }

    fn visit_relationship_pattern(
        &mut self,
        _relationship: &RelationshipPattern,
    ) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_where_clause(&mut self, clause: &WhereClause) -> VisitResult<Self::Break> {
        walk_where_clause(self, clause)
    }

    fn visit_return_clause(&mut self, clause: &ReturnClause) -> VisitResult<Self::Break> {
        walk_return_clause(self, clause)
    }

    fn visit_return_item(&mut self, item: &ReturnItem) -> VisitResult<Self::Break> {
        self.visit_expression(&item.expression)
    }

    fn visit_order_item(&mut self, item: &OrderItem) -> VisitResult<Self::Break> {
        self.visit_expression(&item.expression)
    }

    fn visit_expression(&mut self, expression: &Expression) -> VisitResult<Self::Break> {
        walk_expression(self, expression)
    }

    fn visit_property(&mut self, _property: &Property) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }

    fn visit_literal(&mut self, _literal: &Literal) -> VisitResult<Self::Break> {
        ControlFlow::Continue(())
    }
}

pub fn walk_query<V: Visitor + ?Sized>(visitor: &mut V, query: &Query) -> VisitResult<V::Break> {
    if let Some(clause) = &query.match_clause {
        try_visit!(visitor.visit_match_clause(clause));
    }
    if let Some(clause) = &query.where_clause {
        try_visit!(visitor.visit_where_clause(clause));
    }
    if let Some(clause) = &query.return_clause {
        try_visit!(visitor.visit_return_clause(clause));
    }
    ControlFlow::Continue(())
}

pub fn walk_match_clause<V: Visitor + ?Sized>(
    visitor: &mut V,
    clause: &MatchClause,
) -> VisitResult<V::Break> {
    for path in &clause.paths {
        try_visit!(visitor.visit_path(path));
    }
    ControlFlow::Continue(())
}

/// Visits nodes and relationships in path order: node, rel, node, ...
pub fn walk_path<V: Visitor + ?Sized>(
    visitor: &mut V,
    path: &PathExpression,
) -> VisitResult<V::Break> {
    let nodes = path.nodes();
    for (i, node) in nodes.iter().enumerate() {
        try_visit!(visitor.visit_node_pattern(node));
        if let Some(rel) = path.relationships().get(i) {
            try_visit!(visitor.visit_relationship_pattern(rel));
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_node_pattern<V: Visitor + ?Sized>(
    visitor: &mut V,
    node: &NodePattern,
) -> VisitResult<V::Break> {
    if let Some(map) = &node.properties {
        for (_, value) in &map.entries {
            try_visit!(visitor.visit_expression(value));
        }
    }
    ControlFlow::Continue(())
}

pub fn walk_where_clause<V: Visitor + ?Sized>(
    visitor: &mut V,
    clause: &WhereClause,
) -> VisitResult<V::Break> {
    visitor.visit_expression(&clause.predicate)
}

pub fn walk_return_clause<V: Visitor + ?Sized>(
    visitor: &mut V,
    clause: &ReturnClause,
) -> VisitResult<V::Break> {
    for item in &clause.items {
        try_visit!(visitor.visit_return_item(item));
    }
    for item in &clause.order_by {
        try_visit!(visitor.visit_order_item(item));
    }
    ControlFlow::Continue(())
}

pub fn walk_expression<V: Visitor + ?Sized>(
    visitor: &mut V,
    expression: &Expression,
) -> VisitResult<V::Break> {
    match expression {
        Expression::Literal(literal) => visitor.visit_literal(literal),
        Expression::Property(property) => visitor.visit_property(property),
        Expression::Identifier(_) | Expression::Star => ControlFlow::Continue(()),
        Expression::Comparison { left, right, .. } => {
            try_visit!(visitor.visit_expression(left));
            visitor.visit_expression(right)
        }
        Expression::Logical { operands, .. } => {
            for operand in operands.to_vec() {
                try_visit!(visitor.visit_expression(operand));
            }
            ControlFlow::Continue(())
        }
        Expression::IsNull { operand, .. } => visitor.visit_expression(operand),
        Expression::FunctionCall { args, .. } | Expression::List(args) => {
            for arg in args {
                try_visit!(visitor.visit_expression(arg));
            }
            ControlFlow::Continue(())
        }
    }
}

/// Collects every property access in visiting order
#[derive(Debug, Default)]
pub struct PropertyCollector {
    pub properties: Vec<Property>,
}

impl PropertyCollector {
    /// Properties referenced anywhere under `expression`
    pub fn collect(expression: &Expression) -> Vec<Property> {
        let mut collector = Self::default();
        let _ = collector.visit_expression(expression);
        collector.properties
    }
}

impl Visitor for PropertyCollector {
    type Break = std::convert::Infallible;

    fn visit_property(&mut self, property: &Property) -> VisitResult<Self::Break> {
        self.properties.push(property.clone());
        ControlFlow::Continue(())
    }
}
