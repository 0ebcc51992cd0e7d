//! WHERE clause to `where` filter

use super::expression::{Context, ExpressionRenderer};
use super::ClauseTranslator;
use crate::ast::WhereClause;
use graphkql_core::Result;

/// Translates the WHERE clause into a `where` fragment
#[derive(Debug, Clone, Copy, Default)]
pub struct PredicateTranslator;

impl ClauseTranslator for PredicateTranslator {
    type Clause = WhereClause;
    const CLAUSE: &'static str = "WHERE";

    fn translate(&self, clause: &WhereClause) -> Result<String> {
        let predicate = ExpressionRenderer::new(Context::Predicate).render(&clause.predicate)?;
        Ok(format!("where {}", predicate))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{ComparisonOp, Expression};

    #[test]
    fn test_equality_uses_double_equals() {
        let clause = WhereClause::new(Expression::compare(
            Expression::property("n", "age"),
            ComparisonOp::Equals,
            Expression::integer(30),
        ));
        let text = PredicateTranslator.translate(&clause).unwrap();
        assert_eq!(text, "where n.age == 30");
    }

    #[test]
    fn test_failure_is_translation_error() {
        let clause = WhereClause::new(Expression::function("nope", vec![]));
        assert!(PredicateTranslator.translate(&clause).unwrap_err().is_translation());
    }
}
