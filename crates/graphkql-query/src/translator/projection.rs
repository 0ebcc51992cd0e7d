//! RETURN clause to projection, sort, take and skip fragments
//!
//! Fragments come out in a fixed order: projection (`project`, `distinct`
//! or `summarize`), then `sort by`, then `take`, then the skip pipeline.
//! Skipping is done after taking `limit + skip` rows, so the pair keeps its
//! source meaning.

use super::expression::{Context, ExpressionRenderer};
use super::ClauseTranslator;
use crate::ast::{ReturnClause, ReturnItem};
use graphkql_core::{Error, Result};

/// Column name used to number rows when skipping
const ROW_NUMBER_COLUMN: &str = "_rn";

/// Translates the RETURN clause
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectionTranslator;

impl ClauseTranslator for ProjectionTranslator {
    type Clause = ReturnClause;
    const CLAUSE: &'static str = "RETURN";

    fn translate(&self, clause: &ReturnClause) -> Result<String> {
        clause.validate()?;
        if clause.items.is_empty() {
            return Err(Error::translation(Self::CLAUSE, "RETURN has no items"));
        }

        let renderer = ExpressionRenderer::new(Context::Projection);
        let mut fragments = vec![projection(&renderer, clause)?];

        if !clause.order_by.is_empty() {
            let keys = clause
                .order_by
                .iter()
                .map(|item| {
                    let direction = if item.ascending { "asc" } else { "desc" };
                    Ok(format!("{} {}", renderer.render(&item.expression)?, direction))
                })
                .collect::<Result<Vec<_>>>()?;
            fragments.push(format!("sort by {}", keys.join(", ")));
        }

        if let Some(limit) = clause.limit {
            let rows = limit
                .checked_add(clause.skip.unwrap_or(0))
                .ok_or_else(|| Error::translation(Self::CLAUSE, "LIMIT plus SKIP overflows"))?;
            fragments.push(format!("take {}", rows));
        }

        if let Some(skip) = clause.skip.filter(|s| *s > 0) {
            fragments.push(format!(
                "serialize {col} = row_number() | where {col} > {skip} | project-away {col}",
                col = ROW_NUMBER_COLUMN,
                skip = skip
            ));
        }

        Ok(fragments.join(" | "))
    }
}

fn projection(renderer: &ExpressionRenderer, clause: &ReturnClause) -> Result<String> {
    let render_item = |item: &ReturnItem| -> Result<String> {
        let expression = renderer.render(&item.expression)?;
        Ok(match &item.alias {
            Some(alias) => format!("{} = {}", alias, expression),
            None => expression,
        })
    };

    if clause.has_aggregation() {
        let (aggregates, keys): (Vec<&ReturnItem>, Vec<&ReturnItem>) = clause
            .items
            .iter()
            .partition(|item| item.expression.contains_aggregate());
        let aggregates = aggregates
            .into_iter()
            .map(render_item)
            .collect::<Result<Vec<_>>>()?;
        let keys = keys.into_iter().map(render_item).collect::<Result<Vec<_>>>()?;

        return Ok(if keys.is_empty() {
            format!("summarize {}", aggregates.join(", "))
        } else {
            format!("summarize {} by {}", aggregates.join(", "), keys.join(", "))
        });
    }

    let items = clause
        .items
        .iter()
        .map(render_item)
        .collect::<Result<Vec<_>>>()?;
    let operator = if clause.distinct { "distinct" } else { "project" };
    Ok(format!("{} {}", operator, items.join(", ")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse;

    fn projection_text(query: &str) -> Result<String> {
        ProjectionTranslator.translate(parse(query).unwrap().return_clause.as_ref().unwrap())
    }

    #[test]
    fn test_simple_projection() {
        assert_eq!(projection_text("MATCH (n) RETURN n.name").unwrap(), "project n.name");
        assert_eq!(
            projection_text("MATCH (n)-->(m) RETURN n, m LIMIT 5").unwrap(),
            "project n, m | take 5"
        );
    }

    #[test]
    fn test_distinct_alias_and_sort() {
        assert_eq!(
            projection_text("MATCH (n) RETURN DISTINCT n.name AS name ORDER BY name DESC, n.age")
                .unwrap(),
            "distinct name = n.name | sort by name desc, n.age asc"
        );
    }

    #[test]
    fn test_aggregation() {
        assert_eq!(
            projection_text("MATCH (n) RETURN n.dept AS dept, count(*) AS total, avg(n.age)")
                .unwrap(),
            "summarize total = count(), avg(n.age) by dept = n.dept"
        );
        assert_eq!(
            projection_text("MATCH (n) RETURN collect(n.name)").unwrap(),
            "summarize make_list(n.name)"
        );
    }

    #[test]
    fn test_limit_and_skip() {
        assert_eq!(
            projection_text("MATCH (n) RETURN n SKIP 10 LIMIT 5").unwrap(),
            concat!(
                "project n | take 15 | ",
                "serialize _rn = row_number() | where _rn > 10 | project-away _rn"
            )
        );
        assert_eq!(
            projection_text("MATCH (n) RETURN n SKIP 3").unwrap(),
            "project n | serialize _rn = row_number() | where _rn > 3 | project-away _rn"
        );
        assert_eq!(
            projection_text("MATCH (n) RETURN n SKIP 0 LIMIT 2").unwrap(),
            "project n | take 2"
        );
    }

    #[test]
    fn test_negative_bounds_fail() {
        let item = ReturnItem::new(crate::ast::Expression::identifier("n"));
        let mut clause = ReturnClause::new(vec![item]);
        clause.limit = Some(-1);
        assert!(ProjectionTranslator.translate(&clause).is_err());

        clause.limit = None;
        clause.skip = Some(-3);
        assert!(ProjectionTranslator.translate(&clause).is_err());
    }

    #[test]
    fn test_unknown_function_fails() {
        assert!(projection_text("MATCH (n) RETURN mystery(n)").unwrap_err().is_translation());
    }
}
