//! Expression rendering shared by the predicate and projection translators

use crate::ast::{ComparisonOp, Expression, Literal, LogicalOp, Operands};
use crate::printer::format_float;
use graphkql_core::{Error, Result};

/// Where an expression appears, which decides the function table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// WHERE predicate: scalar functions only
    Predicate,
    /// RETURN item or ORDER BY key: scalar functions and aggregates
    Projection,
}

impl Context {
    /// Clause name used in errors
    pub fn clause(self) -> &'static str {
        match self {
            Context::Predicate => "WHERE",
            Context::Projection => "RETURN",
        }
    }
}

/// Scalar function names, source to target
const SCALAR_FUNCTIONS: &[(&str, &str)] = &[
    ("size", "array_length"),
    ("length", "array_length"),
    ("upper", "upper"),
    ("lower", "lower"),
    ("trim", "trim"),
    ("tostring", "tostring"),
    ("tointeger", "toint"),
    ("tofloat", "todouble"),
    ("toboolean", "tobool"),
    ("ago", "ago"),
];

/// Aggregate function names, source to target
const AGGREGATE_FUNCTIONS: &[(&str, &str)] = &[
    ("count", "count"),
    ("sum", "sum"),
    ("avg", "avg"),
    ("min", "min"),
    ("max", "max"),
    ("collect", "make_list"),
];

/// Map a source function name to its target name
///
/// Lookup is case-insensitive. `count` is a scalar `array_length` in
/// predicates and an aggregate in projections.
pub fn map_function(name: &str, context: Context) -> Result<&'static str> {
    let lower = name.to_lowercase();
    if context == Context::Projection {
        if let Some((_, target)) = AGGREGATE_FUNCTIONS.iter().find(|(s, _)| *s == lower) {
            return Ok(target);
        }
    }
    if lower == "count" {
        return Ok("array_length");
    }
    if let Some((_, target)) = SCALAR_FUNCTIONS.iter().find(|(s, _)| *s == lower) {
        return Ok(target);
    }
    if AGGREGATE_FUNCTIONS.iter().any(|(s, _)| *s == lower) {
        return Err(Error::translation(
            context.clause(),
            format!("aggregate function '{}' is not allowed here", name),
        ));
    }
    Err(Error::translation(
        context.clause(),
        format!("unknown function '{}'", name),
    ))
}

/// Render a literal value
pub fn render_literal(literal: &Literal) -> String {
    match literal {
        Literal::Null => "null".to_string(),
        Literal::Boolean(b) => b.to_string(),
        Literal::Integer(n) => n.to_string(),
        Literal::Float(f) => format_float(*f),
        Literal::String(s) => quote_string(s),
        Literal::Timespan(span) => span.to_string(),
    }
}

/// Double-quoted KQL string literal; control characters are escaped so the
/// literal stays on one line
fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Renders expressions into target syntax
#[derive(Debug, Clone, Copy)]
pub struct ExpressionRenderer {
    context: Context,
}

impl ExpressionRenderer {
    pub fn new(context: Context) -> Self {
        Self { context }
    }

    pub fn render(&self, expression: &Expression) -> Result<String> {
        match expression {
            Expression::Literal(literal) => Ok(render_literal(literal)),
            Expression::Identifier(name) => Ok(name.clone()),
            Expression::Property(p) => Ok(format!("{}.{}", p.variable, p.key)),
            Expression::Comparison { left, op, right } => {
                let left = self.render_operand(left)?;
                let right = match (op, right.as_ref()) {
                    (ComparisonOp::In, Expression::List(items)) => self.render_list(items)?,
                    (ComparisonOp::In, other) => {
                        return Err(Error::type_mismatch("list after IN", other.kind_name()));
                    }
                    (_, other) => self.render_operand(other)?,
                };
                Ok(format!("{} {} {}", left, op.kql_symbol(), right))
            }
            Expression::Logical { op, operands } => self.render_logical(*op, operands),
            Expression::IsNull { operand, negated } => {
                let function = if *negated { "isnotnull" } else { "isnull" };
                Ok(format!("{}({})", function, self.render(operand)?))
            }
            Expression::FunctionCall {
                name,
                args,
                distinct,
            } => self.render_call(name, args, *distinct),
            Expression::List(items) => self.render_list(items),
            Expression::Star => Err(Error::translation(
                self.context.clause(),
                "'*' is only allowed inside count(*)",
            )),
        }
    }

    fn render_logical(&self, op: LogicalOp, operands: &Operands) -> Result<String> {
        let parts = operands.to_vec();
        match op {
            LogicalOp::Not => {
                let [operand] = parts.as_slice() else {
                    return Err(Error::translation(
                        self.context.clause(),
                        format!("NOT takes exactly one operand, got {}", parts.len()),
                    ));
                };
                Ok(format!("not({})", self.render(operand)?))
            }
            LogicalOp::And | LogicalOp::Or => {
                if parts.is_empty() {
                    return Err(Error::translation(
                        self.context.clause(),
                        "logical expression without operands",
                    ));
                }
                let keyword = if op == LogicalOp::And { " and " } else { " or " };
                let rendered = parts
                    .into_iter()
                    .map(|part| match part {
                        Expression::Logical { op: inner, .. }
                            if *inner != op && *inner != LogicalOp::Not =>
                        {
                            Ok(format!("({})", self.render(part)?))
                        }
                        _ => self.render(part),
                    })
                    .collect::<Result<Vec<_>>>()?;
                Ok(rendered.join(keyword))
            }
        }
    }

    fn render_call(&self, name: &str, args: &[Expression], distinct: bool) -> Result<String> {
        let target = map_function(name, self.context)?;

        if target == "count" {
            return match args {
                [] | [Expression::Star] => Ok("count()".to_string()),
                [arg] if distinct => Ok(format!("dcount({})", self.render(arg)?)),
                [arg] => Ok(format!("countif(isnotnull({}))", self.render(arg)?)),
                _ => Err(Error::translation(
                    self.context.clause(),
                    "count takes at most one argument",
                )),
            };
        }
        if distinct && target == "make_list" {
            let [arg] = args else {
                return Err(Error::translation(
                    self.context.clause(),
                    "collect takes exactly one argument",
                ));
            };
            return Ok(format!("make_set({})", self.render(arg)?));
        }

        let args = args
            .iter()
            .map(|a| self.render(a))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("{}({})", target, args.join(", ")))
    }

    fn render_list(&self, items: &[Expression]) -> Result<String> {
        let items = items
            .iter()
            .map(|i| self.render(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(format!("({})", items.join(", ")))
    }

    /// Comparison operands that are themselves boolean expressions need parentheses
    fn render_operand(&self, expression: &Expression) -> Result<String> {
        let text = self.render(expression)?;
        Ok(match expression {
            Expression::Logical { .. } | Expression::Comparison { .. } => format!("({})", text),
            _ => text,
        })
    }
}
