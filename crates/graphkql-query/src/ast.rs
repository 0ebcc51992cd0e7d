//! Abstract Syntax Tree for the supported Cypher subset
//!
//! Every node is a plain value: cloning is cheap enough for the query sizes
//! involved, equality is structural, and rewrites build new trees instead of
//! mutating existing ones.

use crate::path_length::PathLength;
use graphkql_core::{Direction, Error, Result, Timespan};
use serde::{Deserialize, Serialize};

/// Function names treated as aggregates in RETURN
pub const AGGREGATE_FUNCTIONS: &[&str] = &["count", "sum", "avg", "min", "max", "collect"];

/// A parsed query: MATCH, optional WHERE, RETURN
///
/// MATCH and RETURN are optional only so that hand-built trees can be
/// represented; the parser always fills both, and translation rejects a
/// query missing either.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Query {
    pub match_clause: Option<MatchClause>,
    pub where_clause: Option<WhereClause>,
    pub return_clause: Option<ReturnClause>,
}

impl Query {
    /// Create a complete query
    pub fn new(
        match_clause: MatchClause,
        where_clause: Option<WhereClause>,
        return_clause: ReturnClause,
    ) -> Self {
        Self {
            match_clause: Some(match_clause),
            where_clause,
            return_clause: Some(return_clause),
        }
    }

    /// The MATCH clause, or a structural error if absent
    pub fn require_match(&self) -> Result<&MatchClause> {
        self.match_clause
            .as_ref()
            .ok_or_else(|| Error::Structural("query has no MATCH clause".to_string()))
    }

    /// The RETURN clause, or a structural error if absent
    pub fn require_return(&self) -> Result<&ReturnClause> {
        self.return_clause
            .as_ref()
            .ok_or_else(|| Error::Structural("query has no RETURN clause".to_string()))
    }

    /// All paths of the MATCH clause, empty if there is none
    pub fn paths(&self) -> &[PathExpression] {
        self.match_clause
            .as_ref()
            .map(|m| m.paths.as_slice())
            .unwrap_or_default()
    }

    /// Total relationship hops across all paths
    pub fn hop_count(&self) -> usize {
        self.paths().iter().map(PathExpression::hop_count).sum()
    }

    /// Copy of this query with a different WHERE clause
    pub fn with_where(&self, where_clause: Option<WhereClause>) -> Self {
        Self {
            where_clause,
            ..self.clone()
        }
    }

    /// Copy of this query with a different MATCH clause
    pub fn with_match(&self, match_clause: MatchClause) -> Self {
        Self {
            match_clause: Some(match_clause),
            ..self.clone()
        }
    }

    /// Find the node pattern bound to `variable`
    pub fn node_by_variable(&self, variable: &str) -> Option<&NodePattern> {
        self.paths()
            .iter()
            .flat_map(|p| p.nodes())
            .find(|n| n.variable.as_deref() == Some(variable))
    }

    /// Returns true if `variable` names a relationship in the pattern
    pub fn is_relationship_variable(&self, variable: &str) -> bool {
        self.paths()
            .iter()
            .flat_map(|p| p.relationships())
            .any(|r| r.variable.as_deref() == Some(variable))
    }
}

/// MATCH clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchClause {
    pub optional: bool,
    pub paths: Vec<PathExpression>,
}

impl MatchClause {
    /// Create a non-optional MATCH over the given paths
    pub fn new(paths: Vec<PathExpression>) -> Self {
        Self {
            optional: false,
            paths,
        }
    }
}

/// A node-relationship chain
///
/// Holds `n` nodes and exactly `n - 1` relationships; relationship `i`
/// connects node `i` to node `i + 1`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawPathExpression")]
pub struct PathExpression {
    nodes: Vec<NodePattern>,
    relationships: Vec<RelationshipPattern>,
}

#[derive(Deserialize)]
struct RawPathExpression {
    nodes: Vec<NodePattern>,
    relationships: Vec<RelationshipPattern>,
}

impl TryFrom<RawPathExpression> for PathExpression {
    type Error = Error;

    fn try_from(raw: RawPathExpression) -> Result<Self> {
        PathExpression::new(raw.nodes, raw.relationships)
    }
}

impl PathExpression {
    /// Create a path, checking the node/relationship count invariant
    pub fn new(nodes: Vec<NodePattern>, relationships: Vec<RelationshipPattern>) -> Result<Self> {
        if nodes.is_empty() {
            return Err(Error::Structural(
                "path must contain at least one node".to_string(),
            ));
        }
        if relationships.len() != nodes.len() - 1 {
            return Err(Error::Structural(format!(
                "path with {} nodes must have {} relationships, found {}",
                nodes.len(),
                nodes.len() - 1,
                relationships.len()
            )));
        }
        Ok(Self {
            nodes,
            relationships,
        })
    }

    /// A path consisting of a single node
    pub fn single(node: NodePattern) -> Self {
        Self {
            nodes: vec![node],
            relationships: Vec::new(),
        }
    }

    pub fn nodes(&self) -> &[NodePattern] {
        &self.nodes
    }

    pub fn relationships(&self) -> &[RelationshipPattern] {
        &self.relationships
    }

    /// Number of relationship hops
    pub fn hop_count(&self) -> usize {
        self.relationships.len()
    }

    /// Returns true if any relationship has a variable length
    pub fn has_variable_length(&self) -> bool {
        self.relationships.iter().any(RelationshipPattern::is_variable_length)
    }

    /// The same path traversed from its last node to its first
    ///
    /// Relationship directions are flipped so the matched subgraph is
    /// unchanged.
    pub fn reversed(&self) -> Self {
        let nodes = self.nodes.iter().rev().cloned().collect();
        let relationships = self
            .relationships
            .iter()
            .rev()
            .map(|r| RelationshipPattern {
                direction: r.direction.reverse(),
                ..r.clone()
            })
            .collect();
        Self {
            nodes,
            relationships,
        }
    }

    /// Copy of this path with one node replaced
    pub fn with_node(&self, index: usize, node: NodePattern) -> Result<Self> {
        if index >= self.nodes.len() {
            return Err(Error::Structural(format!(
                "node index {} out of range for path of {} nodes",
                index,
                self.nodes.len()
            )));
        }
        let mut nodes = self.nodes.clone();
        nodes[index] = node;
        Ok(Self {
            nodes,
            relationships: self.relationships.clone(),
        })
    }
}

/// Node pattern
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NodePattern {
    pub variable: Option<String>,
    pub labels: Vec<String>,
    pub properties: Option<MapExpression>,
}

impl NodePattern {
    /// A node bound to `variable` with no labels
    pub fn named(variable: &str) -> Self {
        Self {
            variable: Some(variable.to_string()),
            ..Default::default()
        }
    }

    /// Builder: add a label
    pub fn label(mut self, label: &str) -> Self {
        self.labels.push(label.to_string());
        self
    }

    /// Builder: add a property constraint
    pub fn property(mut self, key: &str, value: Expression) -> Self {
        self.properties
            .get_or_insert_with(MapExpression::default)
            .entries
            .push((key.to_string(), value));
        self
    }

    /// Returns true if the node carries property constraints
    pub fn has_properties(&self) -> bool {
        self.properties.as_ref().is_some_and(|p| !p.entries.is_empty())
    }
}

/// Relationship pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationshipPattern {
    pub variable: Option<String>,
    pub rel_types: Vec<String>,
    pub direction: Direction,
    pub length: Option<PathLength>,
}

impl RelationshipPattern {
    /// An anonymous, untyped relationship
    pub fn new(direction: Direction) -> Self {
        Self {
            variable: None,
            rel_types: Vec::new(),
            direction,
            length: None,
        }
    }

    /// Builder: bind a variable
    pub fn named(mut self, variable: &str) -> Self {
        self.variable = Some(variable.to_string());
        self
    }

    /// Builder: add a relationship type
    pub fn rel_type(mut self, rel_type: &str) -> Self {
        self.rel_types.push(rel_type.to_string());
        self
    }

    /// Builder: set the path length
    pub fn length(mut self, length: PathLength) -> Self {
        self.length = Some(length);
        self
    }

    /// Returns true if the hop count is a range
    pub fn is_variable_length(&self) -> bool {
        self.length.as_ref().is_some_and(PathLength::is_variable_length)
    }
}

/// Map expression {a: 1, b: 2}, used for node property constraints
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MapExpression {
    pub entries: Vec<(String, Expression)>,
}

/// WHERE clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WhereClause {
    pub predicate: Expression,
}

impl WhereClause {
    pub fn new(predicate: Expression) -> Self {
        Self { predicate }
    }
}

/// RETURN clause
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ReturnClause {
    pub distinct: bool,
    pub items: Vec<ReturnItem>,
    pub order_by: Vec<OrderItem>,
    pub limit: Option<i64>,
    pub skip: Option<i64>,
}

impl ReturnClause {
    /// A RETURN of the given items with no modifiers
    pub fn new(items: Vec<ReturnItem>) -> Self {
        Self {
            items,
            ..Default::default()
        }
    }

    /// Returns true if any item calls an aggregate function
    pub fn has_aggregation(&self) -> bool {
        self.items.iter().any(|i| i.expression.contains_aggregate())
    }

    /// Check that limit and skip are non-negative
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [("LIMIT", self.limit), ("SKIP", self.skip)] {
            if let Some(v) = value {
                if v < 0 {
                    return Err(Error::Structural(format!(
                        "{} must be non-negative, found {}",
                        name, v
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Item in RETURN clause
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReturnItem {
    pub expression: Expression,
    pub alias: Option<String>,
}

impl ReturnItem {
    pub fn new(expression: Expression) -> Self {
        Self {
            expression,
            alias: None,
        }
    }

    pub fn aliased(expression: Expression, alias: &str) -> Self {
        Self {
            expression,
            alias: Some(alias.to_string()),
        }
    }
}

/// Item in ORDER BY
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderItem {
    pub expression: Expression,
    pub ascending: bool,
}

/// Property access (variable.key)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Property {
    pub variable: String,
    pub key: String,
}

/// Expression tree used by WHERE predicates and RETURN items
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    /// Literal value
    Literal(Literal),
    /// Variable reference
    Identifier(String),
    /// Property access
    Property(Property),
    /// Binary comparison
    Comparison {
        left: Box<Expression>,
        op: ComparisonOp,
        right: Box<Expression>,
    },
    /// AND / OR / NOT
    Logical { op: LogicalOp, operands: Operands },
    /// IS NULL / IS NOT NULL
    IsNull {
        operand: Box<Expression>,
        negated: bool,
    },
    /// Function call
    FunctionCall {
        name: String,
        args: Vec<Expression>,
        distinct: bool,
    },
    /// List expression [a, b, c]
    List(Vec<Expression>),
    /// Star (*) inside count(*)
    Star,
}

/// Operands of a logical expression
///
/// Both the strictly binary shape and the flattened n-ary shape are valid;
/// the parser produces the n-ary shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Operands {
    Binary {
        left: Box<Expression>,
        right: Box<Expression>,
    },
    List(Vec<Expression>),
}

impl Operands {
    /// Operands in source order
    pub fn to_vec(&self) -> Vec<&Expression> {
        match self {
            Operands::Binary { left, right } => vec![left.as_ref(), right.as_ref()],
            Operands::List(items) => items.iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Operands::Binary { .. } => 2,
            Operands::List(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Literal value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    String(String),
    /// Lookback window, only produced by rewrites
    Timespan(Timespan),
}

impl Literal {
    /// Kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Literal::Null => "null",
            Literal::Boolean(_) => "boolean",
            Literal::Integer(_) => "integer",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
            Literal::Timespan(_) => "timespan",
        }
    }
}

/// Comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ComparisonOp {
    Equals,
    NotEquals,
    LessThan,
    LessEquals,
    GreaterThan,
    GreaterEquals,
    Contains,
    StartsWith,
    EndsWith,
    In,
    RegexMatch,
}

impl ComparisonOp {
    /// Returns true for `<`, `<=`, `>`, `>=`
    pub fn is_range(self) -> bool {
        matches!(
            self,
            ComparisonOp::LessThan
                | ComparisonOp::LessEquals
                | ComparisonOp::GreaterThan
                | ComparisonOp::GreaterEquals
        )
    }

    /// Source-language spelling
    pub fn cypher_symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "=",
            ComparisonOp::NotEquals => "<>",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessEquals => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterEquals => ">=",
            ComparisonOp::Contains => "CONTAINS",
            ComparisonOp::StartsWith => "STARTS WITH",
            ComparisonOp::EndsWith => "ENDS WITH",
            ComparisonOp::In => "IN",
            ComparisonOp::RegexMatch => "=~",
        }
    }

    /// Target-language spelling
    pub fn kql_symbol(self) -> &'static str {
        match self {
            ComparisonOp::Equals => "==",
            ComparisonOp::NotEquals => "!=",
            ComparisonOp::LessThan => "<",
            ComparisonOp::LessEquals => "<=",
            ComparisonOp::GreaterThan => ">",
            ComparisonOp::GreaterEquals => ">=",
            ComparisonOp::Contains => "contains",
            ComparisonOp::StartsWith => "startswith",
            ComparisonOp::EndsWith => "endswith",
            ComparisonOp::In => "in",
            ComparisonOp::RegexMatch => "matches regex",
        }
    }
}

/// Logical operator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogicalOp {
    And,
    Or,
    Not,
}

impl Expression {
    pub fn identifier(name: &str) -> Self {
        Expression::Identifier(name.to_string())
    }

    pub fn property(variable: &str, key: &str) -> Self {
        Expression::Property(Property {
            variable: variable.to_string(),
            key: key.to_string(),
        })
    }

    pub fn integer(value: i64) -> Self {
        Expression::Literal(Literal::Integer(value))
    }

    pub fn string(value: &str) -> Self {
        Expression::Literal(Literal::String(value.to_string()))
    }

    pub fn compare(left: Expression, op: ComparisonOp, right: Expression) -> Self {
        Expression::Comparison {
            left: Box::new(left),
            op,
            right: Box::new(right),
        }
    }

    pub fn function(name: &str, args: Vec<Expression>) -> Self {
        Expression::FunctionCall {
            name: name.to_string(),
            args,
            distinct: false,
        }
    }

    pub fn not(operand: Expression) -> Self {
        Expression::Logical {
            op: LogicalOp::Not,
            operands: Operands::List(vec![operand]),
        }
    }

    /// Conjunction of `operands`; a single operand is returned unchanged
    pub fn and_all(mut operands: Vec<Expression>) -> Option<Self> {
        match operands.len() {
            0 => None,
            1 => operands.pop(),
            _ => Some(Expression::Logical {
                op: LogicalOp::And,
                operands: Operands::List(operands),
            }),
        }
    }

    /// Top-level AND operands, flattening nested conjunctions
    pub fn conjuncts(&self) -> Vec<&Expression> {
        match self {
            Expression::Logical {
                op: LogicalOp::And,
                operands,
            } => operands
                .to_vec()
                .into_iter()
                .flat_map(Expression::conjuncts)
                .collect(),
            other => vec![other],
        }
    }

    /// Returns true if this expression or a sub-expression is an aggregate call
    pub fn contains_aggregate(&self) -> bool {
        match self {
            Expression::FunctionCall { name, args, .. } => {
                AGGREGATE_FUNCTIONS.contains(&name.to_lowercase().as_str())
                    || args.iter().any(Expression::contains_aggregate)
            }
            Expression::Comparison { left, right, .. } => {
                left.contains_aggregate() || right.contains_aggregate()
            }
            Expression::Logical { operands, .. } => {
                operands.to_vec().into_iter().any(Expression::contains_aggregate)
            }
            Expression::IsNull { operand, .. } => operand.contains_aggregate(),
            Expression::List(items) => items.iter().any(Expression::contains_aggregate),
            Expression::Literal(_)
            | Expression::Identifier(_)
            | Expression::Property(_)
            | Expression::Star => false,
        }
    }

    /// Kind name for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            Expression::Literal(_) => "literal",
            Expression::Identifier(_) => "identifier",
            Expression::Property(_) => "property access",
            Expression::Comparison { .. } => "comparison",
            Expression::Logical { .. } => "logical expression",
            Expression::IsNull { .. } => "null test",
            Expression::FunctionCall { .. } => "function call",
            Expression::List(_) => "list",
            Expression::Star => "star",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(var: &str) -> NodePattern {
        NodePattern::named(var).label("Person")
    }

    #[test]
    fn test_path_invariant() {
        let ok = PathExpression::new(
            vec![person("a"), person("b")],
            vec![RelationshipPattern::new(Direction::Outgoing)],
        );
        assert!(ok.is_ok());

        let err = PathExpression::new(vec![person("a"), person("b")], vec![]).unwrap_err();
        assert!(err.is_structural());

        assert!(PathExpression::new(vec![], vec![]).is_err());
    }

    #[test]
    fn test_path_deserialize_checks_invariant() {
        let path = PathExpression::new(
            vec![person("a"), person("b")],
            vec![RelationshipPattern::new(Direction::Outgoing)],
        )
        .unwrap();
        let json = serde_json::to_string(&path).unwrap();
        let back: PathExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, path);

        let broken = concat!(
            r#"{"nodes":[{"variable":"a","labels":[],"properties":null}],"#,
            r#""relationships":[{"variable":null,"rel_types":[],"#,
            r#""direction":"Outgoing","length":null}]}"#
        );
        assert!(serde_json::from_str::<PathExpression>(broken).is_err());
    }

    #[test]
    fn test_reversed_flips_directions() {
        let path = PathExpression::new(
            vec![person("a"), person("b"), NodePattern::named("c")],
            vec![
                RelationshipPattern::new(Direction::Outgoing).rel_type("KNOWS"),
                RelationshipPattern::new(Direction::Incoming).rel_type("OWNS"),
            ],
        )
        .unwrap();

        let rev = path.reversed();
        assert_eq!(rev.nodes()[0].variable.as_deref(), Some("c"));
        assert_eq!(rev.relationships()[0].rel_types, vec!["OWNS"]);
        assert_eq!(rev.relationships()[0].direction, Direction::Outgoing);
        assert_eq!(rev.relationships()[1].direction, Direction::Incoming);
        assert_eq!(rev.reversed(), path);
    }

    #[test]
    fn test_conjuncts_flatten_both_shapes() {
        let eq = |key: &str, value: i64| {
            Expression::compare(
                Expression::property("n", key),
                ComparisonOp::Equals,
                Expression::integer(value),
            )
        };
        let (a, b, c) = (eq("a", 1), eq("b", 2), eq("c", 3));

        let nested = Expression::Logical {
            op: LogicalOp::And,
            operands: Operands::Binary {
                left: Box::new(a.clone()),
                right: Box::new(Expression::and_all(vec![b.clone(), c.clone()]).unwrap()),
            },
        };
        assert_eq!(nested.conjuncts(), vec![&a, &b, &c]);
        assert_eq!(a.conjuncts(), vec![&a]);
    }

    #[test]
    fn test_and_all() {
        assert!(Expression::and_all(vec![]).is_none());
        let single = Expression::and_all(vec![Expression::integer(1)]).unwrap();
        assert_eq!(single, Expression::integer(1));
    }

    #[test]
    fn test_return_validation() {
        let mut ret = ReturnClause::new(vec![ReturnItem::new(Expression::identifier("n"))]);
        assert!(ret.validate().is_ok());
        ret.limit = Some(-1);
        assert!(ret.validate().unwrap_err().is_structural());
    }

    #[test]
    fn test_aggregate_detection() {
        let ret = ReturnClause::new(vec![
            ReturnItem::new(Expression::identifier("n")),
            ReturnItem::new(Expression::function("COUNT", vec![Expression::Star])),
        ]);
        assert!(ret.has_aggregation());
        let upper = Expression::function("upper", vec![Expression::identifier("n")]);
        assert!(!upper.contains_aggregate());
    }

    #[test]
    fn test_query_lookups() {
        let path = PathExpression::new(
            vec![person("a"), person("b")],
            vec![RelationshipPattern::new(Direction::Outgoing).named("r")],
        )
        .unwrap();
        let query = Query::new(
            MatchClause::new(vec![path]),
            None,
            ReturnClause::new(vec![ReturnItem::new(Expression::identifier("a"))]),
        );

        assert_eq!(query.hop_count(), 1);
        assert!(query.node_by_variable("b").is_some());
        assert!(query.node_by_variable("r").is_none());
        assert!(query.is_relationship_variable("r"));

        let bare = Query {
            match_clause: None,
            where_clause: None,
            return_clause: None,
        };
        assert!(bare.require_match().unwrap_err().is_structural());
        assert!(bare.paths().is_empty());
    }
}
