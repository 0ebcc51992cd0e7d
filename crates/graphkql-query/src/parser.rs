//! Cypher parser
//!
//! Recursive descent over the token stream produced by the lexer. The parser
//! only moves forward and never needs more than two tokens of lookahead.

use crate::ast::*;
use crate::lexer::{tokenize, SpannedToken, Token};
use crate::path_length::PathLength;
use graphkql_core::{Direction, Error, Result};
use tracing::debug;

/// Parse a Cypher query string into an AST
pub fn parse(query: &str) -> Result<Query> {
    let tokens = tokenize(query)?;
    let mut parser = Parser::new(tokens, query.len());
    let parsed = parser.parse_query()?;
    debug!(
        paths = parsed.paths().len(),
        hops = parsed.hop_count(),
        has_where = parsed.where_clause.is_some(),
        "parsed query"
    );
    Ok(parsed)
}

struct Parser {
    tokens: Vec<SpannedToken>,
    pos: usize,
    input_len: usize,
}

impl Parser {
    fn new(tokens: Vec<SpannedToken>, input_len: usize) -> Self {
        Self {
            tokens,
            pos: 0,
            input_len,
        }
    }

    fn parse_query(&mut self) -> Result<Query> {
        let match_clause = self.parse_match()?;

        let where_clause = if self.eat(&Token::Where) {
            Some(WhereClause::new(self.parse_expression()?))
        } else {
            None
        };

        match self.peek() {
            Some(Token::Return) => {}
            Some(Token::Match) | Some(Token::Optional) => {
                return Err(self.error_here(
                    "only one MATCH clause is supported; separate patterns with commas",
                ));
            }
            Some(t) if t.is_unsupported_clause() => {
                return Err(self.error_here("unsupported clause"));
            }
            _ => {
                let expected = if where_clause.is_some() {
                    "expected RETURN"
                } else {
                    "expected WHERE or RETURN"
                };
                return Err(self.error_here(expected));
            }
        }
        self.advance();
        let return_clause = self.parse_return()?;

        if self.peek().is_some() {
            return Err(self.error_here("unexpected token after RETURN clause"));
        }

        Ok(Query::new(match_clause, where_clause, return_clause))
    }

    // ========== MATCH ==========

    fn parse_match(&mut self) -> Result<MatchClause> {
        let optional = self.eat(&Token::Optional);
        match self.peek() {
            Some(Token::Match) => {
                self.advance();
            }
            Some(t) if t.is_unsupported_clause() && !optional => {
                return Err(self.error_here("unsupported clause; query must start with MATCH"));
            }
            _ => return Err(self.error_here("expected MATCH")),
        }

        let mut paths = vec![self.parse_path()?];
        while self.eat(&Token::Comma) {
            paths.push(self.parse_path()?);
        }

        Ok(MatchClause { optional, paths })
    }

    fn parse_path(&mut self) -> Result<PathExpression> {
        if self.peek().and_then(Token::as_identifier).is_some()
            && self.peek_at(1) == Some(&Token::Equals)
        {
            return Err(self.error_here("named paths are not supported"));
        }

        let mut nodes = vec![self.parse_node()?];
        let mut relationships = Vec::new();

        while let Some(rel) = self.parse_relationship()? {
            relationships.push(rel);
            nodes.push(self.parse_node()?);
        }

        PathExpression::new(nodes, relationships)
    }

    fn parse_node(&mut self) -> Result<NodePattern> {
        self.expect(&Token::LParen, "expected '(' to start a node pattern")?;

        let variable = self.parse_optional_variable();

        let mut labels = Vec::new();
        if self.eat(&Token::Colon) {
            labels.push(self.expect_name("expected label name")?);
            while self.eat(&Token::Colon) || self.eat(&Token::Pipe) {
                labels.push(self.expect_name("expected label name")?);
            }
        }

        let properties = if self.check(&Token::LBrace) {
            Some(self.parse_property_map()?)
        } else {
            None
        };

        self.expect(&Token::RParen, "expected ')' to close node pattern")?;

        Ok(NodePattern {
            variable,
            labels,
            properties,
        })
    }

    fn parse_property_map(&mut self) -> Result<MapExpression> {
        self.expect(&Token::LBrace, "expected '{'")?;
        let mut entries = Vec::new();

        if !self.check(&Token::RBrace) {
            loop {
                let key = self.expect_name("expected property name")?;
                self.expect(&Token::Colon, "expected ':' after property name")?;
                let value = self.parse_literal_value()?;
                entries.push((key, value));
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(&Token::RBrace, "expected '}' to close property map")?;
        Ok(MapExpression { entries })
    }

    fn parse_relationship(&mut self) -> Result<Option<RelationshipPattern>> {
        let rel = match self.peek() {
            Some(Token::ArrowRight) => {
                self.advance();
                RelationshipPattern::new(Direction::Outgoing)
            }
            Some(Token::ArrowLeft) => {
                self.advance();
                RelationshipPattern::new(Direction::Incoming)
            }
            Some(Token::DoubleDash) => {
                self.advance();
                RelationshipPattern::new(Direction::Both)
            }
            Some(Token::Minus) => {
                self.advance();
                let rel = self.parse_relationship_detail()?;
                let direction = match self.peek() {
                    Some(Token::DashArrowRight) => Direction::Outgoing,
                    Some(Token::Minus) => Direction::Both,
                    _ => return Err(self.error_here("expected '-' or '->' after relationship")),
                };
                self.advance();
                RelationshipPattern { direction, ..rel }
            }
            Some(Token::ArrowLeftDash) => {
                self.advance();
                let rel = self.parse_relationship_detail()?;
                match self.peek() {
                    Some(Token::Minus) => {}
                    Some(Token::DashArrowRight) => {
                        return Err(self.error_here("relationship cannot point both ways"));
                    }
                    _ => return Err(self.error_here("expected '-' after relationship")),
                }
                self.advance();
                RelationshipPattern {
                    direction: Direction::Incoming,
                    ..rel
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(rel))
    }

    /// The bracketed part of a relationship: `[var:TYPE|OTHER*1..3]`
    fn parse_relationship_detail(&mut self) -> Result<RelationshipPattern> {
        self.expect(&Token::LBracket, "expected '[' to start relationship")?;

        let mut rel = RelationshipPattern::new(Direction::Both);
        rel.variable = self.parse_optional_variable();

        if self.eat(&Token::Colon) {
            rel.rel_types.push(self.expect_name("expected relationship type")?);
            while self.eat(&Token::Pipe) {
                self.eat(&Token::Colon);
                rel.rel_types
                    .push(self.expect_name("expected relationship type")?);
            }
        }

        if self.eat(&Token::Star) {
            rel.length = Some(self.parse_path_length()?);
        }

        if self.check(&Token::LBrace) {
            return Err(self.error_here("relationship property maps are not supported"));
        }

        self.expect(&Token::RBracket, "expected ']' to close relationship")?;
        Ok(rel)
    }

    fn parse_path_length(&mut self) -> Result<PathLength> {
        let mut spec = String::new();

        if let Some(Token::Integer(n)) = self.peek() {
            spec.push_str(&n.to_string());
            self.advance();
        }
        if self.eat(&Token::DoubleDot) {
            spec.push_str("..");
            if let Some(Token::Integer(n)) = self.peek() {
                spec.push_str(&n.to_string());
                self.advance();
            }
        }

        if !self.check(&Token::RBracket) {
            return Err(self.error_here("expected hop range such as 1..3"));
        }

        PathLength::parse(&spec)
    }

    fn parse_optional_variable(&mut self) -> Option<String> {
        let name = self.peek().and_then(Token::as_identifier)?.to_string();
        self.advance();
        Some(name)
    }

    // ========== WHERE expressions ==========

    fn parse_expression(&mut self) -> Result<Expression> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Expression> {
        let mut operands = vec![self.parse_and()?];
        while self.eat(&Token::Or) {
            operands.push(self.parse_and()?);
        }
        Ok(collapse(LogicalOp::Or, operands))
    }

    fn parse_and(&mut self) -> Result<Expression> {
        let mut operands = vec![self.parse_not()?];
        while self.eat(&Token::And) {
            operands.push(self.parse_not()?);
        }
        Ok(collapse(LogicalOp::And, operands))
    }

    fn parse_not(&mut self) -> Result<Expression> {
        if self.eat(&Token::Not) {
            let operand = self.parse_not()?;
            return Ok(Expression::not(operand));
        }
        self.parse_comparison()
    }

    fn parse_comparison(&mut self) -> Result<Expression> {
        let left = self.parse_primary()?;

        let op = match self.peek() {
            Some(Token::Equals) => ComparisonOp::Equals,
            Some(Token::NotEquals) | Some(Token::NotEquals2) => ComparisonOp::NotEquals,
            Some(Token::LessThan) => ComparisonOp::LessThan,
            Some(Token::LessEquals) => ComparisonOp::LessEquals,
            Some(Token::GreaterThan) => ComparisonOp::GreaterThan,
            Some(Token::GreaterEquals) => ComparisonOp::GreaterEquals,
            Some(Token::RegexMatch) => ComparisonOp::RegexMatch,
            Some(Token::Contains) => ComparisonOp::Contains,
            Some(Token::In) => ComparisonOp::In,
            Some(Token::Starts) => {
                self.advance();
                if !self.check(&Token::With) {
                    return Err(self.error_here("expected WITH after STARTS"));
                }
                ComparisonOp::StartsWith
            }
            Some(Token::Ends) => {
                self.advance();
                if !self.check(&Token::With) {
                    return Err(self.error_here("expected WITH after ENDS"));
                }
                ComparisonOp::EndsWith
            }
            // `x<-5` lexes as an arrow; read it as `x < -5`
            Some(Token::ArrowLeftDash) => {
                self.advance();
                let right = self.parse_signed_literal(true)?;
                return Ok(Expression::compare(left, ComparisonOp::LessThan, right));
            }
            Some(Token::Is) => {
                self.advance();
                let negated = self.eat(&Token::Not);
                self.expect(&Token::Null, "expected NULL after IS")?;
                return Ok(Expression::IsNull {
                    operand: Box::new(left),
                    negated,
                });
            }
            _ => return Ok(left),
        };
        self.advance();

        let right = self.parse_primary()?;
        Ok(Expression::compare(left, op, right))
    }

    fn parse_primary(&mut self) -> Result<Expression> {
        let Some(current) = self.tokens.get(self.pos).cloned() else {
            return Err(self.error_here("unexpected end of input in expression"));
        };

        match current.token {
            Token::Integer(_)
            | Token::Float(_)
            | Token::String(_)
            | Token::True
            | Token::False
            | Token::Null
            | Token::Minus => self.parse_literal_value(),
            Token::LParen => {
                self.advance();
                let inner = self.parse_expression()?;
                self.expect(&Token::RParen, "expected ')' to close expression")?;
                Ok(inner)
            }
            Token::LBracket => {
                self.advance();
                let mut items = Vec::new();
                if !self.check(&Token::RBracket) {
                    loop {
                        items.push(self.parse_primary()?);
                        if !self.eat(&Token::Comma) {
                            break;
                        }
                    }
                }
                self.expect(&Token::RBracket, "expected ']' to close list")?;
                Ok(Expression::List(items))
            }
            Token::Parameter(_) => Err(self.error_here("query parameters are not supported")),
            Token::Identifier(name) | Token::EscapedIdentifier(name) => {
                self.advance();
                if self.check(&Token::LParen) {
                    return self.parse_function_call(name);
                }
                if self.eat(&Token::Dot) {
                    let key = self.expect_name("expected property name after '.'")?;
                    return Ok(Expression::Property(Property { variable: name, key }));
                }
                Ok(Expression::Identifier(name))
            }
            _ => Err(self.error_here("unexpected token in expression")),
        }
    }

    fn parse_function_call(&mut self, name: String) -> Result<Expression> {
        self.expect(&Token::LParen, "expected '('")?;
        let distinct = self.eat(&Token::Distinct);

        let mut args = Vec::new();
        if self.eat(&Token::Star) {
            args.push(Expression::Star);
        } else if !self.check(&Token::RParen) {
            loop {
                args.push(self.parse_expression()?);
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        self.expect(&Token::RParen, "expected ')' to close function call")?;

        if name.eq_ignore_ascii_case("duration") {
            let span = match args.as_slice() {
                [Expression::Literal(Literal::String(text))] => text.parse().ok(),
                _ => None,
            };
            return span
                .map(|s| Expression::Literal(Literal::Timespan(s)))
                .ok_or_else(|| self.error_here("duration() takes a single string such as '1d'"));
        }

        Ok(Expression::FunctionCall {
            name,
            args,
            distinct,
        })
    }

    /// A literal, allowing a leading minus on numbers
    fn parse_literal_value(&mut self) -> Result<Expression> {
        let negative = self.eat(&Token::Minus);
        self.parse_signed_literal(negative)
    }

    fn parse_signed_literal(&mut self, negative: bool) -> Result<Expression> {
        let literal = match self.peek() {
            Some(Token::Integer(n)) => Literal::Integer(if negative { -n } else { *n }),
            Some(Token::Float(f)) => Literal::Float(if negative { -f } else { *f }),
            Some(Token::String(s)) if !negative => Literal::String(s.clone()),
            Some(Token::True) if !negative => Literal::Boolean(true),
            Some(Token::False) if !negative => Literal::Boolean(false),
            Some(Token::Null) if !negative => Literal::Null,
            _ => return Err(self.error_here("expected literal value")),
        };
        self.advance();
        Ok(Expression::Literal(literal))
    }

    // ========== RETURN ==========

    fn parse_return(&mut self) -> Result<ReturnClause> {
        let distinct = self.eat(&Token::Distinct);

        let mut items = vec![self.parse_return_item()?];
        while self.eat(&Token::Comma) {
            items.push(self.parse_return_item()?);
        }

        let mut order_by = Vec::new();
        if self.eat(&Token::Order) {
            self.expect(&Token::By, "expected BY after ORDER")?;
            loop {
                let expression = self.parse_expression()?;
                let ascending = if self.eat(&Token::Desc) {
                    false
                } else {
                    self.eat(&Token::Asc);
                    true
                };
                order_by.push(OrderItem {
                    expression,
                    ascending,
                });
                if !self.eat(&Token::Comma) {
                    break;
                }
            }
        }

        let mut limit = None;
        let mut skip = None;
        loop {
            if skip.is_none() && self.eat(&Token::Skip) {
                skip = Some(self.parse_count("SKIP")?);
            } else if limit.is_none() && self.eat(&Token::Limit) {
                limit = Some(self.parse_count("LIMIT")?);
            } else {
                break;
            }
        }

        let clause = ReturnClause {
            distinct,
            items,
            order_by,
            limit,
            skip,
        };
        clause.validate()?;
        Ok(clause)
    }

    fn parse_return_item(&mut self) -> Result<ReturnItem> {
        let expression = self.parse_expression()?;
        let alias = if self.eat(&Token::As) {
            Some(self.expect_name("expected alias after AS")?)
        } else {
            None
        };
        Ok(ReturnItem { expression, alias })
    }

    fn parse_count(&mut self, clause: &str) -> Result<i64> {
        let negative = self.eat(&Token::Minus);
        match self.peek() {
            Some(Token::Integer(n)) => {
                let n = *n;
                self.advance();
                Ok(if negative { -n } else { n })
            }
            _ => Err(self.error_here(&format!("expected integer after {}", clause))),
        }
    }

    // ========== Token helpers ==========

    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.pos).map(|t| &t.token)
    }

    fn peek_at(&self, offset: usize) -> Option<&Token> {
        self.tokens.get(self.pos + offset).map(|t| &t.token)
    }

    fn advance(&mut self) {
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
    }

    fn check(&self, token: &Token) -> bool {
        self.peek() == Some(token)
    }

    fn eat(&mut self, token: &Token) -> bool {
        if self.check(token) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, token: &Token, message: &str) -> Result<()> {
        if self.eat(token) {
            Ok(())
        } else {
            Err(self.error_here(message))
        }
    }

    /// An identifier, or a keyword used as a name (`n.count`, `:Set`)
    fn expect_name(&mut self, message: &str) -> Result<String> {
        let Some(current) = self.tokens.get(self.pos) else {
            return Err(self.error_here(message));
        };
        let name = match &current.token {
            Token::Identifier(name) | Token::EscapedIdentifier(name) => name.clone(),
            _ if current.text.chars().all(|c| c.is_ascii_alphabetic()) => current.text.clone(),
            _ => return Err(self.error_here(message)),
        };
        self.advance();
        Ok(name)
    }

    fn error_here(&self, message: &str) -> Error {
        match self.tokens.get(self.pos) {
            Some(t) => Error::syntax(message, t.text.clone(), t.position),
            None => Error::syntax(message, "<end of input>", self.input_len),
        }
    }
}

fn collapse(op: LogicalOp, mut operands: Vec<Expression>) -> Expression {
    if operands.len() == 1 {
        return operands.remove(0);
    }
    Expression::Logical {
        op,
        operands: Operands::List(operands),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use graphkql_core::Timespan;

    fn syntax_position(err: Error) -> usize {
        match err {
            Error::Syntax { position, .. } => position,
            other => panic!("expected syntax error, got {other:?}"),
        }
    }

    #[test]
    fn test_duration_literal() {
        let query = parse("MATCH (n) WHERE n.Timestamp > ago(duration('12h')) RETURN n").unwrap();
        let Expression::Comparison { right, .. } = &query.where_clause.unwrap().predicate else {
            panic!("expected comparison");
        };
        assert_eq!(
            **right,
            Expression::function(
                "ago",
                vec![Expression::Literal(Literal::Timespan(Timespan::from_hours(12)))]
            )
        );

        let err = parse("MATCH (n) WHERE n.t > duration('soon') RETURN n").unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_less_than_negative_without_spaces() {
        let packed = parse("MATCH (n) WHERE n.x<-5 RETURN n").unwrap();
        let spaced = parse("MATCH (n) WHERE n.x < -5 RETURN n").unwrap();
        assert_eq!(packed, spaced);
        assert_eq!(
            packed.where_clause.unwrap().predicate,
            Expression::compare(
                Expression::property("n", "x"),
                ComparisonOp::LessThan,
                Expression::Literal(Literal::Integer(-5))
            )
        );

        assert!(parse("MATCH (n) WHERE n.x<-'a' RETURN n").unwrap_err().is_syntax());
    }

    #[test]
    fn test_single_node() {
        let query = parse("MATCH (n:Person) RETURN n.name").unwrap();
        let path = &query.paths()[0];
        assert_eq!(path.nodes().len(), 1);
        assert_eq!(path.nodes()[0].labels, vec!["Person"]);
        assert!(query.where_clause.is_none());
        assert_eq!(
            query.return_clause.unwrap().items[0].expression,
            Expression::property("n", "name")
        );
    }

    #[test]
    fn test_relationship_directions() {
        let query = parse("MATCH (a)-[r:KNOWS]->(b)<-[:OWNS]-(c)-[:LINKS]-(d) RETURN a").unwrap();
        let rels = query.paths()[0].relationships();
        assert_eq!(rels.len(), 3);
        assert_eq!(rels[0].direction, Direction::Outgoing);
        assert_eq!(rels[0].variable.as_deref(), Some("r"));
        assert_eq!(rels[1].direction, Direction::Incoming);
        assert_eq!(rels[1].variable, None);
        assert_eq!(rels[2].direction, Direction::Both);
    }

    #[test]
    fn test_arrow_shorthands() {
        let query = parse("MATCH (a)-->(b)<--(c)--(d) RETURN a").unwrap();
        let dirs: Vec<_> = query.paths()[0]
            .relationships()
            .iter()
            .map(|r| r.direction)
            .collect();
        assert_eq!(dirs, vec![Direction::Outgoing, Direction::Incoming, Direction::Both]);
    }

    #[test]
    fn test_labels_and_types_alternation() {
        let query =
            parse("MATCH (n:User|Device)-[r:LOGGED_ON|:ACCESSED]->(m:Host:Server) RETURN n")
                .unwrap();
        let path = &query.paths()[0];
        assert_eq!(path.nodes()[0].labels, vec!["User", "Device"]);
        assert_eq!(path.nodes()[1].labels, vec!["Host", "Server"]);
        assert_eq!(path.relationships()[0].rel_types, vec!["LOGGED_ON", "ACCESSED"]);
    }

    #[test]
    fn test_property_map() {
        let query =
            parse("MATCH (n:User {name: 'alice', admin: true, score: -2.5}) RETURN n").unwrap();
        let props = query.paths()[0].nodes()[0].properties.clone().unwrap();
        assert_eq!(props.entries.len(), 3);
        assert_eq!(props.entries[0], ("name".to_string(), Expression::string("alice")));
        assert_eq!(
            props.entries[2].1,
            Expression::Literal(Literal::Float(-2.5))
        );
    }

    #[test]
    fn test_property_map_rejects_expressions() {
        let err = parse("MATCH (n {name: m.name}) RETURN n").unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_variable_length() {
        let query =
            parse("MATCH (a)-[:KNOWS*1..3]->(b), (c)-[*]->(d), (e)-[*2]-(f) RETURN a").unwrap();
        let lengths: Vec<_> = query
            .paths()
            .iter()
            .map(|p| p.relationships()[0].length.unwrap().to_target_syntax())
            .collect();
        assert_eq!(lengths, vec!["[1..3]", "[..]", "[2]"]);
        assert!(query.paths()[0].has_variable_length());
        assert!(!query.paths()[2].has_variable_length());
    }

    #[test]
    fn test_inverted_path_length_fails() {
        let err = parse("MATCH (a)-[*3..1]->(b) RETURN a").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_multiple_paths_and_optional() {
        let query = parse("OPTIONAL MATCH (a)-->(b), (c) RETURN a, c").unwrap();
        let m = query.match_clause.unwrap();
        assert!(m.optional);
        assert_eq!(m.paths.len(), 2);
    }

    #[test]
    fn test_where_precedence() {
        let query = parse("MATCH (n) WHERE NOT n.a = 1 AND n.b = 2 OR n.c = 3 RETURN n").unwrap();
        let predicate = query.where_clause.unwrap().predicate;

        let Expression::Logical { op: LogicalOp::Or, operands } = predicate else {
            panic!("expected OR at the root");
        };
        let parts = operands.to_vec();
        assert_eq!(parts.len(), 2);

        let Expression::Logical { op: LogicalOp::And, operands: and_ops } = parts[0] else {
            panic!("expected AND under OR");
        };
        assert!(matches!(
            and_ops.to_vec()[0],
            Expression::Logical { op: LogicalOp::Not, .. }
        ));
    }

    #[test]
    fn test_parenthesized_where() {
        let query = parse("MATCH (n) WHERE n.a = 1 AND (n.b = 2 OR n.c = 3) RETURN n").unwrap();
        let predicate = query.where_clause.unwrap().predicate;
        assert_eq!(predicate.conjuncts().len(), 2);
    }

    #[test]
    fn test_string_predicates_and_null_tests() {
        let query = parse(
            "MATCH (p:Process) WHERE p.cmd CONTAINS 'powershell' AND p.name STARTS WITH 'cmd' \
             AND p.path ENDS WITH '.exe' AND p.parent IS NOT NULL AND p.user IS NULL \
             AND p.pid IN [1, 2, 3] AND p.hash =~ '^[a-f0-9]+$' RETURN p",
        )
        .unwrap();
        let predicate = query.where_clause.unwrap().predicate;
        let conjuncts = predicate.conjuncts();
        assert_eq!(conjuncts.len(), 7);
        let op_at = |i: usize| match conjuncts[i] {
            Expression::Comparison { op, .. } => Some(*op),
            _ => None,
        };
        assert_eq!(op_at(0), Some(ComparisonOp::Contains));
        assert_eq!(op_at(1), Some(ComparisonOp::StartsWith));
        assert!(matches!(conjuncts[3], Expression::IsNull { negated: true, .. }));
        assert_eq!(op_at(5), Some(ComparisonOp::In));
        assert_eq!(op_at(6), Some(ComparisonOp::RegexMatch));
    }

    #[test]
    fn test_return_modifiers() {
        let query = parse(
            "MATCH (n) RETURN DISTINCT n.name AS name, count(*) AS total \
             ORDER BY total DESC, name SKIP 10 LIMIT 5",
        )
        .unwrap();
        let ret = query.return_clause.unwrap();
        assert!(ret.distinct);
        assert_eq!(ret.items[0].alias.as_deref(), Some("name"));
        assert_eq!(
            ret.items[1].expression,
            Expression::function("count", vec![Expression::Star])
        );
        assert_eq!(ret.order_by.len(), 2);
        assert!(!ret.order_by[0].ascending);
        assert!(ret.order_by[1].ascending);
        assert_eq!(ret.skip, Some(10));
        assert_eq!(ret.limit, Some(5));
    }

    #[test]
    fn test_limit_before_skip() {
        let ret = parse("MATCH (n) RETURN n LIMIT 5 SKIP 2").unwrap().return_clause.unwrap();
        assert_eq!((ret.limit, ret.skip), (Some(5), Some(2)));
    }

    #[test]
    fn test_negative_limit_is_structural() {
        let err = parse("MATCH (n) RETURN n LIMIT -1").unwrap_err();
        assert!(err.is_structural());
    }

    #[test]
    fn test_keyword_property_names() {
        let query = parse("MATCH (n) WHERE n.count > 1 RETURN n.set").unwrap();
        assert!(query.where_clause.is_some());
    }

    #[test]
    fn test_unbalanced_parentheses() {
        let err = parse("MATCH (n:Person RETURN n").unwrap_err();
        assert_eq!(syntax_position(err), 16);

        let err = parse("MATCH (a)-[r:KNOWS->(b) RETURN a").unwrap_err();
        assert!(err.is_syntax());
    }

    #[test]
    fn test_missing_return() {
        let err = parse("MATCH (n) WHERE n.age > 3").unwrap_err();
        match err {
            Error::Syntax { token, position, message } => {
                assert_eq!(token, "<end of input>");
                assert_eq!(position, 25);
                assert!(message.contains("RETURN"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_missing_match() {
        assert!(parse("RETURN 1").unwrap_err().is_syntax());
        let err = parse("CREATE (n) RETURN n").unwrap_err();
        assert!(err.to_string().contains("CREATE"));
    }

    #[test]
    fn test_unsupported_clause_after_match() {
        let err = parse("MATCH (n) SET n.x = 1 RETURN n").unwrap_err();
        assert!(err.to_string().contains("unsupported clause"));
    }

    #[test]
    fn test_trailing_tokens() {
        assert!(parse("MATCH (n) RETURN n )").unwrap_err().is_syntax());
    }

    #[test]
    fn test_parameters_rejected() {
        let err = parse("MATCH (n) WHERE n.name = $name RETURN n").unwrap_err();
        assert!(err.to_string().contains("parameters"));
    }

    #[test]
    fn test_every_path_satisfies_invariant() {
        for text in [
            "MATCH (a) RETURN a",
            "MATCH (a)-->(b) RETURN a",
            "MATCH (a)-[:X]->(b)<-[:Y]-(c), (d)--(e) RETURN a",
        ] {
            let query = parse(text).unwrap();
            for path in query.paths() {
                assert_eq!(path.relationships().len(), path.nodes().len() - 1);
            }
        }
    }
}
