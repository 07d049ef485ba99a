//! Parse a filter string into a [`FilterNode`] tree.
//!
//! Grammar: a comparison is `field`, an operator token, and a scalar operand
//! (a parenthesized comma-list for the membership operators). `;` composes
//! with AND, `,` with OR, left to right with no precedence; nesting must be
//! explicit via parentheses. Scalars may be single- or double-quoted with
//! backslash escapes.

use super::operators::TOKENS_LONGEST_FIRST;
use super::FilterNode;
use crate::translation::error::Error;
use query_engine_metadata::metadata::ComparisonOperator;

/// Parse a filter string. Parsing is deterministic: the same input always
/// yields a structurally identical tree.
pub fn parse(input: &str) -> Result<FilterNode, Error> {
    let mut parser = Parser::new(input);
    let node = parser.parse_expression()?;
    parser.skip_whitespace();
    if parser.rest().is_empty() {
        Ok(node)
    } else {
        Err(parser.error_here())
    }
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn new(input: &'a str) -> Self {
        Parser { input, pos: 0 }
    }

    fn rest(&self) -> &'a str {
        &self.input[self.pos..]
    }

    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn bump(&mut self) {
        if let Some(c) = self.peek() {
            self.pos += c.len_utf8();
        }
    }

    fn skip_whitespace(&mut self) {
        while matches!(self.peek(), Some(c) if c.is_whitespace()) {
            self.bump();
        }
    }

    /// A parse error naming the offending substring.
    fn error_here(&self) -> Error {
        let rest = self.rest();
        if rest.is_empty() {
            Error::Parse("<end of input>".to_string())
        } else {
            Error::Parse(rest.chars().take(40).collect())
        }
    }

    fn parse_expression(&mut self) -> Result<FilterNode, Error> {
        let mut node = self.parse_operand()?;
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(';') => {
                    self.bump();
                    let rhs = self.parse_operand()?;
                    node = and_merge(node, rhs);
                }
                Some(',') => {
                    self.bump();
                    let rhs = self.parse_operand()?;
                    node = or_merge(node, rhs);
                }
                _ => break,
            }
        }
        Ok(node)
    }

    fn parse_operand(&mut self) -> Result<FilterNode, Error> {
        self.skip_whitespace();
        if self.peek() == Some('(') {
            self.bump();
            let node = self.parse_expression()?;
            self.skip_whitespace();
            if self.peek() == Some(')') {
                self.bump();
                Ok(node)
            } else {
                Err(self.error_here())
            }
        } else {
            self.parse_comparison()
        }
    }

    fn parse_comparison(&mut self) -> Result<FilterNode, Error> {
        let field = self.parse_selector()?;
        self.skip_whitespace();
        let operator = self.parse_operator()?;
        let arguments = if operator.takes_operand_list() {
            self.parse_argument_list()?
        } else {
            vec![self.parse_scalar()?]
        };
        Ok(FilterNode::Comparison {
            field,
            operator,
            arguments,
        })
    }

    fn parse_selector(&mut self) -> Result<String, Error> {
        self.skip_whitespace();
        let start = self.pos;
        while matches!(self.peek(), Some(c) if c.is_ascii_alphanumeric() || c == '_' || c == '.') {
            self.bump();
        }
        if self.pos == start {
            Err(self.error_here())
        } else {
            Ok(self.input[start..self.pos].to_string())
        }
    }

    fn parse_operator(&mut self) -> Result<ComparisonOperator, Error> {
        for &operator in TOKENS_LONGEST_FIRST {
            if self.rest().starts_with(operator.token()) {
                self.pos += operator.token().len();
                return Ok(operator);
            }
        }
        Err(self.error_here())
    }

    fn parse_argument_list(&mut self) -> Result<Vec<String>, Error> {
        self.skip_whitespace();
        if self.peek() != Some('(') {
            return Err(self.error_here());
        }
        self.bump();
        let mut arguments = vec![self.parse_scalar()?];
        loop {
            self.skip_whitespace();
            match self.peek() {
                Some(',') => {
                    self.bump();
                    arguments.push(self.parse_scalar()?);
                }
                Some(')') => {
                    self.bump();
                    return Ok(arguments);
                }
                _ => return Err(self.error_here()),
            }
        }
    }

    fn parse_scalar(&mut self) -> Result<String, Error> {
        self.skip_whitespace();
        match self.peek() {
            Some(quote @ ('\'' | '"')) => {
                self.bump();
                let mut value = String::new();
                loop {
                    match self.peek() {
                        None => return Err(self.error_here()),
                        Some(c) if c == quote => {
                            self.bump();
                            return Ok(value);
                        }
                        Some('\\') => {
                            self.bump();
                            match self.peek() {
                                Some(escaped) => {
                                    value.push(escaped);
                                    self.bump();
                                }
                                None => return Err(self.error_here()),
                            }
                        }
                        Some(c) => {
                            value.push(c);
                            self.bump();
                        }
                    }
                }
            }
            _ => {
                let start = self.pos;
                while matches!(self.peek(), Some(c) if !matches!(c, ';' | ',' | '(' | ')')) {
                    self.bump();
                }
                let raw = self.input[start..self.pos].trim();
                if raw.is_empty() {
                    Err(self.error_here())
                } else {
                    Ok(raw.to_string())
                }
            }
        }
    }
}

/// Fold the right-hand side into an existing AND branch, or open one.
fn and_merge(node: FilterNode, rhs: FilterNode) -> FilterNode {
    match node {
        FilterNode::And(mut children) => {
            children.push(rhs);
            FilterNode::And(children)
        }
        other => FilterNode::And(vec![other, rhs]),
    }
}

/// Fold the right-hand side into an existing OR branch, or open one.
fn or_merge(node: FilterNode, rhs: FilterNode) -> FilterNode {
    match node {
        FilterNode::Or(mut children) => {
            children.push(rhs);
            FilterNode::Or(children)
        }
        other => FilterNode::Or(vec![other, rhs]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn comparison(field: &str, operator: ComparisonOperator, arguments: &[&str]) -> FilterNode {
        FilterNode::Comparison {
            field: field.to_string(),
            operator,
            arguments: arguments.iter().map(ToString::to_string).collect(),
        }
    }

    #[test]
    fn test_parse_single_comparison() {
        assert_eq!(
            parse("age=gt=30").unwrap(),
            comparison("age", ComparisonOperator::GreaterThan, &["30"])
        );
    }

    #[test]
    fn test_parse_is_deterministic() {
        let input = "age=gt=30;(status==active,status==locked)";
        assert_eq!(parse(input).unwrap(), parse(input).unwrap());
    }

    #[test]
    fn test_semicolon_chains_into_one_and_branch() {
        assert_eq!(
            parse("a==1;b==2;c==3").unwrap(),
            FilterNode::And(vec![
                comparison("a", ComparisonOperator::Equals, &["1"]),
                comparison("b", ComparisonOperator::Equals, &["2"]),
                comparison("c", ComparisonOperator::Equals, &["3"]),
            ])
        );
    }

    #[test]
    fn test_mixed_separators_group_left_to_right() {
        // no precedence: a;b,c is (a AND b) OR c
        assert_eq!(
            parse("a==1;b==2,c==3").unwrap(),
            FilterNode::Or(vec![
                FilterNode::And(vec![
                    comparison("a", ComparisonOperator::Equals, &["1"]),
                    comparison("b", ComparisonOperator::Equals, &["2"]),
                ]),
                comparison("c", ComparisonOperator::Equals, &["3"]),
            ])
        );
    }

    #[test]
    fn test_parentheses_group_explicitly() {
        assert_eq!(
            parse("a==1;(b==2,c==3)").unwrap(),
            FilterNode::And(vec![
                comparison("a", ComparisonOperator::Equals, &["1"]),
                FilterNode::Or(vec![
                    comparison("b", ComparisonOperator::Equals, &["2"]),
                    comparison("c", ComparisonOperator::Equals, &["3"]),
                ]),
            ])
        );
    }

    #[test]
    fn test_membership_operand_is_a_parenthesized_list() {
        assert_eq!(
            parse("status=in=(active,locked)").unwrap(),
            comparison("status", ComparisonOperator::In, &["active", "locked"])
        );
        assert_eq!(
            parse("status=out=(retired)").unwrap(),
            comparison("status", ComparisonOperator::NotIn, &["retired"])
        );
    }

    #[test]
    fn test_quoted_scalars_carry_delimiters() {
        assert_eq!(
            parse("name=like='a;b,c'").unwrap(),
            comparison("name", ComparisonOperator::Like, &["a;b,c"])
        );
        assert_eq!(
            parse("name==\"O\\\"Brien\"").unwrap(),
            comparison("name", ComparisonOperator::Equals, &["O\"Brien"])
        );
    }

    #[test]
    fn test_unknown_operator_names_offending_substring() {
        match parse("age=about=30") {
            Err(Error::Parse(offending)) => assert_eq!(offending, "=about=30"),
            other => panic!("expected a parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_unbalanced_parenthesis_is_an_error() {
        assert!(matches!(parse("(a==1"), Err(Error::Parse(_))));
        assert!(matches!(parse("a==1)"), Err(Error::Parse(_))));
    }

    #[test]
    fn test_empty_field_and_empty_operand_are_errors() {
        assert!(matches!(parse("==1"), Err(Error::Parse(_))));
        assert!(matches!(parse("a=="), Err(Error::Parse(_))));
        assert!(matches!(parse(""), Err(Error::Parse(_))));
        assert!(matches!(parse("status=in=()"), Err(Error::Parse(_))));
    }
}
