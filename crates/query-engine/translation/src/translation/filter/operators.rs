//! The operator map: bidirectional mapping between filter-grammar operator
//! tokens and backend-native operators.

use query_engine_metadata::metadata::ComparisonOperator;
use query_engine_sql::sql::ast;

/// Tokens ordered longest first, so a scan never stops at a token that is
/// a prefix of a longer one.
pub(crate) const TOKENS_LONGEST_FIRST: &[ComparisonOperator] = &[
    ComparisonOperator::Like,
    ComparisonOperator::NotIn,
    ComparisonOperator::In,
    ComparisonOperator::GreaterThan,
    ComparisonOperator::GreaterThanOrEqualTo,
    ComparisonOperator::LessThan,
    ComparisonOperator::LessThanOrEqualTo,
    ComparisonOperator::Equals,
    ComparisonOperator::NotEquals,
];

/// How an operator renders on the SQL side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlOperator {
    Binary(ast::BinaryOperator),
    Array(ast::BinaryArrayOperator),
}

/// Resolve an exact operator token.
pub fn parse_token(token: &str) -> Option<ComparisonOperator> {
    enum_iterator::all::<ComparisonOperator>().find(|operator| operator.token() == token)
}

/// The SQL-native form of an operator.
pub fn sql_operator(operator: ComparisonOperator) -> SqlOperator {
    match operator {
        ComparisonOperator::Equals => SqlOperator::Binary(ast::BinaryOperator::Equals),
        ComparisonOperator::NotEquals => SqlOperator::Binary(ast::BinaryOperator::NotEquals),
        ComparisonOperator::GreaterThan => SqlOperator::Binary(ast::BinaryOperator::GreaterThan),
        ComparisonOperator::GreaterThanOrEqualTo => {
            SqlOperator::Binary(ast::BinaryOperator::GreaterThanOrEqualTo)
        }
        ComparisonOperator::LessThan => SqlOperator::Binary(ast::BinaryOperator::LessThan),
        ComparisonOperator::LessThanOrEqualTo => {
            SqlOperator::Binary(ast::BinaryOperator::LessThanOrEqualTo)
        }
        ComparisonOperator::Like => SqlOperator::Binary(ast::BinaryOperator::Like),
        ComparisonOperator::In => SqlOperator::Array(ast::BinaryArrayOperator::In),
        ComparisonOperator::NotIn => SqlOperator::Array(ast::BinaryArrayOperator::NotIn),
    }
}

/// The document-store form of an operator.
pub fn document_operator(operator: ComparisonOperator) -> &'static str {
    match operator {
        ComparisonOperator::Equals => "$eq",
        ComparisonOperator::NotEquals => "$ne",
        ComparisonOperator::GreaterThan => "$gt",
        ComparisonOperator::GreaterThanOrEqualTo => "$gte",
        ComparisonOperator::LessThan => "$lt",
        ComparisonOperator::LessThanOrEqualTo => "$lte",
        ComparisonOperator::In => "$in",
        ComparisonOperator::NotIn => "$nin",
        ComparisonOperator::Like => "$regex",
    }
}

/// Scan an expression (for example a join on-condition, `users.id==orders.user_id`)
/// for the operator token splitting it. The earliest occurrence wins; at
/// the same position the longer token wins.
pub fn find_operator(expression: &str) -> Option<(ComparisonOperator, usize)> {
    let mut found: Option<(ComparisonOperator, usize)> = None;
    for &operator in TOKENS_LONGEST_FIRST {
        if let Some(position) = expression.find(operator.token()) {
            let earlier = match found {
                None => true,
                Some((_, found_position)) => position < found_position,
            };
            if earlier {
                found = Some((operator, position));
            }
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    #[test]
    fn test_every_operator_has_both_backend_mappings() {
        // a fresh operator must be added to both maps before it can ship
        let document_tokens = enum_iterator::all::<ComparisonOperator>()
            .map(document_operator)
            .collect::<BTreeSet<_>>();
        assert_eq!(
            document_tokens.len(),
            enum_iterator::all::<ComparisonOperator>().count()
        );
        for operator in enum_iterator::all::<ComparisonOperator>() {
            // total by construction; this pins the shape of the membership operators
            match sql_operator(operator) {
                SqlOperator::Array(_) => assert!(operator.takes_operand_list()),
                SqlOperator::Binary(_) => assert!(!operator.takes_operand_list()),
            }
        }
    }

    #[test]
    fn test_parse_token_roundtrips() {
        for operator in enum_iterator::all::<ComparisonOperator>() {
            assert_eq!(parse_token(operator.token()), Some(operator));
        }
        assert_eq!(parse_token("=foo="), None);
    }

    #[test]
    fn test_find_operator_picks_earliest_occurrence() {
        let (operator, position) = find_operator("users.id==orders.user_id").unwrap();
        assert_eq!(operator, ComparisonOperator::Equals);
        assert_eq!(position, 8);

        let (operator, _) = find_operator("created_at=ge=joined_at").unwrap();
        assert_eq!(operator, ComparisonOperator::GreaterThanOrEqualTo);

        assert_eq!(find_operator("no operator here"), None);
    }
}
