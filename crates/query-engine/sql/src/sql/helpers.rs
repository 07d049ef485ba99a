//! Helpers for building sql::ast types in certain shapes and patterns.

use super::ast::*;

// Empty clauses //

/// An empty `WHERE` clause.
pub fn empty_where() -> Where {
    Where(None)
}

/// An empty `ORDER BY` clause.
pub fn empty_order_by() -> OrderBy {
    OrderBy { elements: vec![] }
}

/// Empty `LIMIT` and `OFFSET` clauses.
pub fn empty_limit() -> Limit {
    Limit {
        limit: None,
        offset: None,
    }
}

// Aliasing //

/// Create table aliases using this function so we build everything in one place.
pub fn make_table_alias(unique_index: u64, name: &str) -> TableAlias {
    TableAlias {
        unique_index,
        name: name.to_string(),
    }
}

/// Generate an expression refering to a specific column of an aliased table.
pub fn make_column(alias: &TableAlias, name: &str) -> ColumnReference {
    ColumnReference {
        table: TableReference::AliasedTable(alias.clone()),
        name: ColumnName(name.to_string()),
    }
}

// SELECTs //

/// Build a simple select with a select list and the rest are empty.
pub fn simple_select(select_list: Vec<Expression>) -> Select {
    Select {
        select_list: SelectList::SelectList(select_list),
        from: None,
        joins: vec![],
        where_: empty_where(),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Build a `select *`.
pub fn star_select(from: From) -> Select {
    Select {
        select_list: SelectList::SelectStar,
        from: Some(from),
        joins: vec![],
        where_: empty_where(),
        order_by: empty_order_by(),
        limit: empty_limit(),
    }
}

/// Fold a list of expressions into a chain of AND expressions.
pub fn and_chain(exprs: impl IntoIterator<Item = Expression>) -> Option<Expression> {
    exprs.into_iter().reduce(|acc, expr| Expression::And {
        left: Box::new(acc),
        right: Box::new(expr),
    })
}
