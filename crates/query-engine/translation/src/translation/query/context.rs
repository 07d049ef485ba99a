//! The request-scoped accumulator the processor pipeline populates, then
//! the renderer consumes. Created per request, rendered once, discarded.

use std::sync::Arc;

use query_engine_metadata::metadata::{ScalarType, TableInfo};
use query_engine_sql::sql::ast;
use query_engine_sql::sql::helpers;
use restbridge_configuration::CatalogError;

use crate::translation::error::Error;

/// One participating table occurrence with its per-statement alias.
#[derive(Debug, Clone)]
pub struct TableEntry {
    /// Catalog-owned descriptor; the context never copies the metadata.
    pub table: Arc<TableInfo>,
    pub alias: ast::TableAlias,
    pub root: bool,
}

impl TableEntry {
    /// Identity used for duplicate grouping during shape inference.
    pub fn identity(&self) -> (String, String) {
        (
            self.table.schema_name.to_lowercase(),
            self.table.table_name.to_lowercase(),
        )
    }

    /// The `schema.table AS alias` reference for a FROM or JOIN clause.
    pub fn table_reference(&self) -> ast::TableReference {
        ast::TableReference::DBTable {
            schema: ast::SchemaName(self.table.schema_name.clone()),
            table: ast::TableName(self.table.table_name.clone()),
        }
    }
}

/// A column selected for output, tied to the entry it came from so union
/// branches can keep their own column scope.
#[derive(Debug, Clone)]
pub struct SelectedColumn {
    pub entry_index: usize,
    pub reference: ast::ColumnReference,
}

/// One on-condition of a join: left column, operator, right column.
#[derive(Debug, Clone)]
pub struct OnCondition {
    pub left: ast::ColumnReference,
    pub operator: ast::BinaryOperator,
    pub right: ast::ColumnReference,
}

/// A resolved join: target entry, kind, on-conditions and an optional
/// compiled predicate scoped to the joined table.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub entry_index: usize,
    pub kind: ast::JoinKind,
    pub on: Vec<OnCondition>,
    pub nested_predicate: Option<ast::Expression>,
}

/// The inferred statement shape.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Shape {
    #[default]
    Single,
    Join,
    Union,
}

/// A field resolved to a concrete column of one participating table.
#[derive(Debug, Clone)]
pub struct ResolvedColumn {
    pub entry_index: usize,
    pub reference: ast::ColumnReference,
    pub scalar_type: ScalarType,
}

/// The query context itself.
#[derive(Debug)]
pub struct QueryContext {
    pub tables: Vec<TableEntry>,
    pub joins: Vec<JoinSpec>,
    pub columns: Vec<SelectedColumn>,
    pub predicate: Option<ast::Expression>,
    pub sorts: Vec<ast::OrderByElement>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
    pub count: bool,
    pub shape: Shape,
    alias_counter: u64,
}

impl QueryContext {
    /// Fresh context for one request. The −1 paging sentinels collapse to
    /// `None`, which the renderer turns into "omit the clause entirely".
    pub fn new(limit: i32, offset: i64, count: bool) -> Self {
        QueryContext {
            tables: vec![],
            joins: vec![],
            columns: vec![],
            predicate: None,
            sorts: vec![],
            limit: u32::try_from(limit).ok(),
            offset: u64::try_from(offset).ok(),
            count,
            shape: Shape::default(),
            alias_counter: 0,
        }
    }

    /// Register a table occurrence and assign it the next alias. Aliases
    /// are injective within one context by construction.
    pub fn add_table(&mut self, table: Arc<TableInfo>, root: bool) -> usize {
        let alias = self.next_alias(&table.table_name);
        self.tables.push(TableEntry { table, alias, root });
        self.tables.len() - 1
    }

    /// Deterministic alias: a short lowercase prefix of the table name plus
    /// the occurrence counter, so the same table name always yields the
    /// same alias shape and repeated occurrences never collide.
    fn next_alias(&mut self, table_name: &str) -> ast::TableAlias {
        let index = self.alias_counter;
        self.alias_counter += 1;
        let prefix: String = table_name
            .to_lowercase()
            .chars()
            .filter(char::is_ascii_alphanumeric)
            .take(4)
            .collect();
        let prefix = if prefix.is_empty() {
            "t".to_string()
        } else {
            prefix
        };
        helpers::make_table_alias(index, &format!("{prefix}_{index}"))
    }

    /// The entry carrying the root flag.
    pub fn root_index(&self) -> Result<usize, Error> {
        self.tables
            .iter()
            .position(|entry| entry.root)
            .ok_or_else(|| Error::Render("no root table resolved".to_string()))
    }

    /// Resolve a field against the given table entries. A `table.column`
    /// name selects the matching entry; a bare name takes the first entry
    /// in scope order that declares it. Resolution fails closed.
    pub fn resolve_field(&self, scope: &[usize], field: &str) -> Result<ResolvedColumn, Error> {
        if let Some((table_part, column_part)) = field.split_once('.') {
            for &entry_index in scope {
                let entry = &self.tables[entry_index];
                if entry.table.table_name.eq_ignore_ascii_case(table_part) {
                    return match entry.table.lookup_column(column_part) {
                        Some(column) => Ok(self.resolved(entry_index, column.name.clone(), column.r#type)),
                        None => Err(Error::UnknownColumn {
                            column: column_part.to_string(),
                            table: entry.table.qualified_name(),
                        }),
                    };
                }
            }
            return Err(CatalogError::UnknownTable(table_part.to_string()).into());
        }

        for &entry_index in scope {
            let entry = &self.tables[entry_index];
            if let Some(column) = entry.table.lookup_column(field) {
                return Ok(self.resolved(entry_index, column.name.clone(), column.r#type));
            }
        }
        Err(Error::UnknownColumn {
            column: field.to_string(),
            table: scope
                .first()
                .map(|&index| self.tables[index].table.qualified_name())
                .unwrap_or_default(),
        })
    }

    fn resolved(&self, entry_index: usize, column_name: String, scalar_type: ScalarType) -> ResolvedColumn {
        ResolvedColumn {
            entry_index,
            reference: ast::ColumnReference {
                table: ast::TableReference::AliasedTable(self.tables[entry_index].alias.clone()),
                name: ast::ColumnName(column_name),
            },
            scalar_type,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use query_engine_metadata::metadata::{ColumnInfo, ForeignRelations, Nullable};
    use std::collections::BTreeMap;

    fn table(name: &str, columns: &[(&str, ScalarType)]) -> Arc<TableInfo> {
        Arc::new(TableInfo {
            schema_name: "public".to_string(),
            table_name: name.to_string(),
            columns: columns
                .iter()
                .map(|(column, r#type)| ColumnInfo {
                    name: (*column).to_string(),
                    r#type: *r#type,
                    nullable: Nullable::Nullable,
                })
                .collect(),
            foreign_relations: ForeignRelations(BTreeMap::new()),
        })
    }

    #[test]
    fn test_aliases_are_injective_per_context() {
        let mut context = QueryContext::new(-1, -1, false);
        context.add_table(table("users", &[]), true);
        context.add_table(table("users", &[]), false);
        context.add_table(table("orders", &[]), false);

        let aliases: std::collections::BTreeSet<_> =
            context.tables.iter().map(|t| t.alias.name.clone()).collect();
        assert_eq!(aliases.len(), 3);
        assert_eq!(context.tables[0].alias.name, "user_0");
        assert_eq!(context.tables[1].alias.name, "user_1");
        assert_eq!(context.tables[2].alias.name, "orde_2");
    }

    #[test]
    fn test_paging_sentinels_collapse_to_none() {
        let context = QueryContext::new(-1, -1, false);
        assert_eq!(context.limit, None);
        assert_eq!(context.offset, None);

        let context = QueryContext::new(10, 5, false);
        assert_eq!(context.limit, Some(10));
        assert_eq!(context.offset, Some(5));
    }

    #[test]
    fn test_qualified_field_selects_its_table() {
        let mut context = QueryContext::new(-1, -1, false);
        context.add_table(table("users", &[("id", ScalarType::Integer)]), true);
        context.add_table(table("orders", &[("id", ScalarType::Integer)]), false);

        let resolved = context.resolve_field(&[0, 1], "orders.id").unwrap();
        assert_eq!(resolved.entry_index, 1);

        let bare = context.resolve_field(&[0, 1], "id").unwrap();
        assert_eq!(bare.entry_index, 0, "bare names take the first entry in scope");
    }

    #[test]
    fn test_unresolved_field_fails_closed() {
        let mut context = QueryContext::new(-1, -1, false);
        context.add_table(table("users", &[("id", ScalarType::Integer)]), true);

        assert!(matches!(
            context.resolve_field(&[0], "nope"),
            Err(Error::UnknownColumn { .. })
        ));
        assert!(matches!(
            context.resolve_field(&[0], "orders.id"),
            Err(Error::Catalog(_))
        ));
    }
}
