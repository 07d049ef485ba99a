//! Resolve the requested field selection for the root table.

use query_engine_sql::sql::ast;

use super::context::{QueryContext, SelectedColumn};
use super::pipeline::Processor;
use super::Env;
use crate::translation::error::Error;
use crate::translation::request::ReadRequest;

pub struct ResolveFields;

impl Processor for ResolveFields {
    fn name(&self) -> &'static str {
        "resolve-fields"
    }

    fn process(
        &self,
        _env: &Env,
        request: &ReadRequest,
        context: &mut QueryContext,
    ) -> Result<(), Error> {
        if context.count {
            return Ok(());
        }

        let root_index = context.root_index()?;
        if request.fields.trim() == "*" {
            include_all_columns(context, root_index);
        } else {
            // an explicit list is kept in request order
            for field in request.fields.split(',') {
                let field = field.trim();
                if field.is_empty() {
                    continue;
                }
                let resolved = context.resolve_field(&[root_index], field)?;
                context.columns.push(SelectedColumn {
                    entry_index: resolved.entry_index,
                    reference: resolved.reference,
                });
            }
        }
        Ok(())
    }
}

/// Add every declared column of the entry, in declared order.
pub fn include_all_columns(context: &mut QueryContext, entry_index: usize) {
    let entry = &context.tables[entry_index];
    let alias = entry.alias.clone();
    let columns: Vec<SelectedColumn> = entry
        .table
        .columns
        .iter()
        .map(|column| SelectedColumn {
            entry_index,
            reference: ast::ColumnReference {
                table: ast::TableReference::AliasedTable(alias.clone()),
                name: ast::ColumnName(column.name.clone()),
            },
        })
        .collect();
    context.columns.extend(columns);
}
