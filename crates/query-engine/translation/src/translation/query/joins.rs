//! Resolve join specifications: target table, contributed columns,
//! on-conditions (explicit, or inferred from foreign keys) and nested
//! filters scoped to the joined table.

use query_engine_sql::sql::ast;

use super::context::{JoinSpec, OnCondition, QueryContext, SelectedColumn};
use super::fields::include_all_columns;
use super::filtering;
use super::pipeline::Processor;
use super::Env;
use crate::translation::error::Error;
use crate::translation::filter::operators::{self, SqlOperator};
use crate::translation::filter::parser;
use crate::translation::request::{JoinType, ReadRequest};

pub struct ResolveJoins;

impl Processor for ResolveJoins {
    fn name(&self) -> &'static str {
        "resolve-joins"
    }

    fn process(
        &self,
        env: &Env,
        request: &ReadRequest,
        context: &mut QueryContext,
    ) -> Result<(), Error> {
        for join in &request.joins {
            let table = env.snapshot.lookup_table(&join.table)?;
            let entry_index = context.add_table(table, false);

            if !context.count {
                match &join.fields {
                    None => include_all_columns(context, entry_index),
                    Some(fields) => {
                        for field in fields {
                            let field = field.trim();
                            if field.is_empty() {
                                continue;
                            }
                            if field == "*" {
                                include_all_columns(context, entry_index);
                                continue;
                            }
                            let resolved = context.resolve_field(&[entry_index], field)?;
                            context.columns.push(SelectedColumn {
                                entry_index: resolved.entry_index,
                                reference: resolved.reference,
                            });
                        }
                    }
                }
            }

            let root_index = context.root_index()?;
            let on = if join.on.is_empty() {
                infer_on_conditions(env, context, root_index, entry_index)?
            } else {
                explicit_on_conditions(context, root_index, entry_index, &join.on)?
            };

            let nested_predicate = match join.filter.as_deref().map(str::trim) {
                Some(filter) if !filter.is_empty() => {
                    let node = parser::parse(filter)?;
                    Some(filtering::compile_expression(
                        context,
                        &[entry_index],
                        &node,
                    )?)
                }
                _ => None,
            };

            context.joins.push(JoinSpec {
                entry_index,
                kind: match join.join_type {
                    JoinType::Inner => ast::JoinKind::Inner,
                    JoinType::Left => ast::JoinKind::Left,
                },
                on,
                nested_predicate,
            });
        }
        Ok(())
    }
}

/// Split each `left<op>right` expression on its operator token and resolve
/// the sides: left against the root table, right against the joined table.
fn explicit_on_conditions(
    context: &QueryContext,
    root_index: usize,
    entry_index: usize,
    on: &[String],
) -> Result<Vec<OnCondition>, Error> {
    let mut conditions = Vec::with_capacity(on.len());
    for expression in on {
        let (operator, position) =
            operators::find_operator(expression).ok_or_else(|| Error::Parse(expression.clone()))?;
        let token = operator.token();
        let left_raw = expression[..position].trim();
        let right_raw = expression[position + token.len()..].trim();
        if left_raw.is_empty() || right_raw.is_empty() {
            return Err(Error::Parse(expression.clone()));
        }

        let sql_op = match operators::sql_operator(operator) {
            SqlOperator::Binary(op) => op,
            SqlOperator::Array(_) => {
                return Err(Error::UnsupportedOperator {
                    operator: token.to_string(),
                    field: expression.clone(),
                })
            }
        };

        let left = context.resolve_field(&[root_index], left_raw)?;
        let right = context.resolve_field(&[entry_index], right_raw)?;
        conditions.push(OnCondition {
            left: left.reference,
            operator: sql_op,
            right: right.reference,
        });
    }
    Ok(conditions)
}

/// Default join conditions: equality over the foreign-key column mapping
/// between root and joined table, trying the root as the owning side
/// first, then the joined table.
fn infer_on_conditions(
    env: &Env,
    context: &QueryContext,
    root_index: usize,
    entry_index: usize,
) -> Result<Vec<OnCondition>, Error> {
    let root = &context.tables[root_index];
    let joined = &context.tables[entry_index];

    let mut conditions = vec![];
    for fk in env.snapshot.foreign_keys_between(&root.table, &joined.table) {
        for (local, referenced) in &fk.column_mapping {
            let left = context.resolve_field(&[root_index], local)?;
            let right = context.resolve_field(&[entry_index], referenced)?;
            conditions.push(OnCondition {
                left: left.reference,
                operator: ast::BinaryOperator::Equals,
                right: right.reference,
            });
        }
    }

    if conditions.is_empty() {
        for fk in env.snapshot.foreign_keys_between(&joined.table, &root.table) {
            for (local, referenced) in &fk.column_mapping {
                let left = context.resolve_field(&[root_index], referenced)?;
                let right = context.resolve_field(&[entry_index], local)?;
                conditions.push(OnCondition {
                    left: left.reference,
                    operator: ast::BinaryOperator::Equals,
                    right: right.reference,
                });
            }
        }
    }

    Ok(conditions)
}
