//! Compile a predicate tree into a SQL criterion with bound parameters.

use query_engine_sql::sql::ast;

use super::context::QueryContext;
use super::pipeline::Processor;
use super::values;
use super::Env;
use crate::translation::error::Error;
use crate::translation::filter::operators::{self, SqlOperator};
use crate::translation::filter::{parser, FilterNode};
use crate::translation::request::ReadRequest;

/// Pipeline step: compile the root filter, scoped to the full table set.
pub struct CompileRootFilter;

impl Processor for CompileRootFilter {
    fn name(&self) -> &'static str {
        "compile-root-filter"
    }

    fn process(
        &self,
        _env: &Env,
        request: &ReadRequest,
        context: &mut QueryContext,
    ) -> Result<(), Error> {
        let Some(filter) = request.filter.as_deref().map(str::trim) else {
            return Ok(());
        };
        if filter.is_empty() {
            return Ok(());
        }

        let node = parser::parse(filter)?;
        let scope: Vec<usize> = (0..context.tables.len()).collect();
        let predicate = compile_expression(context, &scope, &node)?;
        context.predicate = Some(predicate);
        Ok(())
    }
}

/// Compile one predicate tree against the table entries in scope. Each
/// leaf resolves its field to a concrete column, checks that the operator
/// applies to the column's type, and binds its operand(s) as parameters.
pub fn compile_expression(
    context: &QueryContext,
    scope: &[usize],
    node: &FilterNode,
) -> Result<ast::Expression, Error> {
    match node {
        FilterNode::And(children) => {
            combine(context, scope, children, |left, right| ast::Expression::And {
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        FilterNode::Or(children) => {
            combine(context, scope, children, |left, right| ast::Expression::Or {
                left: Box::new(left),
                right: Box::new(right),
            })
        }
        FilterNode::Comparison {
            field,
            operator,
            arguments,
        } => {
            let resolved = context.resolve_field(scope, field)?;
            if !resolved.scalar_type.supports_operator(*operator) {
                return Err(Error::UnsupportedOperator {
                    operator: operator.token().to_string(),
                    field: field.clone(),
                });
            }

            let left = Box::new(ast::Expression::ColumnReference(resolved.reference));
            match operators::sql_operator(*operator) {
                SqlOperator::Binary(sql_op) => match arguments.as_slice() {
                    [argument] => {
                        let param = values::coerce_operand(
                            argument,
                            resolved.scalar_type,
                            field,
                            *operator,
                        )?;
                        Ok(ast::Expression::BinaryOperation {
                            left,
                            operator: sql_op,
                            right: Box::new(ast::Expression::Parameter(param)),
                        })
                    }
                    _ => Err(Error::Render(format!(
                        "operator '{operator}' expects exactly one operand"
                    ))),
                },
                SqlOperator::Array(sql_op) => {
                    let right = arguments
                        .iter()
                        .map(|argument| {
                            values::coerce_operand(
                                argument,
                                resolved.scalar_type,
                                field,
                                *operator,
                            )
                            .map(ast::Expression::Parameter)
                        })
                        .collect::<Result<Vec<ast::Expression>, Error>>()?;
                    Ok(ast::Expression::BinaryArrayOperation {
                        left,
                        operator: sql_op,
                        right,
                    })
                }
            }
        }
    }
}

/// Compile the children of a logical branch and fold them left to right.
fn combine(
    context: &QueryContext,
    scope: &[usize],
    children: &[FilterNode],
    join: impl Fn(ast::Expression, ast::Expression) -> ast::Expression,
) -> Result<ast::Expression, Error> {
    children
        .iter()
        .map(|child| compile_expression(context, scope, child))
        .collect::<Result<Vec<ast::Expression>, Error>>()?
        .into_iter()
        .reduce(join)
        .ok_or_else(|| Error::Render("logical branch with no children".to_string()))
}
