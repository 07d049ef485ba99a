//! Resolve sort directives to alias-qualified order-by elements.

use query_engine_sql::sql::ast;

use super::context::QueryContext;
use super::pipeline::Processor;
use super::Env;
use crate::translation::error::Error;
use crate::translation::request::ReadRequest;

pub struct ResolveSort;

impl Processor for ResolveSort {
    fn name(&self) -> &'static str {
        "resolve-sort"
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

        let scope: Vec<usize> = (0..context.tables.len()).collect();
        let mut elements = vec![];
        for directive in &request.sorts {
            // only `field;DIR` with exactly two parts is honored
            let Some((field, direction)) = split_directive(directive) else {
                tracing::debug!(%directive, "skipping malformed sort directive");
                continue;
            };
            let resolved = context.resolve_field(&scope, field)?;
            elements.push(ast::OrderByElement {
                target: ast::Expression::ColumnReference(resolved.reference),
                direction,
            });
        }
        context.sorts = elements;
        Ok(())
    }
}

/// Split a `"field;DIR"` directive. Direction is case-insensitive and
/// anything but DESC falls back to ascending.
pub fn split_directive(directive: &str) -> Option<(&str, ast::OrderByDirection)> {
    let mut parts = directive.split(';');
    let field = parts.next()?.trim();
    let direction = parts.next()?.trim();
    if parts.next().is_some() || field.is_empty() {
        return None;
    }
    let direction = if direction.eq_ignore_ascii_case("DESC") {
        ast::OrderByDirection::Desc
    } else {
        ast::OrderByDirection::Asc
    };
    Some((field, direction))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_defaults_to_ascending() {
        assert_eq!(
            split_directive("name;DESC"),
            Some(("name", ast::OrderByDirection::Desc))
        );
        assert_eq!(
            split_directive("name;desc"),
            Some(("name", ast::OrderByDirection::Desc))
        );
        assert_eq!(
            split_directive("name;FOO"),
            Some(("name", ast::OrderByDirection::Asc))
        );
    }

    #[test]
    fn test_directives_need_exactly_two_parts() {
        assert_eq!(split_directive("name"), None);
        assert_eq!(split_directive("name;ASC;extra"), None);
        assert_eq!(split_directive(";ASC"), None);
    }
}
