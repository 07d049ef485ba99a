//! Final pipeline step: confirm the context invariants hold before the
//! renderer runs. A failure here is an internal defect, not user input.

use std::collections::BTreeSet;

use super::context::{QueryContext, Shape};
use super::pipeline::Processor;
use super::Env;
use crate::translation::error::Error;
use crate::translation::request::ReadRequest;

pub struct Validate;

impl Processor for Validate {
    fn name(&self) -> &'static str {
        "validate"
    }

    fn process(
        &self,
        _env: &Env,
        _request: &ReadRequest,
        context: &mut QueryContext,
    ) -> Result<(), Error> {
        // alias assignment must be injective
        let aliases: BTreeSet<&str> = context
            .tables
            .iter()
            .map(|entry| entry.alias.name.as_str())
            .collect();
        if aliases.len() != context.tables.len() {
            return Err(Error::Render("table aliases are not distinct".to_string()));
        }

        // exactly one root in non-union contexts
        let roots = context.tables.iter().filter(|entry| entry.root).count();
        if context.shape != Shape::Union && roots != 1 {
            return Err(Error::Render(format!(
                "expected exactly one root table, found {roots}"
            )));
        }

        match context.shape {
            Shape::Join => {
                if context.joins.iter().any(|join| join.on.is_empty()) {
                    return Err(Error::Render(
                        "join without any on-condition; none given and none inferable from foreign keys"
                            .to_string(),
                    ));
                }
            }
            Shape::Union => {
                // deliberate fail-fast: a union statement carries no
                // filter, sort, paging or count of its own
                if context.predicate.is_some() {
                    return Err(Error::Render(
                        "filters are not supported on union statements".to_string(),
                    ));
                }
                if !context.sorts.is_empty() {
                    return Err(Error::Render(
                        "sorting is not supported on union statements".to_string(),
                    ));
                }
                if context.limit.is_some() || context.offset.is_some() {
                    return Err(Error::Render(
                        "paging is not supported on union statements".to_string(),
                    ));
                }
                if context.count {
                    return Err(Error::Render(
                        "count-mode is not supported on union statements".to_string(),
                    ));
                }
            }
            Shape::Single => {}
        }

        if !context.count && context.columns.is_empty() {
            return Err(Error::Render("no columns resolved for the select list".to_string()));
        }

        Ok(())
    }
}
