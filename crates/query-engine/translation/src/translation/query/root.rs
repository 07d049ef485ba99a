//! Resolve the requested root table against the schema catalog.

use super::context::QueryContext;
use super::pipeline::Processor;
use super::Env;
use crate::translation::error::Error;
use crate::translation::request::ReadRequest;

pub struct ResolveRoot;

impl Processor for ResolveRoot {
    fn name(&self) -> &'static str {
        "resolve-root"
    }

    fn process(
        &self,
        env: &Env,
        request: &ReadRequest,
        context: &mut QueryContext,
    ) -> Result<(), Error> {
        let table = match &request.schema {
            Some(schema) => env.snapshot.lookup_qualified(schema, &request.table)?,
            None => env.snapshot.lookup_table(&request.table)?,
        };
        context.add_table(table, true);
        Ok(())
    }
}
