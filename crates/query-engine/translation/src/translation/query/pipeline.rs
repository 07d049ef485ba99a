//! The processor pipeline: an explicit, statically composed ordered list
//! of steps that populate a [`QueryContext`]. Step order is fixed at
//! construction; there is no runtime discovery.

use super::context::QueryContext;
use super::{fields, filtering, joins, root, shape, sorting, validate, Env};
use crate::translation::error::Error;
use crate::translation::request::ReadRequest;

/// One pipeline step.
pub trait Processor {
    fn name(&self) -> &'static str;

    fn process(
        &self,
        env: &Env,
        request: &ReadRequest,
        context: &mut QueryContext,
    ) -> Result<(), Error>;
}

/// The fixed step sequence: resolve root → resolve fields → resolve joins
/// → compile root filter → resolve sort → infer shape → validate.
pub struct Pipeline {
    steps: Vec<Box<dyn Processor + Send + Sync>>,
}

impl Pipeline {
    pub fn new() -> Self {
        Pipeline {
            steps: vec![
                Box::new(root::ResolveRoot),
                Box::new(fields::ResolveFields),
                Box::new(joins::ResolveJoins),
                Box::new(filtering::CompileRootFilter),
                Box::new(sorting::ResolveSort),
                Box::new(shape::InferShape),
                Box::new(validate::Validate),
            ],
        }
    }

    /// Run every step over a fresh context. Any step error aborts the
    /// request; no partial statement is ever produced from the remains.
    pub fn run(&self, env: &Env, request: &ReadRequest) -> Result<QueryContext, Error> {
        let mut context = QueryContext::new(request.limit, request.offset, request.is_count());
        for step in &self.steps {
            tracing::debug!(step = step.name(), "processor pipeline");
            step.process(env, request, &mut context)?;
        }
        Ok(context)
    }
}

impl Default for Pipeline {
    fn default() -> Self {
        Self::new()
    }
}
