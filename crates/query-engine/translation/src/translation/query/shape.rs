//! Infer the statement shape from the participating table set.

use std::collections::BTreeMap;

use super::context::{QueryContext, Shape};
use super::pipeline::Processor;
use super::Env;
use crate::translation::error::Error;
use crate::translation::request::ReadRequest;

pub struct InferShape;

impl Processor for InferShape {
    fn name(&self) -> &'static str {
        "infer-shape"
    }

    fn process(
        &self,
        _env: &Env,
        _request: &ReadRequest,
        context: &mut QueryContext,
    ) -> Result<(), Error> {
        context.shape = infer(context)?;
        Ok(())
    }
}

/// Group table entries by identity. Every group duplicated and at least
/// two groups means UNION; mixing duplicated and singleton entries is
/// rejected outright rather than guessed at.
fn infer(context: &QueryContext) -> Result<Shape, Error> {
    let mut groups: BTreeMap<(String, String), usize> = BTreeMap::new();
    for entry in &context.tables {
        *groups.entry(entry.identity()).or_insert(0) += 1;
    }

    let all_duplicated = groups.values().all(|&count| count >= 2);
    let any_duplicated = groups.values().any(|&count| count >= 2);
    let any_singleton = groups.values().any(|&count| count == 1);

    if all_duplicated && groups.len() >= 2 {
        Ok(Shape::Union)
    } else if any_duplicated && any_singleton {
        Err(Error::AmbiguousShape)
    } else if !context.joins.is_empty() {
        Ok(Shape::Join)
    } else {
        Ok(Shape::Single)
    }
}
