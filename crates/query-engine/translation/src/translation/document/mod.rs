//! Translate a read request for a document-store target. There is no
//! textual rendering step: the output is the structural parts (filter,
//! projection, sort, paging) the execution collaborator feeds its driver.

pub mod filtering;

use serde::Serialize;

use query_engine_sql::sql::ast;

use crate::translation::error::Error;
use crate::translation::filter::parser;
use crate::translation::query::sorting::split_directive;
use crate::translation::request::ReadRequest;

/// Sort direction for one field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SortDirection {
    Asc,
    Desc,
}

/// The compiled document query tuple.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentQuery {
    pub collection: String,
    /// `None` matches every document.
    pub filter: Option<serde_json::Value>,
    /// Field names to project; empty projects every field.
    pub projection: Vec<String>,
    /// At most one (field, direction) pair: only the first well-formed
    /// directive counts in this single-field sort context.
    pub sort: Option<(String, SortDirection)>,
    pub limit: Option<u32>,
    pub offset: Option<u64>,
}

/// Translate a read request against a document collection. Collections
/// carry no introspected schema, so fields pass through unresolved and
/// operands coerce by literal shape.
pub fn translate(request: &ReadRequest) -> Result<DocumentQuery, Error> {
    let filter = match request.filter.as_deref().map(str::trim) {
        Some(raw) if !raw.is_empty() => {
            let node = parser::parse(raw)?;
            Some(filtering::compile_expression(&request.table, &node)?)
        }
        _ => None,
    };

    let projection = if request.fields.trim() == "*" {
        vec![]
    } else {
        request
            .fields
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(ToString::to_string)
            .collect()
    };

    let sort = request.sorts.iter().find_map(|directive| {
        split_directive(directive).map(|(field, direction)| {
            (
                field.to_string(),
                match direction {
                    ast::OrderByDirection::Asc => SortDirection::Asc,
                    ast::OrderByDirection::Desc => SortDirection::Desc,
                },
            )
        })
    });

    Ok(DocumentQuery {
        collection: request.table.clone(),
        filter,
        projection,
        sort,
        limit: u32::try_from(request.limit).ok(),
        offset: u64::try_from(request.offset).ok(),
    })
}
