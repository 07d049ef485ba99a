//! Translate an incoming read request to an execution plan (SQL) to be
//! run against the database.

pub mod context;
pub mod fields;
pub mod filtering;
pub mod joins;
pub mod pipeline;
pub mod root;
pub mod shape;
pub mod sorting;
pub mod validate;
pub mod values;

use std::collections::BTreeSet;
use std::sync::Arc;

use query_engine_sql::sql::ast;
use query_engine_sql::sql::dialect::Dialect;
use query_engine_sql::sql::helpers;
use query_engine_sql::sql::string::Sql;
use restbridge_configuration::CatalogSnapshot;

use self::context::{QueryContext, Shape};
use self::pipeline::Pipeline;
use crate::translation::error::Error;
use crate::translation::request::ReadRequest;

/// Static information for one translation: the catalog snapshot the whole
/// request observes. A concurrent reload never affects a request in
/// flight.
pub struct Env {
    pub snapshot: Arc<CatalogSnapshot>,
}

impl Env {
    pub fn new(snapshot: Arc<CatalogSnapshot>) -> Env {
        Env { snapshot }
    }
}

/// The translated statement plus the dialect to render it with.
#[derive(Debug)]
pub struct ExecutionPlan {
    pub root_table: String,
    pub dialect: &'static Dialect,
    pub query: ast::Statement,
}

impl ExecutionPlan {
    /// Render the final parameterized statement.
    pub fn query_sql(&self) -> Sql {
        let mut sql = Sql::new(self.dialect);
        self.query.to_sql(&mut sql);
        sql
    }
}

/// Translate a read request into an execution plan: run the processor
/// pipeline over a fresh context, then assemble the statement AST.
pub fn translate(env: &Env, request: &ReadRequest) -> Result<ExecutionPlan, Error> {
    let context = Pipeline::new().run(env, request)?;
    let statement = assemble_statement(&context)?;
    tracing::debug!(statement = ?statement, "SQL AST");
    Ok(ExecutionPlan {
        root_table: request.table.clone(),
        dialect: env.snapshot.dialect,
        query: statement,
    })
}

fn assemble_statement(context: &QueryContext) -> Result<ast::Statement, Error> {
    match context.shape {
        Shape::Union => assemble_union(context).map(ast::Statement::Union),
        Shape::Single | Shape::Join => assemble_select(context).map(ast::Statement::Select),
    }
}

fn assemble_select(context: &QueryContext) -> Result<ast::Select, Error> {
    let root = &context.tables[context.root_index()?];

    let mut select = helpers::simple_select(
        context
            .columns
            .iter()
            .map(|column| ast::Expression::ColumnReference(column.reference.clone()))
            .collect(),
    );
    if context.count {
        select.select_list = ast::SelectList::Count(ast::CountType::Star);
    }
    select.from = Some(ast::From::Table {
        reference: root.table_reference(),
        alias: root.alias.clone(),
    });

    for join in &context.joins {
        let entry = &context.tables[join.entry_index];
        let mut on_parts: Vec<ast::Expression> = join
            .on
            .iter()
            .map(|condition| ast::Expression::BinaryOperation {
                left: Box::new(ast::Expression::ColumnReference(condition.left.clone())),
                operator: condition.operator,
                right: Box::new(ast::Expression::ColumnReference(condition.right.clone())),
            })
            .collect();
        if let Some(nested) = &join.nested_predicate {
            on_parts.push(nested.clone());
        }
        let on = helpers::and_chain(on_parts)
            .ok_or_else(|| Error::Render("join rendered without an on-expression".to_string()))?;
        select.joins.push(ast::Join {
            kind: join.kind,
            table: entry.table_reference(),
            alias: entry.alias.clone(),
            on,
        });
    }

    select.where_ = ast::Where(context.predicate.clone());
    if !context.count {
        select.order_by = ast::OrderBy {
            elements: context.sorts.clone(),
        };
    }
    select.limit = ast::Limit {
        limit: context.limit,
        offset: context.offset,
    };
    Ok(select)
}

/// One branch per duplicate group, in first-appearance order; each branch
/// selects that group's own columns from its own alias.
fn assemble_union(context: &QueryContext) -> Result<ast::Union, Error> {
    let mut seen = BTreeSet::new();
    let mut branches = vec![];
    for (index, entry) in context.tables.iter().enumerate() {
        if !seen.insert(entry.identity()) {
            continue;
        }
        let columns: Vec<ast::Expression> = context
            .columns
            .iter()
            .filter(|column| column.entry_index == index)
            .map(|column| ast::Expression::ColumnReference(column.reference.clone()))
            .collect();
        if columns.is_empty() {
            return Err(Error::Render(format!(
                "union branch for '{}' selects no columns",
                entry.table.qualified_name()
            )));
        }
        let mut branch = helpers::simple_select(columns);
        branch.from = Some(ast::From::Table {
            reference: entry.table_reference(),
            alias: entry.alias.clone(),
        });
        branches.push(branch);
    }

    if branches.len() < 2 {
        return Err(Error::Render(
            "union with fewer than two branches".to_string(),
        ));
    }
    Ok(ast::Union { branches })
}
