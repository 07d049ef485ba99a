//! Build a catalog from a fixed schema and translate requests against it.

use std::collections::BTreeMap;

use query_engine_metadata::metadata::{
    ColumnInfo, ForeignRelation, ForeignRelations, Nullable, ScalarType, TableInfo,
};
use query_engine_translation::translation::error::Error;
use query_engine_translation::translation::query::{self, Env};
use query_engine_translation::translation::request::ReadRequest;
use restbridge_configuration::{FixedProvider, SchemaCatalog};

fn column(name: &str, r#type: ScalarType) -> ColumnInfo {
    ColumnInfo {
        name: name.to_string(),
        r#type,
        nullable: Nullable::Nullable,
    }
}

/// `public.users`, `public.orders` (with a foreign key to users) and
/// `public.accounts`, on the given engine.
pub fn env_for_engine(engine: &str) -> Env {
    let users = TableInfo {
        schema_name: "public".to_string(),
        table_name: "users".to_string(),
        columns: vec![
            column("id", ScalarType::Integer),
            column("age", ScalarType::Integer),
            column("status", ScalarType::Text),
            column("name", ScalarType::Text),
            column("active", ScalarType::Boolean),
            column("created_on", ScalarType::Date),
        ],
        foreign_relations: ForeignRelations(BTreeMap::new()),
    };

    let orders = TableInfo {
        schema_name: "public".to_string(),
        table_name: "orders".to_string(),
        columns: vec![
            column("id", ScalarType::Integer),
            column("user_id", ScalarType::Integer),
            column("total", ScalarType::Numeric),
        ],
        foreign_relations: ForeignRelations(BTreeMap::from([(
            "orders_user_id_fkey".to_string(),
            ForeignRelation {
                foreign_schema: "public".to_string(),
                foreign_table: "users".to_string(),
                column_mapping: BTreeMap::from([("user_id".to_string(), "id".to_string())]),
            },
        )])),
    };

    let accounts = TableInfo {
        schema_name: "public".to_string(),
        table_name: "accounts".to_string(),
        columns: vec![
            column("id", ScalarType::Integer),
            column("name", ScalarType::Text),
        ],
        foreign_relations: ForeignRelations(BTreeMap::new()),
    };

    let catalog = SchemaCatalog::load(Box::new(FixedProvider::new(
        engine,
        vec![users, orders, accounts],
    )))
    .expect("catalog load");
    Env::new(catalog.snapshot())
}

pub fn env() -> Env {
    env_for_engine("PostgreSQL 16.2")
}

/// Translate and render, returning the statement text and parameter map.
pub fn translate_sql(
    env: &Env,
    request: &ReadRequest,
) -> Result<(String, Vec<(String, String)>), Error> {
    let plan = query::translate(env, request)?;
    let sql = plan.query_sql();
    let params = sql
        .params
        .iter()
        .map(|(name, value)| (name.clone(), format!("{value:?}")))
        .collect();
    Ok((sql.sql, params))
}
