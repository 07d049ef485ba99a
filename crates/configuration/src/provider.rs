//! The schema provider seam. The engine never opens a database connection;
//! an implementation of [`SchemaProvider`] hands it table, column and
//! foreign-key metadata plus the engine identifier used to pick a dialect.

use query_engine_metadata::metadata::{ColumnInfo, ForeignRelations, TableInfo};

/// A detected engine identifier, typically product name and version as
/// reported by the backend (e.g. `"PostgreSQL 16.2"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineId(pub String);

impl std::fmt::Display for EngineId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let EngineId(engine) = self;
        write!(f, "{engine}")
    }
}

/// A table as reported by introspection, before foreign keys are attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMeta {
    pub schema_name: String,
    pub table_name: String,
    /// Columns in declared order.
    pub columns: Vec<ColumnInfo>,
}

/// Source of schema metadata. Implementations wrap whatever introspection
/// mechanism the deployment uses; the catalog only ever calls these three
/// methods, during `load`/`reload`.
pub trait SchemaProvider {
    /// All tables and views visible to the connected principal.
    fn list_tables(&self) -> anyhow::Result<Vec<TableMeta>>;

    /// Foreign keys imported by the given table.
    fn foreign_keys_of(&self, schema_name: &str, table_name: &str)
        -> anyhow::Result<ForeignRelations>;

    /// The engine identifier used for dialect selection.
    fn detect_engine(&self) -> anyhow::Result<EngineId>;
}

/// An in-memory provider with a fixed set of tables. Used by tests and by
/// embedders that already hold a schema snapshot.
#[derive(Debug, Clone)]
pub struct FixedProvider {
    engine: EngineId,
    tables: Vec<TableInfo>,
}

impl FixedProvider {
    pub fn new(engine: impl Into<String>, tables: Vec<TableInfo>) -> Self {
        FixedProvider {
            engine: EngineId(engine.into()),
            tables,
        }
    }
}

impl SchemaProvider for FixedProvider {
    fn list_tables(&self) -> anyhow::Result<Vec<TableMeta>> {
        Ok(self
            .tables
            .iter()
            .map(|table| TableMeta {
                schema_name: table.schema_name.clone(),
                table_name: table.table_name.clone(),
                columns: table.columns.clone(),
            })
            .collect())
    }

    fn foreign_keys_of(
        &self,
        schema_name: &str,
        table_name: &str,
    ) -> anyhow::Result<ForeignRelations> {
        Ok(self
            .tables
            .iter()
            .find(|table| {
                table.schema_name.eq_ignore_ascii_case(schema_name)
                    && table.table_name.eq_ignore_ascii_case(table_name)
            })
            .map(|table| table.foreign_relations.clone())
            .unwrap_or_default())
    }

    fn detect_engine(&self) -> anyhow::Result<EngineId> {
        Ok(self.engine.clone())
    }
}
