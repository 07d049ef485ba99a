//! The process-wide schema catalog: a read-mostly cache of introspected
//! table metadata with the selected dialect, rebuilt on demand by swapping
//! the whole snapshot atomically. In-flight compilations keep the snapshot
//! they started with.

use std::collections::BTreeMap;
use std::sync::{Arc, PoisonError, RwLock};

use query_engine_metadata::metadata::{ForeignRelation, TableInfo};
use query_engine_sql::sql::dialect::{self, Dialect};

use crate::error::CatalogError;
use crate::provider::{EngineId, SchemaProvider};

/// Owns the provider and the current snapshot. Single writer (`reload`),
/// many readers (`snapshot`).
pub struct SchemaCatalog {
    provider: Box<dyn SchemaProvider + Send + Sync>,
    snapshot: RwLock<Arc<CatalogSnapshot>>,
}

/// One fully built generation of the catalog. Immutable once published.
#[derive(Debug)]
pub struct CatalogSnapshot {
    pub engine: EngineId,
    pub dialect: &'static Dialect,
    tables: Vec<Arc<TableInfo>>,
    by_qualified_name: BTreeMap<String, Arc<TableInfo>>,
}

impl SchemaCatalog {
    /// Build the first snapshot. Failure here is fatal: the engine must not
    /// serve requests against an empty or partial catalog.
    pub fn load(provider: Box<dyn SchemaProvider + Send + Sync>) -> Result<Self, CatalogError> {
        let snapshot = build_snapshot(provider.as_ref())?;
        Ok(SchemaCatalog {
            provider,
            snapshot: RwLock::new(Arc::new(snapshot)),
        })
    }

    /// Re-introspect and atomically replace the snapshot. On failure the
    /// previous snapshot stays published.
    pub fn reload(&self) -> Result<(), CatalogError> {
        let snapshot = build_snapshot(self.provider.as_ref())?;
        *self
            .snapshot
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Arc::new(snapshot);
        Ok(())
    }

    /// The current snapshot. Callers hold it for the duration of one
    /// request; a concurrent reload does not affect them.
    pub fn snapshot(&self) -> Arc<CatalogSnapshot> {
        self.snapshot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

fn build_snapshot(provider: &dyn SchemaProvider) -> Result<CatalogSnapshot, CatalogError> {
    let engine = provider.detect_engine()?;
    let dialect = dialect::for_engine(&engine.0);

    let mut tables = Vec::new();
    let mut by_qualified_name = BTreeMap::new();
    for meta in provider.list_tables()? {
        let foreign_relations = provider.foreign_keys_of(&meta.schema_name, &meta.table_name)?;
        let table = Arc::new(TableInfo {
            schema_name: meta.schema_name,
            table_name: meta.table_name,
            columns: meta.columns,
            foreign_relations,
        });
        by_qualified_name.insert(table.qualified_name().to_lowercase(), table.clone());
        tables.push(table);
    }

    tracing::info!(
        engine = %engine,
        dialect = dialect.name,
        tables = tables.len(),
        "schema catalog loaded"
    );

    Ok(CatalogSnapshot {
        engine,
        dialect,
        tables,
        by_qualified_name,
    })
}

impl CatalogSnapshot {
    /// Every table in the snapshot, in introspection order.
    pub fn tables(&self) -> &[Arc<TableInfo>] {
        &self.tables
    }

    /// Resolve an unqualified table name, case-insensitively. Exactly one
    /// match is required; a name declared in several schemas must be
    /// qualified. A `schema.table` input resolves by qualified name.
    pub fn lookup_table(&self, table_name: &str) -> Result<Arc<TableInfo>, CatalogError> {
        if let Some((schema_name, rest)) = table_name.split_once('.') {
            return self.lookup_qualified(schema_name, rest);
        }

        let mut matches = self
            .tables
            .iter()
            .filter(|table| table.table_name.eq_ignore_ascii_case(table_name));

        match (matches.next(), matches.next()) {
            (Some(table), None) => Ok(table.clone()),
            (Some(_), Some(_)) => Err(CatalogError::AmbiguousTable(table_name.to_string())),
            (None, _) => Err(CatalogError::UnknownTable(table_name.to_string())),
        }
    }

    /// Resolve by qualified `schema.table` name.
    pub fn lookup_qualified(
        &self,
        schema_name: &str,
        table_name: &str,
    ) -> Result<Arc<TableInfo>, CatalogError> {
        let key = format!("{schema_name}.{table_name}").to_lowercase();
        self.by_qualified_name
            .get(&key)
            .cloned()
            .ok_or_else(|| CatalogError::UnknownTable(format!("{schema_name}.{table_name}")))
    }

    /// The parent's foreign keys that reference the child, for default
    /// join-condition inference.
    pub fn foreign_keys_between<'a>(
        &self,
        parent: &'a TableInfo,
        child: &TableInfo,
    ) -> Vec<&'a ForeignRelation> {
        parent
            .foreign_relations
            .0
            .values()
            .filter(|fk| {
                fk.foreign_schema.eq_ignore_ascii_case(&child.schema_name)
                    && fk.foreign_table.eq_ignore_ascii_case(&child.table_name)
            })
            .collect()
    }
}
