//! The request surface the HTTP-binding collaborator hands to the engine.

use serde::Deserialize;

/// A read request against one table or collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ReadRequest {
    /// Table or collection name. May be `schema.table` qualified.
    pub table: String,
    /// Optional schema qualifier, when the binding carries it separately.
    #[serde(default)]
    pub schema: Option<String>,
    /// `"*"`, a comma-separated column list, or `count(*)` for count-mode.
    #[serde(default = "default_fields")]
    pub fields: String,
    /// Filter-grammar expression.
    #[serde(default)]
    pub filter: Option<String>,
    /// Sort directives of the form `"field;ASC"` / `"field;DESC"`.
    #[serde(default)]
    pub sorts: Vec<String>,
    #[serde(default)]
    pub joins: Vec<JoinRequest>,
    /// −1 means unset: the rendered statement omits the clause.
    #[serde(default = "default_unset_limit")]
    pub limit: i32,
    /// −1 means unset: the rendered statement omits the clause.
    #[serde(default = "default_unset_offset")]
    pub offset: i64,
}

impl ReadRequest {
    /// A request with every optional part at its default.
    pub fn new(table: impl Into<String>) -> Self {
        ReadRequest {
            table: table.into(),
            schema: None,
            fields: default_fields(),
            filter: None,
            sorts: vec![],
            joins: vec![],
            limit: default_unset_limit(),
            offset: default_unset_offset(),
        }
    }

    /// Count-mode: the field list is reduced to a count expression.
    pub fn is_count(&self) -> bool {
        self.fields.trim() == "count(*)"
    }
}

/// One join specification within a read request.
#[derive(Debug, Clone, Deserialize)]
pub struct JoinRequest {
    pub table: String,
    /// Fields of the joined table to include; `None` includes them all.
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    /// Explicit on-conditions, e.g. `"users.id==orders.user_id"`. When
    /// empty, conditions are inferred from foreign keys.
    #[serde(default)]
    pub on: Vec<String>,
    #[serde(default)]
    pub join_type: JoinType,
    /// Filter-grammar expression scoped to the joined table.
    #[serde(default)]
    pub filter: Option<String>,
}

impl JoinRequest {
    pub fn new(table: impl Into<String>) -> Self {
        JoinRequest {
            table: table.into(),
            fields: None,
            on: vec![],
            join_type: JoinType::default(),
            filter: None,
        }
    }
}

/// Requested join kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum JoinType {
    #[default]
    Inner,
    Left,
}

fn default_fields() -> String {
    "*".to_string()
}

fn default_unset_limit() -> i32 {
    -1
}

fn default_unset_offset() -> i64 {
    -1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_in_on_deserialize() {
        let request: ReadRequest = serde_json::from_str(r#"{"table": "users"}"#).unwrap();
        assert_eq!(request.fields, "*");
        assert_eq!(request.limit, -1);
        assert_eq!(request.offset, -1);
        assert!(request.joins.is_empty());
        assert!(!request.is_count());
    }

    #[test]
    fn test_join_kind_parses_uppercase() {
        let join: JoinRequest =
            serde_json::from_str(r#"{"table": "orders", "join_type": "LEFT"}"#).unwrap();
        assert_eq!(join.join_type, JoinType::Left);
    }

    #[test]
    fn test_count_mode_is_detected_from_fields() {
        let mut request = ReadRequest::new("film");
        request.fields = "count(*)".to_string();
        assert!(request.is_count());
    }
}
