//! Metadata information regarding the database and tracked information.

use std::collections::{BTreeMap, BTreeSet};

use enum_iterator::Sequence;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The scalar types supported by the engine.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Sequence, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum ScalarType {
    Boolean,
    Smallint,
    Integer,
    Bigint,
    Real,
    #[serde(rename = "double precision")]
    DoublePrecision,
    Numeric,
    Character,
    #[serde(rename = "character varying")]
    CharacterVarying,
    Text,
    Json,
    Date,
    Time,
    Timestamp,
    #[serde(rename = "timestamp with time zone")]
    TimestampWithTimeZone,
    Uuid,
    Any,
}

impl ScalarType {
    const OPERATORS_SUPPORTED_BY_ALL_TYPES: &'static [ComparisonOperator] = &[
        ComparisonOperator::Equals,
        ComparisonOperator::NotEquals,
        ComparisonOperator::LessThan,
        ComparisonOperator::LessThanOrEqualTo,
        ComparisonOperator::GreaterThan,
        ComparisonOperator::GreaterThanOrEqualTo,
        ComparisonOperator::In,
        ComparisonOperator::NotIn,
    ];

    const STRING_OPERATORS: &'static [ComparisonOperator] = &[ComparisonOperator::Like];

    /// Returns the complete set of comparison operators for the given type.
    pub fn comparison_operators(&self) -> BTreeSet<ComparisonOperator> {
        let mut operators =
            BTreeSet::from_iter(Self::OPERATORS_SUPPORTED_BY_ALL_TYPES.iter().copied());
        operators.extend(match self {
            ScalarType::Character => Self::STRING_OPERATORS.iter(),
            ScalarType::CharacterVarying => Self::STRING_OPERATORS.iter(),
            ScalarType::Text => Self::STRING_OPERATORS.iter(),
            ScalarType::Any => Self::STRING_OPERATORS.iter(),
            _ => [].iter(),
        });
        operators
    }

    /// Does the given operator apply to columns of this type?
    pub fn supports_operator(&self, operator: ComparisonOperator) -> bool {
        self.comparison_operators().contains(&operator)
    }
}

impl std::fmt::Display for ScalarType {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            ScalarType::DoublePrecision => write!(f, "double precision"),
            ScalarType::CharacterVarying => write!(f, "character varying"),
            ScalarType::TimestampWithTimeZone => write!(f, "timestamp with time zone"),
            _ => write!(f, "{}", format!("{self:?}").to_lowercase()),
        }
    }
}

/// The complete list of comparison operators of the filter grammar.
/// Not all of these are supported for every scalar type.
///
/// These must be kept in sync with the documentation.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Sequence,
    Serialize,
    Deserialize,
    JsonSchema,
)]
pub enum ComparisonOperator {
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqualTo,
    GreaterThan,
    GreaterThanOrEqualTo,
    In,
    NotIn,
    Like,
}

impl ComparisonOperator {
    /// The operator token as written in a filter expression.
    pub fn token(&self) -> &'static str {
        match self {
            Self::Equals => "==",
            Self::NotEquals => "!=",
            Self::LessThan => "=lt=",
            Self::LessThanOrEqualTo => "=le=",
            Self::GreaterThan => "=gt=",
            Self::GreaterThanOrEqualTo => "=ge=",
            Self::In => "=in=",
            Self::NotIn => "=out=",
            Self::Like => "=like=",
        }
    }

    /// Membership operators take a parenthesized list of operands; all
    /// others take exactly one.
    pub fn takes_operand_list(&self) -> bool {
        matches!(self, Self::In | Self::NotIn)
    }
}

impl std::fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.token())
    }
}

/// Information about a database table (or any other kind of relation).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct TableInfo {
    pub schema_name: String,
    pub table_name: String,
    /// Columns in declared order. Wildcard field selection preserves this
    /// order, so this is a list rather than a map.
    pub columns: Vec<ColumnInfo>,
    #[serde(default)]
    pub foreign_relations: ForeignRelations,
}

impl TableInfo {
    /// The `schema.table` form used as the catalog key.
    pub fn qualified_name(&self) -> String {
        format!("{}.{}", self.schema_name, self.table_name)
    }

    /// Find a declared column by name, case-insensitively.
    pub fn lookup_column(&self, column_name: &str) -> Option<&ColumnInfo> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(column_name))
    }
}

/// Can this column contain null values
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub enum Nullable {
    #[default]
    Nullable,
    NonNullable,
}

/// Information about a database column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ColumnInfo {
    pub name: String,
    pub r#type: ScalarType,
    #[serde(default)]
    pub nullable: Nullable,
}

/// A mapping from the name of a foreign key constraint to its value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
pub struct ForeignRelations(pub BTreeMap<String, ForeignRelation>);

/// A foreign key constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ForeignRelation {
    pub foreign_schema: String,
    pub foreign_table: String,
    /// Local column name to referenced column name.
    pub column_mapping: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ensure_all_comparison_operators_are_used() {
        // This is the set of all operators reachable through some scalar type.
        let exposed_operators = enum_iterator::all::<ScalarType>()
            .flat_map(|scalar_type| scalar_type.comparison_operators())
            .collect::<BTreeSet<ComparisonOperator>>();

        for operator in enum_iterator::all::<ComparisonOperator>() {
            assert!(
                exposed_operators.contains(&operator),
                "The operator {:?} is not exposed anywhere.",
                operator
            );
        }
    }

    #[test]
    fn test_like_is_string_only() {
        assert!(ScalarType::Text.supports_operator(ComparisonOperator::Like));
        assert!(!ScalarType::Integer.supports_operator(ComparisonOperator::Like));
        assert!(!ScalarType::Date.supports_operator(ComparisonOperator::Like));
    }

    #[test]
    fn test_operator_tokens_are_distinct() {
        let tokens = enum_iterator::all::<ComparisonOperator>()
            .map(|op| op.token())
            .collect::<BTreeSet<_>>();
        assert_eq!(tokens.len(), enum_iterator::all::<ComparisonOperator>().count());
    }

    #[test]
    fn test_column_lookup_is_case_insensitive() {
        let table = TableInfo {
            schema_name: "public".to_string(),
            table_name: "users".to_string(),
            columns: vec![ColumnInfo {
                name: "FirstName".to_string(),
                r#type: ScalarType::Text,
                nullable: Nullable::Nullable,
            }],
            foreign_relations: ForeignRelations::default(),
        };
        assert!(table.lookup_column("firstname").is_some());
        assert!(table.lookup_column("lastname").is_none());
    }
}
