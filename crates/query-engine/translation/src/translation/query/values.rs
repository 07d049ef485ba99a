//! Handle the coercion of operand literals to column types.

use query_engine_metadata::metadata::{ComparisonOperator, ScalarType};
use query_engine_sql::sql::string::Param;

use crate::translation::error::Error;

/// Coerce a raw operand literal to the column's declared type, producing
/// the parameter value bound into the statement. Coercion failure is an
/// unsupported-operator error annotated with the field name.
pub fn coerce_operand(
    raw: &str,
    scalar_type: ScalarType,
    field: &str,
    operator: ComparisonOperator,
) -> Result<Param, Error> {
    let mismatch = || Error::UnsupportedOperator {
        operator: operator.token().to_string(),
        field: field.to_string(),
    };

    match scalar_type {
        ScalarType::Boolean => {
            if raw.eq_ignore_ascii_case("true") {
                Ok(Param::Bool(true))
            } else if raw.eq_ignore_ascii_case("false") {
                Ok(Param::Bool(false))
            } else {
                Err(mismatch())
            }
        }

        ScalarType::Smallint | ScalarType::Integer | ScalarType::Bigint => {
            raw.parse::<i64>().map(Param::Int).map_err(|_| mismatch())
        }

        ScalarType::Real | ScalarType::DoublePrecision | ScalarType::Numeric => {
            raw.parse::<f64>().map(Param::Float).map_err(|_| mismatch())
        }

        // strings ride through as-is
        ScalarType::Character
        | ScalarType::CharacterVarying
        | ScalarType::Text
        | ScalarType::Json
        | ScalarType::Any => Ok(Param::String(raw.to_string())),

        // temporal and uuid literals stay string parameters; the driver
        // coerces them against the column type
        ScalarType::Date
        | ScalarType::Time
        | ScalarType::Timestamp
        | ScalarType::TimestampWithTimeZone
        | ScalarType::Uuid => Ok(Param::String(raw.to_string())),
    }
}
