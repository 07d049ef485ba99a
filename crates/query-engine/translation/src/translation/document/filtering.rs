//! Compile a predicate tree into a document-store filter expression.
//! Values embed directly in the filter document; there is no separate
//! parameter map on this side.

use serde_json::Value;

use crate::translation::error::Error;
use crate::translation::filter::{operators, FilterNode};

/// Compile one predicate tree for the given collection.
pub fn compile_expression(collection: &str, node: &FilterNode) -> Result<Value, Error> {
    match node {
        FilterNode::And(children) => Ok(object(
            "$and",
            Value::Array(compile_children(collection, children)?),
        )),
        FilterNode::Or(children) => Ok(object(
            "$or",
            Value::Array(compile_children(collection, children)?),
        )),
        FilterNode::Comparison {
            field,
            operator,
            arguments,
        } => {
            let token = operators::document_operator(*operator);
            if operator.takes_operand_list() {
                let values = arguments.iter().map(|raw| literal(raw)).collect::<Vec<Value>>();
                Ok(object(field, object(token, Value::Array(values))))
            } else {
                match arguments.as_slice() {
                    [argument] => Ok(object(field, object(token, literal(argument)))),
                    _ => Err(Error::Render(format!(
                        "operator '{operator}' expects exactly one operand in collection '{collection}'"
                    ))),
                }
            }
        }
    }
}

fn compile_children(collection: &str, children: &[FilterNode]) -> Result<Vec<Value>, Error> {
    children
        .iter()
        .map(|child| compile_expression(collection, child))
        .collect()
}

fn object(key: &str, value: Value) -> Value {
    let mut map = serde_json::Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}

/// Coerce by literal shape: document collections carry no declared types,
/// so a number-shaped operand becomes a number, `true`/`false` a boolean,
/// anything else a string.
fn literal(raw: &str) -> Value {
    if raw.eq_ignore_ascii_case("true") {
        return Value::Bool(true);
    }
    if raw.eq_ignore_ascii_case("false") {
        return Value::Bool(false);
    }
    if let Ok(int) = raw.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = raw.parse::<f64>() {
        return Value::from(float);
    }
    Value::String(raw.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::translation::filter::parser;
    use serde_json::json;

    fn compile(filter: &str) -> Value {
        let node = parser::parse(filter).unwrap();
        compile_expression("actors", &node).unwrap()
    }

    #[test]
    fn test_membership_compiles_to_value_arrays() {
        assert_eq!(
            compile("status=in=(active,locked)"),
            json!({ "status": { "$in": ["active", "locked"] } })
        );
        assert_eq!(
            compile("age=out=(1,2)"),
            json!({ "age": { "$nin": [1, 2] } })
        );
    }

    #[test]
    fn test_pattern_match_uses_regex() {
        assert_eq!(
            compile("name=like=Jack.*"),
            json!({ "name": { "$regex": "Jack.*" } })
        );
    }

    #[test]
    fn test_or_branches_nest() {
        assert_eq!(
            compile("age=lt=18,age=ge=65"),
            json!({ "$or": [
                { "age": { "$lt": 18 } },
                { "age": { "$gte": 65 } }
            ]})
        );
    }

    #[test]
    fn test_literal_shape_coercion() {
        assert_eq!(compile("active==true"), json!({ "active": { "$eq": true } }));
        assert_eq!(compile("score==2.5"), json!({ "score": { "$eq": 2.5 } }));
        assert_eq!(
            compile("name=='30 days'"),
            json!({ "name": { "$eq": "30 days" } })
        );
    }
}
