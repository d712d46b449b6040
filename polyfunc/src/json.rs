//! Bridge between [`serde_json`] documents and dispatch values and schemas.
//!
//! JSON has no notion of classes, functions, symbols or regexps, so values
//! read from JSON are always plain data, and rendering those kinds back to
//! JSON produces descriptive strings.

use serde_json::Value as Json;

use crate::dispatch::{RuleToken, Schema};
use crate::error::{PolyError, PolyResult};
use crate::value::{Fields, Value};

/// Largest integer an f64 represents exactly.
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_991.0;

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => n.as_f64().map_or(Value::Null, Value::Number),
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::Array(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Hash(
                map.into_iter()
                    .map(|(key, value)| (key, Value::from(value)))
                    .collect::<Fields>(),
            ),
        }
    }
}

impl Value {
    /// Parses a JSON document into a value.
    pub fn from_json_str(source: &str) -> PolyResult<Value> {
        let json: Json = serde_json::from_str(source)?;
        Ok(Value::from(json))
    }

    /// Renders this value as JSON.
    pub fn to_json(&self) -> Json {
        match self {
            Value::Null => Json::Null,
            Value::Bool(b) => Json::Bool(*b),
            Value::Number(n) => number_to_json(*n),
            Value::BigInt(n) => Json::String(format!("{}n", n)),
            Value::String(s) => Json::String(s.clone()),
            Value::Symbol(symbol) => {
                Json::String(format!("Symbol({})", symbol.description().unwrap_or("")))
            }
            Value::Array(items) => Json::Array(items.iter().map(Value::to_json).collect()),
            Value::Hash(fields) => fields_to_json(fields),
            Value::Object(instance) => fields_to_json(instance.fields()),
            Value::Regexp(re) => Json::String(format!("/{}/", re.as_str())),
            Value::Function(function) => match function.name() {
                Some(name) => Json::String(format!("[function {}]", name)),
                None => Json::String("[function]".to_string()),
            },
            Value::Class(class) => Json::String(format!("[class {}]", class.name())),
        }
    }
}

fn number_to_json(n: f64) -> Json {
    // Integral numbers print without a fractional part.
    if n.fract() == 0.0 && n.abs() <= MAX_SAFE_INTEGER {
        return Json::from(n as i64);
    }
    serde_json::Number::from_f64(n).map_or(Json::Null, Json::Number)
}

fn fields_to_json(fields: &Fields) -> Json {
    Json::Object(
        fields
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect(),
    )
}

impl RuleToken {
    /// Reads a rule from JSON: a string is a single rule, an array of
    /// strings is a union.
    pub fn from_json(json: &Json) -> PolyResult<Self> {
        match json {
            Json::String(rule) => RuleToken::parse(rule),
            Json::Array(members) => RuleToken::union(
                members
                    .iter()
                    .map(|member| match member {
                        Json::String(rule) => RuleToken::parse(rule),
                        other => Err(invalid(other)),
                    })
                    .collect::<PolyResult<Vec<_>>>()?,
            ),
            other => Err(invalid(other)),
        }
    }
}

impl Schema {
    /// Reads a schema from a JSON array of rules.
    pub fn from_json(json: &Json) -> PolyResult<Self> {
        match json {
            Json::Array(rules) => Schema::new(
                rules
                    .iter()
                    .map(RuleToken::from_json)
                    .collect::<PolyResult<Vec<_>>>()?,
            ),
            other => Err(invalid(other)),
        }
    }
}

fn invalid(json: &Json) -> PolyError {
    PolyError::InvalidRule {
        rule: json.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::value::ClassRef;

    #[test]
    fn test_value_from_json() {
        let value = Value::from(json!({ "a": [1, "two", null, true], "b": {} }));
        let fields = value.as_fields().unwrap();

        assert_eq!(
            fields["a"],
            Value::Array(vec![
                Value::Number(1.0),
                Value::from("two"),
                Value::Null,
                Value::Bool(true),
            ])
        );
        assert_eq!(fields["b"], Value::Hash(Fields::new()));
        assert_eq!(fields.keys().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn test_value_to_json() {
        let class = ClassRef::new("Point");
        assert_eq!(Value::from(27).to_json(), json!(27));
        assert_eq!(Value::from(1.5).to_json(), json!(1.5));
        assert_eq!(Value::Number(f64::NAN).to_json(), Json::Null);
        assert_eq!(Value::bigint(12).to_json(), json!("12n"));
        assert_eq!(Value::from(class.clone()).to_json(), json!("[class Point]"));
        assert_eq!(
            Value::from(class.instantiate().with_field("x", 1)).to_json(),
            json!({ "x": 1 })
        );
    }

    #[test]
    fn test_from_json_str() {
        let args = Value::from_json_str("[3, 4]").unwrap();
        assert_eq!(args, Value::from(vec![3, 4]));
        assert!(matches!(Value::from_json_str("[3,"), Err(PolyError::Json(_))));
    }

    #[test]
    fn test_schema_from_json() {
        let schema = Schema::from_json(&json!(["number", ["string", "nulled"], "*"])).unwrap();
        assert_eq!(schema.to_string(), "(number, string | nulled, *)");

        assert!(matches!(
            Schema::from_json(&json!("number")),
            Err(PolyError::InvalidRule { .. })
        ));
        assert!(matches!(
            Schema::from_json(&json!([1])),
            Err(PolyError::InvalidRule { .. })
        ));
        assert!(matches!(
            Schema::from_json(&json!([[["number"]]])),
            Err(PolyError::InvalidRule { .. })
        ));
        assert!(matches!(
            Schema::from_json(&json!([[]])),
            Err(PolyError::EmptyUnion)
        ));
    }
}
