//! Schema validation against a call's argument list.
//!
//! Arity policy: a schema may be longer than the argument list, with
//! missing arguments classified as null. An argument list longer than the
//! schema is accepted only if the excess is made of trailing nulls, which
//! are dropped before checking.

use crate::value::Value;

use super::classify::classify;
use super::types::Schema;

static ABSENT: Value = Value::Null;

/// Number of arguments that take part in validation, or `None` if the call
/// has more meaningful arguments than the schema has positions.
pub fn effective_arity(schema: &Schema, args: &[Value]) -> Option<usize> {
    let mut len = args.len();
    if len > schema.len() {
        while len > 0 && args[len - 1].is_null() {
            len -= 1;
        }
        if len > schema.len() {
            return None;
        }
    }
    Some(len)
}

/// Returns true if every schema position accepts the argument at that
/// position.
pub fn validate(schema: &Schema, args: &[Value]) -> bool {
    let Some(arity) = effective_arity(schema, args) else {
        return false;
    };
    let args = &args[..arity];

    // A union position is a single classify call: `classify` accepts a
    // union when any member does, and a failing position rejects the schema.
    schema
        .iter()
        .enumerate()
        .all(|(i, rule)| classify(rule, args.get(i).unwrap_or(&ABSENT)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema;

    fn args<const N: usize>(values: [Value; N]) -> Vec<Value> {
        values.into()
    }

    #[test]
    fn test_exact_arity() {
        let schema = schema!["number", "string"].unwrap();
        assert!(validate(&schema, &args([Value::from(1), Value::from("a")])));
        assert!(!validate(&schema, &args([Value::from("a"), Value::from(1)])));
    }

    #[test]
    fn test_excess_arguments_rejected() {
        let schema = schema!["number"].unwrap();
        assert!(!validate(&schema, &args([Value::from(1), Value::from(2)])));
        assert_eq!(effective_arity(&schema, &args([Value::from(1), Value::from(2)])), None);
    }

    #[test]
    fn test_trailing_nulls_trimmed() {
        let schema = schema!["number"].unwrap();
        let call = args([Value::from(1), Value::Null, Value::Null]);
        assert_eq!(effective_arity(&schema, &call), Some(1));
        assert!(validate(&schema, &call));

        // Only trailing nulls are dropped
        let call = args([Value::from(1), Value::Null, Value::from(3)]);
        assert!(!validate(&schema, &call));
    }

    #[test]
    fn test_trimming_can_expose_absent_positions() {
        // [null, null] against ("string"): both trimmed, position 0 absent
        let schema = schema!["string"].unwrap();
        assert!(!validate(&schema, &args([Value::Null, Value::Null])));

        let schema = schema!["string?"].unwrap();
        assert!(validate(&schema, &args([Value::Null, Value::Null])));
    }

    #[test]
    fn test_missing_arguments_are_null() {
        let schema = schema!["number", "string?"].unwrap();
        assert!(validate(&schema, &args([Value::from(1)])));

        let schema = schema!["number", "string"].unwrap();
        assert!(!validate(&schema, &args([Value::from(1)])));

        let schema = schema!["number", "*"].unwrap();
        assert!(validate(&schema, &args([Value::from(1)])));
    }

    #[test]
    fn test_union_does_not_short_circuit_later_positions() {
        let schema = schema![["string", "nulled"], "number"].unwrap();
        assert!(validate(&schema, &args([Value::from("s"), Value::from(1)])));
        assert!(!validate(&schema, &args([Value::from("s"), Value::from("t")])));
        assert!(!validate(&schema, &args([Value::from("s")])));
    }

    #[test]
    fn test_failing_union_rejects() {
        let schema = schema![["string", "nulled"], "*"].unwrap();
        assert!(!validate(&schema, &args([Value::from(1)])));
    }

    #[test]
    fn test_empty_schema() {
        let schema = schema![].unwrap();
        assert!(validate(&schema, &[]));
        assert!(validate(&schema, &args([Value::Null])));
        assert!(!validate(&schema, &args([Value::from(0)])));
    }
}
