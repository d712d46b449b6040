//! Per-argument type classification.

use crate::value::Value;

use super::types::{PrimitiveTag, RuleToken};

/// Decides whether `value` satisfies `token`.
///
/// Absent arguments are classified as [`Value::Null`], so only nullable
/// tags, `nulled`, the wildcard, or a predicate that accepts null can be
/// satisfied by them.
pub fn classify(token: &RuleToken, value: &Value) -> bool {
    match token {
        RuleToken::Tag { tag, nullable } => {
            if *nullable && value.is_null() {
                return true;
            }
            tag.accepts(value)
        }
        RuleToken::Wildcard => true,
        // Instance relationship, not identity: subclasses match too.
        RuleToken::Class(class) => value.is_instance_of(class),
        RuleToken::Predicate(predicate) => predicate.test(value),
        RuleToken::Union(members) => members.iter().any(|member| classify(member, value)),
    }
}

impl PrimitiveTag {
    /// Whether a non-null-forgiving tag accepts `value`.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            PrimitiveTag::String => matches!(value, Value::String(_)),
            PrimitiveTag::Symbol => matches!(value, Value::Symbol(_)),
            PrimitiveTag::Number => matches!(value, Value::Number(_)),
            PrimitiveTag::Boolean => matches!(value, Value::Bool(_)),
            PrimitiveTag::Bigint => matches!(value, Value::BigInt(_)),
            PrimitiveTag::Array => matches!(value, Value::Array(_)),
            // Keyed aggregates that are not sequences. Regexps, null and
            // callables are never aggregates.
            PrimitiveTag::Hash => matches!(value, Value::Hash(_) | Value::Object(_)),
            PrimitiveTag::Object => {
                matches!(value, Value::Array(_) | Value::Hash(_) | Value::Object(_))
            }
            PrimitiveTag::Nulled => value.is_null(),
            PrimitiveTag::Regexp => matches!(value, Value::Regexp(_)),
            PrimitiveTag::Function => matches!(value, Value::Function(_)),
            PrimitiveTag::Class => matches!(value, Value::Class(_)),
            PrimitiveTag::Functional => value.is_callable(),
        }
    }
}
