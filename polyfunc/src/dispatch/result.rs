//! Dispatch resolution outcomes.

use crate::value::Value;

/// Result of resolving a call against a dispatch table.
///
/// `NoMatch` is a first-class outcome, distinct from a handler that
/// returned [`Value::Null`].
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The binding at `index` accepted the arguments and returned `value`.
    Matched { index: usize, value: Value },
    /// No binding accepted; the fallback returned this value.
    Fallback(Value),
    /// No binding accepted and no fallback is set.
    NoMatch,
}

impl Resolution {
    /// Whether a binding accepted the call.
    pub fn is_match(&self) -> bool {
        matches!(self, Resolution::Matched { .. })
    }

    pub fn is_no_match(&self) -> bool {
        matches!(self, Resolution::NoMatch)
    }

    /// Index of the binding that accepted the call.
    pub fn index(&self) -> Option<usize> {
        match self {
            Resolution::Matched { index, .. } => Some(*index),
            _ => None,
        }
    }

    pub fn value(&self) -> Option<&Value> {
        match self {
            Resolution::Matched { value, .. } | Resolution::Fallback(value) => Some(value),
            Resolution::NoMatch => None,
        }
    }

    /// The handler or fallback result, `None` when nothing ran.
    pub fn into_value(self) -> Option<Value> {
        match self {
            Resolution::Matched { value, .. } | Resolution::Fallback(value) => Some(value),
            Resolution::NoMatch => None,
        }
    }
}
