//! Polyfunc: runtime, schema-based multiple dispatch.
//!
//! A [`DispatchTable`] holds an ordered list of bindings, each pairing a
//! [`Schema`] (one rule per positional argument) with a handler. Resolving a
//! call runs the first binding whose schema accepts the arguments, falls back
//! to an optional fallback handler otherwise, and reports
//! [`Resolution::NoMatch`] when neither applies.
//!
//! # Rule grammar
//!
//! A rule is written as a string, a class, a predicate, or a union:
//!
//! | rule | accepts |
//! |---|---|
//! | `"string"`, `"symbol"`, `"number"`, `"boolean"`, `"bigint"` | that primitive kind |
//! | `"array"` | sequences |
//! | `"hash"` | keyed aggregates that are not sequences |
//! | `"object"` | any keyed aggregate, sequences included |
//! | `"nulled"` | null, including an absent argument |
//! | `"regexp"` | compiled regular expressions |
//! | `"function"` | callables that are not classes |
//! | `"class"` | class definitions |
//! | `"functional"` | functions and classes |
//! | `"*"` | anything |
//! | `"T?"` | whatever `"T"` accepts, plus null |
//! | a [`ClassRef`] | instances of the class or a subclass |
//! | a [`Predicate`] | values the predicate returns true for |
//! | `["a", "b"]` | values any member accepts |
//!
//! String rules are checked when the binding is registered; an unknown tag
//! makes [`RuleBuilder::set`] fail with [`PolyError::InvalidRule`].
//!
//! # Example
//!
//! ```rust,ignore
//! use polyfunc::{DispatchTable, Value};
//!
//! let mut table = DispatchTable::new();
//! table
//!     .rule(["string", "number?"]).set(|args| Value::from(format!("{:?}", args)))?
//!     .rule([["array", "hash"]]).set(|_| Value::from("aggregate"))?
//!     .fallback(|| Value::from("nothing"));
//!
//! assert_eq!(table.evaluate(&[Value::from("x")]), Some(Value::from("[String(\"x\")]")));
//! assert_eq!(table.evaluate(&[Value::from(1)]), Some(Value::from("nothing")));
//! ```

pub mod config;
pub mod dispatch;
pub mod error;
pub mod json;
pub mod value;

pub use config::TableConfig;
pub use error::{PolyError, PolyResult};
pub use value::{Ancestors, ClassRef, Fields, Function, Instance, NativeFn, Symbol, Value};

pub use dispatch::{
    classify, effective_arity, validate, Binding, DispatchTable, Fallback, Handler, IntoRule,
    IntoSchema, Predicate, PredicateFn, PrimitiveTag, Resolution, RuleBuilder, RuleToken, Schema,
    SharedDispatchTable,
};
