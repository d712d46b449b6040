//! Schema-based multiple dispatch.
//!
//! This module implements the resolution algorithm that selects which
//! handler to run based on the runtime kinds of all arguments of a call.
//!
//! # Algorithm Overview
//!
//! 1. **Walk bindings**: Try bindings in registration order
//! 2. **Check arity**: Drop trailing nulls beyond the schema, reject longer calls
//! 3. **Classify positions**: Every schema position must accept its argument
//!    (absent arguments count as null)
//! 4. **Select first**: Run the first accepting binding with all arguments;
//!    otherwise run the fallback, otherwise report no match
//!
//! Registration order is the priority order. There is no specificity
//! ranking and no ambiguity error: the earliest accepting binding wins.
//!
//! # Module Structure
//!
//! - [`types`] - Rule grammar (PrimitiveTag, RuleToken, Schema)
//! - [`classify`] - Per-argument classification
//! - [`validate`] - Schema validation and arity policy
//! - [`result`] - Resolution outcomes
//! - [`table`] - Dispatch table and registration builder
//! - [`shared`] - Read-copy-update wrapper for concurrent use

pub mod classify;
pub mod result;
pub mod shared;
pub mod table;
pub mod types;
pub mod validate;


pub use types::{IntoRule, IntoSchema, Predicate, PredicateFn, PrimitiveTag, RuleToken, Schema};

pub use classify::classify;

pub use validate::{effective_arity, validate};

pub use result::Resolution;

pub use table::{Binding, DispatchTable, Fallback, Handler, RuleBuilder};

pub use shared::SharedDispatchTable;
