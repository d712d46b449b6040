//! Dispatch tables and the registration builder.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::config::TableConfig;
use crate::error::{PolyError, PolyResult};
use crate::value::Value;

use super::result::Resolution;
use super::types::{IntoSchema, Schema};
use super::validate::validate;

/// A handler invoked with every argument of an accepted call.
pub type Handler = Arc<dyn Fn(&[Value]) -> Value + Send + Sync>;

/// A fallback invoked with no arguments.
pub type Fallback = Arc<dyn Fn() -> Value + Send + Sync>;

/// A schema paired with its handler.
#[derive(Clone)]
pub struct Binding {
    schema: Schema,
    handler: Handler,
}

impl Binding {
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Whether this binding's schema accepts `args`.
    pub fn test(&self, args: &[Value]) -> bool {
        validate(&self.schema, args)
    }

    /// Invokes the handler, regardless of whether the schema accepts `args`.
    pub fn run(&self, args: &[Value]) -> Value {
        (self.handler)(args)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Binding")
            .field("schema", &self.schema.to_string())
            .finish_non_exhaustive()
    }
}

/// An ordered set of bindings plus an optional fallback.
///
/// Bindings are tried in registration order and the first one whose schema
/// accepts the arguments wins. Registration order is the priority order, so
/// register the most specific schemas first.
///
/// ```rust,ignore
/// let mut table = DispatchTable::new();
/// table
///     .rule(["number"]).set(|args| cube(&args[0]))?
///     .rule(["number", "number"]).set(|args| area(&args[0], &args[1]))?
///     .fallback(|| Value::from("unsupported"));
///
/// assert_eq!(table.evaluate(&[Value::from(3)]), Some(Value::from(27)));
/// ```
#[derive(Clone, Default)]
pub struct DispatchTable {
    config: TableConfig,
    bindings: Vec<Binding>,
    fallback: Option<Fallback>,
}

impl DispatchTable {
    /// Creates an empty table with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: TableConfig) -> Self {
        Self {
            config,
            bindings: Vec::new(),
            fallback: None,
        }
    }

    pub fn config(&self) -> &TableConfig {
        &self.config
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn has_fallback(&self) -> bool {
        self.fallback.is_some()
    }

    /// Starts a binding for `schema`. The binding is appended once a handler
    /// is set; schema errors surface at that point.
    pub fn rule(&mut self, schema: impl IntoSchema) -> RuleBuilder<'_> {
        RuleBuilder {
            table: self,
            schema: schema.into_schema(),
        }
    }

    /// Sets the handler run when no binding accepts a call. Replaces any
    /// previous fallback.
    pub fn fallback<F>(&mut self, f: F) -> &mut Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.fallback = Some(Arc::new(f));
        self
    }

    /// Sets the fallback from a runtime value, which must be a function.
    pub fn fallback_value(&mut self, fallback: Value) -> PolyResult<&mut Self> {
        match fallback {
            Value::Function(function) => {
                self.fallback = Some(Arc::new(move || function.call(&[])));
                Ok(self)
            }
            other => Err(PolyError::InvalidFallback {
                found: other.type_name(),
            }),
        }
    }

    fn push(&mut self, schema: Schema, handler: Handler) -> &mut Self {
        debug!(
            "{}: registered binding #{} {}",
            self.config.name,
            self.bindings.len(),
            schema
        );
        self.bindings.push(Binding { schema, handler });
        self
    }

    /// Finds the first binding that accepts `args` without invoking it.
    pub fn find(&self, args: &[Value]) -> Option<(usize, &Binding)> {
        for (index, binding) in self.bindings.iter().enumerate() {
            if binding.test(args) {
                return Some((index, binding));
            }
            if self.config.trace_rejections {
                trace!(
                    "{}: binding #{} {} rejected {} argument(s)",
                    self.config.name,
                    index,
                    binding.schema,
                    args.len()
                );
            }
        }
        None
    }

    /// Resolves a call: runs the first accepting binding with all of `args`,
    /// otherwise the fallback with no arguments, otherwise nothing.
    pub fn resolve(&self, args: &[Value]) -> Resolution {
        if let Some((index, binding)) = self.find(args) {
            debug!(
                "{}: dispatching to binding #{} {}",
                self.config.name, index, binding.schema
            );
            return Resolution::Matched {
                index,
                value: binding.run(args),
            };
        }

        match &self.fallback {
            Some(fallback) => {
                debug!(
                    "{}: no binding matched {} argument(s), running fallback",
                    self.config.name,
                    args.len()
                );
                Resolution::Fallback(fallback())
            }
            None => {
                debug!(
                    "{}: no binding matched {} argument(s)",
                    self.config.name,
                    args.len()
                );
                Resolution::NoMatch
            }
        }
    }

    /// Resolves a call and returns the handler or fallback result.
    pub fn evaluate(&self, args: &[Value]) -> Option<Value> {
        self.resolve(args).into_value()
    }
}

impl fmt::Debug for DispatchTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DispatchTable")
            .field("config", &self.config)
            .field("bindings", &self.bindings)
            .field("has_fallback", &self.has_fallback())
            .finish()
    }
}

/// A binding under construction; see [`DispatchTable::rule`].
#[must_use = "a rule is only registered once a handler is set"]
pub struct RuleBuilder<'a> {
    table: &'a mut DispatchTable,
    schema: PolyResult<Schema>,
}

impl<'a> RuleBuilder<'a> {
    /// Appends the binding and returns the table for further chaining.
    pub fn set<F>(self, handler: F) -> PolyResult<&'a mut DispatchTable>
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        let RuleBuilder { table, schema } = self;
        Ok(table.push(schema?, Arc::new(handler)))
    }

    /// Appends the binding with a handler given as a runtime value. Only
    /// functions are accepted; classes and data values are rejected.
    pub fn set_value(self, handler: Value) -> PolyResult<&'a mut DispatchTable> {
        let RuleBuilder { table, schema } = self;
        let schema = schema?;
        match handler {
            Value::Function(function) => {
                Ok(table.push(schema, Arc::new(move |args: &[Value]| function.call(args))))
            }
            other => Err(PolyError::InvalidHandler {
                found: other.type_name(),
            }),
        }
    }
}
