//! Dispatch table configuration.

use serde::{Deserialize, Serialize};

/// Configuration for a [`DispatchTable`](crate::DispatchTable).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableConfig {
    /// Name of the table as it appears in log events.
    pub name: String,

    /// Emit a trace event for every binding rejected during resolution.
    pub trace_rejections: bool,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            name: "polyfunc".to_string(),
            trace_rejections: false,
        }
    }
}

impl TableConfig {
    /// Creates a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a default configuration with the given table name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}
