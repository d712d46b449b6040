//! Polyfunc Probe
//!
//! Loads dispatch tables from JSON definitions and reports how argument
//! lists resolve against them.
//!
//! # Table definitions
//!
//! ```json
//! {
//!   "config": { "name": "area" },
//!   "rules": [ { "schema": ["number", ["string", "nulled"]], "label": "pair" } ],
//!   "fallback": "nothing matched"
//! }
//! ```
//!
//! Each rule's handler returns its label; the fallback returns its string.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value as Json;
use tracing::debug;

use polyfunc::{
    DispatchTable, PolyError, PolyResult, PrimitiveTag, Resolution, RuleToken, Schema,
    TableConfig, Value,
};

/// A dispatch table as written in a definition file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSpec {
    pub config: TableConfig,
    pub rules: Vec<RuleSpec>,
    pub fallback: Option<String>,
}

/// One binding of a [`TableSpec`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RuleSpec {
    /// Rules in JSON form: strings, or arrays of strings for unions.
    pub schema: Vec<Json>,
    /// Returned by the binding's handler.
    pub label: String,
}

impl TableSpec {
    pub fn from_json_str(source: &str) -> PolyResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// Builds the dispatch table. Fails on the first invalid rule.
    pub fn build(&self) -> PolyResult<DispatchTable> {
        let mut table = DispatchTable::with_config(self.config.clone());

        for rule in &self.rules {
            let tokens = rule
                .schema
                .iter()
                .map(RuleToken::from_json)
                .collect::<PolyResult<Vec<_>>>()?;
            let label = Value::from(rule.label.as_str());
            table
                .rule(Schema::new(tokens)?)
                .set(move |_| label.clone())?;
        }

        if let Some(fallback) = &self.fallback {
            let fallback = Value::from(fallback.as_str());
            table.fallback(move || fallback.clone());
        }

        debug!(
            "built table '{}' with {} binding(s), fallback: {}",
            table.config().name,
            table.len(),
            table.has_fallback()
        );
        Ok(table)
    }
}

/// Parses an argument list. A JSON array is the list itself; any other
/// document is a single argument.
pub fn parse_args(source: &str) -> PolyResult<Vec<Value>> {
    let json: Json = serde_json::from_str(source)?;
    Ok(match json {
        Json::Array(items) => items.into_iter().map(Value::from).collect(),
        other => vec![Value::from(other)],
    })
}

/// Whether one binding accepts an argument list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub index: usize,
    pub schema: String,
    pub accepted: bool,
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let verdict = if self.accepted { "accepts" } else { "rejects" };
        write!(f, "#{} {} {}", self.index, self.schema, verdict)
    }
}

/// Tests every binding against `args` without invoking any handler.
pub fn explain(table: &DispatchTable, args: &[Value]) -> Vec<Verdict> {
    table
        .bindings()
        .iter()
        .enumerate()
        .map(|(index, binding)| Verdict {
            index,
            schema: binding.schema().to_string(),
            accepted: binding.test(args),
        })
        .collect()
}

/// Renders a resolution as a single report line.
pub fn report(table: &DispatchTable, resolution: &Resolution) -> String {
    match resolution {
        Resolution::Matched { index, value } => {
            let schema = table
                .bindings()
                .get(*index)
                .map(|binding| binding.schema().to_string())
                .unwrap_or_default();
            format!("matched #{} {} -> {}", index, schema, value.to_json())
        }
        Resolution::Fallback(value) => format!("fallback -> {}", value.to_json()),
        Resolution::NoMatch => "no match".to_string(),
    }
}

/// What each primitive tag accepts, in grammar order.
pub fn describe_tag(tag: PrimitiveTag) -> &'static str {
    match tag {
        PrimitiveTag::String => "strings",
        PrimitiveTag::Symbol => "symbols",
        PrimitiveTag::Number => "numbers",
        PrimitiveTag::Boolean => "booleans",
        PrimitiveTag::Bigint => "big integers",
        PrimitiveTag::Array => "arrays",
        PrimitiveTag::Hash => "keyed aggregates that are not arrays",
        PrimitiveTag::Object => "any keyed aggregate, arrays included",
        PrimitiveTag::Nulled => "null, including an absent argument",
        PrimitiveTag::Regexp => "regular expressions",
        PrimitiveTag::Function => "functions that are not classes",
        PrimitiveTag::Class => "classes",
        PrimitiveTag::Functional => "functions and classes",
    }
}

/// The rule grammar, one line per form.
pub fn grammar() -> Vec<String> {
    let mut lines: Vec<String> = PrimitiveTag::ALL
        .into_iter()
        .map(|tag| format!("{:<12} {}", tag.name(), describe_tag(tag)))
        .collect();
    lines.push(format!("{:<12} {}", "*", "anything"));
    lines.push(format!("{:<12} {}", "T?", "whatever T accepts, plus null"));
    lines.push(format!("{:<12} {}", "[a, b]", "whatever any member accepts"));
    lines
}

/// Loads a table definition and resolves `args` against it.
pub fn probe(definition: &str, args: &str) -> PolyResult<String> {
    let table = TableSpec::from_json_str(definition)?.build()?;
    let args = parse_args(args)?;
    Ok(report(&table, &table.resolve(&args)))
}

/// Maps a library error to the part of the input it came from.
pub fn error_origin(error: &PolyError) -> &'static str {
    match error {
        PolyError::Json(_) => "JSON",
        PolyError::InvalidRule { .. } | PolyError::EmptyUnion | PolyError::NestedUnion { .. } => {
            "rule"
        }
        PolyError::InvalidHandler { .. } | PolyError::InvalidFallback { .. } => "handler",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const AREA: &str = r#"{
        "config": { "name": "area" },
        "rules": [
            { "schema": ["number"], "label": "square" },
            { "schema": ["number", "number"], "label": "rectangle" },
            { "schema": [["string", "nulled"]], "label": "named" }
        ],
        "fallback": "nothing matched"
    }"#;

    #[test]
    fn test_build_table() {
        let table = TableSpec::from_json_str(AREA).unwrap().build().unwrap();
        assert_eq!(table.config().name, "area");
        assert_eq!(table.len(), 3);
        assert!(table.has_fallback());
        assert_eq!(table.bindings()[2].schema().to_string(), "(string | nulled)");
    }

    #[test]
    fn test_defaults() {
        let spec = TableSpec::from_json_str("{}").unwrap();
        assert_eq!(spec.config, TableConfig::default());
        assert!(spec.rules.is_empty());
        assert!(spec.fallback.is_none());

        let table = spec.build().unwrap();
        assert_eq!(report(&table, &table.resolve(&[])), "no match");
    }

    #[test]
    fn test_probe_reports() {
        assert_eq!(probe(AREA, "[3]").unwrap(), r#"matched #0 (number) -> "square""#);
        assert_eq!(
            probe(AREA, "[3, 4]").unwrap(),
            r#"matched #1 (number, number) -> "rectangle""#
        );
        // Null matches the union binding before the fallback
        assert_eq!(
            probe(AREA, "null").unwrap(),
            r#"matched #2 (string | nulled) -> "named""#
        );
        assert_eq!(probe(AREA, "[true]").unwrap(), r#"fallback -> "nothing matched""#);
    }

    #[test]
    fn test_parse_args() {
        assert_eq!(parse_args("[1, null]").unwrap(), vec![Value::from(1), Value::Null]);
        assert_eq!(parse_args("\"x\"").unwrap(), vec![Value::from("x")]);
        assert_eq!(parse_args("[]").unwrap(), Vec::<Value>::new());
        assert!(matches!(parse_args("[1,"), Err(PolyError::Json(_))));
    }

    #[test]
    fn test_explain() {
        let table = TableSpec::from_json_str(AREA).unwrap().build().unwrap();
        let verdicts = explain(&table, &[Value::Null]);

        let lines: Vec<String> = verdicts.iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "#0 (number) rejects",
                "#1 (number, number) rejects",
                "#2 (string | nulled) accepts",
            ]
        );
    }

    #[test]
    fn test_invalid_rule_in_definition() {
        let definition = r#"{ "rules": [ { "schema": ["integer"], "label": "x" } ] }"#;
        let error = TableSpec::from_json_str(definition)
            .unwrap()
            .build()
            .unwrap_err();
        assert!(matches!(&error, PolyError::InvalidRule { rule } if rule == "integer"));
        assert_eq!(error_origin(&error), "rule");
    }

    #[test]
    fn test_grammar_lists_every_tag() {
        let lines = grammar();
        assert_eq!(lines.len(), PrimitiveTag::ALL.len() + 3);
        assert!(lines[0].starts_with("string "));
        assert!(lines.iter().any(|line| line.starts_with("T? ")));
    }
}
