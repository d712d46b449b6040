//! Rule grammar: primitive tags, rule tokens and schemas.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::{PolyError, PolyResult};
use crate::value::{ClassRef, Value};

/// The closed set of primitive type tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PrimitiveTag {
    String,
    Symbol,
    Number,
    Boolean,
    Bigint,
    Array,
    /// Keyed aggregate that is not a sequence.
    Hash,
    /// Any keyed aggregate, sequences included.
    Object,
    /// The nulled sentinel.
    Nulled,
    Regexp,
    /// A callable that is not a class.
    Function,
    /// A class definition.
    Class,
    /// Any callable, class or function.
    Functional,
}

impl PrimitiveTag {
    /// Every tag, in grammar order.
    pub const ALL: [PrimitiveTag; 13] = [
        PrimitiveTag::String,
        PrimitiveTag::Symbol,
        PrimitiveTag::Number,
        PrimitiveTag::Boolean,
        PrimitiveTag::Bigint,
        PrimitiveTag::Array,
        PrimitiveTag::Hash,
        PrimitiveTag::Object,
        PrimitiveTag::Nulled,
        PrimitiveTag::Regexp,
        PrimitiveTag::Function,
        PrimitiveTag::Class,
        PrimitiveTag::Functional,
    ];

    /// The tag as written in a rule string.
    pub fn name(self) -> &'static str {
        match self {
            PrimitiveTag::String => "string",
            PrimitiveTag::Symbol => "symbol",
            PrimitiveTag::Number => "number",
            PrimitiveTag::Boolean => "boolean",
            PrimitiveTag::Bigint => "bigint",
            PrimitiveTag::Array => "array",
            PrimitiveTag::Hash => "hash",
            PrimitiveTag::Object => "object",
            PrimitiveTag::Nulled => "nulled",
            PrimitiveTag::Regexp => "regexp",
            PrimitiveTag::Function => "function",
            PrimitiveTag::Class => "class",
            PrimitiveTag::Functional => "functional",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|tag| tag.name() == name)
    }
}

impl fmt::Display for PrimitiveTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Signature of a predicate rule.
pub type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;

/// An arbitrary test over a single argument.
#[derive(Clone)]
pub struct Predicate {
    name: Option<Arc<str>>,
    test: Arc<PredicateFn>,
}

impl Predicate {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: None,
            test: Arc::new(f),
        }
    }

    /// A predicate rendered as `name` in schema displays.
    pub fn named<F>(name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name: Some(name.into()),
            test: Arc::new(f),
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn test(&self, value: &Value) -> bool {
        (self.test)(value)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "Predicate({})", name),
            None => write!(f, "Predicate(<anonymous>)"),
        }
    }
}

/// One type-matching instruction for a single argument position.
#[derive(Debug, Clone)]
pub enum RuleToken {
    /// A primitive tag, optionally accepting the nulled sentinel (`"T?"`).
    Tag { tag: PrimitiveTag, nullable: bool },
    /// `*`: accepts anything, including absence.
    Wildcard,
    /// Accepts instances of the class and of its subclasses.
    Class(ClassRef),
    Predicate(Predicate),
    /// Accepts when any member accepts. Members are never unions.
    Union(Vec<RuleToken>),
}

impl RuleToken {
    pub fn tag(tag: PrimitiveTag) -> Self {
        RuleToken::Tag {
            tag,
            nullable: false,
        }
    }

    /// The `"T?"` form of a tag.
    pub fn nullable(tag: PrimitiveTag) -> Self {
        RuleToken::Tag {
            tag,
            nullable: true,
        }
    }

    pub fn class(class: &ClassRef) -> Self {
        RuleToken::Class(class.clone())
    }

    pub fn predicate<F>(f: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        RuleToken::Predicate(Predicate::new(f))
    }

    /// Builds a union from any sequence of rules.
    pub fn union<I>(members: I) -> PolyResult<Self>
    where
        I: IntoIterator,
        I::Item: IntoRule,
    {
        let members = members
            .into_iter()
            .map(IntoRule::into_rule)
            .collect::<PolyResult<Vec<_>>>()?;
        let union = RuleToken::Union(members);
        union.check()?;
        Ok(union)
    }

    /// Parses the string form of a rule: a tag name with an optional
    /// trailing `?`, or `*`.
    pub fn parse(rule: &str) -> PolyResult<Self> {
        let (base, nullable) = match rule.strip_suffix('?') {
            Some(base) => (base, true),
            None => (rule, false),
        };

        if base == "*" {
            return Ok(RuleToken::Wildcard);
        }

        PrimitiveTag::from_name(base)
            .map(|tag| RuleToken::Tag { tag, nullable })
            .ok_or_else(|| PolyError::InvalidRule {
                rule: rule.to_string(),
            })
    }

    pub fn is_union(&self) -> bool {
        matches!(self, RuleToken::Union(_))
    }

    /// Checks the structural invariants of a token: unions are non-empty
    /// and flat.
    pub fn check(&self) -> PolyResult<()> {
        let RuleToken::Union(members) = self else {
            return Ok(());
        };
        if members.is_empty() {
            return Err(PolyError::EmptyUnion);
        }
        if let Some(nested) = members.iter().find(|m| m.is_union()) {
            return Err(PolyError::NestedUnion {
                rule: nested.to_string(),
            });
        }
        Ok(())
    }
}

impl FromStr for RuleToken {
    type Err = PolyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RuleToken::parse(s)
    }
}

impl fmt::Display for RuleToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RuleToken::Tag { tag, nullable } => {
                write!(f, "{}", tag)?;
                if *nullable {
                    f.write_str("?")?;
                }
                Ok(())
            }
            RuleToken::Wildcard => f.write_str("*"),
            RuleToken::Class(class) => write!(f, "{}", class),
            RuleToken::Predicate(p) => f.write_str(p.name().unwrap_or("<predicate>")),
            RuleToken::Union(members) => {
                for (i, member) in members.iter().enumerate() {
                    if i > 0 {
                        f.write_str(" | ")?;
                    }
                    write!(f, "{}", member)?;
                }
                Ok(())
            }
        }
    }
}

/// Conversion into a single rule token.
///
/// Strings are parsed with [`RuleToken::parse`]; arrays and vectors become
/// unions of their elements.
pub trait IntoRule {
    fn into_rule(self) -> PolyResult<RuleToken>;
}

impl IntoRule for RuleToken {
    fn into_rule(self) -> PolyResult<RuleToken> {
        self.check()?;
        Ok(self)
    }
}

impl IntoRule for PolyResult<RuleToken> {
    fn into_rule(self) -> PolyResult<RuleToken> {
        self.and_then(IntoRule::into_rule)
    }
}

impl IntoRule for &str {
    fn into_rule(self) -> PolyResult<RuleToken> {
        RuleToken::parse(self)
    }
}

impl IntoRule for String {
    fn into_rule(self) -> PolyResult<RuleToken> {
        RuleToken::parse(&self)
    }
}

impl IntoRule for PrimitiveTag {
    fn into_rule(self) -> PolyResult<RuleToken> {
        Ok(RuleToken::tag(self))
    }
}

impl IntoRule for ClassRef {
    fn into_rule(self) -> PolyResult<RuleToken> {
        Ok(RuleToken::Class(self))
    }
}

impl IntoRule for &ClassRef {
    fn into_rule(self) -> PolyResult<RuleToken> {
        Ok(RuleToken::class(self))
    }
}

impl IntoRule for Predicate {
    fn into_rule(self) -> PolyResult<RuleToken> {
        Ok(RuleToken::Predicate(self))
    }
}

impl<T: IntoRule, const N: usize> IntoRule for [T; N] {
    fn into_rule(self) -> PolyResult<RuleToken> {
        RuleToken::union(self)
    }
}

impl<T: IntoRule> IntoRule for Vec<T> {
    fn into_rule(self) -> PolyResult<RuleToken> {
        RuleToken::union(self)
    }
}

/// An ordered sequence of rule tokens, one per positional argument.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    rules: Vec<RuleToken>,
}

impl Schema {
    /// Creates a schema, checking every token's invariants.
    pub fn new(rules: Vec<RuleToken>) -> PolyResult<Self> {
        for rule in &rules {
            rule.check()?;
        }
        Ok(Self { rules })
    }

    /// A schema that accepts only calls without (non-null) arguments.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Collects already-converted rules, failing on the first error.
    pub fn try_from_rules(rules: Vec<PolyResult<RuleToken>>) -> PolyResult<Self> {
        Self::new(rules.into_iter().collect::<PolyResult<Vec<_>>>()?)
    }

    pub fn rules(&self) -> &[RuleToken] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RuleToken> {
        self.rules.iter()
    }
}

impl<'a> IntoIterator for &'a Schema {
    type Item = &'a RuleToken;
    type IntoIter = std::slice::Iter<'a, RuleToken>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

impl fmt::Display for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        for (i, rule) in self.rules.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", rule)?;
        }
        f.write_str(")")
    }
}

/// Conversion into a schema, accepted by [`DispatchTable::rule`].
///
/// [`DispatchTable::rule`]: crate::DispatchTable::rule
pub trait IntoSchema {
    fn into_schema(self) -> PolyResult<Schema>;
}

impl IntoSchema for Schema {
    fn into_schema(self) -> PolyResult<Schema> {
        Ok(self)
    }
}

impl IntoSchema for PolyResult<Schema> {
    fn into_schema(self) -> PolyResult<Schema> {
        self
    }
}

impl IntoSchema for () {
    fn into_schema(self) -> PolyResult<Schema> {
        Ok(Schema::empty())
    }
}

impl<T: IntoRule, const N: usize> IntoSchema for [T; N] {
    fn into_schema(self) -> PolyResult<Schema> {
        Schema::try_from_rules(self.into_iter().map(IntoRule::into_rule).collect())
    }
}

impl<T: IntoRule> IntoSchema for Vec<T> {
    fn into_schema(self) -> PolyResult<Schema> {
        Schema::try_from_rules(self.into_iter().map(IntoRule::into_rule).collect())
    }
}

/// Builds a [`Schema`] from heterogeneous rules.
///
/// Each argument is anything implementing [`IntoRule`]; a nested array
/// becomes a union. Evaluates to `PolyResult<Schema>`, which can be handed
/// straight to [`DispatchTable::rule`](crate::DispatchTable::rule).
///
/// ```rust,ignore
/// let point = ClassRef::new("Point");
/// table.rule(schema![&point, ["string", "nulled"], "*"]).set(|args| args[0].clone())?;
/// ```
#[macro_export]
macro_rules! schema {
    () => {
        $crate::Schema::new(::std::vec::Vec::new())
    };
    ($($rule:expr),+ $(,)?) => {
        $crate::Schema::try_from_rules(::std::vec![$($crate::IntoRule::into_rule($rule)),+])
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tags() {
        for tag in PrimitiveTag::ALL {
            let plain = RuleToken::parse(tag.name()).unwrap();
            assert!(matches!(plain, RuleToken::Tag { tag: t, nullable: false } if t == tag));

            let nullable = RuleToken::parse(&format!("{}?", tag)).unwrap();
            assert!(matches!(nullable, RuleToken::Tag { tag: t, nullable: true } if t == tag));
        }
    }

    #[test]
    fn test_parse_wildcard() {
        assert!(matches!(RuleToken::parse("*").unwrap(), RuleToken::Wildcard));
        assert!(matches!(RuleToken::parse("*?").unwrap(), RuleToken::Wildcard));
    }

    #[test]
    fn test_parse_invalid() {
        for rule in ["", "?", "int", "number??", " number", "Number", "null", "string | number"] {
            match RuleToken::parse(rule) {
                Err(PolyError::InvalidRule { rule: r }) => assert_eq!(r, rule),
                other => panic!("Expected InvalidRule for {:?}, got {:?}", rule, other),
            }
        }
    }

    #[test]
    fn test_union_invariants() {
        assert!(matches!(
            RuleToken::union(Vec::<&str>::new()),
            Err(PolyError::EmptyUnion)
        ));

        let nested = RuleToken::Union(vec![
            RuleToken::tag(PrimitiveTag::String),
            RuleToken::Union(vec![RuleToken::tag(PrimitiveTag::Number)]),
        ]);
        assert!(matches!(nested.check(), Err(PolyError::NestedUnion { .. })));
        assert!(matches!(
            Schema::new(vec![nested]),
            Err(PolyError::NestedUnion { .. })
        ));

        // Arrays nested inside a union array are nested unions too
        let result = [vec!["string"], vec!["number"]].into_rule();
        assert!(matches!(result, Err(PolyError::NestedUnion { .. })));
    }

    #[test]
    fn test_schema_display() {
        let point = ClassRef::new("Point");
        let schema = schema![
            "number",
            ["string", "nulled"],
            &point,
            Predicate::named("even", |_| true),
            RuleToken::predicate(|_| true),
            "*",
            "hash?",
        ]
        .unwrap();

        assert_eq!(
            schema.to_string(),
            "(number, string | nulled, Point, even, <predicate>, *, hash?)"
        );
        assert_eq!(schema.len(), 7);
        assert_eq!(Schema::empty().to_string(), "()");
    }

    #[test]
    fn test_into_schema_forms() {
        assert_eq!(["number", "string"].into_schema().unwrap().len(), 2);
        assert_eq!(vec![["string", "nulled"]].into_schema().unwrap().len(), 1);
        assert!(().into_schema().unwrap().is_empty());
        assert!(matches!(
            ["number", "numbr"].into_schema(),
            Err(PolyError::InvalidRule { .. })
        ));
        assert!(matches!(schema!["number", "bogus"], Err(PolyError::InvalidRule { .. })));
        assert!(schema![].unwrap().is_empty());
    }

    #[test]
    fn test_from_name_round_trips_display() {
        for tag in PrimitiveTag::ALL {
            assert_eq!(PrimitiveTag::from_name(&tag.to_string()), Some(tag));
        }
        assert_eq!(PrimitiveTag::from_name("null"), None);
    }
}
