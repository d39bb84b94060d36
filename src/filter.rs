//! Filter-expression compiler.
//!
//! Translates a structured query value into the platform's textual boolean
//! filter language. A pre-formed textual filter passes through unchanged.
//!
//! # Compilation Rules
//!
//! Applied per key/value pair at each mapping level, clauses joined with
//! `&&` and individually parenthesized:
//!
//! | Shape | Output |
//! |-------|--------|
//! | `$and: [..]` / `$or: [..]` | sub-filters joined with `&&` / `\|\|`, wrapped once |
//! | `{ $regex: "pat" }` or `{ $regex: ["pat", "gim"] }` | `key =~ /pat/gim`, `/` escaped as `\/` |
//! | `{ $lt \| $lte \| $gt \| $gte: lit }` | `key <op> <json-literal>` |
//! | anything else | `key == <json-literal>` |
//!
//! # Example
//!
//! ```
//! use flowthings::filter::Filter;
//! use serde_json::json;
//!
//! let filter = Filter::query(json!({"age": {"$gte": 5}}));
//! assert_eq!(filter.compile(), "(age >= 5)");
//! ```
//!
//! There are no error paths: malformed input compiles to a malformed but
//! syntactically valid string, matching the platform's own client
//! libraries.

// ============================================================================
// Imports
// ============================================================================

use std::fmt;

use serde_json::{Map, Value, json};

// ============================================================================
// Comparison Operators
// ============================================================================

/// Comparison operator keys in lookup order.
const COMPARISONS: [(&str, &str); 4] = [
    ("$lt", "<"),
    ("$lte", "<="),
    ("$gt", ">"),
    ("$gte", ">="),
];

// ============================================================================
// RegexFlags
// ============================================================================

/// Regex flags emitted in fixed `g`, `i`, `m` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegexFlags {
    /// Global match.
    pub global: bool,
    /// Case-insensitive match.
    pub case_insensitive: bool,
    /// Multiline match.
    pub multiline: bool,
}

impl RegexFlags {
    /// Creates an empty flag set.
    #[inline]
    #[must_use]
    pub const fn new() -> Self {
        Self {
            global: false,
            case_insensitive: false,
            multiline: false,
        }
    }

    /// Enables global matching.
    #[inline]
    #[must_use]
    pub const fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Enables case-insensitive matching.
    #[inline]
    #[must_use]
    pub const fn case_insensitive(mut self) -> Self {
        self.case_insensitive = true;
        self
    }

    /// Enables multiline matching.
    #[inline]
    #[must_use]
    pub const fn multiline(mut self) -> Self {
        self.multiline = true;
        self
    }
}

impl fmt::Display for RegexFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.global {
            f.write_str("g")?;
        }
        if self.case_insensitive {
            f.write_str("i")?;
        }
        if self.multiline {
            f.write_str("m")?;
        }
        Ok(())
    }
}

// ============================================================================
// Filter
// ============================================================================

/// A filter: either a pre-formed expression or a structured query value.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Pre-formed textual filter, passed through unchanged.
    Raw(String),
    /// Structured query value, compiled on use.
    Query(Value),
}

impl Filter {
    /// Creates a raw filter from a pre-formed expression.
    #[inline]
    #[must_use]
    pub fn raw(expr: impl Into<String>) -> Self {
        Self::Raw(expr.into())
    }

    /// Creates a filter from a structured query value.
    #[inline]
    #[must_use]
    pub fn query(value: Value) -> Self {
        Self::Query(value)
    }

    /// Builds a regex clause value: `{"$regex": [pattern, flags]}`.
    ///
    /// Embed it in a query under the key to match:
    ///
    /// ```
    /// use flowthings::filter::{Filter, RegexFlags};
    /// use serde_json::json;
    ///
    /// let clause = Filter::regex("^a/b", RegexFlags::new().case_insensitive());
    /// let filter = Filter::query(json!({"name": clause}));
    /// assert_eq!(filter.compile(), r"(name =~ /^a\/b/i)");
    /// ```
    #[must_use]
    pub fn regex(pattern: impl Into<String>, flags: RegexFlags) -> Value {
        json!({"$regex": [pattern.into(), flags.to_string()]})
    }

    /// Compiles to the textual filter expression.
    #[must_use]
    pub fn compile(&self) -> String {
        match self {
            Self::Raw(expr) => expr.clone(),
            Self::Query(value) => compile_value(value),
        }
    }
}

impl From<&str> for Filter {
    fn from(expr: &str) -> Self {
        Self::raw(expr)
    }
}

impl From<String> for Filter {
    fn from(expr: String) -> Self {
        Self::Raw(expr)
    }
}

impl From<Value> for Filter {
    fn from(value: Value) -> Self {
        Self::Query(value)
    }
}

// ============================================================================
// Compiler
// ============================================================================

/// Compiles one mapping level; non-mappings compile to an empty string.
fn compile_value(spec: &Value) -> String {
    let Some(map) = spec.as_object() else {
        return String::new();
    };
    compile_map(map)
}

fn compile_map(map: &Map<String, Value>) -> String {
    let mut clauses = Vec::with_capacity(map.len());

    for (key, val) in map {
        let clause = match key.as_str() {
            "$and" => combine(val, "&&"),
            "$or" => combine(val, "||"),
            _ => {
                if let Some(regex) = val.get("$regex") {
                    format!("{key} =~ {}", regex_literal(regex))
                } else if let Some((op, literal)) = comparison(val) {
                    format!("{key} {op} {literal}")
                } else {
                    format!("{key} == {}", json_literal(val))
                }
            }
        };
        clauses.push(format!("({clause})"));
    }

    clauses.join("&&")
}

/// Joins a sequence of sub-filters with the given logical operator.
fn combine(val: &Value, op: &str) -> String {
    let Some(items) = val.as_array() else {
        return String::new();
    };
    items
        .iter()
        .map(compile_value)
        .collect::<Vec<_>>()
        .join(op)
}

/// Returns the first matching comparison operator and its JSON literal.
fn comparison(val: &Value) -> Option<(&'static str, String)> {
    for (marker, op) in COMPARISONS {
        if let Some(literal) = val.get(marker) {
            return Some((op, json_literal(literal)));
        }
    }
    None
}

/// Builds a `/pattern/flags` literal from a `$regex` value.
///
/// Accepts a bare pattern string or a `[pattern, flags]` pair; `/` in the
/// pattern is escaped as `\/`.
fn regex_literal(regex: &Value) -> String {
    let (pattern, flags) = match regex {
        Value::Array(pair) => (
            pair.first().and_then(Value::as_str).unwrap_or_default(),
            pair.get(1).and_then(Value::as_str).unwrap_or_default(),
        ),
        other => (other.as_str().unwrap_or_default(), ""),
    };
    format!("/{}/{flags}", pattern.replace('/', "\\/"))
}

/// JSON-encodes a literal value.
fn json_literal(val: &Value) -> String {
    // Value serialization to a string cannot fail.
    serde_json::to_string(val).unwrap_or_default()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    use serde_json::json;

    #[test]
    fn test_equality_clause() {
        let filter = Filter::query(json!({"foo": "bar"}));
        assert_eq!(filter.compile(), r#"(foo == "bar")"#);
    }

    #[test]
    fn test_comparison_clauses() {
        assert_eq!(Filter::query(json!({"age": {"$gte": 5}})).compile(), "(age >= 5)");
        assert_eq!(Filter::query(json!({"age": {"$lt": 10}})).compile(), "(age < 10)");
        assert_eq!(Filter::query(json!({"age": {"$lte": 10}})).compile(), "(age <= 10)");
        assert_eq!(Filter::query(json!({"age": {"$gt": 0}})).compile(), "(age > 0)");
    }

    #[test]
    fn test_multiple_keys_joined_with_and() {
        let filter = Filter::query(json!({"foo": "bar", "age": {"$gte": 5}}));
        assert_eq!(filter.compile(), r#"(foo == "bar")&&(age >= 5)"#);
    }

    #[test]
    fn test_and_combinator() {
        let filter = Filter::query(json!({"$and": [{"a": 1}, {"b": 2}]}));
        assert_eq!(filter.compile(), "((a == 1)&&(b == 2))");
    }

    #[test]
    fn test_or_combinator() {
        let filter = Filter::query(json!({"$or": [{"a": 1}, {"b": 2}]}));
        assert_eq!(filter.compile(), "((a == 1)||(b == 2))");
    }

    #[test]
    fn test_nested_combinators() {
        let filter = Filter::query(json!({
            "$or": [{"a": {"$lt": 3}}, {"$and": [{"b": 2}, {"c": 3}]}]
        }));
        assert_eq!(filter.compile(), "((a < 3)||((b == 2)&&(c == 3)))");
    }

    #[test]
    fn test_regex_bare_pattern() {
        let filter = Filter::query(json!({"name": {"$regex": "^fl.w"}}));
        assert_eq!(filter.compile(), "(name =~ /^fl.w/)");
    }

    #[test]
    fn test_regex_pattern_with_flags() {
        let filter = Filter::query(json!({"name": {"$regex": ["^fl.w", "gim"]}}));
        assert_eq!(filter.compile(), "(name =~ /^fl.w/gim)");
    }

    #[test]
    fn test_regex_slash_escaping() {
        let filter = Filter::query(json!({"path": {"$regex": "/flow/a"}}));
        assert_eq!(filter.compile(), r"(path =~ /\/flow\/a/)");
    }

    #[test]
    fn test_regex_helper_flag_order() {
        let flags = RegexFlags::new().multiline().global().case_insensitive();
        // Fixed g/i/m order regardless of construction order.
        assert_eq!(flags.to_string(), "gim");

        let clause = Filter::regex("x", flags);
        assert_eq!(clause, json!({"$regex": ["x", "gim"]}));
    }

    #[test]
    fn test_raw_passthrough() {
        let filter = Filter::raw("(foo == 1)");
        assert_eq!(filter.compile(), "(foo == 1)");
    }

    #[test]
    fn test_array_literal_equality() {
        let filter = Filter::query(json!({"tags": ["a", "b"]}));
        assert_eq!(filter.compile(), r#"(tags == ["a","b"])"#);
    }

    #[test]
    fn test_non_mapping_compiles_empty() {
        assert_eq!(Filter::query(json!(42)).compile(), "");
    }
}
