//! Row values and the sources columns derive them from

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// One record of the bound dataset
pub type Row = serde_json::Map<String, Value>;

/// Closure deriving a value from a row
pub type DeriveFn = Arc<dyn Fn(&Row) -> Value + Send + Sync>;

static MARKUP_TAG: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<[^>]*>").expect("static markup pattern is valid")
});

/// Where a column reads one of its derived values from
#[derive(Clone)]
pub enum ValueSource {
    /// A fixed value, identical for every row
    Literal(Value),
    /// Another field of the same row
    Field(String),
    /// Computed from the whole row
    Derived(DeriveFn),
}

impl ValueSource {
    /// Reference another field of the row
    pub fn field(name: impl Into<String>) -> Self {
        ValueSource::Field(name.into())
    }

    /// Compute the value from the row
    pub fn derived<F>(f: F) -> Self
    where
        F: Fn(&Row) -> Value + Send + Sync + 'static,
    {
        ValueSource::Derived(Arc::new(f))
    }

    /// Resolve against a row
    ///
    /// A field reference whose field is absent from the row resolves to
    /// `None` so callers can fall through to the next candidate source.
    pub fn resolve(&self, row: &Row) -> Option<Value> {
        match self {
            ValueSource::Literal(value) => Some(value.clone()),
            ValueSource::Field(name) => row.get(name).cloned(),
            ValueSource::Derived(f) => Some(f(row)),
        }
    }

    pub fn is_derived(&self) -> bool {
        matches!(self, ValueSource::Derived(_))
    }
}

impl fmt::Debug for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueSource::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            ValueSource::Field(name) => f.debug_tuple("Field").field(name).finish(),
            ValueSource::Derived(_) => f.write_str("Derived(..)"),
        }
    }
}

impl From<&str> for ValueSource {
    fn from(name: &str) -> Self {
        ValueSource::Field(name.to_string())
    }
}

/// Render a value as plain text (`null` becomes the empty string)
pub fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        other => other.to_string(),
    }
}

/// Parse a value as a finite number
///
/// JSON numbers pass through, strings are trimmed and parsed. Anything else,
/// including booleans and empty strings, is non-numeric.
pub fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite()),
        Value::String(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            trimmed.parse::<f64>().ok().filter(|v| v.is_finite())
        }
        _ => None,
    }
}

/// Format a number without a trailing `.0` for integral values
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    value.to_string()
}

/// Strip markup tags and decode the common entities
pub fn strip_markup(markup: &str) -> String {
    let text = MARKUP_TAG.replace_all(markup, "");
    text.replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

/// Sort key of a value: the class it ranks in, then its position within it
enum SortKey<'a> {
    Number(f64),
    Bool(bool),
    Text(&'a str),
    Other(String),
}

impl SortKey<'_> {
    fn rank(&self) -> u8 {
        match self {
            SortKey::Number(_) => 0,
            SortKey::Bool(_) => 1,
            SortKey::Text(_) => 2,
            SortKey::Other(_) => 3,
        }
    }
}

fn sort_key(value: &Value) -> SortKey<'_> {
    match value {
        Value::Number(n) => SortKey::Number(n.as_f64().unwrap_or(0.0)),
        Value::String(s) => match value_number(value) {
            Some(n) => SortKey::Number(n),
            None => SortKey::Text(s),
        },
        Value::Bool(b) => SortKey::Bool(*b),
        other => SortKey::Other(other.to_string()),
    }
}

/// Order two non-null values
///
/// Values rank by class first: numbers and numeric strings, then booleans,
/// then other text, then arrays and objects. Within a class numbers compare
/// numerically, booleans with `false < true`, text lexicographically and
/// the rest by JSON text. The result is a total order on any mix of values.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    let (a, b) = (sort_key(a), sort_key(b));
    match (&a, &b) {
        (SortKey::Number(x), SortKey::Number(y)) => x.total_cmp(y),
        (SortKey::Bool(x), SortKey::Bool(y)) => x.cmp(y),
        (SortKey::Text(x), SortKey::Text(y)) => x.cmp(y),
        (SortKey::Other(x), SortKey::Other(y)) => x.cmp(y),
        _ => a.rank().cmp(&b.rank()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(value: Value) -> Row {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn test_field_source_missing_field() {
        let r = row(json!({"a": 1}));
        assert_eq!(ValueSource::field("a").resolve(&r), Some(json!(1)));
        assert_eq!(ValueSource::field("b").resolve(&r), None);
    }

    #[test]
    fn test_derived_source() {
        let r = row(json!({"first": "Ada", "last": "Lovelace"}));
        let source = ValueSource::derived(|row| {
            json!(format!("{} {}", value_text(&row["first"]), value_text(&row["last"])))
        });
        assert_eq!(source.resolve(&r), Some(json!("Ada Lovelace")));
    }

    #[test]
    fn test_value_number() {
        assert_eq!(value_number(&json!(10)), Some(10.0));
        assert_eq!(value_number(&json!(" 2.5 ")), Some(2.5));
        assert_eq!(value_number(&json!("x")), None);
        assert_eq!(value_number(&json!("")), None);
        assert_eq!(value_number(&json!(true)), None);
        assert_eq!(value_number(&Value::Null), None);
    }

    #[test]
    fn test_strip_markup() {
        assert_eq!(strip_markup("<b>Bold</b> &amp; <i>more</i>"), "Bold & more");
        assert_eq!(strip_markup("plain"), "plain");
    }

    #[test]
    fn test_compare_mixed() {
        assert_eq!(compare_values(&json!(2), &json!(10)), Ordering::Less);
        assert_eq!(compare_values(&json!("10"), &json!(9)), Ordering::Greater);
        assert_eq!(compare_values(&json!("b"), &json!("a")), Ordering::Greater);
        assert_eq!(compare_values(&json!(false), &json!(true)), Ordering::Less);
        assert_eq!(compare_values(&json!("9"), &json!("10")), Ordering::Less);
        assert_eq!(compare_values(&json!(10), &json!("10a")), Ordering::Less);
        assert_eq!(compare_values(&json!(true), &json!("abc")), Ordering::Less);
        assert_eq!(compare_values(&json!([1]), &json!("abc")), Ordering::Greater);
    }

    #[test]
    fn test_compare_is_transitive_on_mixed_values() {
        let values = [
            json!(10),
            json!("9"),
            json!("10a"),
            json!(" 2.5 "),
            json!(-1),
            json!(true),
            json!(false),
            json!("abc"),
            json!(""),
            json!([1, 2]),
            json!({"a": 1}),
        ];
        for a in &values {
            assert_eq!(compare_values(a, a), Ordering::Equal);
            for b in &values {
                assert_eq!(compare_values(a, b), compare_values(b, a).reverse());
                for c in &values {
                    if compare_values(a, b) != Ordering::Greater
                        && compare_values(b, c) != Ordering::Greater
                    {
                        assert_ne!(compare_values(a, c), Ordering::Greater, "{a} {b} {c}");
                    }
                }
            }
        }
    }

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(30.0), "30");
        assert_eq!(format_number(15.5), "15.5");
        assert_eq!(format_number(-0.0), "0");
    }
}
