//! Safe navigation through loosely structured JSON.
//!
//! [`Maybe`] wraps a possibly-absent borrowed [`Value`]. Every accessor
//! returns another `Maybe`, so deep lookups chain without intermediate
//! checks and collapse to [`Maybe::Absent`] at the first missing segment.

use serde_json::Value;

/// A present JSON value or the absent marker.
///
/// # Examples
/// ```
/// use service_utils::domain::Maybe;
/// use serde_json::json;
///
/// let doc = json!({"user": {"emails": ["a@example.com"]}});
/// let first = Maybe::new(&doc).key("user").key("emails").at(0);
/// assert_eq!(first.as_str(), Some("a@example.com"));
/// assert!(Maybe::new(&doc).key("missing").key("deeper").is_absent());
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Maybe<'a> {
    /// A value exists at this position.
    Present(&'a Value),
    /// Some segment of the path was missing.
    Absent,
}

impl<'a> Maybe<'a> {
    /// Wrap a root value. JSON `null` counts as absent.
    pub fn new(value: &'a Value) -> Self {
        if value.is_null() {
            Self::Absent
        } else {
            Self::Present(value)
        }
    }

    /// Wrap an optional root value.
    pub fn from_option(value: Option<&'a Value>) -> Self {
        value.map_or(Self::Absent, Self::new)
    }

    /// Descend into an object field.
    #[must_use]
    pub fn key(self, name: &str) -> Self {
        match self {
            Self::Present(value) => Self::from_option(value.get(name)),
            Self::Absent => Self::Absent,
        }
    }

    /// Descend into an array element.
    #[must_use]
    pub fn at(self, index: usize) -> Self {
        match self {
            Self::Present(value) => Self::from_option(value.get(index)),
            Self::Absent => Self::Absent,
        }
    }

    /// Follow a dotted path such as `"orders.0.id"`.
    ///
    /// Numeric segments index arrays and are tried as object keys otherwise.
    #[must_use]
    pub fn path(self, path: &str) -> Self {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .fold(self, |current, segment| match current {
                Self::Present(Value::Array(_)) => segment
                    .parse::<usize>()
                    .map_or(Self::Absent, |index| current.at(index)),
                _ => current.key(segment),
            })
    }

    /// Returns `true` when a value is present.
    pub fn is_present(&self) -> bool {
        matches!(self, Self::Present(_))
    }

    /// Returns `true` at the absent marker.
    pub fn is_absent(&self) -> bool {
        !self.is_present()
    }

    /// Unwrap into a plain option.
    pub fn value(self) -> Option<&'a Value> {
        match self {
            Self::Present(value) => Some(value),
            Self::Absent => None,
        }
    }

    /// Unwrap, substituting `fallback` at the absent marker.
    pub fn or(self, fallback: &'a Value) -> &'a Value {
        self.value().unwrap_or(fallback)
    }

    /// The present value as a string slice.
    pub fn as_str(self) -> Option<&'a str> {
        self.value().and_then(Value::as_str)
    }

    /// The present value as a signed integer.
    pub fn as_i64(self) -> Option<i64> {
        self.value().and_then(Value::as_i64)
    }

    /// The present value as a boolean.
    pub fn as_bool(self) -> Option<bool> {
        self.value().and_then(Value::as_bool)
    }
}

impl<'a> From<Option<&'a Value>> for Maybe<'a> {
    fn from(value: Option<&'a Value>) -> Self {
        Self::from_option(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};
    use serde_json::json;

    #[fixture]
    fn doc() -> Value {
        json!({
            "order": {
                "id": 7,
                "paid": false,
                "lines": [{"sku": "A-1"}, {"sku": "B-2"}],
                "note": null,
                "10": "numeric key"
            }
        })
    }

    #[rstest]
    fn chained_accessors_reach_nested_values(doc: Value) {
        let sku = Maybe::new(&doc).key("order").key("lines").at(1).key("sku");
        assert_eq!(sku.as_str(), Some("B-2"));
    }

    #[rstest]
    #[case("order.id", Some(json!(7)))]
    #[case("order.lines.0.sku", Some(json!("A-1")))]
    #[case("order.10", Some(json!("numeric key")))]
    #[case("order.lines.x", None)]
    #[case("order.lines.5.sku", None)]
    #[case("order.note", None)]
    #[case("order.note.deeper", None)]
    #[case("missing.a.b.c", None)]
    fn path_navigation(doc: Value, #[case] path: &str, #[case] expected: Option<Value>) {
        assert_eq!(Maybe::new(&doc).path(path).value(), expected.as_ref());
    }

    #[rstest]
    fn falsy_values_stay_present(doc: Value) {
        let paid = Maybe::new(&doc).path("order.paid");
        assert!(paid.is_present());
        assert_eq!(paid.as_bool(), Some(false));
    }

    #[rstest]
    fn or_substitutes_fallback(doc: Value) {
        let fallback = json!("none");
        assert_eq!(Maybe::new(&doc).key("nope").or(&fallback), &fallback);
        assert_eq!(Maybe::new(&doc).path("order.id").as_i64(), Some(7));
    }
}
