//! Uniform "is this value empty?" checks.
//!
//! A value is empty when it is absent, `NaN`, `false`, an empty string, an
//! empty sequence or an empty map. Zero is **not** empty, and neither is a
//! sequence holding only empty values.

use std::collections::{BTreeMap, HashMap};

use serde_json::Value;

/// Types that can report whether they carry a meaningful value.
pub trait Emptiness {
    /// Returns `true` when the value counts as empty.
    fn is_empty_value(&self) -> bool;
}

impl Emptiness for Value {
    fn is_empty_value(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(flag) => !flag,
            Value::Number(number) => number.as_f64().is_some_and(f64::is_nan),
            Value::String(text) => text.is_empty(),
            Value::Array(items) => items.is_empty(),
            Value::Object(map) => map.is_empty(),
        }
    }
}

impl Emptiness for str {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for String {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl Emptiness for bool {
    fn is_empty_value(&self) -> bool {
        !*self
    }
}

impl Emptiness for f64 {
    fn is_empty_value(&self) -> bool {
        self.is_nan()
    }
}

impl<T: Emptiness> Emptiness for Option<T> {
    fn is_empty_value(&self) -> bool {
        self.is_none()
    }
}

impl<T> Emptiness for [T] {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T> Emptiness for Vec<T> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V, S> Emptiness for HashMap<K, V, S> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<K, V> Emptiness for BTreeMap<K, V> {
    fn is_empty_value(&self) -> bool {
        self.is_empty()
    }
}

impl<T: Emptiness + ?Sized> Emptiness for &T {
    fn is_empty_value(&self) -> bool {
        (**self).is_empty_value()
    }
}

/// Returns `true` when `value` is empty.
///
/// # Examples
/// ```
/// use service_utils::domain::is_empty;
/// use serde_json::json;
///
/// assert!(is_empty(&json!({})));
/// assert!(!is_empty(&json!(0)));
/// assert!(!is_empty(&json!([0])));
/// ```
pub fn is_empty<T: Emptiness + ?Sized>(value: &T) -> bool {
    value.is_empty_value()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(json!(null), true)]
    #[case(json!(false), true)]
    #[case(json!(""), true)]
    #[case(json!([]), true)]
    #[case(json!({}), true)]
    #[case(json!(0), false)]
    #[case(json!(0.0), false)]
    #[case(json!(true), false)]
    #[case(json!(" "), false)]
    #[case(json!([0]), false)]
    #[case(json!([null]), false)]
    #[case(json!({"a": null}), false)]
    fn json_values(#[case] value: Value, #[case] expected: bool) {
        assert_eq!(is_empty(&value), expected);
    }

    #[rstest]
    fn nan_is_empty_but_zero_is_not() {
        assert!(is_empty(&f64::NAN));
        assert!(!is_empty(&0.0_f64));
    }

    #[rstest]
    fn options_and_collections() {
        assert!(is_empty(&None::<String>));
        assert!(!is_empty(&Some(String::new())));
        assert!(is_empty(&Vec::<i32>::new()));
        assert!(!is_empty(&vec![0]));
        assert!(is_empty(&HashMap::<String, i32>::new()));
        assert!(is_empty(""));
        assert!(!is_empty("x"));
        assert!(is_empty(&false));
    }
}
