//! Ordered pairs and longest-input zipping.

use std::fmt;

use serde::Serialize;
use serde_json::Value;

/// Ordered two-element tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Pair<A, B>(pub A, pub B);

impl<A, B> Pair<A, B> {
    /// Build a pair.
    pub fn new(first: A, second: B) -> Self {
        Self(first, second)
    }

    /// First element.
    pub fn first(&self) -> &A {
        &self.0
    }

    /// Second element.
    pub fn second(&self) -> &B {
        &self.1
    }

    /// Convert into a plain tuple.
    pub fn into_tuple(self) -> (A, B) {
        (self.0, self.1)
    }
}

impl<A: Serialize, B: Serialize> Pair<A, B> {
    /// Render both elements joined by `separator`.
    ///
    /// Strings and numbers render verbatim; anything else renders as compact
    /// JSON.
    ///
    /// # Examples
    /// ```
    /// use service_utils::domain::Pair;
    ///
    /// assert_eq!(Pair::new("user", 42).join(":"), "user:42");
    /// assert_eq!(Pair::new(vec![1, 2], true).join("|"), "[1,2]|true");
    /// ```
    pub fn join(&self, separator: &str) -> String {
        format!(
            "{}{separator}{}",
            render_element(&self.0),
            render_element(&self.1)
        )
    }
}

impl<A: Serialize, B: Serialize> fmt::Display for Pair<A, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.join(","))
    }
}

impl<A, B> From<(A, B)> for Pair<A, B> {
    fn from((first, second): (A, B)) -> Self {
        Self(first, second)
    }
}

fn render_element<T: Serialize>(element: &T) -> String {
    match serde_json::to_value(element) {
        Ok(Value::String(text)) => text,
        Ok(Value::Number(number)) => number.to_string(),
        Ok(other) => other.to_string(),
        Err(_) => String::new(),
    }
}

/// Zip `N` sequences to the length of the longest one.
///
/// Tuple `i` holds element `i` of every input, with `None` standing in for
/// positions past the end of a shorter input.
///
/// # Examples
/// ```
/// use service_utils::domain::pack;
///
/// let packed = pack(&[&[1, 2, 3][..], &[10, 20][..]]);
/// assert_eq!(
///     packed,
///     vec![
///         vec![Some(1), Some(10)],
///         vec![Some(2), Some(20)],
///         vec![Some(3), None],
///     ]
/// );
/// ```
pub fn pack<T: Clone>(sequences: &[&[T]]) -> Vec<Vec<Option<T>>> {
    let longest = sequences.iter().map(|seq| seq.len()).max().unwrap_or(0);
    (0..longest)
        .map(|index| {
            sequences
                .iter()
                .map(|seq| seq.get(index).cloned())
                .collect()
        })
        .collect()
}

/// Zip two sequences of different element types to the longer length.
pub fn pack_pairs<A: Clone, B: Clone>(left: &[A], right: &[B]) -> Vec<Pair<Option<A>, Option<B>>> {
    let longest = left.len().max(right.len());
    (0..longest)
        .map(|index| Pair(left.get(index).cloned(), right.get(index).cloned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn pack_fills_short_inputs_with_absent_marker() {
        let numbers = [json!(1), json!(2), json!(3)];
        let letters = [json!("a"), json!("b")];
        let packed = pack(&[&numbers[..], &letters[..]]);
        assert_eq!(
            packed,
            vec![
                vec![Some(json!(1)), Some(json!("a"))],
                vec![Some(json!(2)), Some(json!("b"))],
                vec![Some(json!(3)), None],
            ]
        );
    }

    #[rstest]
    fn pack_keeps_falsy_values_distinct_from_absent() {
        let flags = [false, false];
        let more = [true];
        let packed = pack(&[&flags[..], &more[..]]);
        assert_eq!(packed[1], vec![Some(false), None]);
    }

    #[rstest]
    fn pack_of_empty_inputs_is_empty() {
        let empty: [&[u8]; 0] = [];
        assert!(pack(&empty).is_empty());
        let blanks: [&[u8]; 2] = [&[], &[]];
        assert!(pack(&blanks).is_empty());
    }

    #[rstest]
    fn pack_pairs_mixes_types() {
        let pairs = pack_pairs(&[1, 2, 3], &["a", "b"]);
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[0], Pair(Some(1), Some("a")));
        assert_eq!(pairs[2], Pair(Some(3), None));
    }

    #[rstest]
    #[case(Pair::new(json!("a"), json!(1)), "-", "a-1")]
    #[case(Pair::new(json!({"k": 1}), json!(null)), "|", "{\"k\":1}|null")]
    #[case(Pair::new(json!(1.5), json!([true])), "", "1.5[true]")]
    fn join_renders_elements(
        #[case] pair: Pair<Value, Value>,
        #[case] separator: &str,
        #[case] expected: &str,
    ) {
        assert_eq!(pair.join(separator), expected);
    }

    #[rstest]
    fn display_uses_comma() {
        assert_eq!(Pair::from(("x", 2)).to_string(), "x,2");
    }
}
