//! Generic collection operations used by service code.
//!
//! Only mapping, predicate search, grouping and sparse-key picking are
//! exposed; anything else belongs to the standard iterator API.

use std::collections::BTreeMap;

use serde_json::{Map, Value};

use super::emptiness::Emptiness;

/// Apply `f` to every value of `map`, keeping keys.
pub fn map_values<K, V, W, F>(map: BTreeMap<K, V>, mut f: F) -> BTreeMap<K, W>
where
    K: Ord,
    F: FnMut(V) -> W,
{
    map.into_iter().map(|(key, value)| (key, f(value))).collect()
}

/// First element matching `predicate`.
pub fn find<'a, T, P>(items: &'a [T], mut predicate: P) -> Option<&'a T>
where
    P: FnMut(&T) -> bool,
{
    items.iter().find(|item| predicate(item))
}

/// Group elements by the key returned from `key_fn`, preserving input order
/// within each group.
///
/// # Examples
/// ```
/// use service_utils::domain::group_by;
///
/// let groups = group_by(vec!["apple", "avocado", "banana"], |word| word.chars().next());
/// assert_eq!(groups[&Some('a')], vec!["apple", "avocado"]);
/// ```
pub fn group_by<T, K, F>(items: impl IntoIterator<Item = T>, mut key_fn: F) -> BTreeMap<K, Vec<T>>
where
    K: Ord,
    F: FnMut(&T) -> K,
{
    let mut groups: BTreeMap<K, Vec<T>> = BTreeMap::new();
    for item in items {
        groups.entry(key_fn(&item)).or_default().push(item);
    }
    groups
}

/// Pick `keys` out of a sparse JSON dictionary.
///
/// Requested keys whose value is empty (see [`Emptiness`]) are skipped unless
/// `include_empty` is set, in which case a missing key is kept as `null`.
/// `transform`, when given, is applied to every kept value.
///
/// # Examples
/// ```
/// use service_utils::domain::pick_keys;
/// use serde_json::json;
///
/// let source = json!({"name": "Ada", "nick": "", "age": 36});
/// let source = source.as_object().expect("object literal");
///
/// let picked = pick_keys(source, &["name", "nick", "city"], None, false);
/// assert_eq!(serde_json::Value::Object(picked), json!({"name": "Ada"}));
///
/// let picked = pick_keys(source, &["name", "nick", "city"], None, true);
/// assert_eq!(
///     serde_json::Value::Object(picked),
///     json!({"name": "Ada", "nick": "", "city": null})
/// );
/// ```
pub fn pick_keys(
    source: &Map<String, Value>,
    keys: &[&str],
    transform: Option<&dyn Fn(&Value) -> Value>,
    include_empty: bool,
) -> Map<String, Value> {
    let mut picked = Map::new();
    for key in keys {
        let value = source.get(*key).cloned().unwrap_or(Value::Null);
        if value.is_empty_value() && !include_empty {
            continue;
        }
        let value = match transform {
            Some(f) => f(&value),
            None => value,
        };
        picked.insert((*key).to_owned(), value);
    }
    picked
}
