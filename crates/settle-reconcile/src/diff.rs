//! Directional set difference.

use std::collections::HashSet;
use std::hash::Hash;

/// Elements of `observed` that do not appear in `desired`.
///
/// Order and duplicates of `observed` are preserved. `missing(a, b)` and
/// `missing(b, a)` answer different questions: the first lists what should
/// be removed, the second what should be added.
pub fn missing<K, D, O>(desired: D, observed: O) -> Vec<K>
where
    K: Eq + Hash,
    D: IntoIterator<Item = K>,
    O: IntoIterator<Item = K>,
{
    let desired: HashSet<K> = desired.into_iter().collect();
    observed
        .into_iter()
        .filter(|key| !desired.contains(key))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_basic() {
        assert_eq!(missing(["a", "b"], ["b", "c", "a", "d"]), vec!["c", "d"]);
    }

    #[test]
    fn test_missing_edges() {
        let empty: [&str; 0] = [];
        assert_eq!(missing(empty, ["x", "y"]), vec!["x", "y"]);
        assert!(missing(["x", "y"], empty).is_empty());
        assert!(missing(["x", "y"], ["y", "x"]).is_empty());
        assert_eq!(missing(["x"], ["y", "y"]), vec!["y", "y"]);
    }

    #[test]
    fn test_missing_is_directional() {
        assert_eq!(missing(["a"], ["a", "b"]), vec!["b"]);
        assert!(missing(["a", "b"], ["a"]).is_empty());
    }
}
