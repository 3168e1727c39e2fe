//! Total navigation over untyped JSON trees.

use serde_json::Value;

/// Walks `path` down a JSON tree, returning `None` as soon as any step is
/// missing or the current node is not an object. Never panics.
pub fn descend<'a>(value: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(value, |node, key| node.get(key))
}
