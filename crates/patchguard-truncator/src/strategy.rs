//! The shrinking steps applied by the truncation loop.

use indexmap::IndexMap;

use crate::node::{Key, Node};

// ── Strings ─────────────────────────────────────────────────────────────

/// Char length of the longest string leaf longer than `min_len`.
pub(crate) fn longest_string(node: &Node, min_len: usize) -> Option<usize> {
    match node {
        Node::Str(s) => Some(s.chars().count()).filter(|len| *len > min_len),
        Node::Array(items) => items.iter().filter_map(|n| longest_string(n, min_len)).max(),
        Node::Object(map) => map.values().filter_map(|n| longest_string(n, min_len)).max(),
        _ => None,
    }
}

/// Cuts every string leaf longer than `max_len` chars down to
/// `max_len - ellipsis` chars followed by `...`.
pub(crate) fn clip_strings(node: &mut Node, max_len: usize, ellipsis: usize) {
    match node {
        Node::Str(s) if s.chars().count() > max_len => {
            *s = clip(s, max_len.saturating_sub(ellipsis));
        }
        Node::Array(items) => items.iter_mut().for_each(|n| clip_strings(n, max_len, ellipsis)),
        Node::Object(map) => map.values_mut().for_each(|n| clip_strings(n, max_len, ellipsis)),
        _ => {}
    }
}

pub(crate) fn clip(s: &str, keep: usize) -> String {
    let mut out: String = s.chars().take(keep).collect();
    out.push_str("...");
    out
}

// ── Containers ──────────────────────────────────────────────────────────

/// Depth of the deepest array that still has more than one slot.
pub(crate) fn deepest_array(node: &Node, depth: usize) -> Option<usize> {
    let own = match node {
        Node::Array(items) if items.len() > 1 => Some(depth),
        _ => None,
    };
    own.max(children(node).filter_map(|n| deepest_array(n, depth + 1)).max())
}

/// Depth of the deepest object that still has more than one key.
pub(crate) fn deepest_object(node: &Node, depth: usize) -> Option<usize> {
    let own = match node {
        Node::Object(map) if map.len() > 1 => Some(depth),
        _ => None,
    };
    own.max(children(node).filter_map(|n| deepest_object(n, depth + 1)).max())
}

fn children(node: &Node) -> Box<dyn Iterator<Item = &Node> + '_> {
    match node {
        Node::Array(items) => Box::new(items.iter()),
        Node::Object(map) => Box::new(map.values()),
        _ => Box::new(std::iter::empty()),
    }
}

/// Applies one collapse step to every array with more than one slot at
/// `target` depth.
pub(crate) fn collapse_arrays_at(node: &mut Node, depth: usize, target: usize, min_items: usize) -> bool {
    let mut changed = false;
    match node {
        Node::Array(items) if depth == target => {
            if items.len() > 1 {
                collapse_array(items, min_items);
                changed = true;
            }
        }
        Node::Array(items) if depth < target => {
            for item in items {
                changed |= collapse_arrays_at(item, depth + 1, target, min_items);
            }
        }
        Node::Object(map) if depth < target => {
            for val in map.values_mut() {
                changed |= collapse_arrays_at(val, depth + 1, target, min_items);
            }
        }
        _ => {}
    }
    changed
}

/// Applies one collapse step to every object with more than one key at
/// `target` depth.
pub(crate) fn collapse_objects_at(node: &mut Node, depth: usize, target: usize, min_keys: usize) -> bool {
    let mut changed = false;
    match node {
        Node::Object(map) if depth == target => {
            if map.len() > 1 {
                collapse_object(map, min_keys);
                changed = true;
            }
        }
        Node::Array(items) if depth < target => {
            for item in items {
                changed |= collapse_objects_at(item, depth + 1, target, min_keys);
            }
        }
        Node::Object(map) if depth < target => {
            for val in map.values_mut() {
                changed |= collapse_objects_at(val, depth + 1, target, min_keys);
            }
        }
        _ => {}
    }
    changed
}

/// The middle item becomes a marker; afterwards the larger side of the
/// marker loses the item next to it, until `min_items` real items remain
/// and the array becomes `[...]`.
fn collapse_array(items: &mut Vec<Node>, min_items: usize) {
    match items.iter().position(Node::is_elided) {
        None => {
            let mid = items.len() / 2;
            items[mid] = Node::Elided;
        }
        Some(idx) if items.len() - 1 > min_items => {
            let left = idx;
            let right = items.len() - 1 - idx;
            if left > right {
                items.remove(idx - 1);
            } else {
                items.remove(idx + 1);
            }
        }
        Some(_) => *items = vec![Node::Elided],
    }
}

fn collapse_object(map: &mut IndexMap<Key, Node>, min_keys: usize) {
    match map.get_index_of(&Key::Elided) {
        None => {
            let mid = map.len() / 2;
            *map = std::mem::take(map)
                .into_iter()
                .enumerate()
                .map(|(i, entry)| if i == mid { (Key::Elided, Node::Elided) } else { entry })
                .collect();
        }
        Some(idx) if map.len() - 1 > min_keys => {
            let left = idx;
            let right = map.len() - 1 - idx;
            let remove = if left > right { idx - 1 } else { idx + 1 };
            map.shift_remove_index(remove);
        }
        Some(_) => {
            map.clear();
            map.insert(Key::Elided, Node::Elided);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn clips_only_long_strings() {
        let mut node = Node::from(&json!({"a": "short", "b": "abcdefghijklmnopqrstuvwxyz"}));
        assert_eq!(longest_string(&node, 5), Some(26));
        clip_strings(&mut node, 10, 3);
        assert_eq!(node, Node::from(&json!({"a": "short", "b": "abcdefg..."})));
        assert_eq!(longest_string(&node, 10), None);
    }

    #[test]
    fn deepest_container_depths() {
        let node = Node::from(&json!({"x": [1, 2], "y": {"z": [[1, 2, 3]], "w": 1}}));
        assert_eq!(deepest_array(&node, 0), Some(3));
        assert_eq!(deepest_object(&node, 0), Some(1));
        assert_eq!(deepest_array(&Node::from(&json!([1])), 0), None);
    }

    #[test]
    fn array_collapse_sequence() {
        let mut items: Vec<Node> = (1..=5).map(|i| Node::from(&json!(i))).collect();
        let n = |i: i32| Node::from(&json!(i));

        collapse_array(&mut items, 2);
        assert_eq!(items, vec![n(1), n(2), Node::Elided, n(4), n(5)]);
        collapse_array(&mut items, 2);
        assert_eq!(items, vec![n(1), n(2), Node::Elided, n(5)]);
        collapse_array(&mut items, 2);
        assert_eq!(items, vec![n(1), Node::Elided, n(5)]);
        collapse_array(&mut items, 2);
        assert_eq!(items, vec![Node::Elided]);
    }

    #[test]
    fn object_collapse_sequence() {
        let mut node = Node::from(&json!({"a": 1, "b": 2, "c": 3, "d": 4}));
        let Node::Object(map) = &mut node else {
            unreachable!()
        };
        collapse_object(map, 2);
        let keys: Vec<Key> = map.keys().cloned().collect();
        assert_eq!(
            keys,
            vec![Key::Name("a".into()), Key::Name("b".into()), Key::Elided, Key::Name("d".into())]
        );
        collapse_object(map, 2);
        assert_eq!(map.len(), 3);
        assert!(!map.contains_key(&Key::Name("b".into())));
        collapse_object(map, 2);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key(&Key::Elided));
    }

    #[test]
    fn collapse_targets_one_depth() {
        let mut node = Node::from(&json!([[1, 2, 3], [4, 5, 6], 7]));
        assert!(collapse_arrays_at(&mut node, 0, 1, 2));
        assert_eq!(
            node.render(0),
            "[\n[\n1,\n...\n3\n],\n[\n4,\n...\n6\n],\n7\n]"
        );
    }
}
