//! Locating a plan inside a generator response envelope.
//!
//! Generators wrap the plan in different ways: nested under `response`, inside
//! an array of outputs, or serialized to a string inside another document.
//! [`find_plan`] walks all of these, bounded by [`MAX_UNWRAP_DEPTH`].

use super::tree::{DocumentTree, Node};

/// Deepest level [`find_plan`] inspects. Bounds the cost of adversarial or
/// deeply string-encoded input.
pub const MAX_UNWRAP_DEPTH: usize = 6;

/// Find the first object exposing both `meta` and `ops`.
///
/// Search order at each object: the object itself, then its `response` value,
/// then every other value. Arrays are searched element by element and strings
/// are parsed and searched as documents. Each step down costs one level.
pub fn find_plan<T: DocumentTree + Clone>(root: &T) -> Option<T> {
    find_plan_at(root, 0)
}

fn find_plan_at<T: DocumentTree + Clone>(node: &T, depth: usize) -> Option<T> {
    if depth > MAX_UNWRAP_DEPTH {
        return None;
    }
    match node.node() {
        Node::Object(entries) => {
            if is_plan_shaped(node) {
                return Some(node.clone());
            }
            if let Some(inner) = node.get("response")
                && let Some(found) = find_plan_at(inner, depth + 1)
            {
                return Some(found);
            }
            entries
                .into_iter()
                .filter(|(key, _)| *key != "response")
                .find_map(|(_, value)| find_plan_at(value, depth + 1))
        }
        Node::Array(items) => items.iter().find_map(|item| find_plan_at(item, depth + 1)),
        Node::Text(text) => {
            let inner = T::parse(text)?;
            find_plan_at(&inner, depth + 1)
        }
        _ => None,
    }
}

fn is_plan_shaped<T: DocumentTree>(node: &T) -> bool {
    node.has_key("meta") && node.has_key("ops")
}

/// Run identifier of an asynchronous job reference.
///
/// Only returned when the document is an object with a non-empty string
/// `run_id` and no plan reachable from it; a body that carries both is
/// treated as a direct plan.
pub fn extract_run_id<T: DocumentTree + Clone>(root: &T) -> Option<String> {
    if !root.is_object() {
        return None;
    }
    let run_id = root.get("run_id")?.as_text()?.trim();
    if run_id.is_empty() || find_plan(root).is_some() {
        return None;
    }
    Some(run_id.to_string())
}

/// True for a bare run-metadata body (`run_id` + `url`, no `meta`/`ops`).
pub fn is_run_metadata<T: DocumentTree>(root: &T) -> bool {
    root.has_key("run_id") && root.has_key("url") && !root.has_key("meta") && !root.has_key("ops")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn plan_doc() -> Value {
        json!({"meta": {"blockCount": 1}, "ops": [{"x": 0, "y": 0, "z": 0, "block": "minecraft:glass"}]})
    }

    #[test]
    fn test_finds_plan_at_root() {
        assert_eq!(find_plan(&plan_doc()), Some(plan_doc()));
    }

    #[test]
    fn test_finds_plan_under_response_wrapper() {
        let doc = json!({"status": "ok", "response": {"response": plan_doc()}});
        assert_eq!(find_plan(&doc), Some(plan_doc()));
    }

    #[test]
    fn test_finds_plan_in_array_and_string_encodings() {
        let encoded = serde_json::to_string(&plan_doc()).unwrap();
        let doc = json!({"outputs": [{"output": encoded}]});
        assert_eq!(find_plan(&doc), Some(plan_doc()));

        let double_encoded = serde_json::to_string(&json!({"response": encoded})).unwrap();
        assert_eq!(find_plan(&Value::String(double_encoded)), Some(plan_doc()));
    }

    #[test]
    fn test_requires_both_meta_and_ops() {
        assert_eq!(find_plan(&json!({"ops": []})), None);
        assert_eq!(find_plan(&json!({"meta": {}})), None);
    }

    #[test]
    fn test_response_is_searched_before_other_keys() {
        let first = json!({"meta": {"theme": "response"}, "ops": []});
        let other = json!({"meta": {"theme": "other"}, "ops": []});
        let doc = json!({"a_first_key": other, "response": first.clone()});
        assert_eq!(find_plan(&doc), Some(first));
    }

    #[test]
    fn test_depth_is_bounded() {
        // Plan sits at depth 6: found.
        let mut doc = plan_doc();
        for _ in 0..MAX_UNWRAP_DEPTH {
            doc = json!({ "response": doc });
        }
        assert!(find_plan(&doc).is_some());

        // One more wrapper pushes it to depth 7: not found.
        let doc = json!({ "response": doc });
        assert!(find_plan(&doc).is_none());
    }

    #[test]
    fn test_garbage_strings_are_ignored() {
        assert_eq!(find_plan(&json!({"output": "{broken"})), None);
        assert_eq!(find_plan(&json!("plain text")), None);
        assert_eq!(find_plan(&json!(42)), None);
    }

    #[test]
    fn test_run_id_only_without_embedded_plan() {
        assert_eq!(
            extract_run_id(&json!({"run_id": "abc123", "url": "https://x"})),
            Some("abc123".to_string())
        );
        let mut with_plan = plan_doc();
        with_plan["run_id"] = json!("abc123");
        assert_eq!(extract_run_id(&with_plan), None);
        assert_eq!(extract_run_id(&json!({"run_id": ""})), None);
        assert_eq!(extract_run_id(&json!({"run_id": 5})), None);
        assert_eq!(extract_run_id(&json!(["run_id"])), None);
    }

    #[test]
    fn test_detects_run_metadata_shape() {
        assert!(is_run_metadata(&json!({"run_id": "r", "url": "u"})));
        assert!(!is_run_metadata(&json!({"run_id": "r"})));
        assert!(!is_run_metadata(&json!({"run_id": "r", "url": "u", "ops": []})));
    }
}
