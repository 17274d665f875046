//! Read-only view over an untyped document tree.
//!
//! Plan extraction and validation only need to ask a handful of questions of
//! a document (is this an object, what is under this key, is this an integer),
//! so they are written against [`DocumentTree`] instead of a concrete JSON
//! library. [`serde_json::Value`] implements it.

use serde_json::Value;

/// One level of a document, borrowed from the tree.
#[derive(Debug)]
pub enum Node<'a, T> {
    Object(Vec<(&'a str, &'a T)>),
    Array(&'a [T]),
    Text(&'a str),
    /// A number that fits in `i64` without loss.
    Integer(i64),
    /// Any other number (fractional or out of range).
    Number,
    Bool(bool),
    Null,
}

pub trait DocumentTree: Sized {
    fn node(&self) -> Node<'_, Self>;

    /// Parse text into a tree. Used to look inside string-encoded documents.
    fn parse(text: &str) -> Option<Self>;

    fn get(&self, key: &str) -> Option<&Self> {
        match self.node() {
            Node::Object(entries) => entries
                .into_iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v),
            _ => None,
        }
    }

    fn has_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    fn is_object(&self) -> bool {
        matches!(self.node(), Node::Object(_))
    }

    fn is_null(&self) -> bool {
        matches!(self.node(), Node::Null)
    }

    fn as_array(&self) -> Option<&[Self]> {
        match self.node() {
            Node::Array(items) => Some(items),
            _ => None,
        }
    }

    fn as_text(&self) -> Option<&str> {
        match self.node() {
            Node::Text(text) => Some(text),
            _ => None,
        }
    }

    fn as_integer(&self) -> Option<i64> {
        match self.node() {
            Node::Integer(n) => Some(n),
            _ => None,
        }
    }
}

impl DocumentTree for Value {
    fn node(&self) -> Node<'_, Self> {
        match self {
            Value::Object(map) => Node::Object(map.iter().map(|(k, v)| (k.as_str(), v)).collect()),
            Value::Array(items) => Node::Array(items),
            Value::String(text) => Node::Text(text),
            Value::Number(n) => n.as_i64().map_or(Node::Number, Node::Integer),
            Value::Bool(b) => Node::Bool(*b),
            Value::Null => Node::Null,
        }
    }

    fn parse(text: &str) -> Option<Self> {
        serde_json::from_str(text).ok()
    }

    fn get(&self, key: &str) -> Option<&Self> {
        self.as_object()?.get(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_integers_and_fractions_are_distinguished() {
        assert_eq!(DocumentTree::as_integer(&json!(7)), Some(7));
        assert_eq!(DocumentTree::as_integer(&json!(-3)), Some(-3));
        assert_eq!(DocumentTree::as_integer(&json!(1.5)), None);
        assert_eq!(DocumentTree::as_integer(&json!("7")), None);
    }

    #[test]
    fn test_get_only_reads_objects() {
        let doc = json!({"a": {"b": 1}});
        let inner = DocumentTree::get(&doc, "a").unwrap();
        assert_eq!(DocumentTree::as_integer(DocumentTree::get(inner, "b").unwrap()), Some(1));
        assert!(DocumentTree::get(&json!([1, 2]), "a").is_none());
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(<Value as DocumentTree>::parse("{not json").is_none());
        assert!(<Value as DocumentTree>::parse("[1]").is_some());
    }
}
