//! Identifier index + container normalization over the raw export tree.
//!
//! The export is a loosely-typed `serde_json::Value` graph where objects link to
//! each other through opaque `@uuid` strings instead of nesting. We never rebuild
//! an owned object graph from it: the tree itself is the arena and [`IdIndex`]
//! is the key → node lookup into it. Everything here borrows from the parsed
//! document and never mutates it.

use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Field carrying an object's identifier.
pub const ID_FIELD: &str = "@uuid";

/// Field carrying the exporter's class name for an object.
pub const CLASS_FIELD: &str = "@class";

/// Type-name prefix marking a tagged `[type-name, payload]` collection.
pub const CONTAINER_PREFIX: &str = "java.util";

// ————————————————————————————————————————————————————————————————————————————
// IDENTIFIER INDEX
// ————————————————————————————————————————————————————————————————————————————

/// Global `@uuid` → object map built by one full pre-order traversal.
///
/// Duplicate identifiers resolve to the last occurrence in traversal order.
#[derive(Debug, Default)]
pub struct IdIndex<'a> {
    nodes: IndexMap<&'a str, &'a Map<String, Value>>,
}

impl<'a> IdIndex<'a> {
    /// Index every object in `root` that carries a string `@uuid`.
    pub fn build(root: &'a Value) -> Self {
        let mut nodes = IndexMap::new();
        // explicit stack, no recursion
        let mut stack: Vec<&'a Value> = vec![root];
        while let Some(node) = stack.pop() {
            match node {
                Value::Object(map) => {
                    if let Some(Value::String(id)) = map.get(ID_FIELD) {
                        // shift_remove keeps insertion order == last occurrence
                        nodes.shift_remove(id.as_str());
                        nodes.insert(id.as_str(), map);
                    }
                    // reversed so pops happen in document order
                    stack.extend(map.values().rev());
                }
                Value::Array(items) => stack.extend(items.iter().rev()),
                _ => {}
            }
        }
        Self { nodes }
    }

    pub fn get(&self, id: &str) -> Option<&'a Map<String, Value>> {
        self.nodes.get(id).copied()
    }

    /// Resolve a reference that is either an inline object or an identifier.
    pub fn resolve(&self, node: &'a Value) -> Option<&'a Map<String, Value>> {
        match node {
            Value::Object(map) => Some(map),
            Value::String(id) => self.get(id),
            _ => None,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

// ————————————————————————————————————————————————————————————————————————————
// CONTAINER UNWRAPPER
// ————————————————————————————————————————————————————————————————————————————

pub fn is_tagged_container(node: &Value) -> bool {
    match node {
        Value::Array(xs) if xs.len() == 2 => {
            matches!(&xs[0], Value::String(tag) if tag.starts_with(CONTAINER_PREFIX))
        }
        _ => false,
    }
}

/// Strip the `[type-name, payload]` wrapper if present; idempotent.
pub fn unwrap_container(node: &Value) -> &Value {
    match node {
        Value::Array(xs) if is_tagged_container(node) => &xs[1],
        _ => node,
    }
}

/// View a collection-valued field as a plain ordered sequence.
///
/// Missing, null and non-array nodes all read as empty.
pub fn entries(node: Option<&Value>) -> &[Value] {
    match node.map(unwrap_container) {
        Some(Value::Array(xs)) => xs.as_slice(),
        _ => &[],
    }
}

// ————————————————————————————————————————————————————————————————————————————
// FIELD ACCESS
// ————————————————————————————————————————————————————————————————————————————

/// Non-empty string field.
pub fn str_field<'a>(obj: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    obj.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
}

pub fn bool_field(obj: &Map<String, Value>, key: &str) -> Option<bool> {
    obj.get(key).and_then(Value::as_bool)
}

pub fn id_of(obj: &Map<String, Value>) -> Option<&str> {
    str_field(obj, ID_FIELD)
}

// ————————————————————————————————————————————————————————————————————————————
// TESTS
// ————————————————————————————————————————————————————————————————————————————
