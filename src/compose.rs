//! Read-time composition of the rendering message set for one language.
//!
//! Precedence, low to high: base-language template → previously composed
//! tree for the language (session cache) → override-store entries. The
//! result always contains every key the base template contains, so the UI
//! never renders a missing-key placeholder; untranslated leaves simply keep
//! the base-language text.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex};

use serde_json::{Map, Value};

/// Flatten a message tree into dotted-path leaves, e.g.
/// `{"nav":{"home":"Főoldal"}}` → `{"nav.home": "Főoldal"}`.
///
/// Non-string leaves are skipped; the template is a tree of label strings.
pub fn flatten_tree(tree: &Value) -> BTreeMap<String, String> {
    let mut flat = BTreeMap::new();
    flatten_into(tree, String::new(), &mut flat);
    flat
}

fn flatten_into(value: &Value, prefix: String, out: &mut BTreeMap<String, String>) {
    match value {
        Value::Object(map) => {
            for (key, child) in map {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten_into(child, path, out);
            }
        }
        Value::String(text) => {
            if !prefix.is_empty() {
                out.insert(prefix, text.clone());
            }
        }
        _ => {}
    }
}

/// Set one leaf by dotted path, creating intermediate nodes as needed.
/// A non-object node encountered on the way is replaced by an object.
pub fn set_leaf(tree: &mut Value, dotted_key: &str, text: &str) {
    if dotted_key.is_empty() {
        return;
    }
    if !tree.is_object() {
        *tree = Value::Object(Map::new());
    }

    let mut node = tree;
    let mut segments = dotted_key.split('.').peekable();
    while let Some(segment) = segments.next() {
        // Non-object nodes are replaced before descending, so this holds.
        let Value::Object(map) = node else { return };
        if segments.peek().is_none() {
            map.insert(segment.to_string(), Value::String(text.to_string()));
            return;
        }
        let child = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !child.is_object() {
            *child = Value::Object(Map::new());
        }
        node = child;
    }
}

/// Structural union: values from `layer` win for keys it defines, keys only
/// in `base` survive.
pub fn merge_tree(base: &mut Value, layer: &Value) {
    match (base, layer) {
        (Value::Object(base_map), Value::Object(layer_map)) => {
            for (key, layer_child) in layer_map {
                match base_map.get_mut(key) {
                    Some(base_child) if base_child.is_object() && layer_child.is_object() => {
                        merge_tree(base_child, layer_child);
                    }
                    _ => {
                        base_map.insert(key.clone(), layer_child.clone());
                    }
                }
            }
        }
        (base, layer) => *base = layer.clone(),
    }
}

/// Produce the complete message tree for one language.
pub fn compose(
    base_template: &Value,
    cached: Option<&Value>,
    overrides: &BTreeMap<String, String>,
) -> Value {
    let mut tree = base_template.clone();
    if let Some(cached) = cached {
        merge_tree(&mut tree, cached);
    }
    for (key, text) in overrides {
        set_leaf(&mut tree, key, text);
    }
    tree
}

/// Session-scoped cache of composed trees, keyed by (tenant, language).
///
/// Invalidated whenever overrides change or a language is removed; never
/// persisted.
#[derive(Clone, Default)]
pub struct MessageCache {
    inner: Arc<Mutex<HashMap<(i64, String), Value>>>,
}

impl MessageCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, tenant_id: i64, language: &str) -> Option<Value> {
        self.inner
            .lock()
            .unwrap()
            .get(&(tenant_id, language.to_string()))
            .cloned()
    }

    pub fn put(&self, tenant_id: i64, language: &str, tree: Value) {
        self.inner
            .lock()
            .unwrap()
            .insert((tenant_id, language.to_string()), tree);
    }

    pub fn invalidate(&self, tenant_id: i64, language: &str) {
        self.inner
            .lock()
            .unwrap()
            .remove(&(tenant_id, language.to_string()));
    }
}
