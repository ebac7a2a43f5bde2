//! Metadata specs and the target marker

use super::class::{Target, TargetId};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A value that can be attached to a declaration by a decorator
///
/// `Clone` must copy plain data and keep embedded callables by reference;
/// inherited metadata is cloned this way before it is merged so sibling
/// subclasses never observe each other's merges.
pub trait MetadataSpec: Clone + fmt::Debug + Serialize + Send + Sync + 'static {
    /// Shallow-merge the fields of `self` over a copy of `inherited`
    ///
    /// Returns `None` when either side is not a field-composable object, in
    /// which case the new spec replaces the inherited one. Lists are never
    /// merged.
    fn merge_over(&self, _inherited: &Self) -> Option<Self> {
        None
    }

    /// Whether this spec stands for "no value"
    fn is_absent(&self) -> bool {
        false
    }

    /// Whether the spec is object-shaped and can carry a target marker
    fn accepts_marker(&self) -> bool {
        true
    }
}

impl MetadataSpec for serde_json::Value {
    fn merge_over(&self, inherited: &Self) -> Option<Self> {
        match (inherited, self) {
            (serde_json::Value::Object(base), serde_json::Value::Object(fields)) => {
                let mut merged = base.clone();
                for (key, value) in fields {
                    merged.insert(key.clone(), value.clone());
                }
                Some(serde_json::Value::Object(merged))
            }
            _ => None,
        }
    }

    fn is_absent(&self) -> bool {
        self.is_null()
    }

    fn accepts_marker(&self) -> bool {
        self.is_object() || self.is_array()
    }
}

type CallableFn = dyn Fn(&[SpecValue]) -> SpecValue + Send + Sync;

/// A function embedded in a spec; clones share the same function
#[derive(Clone)]
pub struct Callable(Arc<CallableFn>);

impl Callable {
    pub fn new<F>(f: F) -> Self
    where
        F: Fn(&[SpecValue]) -> SpecValue + Send + Sync + 'static,
    {
        Self(Arc::new(f))
    }

    pub fn call(&self, args: &[SpecValue]) -> SpecValue {
        (self.0)(args)
    }

    pub fn ptr_eq(&self, other: &Callable) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for Callable {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[Function]")
    }
}

/// Dynamically shaped spec value
///
/// Like a JSON value, plus [`Callable`] for specs that carry functions
/// (resolvers, factories, validators).
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SpecValue {
    #[default]
    Null,
    Bool(bool),
    Number(serde_json::Number),
    String(String),
    List(Vec<SpecValue>),
    Object(BTreeMap<String, SpecValue>),
    Callable(Callable),
}

impl SpecValue {
    /// Build an object from key/value pairs
    pub fn object<K, V, I>(fields: I) -> Self
    where
        K: Into<String>,
        V: Into<SpecValue>,
        I: IntoIterator<Item = (K, V)>,
    {
        SpecValue::Object(
            fields
                .into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }

    pub fn callable<F>(f: F) -> Self
    where
        F: Fn(&[SpecValue]) -> SpecValue + Send + Sync + 'static,
    {
        SpecValue::Callable(Callable::new(f))
    }

    /// Field of an object value
    pub fn get(&self, key: &str) -> Option<&SpecValue> {
        match self {
            SpecValue::Object(fields) => fields.get(key),
            _ => None,
        }
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut SpecValue> {
        match self {
            SpecValue::Object(fields) => fields.get_mut(key),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            SpecValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            SpecValue::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    pub fn as_callable(&self) -> Option<&Callable> {
        match self {
            SpecValue::Callable(f) => Some(f),
            _ => None,
        }
    }

    /// JSON form; callables are dropped from objects and become `null` elsewhere
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or(serde_json::Value::Null)
    }
}

impl MetadataSpec for SpecValue {
    fn merge_over(&self, inherited: &Self) -> Option<Self> {
        match (inherited, self) {
            (SpecValue::Object(base), SpecValue::Object(fields)) => {
                let mut merged = base.clone();
                merged.extend(fields.iter().map(|(k, v)| (k.clone(), v.clone())));
                Some(SpecValue::Object(merged))
            }
            _ => None,
        }
    }

    fn is_absent(&self) -> bool {
        matches!(self, SpecValue::Null)
    }

    fn accepts_marker(&self) -> bool {
        matches!(self, SpecValue::Object(_) | SpecValue::List(_))
    }
}

impl Serialize for SpecValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            SpecValue::Null | SpecValue::Callable(_) => serializer.serialize_unit(),
            SpecValue::Bool(b) => serializer.serialize_bool(*b),
            SpecValue::Number(n) => n.serialize(serializer),
            SpecValue::String(s) => serializer.serialize_str(s),
            SpecValue::List(items) => {
                let mut seq = serializer.serialize_seq(Some(items.len()))?;
                for item in items {
                    seq.serialize_element(item)?;
                }
                seq.end()
            }
            SpecValue::Object(fields) => {
                let data = fields
                    .iter()
                    .filter(|(_, value)| !matches!(value, SpecValue::Callable(_)));
                let mut map = serializer.serialize_map(None)?;
                for (key, value) in data {
                    map.serialize_entry(key, value)?;
                }
                map.end()
            }
        }
    }
}

impl From<serde_json::Value> for SpecValue {
    fn from(value: serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => SpecValue::Null,
            serde_json::Value::Bool(b) => SpecValue::Bool(b),
            serde_json::Value::Number(n) => SpecValue::Number(n),
            serde_json::Value::String(s) => SpecValue::String(s),
            serde_json::Value::Array(items) => {
                SpecValue::List(items.into_iter().map(SpecValue::from).collect())
            }
            serde_json::Value::Object(fields) => SpecValue::Object(
                fields
                    .into_iter()
                    .map(|(key, value)| (key, SpecValue::from(value)))
                    .collect(),
            ),
        }
    }
}

impl From<&str> for SpecValue {
    fn from(value: &str) -> Self {
        SpecValue::String(value.to_string())
    }
}

impl From<String> for SpecValue {
    fn from(value: String) -> Self {
        SpecValue::String(value)
    }
}

impl From<bool> for SpecValue {
    fn from(value: bool) -> Self {
        SpecValue::Bool(value)
    }
}

impl From<i64> for SpecValue {
    fn from(value: i64) -> Self {
        SpecValue::Number(value.into())
    }
}

impl From<Callable> for SpecValue {
    fn from(value: Callable) -> Self {
        SpecValue::Callable(value)
    }
}

/// A spec together with the target that produced it
///
/// The owner is bookkeeping for duplicate detection only. It is recorded
/// only for object-shaped specs and never serialized.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Marked<T> {
    spec: T,
    #[serde(skip)]
    owner: Option<TargetId>,
}

impl<T: MetadataSpec> Marked<T> {
    pub fn new(spec: T, target: &Target) -> Self {
        let owner = spec.accepts_marker().then(|| target.id());
        Self { spec, owner }
    }

    /// A spec that no target has claimed
    pub fn unowned(spec: T) -> Self {
        Self { spec, owner: None }
    }

    pub fn spec(&self) -> &T {
        &self.spec
    }

    pub fn into_spec(self) -> T {
        self.spec
    }

    pub fn owner(&self) -> Option<TargetId> {
        self.owner
    }

    /// Whether this fragment was produced by a decoration of `target` itself
    pub fn is_owned_by(&self, target: &Target) -> bool {
        self.owner == Some(target.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Class;
    use serde_json::json;

    #[test]
    fn test_json_merge_new_fields_win() {
        let inherited = json!({"a": 1, "b": 2});
        let spec = json!({"b": 3, "c": 4});
        assert_eq!(
            spec.merge_over(&inherited),
            Some(json!({"a": 1, "b": 3, "c": 4}))
        );
    }

    #[test]
    fn test_lists_are_never_merged() {
        let inherited = json!({"a": 1});
        assert_eq!(json!([1, 2]).merge_over(&inherited), None);
        assert_eq!(json!({"a": 2}).merge_over(&json!([1])), None);
        assert_eq!(json!("text").merge_over(&inherited), None);
    }

    #[test]
    fn test_clone_keeps_callables_by_reference() {
        let spec = SpecValue::object([
            ("name", SpecValue::from("x")),
            ("resolve", SpecValue::callable(|_| SpecValue::from(42))),
        ]);
        let copy = spec.clone();

        let original = spec
            .get("resolve")
            .and_then(SpecValue::as_callable)
            .unwrap();
        let cloned = copy
            .get("resolve")
            .and_then(SpecValue::as_callable)
            .unwrap();
        assert!(original.ptr_eq(cloned));
        assert_eq!(cloned.call(&[]).as_i64(), Some(42));
    }

    #[test]
    fn test_serialize_drops_callables() {
        let spec = SpecValue::object([
            ("name", SpecValue::from("x")),
            ("resolve", SpecValue::callable(|_| SpecValue::Null)),
        ]);
        assert_eq!(spec.to_json(), json!({"name": "x"}));
    }

    #[test]
    fn test_marker_only_on_object_specs() {
        let foo = Class::builder("Foo").build();
        let target = foo.as_target();

        assert!(Marked::new(json!({"a": 1}), &target).is_owned_by(&target));
        assert_eq!(Marked::new(json!("text"), &target).owner(), None);
        assert_eq!(
            serde_json::to_value(Marked::new(json!({"a": 1}), &target)).unwrap(),
            json!({"a": 1})
        );
    }
}
