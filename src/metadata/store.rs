use super::class::{Target, TargetId};
use dashmap::DashMap;
use std::any::Any;
use std::sync::{Arc, LazyLock};

type Entry = Arc<dyn Any + Send + Sync>;

static GLOBAL: LazyLock<MetadataStore> = LazyLock::new(MetadataStore::new);

/// Storage for metadata keyed by `(target, key)`
///
/// The store never merges anything itself: [`define`](Self::define) replaces
/// the whole value for a `(target, key)` pair. Reads hand out clones, so a
/// caller mutating what it read cannot alter what is stored.
///
/// Decoration happens while classes are being declared, before any request
/// is served. After that the store is only read.
#[derive(Clone, Default)]
pub struct MetadataStore {
    entries: Arc<DashMap<(TargetId, String), Entry>>,
}

impl MetadataStore {
    /// Create an empty, isolated store
    pub fn new() -> Self {
        Self {
            entries: Arc::new(DashMap::new()),
        }
    }

    /// The process-wide store used by decorators unless told otherwise
    pub fn global() -> &'static MetadataStore {
        &GLOBAL
    }

    /// Metadata attached directly to `target`
    pub fn get_own<M: Clone + 'static>(&self, key: &str, target: &Target) -> Option<M> {
        let entry = self
            .entries
            .get(&(target.id(), key.to_string()))
            .map(|entry| Arc::clone(entry.value()))?;

        match entry.downcast_ref::<M>() {
            Some(value) => Some(value.clone()),
            None => {
                tracing::warn!(
                    key,
                    target = %target.name(),
                    expected = std::any::type_name::<M>(),
                    "metadata stored under this key has a different type"
                );
                None
            }
        }
    }

    /// Own metadata of `target`, or else that of its nearest ancestor
    pub fn get_effective<M: Clone + 'static>(&self, key: &str, target: &Target) -> Option<M> {
        let owner = target
            .lineage()
            .find(|candidate| self.has_own(key, candidate))?;
        self.get_own(key, &owner)
    }

    /// Replace the metadata for `(key, target)`
    pub fn define<M: Send + Sync + 'static>(&self, key: &str, target: &Target, value: M) {
        self.entries
            .insert((target.id(), key.to_string()), Arc::new(value));
    }

    pub fn has_own(&self, key: &str, target: &Target) -> bool {
        self.entries.contains_key(&(target.id(), key.to_string()))
    }

    pub fn has_effective(&self, key: &str, target: &Target) -> bool {
        target
            .lineage()
            .any(|candidate| self.has_own(key, &candidate))
    }

    /// Keys with own metadata on `target`, sorted
    pub fn keys_of(&self, target: &Target) -> Vec<String> {
        let id = target.id();
        let mut keys: Vec<String> = self
            .entries
            .iter()
            .filter(|entry| entry.key().0 == id)
            .map(|entry| entry.key().1.clone())
            .collect();
        keys.sort();
        keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::Class;

    #[test]
    fn test_own_and_effective_lookup() {
        let store = MetadataStore::new();
        let base = Class::builder("Base").build();
        let sub = Class::builder("Sub").extends(&base).build();

        store.define("entity", &base.as_target(), "animals".to_string());

        assert_eq!(store.get_own::<String>("entity", &sub.as_target()), None);
        assert_eq!(
            store.get_effective::<String>("entity", &sub.as_target()),
            Some("animals".to_string())
        );
        assert!(!store.has_effective("entity", &sub.prototype()));
    }

    #[test]
    fn test_define_replaces_value() {
        let store = MetadataStore::new();
        let foo = Class::builder("Foo").build();
        let target = foo.as_target();

        store.define("k", &target, vec![1]);
        store.define("k", &target, vec![2, 3]);
        assert_eq!(store.get_own::<Vec<i32>>("k", &target), Some(vec![2, 3]));
        assert_eq!(store.keys_of(&target), ["k"]);
    }

    #[test]
    fn test_type_mismatch_reads_as_absent() {
        let store = MetadataStore::new();
        let foo = Class::builder("Foo").build();

        store.define("k", &foo.as_target(), 1u8);
        assert_eq!(store.get_own::<String>("k", &foo.as_target()), None);
    }

    #[test]
    fn test_reads_are_copies() {
        let store = MetadataStore::new();
        let foo = Class::builder("Foo").build();
        store.define("k", &foo.as_target(), vec![1]);

        let mut read = store.get_own::<Vec<i32>>("k", &foo.as_target()).unwrap();
        read.push(2);
        assert_eq!(
            store.get_own::<Vec<i32>>("k", &foo.as_target()),
            Some(vec![1])
        );
    }
}
