use super::class::{Class, Target};
use super::factory::MetadataMap;
use super::spec::{Marked, MetadataSpec};
use super::store::MetadataStore;

/// Options for reading metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct InspectionOptions {
    /// Ignore metadata visible only through base classes
    pub own_only: bool,
}

impl InspectionOptions {
    pub fn own_only() -> Self {
        Self { own_only: true }
    }
}

/// Read access to decorator metadata
///
/// Specs come back unwrapped from their target markers and are copies of
/// what is stored.
#[derive(Clone)]
pub struct MetadataInspector {
    store: MetadataStore,
}

impl MetadataInspector {
    pub fn new(store: MetadataStore) -> Self {
        Self { store }
    }

    /// Inspector over the process-wide store
    pub fn global() -> Self {
        Self::new(MetadataStore::global().clone())
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    fn read<M: Clone + 'static>(
        &self,
        key: &str,
        target: &Target,
        options: InspectionOptions,
    ) -> Option<M> {
        if options.own_only {
            self.store.get_own(key, target)
        } else {
            self.store.get_effective(key, target)
        }
    }

    /// Spec of a class decorator
    pub fn get_class_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        class: &Class,
        options: InspectionOptions,
    ) -> Option<T> {
        self.read::<Marked<T>>(key, &class.as_target(), options)
            .map(Marked::into_spec)
    }

    /// Specs of every decorated property of `target`
    pub fn get_all_property_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        target: &Target,
        options: InspectionOptions,
    ) -> Option<MetadataMap<T>> {
        let meta = self.read::<MetadataMap<Marked<T>>>(key, target, options)?;
        let specs = meta
            .into_iter()
            .map(|(name, spec)| (name, spec.into_spec()))
            .collect();
        Some(specs)
    }

    pub fn get_property_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        target: &Target,
        property: &str,
        options: InspectionOptions,
    ) -> Option<T> {
        self.get_all_property_metadata::<T>(key, target, options)?
            .remove(property)
    }

    /// Specs of every decorated method of `target`
    pub fn get_all_method_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        target: &Target,
        options: InspectionOptions,
    ) -> Option<MetadataMap<T>> {
        self.get_all_property_metadata(key, target, options)
    }

    pub fn get_method_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        target: &Target,
        method: &str,
        options: InspectionOptions,
    ) -> Option<T> {
        self.get_property_metadata(key, target, method, options)
    }

    /// One entry per declared parameter of `method` (`""` for constructors)
    pub fn get_all_parameter_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        target: &Target,
        method: &str,
        options: InspectionOptions,
    ) -> Option<Vec<Option<T>>> {
        let mut meta = self.read::<MetadataMap<Vec<Option<Marked<T>>>>>(key, target, options)?;
        let specs = meta
            .remove(method)?
            .into_iter()
            .map(|slot| slot.map(Marked::into_spec))
            .collect();
        Some(specs)
    }

    pub fn get_parameter_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        target: &Target,
        method: &str,
        index: usize,
        options: InspectionOptions,
    ) -> Option<T> {
        self.get_all_parameter_metadata::<T>(key, target, method, options)?
            .into_iter()
            .nth(index)
            .flatten()
    }

    /// Specs recorded by a method-parameter decorator, in parameter order
    pub fn get_method_parameter_metadata<T: MetadataSpec>(
        &self,
        key: &str,
        target: &Target,
        method: &str,
        options: InspectionOptions,
    ) -> Option<Vec<T>> {
        self.read::<MetadataMap<Vec<T>>>(key, target, options)?
            .remove(method)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{ClassDecoratorFactory, DecorationSite, ParameterDecoratorFactory};
    use serde_json::{Value, json};

    #[test]
    fn test_class_metadata_own_only() {
        let store = MetadataStore::new();
        let inspector = MetadataInspector::new(store.clone());
        let base = Class::builder("Base").build();
        let sub = Class::builder("Sub").extends(&base).build();

        ClassDecoratorFactory::new("k", json!({"a": 1}), None)
            .with_store(store)
            .into_decorator()
            .apply(&DecorationSite::class(&base))
            .unwrap();

        assert_eq!(
            inspector.get_class_metadata::<Value>("k", &sub, InspectionOptions::default()),
            Some(json!({"a": 1}))
        );
        assert_eq!(
            inspector.get_class_metadata::<Value>("k", &sub, InspectionOptions::own_only()),
            None
        );
    }

    #[test]
    fn test_mutating_read_does_not_touch_store() {
        let store = MetadataStore::new();
        let inspector = MetadataInspector::new(store.clone());
        let base = Class::builder("Base").build();
        let sub = Class::builder("Sub").extends(&base).build();

        ClassDecoratorFactory::new("k", json!({"a": 1}), None)
            .with_store(store)
            .into_decorator()
            .apply(&DecorationSite::class(&base))
            .unwrap();

        let mut read: Value = inspector
            .get_class_metadata("k", &sub, InspectionOptions::default())
            .unwrap();
        read["a"] = json!(99);

        assert_eq!(
            inspector.get_class_metadata::<Value>("k", &base, InspectionOptions::own_only()),
            Some(json!({"a": 1}))
        );
    }

    #[test]
    fn test_parameter_metadata() {
        let store = MetadataStore::new();
        let inspector = MetadataInspector::new(store.clone());
        let foo = Class::builder("Foo").constructor(2).build();

        ParameterDecoratorFactory::new("inject", json!("db"), None)
            .with_store(store)
            .into_decorator()
            .apply(&DecorationSite::constructor_parameter(&foo, 1))
            .unwrap();

        let target = foo.as_target();
        let options = InspectionOptions::default();
        assert_eq!(
            inspector.get_all_parameter_metadata::<Value>("inject", &target, "", options),
            Some(vec![None, Some(json!("db"))])
        );
        assert_eq!(
            inspector.get_parameter_metadata::<Value>("inject", &target, "", 0, options),
            None
        );
    }
}
