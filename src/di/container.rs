use crate::di::binding::{Binding, BindingValue, Instance};
use crate::di::inject::{InjectSpec, InjectionPlan};
use crate::di::injectable::{Dependencies, Injectable};
use crate::error::{Result, StratumError};
use crate::metadata::{DecorationSite, MetadataInspector, MetadataStore};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Dependency injection container
///
/// Holds [`Binding`]s by key and builds [`Injectable`] types from the
/// injection metadata of their class. Cloning is cheap; clones share
/// bindings.
#[derive(Clone)]
pub struct Container {
    bindings: Arc<DashMap<String, Binding>>,
    store: MetadataStore,
}

impl Container {
    /// Container reading injection metadata from the global store
    pub fn new() -> Self {
        Self::with_store(MetadataStore::global().clone())
    }

    pub fn with_store(store: MetadataStore) -> Self {
        Self {
            bindings: Arc::new(DashMap::new()),
            store,
        }
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    /// Add or replace a binding
    pub fn add(&mut self, binding: Binding) -> &mut Self {
        if self.bindings.contains_key(binding.key()) {
            tracing::debug!(key = binding.key(), "replacing binding");
        }
        self.bindings.insert(binding.key().to_string(), binding);
        self
    }

    /// Bind an instance under `key`
    pub fn bind<T: 'static + Send + Sync>(
        &mut self,
        key: impl Into<String>,
        instance: T,
    ) -> &mut Self {
        self.add(Binding::instance(key, instance))
    }

    /// Bind a provider invoked on every resolution of `key`
    pub fn bind_provider<T, F>(&mut self, key: impl Into<String>, provider: F) -> &mut Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
    {
        self.add(Binding::provider(key, provider))
    }

    pub fn binding(&self, key: &str) -> Option<Binding> {
        self.bindings.get(key).map(|entry| entry.value().clone())
    }

    /// Resolve `key` without knowing its type
    pub fn get_instance(&self, key: &str) -> Result<Instance> {
        let value = self
            .binding(key)
            .map(|binding| binding.value().clone())
            .ok_or_else(|| StratumError::DependencyNotFound {
                key: key.to_string(),
            })?;

        match value {
            BindingValue::Instance(instance) => Ok(instance),
            BindingValue::Provider(provider) => provider(self),
        }
    }

    pub fn get<T: 'static + Send + Sync>(&self, key: &str) -> Result<Arc<T>> {
        self.get_instance(key)?
            .downcast::<T>()
            .map_err(|_| StratumError::DowncastFailed {
                key: key.to_string(),
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    pub fn contains(&self, key: &str) -> bool {
        self.bindings.contains_key(key)
    }

    /// Bindings carrying `tag`, ordered by key
    pub fn find_by_tag(&self, tag: &str) -> Vec<Binding> {
        let mut found: Vec<Binding> = self
            .bindings
            .iter()
            .filter(|entry| entry.value().has_tag(tag))
            .map(|entry| entry.value().clone())
            .collect();
        found.sort_by(|a, b| a.key().cmp(b.key()));
        found
    }

    /// All binding keys, sorted
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        keys.sort();
        keys
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// Injection points declared for `T`'s class, including inherited ones
    pub fn injection_plan<T: Injectable>(&self) -> InjectionPlan {
        InjectionPlan::for_class(&MetadataInspector::new(self.store.clone()), &T::class())
    }

    /// Build a `T`, resolving every declared constructor and property injection
    ///
    /// # Errors
    /// `MissingInjection` if a constructor parameter has no injection
    /// declared, `DependencyNotFound` if a non-optional binding is missing.
    pub fn instantiate<T: Injectable>(&self) -> Result<T> {
        let class = T::class();
        let plan = self.injection_plan::<T>();
        let arity = class.constructor_arity().max(plan.constructor.len());

        let mut constructor = Vec::with_capacity(arity);
        for index in 0..arity {
            let spec = plan
                .constructor
                .get(index)
                .cloned()
                .flatten()
                .ok_or_else(|| StratumError::MissingInjection {
                    target: DecorationSite::constructor_parameter(&class, index).describe(),
                })?;
            constructor.push(self.resolve_spec(&spec)?);
        }

        let mut properties = BTreeMap::new();
        for (name, spec) in &plan.properties {
            if let Some(instance) = self.resolve_spec(spec)? {
                properties.insert(name.clone(), instance);
            }
        }

        tracing::debug!(
            class = class.name(),
            parameters = constructor.len(),
            properties = properties.len(),
            "instantiating"
        );
        T::construct(Dependencies::new(class.name(), constructor, properties))
    }

    fn resolve_spec(&self, spec: &InjectSpec) -> Result<Option<Instance>> {
        match self.get_instance(&spec.binding_key) {
            Ok(instance) => Ok(Some(instance)),
            Err(StratumError::DependencyNotFound { .. }) if spec.optional => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}
