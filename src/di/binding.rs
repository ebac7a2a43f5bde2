use crate::di::Container;
use crate::error::Result;
use std::any::Any;
use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

/// A type-erased bound value
pub type Instance = Arc<dyn Any + Send + Sync>;

type ProviderFn = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// How a binding produces its value
#[derive(Clone)]
pub enum BindingValue {
    /// The same instance on every resolution
    Instance(Instance),
    /// A fresh value on every resolution
    Provider(ProviderFn),
}

/// A value registered in the [`Container`] under a string key
///
/// # Example
/// ```
/// use stratum::di::Binding;
///
/// let binding = Binding::instance("config.port", 3000u16).tag("config");
/// assert!(binding.has_tag("config"));
/// ```
#[derive(Clone)]
pub struct Binding {
    key: String,
    tags: BTreeSet<String>,
    value: BindingValue,
}

impl Binding {
    pub fn instance<T: 'static + Send + Sync>(key: impl Into<String>, instance: T) -> Self {
        Self::from_arc(key, Arc::new(instance))
    }

    /// Bind an already shared instance
    pub fn from_arc(key: impl Into<String>, instance: Instance) -> Self {
        Self {
            key: key.into(),
            tags: BTreeSet::new(),
            value: BindingValue::Instance(instance),
        }
    }

    pub fn provider<T, F>(key: impl Into<String>, provider: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
    {
        let provider: ProviderFn = Arc::new(move |container: &Container| {
            provider(container).map(|value| Arc::new(value) as Instance)
        });
        Self {
            key: key.into(),
            tags: BTreeSet::new(),
            value: BindingValue::Provider(provider),
        }
    }

    /// Add a tag
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn tags(&self) -> &BTreeSet<String> {
        &self.tags
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    pub fn value(&self) -> &BindingValue {
        &self.value
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.value {
            BindingValue::Instance(_) => "instance",
            BindingValue::Provider(_) => "provider",
        };
        f.debug_struct("Binding")
            .field("key", &self.key)
            .field("tags", &self.tags)
            .field("value", &kind)
            .finish()
    }
}
