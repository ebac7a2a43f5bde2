use crate::di::{Binding, Container};
use crate::error::Result;
use crate::metadata::MetadataStore;

/// Builder for constructing a dependency injection container
///
/// # Example
/// ```
/// use stratum::di::{Binding, ContainerBuilder};
///
/// let container = ContainerBuilder::new()
///     .bind("config.port", 3000u16)
///     .add(Binding::instance("config.host", "127.0.0.1".to_string()).tag("config"))
///     .build();
/// assert_eq!(container.find_by_tag("config").len(), 1);
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    pub fn new() -> Self {
        Self {
            container: Container::new(),
        }
    }

    /// Read injection metadata from `store` instead of the global store
    pub fn store(mut self, store: MetadataStore) -> Self {
        self.container = Container::with_store(store);
        self
    }

    pub fn add(mut self, binding: Binding) -> Self {
        self.container.add(binding);
        self
    }

    pub fn bind<T: 'static + Send + Sync>(mut self, key: impl Into<String>, instance: T) -> Self {
        self.container.bind(key, instance);
        self
    }

    pub fn bind_provider<T, F>(mut self, key: impl Into<String>, provider: F) -> Self
    where
        T: 'static + Send + Sync,
        F: Fn(&Container) -> Result<T> + 'static + Send + Sync,
    {
        self.container.bind_provider(key, provider);
        self
    }

    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
