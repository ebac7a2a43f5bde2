use crate::di::binding::Instance;
use crate::error::{Result, StratumError};
use crate::metadata::Class;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Trait for types the container can build from injection metadata
///
/// `class()` must return the same [`Class`] on every call; keep it in a
/// static and declare its injections when the static is first initialized.
///
/// # Example
/// ```
/// use stratum::di::{inject, Container, Dependencies, InjectSpec, Injectable};
/// use stratum::metadata::Class;
/// use std::sync::{Arc, LazyLock};
///
/// struct Database;
///
/// struct UserRepository {
///     db: Arc<Database>,
/// }
///
/// static USER_REPOSITORY: LazyLock<Class> = LazyLock::new(|| {
///     let class = Class::builder("UserRepository").constructor(1).build();
///     inject::constructor_param(&class, 0, InjectSpec::new("datasources.db"))
///         .expect("declare injection");
///     class
/// });
///
/// impl Injectable for UserRepository {
///     fn class() -> Class {
///         USER_REPOSITORY.clone()
///     }
///
///     fn construct(deps: Dependencies) -> stratum::Result<Self> {
///         Ok(Self { db: deps.arg(0)? })
///     }
/// }
///
/// let mut container = Container::new();
/// container.bind("datasources.db", Database);
/// let repository = container.instantiate::<UserRepository>().unwrap();
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// The class carrying this type's injection metadata
    fn class() -> Class;

    /// Create an instance from resolved dependencies
    ///
    /// # Errors
    /// Returns an error if a dependency has an unexpected type.
    fn construct(deps: Dependencies) -> Result<Self>;
}

/// Values resolved for one instantiation
pub struct Dependencies {
    class_name: String,
    constructor: Vec<Option<Instance>>,
    properties: BTreeMap<String, Instance>,
}

impl Dependencies {
    pub(crate) fn new(
        class_name: &str,
        constructor: Vec<Option<Instance>>,
        properties: BTreeMap<String, Instance>,
    ) -> Self {
        Self {
            class_name: class_name.to_string(),
            constructor,
            properties,
        }
    }

    fn downcast<T: 'static + Send + Sync>(
        &self,
        instance: Instance,
        site: String,
    ) -> Result<Arc<T>> {
        instance
            .downcast::<T>()
            .map_err(|_| StratumError::DowncastFailed {
                key: site,
                type_name: std::any::type_name::<T>().to_string(),
            })
    }

    /// Constructor argument `index`, which must have resolved
    pub fn arg<T: 'static + Send + Sync>(&self, index: usize) -> Result<Arc<T>> {
        self.optional_arg(index)?
            .ok_or_else(|| StratumError::DependencyNotFound {
                key: format!("{}.constructor[{}]", self.class_name, index),
            })
    }

    /// Constructor argument `index`, `None` if an optional injection was unbound
    pub fn optional_arg<T: 'static + Send + Sync>(&self, index: usize) -> Result<Option<Arc<T>>> {
        match self.constructor.get(index).cloned().flatten() {
            Some(instance) => {
                let site = format!("{}.constructor[{}]", self.class_name, index);
                self.downcast(instance, site).map(Some)
            }
            None => Ok(None),
        }
    }

    pub fn property<T: 'static + Send + Sync>(&self, name: &str) -> Result<Arc<T>> {
        self.optional_property(name)?
            .ok_or_else(|| StratumError::DependencyNotFound {
                key: format!("{}.prototype.{}", self.class_name, name),
            })
    }

    pub fn optional_property<T: 'static + Send + Sync>(
        &self,
        name: &str,
    ) -> Result<Option<Arc<T>>> {
        match self.properties.get(name).cloned() {
            Some(instance) => self
                .downcast(instance, format!("{}.prototype.{}", self.class_name, name))
                .map(Some),
            None => Ok(None),
        }
    }

    /// Number of constructor arguments
    pub fn len(&self) -> usize {
        self.constructor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructor.is_empty()
    }
}
