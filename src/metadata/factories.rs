//! Specialized decorator factories
//!
//! | factory                           | stored shape                      |
//! |-----------------------------------|-----------------------------------|
//! | [`ClassDecoratorFactory`]         | `Marked<T>`                       |
//! | [`PropertyDecoratorFactory`]      | `MetadataMap<Marked<T>>`          |
//! | [`MethodDecoratorFactory`]        | `MetadataMap<Marked<T>>`          |
//! | [`ParameterDecoratorFactory`]     | `MetadataMap<Vec<Option<Marked<T>>>>` |
//! | [`MethodParameterDecoratorFactory`] | `MetadataMap<Vec<T>>`           |

use super::error::{MetadataError, Result};
use super::factory::{Decorator, DecoratorFactory, DecoratorOptions, FactoryCore, MetadataMap};
use super::site::{DecorationSite, SiteKind};
use super::spec::{Marked, MetadataSpec};
use super::store::MetadataStore;
use std::collections::btree_map::Entry;

/// Factory for class decorators
pub struct ClassDecoratorFactory<T> {
    core: FactoryCore<T>,
}

impl<T: MetadataSpec> ClassDecoratorFactory<T> {
    pub fn new(key: impl Into<String>, spec: T, options: Option<DecoratorOptions>) -> Self {
        Self {
            core: FactoryCore::new(key, spec, options),
        }
    }

    pub fn with_store(mut self, store: MetadataStore) -> Self {
        self.core = self.core.with_store(store);
        self
    }

    pub fn into_decorator(self) -> Decorator {
        Decorator::new(self)
    }

    /// Create a class decorator writing to the global store
    pub fn create_decorator(
        key: impl Into<String>,
        spec: T,
        options: Option<DecoratorOptions>,
    ) -> Decorator {
        Self::new(key, spec, options).into_decorator()
    }
}

impl<T: MetadataSpec> DecoratorFactory for ClassDecoratorFactory<T> {
    type Spec = T;
    type Metadata = Marked<T>;

    fn core(&self) -> &FactoryCore<T> {
        &self.core
    }

    fn name(&self) -> &'static str {
        "class"
    }

    fn accepts(&self, kind: SiteKind) -> bool {
        kind == SiteKind::Class
    }

    fn merge_with_inherited(
        &self,
        inherited: Option<Marked<T>>,
        site: &DecorationSite,
    ) -> Result<Marked<T>> {
        let spec = self.core.inherit(inherited.as_ref().map(Marked::spec));
        Ok(self.core.with_target(spec, site.target()))
    }

    fn merge_with_own(&self, own: Option<Marked<T>>, site: &DecorationSite) -> Result<Marked<T>> {
        if own.is_some() {
            return Err(MetadataError::duplicate(site.describe()));
        }
        let spec = self.core.spec().clone();
        Ok(self.core.with_target(spec, site.target()))
    }

    fn create(self) -> Result<Decorator> {
        Ok(self.into_decorator())
    }
}

/// Factory for property decorators
pub struct PropertyDecoratorFactory<T> {
    core: FactoryCore<T>,
}

impl<T: MetadataSpec> PropertyDecoratorFactory<T> {
    pub fn new(key: impl Into<String>, spec: T, options: Option<DecoratorOptions>) -> Self {
        Self {
            core: FactoryCore::new(key, spec, options),
        }
    }

    pub fn with_store(mut self, store: MetadataStore) -> Self {
        self.core = self.core.with_store(store);
        self
    }

    pub fn into_decorator(self) -> Decorator {
        Decorator::new(self)
    }

    pub fn create_decorator(
        key: impl Into<String>,
        spec: T,
        options: Option<DecoratorOptions>,
    ) -> Decorator {
        Self::new(key, spec, options).into_decorator()
    }
}

impl<T: MetadataSpec> DecoratorFactory for PropertyDecoratorFactory<T> {
    type Spec = T;
    type Metadata = MetadataMap<Marked<T>>;

    fn core(&self) -> &FactoryCore<T> {
        &self.core
    }

    fn name(&self) -> &'static str {
        "property"
    }

    fn accepts(&self, kind: SiteKind) -> bool {
        kind == SiteKind::Property
    }

    fn merge_with_inherited(
        &self,
        inherited: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        let mut meta = inherited.unwrap_or_default();
        let member = site.member_key().to_string();
        let spec = self.core.inherit(meta.get(&member).map(Marked::spec));
        meta.insert(member, self.core.with_target(spec, site.target()));
        Ok(meta)
    }

    fn merge_with_own(
        &self,
        own: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        let mut meta = own.unwrap_or_default();
        let member = site.member_key().to_string();
        if meta.contains_key(&member) {
            return Err(MetadataError::duplicate(site.describe()));
        }
        let spec = self.core.spec().clone();
        meta.insert(member, self.core.with_target(spec, site.target()));
        Ok(meta)
    }

    fn create(self) -> Result<Decorator> {
        Ok(self.into_decorator())
    }
}

/// Factory for method decorators
///
/// Unlike properties, an existing entry only counts as a duplicate when it
/// was produced by a decoration of this very target; entries carried over
/// from a base class may be replaced.
pub struct MethodDecoratorFactory<T> {
    core: FactoryCore<T>,
}

impl<T: MetadataSpec> MethodDecoratorFactory<T> {
    pub fn new(key: impl Into<String>, spec: T, options: Option<DecoratorOptions>) -> Self {
        Self {
            core: FactoryCore::new(key, spec, options),
        }
    }

    pub fn with_store(mut self, store: MetadataStore) -> Self {
        self.core = self.core.with_store(store);
        self
    }

    pub fn into_decorator(self) -> Decorator {
        Decorator::new(self)
    }

    pub fn create_decorator(
        key: impl Into<String>,
        spec: T,
        options: Option<DecoratorOptions>,
    ) -> Decorator {
        Self::new(key, spec, options).into_decorator()
    }
}

impl<T: MetadataSpec> DecoratorFactory for MethodDecoratorFactory<T> {
    type Spec = T;
    type Metadata = MetadataMap<Marked<T>>;

    fn core(&self) -> &FactoryCore<T> {
        &self.core
    }

    fn name(&self) -> &'static str {
        "method"
    }

    fn accepts(&self, kind: SiteKind) -> bool {
        kind == SiteKind::Method
    }

    fn merge_with_inherited(
        &self,
        inherited: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        let mut meta = inherited.unwrap_or_default();
        let member = site.member_key().to_string();
        let spec = self.core.inherit(meta.get(&member).map(Marked::spec));
        meta.insert(member, self.core.with_target(spec, site.target()));
        Ok(meta)
    }

    fn merge_with_own(
        &self,
        own: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        let mut meta = own.unwrap_or_default();
        let member = site.member_key().to_string();
        if meta
            .get(&member)
            .is_some_and(|existing| existing.is_owned_by(site.target()))
        {
            return Err(MetadataError::duplicate(site.describe()));
        }
        let spec = self.core.spec().clone();
        meta.insert(member, self.core.with_target(spec, site.target()));
        Ok(meta)
    }

    fn create(self) -> Result<Decorator> {
        Ok(self.into_decorator())
    }
}

/// Factory for constructor and method parameter decorators
///
/// Each member gets one slot per declared parameter; undecorated slots stay
/// `None`.
pub struct ParameterDecoratorFactory<T> {
    core: FactoryCore<T>,
}

impl<T: MetadataSpec> ParameterDecoratorFactory<T> {
    pub fn new(key: impl Into<String>, spec: T, options: Option<DecoratorOptions>) -> Self {
        Self {
            core: FactoryCore::new(key, spec, options),
        }
    }

    pub fn with_store(mut self, store: MetadataStore) -> Self {
        self.core = self.core.with_store(store);
        self
    }

    pub fn into_decorator(self) -> Decorator {
        Decorator::new(self)
    }

    pub fn create_decorator(
        key: impl Into<String>,
        spec: T,
        options: Option<DecoratorOptions>,
    ) -> Decorator {
        Self::new(key, spec, options).into_decorator()
    }

    /// The parameter slots of the decorated member, created on first access
    fn get_or_init<'a>(
        meta: &'a mut MetadataMap<Vec<Option<Marked<T>>>>,
        site: &DecorationSite,
    ) -> Result<&'a mut Vec<Option<Marked<T>>>> {
        let params = match meta.entry(site.member_key().to_string()) {
            Entry::Occupied(entry) => entry.into_mut(),
            Entry::Vacant(entry) => {
                let arity = site.arity().ok_or_else(|| MetadataError::UnknownMember {
                    class: site.target().class().name().to_string(),
                    member: site.member().unwrap_or("constructor").to_string(),
                })?;
                entry.insert(vec![None; arity])
            }
        };

        let index = site.parameter_index().unwrap_or_default();
        if index >= params.len() {
            tracing::warn!(
                target = %site.describe(),
                declared = params.len(),
                "parameter index beyond declared parameters"
            );
            params.resize(index + 1, None);
        }
        Ok(params)
    }

    fn fill_slot(&self, params: &mut [Option<Marked<T>>], site: &DecorationSite) {
        let index = site.parameter_index().unwrap_or_default();
        let spec = self.core.inherit(params[index].as_ref().map(Marked::spec));
        params[index] = Some(self.core.with_target(spec, site.target()));
    }
}

impl<T: MetadataSpec> DecoratorFactory for ParameterDecoratorFactory<T> {
    type Spec = T;
    type Metadata = MetadataMap<Vec<Option<Marked<T>>>>;

    fn core(&self) -> &FactoryCore<T> {
        &self.core
    }

    fn name(&self) -> &'static str {
        "parameter"
    }

    fn accepts(&self, kind: SiteKind) -> bool {
        matches!(kind, SiteKind::Parameter(_))
    }

    fn merge_with_inherited(
        &self,
        inherited: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        let mut meta = inherited.unwrap_or_default();
        let params = Self::get_or_init(&mut meta, site)?;
        self.fill_slot(params, site);
        Ok(meta)
    }

    fn merge_with_own(
        &self,
        own: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        let mut meta = own.unwrap_or_default();
        let params = Self::get_or_init(&mut meta, site)?;
        let index = site.parameter_index().unwrap_or_default();
        if params[index]
            .as_ref()
            .is_some_and(|existing| existing.is_owned_by(site.target()))
        {
            return Err(MetadataError::duplicate(site.describe()));
        }
        self.fill_slot(params, site);
        Ok(meta)
    }

    fn create(self) -> Result<Decorator> {
        Ok(self.into_decorator())
    }
}

/// Factory for method-level decorators describing parameters one by one
///
/// Applying the decorator repeatedly to one method builds the parameter list
/// front to back: each application is prepended, so the decoration applied
/// last describes parameter 0. Inherited lists are never merged; the first
/// decoration on a class starts from scratch.
pub struct MethodParameterDecoratorFactory<T> {
    core: FactoryCore<T>,
}

impl<T: MetadataSpec> MethodParameterDecoratorFactory<T> {
    pub fn new(key: impl Into<String>, spec: T, options: Option<DecoratorOptions>) -> Self {
        Self {
            core: FactoryCore::new(key, spec, options),
        }
    }

    pub fn with_store(mut self, store: MetadataStore) -> Self {
        self.core = self.core.with_store(store);
        self
    }

    pub fn into_decorator(self) -> Decorator {
        Decorator::new(self)
    }

    pub fn create_decorator(
        key: impl Into<String>,
        spec: T,
        options: Option<DecoratorOptions>,
    ) -> Decorator {
        Self::new(key, spec, options).into_decorator()
    }
}

impl<T: MetadataSpec> DecoratorFactory for MethodParameterDecoratorFactory<T> {
    type Spec = T;
    type Metadata = MetadataMap<Vec<T>>;

    fn core(&self) -> &FactoryCore<T> {
        &self.core
    }

    fn name(&self) -> &'static str {
        "method parameter"
    }

    fn accepts(&self, kind: SiteKind) -> bool {
        kind == SiteKind::Method
    }

    fn merge_with_inherited(
        &self,
        _inherited: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        Ok(MetadataMap::from([(
            site.member_key().to_string(),
            vec![self.core.spec().clone()],
        )]))
    }

    fn merge_with_own(
        &self,
        own: Option<Self::Metadata>,
        site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        let mut meta = own.unwrap_or_default();
        meta.entry(site.member_key().to_string())
            .or_default()
            .insert(0, self.core.spec().clone());
        Ok(meta)
    }

    fn create(self) -> Result<Decorator> {
        Ok(self.into_decorator())
    }
}
