//! The decorator factory engine
//!
//! A factory is built once per call site from a metadata key and a spec.
//! Each time the resulting [`Decorator`] is applied, the engine reads the
//! target's own metadata and either merges the spec into a copy of the
//! inherited metadata (first decoration of this key on the target) or into
//! the target's own metadata (every later decoration). The merge hooks are
//! supplied by the specialized factories in [`super::factories`].

use super::class::Target;
use super::error::{MetadataError, Result};
use super::site::{DecorationSite, SiteKind};
use super::spec::{Marked, MetadataSpec};
use super::store::MetadataStore;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Target for the per-decoration trace lines
pub const TRACE_TARGET: &str = "stratum::metadata::decorator";

/// Metadata of all decorated members of a target, keyed by member name
pub type MetadataMap<V> = BTreeMap<String, V>;

/// Options for a decorator
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecoratorOptions {
    /// Merge specs with metadata inherited from base classes
    #[serde(default = "default_allow_inheritance")]
    pub allow_inheritance: bool,

    /// Feature-specific options
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_allow_inheritance() -> bool {
    true
}

impl Default for DecoratorOptions {
    fn default() -> Self {
        Self {
            allow_inheritance: true,
            extra: serde_json::Map::new(),
        }
    }
}

impl DecoratorOptions {
    /// Options that ignore inherited metadata
    pub fn without_inheritance() -> Self {
        Self {
            allow_inheritance: false,
            ..Self::default()
        }
    }

    /// Add a feature-specific option
    pub fn with(mut self, name: impl Into<String>, value: serde_json::Value) -> Self {
        self.extra.insert(name.into(), value);
        self
    }
}

/// State shared by every factory: key, spec, options and the store written to
pub struct FactoryCore<T> {
    key: String,
    spec: T,
    options: DecoratorOptions,
    store: MetadataStore,
}

impl<T: MetadataSpec> FactoryCore<T> {
    pub fn new(key: impl Into<String>, spec: T, options: Option<DecoratorOptions>) -> Self {
        Self {
            key: key.into(),
            spec,
            options: options.unwrap_or_default(),
            store: MetadataStore::global().clone(),
        }
    }

    /// Write to `store` instead of the global store
    pub fn with_store(mut self, store: MetadataStore) -> Self {
        self.store = store;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn spec(&self) -> &T {
        &self.spec
    }

    pub fn options(&self) -> &DecoratorOptions {
        &self.options
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn allow_inheritance(&self) -> bool {
        self.options.allow_inheritance
    }

    /// Combine the spec with metadata inherited for the same declaration
    ///
    /// Object specs are shallow-merged over a copy of the inherited spec,
    /// new fields winning. Anything else (no inheritance, nothing inherited,
    /// scalars, lists) yields the spec unchanged.
    pub fn inherit(&self, inherited: Option<&T>) -> T {
        if !self.allow_inheritance() {
            return self.spec.clone();
        }
        let inherited = match inherited {
            Some(inherited) if !inherited.is_absent() => inherited,
            _ => return self.spec.clone(),
        };
        if self.spec.is_absent() {
            return inherited.clone();
        }
        self.spec
            .merge_over(inherited)
            .unwrap_or_else(|| self.spec.clone())
    }

    /// Tag `spec` with the target that produced it
    pub fn with_target(&self, spec: T, target: &Target) -> Marked<T> {
        Marked::new(spec, target)
    }
}

/// A factory producing decorators for one metadata key
///
/// Implementors supply [`core`](Self::core) plus the two merge hooks and
/// [`create`](Self::create); the defaults fail with
/// [`MetadataError::NotImplemented`].
pub trait DecoratorFactory: Send + Sync + 'static {
    /// Spec supplied at the call site
    type Spec: MetadataSpec;
    /// Shape stored per target
    type Metadata: Clone + Serialize + Send + Sync + 'static;

    fn core(&self) -> &FactoryCore<Self::Spec>;

    /// Short name used in diagnostics, e.g. `class`
    fn name(&self) -> &'static str {
        "base"
    }

    /// Whether decorators from this factory may be applied to `kind`
    fn accepts(&self, _kind: SiteKind) -> bool {
        true
    }

    /// Merge the spec into a copy of the metadata inherited by the target
    fn merge_with_inherited(
        &self,
        _inherited: Option<Self::Metadata>,
        _site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        Err(MetadataError::NotImplemented("merge_with_inherited"))
    }

    /// Merge the spec into the metadata the target already owns
    fn merge_with_own(
        &self,
        _own: Option<Self::Metadata>,
        _site: &DecorationSite,
    ) -> Result<Self::Metadata> {
        Err(MetadataError::NotImplemented("merge_with_own"))
    }

    /// Turn the factory into a decorator
    fn create(self) -> Result<Decorator>
    where
        Self: Sized,
    {
        Err(MetadataError::NotImplemented("create"))
    }

    /// Apply the spec to `site` and store the result as the target's own metadata
    fn decorate(&self, site: &DecorationSite) -> Result<()> {
        let core = self.core();
        let target = site.target();
        let own = core.store().get_own::<Self::Metadata>(core.key(), target);

        let meta = if own.is_none() && core.allow_inheritance() {
            let inherited = core
                .store()
                .get_effective::<Self::Metadata>(core.key(), target);
            self.merge_with_inherited(inherited, site)?
        } else {
            self.merge_with_own(own, site)?
        };

        if tracing::enabled!(target: TRACE_TARGET, tracing::Level::DEBUG) {
            let json = serde_json::to_string(&meta).unwrap_or_default();
            tracing::debug!(target: TRACE_TARGET, "{}: {}", site.describe(), json);
        }
        core.store().define(core.key(), target, meta);
        Ok(())
    }
}

/// The unspecialized engine; every hook fails with `NotImplemented`
pub struct BaseDecoratorFactory<T> {
    core: FactoryCore<T>,
}

impl<T: MetadataSpec> BaseDecoratorFactory<T> {
    pub fn new(key: impl Into<String>, spec: T, options: Option<DecoratorOptions>) -> Self {
        Self {
            core: FactoryCore::new(key, spec, options),
        }
    }
}

impl<T: MetadataSpec> DecoratorFactory for BaseDecoratorFactory<T> {
    type Spec = T;
    type Metadata = Marked<T>;

    fn core(&self) -> &FactoryCore<T> {
        &self.core
    }
}

trait Decorate: Send + Sync {
    fn key(&self) -> &str;
    fn name(&self) -> &'static str;
    fn accepts(&self, kind: SiteKind) -> bool;
    fn decorate_site(&self, site: &DecorationSite) -> Result<()>;
}

impl<F: DecoratorFactory> Decorate for F {
    fn key(&self) -> &str {
        self.core().key()
    }

    fn name(&self) -> &'static str {
        DecoratorFactory::name(self)
    }

    fn accepts(&self, kind: SiteKind) -> bool {
        DecoratorFactory::accepts(self, kind)
    }

    fn decorate_site(&self, site: &DecorationSite) -> Result<()> {
        self.decorate(site)
    }
}

/// A decorator produced by a factory, applied with [`apply`](Self::apply)
///
/// # Example
/// ```
/// use stratum::metadata::{Class, ClassDecoratorFactory, DecorationSite, MetadataStore};
/// use serde_json::json;
///
/// let animal = Class::builder("Animal").build();
/// let store = MetadataStore::new();
/// let entity = ClassDecoratorFactory::new("entity", json!({"table": "animals"}), None)
///     .with_store(store.clone())
///     .into_decorator();
///
/// entity.apply(&DecorationSite::class(&animal)).unwrap();
/// ```
#[derive(Clone)]
pub struct Decorator {
    factory: Arc<dyn Decorate>,
}

impl Decorator {
    pub fn new<F: DecoratorFactory>(factory: F) -> Self {
        Self {
            factory: Arc::new(factory),
        }
    }

    pub fn key(&self) -> &str {
        self.factory.key()
    }

    /// Attach the spec to `site`
    ///
    /// # Errors
    /// `InvalidSite` if the factory does not decorate this kind of
    /// declaration, `DuplicateDecoration` if the declaration was already
    /// decorated directly.
    pub fn apply(&self, site: &DecorationSite) -> Result<()> {
        if !self.factory.accepts(site.kind()) {
            return Err(MetadataError::invalid_site(
                self.factory.name(),
                site.describe(),
            ));
        }
        self.factory.decorate_site(site)
    }
}

impl std::fmt::Debug for Decorator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Decorator")
            .field("name", &self.factory.name())
            .field("key", &self.factory.key())
            .finish()
    }
}
