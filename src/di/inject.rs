//! Injection metadata
//!
//! Constructor parameters and properties are marked for injection with the
//! binding key to resolve. The container reads the effective metadata, so a
//! subclass that declares nothing inherits its base class's injections.

use crate::metadata::{
    Class, DecorationSite, InspectionOptions, MetadataInspector, MetadataMap, MetadataSpec,
    MetadataStore, ParameterDecoratorFactory, PropertyDecoratorFactory, Result,
};
use serde::{Deserialize, Serialize};

/// Metadata key for constructor parameter injections
pub const PARAMETERS_KEY: &str = "inject:parameters";

/// Metadata key for property injections
pub const PROPERTIES_KEY: &str = "inject:properties";

/// What to inject into a constructor parameter or property
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InjectSpec {
    pub binding_key: String,
    #[serde(default)]
    pub optional: bool,
}

impl InjectSpec {
    pub fn new(binding_key: impl Into<String>) -> Self {
        Self {
            binding_key: binding_key.into(),
            optional: false,
        }
    }

    /// Resolve to nothing instead of failing when the binding is missing
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

impl MetadataSpec for InjectSpec {}

/// Inject `spec` into constructor parameter `index` of `class`
pub fn constructor_param(class: &Class, index: usize, spec: InjectSpec) -> Result<()> {
    constructor_param_in(MetadataStore::global(), class, index, spec)
}

pub fn constructor_param_in(
    store: &MetadataStore,
    class: &Class,
    index: usize,
    spec: InjectSpec,
) -> Result<()> {
    ParameterDecoratorFactory::new(PARAMETERS_KEY, spec, None)
        .with_store(store.clone())
        .into_decorator()
        .apply(&DecorationSite::constructor_parameter(class, index))
}

/// Inject `spec` into property `name` of instances of `class`
pub fn property(class: &Class, name: &str, spec: InjectSpec) -> Result<()> {
    property_in(MetadataStore::global(), class, name, spec)
}

pub fn property_in(
    store: &MetadataStore,
    class: &Class,
    name: &str,
    spec: InjectSpec,
) -> Result<()> {
    PropertyDecoratorFactory::new(PROPERTIES_KEY, spec, None)
        .with_store(store.clone())
        .into_decorator()
        .apply(&DecorationSite::property(class, name))
}

/// Everything the container must resolve to build an instance of a class
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InjectionPlan {
    pub constructor: Vec<Option<InjectSpec>>,
    pub properties: MetadataMap<InjectSpec>,
}

impl InjectionPlan {
    pub fn for_class(inspector: &MetadataInspector, class: &Class) -> Self {
        let options = InspectionOptions::default();
        let constructor = inspector
            .get_all_parameter_metadata(PARAMETERS_KEY, &class.as_target(), "", options)
            .unwrap_or_default();
        let properties = inspector
            .get_all_property_metadata(PROPERTIES_KEY, &class.prototype(), options)
            .unwrap_or_default();
        Self {
            constructor,
            properties,
        }
    }
}
