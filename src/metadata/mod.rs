//! Decorator metadata
//!
//! Declarations (classes, properties, methods, parameters) are decorated with
//! explicit registration calls made while the classes are being declared:
//!
//! ```rust
//! use stratum::metadata::{
//!     Class, ClassDecoratorFactory, DecorationSite, InspectionOptions, MetadataInspector,
//!     MetadataStore,
//! };
//! use serde_json::{Value, json};
//!
//! let store = MetadataStore::new();
//! let animal = Class::builder("Animal").build();
//! let dog = Class::builder("Dog").extends(&animal).build();
//!
//! ClassDecoratorFactory::new("entity", json!({"table": "animals"}), None)
//!     .with_store(store.clone())
//!     .into_decorator()
//!     .apply(&DecorationSite::class(&animal))?;
//!
//! let inspector = MetadataInspector::new(store);
//! let spec: Option<Value> =
//!     inspector.get_class_metadata("entity", &dog, InspectionOptions::default());
//! assert_eq!(spec, Some(json!({"table": "animals"})));
//! # Ok::<(), stratum::metadata::MetadataError>(())
//! ```
//!
//! The first decoration of a key on a class starts from a copy of what the
//! class inherits and merges into it; later decorations of the same key on
//! the same class merge into its own metadata and detect duplicates.
//!
//! Set `RUST_LOG=stratum::metadata::decorator=debug` (with a subscriber
//! installed) to trace every decoration as `<declaration>: <json>`.

mod class;
mod error;
mod factories;
mod factory;
mod inspector;
mod site;
mod spec;
mod store;

pub use class::{Class, ClassBuilder, ClassId, MemberKind, Side, Target, TargetId};
pub use error::{MetadataError, Result};
pub use factories::{
    ClassDecoratorFactory, MethodDecoratorFactory, MethodParameterDecoratorFactory,
    ParameterDecoratorFactory, PropertyDecoratorFactory,
};
pub use factory::{
    BaseDecoratorFactory, Decorator, DecoratorFactory, DecoratorOptions, FactoryCore, MetadataMap,
    TRACE_TARGET,
};
pub use inspector::{InspectionOptions, MetadataInspector};
pub use site::{DecorationSite, SiteKind};
pub use spec::{Callable, Marked, MetadataSpec, SpecValue};
pub use store::MetadataStore;

/// Class decorator on the global store
pub fn create_class_decorator<T: MetadataSpec>(
    key: &str,
    spec: T,
    options: Option<DecoratorOptions>,
) -> Decorator {
    ClassDecoratorFactory::create_decorator(key, spec, options)
}

/// Property decorator on the global store
pub fn create_property_decorator<T: MetadataSpec>(
    key: &str,
    spec: T,
    options: Option<DecoratorOptions>,
) -> Decorator {
    PropertyDecoratorFactory::create_decorator(key, spec, options)
}

/// Method decorator on the global store
pub fn create_method_decorator<T: MetadataSpec>(
    key: &str,
    spec: T,
    options: Option<DecoratorOptions>,
) -> Decorator {
    MethodDecoratorFactory::create_decorator(key, spec, options)
}

/// Parameter decorator on the global store
pub fn create_parameter_decorator<T: MetadataSpec>(
    key: &str,
    spec: T,
    options: Option<DecoratorOptions>,
) -> Decorator {
    ParameterDecoratorFactory::create_decorator(key, spec, options)
}

/// Method-parameter decorator on the global store
pub fn create_method_parameter_decorator<T: MetadataSpec>(
    key: &str,
    spec: T,
    options: Option<DecoratorOptions>,
) -> Decorator {
    MethodParameterDecoratorFactory::create_decorator(key, spec, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn test_helpers_decorate_through_global_store() {
        let base = Class::builder("Repository")
            .method("find", 2)
            .property("table")
            .build();
        let sub = Class::builder("UserRepository").extends(&base).build();
        let prototype = base.prototype();

        create_class_decorator("model", json!({"name": "user"}), None)
            .apply(&DecorationSite::class(&base))
            .unwrap();
        create_property_decorator("column", json!({"type": "text"}), None)
            .apply(&DecorationSite::property(&base, "table"))
            .unwrap();
        create_method_decorator("route", json!({"verb": "get"}), None)
            .apply(&DecorationSite::method(&base, "find"))
            .unwrap();
        create_parameter_decorator("inject", json!({"key": "db"}), None)
            .apply(&DecorationSite::parameter(&base, "find", 1))
            .unwrap();
        create_method_parameter_decorator("arg", json!("id"), None)
            .apply(&DecorationSite::method(&base, "find"))
            .unwrap();

        let inspector = MetadataInspector::global();
        let options = InspectionOptions::default();
        assert_eq!(
            inspector.get_class_metadata::<Value>("model", &sub, options),
            Some(json!({"name": "user"}))
        );
        assert_eq!(
            inspector.get_property_metadata::<Value>("column", &prototype, "table", options),
            Some(json!({"type": "text"}))
        );
        assert_eq!(
            inspector.get_method_metadata::<Value>("route", &prototype, "find", options),
            Some(json!({"verb": "get"}))
        );
        assert_eq!(
            inspector.get_parameter_metadata::<Value>("inject", &prototype, "find", 1, options),
            Some(json!({"key": "db"}))
        );
        assert_eq!(
            inspector.get_method_parameter_metadata::<Value>("arg", &prototype, "find", options),
            Some(vec![json!("id")])
        );
        assert!(MetadataStore::global().has_own("model", &base.as_target()));
    }
}
