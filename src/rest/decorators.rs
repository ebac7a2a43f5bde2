//! REST metadata on controller classes
//!
//! ```rust
//! use stratum::metadata::Class;
//! use stratum::rest::{self, ControllerSpec, ParameterObject, Verb};
//!
//! let class = Class::builder("GreetController").method("greet", 2).build();
//!
//! rest::api(&class, ControllerSpec::new("/greetings"))?;
//! rest::get(&class, "greet", "/{name}")?;
//! rest::param(&class, "greet", ParameterObject::query("msg", "string"))?;
//! rest::param(&class, "greet", ParameterObject::path("name", "string"))?;
//!
//! let spec = rest::get_controller_spec(&class);
//! let operation = &spec.paths["/{name}"][&Verb::Get];
//! assert_eq!(operation.operation_name.as_deref(), Some("greet"));
//! # Ok::<(), stratum::metadata::MetadataError>(())
//! ```

use super::spec::{ControllerSpec, OperationObject, ParameterObject, RestEndpoint, Verb};
use crate::metadata::{
    Class, ClassDecoratorFactory, DecorationSite, InspectionOptions, MetadataInspector,
    MetadataStore, MethodDecoratorFactory, MethodParameterDecoratorFactory, Result,
};

/// Metadata key of class-level controller specs
pub const API_SPEC_KEY: &str = "rest:api";
/// Metadata key of operation endpoints
pub const OPERATION_KEY: &str = "rest:operation";
/// Metadata key of operation parameters
pub const PARAMETERS_KEY: &str = "rest:parameters";
/// Metadata key of resolved controller specs
pub const CONTROLLER_SPEC_KEY: &str = "rest:controller-spec";

/// Describe a controller class with an explicit spec
pub fn api(class: &Class, spec: ControllerSpec) -> Result<()> {
    api_in(MetadataStore::global(), class, spec)
}

pub fn api_in(store: &MetadataStore, class: &Class, spec: ControllerSpec) -> Result<()> {
    ClassDecoratorFactory::new(API_SPEC_KEY, spec, None)
        .with_store(store.clone())
        .into_decorator()
        .apply(&DecorationSite::class(class))
}

/// Expose `method` as an operation
pub fn operation(
    class: &Class,
    method: &str,
    verb: Verb,
    path: &str,
    spec: Option<OperationObject>,
) -> Result<()> {
    operation_in(MetadataStore::global(), class, method, verb, path, spec)
}

pub fn operation_in(
    store: &MetadataStore,
    class: &Class,
    method: &str,
    verb: Verb,
    path: &str,
    spec: Option<OperationObject>,
) -> Result<()> {
    let endpoint = RestEndpoint {
        verb,
        path: path.to_string(),
        spec,
    };
    MethodDecoratorFactory::new(OPERATION_KEY, endpoint, None)
        .with_store(store.clone())
        .into_decorator()
        .apply(&DecorationSite::method(class, method))
}

pub fn get(class: &Class, method: &str, path: &str) -> Result<()> {
    operation(class, method, Verb::Get, path, None)
}

pub fn post(class: &Class, method: &str, path: &str) -> Result<()> {
    operation(class, method, Verb::Post, path, None)
}

pub fn put(class: &Class, method: &str, path: &str) -> Result<()> {
    operation(class, method, Verb::Put, path, None)
}

pub fn patch(class: &Class, method: &str, path: &str) -> Result<()> {
    operation(class, method, Verb::Patch, path, None)
}

pub fn del(class: &Class, method: &str, path: &str) -> Result<()> {
    operation(class, method, Verb::Delete, path, None)
}

/// Describe the next parameter of `method`
///
/// Calls build the list back to front: the parameter described last is
/// parameter 0.
pub fn param(class: &Class, method: &str, spec: ParameterObject) -> Result<()> {
    param_in(MetadataStore::global(), class, method, spec)
}

pub fn param_in(
    store: &MetadataStore,
    class: &Class,
    method: &str,
    spec: ParameterObject,
) -> Result<()> {
    MethodParameterDecoratorFactory::new(PARAMETERS_KEY, spec, None)
        .with_store(store.clone())
        .into_decorator()
        .apply(&DecorationSite::method(class, method))
}

/// REST description of `class`, from the global store
pub fn get_controller_spec(class: &Class) -> ControllerSpec {
    get_controller_spec_in(MetadataStore::global(), class)
}

/// REST description of `class`
///
/// Starts from the class's `api` spec (inherited if not redeclared) and adds
/// every decorated operation. Operations without explicit parameters get the
/// ones declared with [`param`]. The result is cached on the class.
pub fn get_controller_spec_in(store: &MetadataStore, class: &Class) -> ControllerSpec {
    let target = class.as_target();
    if let Some(cached) = store.get_own::<ControllerSpec>(CONTROLLER_SPEC_KEY, &target) {
        return cached;
    }

    let spec = resolve_controller_spec(&MetadataInspector::new(store.clone()), class);
    tracing::debug!(
        class = class.name(),
        paths = spec.paths.len(),
        "resolved controller spec"
    );
    store.define(CONTROLLER_SPEC_KEY, &target, spec.clone());
    spec
}

fn resolve_controller_spec(inspector: &MetadataInspector, class: &Class) -> ControllerSpec {
    let options = InspectionOptions::default();
    let prototype = class.prototype();
    let mut spec = inspector
        .get_class_metadata::<ControllerSpec>(API_SPEC_KEY, class, options)
        .unwrap_or_default();

    let endpoints = inspector
        .get_all_method_metadata::<RestEndpoint>(OPERATION_KEY, &prototype, options)
        .unwrap_or_default();

    for (method, endpoint) in endpoints {
        let mut operation = endpoint.spec.unwrap_or_default();
        if operation.parameters.is_none() {
            operation.parameters = inspector.get_method_parameter_metadata::<ParameterObject>(
                PARAMETERS_KEY,
                &prototype,
                &method,
                options,
            );
        }
        operation.operation_name = Some(method);
        spec.paths
            .entry(endpoint.path)
            .or_default()
            .insert(endpoint.verb, operation);
    }
    spec
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataError;

    #[test]
    fn test_spec_from_operations_and_params() {
        let store = MetadataStore::new();
        let class = Class::builder("GreetController").method("greet", 2).build();

        operation_in(&store, &class, "greet", Verb::Get, "/greet", None).unwrap();
        let who = ParameterObject::query("who", "string");
        let text = ParameterObject::query("text", "string");
        param_in(&store, &class, "greet", who).unwrap();
        param_in(&store, &class, "greet", text).unwrap();

        let spec = get_controller_spec_in(&store, &class);
        let operation = &spec.paths["/greet"][&Verb::Get];
        assert_eq!(operation.operation_name.as_deref(), Some("greet"));
        let names: Vec<_> = operation
            .parameters
            .as_ref()
            .unwrap()
            .iter()
            .map(|param| param.name.as_str())
            .collect();
        assert_eq!(names, ["text", "who"]);
    }

    #[test]
    fn test_explicit_parameters_win() {
        let store = MetadataStore::new();
        let class = Class::builder("C").method("find", 1).build();
        let explicit = OperationObject {
            parameters: Some(vec![ParameterObject::path("id", "number")]),
            ..OperationObject::default()
        };

        operation_in(&store, &class, "find", Verb::Get, "/{id}", Some(explicit)).unwrap();
        let ignored = ParameterObject::query("ignored", "string");
        param_in(&store, &class, "find", ignored).unwrap();

        let spec = get_controller_spec_in(&store, &class);
        let params = spec.paths["/{id}"][&Verb::Get].parameters.clone().unwrap();
        assert_eq!(params, vec![ParameterObject::path("id", "number")]);
    }

    #[test]
    fn test_subclass_inherits_api_and_operations() {
        let store = MetadataStore::new();
        let base = Class::builder("Base").method("list", 0).build();
        let sub = Class::builder("Sub")
            .extends(&base)
            .method("create", 1)
            .build();

        api_in(&store, &base, ControllerSpec::new("/items")).unwrap();
        operation_in(&store, &base, "list", Verb::Get, "/", None).unwrap();
        operation_in(&store, &sub, "create", Verb::Post, "/", None).unwrap();

        let sub_spec = get_controller_spec_in(&store, &sub);
        assert_eq!(sub_spec.base_path.as_deref(), Some("/items"));
        assert_eq!(sub_spec.paths["/"].len(), 2);

        let base_spec = get_controller_spec_in(&store, &base);
        let verbs: Vec<_> = base_spec.paths["/"].keys().collect();
        assert_eq!(verbs, [&Verb::Get]);
    }

    #[test]
    fn test_operation_declared_twice_is_duplicate() {
        let store = MetadataStore::new();
        let class = Class::builder("C").method("find", 0).build();

        operation_in(&store, &class, "find", Verb::Get, "/", None).unwrap();
        let err = operation_in(&store, &class, "find", Verb::Post, "/", None).unwrap_err();
        assert!(matches!(err, MetadataError::DuplicateDecoration { .. }));
    }
}
