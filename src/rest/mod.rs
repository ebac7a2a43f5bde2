//! REST layer: controller metadata, OpenAPI documents and the REST server

mod application;
pub mod decorators;
mod layer;
mod server;
mod spec;

pub use application::{REST_SERVER_NAME, RestApplication, RestComponent};
pub use decorators::{
    API_SPEC_KEY, CONTROLLER_SPEC_KEY, OPERATION_KEY, PARAMETERS_KEY, api, api_in, del, get,
    get_controller_spec, get_controller_spec_in, operation, operation_in, param, param_in, patch,
    post, put,
};
pub use layer::{RequestTrace, RequestTraceLayer};
pub use server::RestServer;
pub use spec::{
    ControllerSpec, InfoObject, OpenApiSpec, OperationObject, ParameterLocation, ParameterObject,
    PathsObject, RestEndpoint, Verb,
};
