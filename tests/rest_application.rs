use axum::body::Body;
use axum::http::{Request, StatusCode};
use stratum::application::ApplicationError;
use stratum::config::ApplicationConfig;
use stratum::metadata::{Class, MetadataStore};
use stratum::rest::{self, ControllerSpec, OpenApiSpec, ParameterObject, RestApplication, Verb};
use stratum::{Container, StratumError};
use tower::ServiceExt;

fn given_app(store: &MetadataStore) -> RestApplication {
    let mut config = ApplicationConfig::default();
    config.name = "todo-api".to_string();
    config.rest.port = 0;
    RestApplication::with_container(Container::with_store(store.clone()), config).unwrap()
}

fn todo_controller(store: &MetadataStore) -> Class {
    let class = Class::builder("TodoController")
        .method("find", 1)
        .method("create", 1)
        .build();
    rest::api_in(store, &class, ControllerSpec::new("/todos")).unwrap();
    rest::operation_in(store, &class, "find", Verb::Get, "/{id}", None).unwrap();
    rest::param_in(store, &class, "find", ParameterObject::path("id", "number")).unwrap();
    rest::operation_in(store, &class, "create", Verb::Post, "/", None).unwrap();
    rest::param_in(
        store,
        &class,
        "create",
        ParameterObject::body("todo", serde_json::json!({"type": "object"})),
    )
    .unwrap();
    class
}

#[tokio::test]
async fn serves_openapi_document_of_bound_controllers() {
    let store = MetadataStore::new();
    let mut app = given_app(&store);
    app.controller(&todo_controller(&store), None);

    let router = app.rest_server().unwrap().router().unwrap();
    let response = router
        .oneshot(
            Request::builder()
                .uri("/openapi.json")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let spec: OpenApiSpec = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(spec.info.title, "todo-api");

    let find = &spec.paths["/todos/{id}"][&Verb::Get];
    assert_eq!(find.operation_name.as_deref(), Some("find"));
    assert_eq!(
        find.parameters.as_deref(),
        Some(&[ParameterObject::path("id", "number")][..])
    );
    assert!(spec.paths["/todos"].contains_key(&Verb::Post));
}

#[tokio::test]
async fn unknown_path_is_not_found() {
    let store = MetadataStore::new();
    let app = given_app(&store);

    let request = Request::builder()
        .uri("/missing")
        .body(Body::empty())
        .unwrap();
    let router = app.rest_server().unwrap().router().unwrap();
    let response = router.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn starts_and_stops_rest_server() {
    let store = MetadataStore::new();
    let app = given_app(&store);
    let server = app.rest_server().unwrap();

    app.start().await.unwrap();
    assert!(server.local_addr().is_some());

    app.stop().await.unwrap();
    assert!(server.local_addr().is_none());
}

#[test]
fn rejects_component_contributing_a_second_server() {
    use async_trait::async_trait;
    use stratum::application::{Component, Server, ServerRegistration};

    struct NoopServer;

    #[async_trait]
    impl Server for NoopServer {
        async fn start(&self) -> Result<(), ApplicationError> {
            Ok(())
        }

        async fn stop(&self) -> Result<(), ApplicationError> {
            Ok(())
        }

        fn is_running(&self) -> bool {
            false
        }
    }

    struct GrpcComponent;

    impl Component for GrpcComponent {
        fn servers(&self) -> Vec<ServerRegistration> {
            vec![ServerRegistration::new("grpc", NoopServer)]
        }
    }

    let store = MetadataStore::new();
    let mut app = given_app(&store);
    let err = app.component(GrpcComponent, None).unwrap_err();
    assert!(matches!(
        err,
        StratumError::Application(ApplicationError::MultipleServerBinding)
    ));
}
