//! HTTP server exposing the OpenAPI document of bound controllers

use super::decorators::get_controller_spec_in;
use super::layer::RequestTraceLayer;
use super::spec::OpenApiSpec;
use crate::application::{ApplicationError, CONTROLLER_TAG, Server};
use crate::config::{ApplicationConfig, RestConfig};
use crate::di::Container;
use crate::error::Result;
use crate::metadata::Class;
use async_trait::async_trait;
use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const SERVER_NAME: &str = "RestServer";

fn start_failed(e: impl std::fmt::Display) -> ApplicationError {
    ApplicationError::start_failed(SERVER_NAME, e.to_string())
}

async fn openapi(State(spec): State<Arc<OpenApiSpec>>) -> Json<OpenApiSpec> {
    Json(spec.as_ref().clone())
}

struct Running {
    addr: SocketAddr,
    shutdown: oneshot::Sender<()>,
    handle: JoinHandle<std::io::Result<()>>,
}

/// Serves the OpenAPI document built from every `controller`-tagged binding
///
/// The document is resolved when the router is built, so serving requests
/// never writes to the metadata store.
pub struct RestServer {
    container: Container,
    title: String,
    version: String,
    config: RestConfig,
    running: Mutex<Option<Running>>,
}

impl RestServer {
    pub fn new(container: Container, config: &ApplicationConfig) -> Self {
        Self {
            container,
            title: config.name.clone(),
            version: config.version.clone(),
            config: config.rest.clone(),
            running: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &RestConfig {
        &self.config
    }

    /// OpenAPI document of the controllers bound right now
    pub fn api_spec(&self) -> Result<OpenApiSpec> {
        let mut spec = OpenApiSpec::new(&self.title, &self.version);
        for binding in self.container.find_by_tag(CONTROLLER_TAG) {
            let class = self.container.get::<Class>(binding.key())?;
            let controller = get_controller_spec_in(self.container.store(), &class);
            spec.add_controller(&controller);
        }
        Ok(spec)
    }

    /// Router serving the document of the controllers bound right now
    pub fn router(&self) -> Result<Router> {
        let spec = Arc::new(self.api_spec()?);
        let router = Router::new()
            .route(&self.config.openapi_path, get(openapi))
            .layer(RequestTraceLayer)
            .with_state(spec);
        Ok(router)
    }

    /// Address the server listens on, once started
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|running| running.addr)
    }

    fn bind(&self) -> std::io::Result<TcpListener> {
        let listener = std::net::TcpListener::bind((self.config.host.as_str(), self.config.port))?;
        listener.set_nonblocking(true)?;
        TcpListener::from_std(listener)
    }
}

#[async_trait]
impl Server for RestServer {
    async fn start(&self) -> std::result::Result<(), ApplicationError> {
        // held until the new state is stored, so concurrent starts bind once
        let mut running = self.running.lock().unwrap_or_else(PoisonError::into_inner);
        if running.is_some() {
            return Ok(());
        }

        let router = self.router().map_err(start_failed)?;
        let listener = self.bind().map_err(start_failed)?;
        let addr = listener.local_addr().map_err(start_failed)?;

        let (shutdown, signal) = oneshot::channel::<()>();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = signal.await;
                })
                .await
        });

        tracing::info!("Server running on http://{}", addr);
        *running = Some(Running {
            addr,
            shutdown,
            handle,
        });
        Ok(())
    }

    async fn stop(&self) -> std::result::Result<(), ApplicationError> {
        let running = self
            .running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        let Some(running) = running else {
            return Ok(());
        };

        // the server may already be gone, in which case the send fails
        let _ = running.shutdown.send(());
        match running.handle.await {
            Ok(Ok(())) => {
                tracing::info!("Server stopped: {}", running.addr);
                Ok(())
            }
            Ok(Err(e)) => Err(ApplicationError::stop_failed(SERVER_NAME, e.to_string())),
            Err(e) => Err(ApplicationError::stop_failed(SERVER_NAME, e.to_string())),
        }
    }

    fn is_running(&self) -> bool {
        self.running
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::Binding;
    use crate::metadata::MetadataStore;
    use crate::rest::{CONTROLLER_SPEC_KEY, Verb, decorators::operation_in};
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;

    fn given_server(port: u16) -> (Class, MetadataStore, RestServer) {
        let store = MetadataStore::new();
        let mut container = Container::with_store(store.clone());
        let class = Class::builder("PingController").method("ping", 0).build();
        operation_in(&store, &class, "ping", Verb::Get, "/ping", None).unwrap();
        let binding = Binding::instance("controllers.PingController", class.clone());
        container.add(binding.tag(CONTROLLER_TAG));

        let mut config = ApplicationConfig::default();
        config.rest.port = port;
        let server = RestServer::new(container, &config);
        (class, store, server)
    }

    #[test]
    fn test_api_spec_lists_bound_controllers() {
        let (_class, _store, server) = given_server(0);
        let spec = server.api_spec().unwrap();
        assert_eq!(spec.info.title, "stratum");
        assert!(spec.paths["/ping"].contains_key(&Verb::Get));
    }

    #[tokio::test]
    async fn test_serving_leaves_metadata_untouched() {
        let (class, store, server) = given_server(0);
        let router = server.router().unwrap();
        let keys = store.keys_of(&class.as_target());
        assert!(keys.contains(&CONTROLLER_SPEC_KEY.to_string()));

        let request = Request::builder()
            .uri("/openapi.json")
            .body(Body::empty())
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.keys_of(&class.as_target()), keys);
    }

    #[tokio::test]
    async fn test_start_and_stop() {
        let (_class, _store, server) = given_server(0);
        assert!(!server.is_running());

        server.start().await.unwrap();
        assert!(server.is_running());
        assert!(server.local_addr().unwrap().port() > 0);

        server.stop().await.unwrap();
        assert!(!server.is_running());
        assert!(server.local_addr().is_none());
    }

    #[tokio::test]
    async fn test_concurrent_starts_bind_once() {
        let port = std::net::TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let (_class, _store, server) = given_server(port);

        let (first, second) = tokio::join!(server.start(), server.start());
        first.unwrap();
        second.unwrap();
        assert_eq!(server.local_addr().unwrap().port(), port);

        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn test_stop_before_start_is_noop() {
        let (_class, _store, server) = given_server(0);
        server.stop().await.unwrap();
    }
}
