//! Single-server REST application

use super::server::RestServer;
use crate::application::{Application, Component, ServerRegistration};
use crate::config::ApplicationConfig;
use crate::di::Container;
use crate::error::Result;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

/// Binding name of the REST server
pub const REST_SERVER_NAME: &str = "RestServer";

/// Contributes a [`RestServer`] over the application's container
pub struct RestComponent {
    container: Container,
    config: ApplicationConfig,
}

impl RestComponent {
    pub fn new(container: Container, config: ApplicationConfig) -> Self {
        Self { container, config }
    }
}

impl Component for RestComponent {
    fn servers(&self) -> Vec<ServerRegistration> {
        vec![ServerRegistration::new(
            REST_SERVER_NAME,
            RestServer::new(self.container.clone(), &self.config),
        )]
    }
}

/// An [`Application`] serving its controllers over a single [`RestServer`]
///
/// Binding another server, directly or through a component, fails with
/// `MultipleServerBinding`.
///
/// ```rust,no_run
/// use stratum::config::ApplicationConfig;
/// use stratum::rest::RestApplication;
///
/// # async fn run() -> stratum::Result<()> {
/// let app = RestApplication::new(ApplicationConfig::from_env())?;
/// app.run_until_shutdown().await
/// # }
/// ```
pub struct RestApplication {
    app: Application,
}

impl RestApplication {
    pub fn new(config: ApplicationConfig) -> Result<Self> {
        Self::with_container(Container::new(), config)
    }

    pub fn with_container(container: Container, config: ApplicationConfig) -> Result<Self> {
        let component = RestComponent::new(container.clone(), config.clone());
        let app = Application::builder()
            .config(config)
            .container(container)
            .single_server()
            .component(component)
            .build()?;
        Ok(Self { app })
    }

    pub fn rest_server(&self) -> Result<Arc<RestServer>> {
        self.app.get_server(REST_SERVER_NAME)
    }

    pub fn into_inner(self) -> Application {
        self.app
    }
}

impl Deref for RestApplication {
    type Target = Application;

    fn deref(&self) -> &Application {
        &self.app
    }
}

impl DerefMut for RestApplication {
    fn deref_mut(&mut self) -> &mut Application {
        &mut self.app
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::{ApplicationError, Server};
    use crate::error::StratumError;
    use crate::metadata::MetadataStore;
    use async_trait::async_trait;

    struct OtherServer;

    #[async_trait]
    impl Server for OtherServer {
        async fn start(&self) -> std::result::Result<(), ApplicationError> {
            Ok(())
        }

        async fn stop(&self) -> std::result::Result<(), ApplicationError> {
            Ok(())
        }

        fn is_running(&self) -> bool {
            false
        }
    }

    fn given_app() -> RestApplication {
        RestApplication::with_container(
            Container::with_store(MetadataStore::new()),
            ApplicationConfig::default(),
        )
        .unwrap()
    }

    #[test]
    fn test_binds_rest_server() {
        let app = given_app();
        assert!(app.container().contains("servers.RestServer"));
        assert!(app.container().contains("components.RestComponent"));
        assert!(app.rest_server().is_ok());
    }

    #[test]
    fn test_rejects_second_server() {
        let mut app = given_app();
        let err = app.server(OtherServer, None).unwrap_err();
        assert!(matches!(
            err,
            StratumError::Application(ApplicationError::MultipleServerBinding)
        ));
        assert_eq!(
            err.to_string(),
            "RestApplication does not support multiple servers! To create your own server bindings, please extend the Application class."
        );
    }
}
