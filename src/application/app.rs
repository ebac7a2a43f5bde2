//! Application bootstrap
//!
//! An [`Application`] is a [`Container`] plus conventions: controllers are
//! bound under `controllers.<name>`, components under `components.<name>`
//! and servers under `servers.<name>`, each tagged with its kind.

use super::server::{Component, ServerEntry, ServerRegistration, short_type_name};
use super::{ApplicationError, Server, shutdown_signal};
use crate::config::ApplicationConfig;
use crate::di::{Binding, Container};
use crate::error::{Result, StratumError};
use crate::metadata::Class;
use std::sync::Arc;

/// Binding key of the [`ApplicationConfig`]
pub const CONFIG_KEY: &str = "application.config";

pub const CONTROLLER_TAG: &str = "controller";
pub const COMPONENT_TAG: &str = "component";
pub const SERVER_TAG: &str = "server";

/// A container of controllers, components and servers
///
/// # Example
///
/// ```rust,ignore
/// use stratum::application::Application;
///
/// #[tokio::main]
/// async fn main() -> stratum::Result<()> {
///     let mut app = Application::builder()
///         .config(ApplicationConfig::from_env())
///         .build()?;
///     app.controller(&PING_CONTROLLER, None);
///     app.server(QueueConsumer::default(), None)?;
///
///     app.run_until_shutdown().await
/// }
/// ```
pub struct Application {
    container: Container,
    config: ApplicationConfig,
    single_server: bool,
}

impl Application {
    pub fn new(config: ApplicationConfig) -> Self {
        Self::with_container(Container::new(), config)
    }

    /// Application over an existing container
    pub fn with_container(mut container: Container, config: ApplicationConfig) -> Self {
        container.bind(CONFIG_KEY, config.clone());
        Self {
            container,
            config,
            single_server: false,
        }
    }

    pub fn builder() -> ApplicationBuilder {
        ApplicationBuilder::new()
    }

    /// Reject any server binding after the first
    fn restrict_to_single_server(&mut self) {
        self.single_server = true;
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn container_mut(&mut self) -> &mut Container {
        &mut self.container
    }

    pub fn config(&self) -> &ApplicationConfig {
        &self.config
    }

    /// Bind a controller class, named after the class unless `name` is given
    pub fn controller(&mut self, class: &Class, name: Option<&str>) -> Binding {
        let name = name.unwrap_or(class.name());
        let key = format!("controllers.{name}");
        let binding = Binding::instance(key, class.clone()).tag(CONTROLLER_TAG);
        self.container.add(binding.clone());
        tracing::debug!(key = binding.key(), "bound controller");
        binding
    }

    /// Bind a component together with the controllers and servers it contributes
    pub fn component<C: Component>(&mut self, component: C, name: Option<&str>) -> Result<Binding> {
        let name = name
            .map(str::to_string)
            .unwrap_or_else(short_type_name::<C>);

        for class in component.controllers() {
            self.controller(&class, None);
        }
        for registration in component.servers() {
            self.add_server(registration)?;
        }

        let key = format!("components.{name}");
        let binding = Binding::instance(key, component).tag(COMPONENT_TAG);
        self.container.add(binding.clone());
        tracing::debug!(key = binding.key(), "bound component");
        Ok(binding)
    }

    /// Bind a server, named after its type unless `name` is given
    ///
    /// # Errors
    /// `MultipleServerBinding` on a single-server application that already
    /// has a server.
    pub fn server<S: Server>(&mut self, server: S, name: Option<&str>) -> Result<Binding> {
        let registration = match name {
            Some(name) => ServerRegistration::new(name, server),
            None => ServerRegistration::unnamed(server),
        };
        self.add_server(registration)
    }

    pub fn add_server(&mut self, registration: ServerRegistration) -> Result<Binding> {
        if self.single_server && !self.container.find_by_tag(SERVER_TAG).is_empty() {
            return Err(ApplicationError::MultipleServerBinding.into());
        }
        let key = format!("servers.{}", registration.name);
        let binding = Binding::instance(key, registration.entry).tag(SERVER_TAG);
        self.container.add(binding.clone());
        tracing::debug!(key = binding.key(), "bound server");
        Ok(binding)
    }

    fn server_entry(&self, name: &str) -> Result<Arc<ServerEntry>> {
        let key = format!("servers.{name}");
        if !self.container.contains(&key) {
            let name = name.to_string();
            return Err(ApplicationError::ServerNotFound { name }.into());
        }
        self.container.get::<ServerEntry>(&key)
    }

    /// The server bound under `name`
    pub fn get_server<S: Server>(&self, name: &str) -> Result<Arc<S>> {
        let entry = self.server_entry(name)?;
        Arc::clone(&entry.instance)
            .downcast::<S>()
            .map_err(|_| StratumError::DowncastFailed {
                key: format!("servers.{name}"),
                type_name: std::any::type_name::<S>().to_string(),
            })
    }

    /// The server bound under its type name
    pub fn get_server_by_type<S: Server>(&self) -> Result<Arc<S>> {
        self.get_server(&short_type_name::<S>())
    }

    /// Start every binding tagged `server`, in key order
    ///
    /// If a server fails to start, the ones already started are stopped
    /// again in reverse order before the error is returned.
    pub async fn start(&self) -> Result<()> {
        let servers = self.container.find_by_tag(SERVER_TAG);
        tracing::info!("Starting {} server(s)...", servers.len());

        let mut started = Vec::with_capacity(servers.len());
        for binding in &servers {
            let entry = match self.container.get::<ServerEntry>(binding.key()) {
                Ok(entry) => entry,
                Err(e) => {
                    Self::roll_back(&started).await;
                    return Err(e);
                }
            };
            if let Err(e) = entry.server.start().await {
                tracing::error!("Failed to start {}: {}", binding.key(), e);
                Self::roll_back(&started).await;
                return Err(e.into());
            }
            tracing::debug!("Started: {}", binding.key());
            started.push((binding.key().to_string(), entry));
        }

        tracing::info!("Application started");
        Ok(())
    }

    async fn roll_back(started: &[(String, Arc<ServerEntry>)]) {
        for (key, entry) in started.iter().rev() {
            if let Err(e) = entry.server.stop().await {
                tracing::error!("Failed to stop {} after a failed start: {}", key, e);
            }
        }
    }

    /// Stop every binding tagged `server`, in reverse key order
    pub async fn stop(&self) -> Result<()> {
        tracing::info!("Stopping application...");

        for binding in self.container.find_by_tag(SERVER_TAG).iter().rev() {
            let entry = self.container.get::<ServerEntry>(binding.key())?;
            entry.server.stop().await.map_err(|e| {
                tracing::error!("Failed to stop {}: {}", binding.key(), e);
                e
            })?;
            tracing::debug!("Stopped: {}", binding.key());
        }

        tracing::info!("Application stopped");
        Ok(())
    }

    /// Start, wait for Ctrl+C or SIGTERM, then stop
    pub async fn run_until_shutdown(&self) -> Result<()> {
        self.start().await?;
        shutdown_signal().await;
        self.stop().await
    }
}

type Registration = Box<dyn FnOnce(&mut Application) -> Result<()> + Send>;

/// Builder for [`Application`]
///
/// Components and servers are registered in the order they were added.
pub struct ApplicationBuilder {
    config: ApplicationConfig,
    container: Option<Container>,
    registrations: Vec<Registration>,
    single_server: bool,
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ApplicationBuilder {
    pub fn new() -> Self {
        Self {
            config: ApplicationConfig::default(),
            container: None,
            registrations: Vec::new(),
            single_server: false,
        }
    }

    pub fn config(mut self, config: ApplicationConfig) -> Self {
        self.config = config;
        self
    }

    /// Use an existing container instead of a fresh one
    pub fn container(mut self, container: Container) -> Self {
        self.container = Some(container);
        self
    }

    pub fn controller(mut self, class: Class) -> Self {
        self.registrations.push(Box::new(move |app| {
            app.controller(&class, None);
            Ok(())
        }));
        self
    }

    pub fn component<C: Component>(mut self, component: C) -> Self {
        self.registrations.push(Box::new(move |app| {
            app.component(component, None)?;
            Ok(())
        }));
        self
    }

    pub fn server<S: Server>(mut self, name: impl Into<String>, server: S) -> Self {
        let registration = ServerRegistration::new(name, server);
        self.registrations.push(Box::new(move |app| {
            app.add_server(registration)?;
            Ok(())
        }));
        self
    }

    pub(crate) fn single_server(mut self) -> Self {
        self.single_server = true;
        self
    }

    /// Build the application, registering components and servers
    ///
    /// # Errors
    /// Returns the first registration error.
    pub fn build(self) -> Result<Application> {
        let container = self.container.unwrap_or_default();
        let mut app = Application::with_container(container, self.config);
        if self.single_server {
            app.restrict_to_single_server();
        }
        for register in self.registrations {
            register(&mut app)?;
        }
        Ok(app)
    }
}
