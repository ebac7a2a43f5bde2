//! # Stratum
//!
//! Decorator-style metadata for Rust types, and the dependency injection
//! container and REST layer built on top of it.
//!
//! ## Features
//!
//! - **Metadata store**: per-class, per-key metadata that subclasses inherit
//! - **Decorator factories**: class, property, method, parameter and
//!   method-parameter decorators with merge and duplicate detection
//! - **Dependency Injection**: a binding container that instantiates types
//!   from their injection metadata
//! - **Applications**: controllers, components and servers with ordered start/stop
//! - **REST**: controller metadata rendered as an OpenAPI document served by axum
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stratum::prelude::*;
//! use std::sync::LazyLock;
//!
//! static GREET_CONTROLLER: LazyLock<Class> = LazyLock::new(|| {
//!     let class = Class::builder("GreetController").method("greet", 1).build();
//!     rest::api(&class, ControllerSpec::new("/greetings")).expect("api");
//!     rest::get(&class, "greet", "/{name}").expect("operation");
//!     rest::param(&class, "greet", ParameterObject::path("name", "string")).expect("param");
//!     class
//! });
//!
//! #[tokio::main]
//! async fn main() -> stratum::Result<()> {
//!     let mut app = RestApplication::new(ApplicationConfig::from_env())?;
//!     app.controller(&GREET_CONTROLLER, None);
//!
//!     // GET /openapi.json lists GET /greetings/{name}
//!     app.run_until_shutdown().await
//! }
//! ```

pub mod application;
pub mod config;
pub mod di;
pub mod error;
pub mod metadata;
pub mod rest;

// Re-export core types
pub use application::{Application, ApplicationBuilder, Component, Server};
pub use di::{Container, ContainerBuilder, Injectable};
pub use error::{Result, StratumError};
pub use metadata::{Class, MetadataInspector, MetadataStore};
pub use rest::RestApplication;

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use stratum::prelude::*;
/// ```
pub mod prelude {
    pub use crate::application::{
        Application, ApplicationBuilder, ApplicationError, Component, Server, ServerRegistration,
        shutdown_signal,
    };
    pub use crate::config::{ApplicationConfig, ConfigService, RestConfig};
    pub use crate::di::{
        Binding, Container, ContainerBuilder, Dependencies, InjectSpec, Injectable, inject,
    };
    pub use crate::error::{Result, StratumError};
    pub use crate::metadata::{
        Class, ClassDecoratorFactory, DecorationSite, Decorator, DecoratorFactory,
        DecoratorOptions, InspectionOptions, MetadataError, MetadataInspector, MetadataSpec,
        MetadataStore, MethodDecoratorFactory, MethodParameterDecoratorFactory,
        ParameterDecoratorFactory, PropertyDecoratorFactory, Side, SpecValue,
    };
    pub use crate::rest::{
        self, ControllerSpec, OpenApiSpec, OperationObject, ParameterObject, RestApplication,
        RestServer, Verb,
    };
    pub use async_trait::async_trait;
    pub use std::sync::Arc;
}
