//! Server and component contracts

use super::ApplicationError;
use crate::di::Instance;
use crate::metadata::Class;
use async_trait::async_trait;
use std::sync::Arc;

/// A long-running server bound into an application
///
/// Servers are shared behind `Arc`, so state changed by `start`/`stop` lives
/// behind interior mutability.
///
/// # Example
///
/// ```rust,ignore
/// use stratum::application::{ApplicationError, Server};
/// use async_trait::async_trait;
/// use std::sync::atomic::{AtomicBool, Ordering};
///
/// #[derive(Default)]
/// struct QueueConsumer {
///     running: AtomicBool,
/// }
///
/// #[async_trait]
/// impl Server for QueueConsumer {
///     async fn start(&self) -> Result<(), ApplicationError> {
///         self.running.store(true, Ordering::SeqCst);
///         Ok(())
///     }
///
///     async fn stop(&self) -> Result<(), ApplicationError> {
///         self.running.store(false, Ordering::SeqCst);
///         Ok(())
///     }
///
///     fn is_running(&self) -> bool {
///         self.running.load(Ordering::SeqCst)
///     }
/// }
/// ```
#[async_trait]
pub trait Server: Send + Sync + 'static {
    async fn start(&self) -> Result<(), ApplicationError>;

    async fn stop(&self) -> Result<(), ApplicationError>;

    fn is_running(&self) -> bool;
}

/// What a `servers.*` binding holds: the server as a [`Server`] and as a
/// type-erased instance for typed lookups
#[derive(Clone)]
pub struct ServerEntry {
    pub(crate) server: Arc<dyn Server>,
    pub(crate) instance: Instance,
}

impl ServerEntry {
    pub fn new<S: Server>(server: S) -> Self {
        let server = Arc::new(server);
        Self {
            server: Arc::clone(&server) as Arc<dyn Server>,
            instance: server as Instance,
        }
    }

    pub fn server(&self) -> &Arc<dyn Server> {
        &self.server
    }
}

/// A server to bind under a name
pub struct ServerRegistration {
    pub name: String,
    pub entry: ServerEntry,
}

impl ServerRegistration {
    pub fn new<S: Server>(name: impl Into<String>, server: S) -> Self {
        Self {
            name: name.into(),
            entry: ServerEntry::new(server),
        }
    }

    /// Register under the server's type name
    pub fn unnamed<S: Server>(server: S) -> Self {
        Self::new(short_type_name::<S>(), server)
    }
}

/// A bundle of controllers and servers contributed to an application
pub trait Component: Send + Sync + 'static {
    fn controllers(&self) -> Vec<Class> {
        Vec::new()
    }

    fn servers(&self) -> Vec<ServerRegistration> {
        Vec::new()
    }
}

/// `Foo` for `my_crate::module::Foo<Bar>`
pub(crate) fn short_type_name<T: ?Sized>() -> String {
    let full = std::any::type_name::<T>();
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base).to_string()
}
