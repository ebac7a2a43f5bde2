//! Applications, components and servers
//!
//! ```text
//! 1. Declare classes and their metadata
//!    ↓
//! 2. Build the Application (bind controllers, components, servers)
//!    ↓
//! 3. start()   ← every `server`-tagged binding, in key order
//!    ↓
//! [Serving... metadata is read-only from here]
//!    ↓
//! 4. Shutdown signal
//!    ↓
//! 5. stop()    ← reverse order
//! ```

mod app;
mod error;
mod server;
mod shutdown;

pub use app::{
    Application, ApplicationBuilder, COMPONENT_TAG, CONFIG_KEY, CONTROLLER_TAG, SERVER_TAG,
};
pub use error::ApplicationError;
pub use server::{Component, Server, ServerEntry, ServerRegistration};
pub use shutdown::shutdown_signal;
