mod binding;
mod builder;
mod container;
pub mod inject;
mod injectable;

pub use binding::{Binding, BindingValue, Instance};
pub use builder::ContainerBuilder;
pub use container::Container;
pub use inject::{InjectSpec, InjectionPlan};
pub use injectable::{Dependencies, Injectable};
