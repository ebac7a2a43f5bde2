//! Metadata-specific error types

use thiserror::Error;

/// Errors raised while decorating declarations or reading their metadata
#[derive(Debug, Error)]
pub enum MetadataError {
    /// A hook of the abstract factory engine was invoked without an override
    #[error("{0}() is not implemented")]
    NotImplemented(&'static str),

    /// A decorator was applied twice directly on the same declaration
    #[error("Decorator cannot be applied more than once on {target}")]
    DuplicateDecoration {
        /// Descriptor of the declaration, e.g. `property Foo.prototype.bar`
        target: String,
    },

    /// A decorator was applied to a declaration kind it does not support
    #[error("{decorator} decorator cannot be applied to {target}")]
    InvalidSite {
        /// Kind of decorator that was applied
        decorator: &'static str,
        /// Descriptor of the declaration
        target: String,
    },

    /// A parameter decorator referenced a method the class never declared
    #[error("Member '{member}' is not declared on {class}")]
    UnknownMember {
        /// Name of the class
        class: String,
        /// Name of the missing member
        member: String,
    },
}

impl MetadataError {
    /// Create a duplicate decoration error
    pub fn duplicate(target: impl Into<String>) -> Self {
        Self::DuplicateDecoration {
            target: target.into(),
        }
    }

    /// Create an invalid site error
    pub fn invalid_site(decorator: &'static str, target: impl Into<String>) -> Self {
        Self::InvalidSite {
            decorator,
            target: target.into(),
        }
    }
}

/// A specialized Result type for metadata operations
pub type Result<T> = std::result::Result<T, MetadataError>;
