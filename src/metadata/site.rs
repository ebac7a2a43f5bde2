use super::class::{Class, Side, Target};
use strum_macros::Display;

/// Kind of declaration a decorator is applied to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
#[strum(serialize_all = "lowercase")]
pub enum SiteKind {
    Class,
    Property,
    Method,
    Parameter(usize),
}

/// The declaration a decorator is applied to
///
/// This is the explicit form of "class / member / parameter index" that is
/// passed through the whole merge pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecorationSite {
    target: Target,
    member: Option<String>,
    kind: SiteKind,
}

impl DecorationSite {
    pub fn new(target: Target, member: Option<String>, kind: SiteKind) -> Self {
        Self {
            target,
            member,
            kind,
        }
    }

    /// The class as a whole
    pub fn class(class: &Class) -> Self {
        Self::new(class.as_target(), None, SiteKind::Class)
    }

    /// An instance property
    pub fn property(class: &Class, name: impl Into<String>) -> Self {
        Self::new(class.prototype(), Some(name.into()), SiteKind::Property)
    }

    pub fn static_property(class: &Class, name: impl Into<String>) -> Self {
        Self::new(class.as_target(), Some(name.into()), SiteKind::Property)
    }

    /// An instance method
    pub fn method(class: &Class, name: impl Into<String>) -> Self {
        Self::new(class.prototype(), Some(name.into()), SiteKind::Method)
    }

    pub fn static_method(class: &Class, name: impl Into<String>) -> Self {
        Self::new(class.as_target(), Some(name.into()), SiteKind::Method)
    }

    /// A parameter of an instance method
    pub fn parameter(class: &Class, method: impl Into<String>, index: usize) -> Self {
        Self::new(
            class.prototype(),
            Some(method.into()),
            SiteKind::Parameter(index),
        )
    }

    pub fn static_parameter(class: &Class, method: impl Into<String>, index: usize) -> Self {
        Self::new(
            class.as_target(),
            Some(method.into()),
            SiteKind::Parameter(index),
        )
    }

    /// A constructor parameter
    pub fn constructor_parameter(class: &Class, index: usize) -> Self {
        Self::new(class.as_target(), None, SiteKind::Parameter(index))
    }

    pub fn target(&self) -> &Target {
        &self.target
    }

    pub fn member(&self) -> Option<&str> {
        self.member.as_deref()
    }

    pub fn kind(&self) -> SiteKind {
        self.kind
    }

    /// Key the member's entry is stored under; constructor parameters use `""`
    pub fn member_key(&self) -> &str {
        self.member.as_deref().unwrap_or("")
    }

    pub fn parameter_index(&self) -> Option<usize> {
        match self.kind {
            SiteKind::Parameter(index) => Some(index),
            _ => None,
        }
    }

    /// Human readable descriptor used in diagnostics and errors
    pub fn describe(&self) -> String {
        let name = self.target.name();
        let member = self.member.as_deref().unwrap_or("constructor");
        match self.kind {
            SiteKind::Class => format!("class {name}"),
            SiteKind::Parameter(index) => format!("parameter {name}.{member}[{index}]"),
            kind => format!("{kind} {name}.{member}"),
        }
    }

    /// Declared parameter count of the constructor or method this site belongs to
    pub fn arity(&self) -> Option<usize> {
        let class = self.target.class();
        match (&self.member, self.target.side()) {
            (None, Side::Constructor) => Some(class.constructor_arity()),
            (None, Side::Prototype) => None,
            (Some(member), side) => class.method_arity(side, member),
        }
    }
}
