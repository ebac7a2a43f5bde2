//! Declared classes and decoration targets
//!
//! A [`Class`] is the explicit stand-in for a type that carries metadata: it
//! knows its name, its base class and the arity of its constructor and
//! methods. Metadata is attached to a [`Target`], which is either the class
//! itself ([`Side::Constructor`]) or its instance side ([`Side::Prototype`]).

use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use uuid::Uuid;

/// Unique identity of a declared class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct ClassId(Uuid);

/// Which side of a class a decoration lands on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Side {
    /// The class itself: class decorators, static members, constructor parameters
    Constructor,
    /// Instance members
    Prototype,
}

/// Kind of a declared member
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    Method { arity: usize },
    Property,
}

struct ClassInner {
    id: ClassId,
    name: String,
    parent: Option<Class>,
    constructor_arity: usize,
    members: HashMap<(Side, String), MemberKind>,
}

/// A declared class with an explicit parent link
///
/// Cloning is cheap; clones share identity.
///
/// # Example
/// ```
/// use stratum::metadata::Class;
///
/// let animal = Class::builder("Animal").constructor(1).build();
/// let dog = Class::builder("Dog")
///     .extends(&animal)
///     .method("greet", 2)
///     .build();
///
/// assert!(dog.is_subclass_of(&animal));
/// ```
#[derive(Clone)]
pub struct Class {
    inner: Arc<ClassInner>,
}

impl Class {
    /// Start declaring a new class
    pub fn builder(name: impl Into<String>) -> ClassBuilder {
        ClassBuilder::new(name)
    }

    pub fn id(&self) -> ClassId {
        self.inner.id
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    pub fn parent(&self) -> Option<&Class> {
        self.inner.parent.as_ref()
    }

    pub fn constructor_arity(&self) -> usize {
        self.inner.constructor_arity
    }

    /// This class followed by its base classes, nearest first
    pub fn lineage(&self) -> impl Iterator<Item = Class> {
        std::iter::successors(Some(self.clone()), |class| class.parent().cloned())
    }

    /// Whether `self` derives (directly or transitively) from `other`
    pub fn is_subclass_of(&self, other: &Class) -> bool {
        self.lineage().skip(1).any(|class| class == *other)
    }

    /// Look up a member on this class or the nearest base class declaring it
    pub fn member(&self, side: Side, name: &str) -> Option<MemberKind> {
        let key = (side, name.to_string());
        self.lineage()
            .find_map(|class| class.inner.members.get(&key).copied())
    }

    /// Number of declared parameters of a method, resolved through base classes
    pub fn method_arity(&self, side: Side, name: &str) -> Option<usize> {
        match self.member(side, name)? {
            MemberKind::Method { arity } => Some(arity),
            MemberKind::Property => None,
        }
    }

    /// Target for class-level, static member and constructor parameter decorations
    pub fn as_target(&self) -> Target {
        Target::new(self.clone(), Side::Constructor)
    }

    /// Target for instance member decorations
    pub fn prototype(&self) -> Target {
        Target::new(self.clone(), Side::Prototype)
    }
}

impl PartialEq for Class {
    fn eq(&self, other: &Self) -> bool {
        self.inner.id == other.inner.id
    }
}

impl Eq for Class {}

impl Hash for Class {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.inner.id.hash(state);
    }
}

impl fmt::Debug for Class {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Class")
            .field("name", &self.inner.name)
            .field("parent", &self.parent().map(Class::name))
            .finish()
    }
}

/// Builder for declaring a [`Class`]
pub struct ClassBuilder {
    name: String,
    parent: Option<Class>,
    constructor_arity: usize,
    members: HashMap<(Side, String), MemberKind>,
}

impl ClassBuilder {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            constructor_arity: 0,
            members: HashMap::new(),
        }
    }

    /// Set the base class
    pub fn extends(mut self, parent: &Class) -> Self {
        self.parent = Some(parent.clone());
        self
    }

    /// Declare the number of constructor parameters
    pub fn constructor(mut self, arity: usize) -> Self {
        self.constructor_arity = arity;
        self
    }

    /// Declare an instance method
    pub fn method(mut self, name: impl Into<String>, arity: usize) -> Self {
        self.members
            .insert((Side::Prototype, name.into()), MemberKind::Method { arity });
        self
    }

    /// Declare a static method
    pub fn static_method(mut self, name: impl Into<String>, arity: usize) -> Self {
        let key = (Side::Constructor, name.into());
        self.members.insert(key, MemberKind::Method { arity });
        self
    }

    /// Declare an instance property
    pub fn property(mut self, name: impl Into<String>) -> Self {
        self.members
            .insert((Side::Prototype, name.into()), MemberKind::Property);
        self
    }

    /// Declare a static property
    pub fn static_property(mut self, name: impl Into<String>) -> Self {
        self.members
            .insert((Side::Constructor, name.into()), MemberKind::Property);
        self
    }

    pub fn build(self) -> Class {
        Class {
            inner: Arc::new(ClassInner {
                id: ClassId(Uuid::new_v4()),
                name: self.name,
                parent: self.parent,
                constructor_arity: self.constructor_arity,
                members: self.members,
            }),
        }
    }
}

/// Store key identifying a [`Target`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TargetId {
    pub class: ClassId,
    pub side: Side,
}

/// A class or its instance side, the unit metadata is attached to
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Target {
    class: Class,
    side: Side,
}

impl Target {
    pub fn new(class: Class, side: Side) -> Self {
        Self { class, side }
    }

    pub fn id(&self) -> TargetId {
        TargetId {
            class: self.class.id(),
            side: self.side,
        }
    }

    pub fn class(&self) -> &Class {
        &self.class
    }

    pub fn side(&self) -> Side {
        self.side
    }

    /// `Foo` for the class itself, `Foo.prototype` for its instance side
    pub fn name(&self) -> String {
        match self.side {
            Side::Constructor => self.class.name().to_string(),
            Side::Prototype => format!("{}.prototype", self.class.name()),
        }
    }

    /// The same side of the base class
    pub fn parent(&self) -> Option<Target> {
        self.class
            .parent()
            .map(|parent| Target::new(parent.clone(), self.side))
    }

    /// This target followed by the same side of every base class
    pub fn lineage(&self) -> impl Iterator<Item = Target> {
        std::iter::successors(Some(self.clone()), Target::parent)
    }
}

impl fmt::Debug for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lineage_walks_parents() {
        let a = Class::builder("A").build();
        let b = Class::builder("B").extends(&a).build();
        let c = Class::builder("C").extends(&b).build();

        let names: Vec<_> = c.lineage().map(|class| class.name().to_string()).collect();
        assert_eq!(names, ["C", "B", "A"]);
        assert!(c.is_subclass_of(&a));
        assert!(!a.is_subclass_of(&c));
        assert!(!a.is_subclass_of(&a));
    }

    #[test]
    fn test_method_arity_is_inherited() {
        let base = Class::builder("Base").method("greet", 2).build();
        let sub = Class::builder("Sub")
            .extends(&base)
            .property("name")
            .build();

        assert_eq!(sub.method_arity(Side::Prototype, "greet"), Some(2));
        assert_eq!(sub.method_arity(Side::Constructor, "greet"), None);
        assert_eq!(sub.method_arity(Side::Prototype, "name"), None);
    }

    #[test]
    fn test_target_names() {
        let foo = Class::builder("Foo").build();
        assert_eq!(foo.as_target().name(), "Foo");
        assert_eq!(foo.prototype().name(), "Foo.prototype");
        assert_ne!(foo.as_target().id(), foo.prototype().id());
    }
}
