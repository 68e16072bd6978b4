//! Type nodes of the type graph.

use std::{fmt, sync::Arc};

use crate::{graph::AssemblyIdentity, token::Token};

/// Reference to a `TypeNode`
pub type TypeNodeRc = Arc<TypeNode>;

/// Namespace-qualified type name, used to name well-known types in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeName {
    /// Namespace, empty for the global namespace
    pub namespace: &'static str,
    /// Simple name
    pub name: &'static str,
}

impl TypeName {
    /// Create a new type name
    #[must_use]
    pub const fn new(namespace: &'static str, name: &'static str) -> Self {
        Self { namespace, name }
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

/// A type definition in the graph.
///
/// Structural edges (declaring type, base type, interfaces, methods) are stored as tokens and
/// resolved through the owning [`crate::graph::TypeGraph`].
#[derive(Debug)]
pub struct TypeNode {
    /// `TypeDef` token
    pub token: Token,
    /// Assembly this type is defined in
    pub assembly: AssemblyIdentity,
    /// `TypeNamespace` (empty for nested types and the global namespace)
    pub namespace: String,
    /// `TypeName`
    pub name: String,
    /// The enclosing type, if this type is nested
    pub declaring_type: Option<Token>,
    /// The base type aka 'extends'
    pub base: Option<Token>,
    /// All interfaces this type directly implements
    pub interfaces: Vec<Token>,
    /// All methods this type declares, in declaration order
    pub methods: Vec<Token>,
}

impl TypeNode {
    /// Returns the full name (Namespace.Name) of the type
    #[must_use]
    pub fn fullname(&self) -> String {
        if self.namespace.is_empty() {
            self.name.clone()
        } else {
            format!("{}.{}", self.namespace, self.name)
        }
    }

    /// Returns true if the type has the given namespace and name
    #[must_use]
    pub fn is(&self, name: &TypeName) -> bool {
        self.namespace == name.namespace && self.name == name.name
    }
}
