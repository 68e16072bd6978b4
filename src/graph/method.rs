//! Method nodes of the type graph.
//!
//! # Key Types
//! - [`MethodNode`]: A declared method or constructor
//! - [`MethodModifiers`]: Attribute flags relevant for dispatch and construction
//! - [`ParamType`]: Parameter type descriptors

use std::sync::Arc;

use bitflags::bitflags;

use crate::token::Token;

/// Name of instance constructors (ECMA-335 II.10.5.1)
pub const CTOR_NAME: &str = ".ctor";
/// Name of type initializers (ECMA-335 II.10.5.3)
pub const CCTOR_NAME: &str = ".cctor";

/// Reference to a `MethodNode`
pub type MethodNodeRc = Arc<MethodNode>;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    /// Method attribute flags, values as in the `MethodDef` table
    pub struct MethodModifiers: u32 {
        /// Defined on type, else per instance
        const STATIC = 0x0010;
        /// Method cannot be overridden
        const FINAL = 0x0020;
        /// Method is virtual
        const VIRTUAL = 0x0040;
        /// Method always gets a new slot in the vtable
        const NEW_SLOT = 0x0100;
        /// Method does not provide an implementation
        const ABSTRACT = 0x0400;
        /// Method is special
        const SPECIAL_NAME = 0x0800;
        /// CLI provides 'special' behavior, depending upon the name of the method
        const RTSPECIAL_NAME = 0x1000;
    }
}

/// Parameter type descriptor.
///
/// Mirrors the element types of a method signature closely enough to recognise the native
/// handle primitive; class and value types point at their `TypeDef` in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamType {
    /// `System.Boolean`
    Boolean,
    /// `System.Int32`
    I4,
    /// `System.UInt32`
    U4,
    /// `System.Int64`
    I8,
    /// `System.UInt64`
    U8,
    /// `System.Double`
    R8,
    /// `System.IntPtr`, the native handle primitive
    I,
    /// `System.UIntPtr`
    U,
    /// `System.String`
    String,
    /// `System.Object`
    Object,
    /// Reference type defined in the graph
    Class(Token),
    /// Value type defined in the graph
    ValueType(Token),
}

/// A method (or constructor) declared by a [`crate::graph::TypeNode`].
///
/// Method nodes are created by [`crate::graph::TypeGraphBuilder`] and are read-only afterwards.
/// The export marker is resolved once while the graph is built, by looking at the attribute
/// types attached to the method.
#[derive(Debug)]
pub struct MethodNode {
    /// `MethodDef` token
    pub token: Token,
    /// Token of the type declaring this method
    pub declaring_type: Token,
    /// Method name (`.ctor` for instance constructors)
    pub name: String,
    /// Attribute flags
    pub flags: MethodModifiers,
    /// Parameter types in signature order
    pub params: Vec<ParamType>,
    /// Types of the custom attributes attached to this method, in declaration order
    pub attributes: Vec<Token>,
    /// Virtual methods this method overrides (base class slot and/or interface slots)
    pub overrides: Vec<Token>,
    pub(crate) exported: bool,
}

impl MethodNode {
    /// Returns true if the method occupies a virtual slot
    #[must_use]
    pub fn is_virtual(&self) -> bool {
        self.flags.contains(MethodModifiers::VIRTUAL)
    }

    /// Returns true if the method is static
    #[must_use]
    pub fn is_static(&self) -> bool {
        self.flags.contains(MethodModifiers::STATIC)
    }

    /// Returns true for instance constructors
    #[must_use]
    pub fn is_constructor(&self) -> bool {
        self.name == CTOR_NAME
            && self.flags.contains(MethodModifiers::RTSPECIAL_NAME)
            && !self.is_static()
    }

    /// Returns true if the method carries an export marker, i.e. it is reachable by selector
    /// from the native side.
    #[must_use]
    pub fn is_exported(&self) -> bool {
        self.exported
    }

    /// Returns true if this constructor takes exactly one parameter of the given type.
    #[must_use]
    pub fn has_single_param(&self, param: ParamType) -> bool {
        matches!(self.params.as_slice(), [only] if *only == param)
    }
}
