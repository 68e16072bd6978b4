//! Fluent construction of a [`TypeGraph`].
//!
//! The pipeline (or a test) registers assemblies' types and methods one by one and receives
//! their tokens back, so later calls can reference them: base types, interfaces, declaring
//! types, attribute types and overridden methods. References may point forward; they are
//! validated once in [`TypeGraphBuilder::build`], which is also where export markers are
//! resolved into a per-method flag.
//!
//! # Examples
//!
//! ```rust
//! use nsmark::graph::{AssemblyIdentity, MethodBuilder, TypeBuilder, TypeGraphBuilder};
//!
//! let platform = AssemblyIdentity::parse("Xamarin.iOS")?;
//! let app = AssemblyIdentity::parse("App")?;
//!
//! let mut builder = TypeGraphBuilder::new();
//! let export = builder.add_type(&platform, TypeBuilder::new("Foundation", "ExportAttribute"))?;
//! let nsobject = builder.add_type(&platform, TypeBuilder::new("Foundation", "NSObject"))?;
//! let view = builder.add_type(&app, TypeBuilder::new("App", "View").extends(nsobject))?;
//! let draw = builder.add_method(nsobject, MethodBuilder::new("Draw").virtual_().attribute(export))?;
//! builder.add_method(view, MethodBuilder::new("Draw").virtual_().overrides(draw))?;
//!
//! let graph = builder.build()?;
//! assert!(graph.get_method(&draw).unwrap().is_exported());
//! # Ok::<(), nsmark::Error>(())
//! ```

use std::{collections::HashMap, sync::Arc};

use crate::{
    graph::{
        inheritance_chain, AssemblyIdentity, MethodModifiers, MethodNode, ParamType, TypeGraph,
        TypeName, TypeNode, CTOR_NAME,
    },
    token::Token,
    Error, Result,
};

/// The attribute type marking members that are reachable by selector from the native side.
/// Attributes deriving from it are export markers as well.
pub const EXPORT_ATTRIBUTE: TypeName = TypeName::new("Foundation", "ExportAttribute");

/// Largest row number a 24-bit token row can hold
const MAX_ROW: usize = 0x00FF_FFFF;

/// Depth bound for walking attribute type hierarchies
const MAX_ATTRIBUTE_DEPTH: usize = 64;

/// Description of a type to add to the graph.
#[derive(Debug, Clone)]
pub struct TypeBuilder {
    namespace: String,
    name: String,
    declaring_type: Option<Token>,
    base: Option<Token>,
    interfaces: Vec<Token>,
}

impl TypeBuilder {
    /// Start describing a type with the given namespace and name
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            declaring_type: None,
            base: None,
            interfaces: Vec::new(),
        }
    }

    /// Set the base type
    #[must_use]
    pub fn extends(mut self, base: Token) -> Self {
        self.base = Some(base);
        self
    }

    /// Add a directly implemented interface
    #[must_use]
    pub fn implements(mut self, interface: Token) -> Self {
        self.interfaces.push(interface);
        self
    }

    /// Nest this type inside `declaring_type`
    #[must_use]
    pub fn nested_in(mut self, declaring_type: Token) -> Self {
        self.declaring_type = Some(declaring_type);
        self
    }
}

/// Description of a method to add to the graph.
#[derive(Debug, Clone)]
pub struct MethodBuilder {
    name: String,
    flags: MethodModifiers,
    params: Vec<ParamType>,
    attributes: Vec<Token>,
    overrides: Vec<Token>,
}

impl MethodBuilder {
    /// Start describing a method with the given name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            flags: MethodModifiers::empty(),
            params: Vec::new(),
            attributes: Vec::new(),
            overrides: Vec::new(),
        }
    }

    /// Start describing an instance constructor
    #[must_use]
    pub fn constructor() -> Self {
        Self::new(CTOR_NAME).flags(MethodModifiers::SPECIAL_NAME | MethodModifiers::RTSPECIAL_NAME)
    }

    /// Add raw attribute flags
    #[must_use]
    pub fn flags(mut self, flags: MethodModifiers) -> Self {
        self.flags |= flags;
        self
    }

    /// Mark the method virtual
    #[must_use]
    pub fn virtual_(self) -> Self {
        self.flags(MethodModifiers::VIRTUAL)
    }

    /// Mark the method abstract (and virtual)
    #[must_use]
    pub fn abstract_(self) -> Self {
        self.flags(MethodModifiers::VIRTUAL | MethodModifiers::ABSTRACT)
    }

    /// Mark the method static
    #[must_use]
    pub fn static_(self) -> Self {
        self.flags(MethodModifiers::STATIC)
    }

    /// Append a parameter
    #[must_use]
    pub fn param(mut self, param: ParamType) -> Self {
        self.params.push(param);
        self
    }

    /// Attach a custom attribute of the given attribute type
    #[must_use]
    pub fn attribute(mut self, attribute_type: Token) -> Self {
        self.attributes.push(attribute_type);
        self
    }

    /// Record that this method overrides the virtual method `base`
    #[must_use]
    pub fn overrides(mut self, base: Token) -> Self {
        self.overrides.push(base);
        self
    }
}

struct PendingType {
    assembly: AssemblyIdentity,
    desc: TypeBuilder,
    methods: Vec<Token>,
}

struct PendingMethod {
    declaring_type: Token,
    desc: MethodBuilder,
}

/// Collects types and methods and seals them into a [`TypeGraph`].
///
/// Tokens are allocated sequentially across all assemblies, so every node has a unique token
/// and the graph's token order equals registration order.
pub struct TypeGraphBuilder {
    types: Vec<PendingType>,
    methods: Vec<PendingMethod>,
    export_attribute: TypeName,
}

impl Default for TypeGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeGraphBuilder {
    /// Create an empty builder recognising [`EXPORT_ATTRIBUTE`] as the export marker
    #[must_use]
    pub fn new() -> Self {
        Self {
            types: Vec::new(),
            methods: Vec::new(),
            export_attribute: EXPORT_ATTRIBUTE,
        }
    }

    /// Use a different attribute type as export marker
    #[must_use]
    pub fn export_attribute(mut self, attribute: TypeName) -> Self {
        self.export_attribute = attribute;
        self
    }

    /// Register a type owned by `assembly` and return its token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for an empty type name or if the `TypeDef` table is
    /// full.
    pub fn add_type(&mut self, assembly: &AssemblyIdentity, ty: TypeBuilder) -> Result<Token> {
        if ty.name.is_empty() {
            return Err(malformed_error!(
                "Type name cannot be empty (namespace '{}')",
                ty.namespace
            ));
        }
        if self.types.len() >= MAX_ROW {
            return Err(malformed_error!("TypeDef table is full"));
        }

        self.types.push(PendingType {
            assembly: assembly.clone(),
            desc: ty,
            methods: Vec::new(),
        });
        Ok(Token::type_def(self.types.len() as u32))
    }

    /// Declare a method on the previously registered type `ty` and return its token.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TypeNotFound`] if `ty` was not registered, or
    /// [`crate::Error::Malformed`] for an empty name or a full `MethodDef` table.
    pub fn add_method(&mut self, ty: Token, method: MethodBuilder) -> Result<Token> {
        if method.name.is_empty() {
            return Err(malformed_error!("Method name cannot be empty (type {})", ty));
        }
        if self.methods.len() >= MAX_ROW {
            return Err(malformed_error!("MethodDef table is full"));
        }

        let index = self.type_index(ty).ok_or(Error::TypeNotFound(ty))?;
        self.methods.push(PendingMethod {
            declaring_type: ty,
            desc: method,
        });

        let token = Token::method_def(self.methods.len() as u32);
        self.types[index].methods.push(token);
        Ok(token)
    }

    /// Nest `child` inside `parent` after both were registered.
    ///
    /// Nesting information usually arrives after all type definitions have been read, so it
    /// can be attached late. No cycle check happens here; the graph is handed over as
    /// supplied.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TypeNotFound`] if either type was not registered.
    pub fn set_declaring_type(&mut self, child: Token, parent: Token) -> Result<()> {
        self.type_index(parent).ok_or(Error::TypeNotFound(parent))?;
        let index = self.type_index(child).ok_or(Error::TypeNotFound(child))?;
        self.types[index].desc.declaring_type = Some(parent);
        Ok(())
    }

    /// Validate all references, resolve export markers and seal the graph.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Malformed`] for references to types or methods that were never
    /// registered, or [`crate::Error::RecursionLimit`] for a cyclic attribute hierarchy.
    pub fn build(self) -> Result<TypeGraph> {
        self.validate()?;

        let mut graph = TypeGraph::new();
        for (index, pending) in self.types.into_iter().enumerate() {
            let PendingType {
                assembly,
                desc,
                methods,
            } = pending;

            graph.insert_type(Arc::new(TypeNode {
                token: Token::type_def(index as u32 + 1),
                assembly,
                namespace: desc.namespace,
                name: desc.name,
                declaring_type: desc.declaring_type,
                base: desc.base,
                interfaces: desc.interfaces,
                methods,
            }));
        }

        let mut export_cache: HashMap<Token, bool> = HashMap::new();
        for (index, pending) in self.methods.into_iter().enumerate() {
            let mut exported = false;
            for attribute in &pending.desc.attributes {
                let is_export = match export_cache.get(attribute) {
                    Some(cached) => *cached,
                    None => {
                        let resolved =
                            is_export_attribute(&graph, *attribute, &self.export_attribute)?;
                        export_cache.insert(*attribute, resolved);
                        resolved
                    }
                };
                if is_export {
                    exported = true;
                    break;
                }
            }

            let MethodBuilder {
                name,
                flags,
                params,
                attributes,
                overrides,
            } = pending.desc;

            graph.insert_method(Arc::new(MethodNode {
                token: Token::method_def(index as u32 + 1),
                declaring_type: pending.declaring_type,
                name,
                flags,
                params,
                attributes,
                overrides,
                exported,
            }));
        }

        Ok(graph)
    }

    fn type_index(&self, token: Token) -> Option<usize> {
        if !token.is_type_def() {
            return None;
        }
        let index = (token.row() as usize).checked_sub(1)?;
        (index < self.types.len()).then_some(index)
    }

    fn method_exists(&self, token: Token) -> bool {
        token.is_method_def() && token.row() != 0 && (token.row() as usize) <= self.methods.len()
    }

    fn validate(&self) -> Result<()> {
        for (index, pending) in self.types.iter().enumerate() {
            let owner = Token::type_def(index as u32 + 1);
            let desc = &pending.desc;

            let references = desc
                .declaring_type
                .iter()
                .chain(desc.base.iter())
                .chain(desc.interfaces.iter());
            for reference in references {
                if self.type_index(*reference).is_none() {
                    return Err(malformed_error!(
                        "Type {} ({}.{}) references unknown type {}",
                        owner,
                        desc.namespace,
                        desc.name,
                        reference
                    ));
                }
            }
        }

        for (index, pending) in self.methods.iter().enumerate() {
            let owner = Token::method_def(index as u32 + 1);
            let desc = &pending.desc;

            let param_types = desc.params.iter().filter_map(|param| match param {
                ParamType::Class(token) | ParamType::ValueType(token) => Some(token),
                _ => None,
            });
            for reference in desc.attributes.iter().chain(param_types) {
                if self.type_index(*reference).is_none() {
                    return Err(malformed_error!(
                        "Method {} ({}) references unknown type {}",
                        owner,
                        desc.name,
                        reference
                    ));
                }
            }

            for base in &desc.overrides {
                if !self.method_exists(*base) {
                    return Err(malformed_error!(
                        "Method {} ({}) overrides unknown method {}",
                        owner,
                        desc.name,
                        base
                    ));
                }
            }
        }

        Ok(())
    }
}

fn is_export_attribute(graph: &TypeGraph, attribute: Token, export: &TypeName) -> Result<bool> {
    let Some(node) = graph.get_type(&attribute) else {
        return Ok(false);
    };

    let chain = inheritance_chain(&graph.types, &node, MAX_ATTRIBUTE_DEPTH)?;
    Ok(chain.iter().any(|ty| ty.is(export)))
}
