//! Type graph of a loaded assembly set.
//!
//! The graph holds a node for every type and method across every loaded assembly, with the
//! structural edges the preservation pass needs: nesting, inheritance, interface
//! implementation and override relationships. It is materialized once by the trimming
//! pipeline through [`TypeGraphBuilder`] and is read-only afterwards, which makes it safe to
//! share across the worker threads of a parallel pass.
//!
//! # Key Components
//!
//! - [`TypeGraph`]: Token-indexed storage and structural queries
//! - [`TypeGraphBuilder`]: Fluent construction, reference validation, export-marker resolution
//! - [`TypeNode`] / [`MethodNode`]: The nodes
//! - [`AssemblyIdentity`]: Owner of every type
//!
//! # Examples
//!
//! ```rust
//! use nsmark::graph::{AssemblyIdentity, MethodBuilder, ParamType, TypeBuilder, TypeGraphBuilder};
//!
//! let platform = AssemblyIdentity::parse("Xamarin.iOS")?;
//! let mut builder = TypeGraphBuilder::new();
//! let nsobject = builder.add_type(&platform, TypeBuilder::new("Foundation", "NSObject"))?;
//! let ctor = builder.add_method(nsobject, MethodBuilder::constructor().param(ParamType::I))?;
//! let graph = builder.build()?;
//!
//! let node = graph.get_type(&nsobject).unwrap();
//! assert_eq!(node.fullname(), "Foundation.NSObject");
//! assert_eq!(graph.constructors(&node).next().unwrap().token, ctor);
//! # Ok::<(), nsmark::Error>(())
//! ```

mod builder;
mod identity;
mod method;
mod types;

use std::collections::{HashMap, HashSet};

use crossbeam_skiplist::SkipMap;

pub use builder::{MethodBuilder, TypeBuilder, TypeGraphBuilder, EXPORT_ATTRIBUTE};
pub use identity::{AssemblyIdentity, AssemblyVersion};
pub use method::{MethodModifiers, MethodNode, MethodNodeRc, ParamType, CCTOR_NAME, CTOR_NAME};
pub use types::{TypeName, TypeNode, TypeNodeRc};

use crate::{token::Token, Error, Result};

/// Read-only graph of all types and methods of an assembly set.
///
/// # Architecture
///
/// - **Primary storage**: Token-based skip lists for types and methods, iterated in token
///   order, which is the deterministic traversal order of the preservation pass
/// - **Override index**: Reverse of the per-method override edges (base slot -> overriders)
///
/// # Thread Safety
///
/// The graph is never mutated after [`TypeGraphBuilder::build`] and is [`Send`] + [`Sync`].
pub struct TypeGraph {
    /// Type storage indexed by `TypeDef` token
    types: SkipMap<Token, TypeNodeRc>,
    /// Method storage indexed by `MethodDef` token
    methods: SkipMap<Token, MethodNodeRc>,
    /// Reverse override index: virtual method -> methods overriding it
    overriders: HashMap<Token, Vec<Token>>,
    /// All assemblies owning at least one type, in first-seen order
    assemblies: Vec<AssemblyIdentity>,
}

impl TypeGraph {
    pub(crate) fn new() -> Self {
        TypeGraph {
            types: SkipMap::new(),
            methods: SkipMap::new(),
            overriders: HashMap::new(),
            assemblies: Vec::new(),
        }
    }

    pub(crate) fn insert_type(&mut self, node: TypeNodeRc) {
        if !self.assemblies.contains(&node.assembly) {
            self.assemblies.push(node.assembly.clone());
        }
        self.types.insert(node.token, node);
    }

    pub(crate) fn insert_method(&mut self, node: MethodNodeRc) {
        for base in &node.overrides {
            self.overriders.entry(*base).or_default().push(node.token);
        }
        self.methods.insert(node.token, node);
    }

    /// Number of types in the graph
    #[must_use]
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Returns true if the graph holds no types
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }

    /// Number of methods in the graph
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// All assemblies that own at least one type
    #[must_use]
    pub fn assemblies(&self) -> &[AssemblyIdentity] {
        &self.assemblies
    }

    /// Iterate all types in token order
    pub fn types(&self) -> impl Iterator<Item = TypeNodeRc> + '_ {
        self.types.iter().map(|entry| entry.value().clone())
    }

    /// Look up a type by token
    #[must_use]
    pub fn get_type(&self, token: &Token) -> Option<TypeNodeRc> {
        self.types.get(token).map(|entry| entry.value().clone())
    }

    /// Look up a method by token
    #[must_use]
    pub fn get_method(&self, token: &Token) -> Option<MethodNodeRc> {
        self.methods.get(token).map(|entry| entry.value().clone())
    }

    /// Iterate the methods declared by `ty`, in declaration order
    pub fn methods_of<'a>(&'a self, ty: &'a TypeNode) -> impl Iterator<Item = MethodNodeRc> + 'a {
        ty.methods.iter().filter_map(|token| self.get_method(token))
    }

    /// Iterate the instance constructors declared by `ty`, in declaration order
    pub fn constructors<'a>(
        &'a self,
        ty: &'a TypeNode,
    ) -> impl Iterator<Item = MethodNodeRc> + 'a {
        self.methods_of(ty).filter(|method| method.is_constructor())
    }

    /// The methods overriding the virtual method `method`.
    ///
    /// Returns an empty slice for methods without recorded overrides.
    #[must_use]
    pub fn overriders(&self, method: &Token) -> &[Token] {
        self.overriders.get(method).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The type declaring `method`
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::TypeNotFound`] if the declaring type is not part of the graph.
    pub fn declaring_type(&self, method: &MethodNode) -> Result<TypeNodeRc> {
        self.get_type(&method.declaring_type)
            .ok_or(Error::TypeNotFound(method.declaring_type))
    }

    /// Collect the enclosing types of `ty`, innermost first.
    ///
    /// The walk is bounded: revisiting a type yields [`crate::Error::NestingCycle`] and chains
    /// longer than `max_depth` yield [`crate::Error::RecursionLimit`]. Both are contract
    /// violations of the graph and must not be looped on.
    ///
    /// # Errors
    ///
    /// Returns an error for cyclic or overly deep nesting, or for a declaring type that is not
    /// part of the graph.
    pub fn enclosing_types(&self, ty: &TypeNode, max_depth: usize) -> Result<Vec<TypeNodeRc>> {
        let mut chain = Vec::new();
        let mut visited = HashSet::from([ty.token]);

        let mut current = ty.declaring_type;
        while let Some(parent) = current {
            if !visited.insert(parent) {
                return Err(Error::NestingCycle(parent));
            }
            if chain.len() >= max_depth {
                return Err(Error::RecursionLimit(max_depth));
            }

            let node = self.get_type(&parent).ok_or(Error::TypeNotFound(parent))?;
            current = node.declaring_type;
            chain.push(node);
        }

        Ok(chain)
    }

    /// Collect `ty` followed by its base types, most derived first.
    ///
    /// Base types outside the graph end the chain. At most `max_depth` base types are
    /// followed; `ty` itself is not counted.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RecursionLimit`] if `ty` has more than `max_depth` base types
    /// or the chain loops back on itself.
    pub fn inheritance_chain(&self, ty: &TypeNodeRc, max_depth: usize) -> Result<Vec<TypeNodeRc>> {
        inheritance_chain(&self.types, ty, max_depth)
    }
}

/// Shared by the graph and the builder, which resolves export markers before the graph is
/// sealed.
fn inheritance_chain(
    types: &SkipMap<Token, TypeNodeRc>,
    ty: &TypeNodeRc,
    max_depth: usize,
) -> Result<Vec<TypeNodeRc>> {
    let mut chain = vec![ty.clone()];
    let mut visited = HashSet::from([ty.token]);

    // `ty` itself does not count against the bound, as in `enclosing_types`
    let mut bases = 0;
    let mut current = ty.base;
    while let Some(base) = current {
        if !visited.insert(base) || bases >= max_depth {
            return Err(Error::RecursionLimit(max_depth));
        }

        let Some(node) = types.get(&base).map(|entry| entry.value().clone()) else {
            break;
        };
        bases += 1;
        current = node.base;
        chain.push(node);
    }

    Ok(chain)
}
