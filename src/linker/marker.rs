//! The preservation marker: forces bridged types and members to survive trimming.
//!
//! # Decision Procedure
//!
//! For every type whose [`BridgeRole`] is not [`BridgeRole::NotBridged`]:
//!
//! 1. **Consumer code** cannot be assumed to reference its bridged types from managed code,
//!    so the whole type is preserved together with every type enclosing it (removing an
//!    enclosing type would physically remove the nested one).
//! 2. **Product code** keeps most of itself reachable; only the native surface is protected:
//!    - the first constructor taking exactly one native handle, which the runtime calls to
//!      wrap existing native objects;
//!    - for bridge objects only, export-marked virtual methods that are overridden outside
//!      the platform assembly. The runtime dispatches to the base slot, which must survive for
//!      the override to ever be reached.
//!
//! Each type is decided from its own structure, its assembly's provenance and the override
//! edges of the graph. No decision depends on another type's outcome, so types can be
//! processed in any order and in parallel.
//!
//! # Examples
//!
//! ```rust
//! use nsmark::prelude::*;
//!
//! let platform = AssemblyIdentity::parse("Xamarin.iOS")?;
//! let app = AssemblyIdentity::parse("App")?;
//!
//! let mut builder = TypeGraphBuilder::new();
//! let nsobject = builder.add_type(&platform, TypeBuilder::new("Foundation", "NSObject"))?;
//! let widget = builder.add_type(&app, TypeBuilder::new("App", "Widget").extends(nsobject))?;
//! let graph = builder.build()?;
//!
//! let annotations = AnnotationStore::new();
//! let marker = PreservationMarker::new(&graph, &MarkerConfig::ios(), &annotations);
//! let stats = marker.run()?;
//!
//! assert_eq!(stats.whole_types, 1);
//! assert_eq!(annotations.preservation(&widget), TypePreserve::All);
//! # Ok::<(), nsmark::Error>(())
//! ```

use std::ops::Add;

use rayon::prelude::*;

use crate::{
    graph::{MethodNodeRc, ParamType, TypeGraph, TypeNode, TypeNodeRc},
    linker::{
        AnnotationStore, BridgeClassifier, BridgeRole, ProvenanceClassifier, TypePreserve,
    },
    token::Token,
    Error, MarkerConfig, Result,
};

/// Counters of one preservation run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkStats {
    /// Types looked at
    pub types: usize,
    /// Types classified as bridge objects
    pub bridge_objects: usize,
    /// Types classified as handle-wrapped
    pub handle_wrapped: usize,
    /// Types (including enclosing types) marked whole-type-preserved
    pub whole_types: usize,
    /// Methods marked explicitly preserved
    pub methods: usize,
}

impl Add for MarkStats {
    type Output = MarkStats;

    fn add(self, other: MarkStats) -> MarkStats {
        MarkStats {
            types: self.types + other.types,
            bridge_objects: self.bridge_objects + other.bridge_objects,
            handle_wrapped: self.handle_wrapped + other.handle_wrapped,
            whole_types: self.whole_types + other.whole_types,
            methods: self.methods + other.methods,
        }
    }
}

/// Decisions for a single type, computed before anything is written
enum Decision {
    Skip,
    WholeType(Vec<TypeNodeRc>),
    Members(Vec<MethodNodeRc>),
}

/// Applies the bridge preservation rules to a [`TypeGraph`] and records the outcome in an
/// [`AnnotationStore`].
///
/// # Thread Safety
///
/// The marker only reads the graph and writes through the concurrent store, so a single
/// instance can drive [`Self::run_parallel`] or be shared by an external worker pool calling
/// [`Self::process_type`].
pub struct PreservationMarker<'a> {
    graph: &'a TypeGraph,
    annotations: &'a AnnotationStore,
    provenance: ProvenanceClassifier,
    bridge: BridgeClassifier<'a>,
    native_handle: ParamType,
    max_nesting_depth: usize,
}

impl<'a> PreservationMarker<'a> {
    /// Create a marker over `graph` writing into `annotations`
    #[must_use]
    pub fn new(
        graph: &'a TypeGraph,
        config: &MarkerConfig,
        annotations: &'a AnnotationStore,
    ) -> Self {
        Self {
            graph,
            annotations,
            provenance: ProvenanceClassifier::new(config),
            bridge: BridgeClassifier::new(graph, config),
            native_handle: config.native_handle,
            max_nesting_depth: config.max_nesting_depth,
        }
    }

    /// The provenance classifier used by this marker
    #[must_use]
    pub fn provenance(&self) -> &ProvenanceClassifier {
        &self.provenance
    }

    /// Process every type of the graph sequentially, in token order.
    ///
    /// # Errors
    ///
    /// Stops at and returns the first error, see [`Self::process_type`].
    pub fn run(&self) -> Result<MarkStats> {
        let mut stats = MarkStats::default();
        for ty in self.graph.types() {
            stats = stats + self.process_type(&ty)?;
        }

        self.log_stats(&stats);
        Ok(stats)
    }

    /// Process every type of the graph on the rayon thread pool.
    ///
    /// Provenance of all assemblies is resolved before the workers start. The resulting
    /// annotations are identical to those of [`Self::run`].
    ///
    /// # Errors
    ///
    /// Returns an error reported by one of the workers, see [`Self::process_type`].
    pub fn run_parallel(&self) -> Result<MarkStats> {
        let product = self.provenance.resolve_all(self.graph);
        log::debug!(
            "{} of {} assemblies are product code",
            product,
            self.graph.assemblies().len()
        );

        let types: Vec<TypeNodeRc> = self.graph.types().collect();
        let stats = types
            .par_iter()
            .map(|ty| self.process_type(ty))
            .try_reduce(MarkStats::default, |a, b| Ok(a + b))?;

        self.log_stats(&stats);
        Ok(stats)
    }

    /// Apply the preservation rules to a single type.
    ///
    /// All decisions for the type are made before the first annotation is written, so a
    /// failing type leaves no partial state behind.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::NestingCycle`] or [`crate::Error::RecursionLimit`] for a
    /// malformed nesting or inheritance chain, and [`crate::Error::TypeNotFound`] /
    /// [`crate::Error::MethodNotFound`] for dangling graph references.
    pub fn process_type(&self, ty: &TypeNodeRc) -> Result<MarkStats> {
        let mut stats = MarkStats {
            types: 1,
            ..MarkStats::default()
        };

        let role = self.bridge.classify(ty)?;
        match role {
            BridgeRole::NotBridged => {}
            BridgeRole::BridgeObject => stats.bridge_objects += 1,
            BridgeRole::HandleWrapped => stats.handle_wrapped += 1,
        }

        match self.decide(ty, role)? {
            Decision::Skip => {}
            Decision::WholeType(enclosing) => {
                for node in std::iter::once(ty).chain(enclosing.iter()) {
                    if self.annotations.preserve_type(node.token, TypePreserve::All) {
                        log::debug!("preserving type {} ({})", node.fullname(), node.token);
                        stats.whole_types += 1;
                    }
                }
            }
            Decision::Members(methods) => {
                for method in methods {
                    if self.annotations.add_preserved_method(ty.token, method.token) {
                        log::debug!(
                            "preserving method {}::{} ({})",
                            ty.fullname(),
                            method.name,
                            method.token
                        );
                        stats.methods += 1;
                    }
                }
            }
        }

        Ok(stats)
    }

    fn decide(&self, ty: &TypeNodeRc, role: BridgeRole) -> Result<Decision> {
        if !role.is_bridged() {
            return Ok(Decision::Skip);
        }

        if !self.provenance.is_product_assembly(&ty.assembly) {
            let enclosing = self.graph.enclosing_types(ty, self.max_nesting_depth)?;
            return Ok(Decision::WholeType(enclosing));
        }

        let mut methods = Vec::new();
        if let Some(ctor) = self.handle_constructor(ty) {
            methods.push(ctor);
        }
        if role == BridgeRole::BridgeObject {
            methods.extend(self.exported_overridden_methods(ty)?);
        }

        if methods.is_empty() {
            Ok(Decision::Skip)
        } else {
            Ok(Decision::Members(methods))
        }
    }

    /// The first declared constructor taking exactly one native handle.
    ///
    /// At most one such constructor is expected; declaration order decides if there are more.
    fn handle_constructor(&self, ty: &TypeNode) -> Option<MethodNodeRc> {
        self.graph
            .constructors(ty)
            .find(|ctor| ctor.has_single_param(self.native_handle))
    }

    /// Export-marked virtual methods of `ty` with at least one override outside the platform
    /// assembly, in declaration order.
    fn exported_overridden_methods(&self, ty: &TypeNode) -> Result<Vec<MethodNodeRc>> {
        let mut methods = Vec::new();
        for method in self.graph.methods_of(ty) {
            if !method.is_virtual() || !method.is_exported() {
                continue;
            }
            if self.is_overridden_outside_platform(method.token)? {
                methods.push(method);
            }
        }
        Ok(methods)
    }

    fn is_overridden_outside_platform(&self, method: Token) -> Result<bool> {
        for overrider in self.graph.overriders(&method) {
            let node = self
                .graph
                .get_method(overrider)
                .ok_or(Error::MethodNotFound(*overrider))?;
            let declaring = self.graph.declaring_type(&node)?;
            if !self.provenance.is_platform_assembly(&declaring.assembly) {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn log_stats(&self, stats: &MarkStats) {
        log::info!(
            "bridge preservation: {} types inspected, {} bridge objects, {} handle-wrapped, \
             {} types preserved whole, {} methods preserved",
            stats.types,
            stats.bridge_objects,
            stats.handle_wrapped,
            stats.whole_types,
            stats.methods
        );
        self.annotations.log_summary();
    }
}
