//! # nsmark Prelude
//!
//! This module provides a convenient prelude for the most commonly used types of the
//! library. Import it to build a type graph and run the preservation pass.

// ================================================================================================
// Core Types and Error Handling
// ================================================================================================

/// The main error type for all nsmark operations
pub use crate::Error;

/// The result type used throughout nsmark
pub use crate::Result;

/// Configuration of the preservation pass
pub use crate::MarkerConfig;

/// Metadata token type identifying graph nodes
pub use crate::token::Token;

// ================================================================================================
// Type Graph
// ================================================================================================

/// Graph storage and construction
pub use crate::graph::{MethodBuilder, TypeBuilder, TypeGraph, TypeGraphBuilder};

/// Graph nodes and descriptors
pub use crate::graph::{
    AssemblyIdentity, AssemblyVersion, MethodModifiers, MethodNode, MethodNodeRc, ParamType,
    TypeName, TypeNode, TypeNodeRc,
};

// ================================================================================================
// Preservation Pass
// ================================================================================================

/// Classifiers, marker and annotations
pub use crate::linker::{
    AnnotationSnapshot, AnnotationStore, BridgeClassifier, BridgeRole, MarkStats,
    PreservationMarker, Provenance, ProvenanceClassifier, TypePreserve,
};
