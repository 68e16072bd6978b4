//! Native-bridge preservation pass of the trimmer.
//!
//! Ordinary reachability analysis cannot see how the native runtime reaches into managed code:
//! it constructs bridged objects from raw handles and dispatches exported virtual methods by
//! selector. This module adds the preservation pass that keeps those entry points alive.
//!
//! # Key Components
//!
//! - [`ProvenanceClassifier`]: Product (platform) assemblies versus consumer assemblies
//! - [`BridgeClassifier`]: Bridge objects, handle-wrapped types and everything else
//! - [`PreservationMarker`]: Applies the decision procedure to every type of the graph
//! - [`AnnotationStore`]: Concurrent, additive store of the decisions, read by the sweeper
//!
//! # Thread Safety
//!
//! All components are [`Send`] + [`Sync`]. The graph is read-only, the provenance memo and
//! the annotation store are concurrent maps, so the pass runs on the rayon pool via
//! [`PreservationMarker::run_parallel`].

mod annotations;
mod bridge;
mod marker;
mod provenance;

pub use annotations::{AnnotationSnapshot, AnnotationStore, TypePreserve};
pub use bridge::{BridgeClassifier, BridgeRole};
pub use marker::{MarkStats, PreservationMarker};
pub use provenance::{Provenance, ProvenanceClassifier};
