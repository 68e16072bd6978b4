// Copyright 2025 Johann Kempter
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0

#![doc(html_no_source)]
#![deny(missing_docs)]
#![deny(unsafe_code)]

//! # nsmark
//!
//! Native-bridge preservation analysis for ahead-of-time .NET trimmers.
//!
//! Trimmers compute reachability from entry points by walking the call graph. For programs
//! that expose managed types to a native (Objective-C) runtime that is not enough: the native
//! side constructs objects from raw handles and invokes exported virtual methods by selector,
//! both invisible to the call-graph walker. `nsmark` is the pass that decides which types and
//! methods must be force-kept because they take part in this bridging contract.
//!
//! ## Features
//!
//! - **Type graph** - Token-indexed, read-only graph of types and methods across assemblies
//! - **Provenance** - Product (platform) code versus consumer code, memoized per assembly
//! - **Bridge roles** - Bridge objects and handle-wrapped types, detected structurally
//! - **Preservation** - Whole-type preservation for consumer code, selective for product code
//! - **Parallel** - The pass runs on the rayon thread pool with identical results
//!
//! ## Quick Start
//!
//! ```rust
//! use nsmark::prelude::*;
//!
//! let platform = AssemblyIdentity::parse("Xamarin.iOS")?;
//! let app = AssemblyIdentity::parse("App")?;
//!
//! let mut builder = TypeGraphBuilder::new();
//! let export = builder.add_type(&platform, TypeBuilder::new("Foundation", "ExportAttribute"))?;
//! let nsobject = builder.add_type(&platform, TypeBuilder::new("Foundation", "NSObject"))?;
//! let view = builder.add_type(&platform, TypeBuilder::new("UIKit", "UIView").extends(nsobject))?;
//! let handle_ctor = builder.add_method(view, MethodBuilder::constructor().param(ParamType::I))?;
//! let draw = builder.add_method(view, MethodBuilder::new("Draw").virtual_().attribute(export))?;
//!
//! let custom = builder.add_type(&app, TypeBuilder::new("App", "CustomView").extends(view))?;
//! builder.add_method(custom, MethodBuilder::new("Draw").virtual_().overrides(draw))?;
//! let graph = builder.build()?;
//!
//! let annotations = AnnotationStore::new();
//! PreservationMarker::new(&graph, &MarkerConfig::ios(), &annotations).run_parallel()?;
//!
//! assert_eq!(annotations.preservation(&custom), TypePreserve::All);
//! assert_eq!(annotations.preservation(&view), TypePreserve::Members);
//! assert!(annotations.is_method_preserved(&handle_ctor));
//! assert!(annotations.is_method_preserved(&draw));
//! # Ok::<(), nsmark::Error>(())
//! ```
//!
//! ## Architecture
//!
//! - [`prelude`] - Convenient re-exports of commonly used types
//! - [`graph`] - The type graph and its builder
//! - [`linker`] - Classifiers, the preservation marker and the annotation store
//! - [`MarkerConfig`] - Product assembly and bridging contract configuration
//! - [`Error`] and [`Result`] - Error handling
//!
//! ## Logging
//!
//! The pass logs through the [`log`] facade: one line per preserved type or method at `debug`
//! level and a run summary at `info` level.

#[macro_use]
pub(crate) mod error;

mod config;

/// Convenient re-exports of the most commonly used types and traits.
///
/// # Example
///
/// ```rust
/// use nsmark::prelude::*;
///
/// let builder = TypeGraphBuilder::new();
/// let graph = builder.build()?;
/// assert!(graph.is_empty());
/// # Ok::<(), nsmark::Error>(())
/// ```
pub mod prelude;

/// Metadata tokens identifying the nodes of the type graph
pub mod token;

/// Type graph of the loaded assembly set
pub mod graph;

/// The native-bridge preservation pass
pub mod linker;

pub use config::{
    MarkerConfig, BRIDGE_ROOT, COMPAT_ASSEMBLY, IOS_PRODUCT_ASSEMBLY, MAC_PRODUCT_ASSEMBLY,
    NATIVE_OBJECT,
};

/// `nsmark` Result type
///
/// A type alias for `std::result::Result<T, Error>` where the error type is always
/// [`Error`]. This is used consistently throughout the crate for all fallible operations.
pub type Result<T> = std::result::Result<T, Error>;

/// `nsmark` Error type
///
/// The main error type for all operations in this crate. See the variant documentation for
/// the individual failure modes.
pub use error::Error;
