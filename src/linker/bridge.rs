//! Bridge-role classification of types.
//!
//! A type takes part in the native-bridging contract in one of two ways:
//! - it inherits the bridging root (`Foundation.NSObject`): the native runtime creates
//!   instances from raw handles and dispatches into its virtual methods by selector;
//! - it wraps a native handle without being a bridged object, detected by the native-object
//!   interface somewhere in its hierarchy: the runtime still constructs it from a handle.
//!
//! Every other type is rejected before any further analysis happens.

use std::collections::HashSet;

use crate::{
    graph::{TypeGraph, TypeName, TypeNodeRc},
    token::Token,
    Error, MarkerConfig, Result,
};

/// Role of a type in the native-bridging contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BridgeRole {
    /// Not exposed to the native runtime
    NotBridged,
    /// Inherits the bridging root type
    BridgeObject,
    /// Constructed from a native handle, but no bridging root in its hierarchy
    HandleWrapped,
}

impl BridgeRole {
    /// Returns true for both bridged roles
    #[must_use]
    pub fn is_bridged(self) -> bool {
        self != BridgeRole::NotBridged
    }
}

/// Classifies types of a [`TypeGraph`] by their [`BridgeRole`].
///
/// Well-known types are matched by namespace and name, in whichever assembly they live.
pub struct BridgeClassifier<'a> {
    graph: &'a TypeGraph,
    bridge_root: TypeName,
    native_object: TypeName,
    max_depth: usize,
}

impl<'a> BridgeClassifier<'a> {
    /// Create a classifier for the contract types of `config`
    #[must_use]
    pub fn new(graph: &'a TypeGraph, config: &MarkerConfig) -> Self {
        Self {
            graph,
            bridge_root: config.bridge_root,
            native_object: config.native_object,
            max_depth: config.max_hierarchy_depth,
        }
    }

    /// Determine the bridge role of `ty`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RecursionLimit`] for cyclic or overly deep inheritance.
    pub fn classify(&self, ty: &TypeNodeRc) -> Result<BridgeRole> {
        let chain = self.graph.inheritance_chain(ty, self.max_depth)?;

        if chain.iter().any(|node| node.is(&self.bridge_root)) {
            return Ok(BridgeRole::BridgeObject);
        }

        let mut visited = HashSet::new();
        for node in &chain {
            for interface in &node.interfaces {
                if self.implements_native_object(*interface, &mut visited, 0)? {
                    return Ok(BridgeRole::HandleWrapped);
                }
            }
        }

        Ok(BridgeRole::NotBridged)
    }

    /// Returns true if `ty` is, or inherits from, the bridging root
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::RecursionLimit`] for cyclic or overly deep inheritance.
    pub fn is_bridge_object(&self, ty: &TypeNodeRc) -> Result<bool> {
        Ok(self.classify(ty)? == BridgeRole::BridgeObject)
    }

    // Interfaces list their base interfaces as implemented interfaces.
    fn implements_native_object(
        &self,
        interface: Token,
        visited: &mut HashSet<Token>,
        depth: usize,
    ) -> Result<bool> {
        if depth > self.max_depth {
            return Err(Error::RecursionLimit(self.max_depth));
        }
        if !visited.insert(interface) {
            return Ok(false);
        }

        let Some(node) = self.graph.get_type(&interface) else {
            return Ok(false);
        };
        if node.is(&self.native_object) {
            return Ok(true);
        }

        for inherited in &node.interfaces {
            if self.implements_native_object(*inherited, visited, depth + 1)? {
                return Ok(true);
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{AssemblyIdentity, TypeBuilder, TypeGraphBuilder};

    struct Fixture {
        graph: TypeGraph,
        nsobject: Token,
        view: Token,
        custom_view: Token,
        handle_struct: Token,
        derived_handle: Token,
        via_interface: Token,
        plain: Token,
    }

    fn fixture() -> Fixture {
        let platform = AssemblyIdentity::parse("Xamarin.iOS").unwrap();
        let app = AssemblyIdentity::parse("App").unwrap();

        let mut builder = TypeGraphBuilder::new();
        let native_object = builder
            .add_type(&platform, TypeBuilder::new("ObjCRuntime", "INativeObject"))
            .unwrap();
        let disposable = builder
            .add_type(&platform, TypeBuilder::new("System", "IDisposable"))
            .unwrap();
        let nsobject = builder
            .add_type(
                &platform,
                TypeBuilder::new("Foundation", "NSObject")
                    .implements(native_object)
                    .implements(disposable),
            )
            .unwrap();
        let view = builder
            .add_type(&platform, TypeBuilder::new("UIKit", "UIView").extends(nsobject))
            .unwrap();
        let custom_view = builder
            .add_type(&app, TypeBuilder::new("App", "CustomView").extends(view))
            .unwrap();
        let handle_struct = builder
            .add_type(
                &platform,
                TypeBuilder::new("CoreGraphics", "CGPath").implements(native_object),
            )
            .unwrap();
        let derived_handle = builder
            .add_type(
                &platform,
                TypeBuilder::new("CoreGraphics", "CGMutablePath").extends(handle_struct),
            )
            .unwrap();
        let handle_interface = builder
            .add_type(
                &app,
                TypeBuilder::new("App", "IHandleOwner").implements(native_object),
            )
            .unwrap();
        let via_interface = builder
            .add_type(
                &app,
                TypeBuilder::new("App", "Wrapper").implements(handle_interface),
            )
            .unwrap();
        let plain = builder
            .add_type(&app, TypeBuilder::new("App", "Model").implements(disposable))
            .unwrap();

        Fixture {
            graph: builder.build().unwrap(),
            nsobject,
            view,
            custom_view,
            handle_struct,
            derived_handle,
            via_interface,
            plain,
        }
    }

    fn role(fixture: &Fixture, token: Token) -> BridgeRole {
        let classifier = BridgeClassifier::new(&fixture.graph, &MarkerConfig::ios());
        classifier
            .classify(&fixture.graph.get_type(&token).unwrap())
            .unwrap()
    }

    #[test]
    fn test_bridge_objects() {
        let fixture = fixture();
        assert_eq!(role(&fixture, fixture.nsobject), BridgeRole::BridgeObject);
        assert_eq!(role(&fixture, fixture.view), BridgeRole::BridgeObject);
        assert_eq!(role(&fixture, fixture.custom_view), BridgeRole::BridgeObject);
    }

    #[test]
    fn test_handle_wrapped() {
        let fixture = fixture();
        assert_eq!(role(&fixture, fixture.handle_struct), BridgeRole::HandleWrapped);
        assert_eq!(role(&fixture, fixture.derived_handle), BridgeRole::HandleWrapped);
        assert_eq!(role(&fixture, fixture.via_interface), BridgeRole::HandleWrapped);
    }

    #[test]
    fn test_not_bridged() {
        let fixture = fixture();
        assert_eq!(role(&fixture, fixture.plain), BridgeRole::NotBridged);
        assert!(!BridgeRole::NotBridged.is_bridged());
        assert!(BridgeRole::HandleWrapped.is_bridged());
    }

    #[test]
    fn test_match_is_by_name_not_by_assembly() {
        let lib = AssemblyIdentity::parse("SomeLib").unwrap();
        let mut builder = TypeGraphBuilder::new();
        let lookalike = builder
            .add_type(&lib, TypeBuilder::new("Foundation", "NSObject"))
            .unwrap();
        let other_root = builder
            .add_type(&lib, TypeBuilder::new("MyFoundation", "NSObject"))
            .unwrap();
        let graph = builder.build().unwrap();
        let classifier = BridgeClassifier::new(&graph, &MarkerConfig::ios());

        assert!(classifier
            .is_bridge_object(&graph.get_type(&lookalike).unwrap())
            .unwrap());
        assert!(!classifier
            .is_bridge_object(&graph.get_type(&other_root).unwrap())
            .unwrap());
    }

    #[test]
    fn test_base_chain_depth_limit() {
        let platform = AssemblyIdentity::parse("Xamarin.iOS").unwrap();
        let mut builder = TypeGraphBuilder::new();
        let mut leaf = builder
            .add_type(&platform, TypeBuilder::new("Foundation", "NSObject"))
            .unwrap();
        for level in 1..=4 {
            leaf = builder
                .add_type(
                    &platform,
                    TypeBuilder::new("UIKit", format!("Level{level}")).extends(leaf),
                )
                .unwrap();
        }
        let graph = builder.build().unwrap();
        let node = graph.get_type(&leaf).unwrap();

        let exact = MarkerConfig::ios().with_max_depth(4);
        let classifier = BridgeClassifier::new(&graph, &exact);
        assert_eq!(classifier.classify(&node).unwrap(), BridgeRole::BridgeObject);

        let shallow = MarkerConfig::ios().with_max_depth(3);
        let classifier = BridgeClassifier::new(&graph, &shallow);
        assert!(matches!(
            classifier.classify(&node),
            Err(Error::RecursionLimit(3))
        ));
    }

    #[test]
    fn test_cyclic_inheritance_is_an_error() {
        let app = AssemblyIdentity::parse("App").unwrap();
        let mut builder = TypeGraphBuilder::new();
        let a = builder
            .add_type(&app, TypeBuilder::new("App", "A").extends(Token::type_def(2)))
            .unwrap();
        builder
            .add_type(&app, TypeBuilder::new("App", "B").extends(a))
            .unwrap();
        let graph = builder.build().unwrap();
        let classifier = BridgeClassifier::new(&graph, &MarkerConfig::ios());

        assert!(matches!(
            classifier.classify(&graph.get_type(&a).unwrap()),
            Err(Error::RecursionLimit(64))
        ));
    }
}
