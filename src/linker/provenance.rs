//! Provenance of assemblies: product (platform) code versus consumer code.
//!
//! Product code is trusted to keep its own bridged surface reachable through internal
//! references; consumer code is not. The answer is a pure function of the assembly name and
//! the [`crate::MarkerConfig`], memoized per assembly for the lifetime of a run.

use dashmap::DashMap;
use strum::{EnumCount, EnumIter};

use crate::{
    graph::{AssemblyIdentity, TypeGraph},
    MarkerConfig,
};

/// Where an assembly comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, EnumCount)]
pub enum Provenance {
    /// The product (platform binding) assembly itself
    Platform,
    /// The historical compatibility exception, trusted like product code
    Compat,
    /// Anything else: application code and third-party libraries
    Consumer,
}

impl Provenance {
    /// Returns true for product provenance (platform or compatibility assembly)
    #[must_use]
    pub fn is_product(self) -> bool {
        matches!(self, Provenance::Platform | Provenance::Compat)
    }
}

/// Memoizing assembly classifier.
///
/// # Thread Safety
///
/// The memo is a [`DashMap`]. Concurrent first queries for the same assembly may both compute
/// the value; they compute the same value, so the race is benign. [`Self::resolve_all`] fills
/// the memo up front before a parallel pass.
pub struct ProvenanceClassifier {
    product_assembly: String,
    compat_assembly: String,
    cache: DashMap<AssemblyIdentity, Provenance>,
}

impl ProvenanceClassifier {
    /// Create a classifier for the product and compatibility assembly names of `config`
    #[must_use]
    pub fn new(config: &MarkerConfig) -> Self {
        Self {
            product_assembly: config.product_assembly.clone(),
            compat_assembly: config.compat_assembly.clone(),
            cache: DashMap::new(),
        }
    }

    /// Classify `assembly`, consulting the memo first
    pub fn provenance(&self, assembly: &AssemblyIdentity) -> Provenance {
        if let Some(cached) = self.cache.get(assembly) {
            return *cached;
        }

        let provenance = self.compute(assembly);
        *self.cache.entry(assembly.clone()).or_insert(provenance)
    }

    /// Returns true if `assembly` is product code (platform or compatibility assembly)
    pub fn is_product_assembly(&self, assembly: &AssemblyIdentity) -> bool {
        self.provenance(assembly).is_product()
    }

    /// Returns true only for the product assembly itself.
    ///
    /// Overrides living in the compatibility assembly count as outside product code.
    pub fn is_platform_assembly(&self, assembly: &AssemblyIdentity) -> bool {
        self.provenance(assembly) == Provenance::Platform
    }

    /// Resolve every assembly of `graph` into the memo and return how many are product code
    pub fn resolve_all(&self, graph: &TypeGraph) -> usize {
        graph
            .assemblies()
            .iter()
            .filter(|assembly| self.is_product_assembly(assembly))
            .count()
    }

    /// Number of memoized assemblies
    #[must_use]
    pub fn resolved(&self) -> usize {
        self.cache.len()
    }

    fn compute(&self, assembly: &AssemblyIdentity) -> Provenance {
        let name = assembly.simple_name();
        if name == self.product_assembly {
            Provenance::Platform
        } else if name == self.compat_assembly {
            Provenance::Compat
        } else {
            Provenance::Consumer
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use rayon::prelude::*;
    use strum::IntoEnumIterator;

    use super::*;
    use crate::graph::{TypeBuilder, TypeGraphBuilder};

    fn identity(name: &str) -> AssemblyIdentity {
        AssemblyIdentity::parse(name).unwrap()
    }

    #[test]
    fn test_provenance_by_name() {
        let classifier = ProvenanceClassifier::new(&MarkerConfig::ios());

        assert_eq!(
            classifier.provenance(&identity("Xamarin.iOS, Version=0.0.0.0")),
            Provenance::Platform
        );
        assert_eq!(
            classifier.provenance(&identity("System.Net.Http")),
            Provenance::Compat
        );
        assert_eq!(classifier.provenance(&identity("App")), Provenance::Consumer);
        // the other platform is consumer code for this profile
        assert_eq!(
            classifier.provenance(&identity("Xamarin.Mac")),
            Provenance::Consumer
        );
    }

    #[test]
    fn test_product_vs_platform() {
        let classifier = ProvenanceClassifier::new(&MarkerConfig::ios());
        let compat = identity("System.Net.Http");
        let platform = identity("Xamarin.iOS");
        let app = identity("App");

        assert!(classifier.is_product_assembly(&compat));
        assert!(!classifier.is_platform_assembly(&compat));
        assert!(classifier.is_product_assembly(&platform));
        assert!(classifier.is_platform_assembly(&platform));
        assert!(!classifier.is_product_assembly(&app));
        assert!(!classifier.is_platform_assembly(&app));

        let product: Vec<Provenance> = Provenance::iter().filter(|p| p.is_product()).collect();
        assert_eq!(product, vec![Provenance::Platform, Provenance::Compat]);
        assert_eq!(Provenance::COUNT, 3);
    }

    #[test]
    fn test_memoized_once() {
        let classifier = ProvenanceClassifier::new(&MarkerConfig::ios());
        let app = identity("App");

        assert_eq!(classifier.resolved(), 0);
        for _ in 0..3 {
            assert_eq!(classifier.provenance(&app), Provenance::Consumer);
        }
        assert_eq!(classifier.resolved(), 1);
    }

    #[test]
    fn test_concurrent_queries_agree() {
        let classifier = Arc::new(ProvenanceClassifier::new(&MarkerConfig::mac()));
        let names = ["Xamarin.Mac", "App", "System.Net.Http", "Lib"];

        let results: Vec<Provenance> = (0..400)
            .into_par_iter()
            .map(|i| classifier.provenance(&identity(names[i % names.len()])))
            .collect();

        for (i, provenance) in results.iter().enumerate() {
            let expected = match i % names.len() {
                0 => Provenance::Platform,
                2 => Provenance::Compat,
                _ => Provenance::Consumer,
            };
            assert_eq!(*provenance, expected);
        }
        assert_eq!(classifier.resolved(), names.len());
    }

    #[test]
    fn test_resolve_all() {
        let mut builder = TypeGraphBuilder::new();
        for name in ["Xamarin.iOS", "System.Net.Http", "App", "Lib"] {
            builder
                .add_type(&identity(name), TypeBuilder::new("N", "T"))
                .unwrap();
        }
        let graph = builder.build().unwrap();

        let classifier = ProvenanceClassifier::new(&MarkerConfig::ios());
        assert_eq!(classifier.resolve_all(&graph), 2);
        assert_eq!(classifier.resolved(), 4);
    }
}
