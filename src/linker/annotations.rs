//! Preservation annotations shared with the sweep phase.
//!
//! The store is the only mutable state of the pass. All writes are additive and idempotent:
//! a type's level only ever rises (`None` < `Members` < `All`) and a method, once marked,
//! stays marked. Marking the same thing twice, from any thread and in any order, yields the
//! same store.

use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use dashmap::{DashMap, DashSet};
use strum::{EnumCount, EnumIter, IntoEnumIterator};

use crate::token::Token;

/// Preservation level of a type
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, EnumIter, EnumCount)]
pub enum TypePreserve {
    /// No forced preservation, ordinary reachability decides
    #[default]
    None,
    /// Only the explicitly preserved members are forced
    Members,
    /// The whole type with all of its members is kept. Method flags recorded for such a type
    /// are redundant and must be ignored by the sweeper.
    All,
}

/// Point-in-time copy of all annotations, ordered by token
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnnotationSnapshot {
    /// Types with a level other than [`TypePreserve::None`]
    pub types: BTreeMap<Token, TypePreserve>,
    /// Explicitly preserved methods
    pub methods: BTreeSet<Token>,
}

/// Concurrent store of preservation decisions.
///
/// # Thread Safety
///
/// Backed by [`DashMap`] / [`DashSet`]; all methods take `&self` and may be called from the
/// workers of a parallel pass.
#[derive(Default)]
pub struct AnnotationStore {
    /// Preservation level per type
    types: DashMap<Token, TypePreserve>,
    /// Explicitly preserved methods
    methods: DashSet<Token>,
    /// Preserved methods per declaring type, in the order they were marked
    members: DashMap<Token, Arc<boxcar::Vec<Token>>>,
}

impl AnnotationStore {
    /// Create an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Raise the preservation level of `ty` to at least `level`.
    ///
    /// Returns true if the stored level changed.
    pub fn preserve_type(&self, ty: Token, level: TypePreserve) -> bool {
        if level == TypePreserve::None {
            return false;
        }

        let mut entry = self.types.entry(ty).or_insert(TypePreserve::None);
        if *entry < level {
            *entry = level;
            true
        } else {
            false
        }
    }

    /// Explicitly preserve `method` declared by `ty`.
    ///
    /// The type is raised to [`TypePreserve::Members`]; a type already at
    /// [`TypePreserve::All`] stays there, but the method is still recorded so the resulting
    /// store does not depend on the order of the calls. Returns true if the method was newly
    /// recorded.
    pub fn add_preserved_method(&self, ty: Token, method: Token) -> bool {
        if !self.methods.insert(method) {
            return false;
        }

        let list = self
            .members
            .entry(ty)
            .or_insert_with(|| Arc::new(boxcar::Vec::new()))
            .clone();
        list.push(method);

        self.preserve_type(ty, TypePreserve::Members);
        true
    }

    /// The preservation level of `ty`
    #[must_use]
    pub fn preservation(&self, ty: &Token) -> TypePreserve {
        self.types.get(ty).map_or(TypePreserve::None, |level| *level)
    }

    /// Returns true if `method` was explicitly preserved
    #[must_use]
    pub fn is_method_preserved(&self, method: &Token) -> bool {
        self.methods.contains(method)
    }

    /// The explicitly preserved methods of `ty`, in the order they were marked
    #[must_use]
    pub fn preserved_methods(&self, ty: &Token) -> Vec<Token> {
        self.members
            .get(ty)
            .map(|list| list.iter().map(|(_, method)| *method).collect())
            .unwrap_or_default()
    }

    /// Number of types at each preservation level, indexed in [`TypePreserve`] order.
    ///
    /// Types never touched by the pass are not counted under [`TypePreserve::None`].
    #[must_use]
    pub fn counts(&self) -> [usize; TypePreserve::COUNT] {
        let mut counts = [0; TypePreserve::COUNT];
        for entry in self.types.iter() {
            counts[*entry.value() as usize] += 1;
        }
        counts
    }

    /// Number of explicitly preserved methods
    #[must_use]
    pub fn method_count(&self) -> usize {
        self.methods.len()
    }

    /// Returns true if nothing was annotated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.types.is_empty() && self.methods.is_empty()
    }

    /// Copy all annotations into an ordered snapshot
    #[must_use]
    pub fn snapshot(&self) -> AnnotationSnapshot {
        AnnotationSnapshot {
            types: self
                .types
                .iter()
                .filter(|entry| *entry.value() != TypePreserve::None)
                .map(|entry| (*entry.key(), *entry.value()))
                .collect(),
            methods: self.methods.iter().map(|method| *method).collect(),
        }
    }

    /// Log the number of types per level and of preserved methods at `info` level
    pub fn log_summary(&self) {
        let counts = self.counts();
        for level in TypePreserve::iter().filter(|level| *level != TypePreserve::None) {
            log::info!("{:?}: {} types", level, counts[level as usize]);
        }
        log::info!("explicitly preserved methods: {}", self.method_count());
    }
}
