use crate::error::ReasonerError;
use crate::indexing::rules::{RuleChain, SubsumerRule};
use crate::model::{DataProperty, Individual, ObjectProperty, OwlClass};
use oxrdf::Literal;
use rustc_hash::FxHashMap;
use std::hash::Hash;

macro_rules! handle {
    ($(#[$attr:meta])* $name:ident) => {
        $(#[$attr])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(u32);

        impl $name {
            #[inline]
            pub(crate) const fn new(id: u32) -> Self {
                Self(id)
            }

            #[inline]
            pub(crate) const fn raw(self) -> u32 {
                self.0
            }
        }
    };
}

handle!(
    /// Handle of a canonical [`IndexedClassExpression`].
    ///
    /// Handles are never reused, even after the expression has been removed from the index.
    ClassId
);
handle!(
    /// Handle of a canonical [`IndexedPropertyChain`].
    ChainId
);
handle!(
    /// Handle of an indexed disjointness axiom.
    DisjointnessId
);

impl ClassId {
    pub const THING: Self = Self(0);
    pub const NOTHING: Self = Self(1);
}

/// A class expression in normal form.
///
/// Sub-expressions are canonical handles so structural equality is handle equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexedClassExpression {
    Class(OwlClass),
    /// The nominal `{a}`
    Individual(Individual),
    /// Indexed as an opaque atom: no datatype reasoning is done
    DataHasValue {
        property: DataProperty,
        value: Literal,
    },
    /// Binary conjunction, operands are ordered
    ObjectIntersectionOf(ClassId, ClassId),
    /// Binary disjunction, operands are ordered, only occurs negatively
    ObjectUnionOf(ClassId, ClassId),
    ObjectSomeValuesFrom {
        property: ChainId,
        filler: ClassId,
    },
    /// Only occurs positively
    ObjectComplementOf(ClassId),
}

/// An object property or a right-nested binary property chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndexedPropertyChain {
    ObjectProperty(ObjectProperty),
    /// `first ∘ suffix`
    BinaryPropertyChain { first: ChainId, suffix: ChainId },
}

/// Occurrence counters of an indexed class expression.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Occurrences {
    pub total: u32,
    pub positive: u32,
    pub negative: u32,
}

/// Polarity of an occurrence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Polarity {
    /// On the right of a subclass axiom
    Positive,
    /// On the left of a subclass axiom
    Negative,
    /// In a declaration
    Neutral,
}

impl Polarity {
    pub(crate) fn complement(self) -> Self {
        match self {
            Self::Positive => Self::Negative,
            Self::Negative => Self::Positive,
            Self::Neutral => Self::Neutral,
        }
    }
}

/// Counter transitions caused by one occurrence update.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Transitions {
    pub positive: Option<bool>,
    pub negative: Option<bool>,
    pub removed: bool,
}

impl Occurrences {
    pub(crate) fn update(
        &mut self,
        polarity: Polarity,
        increment: bool,
    ) -> Result<Transitions, ReasonerError> {
        fn step(counter: &mut u32, increment: bool) -> Result<Option<bool>, ReasonerError> {
            if increment {
                *counter += 1;
                Ok((*counter == 1).then_some(true))
            } else {
                *counter = counter
                    .checked_sub(1)
                    .ok_or_else(|| ReasonerError::invariant("negative occurrence counter"))?;
                Ok((*counter == 0).then_some(false))
            }
        }
        let mut transitions = Transitions::default();
        match polarity {
            Polarity::Positive => transitions.positive = step(&mut self.positive, increment)?,
            Polarity::Negative => transitions.negative = step(&mut self.negative, increment)?,
            Polarity::Neutral => (),
        }
        transitions.removed = step(&mut self.total, increment)? == Some(false);
        Ok(transitions)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ClassNode {
    pub occurrences: Occurrences,
    pub rules: RuleChain<SubsumerRule>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ChainNode {
    pub occurrences: u32,
    /// Sorted multiset of told super properties
    pub told_supers: Vec<ChainId>,
    pub told_reflexive: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct DisjointnessNode {
    pub occurrences: u32,
}

/// Hash-consing arena: one slot per canonical key.
#[derive(Debug, Clone)]
pub(crate) struct Arena<K, N> {
    slots: Vec<Option<(K, N)>>,
    ids: FxHashMap<K, u32>,
}

impl<K, N> Default for Arena<K, N> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            ids: FxHashMap::default(),
        }
    }
}

impl<K: Hash + Eq + Clone, N: Default> Arena<K, N> {
    fn with_keys<const S: usize>(keys: [K; S]) -> Self {
        let mut arena = Self::default();
        for (key, id) in keys.into_iter().zip(0..) {
            arena.ids.insert(key.clone(), id);
            arena.slots.push(Some((key, N::default())));
        }
        arena
    }

    /// Returns the slot of `key`, creating it if needed, and whether it has been created.
    pub fn get_or_insert(&mut self, key: K) -> Result<(u32, bool), ReasonerError> {
        if let Some(id) = self.ids.get(&key) {
            return Ok((*id, false));
        }
        let id = u32::try_from(self.slots.len())
            .map_err(|_| ReasonerError::invariant("too many indexed objects"))?;
        self.ids.insert(key.clone(), id);
        self.slots.push(Some((key, N::default())));
        Ok((id, true))
    }

    pub fn get(&self, key: &K) -> Option<u32> {
        self.ids.get(key).copied()
    }

    pub fn node(&self, id: u32) -> Option<&(K, N)> {
        self.slots.get(id as usize)?.as_ref()
    }

    pub fn node_mut(&mut self, id: u32) -> Option<&mut N> {
        self.slots.get_mut(id as usize)?.as_mut().map(|(_, n)| n)
    }

    pub fn remove(&mut self, id: u32) -> Option<(K, N)> {
        let (key, node) = self.slots.get_mut(id as usize)?.take()?;
        self.ids.remove(&key);
        Some((key, node))
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &K, &N)> {
        self.slots
            .iter()
            .zip(0..)
            .filter_map(|(slot, id)| slot.as_ref().map(|(k, n)| (id, k, n)))
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.ids.len()
    }
}

/// The canonical store of indexed objects.
///
/// Mutated only while indexing; saturation only reads it.
#[derive(Debug, Clone)]
pub struct IndexedObjectCache {
    pub(crate) classes: Arena<IndexedClassExpression, ClassNode>,
    pub(crate) chains: Arena<IndexedPropertyChain, ChainNode>,
    pub(crate) disjointness: Arena<Vec<ClassId>, DisjointnessNode>,
}

impl IndexedObjectCache {
    pub(crate) fn new() -> Self {
        Self {
            classes: Arena::with_keys([
                IndexedClassExpression::Class(OwlClass::thing()),
                IndexedClassExpression::Class(OwlClass::nothing()),
            ]),
            chains: Arena::default(),
            disjointness: Arena::default(),
        }
    }

    pub fn class_expression(&self, id: ClassId) -> Option<&IndexedClassExpression> {
        self.classes.node(id.0).map(|(k, _)| k)
    }

    pub fn class_id(&self, expression: &IndexedClassExpression) -> Option<ClassId> {
        self.classes.get(expression).map(ClassId)
    }

    pub fn occurrences(&self, id: ClassId) -> Option<Occurrences> {
        self.classes.node(id.0).map(|(_, n)| n.occurrences)
    }

    pub fn subsumer_rules(&self, id: ClassId) -> Option<&RuleChain<SubsumerRule>> {
        self.classes.node(id.0).map(|(_, n)| &n.rules)
    }

    pub fn property_chain(&self, id: ChainId) -> Option<&IndexedPropertyChain> {
        self.chains.node(id.0).map(|(k, _)| k)
    }

    pub fn chain_id(&self, chain: &IndexedPropertyChain) -> Option<ChainId> {
        self.chains.get(chain).map(ChainId)
    }

    /// The members of a disjointness axiom, sorted, with repetitions.
    pub fn disjoint_members(&self, id: DisjointnessId) -> Option<&[ClassId]> {
        self.disjointness.node(id.0).map(|(k, _)| k.as_slice())
    }

    pub fn classes(&self) -> impl Iterator<Item = (ClassId, &IndexedClassExpression)> {
        self.classes.iter().map(|(id, k, _)| (ClassId(id), k))
    }

    pub fn chains(&self) -> impl Iterator<Item = (ChainId, &IndexedPropertyChain)> {
        self.chains.iter().map(|(id, k, _)| (ChainId(id), k))
    }

    pub(crate) fn chain_node(&self, id: ChainId) -> Option<&ChainNode> {
        self.chains.node(id.0).map(|(_, n)| n)
    }

    pub(crate) fn class_node_mut(&mut self, id: ClassId) -> Result<&mut ClassNode, ReasonerError> {
        self.classes
            .node_mut(id.0)
            .ok_or_else(|| ReasonerError::invariant(format!("{id:?} is not indexed")))
    }

    pub(crate) fn chain_node_mut(&mut self, id: ChainId) -> Result<&mut ChainNode, ReasonerError> {
        self.chains
            .node_mut(id.0)
            .ok_or_else(|| ReasonerError::invariant(format!("{id:?} is not indexed")))
    }

    pub(crate) fn is_builtin(id: ClassId) -> bool {
        id == ClassId::THING || id == ClassId::NOTHING
    }
}
