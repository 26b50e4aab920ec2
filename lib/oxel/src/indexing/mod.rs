//! The indexed ontology: canonical class expressions and property chains with their rules.

mod axioms;
mod cache;
mod changes;
mod converter;
mod rules;

use crate::error::ReasonerError;
use crate::model::{Axiom, ClassExpression, Individual, ObjectProperty, OwlClass};
pub use cache::{
    ChainId, ClassId, DisjointnessId, IndexedClassExpression, IndexedObjectCache,
    IndexedPropertyChain, Occurrences,
};
pub use changes::IndexChanges;
pub use rules::{BackwardLinkRule, ContextInitRule, RuleChain, SubsumerRule};
use std::mem::take;

/// The normal form of an ontology, maintained incrementally under axiom insertion and removal.
///
/// ```
/// use oxel::{Axiom, ClassExpression, OntologyIndex, OwlClass};
/// use oxrdf::NamedNode;
///
/// let a = ClassExpression::class(OwlClass::new(NamedNode::new("http://example.com/A")?));
/// let b = ClassExpression::class(OwlClass::new(NamedNode::new("http://example.com/B")?));
/// let axiom = Axiom::sub_class_of(a, b);
///
/// let mut index = OntologyIndex::new();
/// let before = index.snapshot();
/// index.index_axiom(&axiom)?;
/// assert_ne!(index.snapshot(), before);
/// index.unindex_axiom(&axiom)?;
/// assert_eq!(index.snapshot(), before);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
#[derive(Debug)]
pub struct OntologyIndex {
    cache: IndexedObjectCache,
    init_rules: RuleChain<ContextInitRule>,
    changes: IndexChanges,
    version: u64,
}

impl Default for OntologyIndex {
    fn default() -> Self {
        Self::new()
    }
}

impl OntologyIndex {
    pub fn new() -> Self {
        let mut init_rules = RuleChain::default();
        init_rules.add(ContextInitRule::Root);
        Self {
            cache: IndexedObjectCache::new(),
            init_rules,
            changes: IndexChanges::default(),
            version: 0,
        }
    }

    /// Indexes the axiom.
    ///
    /// Fails with [`ReasonerError::Unsupported`] without modifying the index if the axiom
    /// uses constructs outside of the EL fragment.
    pub fn index_axiom(&mut self, axiom: &Axiom) -> Result<(), ReasonerError> {
        for axiom in axioms::normalize(axiom)? {
            self.index_el_axiom(&axiom, true)?;
        }
        self.version += 1;
        Ok(())
    }

    /// Removes an axiom previously given to [`index_axiom`](Self::index_axiom).
    pub fn unindex_axiom(&mut self, axiom: &Axiom) -> Result<(), ReasonerError> {
        for axiom in axioms::normalize(axiom)?.iter().rev() {
            self.index_el_axiom(axiom, false)?;
        }
        self.version += 1;
        Ok(())
    }

    pub fn cache(&self) -> &IndexedObjectCache {
        &self.cache
    }

    /// The global chain of rules applied to every new context.
    pub fn init_rules(&self) -> &RuleChain<ContextInitRule> {
        &self.init_rules
    }

    /// Incremented each time the index is modified.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn class_expression(&self, id: ClassId) -> Option<&IndexedClassExpression> {
        self.cache.class_expression(id)
    }

    pub fn class_id(&self, class: &OwlClass) -> Option<ClassId> {
        self.cache
            .class_id(&IndexedClassExpression::Class(class.clone()))
    }

    pub fn individual_id(&self, individual: &Individual) -> Option<ClassId> {
        self.cache
            .class_id(&IndexedClassExpression::Individual(individual.clone()))
    }

    /// The node of an already indexed class expression.
    pub fn class_expression_id(&self, expression: &ClassExpression) -> Option<ClassId> {
        self.resolve_class(expression).ok()
    }

    pub fn property_id(&self, property: &ObjectProperty) -> Option<ChainId> {
        self.resolve_property(property).ok()
    }

    /// Named classes, owl:Thing and owl:Nothing included.
    pub fn named_classes(&self) -> impl Iterator<Item = (ClassId, &OwlClass)> {
        self.cache.classes().filter_map(|(id, e)| match e {
            IndexedClassExpression::Class(c) => Some((id, c)),
            _ => None,
        })
    }

    pub fn individuals(&self) -> impl Iterator<Item = (ClassId, &Individual)> {
        self.cache.classes().filter_map(|(id, e)| match e {
            IndexedClassExpression::Individual(i) => Some((id, i)),
            _ => None,
        })
    }

    /// Returns the changes recorded since the last call and starts a new change set.
    pub fn take_changes(&mut self) -> IndexChanges {
        take(&mut self.changes)
    }

    pub fn pending_changes(&self) -> &IndexChanges {
        &self.changes
    }

    /// A comparable view of the live content of the index.
    pub fn snapshot(&self) -> IndexSnapshot {
        IndexSnapshot {
            classes: self
                .cache
                .classes
                .iter()
                .map(|(id, expression, node)| {
                    (
                        ClassId::new(id),
                        expression.clone(),
                        node.occurrences,
                        node.rules.clone(),
                    )
                })
                .collect(),
            chains: self
                .cache
                .chains
                .iter()
                .map(|(id, chain, node)| {
                    (
                        ChainId::new(id),
                        chain.clone(),
                        node.occurrences,
                        node.told_supers.clone(),
                        node.told_reflexive,
                    )
                })
                .collect(),
            disjointness: self
                .cache
                .disjointness
                .iter()
                .map(|(id, members, node)| {
                    (DisjointnessId::new(id), members.clone(), node.occurrences)
                })
                .collect(),
            init_rules: self.init_rules.clone(),
        }
    }
}

/// The live content of an [`OntologyIndex`], see [`OntologyIndex::snapshot`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexSnapshot {
    classes: Vec<(
        ClassId,
        IndexedClassExpression,
        Occurrences,
        RuleChain<SubsumerRule>,
    )>,
    chains: Vec<(ChainId, IndexedPropertyChain, u32, Vec<ChainId>, u32)>,
    disjointness: Vec<(DisjointnessId, Vec<ClassId>, u32)>,
    init_rules: RuleChain<ContextInitRule>,
}

impl IndexSnapshot {
    pub fn class_count(&self) -> usize {
        self.classes.len()
    }
}
