use crate::indexing::{ClassId, DisjointnessId};

/// An ordered multiset of rules attached to a premise.
///
/// Links are kept sorted, so any sequence of [`add`](Self::add) and [`remove`](Self::remove)
/// netting to the same multiset of rules yields the same chain.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RuleChain<R> {
    links: Vec<R>,
}

impl<R> Default for RuleChain<R> {
    fn default() -> Self {
        Self { links: Vec::new() }
    }
}

impl<R: Ord> RuleChain<R> {
    pub fn add(&mut self, rule: R) {
        let position = self.links.partition_point(|link| *link <= rule);
        self.links.insert(position, rule);
    }

    /// Unlinks one occurrence of `rule`.
    ///
    /// Returns `false` and leaves the chain untouched if the rule is not linked.
    pub fn remove(&mut self, rule: &R) -> bool {
        match self.links.binary_search(rule) {
            Ok(position) => {
                self.links.remove(position);
                true
            }
            Err(_) => false,
        }
    }

    pub fn contains(&self, rule: &R) -> bool {
        self.links.binary_search(rule).is_ok()
    }
}

impl<R> RuleChain<R> {
    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.links.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }
}

impl<'a, R> IntoIterator for &'a RuleChain<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// A rule fired when its key class expression becomes a subsumer of a context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubsumerRule {
    /// `key ⊑ super_class` is told by an axiom
    ToldSuperClass(ClassId),
    /// `key ⊓ other` occurs negatively as `conjunction`
    ConjunctionComposition { other: ClassId, conjunction: ClassId },
    /// `key` is a disjunct of the negatively occurring disjunction
    DisjunctionComposition(ClassId),
    /// `key` is the filler of the negatively occurring existential restriction
    PropagationFromFiller(ClassId),
    /// the complement of `key` occurs positively
    ContradictionFromNegation(ClassId),
    /// `key` is a member of the disjointness axiom
    DisjointnessMembership(DisjointnessId),
    /// `key` is owl:Nothing and occurs positively
    ContradictionFromOwlNothing,
}

/// A rule applied to every new context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ContextInitRule {
    /// The root of the context is its own subsumer.
    Root,
    /// owl:Thing occurs negatively and must be a subsumer of every context.
    OwlThing,
}

/// A rule attached to a context and fired for each new backward link into it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BackwardLinkRule {
    /// Composes the new link with the forward links of the context.
    ForwardLinkComposition,
    /// The context is contradictory so is the source of the link.
    ContradictionOverBackwardLink,
}
