//! Checks that the saturation graph only refers to live index nodes.
//!
//! After incremental changes every handle reachable from the contexts, their links and the
//! rule chains of the index must still resolve in the index.

use crate::error::ReasonerError;
use crate::indexing::{
    ChainId, ClassId, DisjointnessId, IndexedClassExpression, IndexedPropertyChain,
    OntologyIndex, SubsumerRule,
};
use crate::state::SaturationState;
use std::fmt;

pub(crate) fn validate(
    index: &OntologyIndex,
    state: &SaturationState,
) -> Result<(), ReasonerError> {
    let validator = Validator { index };
    validator.validate_index()?;
    for context in state.contexts() {
        let root = context.root();
        let owner = Owner::Context(root);
        validator.class(owner, root)?;
        if !context.is_saturated() {
            return Err(ReasonerError::invariant(format!(
                "the context of {root:?} is not saturated"
            )));
        }
        let premises = context.premises();
        for subsumer in premises.subsumers().chain(premises.decomposed.iter().copied()) {
            validator.class(owner, subsumer)?;
        }
        for (relation, sub_context) in &premises.sub_contexts {
            validator.chain(owner, *relation)?;
            for id in sub_context
                .linked_roots
                .iter()
                .chain(&sub_context.propagations)
            {
                validator.class(owner, *id)?;
            }
        }
        for (chain, target) in premises.forward_links() {
            validator.chain(owner, chain)?;
            validator.class(owner, target)?;
        }
        for (axiom, members) in &premises.disjoint_subsumers {
            validator.disjointness(owner, *axiom)?;
            for member in members {
                validator.class(owner, *member)?;
            }
        }
    }
    Ok(())
}

/// Where a handle has been found.
#[derive(Clone, Copy)]
enum Owner {
    Context(ClassId),
    Class(ClassId),
    Chain(ChainId),
    Disjointness(DisjointnessId),
}

impl fmt::Display for Owner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Context(id) => write!(f, "the context of {}", id.raw()),
            Self::Class(id) => write!(f, "the class expression {}", id.raw()),
            Self::Chain(id) => write!(f, "the property chain {}", id.raw()),
            Self::Disjointness(id) => write!(f, "the disjointness axiom {}", id.raw()),
        }
    }
}

struct Validator<'a> {
    index: &'a OntologyIndex,
}

impl Validator<'_> {
    fn validate_index(&self) -> Result<(), ReasonerError> {
        let cache = self.index.cache();
        for (id, expression) in cache.classes() {
            let owner = Owner::Class(id);
            match expression {
                IndexedClassExpression::ObjectIntersectionOf(first, second)
                | IndexedClassExpression::ObjectUnionOf(first, second) => {
                    self.class(owner, *first)?;
                    self.class(owner, *second)?;
                }
                IndexedClassExpression::ObjectSomeValuesFrom { property, filler } => {
                    self.chain(owner, *property)?;
                    self.class(owner, *filler)?;
                }
                IndexedClassExpression::ObjectComplementOf(operand) => {
                    self.class(owner, *operand)?;
                }
                IndexedClassExpression::Class(_)
                | IndexedClassExpression::Individual(_)
                | IndexedClassExpression::DataHasValue { .. } => (),
            }
            for rule in cache.subsumer_rules(id).into_iter().flatten() {
                match *rule {
                    SubsumerRule::ToldSuperClass(other)
                    | SubsumerRule::DisjunctionComposition(other)
                    | SubsumerRule::PropagationFromFiller(other)
                    | SubsumerRule::ContradictionFromNegation(other) => {
                        self.class(owner, other)?;
                    }
                    SubsumerRule::ConjunctionComposition { other, conjunction } => {
                        self.class(owner, other)?;
                        self.class(owner, conjunction)?;
                    }
                    SubsumerRule::DisjointnessMembership(axiom) => {
                        self.disjointness(owner, axiom)?;
                    }
                    SubsumerRule::ContradictionFromOwlNothing => (),
                }
            }
        }
        for (id, chain) in cache.chains() {
            let owner = Owner::Chain(id);
            if let IndexedPropertyChain::BinaryPropertyChain { first, suffix } = chain {
                self.chain(owner, *first)?;
                self.chain(owner, *suffix)?;
            }
            if let Some(node) = cache.chain_node(id) {
                for sup in &node.told_supers {
                    self.chain(owner, *sup)?;
                }
            }
        }
        for (id, members, _) in cache.disjointness.iter() {
            let owner = Owner::Disjointness(DisjointnessId::new(id));
            for member in members {
                self.class(owner, *member)?;
            }
        }
        Ok(())
    }

    fn class(&self, owner: Owner, id: ClassId) -> Result<(), ReasonerError> {
        if self.index.class_expression(id).is_some() {
            Ok(())
        } else {
            Err(dangling(owner, format!("{id:?}")))
        }
    }

    fn chain(&self, owner: Owner, id: ChainId) -> Result<(), ReasonerError> {
        if self.index.cache().property_chain(id).is_some() {
            Ok(())
        } else {
            Err(dangling(owner, format!("{id:?}")))
        }
    }

    fn disjointness(&self, owner: Owner, id: DisjointnessId) -> Result<(), ReasonerError> {
        if self.index.cache().disjoint_members(id).is_some() {
            Ok(())
        } else {
            Err(dangling(owner, format!("{id:?}")))
        }
    }
}

fn dangling(owner: Owner, target: String) -> ReasonerError {
    ReasonerError::invariant(format!("{owner} refers to {target} which is not indexed"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancellation::CancellationToken;
    use crate::engine::RuleApplicationEngine;
    use crate::model::{Axiom, ClassExpression, ObjectProperty, OwlClass};
    use crate::properties::PropertyHierarchy;
    use crate::rules::{RuleApplicationMode, RuleApplicator};
    use oxrdf::NamedNode;

    fn class(name: &str) -> ClassExpression {
        ClassExpression::class(OwlClass::new(NamedNode::new_unchecked(format!(
            "http://example.com/{name}"
        ))))
    }

    fn saturated(index: &OntologyIndex) -> Result<SaturationState, ReasonerError> {
        let properties = PropertyHierarchy::new(index.cache());
        let state = SaturationState::new();
        let token = CancellationToken::new();
        let engine = RuleApplicationEngine::new(
            RuleApplicator::new(index, &properties, RuleApplicationMode::default()),
            &state,
            &token,
        );
        for (id, _) in index.named_classes() {
            engine.submit(id);
        }
        engine.saturate(1)?;
        Ok(state)
    }

    fn index() -> Result<OntologyIndex, ReasonerError> {
        let r = ObjectProperty::new(NamedNode::new_unchecked("http://example.com/r"));
        let mut index = OntologyIndex::new();
        index.index_axiom(&Axiom::sub_class_of(
            class("A"),
            ClassExpression::some_values_from(r.clone(), class("B")),
        ))?;
        index.index_axiom(&Axiom::sub_class_of(
            ClassExpression::some_values_from(r, class("B")),
            ClassExpression::intersection([class("C"), class("D")]),
        ))?;
        index.index_axiom(&Axiom::DisjointClasses(vec![class("C"), class("E")]))?;
        Ok(index)
    }

    #[test]
    fn test_saturated_graph_is_valid() -> Result<(), ReasonerError> {
        let index = index()?;
        let state = saturated(&index)?;
        validate(&index, &state)
    }

    #[test]
    fn test_unindexed_subsumer_is_detected() -> Result<(), ReasonerError> {
        let mut index = index()?;
        let state = saturated(&index)?;
        index.unindex_axiom(&Axiom::DisjointClasses(vec![class("C"), class("E")]))?;
        assert!(matches!(
            validate(&index, &state),
            Err(ReasonerError::InvariantViolation(_))
        ));
        Ok(())
    }

    #[test]
    fn test_pending_context_is_detected() {
        let index = OntologyIndex::new();
        let state = SaturationState::new();
        state.get_or_create(ClassId::THING);
        assert!(matches!(
            validate(&index, &state),
            Err(ReasonerError::InvariantViolation(_))
        ));
    }
}
