//! Inference rules and their dispatch on conclusions.

use crate::conclusion::{Conclusion, Inference};
use crate::context::ContextPremises;
use crate::indexing::{
    BackwardLinkRule, ChainId, ClassId, ContextInitRule, IndexedClassExpression,
    IndexedPropertyChain, OntologyIndex, SubsumerRule,
};
use crate::properties::PropertyHierarchy;

/// Receives the conclusions produced by rule applications.
pub trait ConclusionProducer {
    /// `conclusion` holds for `root` and has been produced by `inference`.
    fn produce(&mut self, root: ClassId, conclusion: Conclusion, inference: Inference);
}

/// Which rules are applied to subsumers.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RuleApplicationMode {
    /// Subsumers obtained by composition are not decomposed again.
    #[default]
    NonRedundant,
    /// Every rule is applied to every subsumer.
    All,
}

/// Applies the inference rules to the conclusions of a context.
#[derive(Debug, Clone, Copy)]
pub struct RuleApplicator<'a> {
    index: &'a OntologyIndex,
    properties: &'a PropertyHierarchy,
    mode: RuleApplicationMode,
}

impl<'a> RuleApplicator<'a> {
    pub fn new(
        index: &'a OntologyIndex,
        properties: &'a PropertyHierarchy,
        mode: RuleApplicationMode,
    ) -> Self {
        Self {
            index,
            properties,
            mode,
        }
    }

    #[inline]
    pub fn index(&self) -> &'a OntologyIndex {
        self.index
    }

    #[inline]
    pub fn properties(&self) -> &'a PropertyHierarchy {
        self.properties
    }

    #[inline]
    pub fn mode(&self) -> RuleApplicationMode {
        self.mode
    }

    /// Stores `conclusion` into the premises of the context of `root` and applies the rules
    /// dispatched on it.
    ///
    /// Returns `false` without applying anything if the conclusion was already stored.
    pub fn process(
        &self,
        root: ClassId,
        conclusion: Conclusion,
        premises: &mut ContextPremises,
        producer: &mut impl ConclusionProducer,
    ) -> bool {
        match conclusion {
            Conclusion::ContextInitialization => {
                if premises.initialized {
                    return false;
                }
                premises.initialized = true;
                for rule in self.index.init_rules() {
                    self.apply_init_rule(root, *rule, producer);
                }
            }
            Conclusion::SubContextInitialization { relation } => {
                if !premises.initialize_sub_context(relation) {
                    return false;
                }
                for &existential in self.properties.negative_existentials(relation) {
                    let Some(IndexedClassExpression::ObjectSomeValuesFrom { filler, .. }) =
                        self.index.class_expression(existential)
                    else {
                        continue;
                    };
                    if premises.contains_subsumer(*filler) {
                        producer.produce(
                            root,
                            Conclusion::Propagation {
                                relation,
                                carry: existential,
                            },
                            Inference::PropagationGeneration {
                                root,
                                relation,
                                existential,
                                filler: *filler,
                            },
                        );
                    }
                }
            }
            Conclusion::DecomposedSubsumer(subsumer) | Conclusion::ComposedSubsumer(subsumer) => {
                let decompose = matches!(conclusion, Conclusion::DecomposedSubsumer(_))
                    || self.mode == RuleApplicationMode::All;
                let (new, decomposition) = premises.insert_subsumer(subsumer, decompose);
                if new {
                    self.compose(root, subsumer, premises, producer);
                }
                if decomposition {
                    self.decompose(root, subsumer, premises, producer);
                }
                return new || decomposition;
            }
            Conclusion::BackwardLink { source, relation } => {
                if !premises.insert_backward_link(source, relation) {
                    return false;
                }
                self.apply_backward_link(root, source, relation, premises, producer);
            }
            Conclusion::ForwardLink { target, chain } => {
                if !premises.insert_forward_link(target, chain) {
                    return false;
                }
                self.apply_forward_link(root, target, chain, premises, producer);
            }
            Conclusion::Propagation { relation, carry } => {
                if !premises.insert_propagation(relation, carry) {
                    return false;
                }
                for source in premises.linked_roots(relation) {
                    producer.produce(
                        source,
                        Conclusion::ComposedSubsumer(carry),
                        Inference::PropagatedSubsumer {
                            source,
                            middle: root,
                            relation,
                            existential: carry,
                        },
                    );
                }
            }
            Conclusion::Contradiction => {
                if !premises.set_contradiction() {
                    return false;
                }
                for (relation, source) in premises.backward_links() {
                    producer.produce(
                        source,
                        Conclusion::Contradiction,
                        Inference::PropagatedContradiction {
                            source,
                            target: root,
                            relation,
                        },
                    );
                }
            }
            Conclusion::DisjointSubsumer { axiom, member } => {
                if !premises.insert_disjoint_subsumer(axiom, member) {
                    return false;
                }
                let duplicated = self
                    .index
                    .cache()
                    .disjoint_members(axiom)
                    .is_some_and(|members| members.iter().filter(|m| **m == member).count() > 1);
                let other = if duplicated {
                    Some(member)
                } else {
                    premises
                        .first_disjoint_subsumer(axiom)
                        .filter(|first| *first != member)
                };
                if let Some(first) = other {
                    producer.produce(
                        root,
                        Conclusion::Contradiction,
                        Inference::ContradictionFromDisjointness {
                            root,
                            axiom,
                            first,
                            second: member,
                        },
                    );
                }
            }
        }
        true
    }

    pub(crate) fn apply_init_rule(
        &self,
        root: ClassId,
        rule: ContextInitRule,
        producer: &mut impl ConclusionProducer,
    ) {
        match rule {
            ContextInitRule::Root => producer.produce(
                root,
                Conclusion::DecomposedSubsumer(root),
                Inference::RootInitialization { root },
            ),
            ContextInitRule::OwlThing => producer.produce(
                root,
                Conclusion::DecomposedSubsumer(ClassId::THING),
                Inference::OwlThingInitialization { root },
            ),
        }
    }

    fn compose(
        &self,
        root: ClassId,
        subsumer: ClassId,
        premises: &ContextPremises,
        producer: &mut impl ConclusionProducer,
    ) {
        let Some(rules) = self.index.cache().subsumer_rules(subsumer) else {
            return;
        };
        for rule in rules {
            self.apply_subsumer_rule(root, subsumer, *rule, premises, producer);
        }
    }

    /// Applies a rule linked to `key`, a subsumer of `root`.
    pub(crate) fn apply_subsumer_rule(
        &self,
        root: ClassId,
        key: ClassId,
        rule: SubsumerRule,
        premises: &ContextPremises,
        producer: &mut impl ConclusionProducer,
    ) {
        match rule {
            SubsumerRule::ToldSuperClass(super_class) => producer.produce(
                root,
                Conclusion::DecomposedSubsumer(super_class),
                Inference::ToldSuperClass { root, sub: key },
            ),
            SubsumerRule::ConjunctionComposition { other, conjunction } => {
                if premises.contains_subsumer(other) {
                    producer.produce(
                        root,
                        Conclusion::ComposedSubsumer(conjunction),
                        Inference::ConjunctionComposition {
                            root,
                            first: key,
                            second: other,
                        },
                    );
                }
            }
            SubsumerRule::DisjunctionComposition(disjunction) => producer.produce(
                root,
                Conclusion::ComposedSubsumer(disjunction),
                Inference::DisjunctionComposition { root, disjunct: key },
            ),
            SubsumerRule::PropagationFromFiller(existential) => {
                let Some(IndexedClassExpression::ObjectSomeValuesFrom { property, .. }) =
                    self.index.class_expression(existential)
                else {
                    return;
                };
                if self.properties.is_reflexive(*property) {
                    producer.produce(
                        root,
                        Conclusion::ComposedSubsumer(existential),
                        Inference::ReflexivePropagatedSubsumer {
                            root,
                            relation: *property,
                            existential,
                            filler: key,
                        },
                    );
                }
                for &relation in self.properties.sub_properties(*property) {
                    if premises.is_sub_context_initialized(relation) {
                        producer.produce(
                            root,
                            Conclusion::Propagation {
                                relation,
                                carry: existential,
                            },
                            Inference::PropagationGeneration {
                                root,
                                relation,
                                existential,
                                filler: key,
                            },
                        );
                    }
                }
            }
            SubsumerRule::ContradictionFromNegation(negation) => {
                if premises.contains_subsumer(negation) {
                    producer.produce(
                        root,
                        Conclusion::Contradiction,
                        Inference::ContradictionFromNegation {
                            root,
                            negation,
                            negated: key,
                        },
                    );
                }
            }
            SubsumerRule::DisjointnessMembership(axiom) => producer.produce(
                root,
                Conclusion::DisjointSubsumer { axiom, member: key },
                Inference::DisjointSubsumerFromMember {
                    root,
                    axiom,
                    member: key,
                },
            ),
            SubsumerRule::ContradictionFromOwlNothing => producer.produce(
                root,
                Conclusion::Contradiction,
                Inference::ContradictionFromOwlNothing { root },
            ),
        }
    }

    fn decompose(
        &self,
        root: ClassId,
        subsumer: ClassId,
        premises: &ContextPremises,
        producer: &mut impl ConclusionProducer,
    ) {
        match self.index.class_expression(subsumer) {
            Some(IndexedClassExpression::ObjectIntersectionOf(first, second)) => {
                for conjunct in [*first, *second] {
                    producer.produce(
                        root,
                        Conclusion::DecomposedSubsumer(conjunct),
                        Inference::ConjunctionDecomposition {
                            root,
                            conjunction: subsumer,
                        },
                    );
                }
            }
            Some(IndexedClassExpression::ObjectSomeValuesFrom { property, filler }) => {
                let inference = Inference::ExistentialDecomposition {
                    root,
                    existential: subsumer,
                };
                if self.properties.needs_forward_links(*property) {
                    producer.produce(
                        root,
                        Conclusion::ForwardLink {
                            target: *filler,
                            chain: *property,
                        },
                        inference,
                    );
                } else {
                    producer.produce(
                        *filler,
                        Conclusion::BackwardLink {
                            source: root,
                            relation: *property,
                        },
                        inference,
                    );
                }
            }
            Some(IndexedClassExpression::ObjectComplementOf(negated)) => {
                if premises.contains_subsumer(*negated) {
                    producer.produce(
                        root,
                        Conclusion::Contradiction,
                        Inference::ContradictionFromNegation {
                            root,
                            negation: subsumer,
                            negated: *negated,
                        },
                    );
                }
            }
            Some(
                IndexedClassExpression::Class(_)
                | IndexedClassExpression::Individual(_)
                | IndexedClassExpression::DataHasValue { .. }
                | IndexedClassExpression::ObjectUnionOf(..),
            )
            | None => (),
        }
    }

    fn apply_backward_link(
        &self,
        root: ClassId,
        source: ClassId,
        relation: ChainId,
        premises: &ContextPremises,
        producer: &mut impl ConclusionProducer,
    ) {
        if !premises.is_sub_context_initialized(relation) {
            producer.produce(
                root,
                Conclusion::SubContextInitialization { relation },
                Inference::SubContextInitialization {
                    root,
                    source,
                    relation,
                },
            );
        }
        for carry in premises.propagations(relation) {
            producer.produce(
                source,
                Conclusion::ComposedSubsumer(carry),
                Inference::PropagatedSubsumer {
                    source,
                    middle: root,
                    relation,
                    existential: carry,
                },
            );
        }
        for rule in &premises.backward_link_rules {
            match rule {
                BackwardLinkRule::ForwardLinkComposition => {
                    if !self.properties.has_compositions_by_left(relation) {
                        continue;
                    }
                    for (right, target) in premises.forward_links() {
                        for &composed in self.properties.compositions(relation, right) {
                            self.produce_composition(
                                source,
                                target,
                                composed,
                                Inference::LinkComposition {
                                    source,
                                    middle: root,
                                    target,
                                    left: relation,
                                    right,
                                },
                                producer,
                            );
                        }
                    }
                }
                BackwardLinkRule::ContradictionOverBackwardLink => producer.produce(
                    source,
                    Conclusion::Contradiction,
                    Inference::PropagatedContradiction {
                        source,
                        target: root,
                        relation,
                    },
                ),
            }
        }
    }

    fn apply_forward_link(
        &self,
        root: ClassId,
        target: ClassId,
        chain: ChainId,
        premises: &ContextPremises,
        producer: &mut impl ConclusionProducer,
    ) {
        if self.is_property(chain) {
            producer.produce(
                target,
                Conclusion::BackwardLink {
                    source: root,
                    relation: chain,
                },
                Inference::ReversedForwardLink {
                    source: root,
                    target,
                    relation: chain,
                },
            );
        }
        for (left, source) in premises.backward_links() {
            for &composed in self.properties.compositions(left, chain) {
                self.produce_composition(
                    source,
                    target,
                    composed,
                    Inference::LinkComposition {
                        source,
                        middle: root,
                        target,
                        left,
                        right: chain,
                    },
                    producer,
                );
            }
        }
        for &composed in self.properties.reflexive_compositions(chain) {
            self.produce_composition(
                root,
                target,
                composed,
                Inference::ReflexiveLinkComposition {
                    middle: root,
                    target,
                    right: chain,
                },
                producer,
            );
        }
    }

    /// Produces the link `source --composed--> target`.
    fn produce_composition(
        &self,
        source: ClassId,
        target: ClassId,
        composed: ChainId,
        inference: Inference,
        producer: &mut impl ConclusionProducer,
    ) {
        if !self.is_property(composed) || self.properties.needs_forward_links(composed) {
            producer.produce(
                source,
                Conclusion::ForwardLink {
                    target,
                    chain: composed,
                },
                inference,
            );
        } else {
            producer.produce(
                target,
                Conclusion::BackwardLink {
                    source,
                    relation: composed,
                },
                inference,
            );
        }
    }

    fn is_property(&self, chain: ChainId) -> bool {
        matches!(
            self.index.cache().property_chain(chain),
            Some(IndexedPropertyChain::ObjectProperty(_))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Axiom, ClassExpression, OwlClass};
    use crate::ReasonerError;
    use oxrdf::NamedNode;

    #[derive(Default)]
    struct Collector(Vec<(ClassId, Conclusion)>);

    impl ConclusionProducer for Collector {
        fn produce(&mut self, root: ClassId, conclusion: Conclusion, _: Inference) {
            self.0.push((root, conclusion));
        }
    }

    fn class(name: &str) -> ClassExpression {
        ClassExpression::class(OwlClass::new(NamedNode::new_unchecked(format!(
            "http://example.com/{name}"
        ))))
    }

    #[test]
    fn test_duplicate_conclusion_is_ignored() -> Result<(), ReasonerError> {
        let mut index = OntologyIndex::new();
        index.index_axiom(&Axiom::sub_class_of(class("A"), class("B")))?;
        let properties = PropertyHierarchy::new(index.cache());
        let applicator = RuleApplicator::new(&index, &properties, RuleApplicationMode::default());
        let a = index.class_expression_id(&class("A")).unwrap();
        let b = index.class_expression_id(&class("B")).unwrap();
        let mut premises = ContextPremises::default();
        let mut collector = Collector::default();
        assert!(applicator.process(a, Conclusion::DecomposedSubsumer(a), &mut premises, &mut collector));
        assert_eq!(collector.0, [(a, Conclusion::DecomposedSubsumer(b))]);
        assert!(!applicator.process(a, Conclusion::DecomposedSubsumer(a), &mut premises, &mut collector));
        assert!(!applicator.process(a, Conclusion::ComposedSubsumer(a), &mut premises, &mut collector));
        assert_eq!(collector.0.len(), 1);
        Ok(())
    }

    #[test]
    fn test_composed_subsumer_is_not_decomposed() -> Result<(), ReasonerError> {
        let mut index = OntologyIndex::new();
        let conjunction = ClassExpression::intersection([class("B"), class("C")]);
        index.index_axiom(&Axiom::sub_class_of(class("A"), conjunction.clone()))?;
        let properties = PropertyHierarchy::new(index.cache());
        let a = index.class_expression_id(&class("A")).unwrap();
        let conjunction = index.class_expression_id(&conjunction).unwrap();

        let applicator = RuleApplicator::new(&index, &properties, RuleApplicationMode::NonRedundant);
        let mut collector = Collector::default();
        applicator.process(
            a,
            Conclusion::ComposedSubsumer(conjunction),
            &mut ContextPremises::default(),
            &mut collector,
        );
        assert!(collector.0.is_empty());

        let applicator = RuleApplicator::new(&index, &properties, RuleApplicationMode::All);
        applicator.process(
            a,
            Conclusion::ComposedSubsumer(conjunction),
            &mut ContextPremises::default(),
            &mut collector,
        );
        assert_eq!(collector.0.len(), 2);
        Ok(())
    }
}
