use crate::indexing::{ChainId, ClassId, DisjointnessId};

/// A fact derived for the root of some context.
///
/// Conclusions are produced by rules into the to-do queue of a context and processed there
/// exactly once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Conclusion {
    /// The context must apply the global initialization rules.
    ContextInitialization,
    /// Links over `relation` arrive into the context and its propagations must be seeded.
    SubContextInitialization { relation: ChainId },
    /// A subsumer whose structure still has to be decomposed.
    DecomposedSubsumer(ClassId),
    /// A subsumer built from other subsumers, only composition rules apply.
    ComposedSubsumer(ClassId),
    /// `source ⊑ ∃relation.root`, stored in the context of the filler.
    BackwardLink { source: ClassId, relation: ChainId },
    /// `root ⊑ ∃chain.target`, stored in the context of the source.
    ForwardLink { target: ClassId, chain: ChainId },
    /// Every context linked over `relation` has the existential `carry` as subsumer.
    Propagation { relation: ChainId, carry: ClassId },
    /// The root is unsatisfiable.
    Contradiction,
    /// `member` is a subsumer and a member of the disjointness axiom.
    DisjointSubsumer {
        axiom: DisjointnessId,
        member: ClassId,
    },
}

impl Conclusion {
    /// The subsumer carried by the conclusion, if any.
    pub fn subsumer(&self) -> Option<ClassId> {
        match self {
            Self::DecomposedSubsumer(s) | Self::ComposedSubsumer(s) => Some(*s),
            _ => None,
        }
    }
}

/// One rule application: which rule produced a conclusion from which premises.
///
/// The produced conclusion is not part of the inference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Inference {
    /// A context has been created for `root`.
    ContextCreation { root: ClassId },
    RootInitialization { root: ClassId },
    OwlThingInitialization { root: ClassId },
    /// `sub ⊑ super` is told and `sub` is a subsumer.
    ToldSuperClass { root: ClassId, sub: ClassId },
    ConjunctionDecomposition { root: ClassId, conjunction: ClassId },
    ConjunctionComposition {
        root: ClassId,
        first: ClassId,
        second: ClassId,
    },
    DisjunctionComposition { root: ClassId, disjunct: ClassId },
    /// Produces the link of an existential subsumer.
    ExistentialDecomposition { root: ClassId, existential: ClassId },
    /// Produces the backward link matching a forward link over a property.
    ReversedForwardLink {
        source: ClassId,
        target: ClassId,
        relation: ChainId,
    },
    /// `source --left--> middle --right--> target`
    LinkComposition {
        source: ClassId,
        middle: ClassId,
        target: ClassId,
        left: ChainId,
        right: ChainId,
    },
    /// `middle --right--> target` composed with a reflexive left property
    ReflexiveLinkComposition {
        middle: ClassId,
        target: ClassId,
        right: ChainId,
    },
    /// The sub-context over `relation` is initialized and `filler` is a subsumer.
    PropagationGeneration {
        root: ClassId,
        relation: ChainId,
        existential: ClassId,
        filler: ClassId,
    },
    /// The existential is derived for `source` linked to `middle` over `relation`.
    PropagatedSubsumer {
        source: ClassId,
        middle: ClassId,
        relation: ChainId,
        existential: ClassId,
    },
    /// The root is linked to itself over the reflexive `relation` and `filler` is a subsumer.
    ReflexivePropagatedSubsumer {
        root: ClassId,
        relation: ChainId,
        existential: ClassId,
        filler: ClassId,
    },
    SubContextInitialization {
        root: ClassId,
        source: ClassId,
        relation: ChainId,
    },
    ContradictionFromNegation {
        root: ClassId,
        negation: ClassId,
        negated: ClassId,
    },
    ContradictionFromOwlNothing { root: ClassId },
    ContradictionFromDisjointness {
        root: ClassId,
        axiom: DisjointnessId,
        first: ClassId,
        second: ClassId,
    },
    DisjointSubsumerFromMember {
        root: ClassId,
        axiom: DisjointnessId,
        member: ClassId,
    },
    /// The contradiction of `target` reaches `source` linked to it.
    PropagatedContradiction {
        source: ClassId,
        target: ClassId,
        relation: ChainId,
    },
}

impl Inference {
    /// The premises of the inference with the roots of the contexts storing them.
    ///
    /// Premises that only need to be subsumers, whatever their derivation, are given as
    /// [`Conclusion::ComposedSubsumer`].
    pub fn premises(&self) -> Vec<(ClassId, Conclusion)> {
        use Conclusion::{
            BackwardLink, ComposedSubsumer, ContextInitialization, Contradiction,
            DecomposedSubsumer, ForwardLink, Propagation, SubContextInitialization,
        };

        match *self {
            Self::ContextCreation { .. } => Vec::new(),
            Self::RootInitialization { root } | Self::OwlThingInitialization { root } => {
                vec![(root, ContextInitialization)]
            }
            Self::ToldSuperClass { root, sub } => vec![(root, ComposedSubsumer(sub))],
            Self::ConjunctionDecomposition { root, conjunction } => {
                vec![(root, DecomposedSubsumer(conjunction))]
            }
            Self::ConjunctionComposition {
                root,
                first,
                second,
            } => vec![(root, ComposedSubsumer(first)), (root, ComposedSubsumer(second))],
            Self::DisjunctionComposition { root, disjunct } => {
                vec![(root, ComposedSubsumer(disjunct))]
            }
            Self::ExistentialDecomposition { root, existential } => {
                vec![(root, DecomposedSubsumer(existential))]
            }
            Self::ReversedForwardLink {
                source,
                target,
                relation,
            } => vec![(
                source,
                ForwardLink {
                    target,
                    chain: relation,
                },
            )],
            Self::LinkComposition {
                source,
                middle,
                target,
                left,
                right,
            } => vec![
                (
                    middle,
                    BackwardLink {
                        source,
                        relation: left,
                    },
                ),
                (
                    middle,
                    ForwardLink {
                        target,
                        chain: right,
                    },
                ),
            ],
            Self::ReflexiveLinkComposition {
                middle,
                target,
                right,
            } => vec![(
                middle,
                ForwardLink {
                    target,
                    chain: right,
                },
            )],
            Self::PropagationGeneration {
                root,
                relation,
                filler,
                ..
            } => vec![
                (root, SubContextInitialization { relation }),
                (root, ComposedSubsumer(filler)),
            ],
            Self::PropagatedSubsumer {
                source,
                middle,
                relation,
                existential,
            } => vec![
                (middle, BackwardLink { source, relation }),
                (
                    middle,
                    Propagation {
                        relation,
                        carry: existential,
                    },
                ),
            ],
            Self::ReflexivePropagatedSubsumer { root, filler, .. } => {
                vec![(root, ComposedSubsumer(filler))]
            }
            Self::SubContextInitialization {
                root,
                source,
                relation,
            } => vec![(root, BackwardLink { source, relation })],
            Self::ContradictionFromNegation {
                root,
                negation,
                negated,
            } => vec![(root, ComposedSubsumer(negation)), (root, ComposedSubsumer(negated))],
            Self::ContradictionFromOwlNothing { root } => {
                vec![(root, ComposedSubsumer(ClassId::NOTHING))]
            }
            Self::ContradictionFromDisjointness {
                root,
                axiom,
                first,
                second,
            } => vec![
                (
                    root,
                    Conclusion::DisjointSubsumer {
                        axiom,
                        member: first,
                    },
                ),
                (
                    root,
                    Conclusion::DisjointSubsumer {
                        axiom,
                        member: second,
                    },
                ),
            ],
            Self::DisjointSubsumerFromMember { root, member, .. } => {
                vec![(root, ComposedSubsumer(member))]
            }
            Self::PropagatedContradiction {
                source,
                target,
                relation,
            } => vec![(target, Contradiction), (target, BackwardLink { source, relation })],
        }
    }
}
