use crate::conclusion::Conclusion;
use crate::indexing::{BackwardLinkRule, ChainId, ClassId, DisjointnessId, RuleChain};
use rustc_hash::{FxHashMap, FxHashSet};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// The saturation state of a single root class expression.
///
/// A context is processed by at most one worker at a time: the worker owning it is the one
/// that switched its active flag on.
#[derive(Debug)]
pub struct Context {
    root: ClassId,
    active: AtomicBool,
    saturated: AtomicBool,
    to_do: Mutex<VecDeque<Conclusion>>,
    premises: Mutex<ContextPremises>,
}

impl Context {
    pub(crate) fn new(root: ClassId) -> Self {
        Self {
            root,
            active: AtomicBool::new(false),
            saturated: AtomicBool::new(false),
            to_do: Mutex::new(VecDeque::from([Conclusion::ContextInitialization])),
            premises: Mutex::new(ContextPremises::default()),
        }
    }

    #[inline]
    pub fn root(&self) -> ClassId {
        self.root
    }

    /// Whether all the conclusions of the context have been derived.
    pub fn is_saturated(&self) -> bool {
        self.saturated.load(Ordering::Acquire)
    }

    pub fn is_initialized(&self) -> bool {
        self.premises().initialized
    }

    /// The conclusions stored so far.
    pub fn premises(&self) -> MutexGuard<'_, ContextPremises> {
        lock(&self.premises)
    }

    /// The subsumers derived so far, sorted.
    pub fn subsumers(&self) -> Vec<ClassId> {
        let mut subsumers = self.premises().subsumers.iter().copied().collect::<Vec<_>>();
        subsumers.sort_unstable();
        subsumers
    }

    pub fn has_contradiction(&self) -> bool {
        self.premises().contradiction
    }

    pub(crate) fn set_saturated(&self, saturated: bool) -> bool {
        self.saturated.swap(saturated, Ordering::AcqRel)
    }

    pub(crate) fn push(&self, conclusion: Conclusion) {
        lock(&self.to_do).push_back(conclusion);
    }

    pub(crate) fn poll(&self) -> Option<Conclusion> {
        lock(&self.to_do).pop_front()
    }

    pub(crate) fn clear_pending(&self) {
        lock(&self.to_do).clear();
    }

    pub(crate) fn has_pending(&self) -> bool {
        !lock(&self.to_do).is_empty()
    }

    /// Switches the active flag on, returns `false` if it was already on.
    pub(crate) fn activate(&self) -> bool {
        self.active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub(crate) fn deactivate(&self) {
        self.active.store(false, Ordering::Release);
    }

    /// Drops every conclusion and schedules the initialization again.
    pub(crate) fn reset(&self) {
        *self.premises() = ContextPremises::default();
        let mut to_do = lock(&self.to_do);
        to_do.clear();
        to_do.push_back(Conclusion::ContextInitialization);
        self.saturated.store(false, Ordering::Release);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// The conclusions stored in a context.
#[derive(Debug, Default)]
pub struct ContextPremises {
    pub(crate) initialized: bool,
    pub(crate) subsumers: FxHashSet<ClassId>,
    /// Subsumers on which the decomposition rules have been applied
    pub(crate) decomposed: FxHashSet<ClassId>,
    pub(crate) sub_contexts: FxHashMap<ChainId, SubContextPremises>,
    pub(crate) forward_links: FxHashMap<ChainId, FxHashSet<ClassId>>,
    pub(crate) backward_link_rules: RuleChain<BackwardLinkRule>,
    pub(crate) contradiction: bool,
    pub(crate) disjoint_subsumers: FxHashMap<DisjointnessId, Vec<ClassId>>,
}

/// The premises stored for one relation of the links arriving into a context.
#[derive(Debug, Default)]
pub(crate) struct SubContextPremises {
    pub(crate) initialized: bool,
    pub(crate) linked_roots: FxHashSet<ClassId>,
    pub(crate) propagations: FxHashSet<ClassId>,
}

impl ContextPremises {
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn contains_subsumer(&self, subsumer: ClassId) -> bool {
        self.subsumers.contains(&subsumer)
    }

    pub fn subsumers(&self) -> impl Iterator<Item = ClassId> + '_ {
        self.subsumers.iter().copied()
    }

    pub fn has_contradiction(&self) -> bool {
        self.contradiction
    }

    /// The `(relation, source)` pairs of the links arriving into the context.
    pub fn backward_links(&self) -> impl Iterator<Item = (ChainId, ClassId)> + '_ {
        self.sub_contexts.iter().flat_map(|(relation, sub_context)| {
            sub_context
                .linked_roots
                .iter()
                .map(move |source| (*relation, *source))
        })
    }

    /// The `(chain, target)` pairs of the links stored in the context.
    pub fn forward_links(&self) -> impl Iterator<Item = (ChainId, ClassId)> + '_ {
        self.forward_links
            .iter()
            .flat_map(|(chain, targets)| targets.iter().map(move |target| (*chain, *target)))
    }

    pub fn linked_roots(&self, relation: ChainId) -> impl Iterator<Item = ClassId> + '_ {
        self.sub_contexts
            .get(&relation)
            .into_iter()
            .flat_map(|sub_context| sub_context.linked_roots.iter().copied())
    }

    pub fn propagations(&self, relation: ChainId) -> impl Iterator<Item = ClassId> + '_ {
        self.sub_contexts
            .get(&relation)
            .into_iter()
            .flat_map(|sub_context| sub_context.propagations.iter().copied())
    }

    pub fn is_sub_context_initialized(&self, relation: ChainId) -> bool {
        self.sub_contexts
            .get(&relation)
            .is_some_and(|sub_context| sub_context.initialized)
    }

    /// Whether the conclusion is already stored.
    pub fn contains(&self, conclusion: &Conclusion) -> bool {
        match *conclusion {
            Conclusion::ContextInitialization => self.initialized,
            Conclusion::SubContextInitialization { relation } => {
                self.is_sub_context_initialized(relation)
            }
            Conclusion::DecomposedSubsumer(subsumer) => self.decomposed.contains(&subsumer),
            Conclusion::ComposedSubsumer(subsumer) => self.subsumers.contains(&subsumer),
            Conclusion::BackwardLink { source, relation } => self
                .sub_contexts
                .get(&relation)
                .is_some_and(|sub_context| sub_context.linked_roots.contains(&source)),
            Conclusion::ForwardLink { target, chain } => self
                .forward_links
                .get(&chain)
                .is_some_and(|targets| targets.contains(&target)),
            Conclusion::Propagation { relation, carry } => self
                .sub_contexts
                .get(&relation)
                .is_some_and(|sub_context| sub_context.propagations.contains(&carry)),
            Conclusion::Contradiction => self.contradiction,
            Conclusion::DisjointSubsumer { axiom, member } => self
                .disjoint_subsumers
                .get(&axiom)
                .is_some_and(|members| members.contains(&member)),
        }
    }

    /// Adds a subsumer, returns whether it is new and whether its decomposition is new.
    pub(crate) fn insert_subsumer(&mut self, subsumer: ClassId, decompose: bool) -> (bool, bool) {
        let new = self.subsumers.insert(subsumer);
        let decomposition = decompose && self.decomposed.insert(subsumer);
        (new, decomposition)
    }

    pub(crate) fn insert_backward_link(&mut self, source: ClassId, relation: ChainId) -> bool {
        self.sub_contexts
            .entry(relation)
            .or_default()
            .linked_roots
            .insert(source)
    }

    pub(crate) fn insert_forward_link(&mut self, target: ClassId, chain: ChainId) -> bool {
        if self.forward_links.is_empty() {
            self.backward_link_rules
                .add(BackwardLinkRule::ForwardLinkComposition);
        }
        self.forward_links.entry(chain).or_default().insert(target)
    }

    pub(crate) fn insert_propagation(&mut self, relation: ChainId, carry: ClassId) -> bool {
        self.sub_contexts
            .entry(relation)
            .or_default()
            .propagations
            .insert(carry)
    }

    pub(crate) fn initialize_sub_context(&mut self, relation: ChainId) -> bool {
        let sub_context = self.sub_contexts.entry(relation).or_default();
        !std::mem::replace(&mut sub_context.initialized, true)
    }

    pub(crate) fn set_contradiction(&mut self) -> bool {
        if self.contradiction {
            return false;
        }
        self.contradiction = true;
        self.backward_link_rules
            .add(BackwardLinkRule::ContradictionOverBackwardLink);
        true
    }

    pub(crate) fn insert_disjoint_subsumer(&mut self, axiom: DisjointnessId, member: ClassId) -> bool {
        let members = self.disjoint_subsumers.entry(axiom).or_default();
        if members.contains(&member) {
            return false;
        }
        members.push(member);
        true
    }

    /// The first member of the disjointness axiom stored as a disjoint subsumer.
    pub(crate) fn first_disjoint_subsumer(&self, axiom: DisjointnessId) -> Option<ClassId> {
        self.disjoint_subsumers
            .get(&axiom)
            .and_then(|members| members.first().copied())
    }

    /// Drops the links arriving from the given sources, returns whether some link was dropped.
    pub(crate) fn remove_backward_links(&mut self, mut from: impl FnMut(ClassId) -> bool) -> bool {
        let mut removed = false;
        for sub_context in self.sub_contexts.values_mut() {
            let before = sub_context.linked_roots.len();
            sub_context.linked_roots.retain(|source| !from(*source));
            removed |= sub_context.linked_roots.len() != before;
        }
        removed
    }
}
