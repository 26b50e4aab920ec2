//! Recovery of the inferences that produced a conclusion.
//!
//! Inferences are not stored during saturation. They are recomputed on demand by replaying
//! the saturated conclusions of a context in a fresh local state: every conclusion this
//! replay produces, for the context itself or for another one, is recorded with its inference.

use crate::conclusion::{Conclusion, Inference};
use crate::context::{Context, ContextPremises};
use crate::indexing::ClassId;
use crate::rules::{ConclusionProducer, RuleApplicator};
use crate::state::{ContextCreationPolicy, SaturationState, SaturationStateWriter};
use dashmap::DashMap;
use rustc_hash::{FxBuildHasher, FxHashMap, FxHashSet};
use std::sync::{Arc, OnceLock};
use tracing::trace;

type InferenceMap = FxHashMap<(ClassId, Conclusion), Vec<Inference>>;

/// A cache of the inferences recorded per traced context.
///
/// It must be cleared whenever the saturation changes.
#[derive(Debug, Default)]
pub struct TraceState {
    traced: DashMap<ClassId, Arc<OnceLock<InferenceMap>>, FxBuildHasher>,
}

impl TraceState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&self) {
        self.traced.clear();
    }

    /// Number of contexts traced since the last clear.
    pub fn len(&self) -> usize {
        self.traced.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traced.is_empty()
    }

    /// Every inference producing `conclusion` in the context of `root`.
    ///
    /// The contexts of `state` around `root` must be saturated. Both kinds of subsumer
    /// conclusions are considered equal.
    pub fn inferences(
        &self,
        applicator: &RuleApplicator<'_>,
        state: &SaturationState,
        root: ClassId,
        conclusion: &Conclusion,
    ) -> Vec<Inference> {
        let Some(context) = state.context(root) else {
            return Vec::new();
        };
        let keys = match conclusion.subsumer() {
            Some(subsumer) => vec![
                (root, Conclusion::DecomposedSubsumer(subsumer)),
                (root, Conclusion::ComposedSubsumer(subsumer)),
            ],
            None => vec![(root, *conclusion)],
        };
        let mut result = Vec::new();
        for producer in neighbourhood(&context, state) {
            let traced = self.trace(applicator, &producer);
            let Some(traced) = traced.get() else {
                continue;
            };
            for key in &keys {
                for inference in traced.get(key).into_iter().flatten() {
                    if !result.contains(inference) {
                        result.push(*inference);
                    }
                }
            }
        }
        result
    }

    fn trace(
        &self,
        applicator: &RuleApplicator<'_>,
        context: &Context,
    ) -> Arc<OnceLock<InferenceMap>> {
        let traced = Arc::clone(
            self.traced
                .entry(context.root())
                .or_insert_with(|| Arc::new(OnceLock::new()))
                .value(),
        );
        traced.get_or_init(|| replay(applicator, context));
        traced
    }
}

/// The contexts that may produce conclusions into the context of `root`.
fn neighbourhood(context: &Arc<Context>, state: &SaturationState) -> Vec<Arc<Context>> {
    let root = context.root();
    let mut roots = FxHashSet::default();
    roots.insert(root);
    roots.extend(context.premises().backward_links().map(|(_, source)| source));
    let mut result = Vec::new();
    for candidate in state.contexts() {
        let premises = candidate.premises();
        if roots.contains(&candidate.root())
            || premises.backward_links().any(|(_, source)| source == root)
            || premises.forward_links().any(|(_, target)| target == root)
        {
            drop(premises);
            result.push(candidate);
        }
    }
    result
}

/// Replays the stored conclusions of `context` and records all the produced conclusions.
fn replay(applicator: &RuleApplicator<'_>, context: &Context) -> InferenceMap {
    let root = context.root();
    let local = SaturationState::new();
    let (replayed, _) = local.get_or_create(root);
    for seed in seeds(&context.premises()) {
        replayed.push(seed);
    }
    let mut producer = TracingProducer {
        inferences: FxHashMap::default(),
        writer: local.writer(ContextCreationPolicy::ExistingOnly, None),
    };
    producer.record(
        root,
        Conclusion::ContextInitialization,
        Inference::ContextCreation { root },
    );
    while let Some(conclusion) = replayed.poll() {
        applicator.process(root, conclusion, &mut replayed.premises(), &mut producer);
    }
    trace!(
        root = root.raw(),
        conclusions = producer.inferences.len(),
        "context traced"
    );
    producer.inferences
}

/// The stored conclusions not derived by the context from the others.
fn seeds(premises: &ContextPremises) -> Vec<Conclusion> {
    let mut seeds = Vec::new();
    for subsumer in premises.subsumers() {
        seeds.push(if premises.decomposed.contains(&subsumer) {
            Conclusion::DecomposedSubsumer(subsumer)
        } else {
            Conclusion::ComposedSubsumer(subsumer)
        });
    }
    seeds.extend(
        premises
            .backward_links()
            .map(|(relation, source)| Conclusion::BackwardLink { source, relation }),
    );
    seeds.extend(
        premises
            .forward_links()
            .map(|(chain, target)| Conclusion::ForwardLink { target, chain }),
    );
    if premises.has_contradiction() {
        seeds.push(Conclusion::Contradiction);
    }
    seeds
}

struct TracingProducer<'a> {
    inferences: InferenceMap,
    writer: SaturationStateWriter<'a>,
}

impl TracingProducer<'_> {
    fn record(&mut self, root: ClassId, conclusion: Conclusion, inference: Inference) {
        let inferences = self.inferences.entry((root, conclusion)).or_default();
        if !inferences.contains(&inference) {
            inferences.push(inference);
        }
    }
}

impl ConclusionProducer for TracingProducer<'_> {
    fn produce(&mut self, root: ClassId, conclusion: Conclusion, inference: Inference) {
        self.record(root, conclusion, inference);
        self.writer.produce(root, conclusion, inference);
    }
}
