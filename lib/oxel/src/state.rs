use crate::conclusion::{Conclusion, Inference};
use crate::context::Context;
use crate::indexing::ClassId;
use crate::rules::ConclusionProducer;
use crate::statistics::SaturationObserver;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rustc_hash::FxBuildHasher;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// The contexts of the saturation and the queue of the contexts with pending conclusions.
///
/// Contexts are created concurrently: when several workers create the context of the same
/// root at the same time, one of them wins and the others reuse its context.
#[derive(Debug, Default)]
pub struct SaturationState {
    contexts: DashMap<ClassId, Arc<Context>, FxBuildHasher>,
    active_contexts: Mutex<VecDeque<Arc<Context>>>,
    not_saturated: Mutex<Vec<Arc<Context>>>,
}

impl SaturationState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn context(&self, root: ClassId) -> Option<Arc<Context>> {
        self.contexts.get(&root).map(|context| Arc::clone(context.value()))
    }

    /// All the contexts, in no particular order.
    pub fn contexts(&self) -> Vec<Arc<Context>> {
        self.contexts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.contexts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contexts.is_empty()
    }

    /// Returns the context of `root` and whether it has just been created.
    pub(crate) fn get_or_create(&self, root: ClassId) -> (Arc<Context>, bool) {
        if let Some(context) = self.contexts.get(&root) {
            return (Arc::clone(context.value()), false);
        }
        match self.contexts.entry(root) {
            Entry::Occupied(entry) => (Arc::clone(entry.get()), false),
            Entry::Vacant(entry) => {
                let context = Arc::new(Context::new(root));
                entry.insert(Arc::clone(&context));
                lock(&self.not_saturated).push(Arc::clone(&context));
                (context, true)
            }
        }
    }

    /// A writer producing conclusions into this state.
    pub fn writer<'a>(
        &'a self,
        policy: ContextCreationPolicy,
        observer: Option<&'a dyn SaturationObserver>,
    ) -> SaturationStateWriter<'a> {
        SaturationStateWriter {
            state: self,
            policy,
            observer,
            produced: 0,
            created: 0,
        }
    }

    /// Takes the next context with pending conclusions.
    ///
    /// The caller owns the returned context until it deactivates it.
    pub fn poll_for_active_context(&self) -> Option<Arc<Context>> {
        lock(&self.active_contexts).pop_front()
    }

    pub fn has_active_contexts(&self) -> bool {
        !lock(&self.active_contexts).is_empty()
    }

    /// Flags the context of `root` as not saturated.
    ///
    /// Returns `false` if there is no such context or if it was not saturated already.
    pub fn mark_as_not_saturated(&self, root: ClassId) -> bool {
        self.context(root)
            .is_some_and(|context| self.mark_context_as_not_saturated(&context))
    }

    fn mark_context_as_not_saturated(&self, context: &Arc<Context>) -> bool {
        if context.set_saturated(false) {
            lock(&self.not_saturated).push(Arc::clone(context));
            true
        } else {
            false
        }
    }

    /// Clears every context and schedules its initialization again.
    pub fn reset_contexts(&self) {
        for context in self.contexts() {
            self.reset_context(&context);
        }
    }

    pub(crate) fn reset_context(&self, context: &Arc<Context>) {
        let saturated = context.is_saturated();
        context.reset();
        if saturated {
            lock(&self.not_saturated).push(Arc::clone(context));
        }
        self.activate(context);
    }

    /// Whether `context` is still the context of its root.
    pub(crate) fn is_live(&self, context: &Arc<Context>) -> bool {
        self.contexts
            .get(&context.root())
            .is_some_and(|current| Arc::ptr_eq(current.value(), context))
    }

    /// Drops the context of `root` together with its pending conclusions.
    pub(crate) fn remove_context(&self, root: ClassId) -> Option<Arc<Context>> {
        let (_, context) = self.contexts.remove(&root)?;
        context.clear_pending();
        Some(context)
    }

    /// The contexts flagged as not saturated since the last call.
    pub(crate) fn take_not_saturated(&self) -> Vec<Arc<Context>> {
        std::mem::take(&mut *lock(&self.not_saturated))
    }

    /// Puts the context in the active queue unless it is already there or being processed.
    pub(crate) fn activate(&self, context: &Arc<Context>) {
        if context.activate() {
            lock(&self.active_contexts).push_back(Arc::clone(context));
        }
    }

    /// Puts back a context whose processing has been interrupted, its owner gives it up.
    pub(crate) fn requeue(&self, context: Arc<Context>) {
        lock(&self.active_contexts).push_back(context);
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// What a writer does with a conclusion whose root has no context yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContextCreationPolicy {
    /// Creates the context.
    Create,
    /// Drops the conclusion.
    ExistingOnly,
}

/// Inserts produced conclusions into the to-do queues of their contexts and activates them.
pub struct SaturationStateWriter<'a> {
    state: &'a SaturationState,
    policy: ContextCreationPolicy,
    observer: Option<&'a dyn SaturationObserver>,
    produced: u64,
    created: u64,
}

impl SaturationStateWriter<'_> {
    /// Number of conclusions inserted into some to-do queue.
    pub fn produced(&self) -> u64 {
        self.produced
    }

    /// Number of contexts created by this writer.
    pub fn created(&self) -> u64 {
        self.created
    }
}

impl ConclusionProducer for SaturationStateWriter<'_> {
    fn produce(&mut self, root: ClassId, conclusion: Conclusion, _: Inference) {
        let context = match self.policy {
            ContextCreationPolicy::Create => {
                let (context, created) = self.state.get_or_create(root);
                if created {
                    self.created += 1;
                    if let Some(observer) = self.observer {
                        observer.context_created(root);
                    }
                }
                context
            }
            ContextCreationPolicy::ExistingOnly => {
                let Some(context) = self.state.context(root) else {
                    return;
                };
                context
            }
        };
        context.push(conclusion);
        self.produced += 1;
        self.state.mark_context_as_not_saturated(&context);
        self.state.activate(&context);
    }
}
