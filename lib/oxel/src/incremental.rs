//! Incremental maintenance of the saturation after index changes.
//!
//! Removals invalidate the contexts that may have used a removed rule or class, together with
//! every context that received conclusions from them through links. These contexts are
//! cleared. Additions are replayed on the premises of the remaining contexts. A subsequent
//! saturation pass then reaches the same fixpoint as a saturation from scratch.

use crate::context::Context;
use crate::error::ReasonerError;
use crate::indexing::{ClassId, IndexChanges};
use crate::rules::RuleApplicator;
use crate::state::{ContextCreationPolicy, SaturationState};
use crate::statistics::SaturationObserver;
use rayon_core::ThreadPoolBuilder;
use rustc_hash::FxHashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

pub(crate) struct IncrementalMaintenance<'a> {
    applicator: RuleApplicator<'a>,
    state: &'a SaturationState,
    observer: Option<&'a dyn SaturationObserver>,
}

/// What an incremental pass did.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MaintenanceOutcome {
    pub reset: usize,
    pub removed: usize,
    pub replayed: u64,
}

impl<'a> IncrementalMaintenance<'a> {
    pub fn new(
        applicator: RuleApplicator<'a>,
        state: &'a SaturationState,
        observer: Option<&'a dyn SaturationObserver>,
    ) -> Self {
        Self {
            applicator,
            state,
            observer,
        }
    }

    pub fn apply(
        &self,
        changes: &IndexChanges,
        workers: usize,
    ) -> Result<MaintenanceOutcome, ReasonerError> {
        let mut outcome = MaintenanceOutcome::default();
        if changes.is_empty() || self.state.is_empty() {
            return Ok(outcome);
        }
        let removed = changes
            .removed_classes
            .iter()
            .filter_map(|root| self.state.remove_context(*root))
            .collect::<Vec<_>>();
        outcome.removed = removed.len();
        // Every derived link may depend on the property hierarchy and the pending conclusions
        // of an interrupted saturation may rely on removed rules
        if changes.requires_reset() || (changes.has_removals() && self.state.has_active_contexts())
        {
            self.state.reset_contexts();
            outcome.reset = self.state.len();
            debug!(contexts = outcome.reset, "all contexts reset");
            return Ok(outcome);
        }
        if changes.has_removals() {
            outcome.reset = self.invalidate(changes, removed);
        }
        if !changes.added_rules.is_empty() || !changes.added_init_rules.is_empty() {
            outcome.replayed = self.replay_additions(changes, workers)?;
        }
        debug!(
            reset = outcome.reset,
            removed = outcome.removed,
            replayed = outcome.replayed,
            "incremental changes applied"
        );
        Ok(outcome)
    }

    /// Clears the contexts affected by removals, returns how many have been cleared.
    fn invalidate(&self, changes: &IndexChanges, removed: Vec<Arc<Context>>) -> usize {
        let keys = changes
            .removed_rules
            .keys()
            .chain(&changes.removed_classes)
            .copied()
            .collect::<FxHashSet<_>>();

        let mut dirty_roots = changes.removed_classes.clone();
        let mut to_do = removed;
        let contexts = self.state.contexts();
        for context in &contexts {
            if meets(&context.premises().subsumers, &keys) && dirty_roots.insert(context.root()) {
                to_do.push(Arc::clone(context));
            }
        }
        // Conclusions flow backward along links
        let mut dirty = Vec::new();
        while let Some(context) = to_do.pop() {
            for (_, source) in context.premises().backward_links() {
                if dirty_roots.insert(source) {
                    if let Some(source) = self.state.context(source) {
                        to_do.push(source);
                    }
                }
            }
            if !changes.removed_classes.contains(&context.root()) {
                dirty.push(context);
            }
        }

        for context in &dirty {
            self.state.reset_context(context);
        }
        for context in contexts {
            if !dirty_roots.contains(&context.root()) {
                context
                    .premises()
                    .remove_backward_links(|source| dirty_roots.contains(&source));
            }
        }
        dirty.len()
    }

    /// Applies the added rules to the stored premises.
    ///
    /// Returns the number of produced conclusions.
    fn replay_additions(
        &self,
        changes: &IndexChanges,
        workers: usize,
    ) -> Result<u64, ReasonerError> {
        let contexts = self.state.contexts();
        if workers <= 1 || contexts.len() < workers {
            return Ok(self.replay_on(&contexts, changes));
        }
        let chunk_size = contexts.len().div_ceil(workers);
        let produced = AtomicU64::new(0);
        ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("oxel incremental worker {i}"))
            .build()?
            .scope(|s| {
                for chunk in contexts.chunks(chunk_size) {
                    let produced = &produced;
                    s.spawn(move |_| {
                        produced.fetch_add(self.replay_on(chunk, changes), Ordering::Relaxed);
                    });
                }
            });
        Ok(produced.into_inner())
    }

    fn replay_on(&self, contexts: &[Arc<Context>], changes: &IndexChanges) -> u64 {
        let mut writer = self
            .state
            .writer(ContextCreationPolicy::Create, self.observer);
        for context in contexts {
            let root = context.root();
            let premises = context.premises();
            if !premises.is_initialized() {
                continue;
            }
            for rule in &changes.added_init_rules {
                self.applicator.apply_init_rule(root, *rule, &mut writer);
            }
            let added = &changes.added_rules;
            if premises.subsumers.len() > added.len() << 2 {
                for (key, rules) in added {
                    if premises.subsumers.contains(key) {
                        for rule in rules {
                            self.applicator
                                .apply_subsumer_rule(root, *key, *rule, &premises, &mut writer);
                        }
                    }
                }
            } else {
                for key in &premises.subsumers {
                    for rule in added.get(key).into_iter().flatten() {
                        self.applicator
                            .apply_subsumer_rule(root, *key, *rule, &premises, &mut writer);
                    }
                }
            }
        }
        writer.produced()
    }
}

/// Whether the two sets intersect, iterating over `changes` only when it is much smaller.
fn meets(subsumers: &FxHashSet<ClassId>, changes: &FxHashSet<ClassId>) -> bool {
    if subsumers.len() > changes.len() << 2 {
        changes.iter().any(|key| subsumers.contains(key))
    } else {
        subsumers.iter().any(|subsumer| changes.contains(subsumer))
    }
}
