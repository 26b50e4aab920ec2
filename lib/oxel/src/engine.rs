//! The parallel fixpoint loop.

use crate::cancellation::CancellationToken;
use crate::context::Context;
use crate::error::ReasonerError;
use crate::indexing::ClassId;
use crate::rules::RuleApplicator;
use crate::state::{ContextCreationPolicy, SaturationState, SaturationStateWriter};
use crate::statistics::{SaturationObserver, WorkerStatistics};
use rayon_core::ThreadPoolBuilder;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread;
use std::time::Instant;
use tracing::{debug, trace};

/// Drains the active contexts of a [`SaturationState`] by applying the rules to their
/// conclusions until no context has pending conclusions.
///
/// Any number of workers may run [`process`](Self::process) concurrently on the same engine.
pub struct RuleApplicationEngine<'a> {
    applicator: RuleApplicator<'a>,
    state: &'a SaturationState,
    observer: Option<&'a dyn SaturationObserver>,
    token: &'a CancellationToken,
    /// Workers currently holding or polling for a context
    busy_workers: AtomicUsize,
}

impl<'a> RuleApplicationEngine<'a> {
    pub fn new(
        applicator: RuleApplicator<'a>,
        state: &'a SaturationState,
        token: &'a CancellationToken,
    ) -> Self {
        Self {
            applicator,
            state,
            observer: None,
            token,
            busy_workers: AtomicUsize::new(0),
        }
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Option<&'a dyn SaturationObserver>) -> Self {
        self.observer = observer;
        self
    }

    /// Makes sure the context of `root` exists and is scheduled if it has pending conclusions.
    pub fn submit(&self, root: ClassId) {
        let (context, created) = self.state.get_or_create(root);
        if created {
            if let Some(observer) = self.observer {
                observer.context_created(root);
            }
        }
        if context.has_pending() {
            self.state.activate(&context);
        }
    }

    /// The worker loop: processes active contexts until every worker runs out of them.
    ///
    /// Returns [`ReasonerError::Interrupted`] if the cancellation token is triggered. The
    /// context being processed is put back into the active queue with its remaining
    /// conclusions so that a later call resumes the saturation.
    pub fn process(&self) -> Result<WorkerStatistics, ReasonerError> {
        let mut writer = self.state.writer(ContextCreationPolicy::Create, self.observer);
        let mut statistics = WorkerStatistics::default();
        let result = self.process_loop(&mut writer, &mut statistics);
        statistics.conclusions_produced = writer.produced();
        statistics.contexts_created = writer.created();
        if let Some(observer) = self.observer {
            observer.worker_finished(&statistics);
        }
        result.map(|()| statistics)
    }

    fn process_loop(
        &self,
        writer: &mut SaturationStateWriter<'_>,
        statistics: &mut WorkerStatistics,
    ) -> Result<(), ReasonerError> {
        loop {
            if self.token.is_cancelled() {
                return Err(ReasonerError::Interrupted);
            }
            self.busy_workers.fetch_add(1, Ordering::SeqCst);
            let Some(context) = self.state.poll_for_active_context() else {
                self.busy_workers.fetch_sub(1, Ordering::SeqCst);
                if self.busy_workers.load(Ordering::SeqCst) == 0
                    && !self.state.has_active_contexts()
                {
                    return Ok(());
                }
                thread::yield_now();
                continue;
            };
            if !self.state.is_live(&context) {
                // Dropped by the incremental maintenance while queued
                context.deactivate();
                self.busy_workers.fetch_sub(1, Ordering::SeqCst);
                continue;
            }
            let result = self.process_context(context, writer, statistics);
            self.busy_workers.fetch_sub(1, Ordering::SeqCst);
            result?;
        }
    }

    fn process_context(
        &self,
        context: Arc<Context>,
        writer: &mut SaturationStateWriter<'_>,
        statistics: &mut WorkerStatistics,
    ) -> Result<(), ReasonerError> {
        statistics.contexts_processed += 1;
        let root = context.root();
        loop {
            if self.token.is_cancelled() {
                self.state.requeue(context);
                return Err(ReasonerError::Interrupted);
            }
            let Some(conclusion) = context.poll() else {
                context.deactivate();
                // A producer may have pushed between the poll and the deactivation
                if context.has_pending() && context.activate() {
                    continue;
                }
                return Ok(());
            };
            statistics.conclusions_processed += 1;
            trace!(root = root.raw(), ?conclusion, "processing conclusion");
            if self
                .applicator
                .process(root, conclusion, &mut context.premises(), writer)
            {
                statistics.conclusions_stored += 1;
            }
        }
    }

    /// Runs the workers until the fixpoint is reached.
    ///
    /// One worker runs on the calling thread, more are run in a dedicated thread pool.
    /// Contexts left without pending conclusions are then flagged as saturated.
    pub fn saturate(&self, workers: usize) -> Result<WorkerStatistics, ReasonerError> {
        let start = Instant::now();
        let statistics = if workers <= 1 {
            self.process()?
        } else {
            let results = Mutex::new(Vec::with_capacity(workers));
            ThreadPoolBuilder::new()
                .num_threads(workers)
                .thread_name(|i| format!("oxel saturation worker {i}"))
                .build()?
                .scope(|s| {
                    for _ in 0..workers {
                        s.spawn(|_| {
                            let result = self.process();
                            results
                                .lock()
                                .unwrap_or_else(PoisonError::into_inner)
                                .push(result);
                        });
                    }
                });
            let mut statistics = WorkerStatistics::default();
            for result in results.into_inner().unwrap_or_else(PoisonError::into_inner) {
                statistics += result?;
            }
            statistics
        };
        for context in self.state.take_not_saturated() {
            if !self.state.is_live(&context) {
                // Removed from the index after an interrupted pass
                continue;
            }
            if context.has_pending() {
                return Err(ReasonerError::invariant(format!(
                    "the context of {} still has pending conclusions after saturation",
                    context.root().raw()
                )));
            }
            context.set_saturated(true);
        }
        let elapsed = start.elapsed();
        if let Some(observer) = self.observer {
            observer.saturation_finished(&statistics, elapsed);
        }
        debug!(
            workers,
            contexts = self.state.len(),
            contexts_created = statistics.contexts_created,
            conclusions_produced = statistics.conclusions_produced,
            conclusions_processed = statistics.conclusions_processed,
            elapsed_ms = elapsed.as_millis(),
            "saturation finished"
        );
        Ok(statistics)
    }
}
