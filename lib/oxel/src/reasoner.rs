//! The reasoner facade: axiom loading, classification and queries.

use crate::cancellation::CancellationToken;
use crate::conclusion::{Conclusion, Inference};
use crate::context::Context;
use crate::engine::RuleApplicationEngine;
use crate::error::ReasonerError;
use crate::incremental::IncrementalMaintenance;
use crate::indexing::{ClassId, IndexedClassExpression, OntologyIndex};
use crate::model::{Axiom, Individual, OwlClass};
use crate::properties::PropertyHierarchy;
use crate::rules::{RuleApplicationMode, RuleApplicator};
use crate::state::SaturationState;
use crate::statistics::{SaturationObserver, SaturationStatistics, WorkerStatistics};
use crate::trace::TraceState;
use crate::validation::validate;
use rustc_hash::{FxHashMap, FxHashSet};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::thread::available_parallelism;
use std::time::Duration;
use tracing::{debug, warn};

/// Configuration of the [`Reasoner`].
///
/// ```
/// use oxel::{ReasonerConfig, RuleApplicationMode};
///
/// let config = ReasonerConfig::default()
///     .with_workers(2)
///     .with_rule_application(RuleApplicationMode::All);
/// assert_eq!(config.workers, 2);
/// ```
#[derive(Clone)]
pub struct ReasonerConfig {
    /// Number of saturation workers, 1 runs the saturation on the calling thread.
    pub workers: usize,
    pub rule_application: RuleApplicationMode,
    /// Receives the progress events of the saturation.
    pub observer: Option<Arc<dyn SaturationObserver>>,
}

impl Default for ReasonerConfig {
    fn default() -> Self {
        Self {
            workers: available_parallelism().map_or(1, NonZeroUsize::get),
            rule_application: RuleApplicationMode::default(),
            observer: None,
        }
    }
}

impl ReasonerConfig {
    /// Sets the number of workers, at least one is used.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers.max(1);
        self
    }

    /// Runs the saturation on the calling thread only.
    #[must_use]
    pub fn sequential(self) -> Self {
        self.with_workers(1)
    }

    #[must_use]
    pub fn with_rule_application(mut self, mode: RuleApplicationMode) -> Self {
        self.rule_application = mode;
        self
    }

    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn SaturationObserver>) -> Self {
        self.observer = Some(observer);
        self
    }
}

impl fmt::Debug for ReasonerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReasonerConfig")
            .field("workers", &self.workers)
            .field("rule_application", &self.rule_application)
            .field("observer", &self.observer.is_some())
            .finish()
    }
}

/// An EL reasoner.
///
/// Axioms are indexed as soon as they are added or removed. The saturation is updated
/// incrementally by [`classify`](Self::classify), which the queries call when needed.
///
/// ```
/// use oxel::{Axiom, OwlClass, Reasoner};
/// use oxrdf::NamedNode;
///
/// let a = OwlClass::new(NamedNode::new("http://example.com/A")?);
/// let b = OwlClass::new(NamedNode::new("http://example.com/B")?);
/// let c = OwlClass::new(NamedNode::new("http://example.com/C")?);
///
/// let mut reasoner = Reasoner::new();
/// reasoner.add_axiom(Axiom::sub_class_of(a.clone().into(), b.clone().into()))?;
/// reasoner.add_axiom(Axiom::sub_class_of(b.clone().into(), c.clone().into()))?;
/// assert!(reasoner.super_classes(&a, false)?.contains(&c));
/// assert_eq!(reasoner.super_classes(&a, true)?, [b]);
/// # Result::<_, Box<dyn std::error::Error>>::Ok(())
/// ```
pub struct Reasoner {
    config: ReasonerConfig,
    index: OntologyIndex,
    properties: PropertyHierarchy,
    properties_version: Option<u64>,
    state: SaturationState,
    trace: TraceState,
    /// Multiset of the loaded axioms
    axioms: FxHashMap<Axiom, usize>,
    skipped: usize,
    classified: bool,
    consistent: bool,
    statistics: SaturationStatistics,
    token: CancellationToken,
}

impl Default for Reasoner {
    fn default() -> Self {
        Self::new()
    }
}

impl Reasoner {
    pub fn new() -> Self {
        Self::with_config(ReasonerConfig::default())
    }

    pub fn with_config(config: ReasonerConfig) -> Self {
        Self {
            config,
            index: OntologyIndex::new(),
            properties: PropertyHierarchy::default(),
            properties_version: None,
            state: SaturationState::new(),
            trace: TraceState::new(),
            axioms: FxHashMap::default(),
            skipped: 0,
            classified: false,
            consistent: true,
            statistics: SaturationStatistics::new(),
            token: CancellationToken::new(),
        }
    }

    /// Uses an existing token to interrupt the saturation.
    #[must_use]
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.token = token;
        self
    }

    /// Loads an axiom.
    ///
    /// Axioms outside of the supported fragment are rejected with
    /// [`ReasonerError::Unsupported`] and the reasoning becomes incomplete, see
    /// [`is_complete`](Self::is_complete).
    pub fn add_axiom(&mut self, axiom: Axiom) -> Result<(), ReasonerError> {
        match self.index.index_axiom(&axiom) {
            Ok(()) => {
                *self.axioms.entry(axiom).or_default() += 1;
                self.classified = false;
                Ok(())
            }
            Err(ReasonerError::Unsupported(error)) => {
                warn!(
                    axiom = axiom.type_name(),
                    %error,
                    "Axiom skipped, the reasoning is incomplete"
                );
                self.skipped += 1;
                Err(error.into())
            }
            Err(error) => Err(error),
        }
    }

    /// Loads axioms, skipping the unsupported ones.
    ///
    /// Returns the number of loaded axioms.
    pub fn add_axioms(
        &mut self,
        axioms: impl IntoIterator<Item = Axiom>,
    ) -> Result<usize, ReasonerError> {
        let mut loaded = 0;
        for axiom in axioms {
            match self.add_axiom(axiom) {
                Ok(()) => loaded += 1,
                Err(ReasonerError::Unsupported(_)) => (),
                Err(error) => return Err(error),
            }
        }
        Ok(loaded)
    }

    /// Unloads one occurrence of an axiom.
    ///
    /// Returns `false` if the axiom is not loaded.
    pub fn remove_axiom(&mut self, axiom: &Axiom) -> Result<bool, ReasonerError> {
        let Some(count) = self.axioms.get_mut(axiom) else {
            return Ok(false);
        };
        self.index.unindex_axiom(axiom)?;
        *count -= 1;
        if *count == 0 {
            self.axioms.remove(axiom);
        }
        self.classified = false;
        Ok(true)
    }

    /// Number of distinct loaded axioms.
    pub fn axiom_count(&self) -> usize {
        self.axioms.len()
    }

    /// Whether no axiom has been skipped because it is unsupported.
    pub fn is_complete(&self) -> bool {
        self.skipped == 0
    }

    /// Brings the saturation up to date with the loaded axioms.
    ///
    /// Fails with [`ReasonerError::Interrupted`] if the cancellation token is triggered, the
    /// next call resumes the work once the token has been [reset](CancellationToken::reset).
    pub fn classify(&mut self) -> Result<(), ReasonerError> {
        if self.classified {
            return Ok(());
        }
        if self.properties_version != Some(self.index.version()) {
            self.properties = PropertyHierarchy::new(self.index.cache());
            self.properties_version = Some(self.index.version());
        }
        let changes = self.index.take_changes();
        let observers = Observers {
            statistics: &self.statistics,
            user: self.config.observer.as_deref(),
        };
        let observer: &dyn SaturationObserver = &observers;
        let applicator = RuleApplicator::new(
            &self.index,
            &self.properties,
            self.config.rule_application,
        );
        if !changes.is_empty() {
            self.trace.clear();
            if let Err(error) = IncrementalMaintenance::new(applicator, &self.state, Some(observer))
                .apply(&changes, self.config.workers)
            {
                self.state.reset_contexts();
                return Err(error);
            }
        }
        let engine = RuleApplicationEngine::new(applicator, &self.state, &self.token)
            .with_observer(Some(observer));
        engine.submit(ClassId::THING);
        for (id, _) in self.index.named_classes() {
            engine.submit(id);
        }
        for (id, _) in self.index.individuals() {
            engine.submit(id);
        }
        engine.saturate(self.config.workers)?;
        self.consistent = self.compute_consistency();
        debug!(
            consistent = self.consistent,
            axioms = self.axioms.len(),
            contexts = self.state.len(),
            "classification finished"
        );
        self.classified = true;
        Ok(())
    }

    /// Whether owl:Thing and every individual are satisfiable.
    pub fn is_consistent(&mut self) -> Result<bool, ReasonerError> {
        self.classify()?;
        Ok(self.consistent)
    }

    fn compute_consistency(&self) -> bool {
        !self.has_contradiction(ClassId::THING)
            && !self
                .index
                .individuals()
                .any(|(id, _)| self.has_contradiction(id))
    }

    pub fn is_satisfiable(&mut self, class: &OwlClass) -> Result<bool, ReasonerError> {
        self.classify()?;
        Ok(match self.index.class_id(class) {
            Some(id) => !self.is_unsatisfiable(id),
            None => self.consistent,
        })
    }

    /// The named super classes of a class, owl:Thing included, its equivalent classes excluded.
    ///
    /// With `direct` only the most specific ones are returned.
    pub fn super_classes(
        &mut self,
        class: &OwlClass,
        direct: bool,
    ) -> Result<Vec<OwlClass>, ReasonerError> {
        self.classify()?;
        let Some(id) = self.index.class_id(class) else {
            return Ok(vec![OwlClass::thing()]);
        };
        let supers = self.named_supers(id);
        let strict = supers
            .iter()
            .copied()
            .filter(|s| !self.named_supers(*s).contains(&id))
            .collect::<Vec<_>>();
        Ok(self.to_classes(if direct {
            self.minimal(&strict)
        } else {
            strict
        }))
    }

    /// The named classes equivalent to a class, itself included.
    pub fn equivalent_classes(
        &mut self,
        class: &OwlClass,
    ) -> Result<Vec<OwlClass>, ReasonerError> {
        self.classify()?;
        let Some(id) = self.index.class_id(class) else {
            return Ok(vec![class.clone()]);
        };
        let equivalents: Vec<_> = self
            .named_supers(id)
            .into_iter()
            .filter(|s| self.named_supers(*s).contains(&id))
            .collect();
        Ok(self.to_classes(equivalents))
    }

    /// The named classes an individual is an instance of.
    pub fn types(
        &mut self,
        individual: &Individual,
        direct: bool,
    ) -> Result<Vec<OwlClass>, ReasonerError> {
        self.classify()?;
        let Some(id) = self.index.individual_id(individual) else {
            return Ok(vec![OwlClass::thing()]);
        };
        let types = self.named_supers(id).into_iter().collect::<Vec<_>>();
        Ok(self.to_classes(if direct {
            self.minimal(&types)
        } else {
            types
        }))
    }

    /// All the subsumers derived for a class expression, sorted.
    pub fn subsumers(&mut self, id: ClassId) -> Result<Vec<ClassId>, ReasonerError> {
        self.classify()?;
        Ok(self
            .state
            .context(id)
            .map(|context| context.subsumers())
            .unwrap_or_default())
    }

    /// The context of a class expression after classification.
    pub fn context_state(&mut self, id: ClassId) -> Result<Option<Arc<Context>>, ReasonerError> {
        self.classify()?;
        Ok(self.state.context(id))
    }

    /// Every inference that produced `conclusion` in the context of `root`.
    pub fn inferences(
        &mut self,
        root: ClassId,
        conclusion: &Conclusion,
    ) -> Result<Vec<Inference>, ReasonerError> {
        self.classify()?;
        let applicator = RuleApplicator::new(
            &self.index,
            &self.properties,
            self.config.rule_application,
        );
        Ok(self
            .trace
            .inferences(&applicator, &self.state, root, conclusion))
    }

    /// Checks that the saturation only refers to class expressions and property chains
    /// that are still indexed.
    ///
    /// Fails with [`ReasonerError::InvariantViolation`] otherwise.
    pub fn validate_saturation_graph(&mut self) -> Result<(), ReasonerError> {
        self.classify()?;
        validate(&self.index, &self.state)
    }

    pub fn statistics(&self) -> &SaturationStatistics {
        &self.statistics
    }

    /// The token interrupting [`classify`](Self::classify) when cancelled.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn index(&self) -> &OntologyIndex {
        &self.index
    }

    pub fn saturation_state(&self) -> &SaturationState {
        &self.state
    }

    pub fn config(&self) -> &ReasonerConfig {
        &self.config
    }

    fn has_contradiction(&self, id: ClassId) -> bool {
        self.state
            .context(id)
            .is_some_and(|context| context.has_contradiction())
    }

    fn is_unsatisfiable(&self, id: ClassId) -> bool {
        !self.consistent || id == ClassId::NOTHING || self.has_contradiction(id)
    }

    /// Named subsumers, every named class if `id` is unsatisfiable.
    fn named_supers(&self, id: ClassId) -> FxHashSet<ClassId> {
        if self.is_unsatisfiable(id) {
            return self.index.named_classes().map(|(id, _)| id).collect();
        }
        let mut supers = FxHashSet::default();
        supers.insert(id);
        supers.insert(ClassId::THING);
        if let Some(context) = self.state.context(id) {
            supers.extend(context.premises().subsumers().filter(|s| {
                matches!(
                    self.index.class_expression(*s),
                    Some(IndexedClassExpression::Class(_))
                )
            }));
        }
        if matches!(
            self.index.class_expression(id),
            Some(IndexedClassExpression::Individual(_))
        ) {
            supers.remove(&id);
        }
        supers
    }

    /// The classes of `candidates` without a strict sub class in `candidates`.
    fn minimal(&self, candidates: &[ClassId]) -> Vec<ClassId> {
        let supers = candidates
            .iter()
            .map(|c| (*c, self.named_supers(*c)))
            .collect::<FxHashMap<_, _>>();
        candidates
            .iter()
            .copied()
            .filter(|candidate| {
                !candidates.iter().any(|other| {
                    other != candidate
                        && supers[other].contains(candidate)
                        && !supers[candidate].contains(other)
                })
            })
            .collect()
    }

    fn to_classes(&self, ids: impl IntoIterator<Item = ClassId>) -> Vec<OwlClass> {
        let mut classes = ids
            .into_iter()
            .filter_map(|id| match self.index.class_expression(id) {
                Some(IndexedClassExpression::Class(class)) => Some(class.clone()),
                _ => None,
            })
            .collect::<Vec<_>>();
        classes.sort_unstable();
        classes
    }
}

impl fmt::Debug for Reasoner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Reasoner")
            .field("config", &self.config)
            .field("axioms", &self.axioms.len())
            .field("contexts", &self.state.len())
            .field("classified", &self.classified)
            .finish_non_exhaustive()
    }
}

/// Forwards the events to the reasoner statistics and to the configured observer.
struct Observers<'a> {
    statistics: &'a SaturationStatistics,
    user: Option<&'a dyn SaturationObserver>,
}

impl SaturationObserver for Observers<'_> {
    fn context_created(&self, root: ClassId) {
        self.statistics.context_created(root);
        if let Some(user) = self.user {
            user.context_created(root);
        }
    }

    fn worker_finished(&self, statistics: &WorkerStatistics) {
        self.statistics.worker_finished(statistics);
        if let Some(user) = self.user {
            user.worker_finished(statistics);
        }
    }

    fn saturation_finished(&self, statistics: &WorkerStatistics, elapsed: Duration) {
        self.statistics.saturation_finished(statistics, elapsed);
        if let Some(user) = self.user {
            user.saturation_finished(statistics, elapsed);
        }
    }
}
