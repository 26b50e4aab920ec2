#![doc = include_str!("../README.md")]
#![doc(test(attr(deny(warnings))))]
#![cfg_attr(docsrs, feature(doc_auto_cfg))]
#![doc(html_favicon_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]
#![doc(html_logo_url = "https://raw.githubusercontent.com/oxigraph/oxigraph/main/logo.svg")]

mod cancellation;
mod conclusion;
mod context;
mod engine;
mod error;
mod incremental;
mod indexing;
mod model;
mod properties;
mod reasoner;
mod rules;
mod state;
mod statistics;
mod trace;
mod validation;

pub use crate::cancellation::CancellationToken;
pub use crate::conclusion::{Conclusion, Inference};
pub use crate::context::{Context, ContextPremises};
pub use crate::engine::RuleApplicationEngine;
pub use crate::error::{ReasonerError, UnsupportedConstructError};
pub use crate::indexing::{
    BackwardLinkRule, ChainId, ClassId, ContextInitRule, DisjointnessId, IndexChanges,
    IndexSnapshot, IndexedClassExpression, IndexedObjectCache, IndexedPropertyChain, Occurrences,
    OntologyIndex, RuleChain, SubsumerRule,
};
pub use crate::model::{
    Axiom, ClassExpression, DataProperty, Individual, ObjectProperty, ObjectPropertyExpression,
    OwlClass,
};
pub use crate::properties::PropertyHierarchy;
pub use crate::reasoner::{Reasoner, ReasonerConfig};
pub use crate::rules::{ConclusionProducer, RuleApplicationMode, RuleApplicator};
pub use crate::state::{ContextCreationPolicy, SaturationState, SaturationStateWriter};
pub use crate::statistics::{SaturationObserver, SaturationStatistics, WorkerStatistics};
pub use crate::trace::TraceState;
