use std::fmt;

/// An error raised by the reasoner.
///
/// An inconsistent ontology is not an error: it is a regular outcome of the saturation,
/// see [`Reasoner::is_consistent`](crate::Reasoner::is_consistent).
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum ReasonerError {
    /// The saturation has been cancelled through its [`CancellationToken`](crate::CancellationToken).
    ///
    /// The state is left resumable: the next saturation continues where this one stopped.
    #[error("The saturation has been interrupted")]
    Interrupted,
    /// The axiom uses a construct outside of the supported EL fragment.
    #[error(transparent)]
    Unsupported(#[from] UnsupportedConstructError),
    /// An internal invariant does not hold anymore.
    ///
    /// The results of the current reasoning attempt can't be trusted.
    #[error("Internal invariant violation: {0}")]
    InvariantViolation(String),
    /// The worker pool could not be started.
    #[error(transparent)]
    ThreadPool(#[from] rayon_core::ThreadPoolBuildError),
}

impl ReasonerError {
    pub(crate) fn invariant(message: impl Into<String>) -> Self {
        Self::InvariantViolation(message.into())
    }
}

/// A construct that can't be indexed because it falls outside of the EL fragment.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{construct} is not supported {position}")]
pub struct UnsupportedConstructError {
    construct: &'static str,
    position: Position,
}

impl UnsupportedConstructError {
    pub(crate) fn new(construct: &'static str, position: Position) -> Self {
        Self {
            construct,
            position,
        }
    }

    /// The name of the unsupported OWL construct, e.g. `ObjectAllValuesFrom`.
    #[inline]
    pub fn construct(&self) -> &'static str {
        self.construct
    }
}

/// Where an unsupported construct has been found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Position {
    Positive,
    Negative,
    Anywhere,
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Positive => f.write_str("as a super class"),
            Self::Negative => f.write_str("as a sub class"),
            Self::Anywhere => f.write_str("by the EL saturation"),
        }
    }
}
