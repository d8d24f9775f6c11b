//! Composite writes: an aggregate root plus its dependent children
//!
//! The backend only exposes per-resource actions, so a composite write is a
//! saga: write the aggregate, then add and delete children concurrently, and
//! delete the aggregate again when a child step fails.
//!
//! A failure after the aggregate was written is reported as
//! [`HalError::AggregateOrphan`] carrying a [`SagaError`]: the original
//! child-step error untouched, plus what happened to the compensation.

pub mod diff;
pub mod orchestrator;
pub mod state;

pub use diff::{ChildDiff, diff_children};
pub use orchestrator::{AggregateActions, ChildPlan, CompositeOrchestrator, CompositeOutcome};
pub use state::{SagaMachine, SagaState};

use crate::core::error::HalError;
use std::fmt;
use uuid::Uuid;

/// Outcome of the compensating aggregate delete
#[derive(Debug, Clone)]
pub enum Compensation {
    Succeeded,

    /// The aggregate is left orphaned on the server
    Failed(HalError),
}

impl Compensation {
    pub fn succeeded(&self) -> bool {
        matches!(self, Compensation::Succeeded)
    }
}

impl fmt::Display for Compensation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compensation::Succeeded => f.write_str("succeeded"),
            Compensation::Failed(err) => write!(f, "failed: {}", err),
        }
    }
}

/// A composite write failed after its aggregate was written
#[derive(Debug, Clone, thiserror::Error)]
#[error("{cause} (aggregate '{aggregate_href}', compensation {compensation})")]
pub struct SagaError {
    saga_id: Uuid,
    #[source]
    cause: HalError,
    aggregate_href: String,
    compensation: Compensation,
    trail: Vec<SagaState>,
}

impl SagaError {
    pub(crate) fn new(
        saga: &SagaMachine,
        cause: HalError,
        aggregate_href: impl Into<String>,
        compensation: Compensation,
    ) -> Self {
        Self {
            saga_id: saga.id(),
            cause,
            aggregate_href: aggregate_href.into(),
            compensation,
            trail: saga.trail().to_vec(),
        }
    }

    /// The child-step error that failed the saga, as raised
    pub fn cause(&self) -> &HalError {
        &self.cause
    }

    pub fn into_cause(self) -> HalError {
        self.cause
    }

    pub fn saga_id(&self) -> Uuid {
        self.saga_id
    }

    pub fn aggregate_href(&self) -> &str {
        &self.aggregate_href
    }

    pub fn compensation(&self) -> &Compensation {
        &self.compensation
    }

    /// States the saga went through, last one included
    pub fn trail(&self) -> &[SagaState] {
        &self.trail
    }
}
