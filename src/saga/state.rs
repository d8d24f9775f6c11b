//! Saga state machine
//!
//! ```text
//!   Creating ──┐
//!              ├──▶ ChildrenPending ──▶ Committed
//!   Updating ──┘          │
//!       │                 ▼
//!       │         CompensatingDelete ──▶ Failed
//!       └──────────────────────────────▶ Failed
//! ```
//!
//! A failure of the aggregate write itself goes straight to `Failed`: there
//! is nothing to compensate.

use serde::Serialize;
use std::fmt;
use uuid::Uuid;

/// Step of a composite write
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SagaState {
    /// Aggregate create action in flight
    Creating,

    /// Aggregate update action in flight
    Updating,

    /// Child additions and deletions in flight
    ChildrenPending,

    Committed,

    /// A child step failed, the aggregate delete action is in flight
    CompensatingDelete,

    Failed,
}

impl SagaState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaState::Committed | SagaState::Failed)
    }

    pub fn can_transition_to(&self, next: SagaState) -> bool {
        use SagaState::*;
        matches!(
            (self, next),
            (Creating | Updating, ChildrenPending)
                | (Creating | Updating, Failed)
                | (ChildrenPending, Committed)
                | (ChildrenPending, CompensatingDelete)
                | (CompensatingDelete, Failed)
        )
    }
}

impl fmt::Display for SagaState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SagaState::Creating => "creating",
            SagaState::Updating => "updating",
            SagaState::ChildrenPending => "children_pending",
            SagaState::Committed => "committed",
            SagaState::CompensatingDelete => "compensating_delete",
            SagaState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// One saga run: its current state and every state it went through
#[derive(Debug, Clone)]
pub struct SagaMachine {
    id: Uuid,
    state: SagaState,
    trail: Vec<SagaState>,
}

impl SagaMachine {
    pub fn creating() -> Self {
        Self::start(SagaState::Creating)
    }

    pub fn updating() -> Self {
        Self::start(SagaState::Updating)
    }

    fn start(initial: SagaState) -> Self {
        Self {
            id: Uuid::new_v4(),
            state: initial,
            trail: vec![initial],
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SagaState {
        self.state
    }

    pub fn trail(&self) -> &[SagaState] {
        &self.trail
    }

    /// Move to `next`
    ///
    /// Returns false and stays put when the transition is not allowed.
    pub fn advance(&mut self, next: SagaState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::error!(saga_id = %self.id, from = %self.state, to = %next, "Invalid saga transition");
            return false;
        }
        tracing::debug!(saga_id = %self.id, from = %self.state, to = %next, "Saga transition");
        self.state = next;
        self.trail.push(next);
        true
    }
}
