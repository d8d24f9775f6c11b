//! Composite create and update
//!
//! Each run is traced under a `saga` span carrying its `saga_id`.

use super::state::{SagaMachine, SagaState};
use super::{Compensation, SagaError};
use crate::client::HalClient;
use crate::core::error::{HalError, ProtocolError};
use crate::core::resource::Resource;
use futures::future::try_join_all;
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use tracing::Instrument;
use uuid::Uuid;

/// Action names of an aggregate root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregateActions {
    /// Declared on the collection resource
    pub create: String,
    pub update: String,
    pub delete: String,
}

impl AggregateActions {
    pub fn new(create: impl Into<String>, update: impl Into<String>, delete: impl Into<String>) -> Self {
        Self {
            create: create.into(),
            update: update.into(),
            delete: delete.into(),
        }
    }
}

/// Children of one kind to add to and delete from an aggregate
#[derive(Debug, Clone, PartialEq)]
pub struct ChildPlan {
    pub kind: String,

    /// Declared on the aggregate
    pub add_action: String,

    /// Declared on each child
    pub delete_action: String,

    pub to_add: Vec<Value>,
    pub to_delete: Vec<Resource>,
}

impl ChildPlan {
    pub fn new(kind: impl Into<String>, add_action: impl Into<String>, delete_action: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            add_action: add_action.into(),
            delete_action: delete_action.into(),
            to_add: Vec::new(),
            to_delete: Vec::new(),
        }
    }

    /// Payloads of the children to add
    pub fn with_additions<P: Serialize>(mut self, payloads: impl IntoIterator<Item = P>) -> Result<Self, HalError> {
        for payload in payloads {
            let value = serde_json::to_value(payload)
                .map_err(|e| HalError::decode(format!("{} payload", self.kind), e))?;
            self.to_add.push(value);
        }
        Ok(self)
    }

    /// Existing children to delete
    pub fn with_deletions<U: Serialize>(mut self, children: &[Resource<U>]) -> Result<Self, HalError> {
        for child in children {
            self.to_delete.push(child.to_untyped()?);
        }
        Ok(self)
    }

    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_delete.is_empty()
    }
}

/// Result of a committed composite write
#[derive(Debug, Clone)]
pub struct CompositeOutcome {
    pub saga_id: Uuid,

    /// The aggregate as returned by its create or update action
    pub aggregate: Resource,

    /// Created children per kind, in plan order
    pub added: IndexMap<String, Vec<Resource>>,

    /// Deleted children per kind
    pub deleted: IndexMap<String, Vec<Resource>>,
}

impl CompositeOutcome {
    pub fn added(&self, kind: &str) -> &[Resource] {
        self.added.get(kind).map(Vec::as_slice).unwrap_or_default()
    }

    pub fn deleted(&self, kind: &str) -> &[Resource] {
        self.deleted.get(kind).map(Vec::as_slice).unwrap_or_default()
    }
}

struct ChildOutcome {
    kind: String,
    added: Vec<Resource>,
    deleted: Vec<Resource>,
}

/// Runs composite writes over a [`HalClient`]
#[derive(Clone)]
pub struct CompositeOrchestrator {
    client: HalClient,
}

impl CompositeOrchestrator {
    pub fn new(client: HalClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &HalClient {
        &self.client
    }

    /// Create an aggregate on `collection`, then its children
    ///
    /// Fails with the create error as is when the aggregate itself is not
    /// created. Once it is, any child failure deletes it again and fails with
    /// [`HalError::AggregateOrphan`].
    pub async fn create<C, P>(
        &self,
        collection: &Resource<C>,
        actions: &AggregateActions,
        payload: &P,
        children: Vec<ChildPlan>,
    ) -> Result<CompositeOutcome, HalError>
    where
        P: Serialize + ?Sized,
    {
        let saga = SagaMachine::creating();
        let span = tracing::info_span!("saga", saga_id = %saga.id(), op = "create");
        self.run(saga, actions, children, async {
            self.client
                .invoke_resource(collection, &actions.create, payload)
                .await
        })
        .instrument(span)
        .await
    }

    /// Update an aggregate, then add and delete its children
    ///
    /// Same failure policy as [`create`](Self::create): a child failure
    /// deletes the aggregate.
    pub async fn update<A, P>(
        &self,
        aggregate: &Resource<A>,
        actions: &AggregateActions,
        payload: &P,
        children: Vec<ChildPlan>,
    ) -> Result<CompositeOutcome, HalError>
    where
        P: Serialize + ?Sized,
    {
        let saga = SagaMachine::updating();
        let span = tracing::info_span!("saga", saga_id = %saga.id(), op = "update");
        self.run(saga, actions, children, async {
            self.client
                .invoke_resource(aggregate, &actions.update, payload)
                .await
        })
        .instrument(span)
        .await
    }

    async fn run<F>(
        &self,
        mut saga: SagaMachine,
        actions: &AggregateActions,
        children: Vec<ChildPlan>,
        write_aggregate: F,
    ) -> Result<CompositeOutcome, HalError>
    where
        F: Future<Output = Result<Resource, HalError>>,
    {
        tracing::info!(
            kinds = children.len(),
            additions = children.iter().map(|c| c.to_add.len()).sum::<usize>(),
            deletions = children.iter().map(|c| c.to_delete.len()).sum::<usize>(),
            "Composite write started"
        );

        let aggregate = match write_aggregate.await {
            Ok(aggregate) => aggregate,
            Err(err) => {
                tracing::warn!(error = %err, "Aggregate write failed, nothing to compensate");
                saga.advance(SagaState::Failed);
                return Err(err);
            }
        };

        saga.advance(SagaState::ChildrenPending);
        tracing::debug!(href = %aggregate.self_href(), "Aggregate written, processing children");

        let outcomes = try_join_all(children.iter().map(|plan| self.apply_plan(&aggregate, plan))).await;

        match outcomes {
            Ok(outcomes) => {
                saga.advance(SagaState::Committed);
                tracing::info!(href = %aggregate.self_href(), "Composite write committed");

                let mut added = IndexMap::new();
                let mut deleted = IndexMap::new();
                for outcome in outcomes {
                    added.insert(outcome.kind.clone(), outcome.added);
                    deleted.insert(outcome.kind, outcome.deleted);
                }
                Ok(CompositeOutcome {
                    saga_id: saga.id(),
                    aggregate,
                    added,
                    deleted,
                })
            }
            Err(cause) => {
                tracing::error!(href = %aggregate.self_href(), error = %cause, "Child step failed, deleting aggregate");
                saga.advance(SagaState::CompensatingDelete);
                let compensation = self.compensate(&aggregate, &actions.delete).await;
                saga.advance(SagaState::Failed);

                Err(SagaError::new(&saga, cause, aggregate.self_href(), compensation).into())
            }
        }
    }

    async fn apply_plan(&self, aggregate: &Resource, plan: &ChildPlan) -> Result<ChildOutcome, HalError> {
        let (added, deleted) = futures::try_join!(
            self.add_children(aggregate, plan),
            self.delete_children(plan)
        )?;
        Ok(ChildOutcome {
            kind: plan.kind.clone(),
            added,
            deleted,
        })
    }

    async fn add_children(&self, aggregate: &Resource, plan: &ChildPlan) -> Result<Vec<Resource>, HalError> {
        if plan.to_add.is_empty() {
            tracing::debug!(kind = %plan.kind, "No children to add");
            return Ok(Vec::new());
        }

        tracing::debug!(kind = %plan.kind, count = plan.to_add.len(), action = %plan.add_action, "Adding children");
        try_join_all(
            plan.to_add
                .iter()
                .map(|payload| self.client.invoke_resource(aggregate, &plan.add_action, payload)),
        )
        .await
    }

    /// Every child must declare the delete action before any delete is sent
    async fn delete_children(&self, plan: &ChildPlan) -> Result<Vec<Resource>, HalError> {
        if plan.to_delete.is_empty() {
            tracing::debug!(kind = %plan.kind, "No children to delete");
            return Ok(Vec::new());
        }

        if let Some(child) = plan.to_delete.iter().find(|c| !c.can_invoke(&plan.delete_action)) {
            tracing::error!(kind = %plan.kind, href = %child.self_href(), action = %plan.delete_action, "Child cannot be deleted");
            return Err(ProtocolError::MissingAction {
                action: plan.delete_action.clone(),
                href: child.self_href().to_string(),
            }
            .into());
        }

        tracing::debug!(kind = %plan.kind, count = plan.to_delete.len(), action = %plan.delete_action, "Deleting children");
        try_join_all(
            plan.to_delete
                .iter()
                .map(|child| self.client.invoke(child, &plan.delete_action, None)),
        )
        .await?;
        Ok(plan.to_delete.clone())
    }

    async fn compensate(&self, aggregate: &Resource, delete_action: &str) -> Compensation {
        match self.client.invoke(aggregate, delete_action, None).await {
            Ok(_) => {
                tracing::info!(href = %aggregate.self_href(), "Aggregate deleted");
                Compensation::Succeeded
            }
            Err(err) => {
                tracing::error!(href = %aggregate.self_href(), error = %err, "Compensating delete failed, aggregate orphaned");
                Compensation::Failed(err)
            }
        }
    }
}
