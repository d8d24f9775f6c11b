//! Team operations over the hypermedia client
//!
//! A team is an aggregate: its weekly training sessions and its coach
//! assignments are separate resources attached through actions on the team.
//! The `*_with_children` operations write them together as one saga.

use super::dto::{AddRoleCoachRequest, AddTrainingSessionRequest, CreateTeamRequest, RoleCoachForm, TrainingSessionForm};
use super::model::{RoleCoach, Team, TrainingSession};
use crate::client::HalClient;
use crate::config::CollectionDescriptor;
use crate::core::error::HalError;
use crate::core::query::PaginationOption;
use crate::core::resource::Resource;
use crate::saga::{AggregateActions, ChildPlan, CompositeOrchestrator, CompositeOutcome};
use crate::store::collection::fetch_collection;
use serde::de::DeserializeOwned;

pub const TRAINING_SESSIONS_REL: &str = "trainingSessionsList";
pub const ROLE_COACHES_REL: &str = "roleCoachesList";

pub const ADD_TRAINING_SESSION: &str = "addTrainingSession";
pub const DELETE_TRAINING_SESSION: &str = "deleteTrainingSession";
pub const ADD_ROLE_COACH: &str = "addRoleCoach";
pub const DELETE_ROLE_COACH: &str = "deleteRoleCoach";

const TRAINING_SESSIONS: &str = "trainingSessions";
const ROLE_COACHES: &str = "roleCoaches";

/// A team written together with its children
#[derive(Debug, Clone)]
pub struct TeamWithChildren {
    pub team: Resource<Team>,
    pub added_training_sessions: Vec<Resource<TrainingSession>>,
    pub added_role_coaches: Vec<Resource<RoleCoach>>,
    pub deleted_training_sessions: Vec<Resource<TrainingSession>>,
    pub deleted_role_coaches: Vec<Resource<RoleCoach>>,
}

impl TryFrom<CompositeOutcome> for TeamWithChildren {
    type Error = HalError;

    fn try_from(outcome: CompositeOutcome) -> Result<Self, Self::Error> {
        Ok(Self {
            added_training_sessions: typed(outcome.added(TRAINING_SESSIONS))?,
            added_role_coaches: typed(outcome.added(ROLE_COACHES))?,
            deleted_training_sessions: typed(outcome.deleted(TRAINING_SESSIONS))?,
            deleted_role_coaches: typed(outcome.deleted(ROLE_COACHES))?,
            team: outcome.aggregate.into_typed()?,
        })
    }
}

fn typed<U: DeserializeOwned>(items: &[Resource]) -> Result<Vec<Resource<U>>, HalError> {
    items.iter().cloned().map(Resource::into_typed).collect()
}

/// Team operations
#[derive(Clone)]
pub struct TeamService {
    client: HalClient,
    orchestrator: CompositeOrchestrator,
    descriptor: CollectionDescriptor,
}

impl TeamService {
    pub fn new(client: HalClient) -> Self {
        Self::with_descriptor(client, CollectionDescriptor::conventional("teams", "Team"))
    }

    pub fn with_descriptor(client: HalClient, descriptor: CollectionDescriptor) -> Self {
        tracing::debug!(collection = %descriptor.name, "TeamService initialized");
        Self {
            orchestrator: CompositeOrchestrator::new(client.clone()),
            client,
            descriptor,
        }
    }

    pub fn client(&self) -> &HalClient {
        &self.client
    }

    pub fn descriptor(&self) -> &CollectionDescriptor {
        &self.descriptor
    }

    fn actions(&self) -> AggregateActions {
        AggregateActions::new(
            &self.descriptor.create_action,
            &self.descriptor.update_action,
            &self.descriptor.delete_action,
        )
    }

    // =========================================================================
    // Teams
    // =========================================================================

    /// One page of teams, or every team for [`PaginationOption::All`]
    pub async fn teams(&self, option: PaginationOption) -> Result<Resource, HalError> {
        tracing::debug!(option = %option, "Getting teams");
        fetch_collection(&self.client, &self.descriptor, option).await
    }

    pub async fn team(&self, uri: &str) -> Result<Resource<Team>, HalError> {
        tracing::debug!(uri = %uri, "Getting team by URI");
        self.client.load_resource(uri).await?.into_typed()
    }

    /// Create a team through the collection's create action
    pub async fn create_team<C>(&self, teams: &Resource<C>, request: &CreateTeamRequest) -> Result<Resource<Team>, HalError> {
        tracing::debug!(
            category = %request.category,
            gender = %request.gender,
            number = request.team_number,
            "Creating team"
        );
        self.client
            .invoke_resource(teams, &self.descriptor.create_action, request)
            .await?
            .into_typed()
    }

    pub async fn update_team<T>(&self, team: &Resource<T>, request: &CreateTeamRequest) -> Result<Resource<Team>, HalError> {
        tracing::debug!(href = %team.self_href(), number = request.team_number, "Updating team");
        self.client
            .invoke_resource(team, &self.descriptor.update_action, request)
            .await?
            .into_typed()
    }

    pub async fn delete_team<T>(&self, team: &Resource<T>) -> Result<(), HalError> {
        tracing::debug!(href = %team.self_href(), "Deleting team");
        self.client.invoke(team, &self.descriptor.delete_action, None).await?;
        Ok(())
    }

    // =========================================================================
    // Children
    // =========================================================================

    /// Training sessions of a team, empty when the team has no such relation
    pub async fn training_sessions<T>(&self, team: &Resource<T>) -> Result<Vec<Resource<TrainingSession>>, HalError> {
        let sessions = self.client.follow_optional(team, TRAINING_SESSIONS_REL, None).await?;
        typed(&sessions)
    }

    /// Coach assignments of a team, empty when the team has no such relation
    pub async fn role_coaches<T>(&self, team: &Resource<T>) -> Result<Vec<Resource<RoleCoach>>, HalError> {
        let coaches = self.client.follow_optional(team, ROLE_COACHES_REL, None).await?;
        typed(&coaches)
    }

    // =========================================================================
    // Composite writes
    // =========================================================================

    /// Create a team with its training sessions and coach assignments
    ///
    /// If a child cannot be added the team is deleted again.
    pub async fn create_team_with_children<C>(
        &self,
        teams: &Resource<C>,
        request: &CreateTeamRequest,
        training_sessions: &[TrainingSessionForm],
        role_coaches: &[RoleCoachForm],
    ) -> Result<TeamWithChildren, HalError> {
        tracing::debug!(
            team = %format!("{}{} {}", request.category, request.gender, request.team_number),
            training_sessions = training_sessions.len(),
            role_coaches = role_coaches.len(),
            "Creating team with children"
        );

        let children = vec![
            sessions_plan(training_sessions, &[])?,
            coaches_plan(role_coaches, &[])?,
        ];
        self.orchestrator
            .create(teams, &self.actions(), request, children)
            .await?
            .try_into()
    }

    /// Update a team, adding and deleting the given children
    ///
    /// If a child step fails the team is deleted.
    pub async fn update_team_with_children<T>(
        &self,
        team: &Resource<T>,
        request: &CreateTeamRequest,
        training_sessions_to_add: &[TrainingSessionForm],
        training_sessions_to_delete: &[Resource<TrainingSession>],
        role_coaches_to_add: &[RoleCoachForm],
        role_coaches_to_delete: &[Resource<RoleCoach>],
    ) -> Result<TeamWithChildren, HalError> {
        tracing::debug!(
            href = %team.self_href(),
            sessions_to_add = training_sessions_to_add.len(),
            sessions_to_delete = training_sessions_to_delete.len(),
            coaches_to_add = role_coaches_to_add.len(),
            coaches_to_delete = role_coaches_to_delete.len(),
            "Updating team with children"
        );

        let children = vec![
            sessions_plan(training_sessions_to_add, training_sessions_to_delete)?,
            coaches_plan(role_coaches_to_add, role_coaches_to_delete)?,
        ];
        self.orchestrator
            .update(team, &self.actions(), request, children)
            .await?
            .try_into()
    }
}

fn sessions_plan(to_add: &[TrainingSessionForm], to_delete: &[Resource<TrainingSession>]) -> Result<ChildPlan, HalError> {
    ChildPlan::new(TRAINING_SESSIONS, ADD_TRAINING_SESSION, DELETE_TRAINING_SESSION)
        .with_additions(to_add.iter().map(AddTrainingSessionRequest::from))?
        .with_deletions(to_delete)
}

fn coaches_plan(to_add: &[RoleCoachForm], to_delete: &[Resource<RoleCoach>]) -> Result<ChildPlan, HalError> {
    ChildPlan::new(ROLE_COACHES, ADD_ROLE_COACH, DELETE_ROLE_COACH)
        .with_additions(to_add.iter().map(AddRoleCoachRequest::from))?
        .with_deletions(to_delete)
}

