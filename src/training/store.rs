//! Team stores
//!
//! [`TeamStore`] keeps the teams collection, the selected team and that
//! team's training sessions and coach assignments. Composite writes go
//! through [`TeamService`]; afterwards the child lists are patched in place
//! instead of refetched.

use super::dto::{CreateTeamRequest, RoleCoachForm, TrainingSessionForm, role_coach_matches, training_session_matches};
use super::model::{RoleCoach, Team, TrainingSession};
use super::service::{TeamService, TeamWithChildren};
use crate::client::HalClient;
use crate::config::CollectionDescriptor;
use crate::core::error::{HalError, StoreError};
use crate::core::resource::Resource;
use crate::saga::diff_children;
use crate::store::state::{LoadCell, ResourceStatus};
use crate::store::{DetailStore, ResourceStore};

type Sessions = Vec<Resource<TrainingSession>>;
type RoleCoaches = Vec<Resource<RoleCoach>>;

/// Teams collection plus one selected team with its children
pub struct TeamStore {
    service: TeamService,
    teams: ResourceStore<Team>,
    team: DetailStore<Team>,
    training_sessions: LoadCell<Sessions>,
    role_coaches: LoadCell<RoleCoaches>,
}

impl TeamStore {
    pub fn new(client: HalClient) -> Self {
        Self::with_descriptor(client, CollectionDescriptor::conventional("teams", "Team"))
    }

    pub fn with_descriptor(client: HalClient, descriptor: CollectionDescriptor) -> Self {
        let teams = ResourceStore::new(client.clone(), descriptor.clone());
        Self {
            team: DetailStore::new(client.clone(), teams.clone()),
            service: TeamService::with_descriptor(client, descriptor),
            teams,
            training_sessions: LoadCell::new("teams/trainingSessions"),
            role_coaches: LoadCell::new("teams/roleCoaches"),
        }
    }

    pub fn teams(&self) -> &ResourceStore<Team> {
        &self.teams
    }

    pub fn team(&self) -> &DetailStore<Team> {
        &self.team
    }

    pub fn service(&self) -> &TeamService {
        &self.service
    }

    // =========================================================================
    // Selection
    // =========================================================================

    /// Select a team and load its children
    pub fn select(&self, uri: impl Into<String>) {
        self.team.select(uri);

        let (team, service) = (self.team.clone(), self.service.clone());
        self.training_sessions.start(false, async move {
            let team = team.loaded().await?;
            service.training_sessions(&team).await
        });

        let (team, service) = (self.team.clone(), self.service.clone());
        self.role_coaches.start(false, async move {
            let team = team.loaded().await?;
            service.role_coaches(&team).await
        });
    }

    /// Wait for the selected team's training sessions
    pub async fn training_sessions(&self) -> Result<Sessions, HalError> {
        self.children(&self.training_sessions).await
    }

    /// Wait for the selected team's coach assignments
    pub async fn role_coaches(&self) -> Result<RoleCoaches, HalError> {
        self.children(&self.role_coaches).await
    }

    async fn children<V>(&self, cell: &LoadCell<Vec<V>>) -> Result<Vec<V>, HalError>
    where
        V: Clone + Send + Sync + 'static,
    {
        if self.team.uri().is_none() || cell.status() == ResourceStatus::Idle {
            return Err(self.no_selection());
        }
        let state = cell.settled().await;
        match state.error {
            Some(err) => Err(err),
            None => Ok(state.value.unwrap_or_default()),
        }
    }

    fn no_selection(&self) -> HalError {
        StoreError::NoSelection {
            store: format!("{}/detail", self.teams.descriptor().name),
        }
        .into()
    }

    pub fn training_sessions_status(&self) -> ResourceStatus {
        self.training_sessions.status()
    }

    pub fn role_coaches_status(&self) -> ResourceStatus {
        self.role_coaches.status()
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Create a team with its children on the cached teams page
    pub async fn create_team(
        &self,
        request: &CreateTeamRequest,
        training_sessions: &[TrainingSessionForm],
        role_coaches: &[RoleCoachForm],
    ) -> Result<TeamWithChildren, HalError> {
        let page = self.teams.snapshot().ok_or_else(|| StoreError::NotLoaded {
            store: self.teams.descriptor().name.clone(),
        })?;

        let created = self
            .service
            .create_team_with_children(page.as_ref(), request, training_sessions, role_coaches)
            .await?;
        self.teams.record_created(&created.team.to_untyped()?);
        Ok(created)
    }

    /// Update the selected team to match the edited form
    ///
    /// Children are diffed by value against the loaded lists: only missing
    /// ones are added and only dropped ones deleted. Lists still loading are
    /// awaited first; a list that failed to load fails the update.
    pub async fn update_team(
        &self,
        request: &CreateTeamRequest,
        training_sessions: &[TrainingSessionForm],
        role_coaches: &[RoleCoachForm],
    ) -> Result<TeamWithChildren, HalError> {
        let team = self.team.loaded().await?;

        let (existing_sessions, existing_coaches) = futures::try_join!(
            self.children(&self.training_sessions),
            self.children(&self.role_coaches)
        )?;
        let sessions = diff_children(&existing_sessions, training_sessions, training_session_matches);
        let coaches = diff_children(&existing_coaches, role_coaches, role_coach_matches);

        let updated = self
            .service
            .update_team_with_children(
                &team,
                request,
                &sessions.to_add,
                &sessions.to_delete,
                &coaches.to_add,
                &coaches.to_delete,
            )
            .await?;

        self.team.set_local(updated.team.clone());
        patch_children(
            &self.training_sessions,
            &updated.deleted_training_sessions,
            &updated.added_training_sessions,
        );
        patch_children(
            &self.role_coaches,
            &updated.deleted_role_coaches,
            &updated.added_role_coaches,
        );
        self.teams.record_updated(&updated.team.to_untyped()?);

        Ok(updated)
    }

    pub async fn delete_team(&self, team: &Resource<Team>) -> Result<(), HalError> {
        self.teams.delete(team).await
    }
}

/// Drop deleted children by href and append added ones
fn patch_children<T>(cell: &LoadCell<Vec<Resource<T>>>, deleted: &[Resource<T>], added: &[Resource<T>])
where
    T: Clone + Send + Sync + 'static,
{
    let merge = |current: &Vec<Resource<T>>| {
        let mut next: Vec<_> = current
            .iter()
            .filter(|child| !deleted.iter().any(|d| d.same_identity(*child)))
            .cloned()
            .collect();
        next.extend(added.iter().cloned());
        next
    };

    if !cell.patch(|current| Some(merge(current))) {
        cell.resolve(added.to_vec());
    }
}
