//! Request and form payloads of the training API

use super::model::{Address, Category, Coach, Gender, Hall, Role, RoleCoach, Team, TimeSlot, TrainingSession};
use crate::core::resource::Resource;
use serde::{Deserialize, Serialize};

/// Payload of `createTeam` and `updateTeam`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeamRequest {
    pub gender: Gender,
    pub category: Category,
    pub team_number: u32,
}

impl From<&Team> for CreateTeamRequest {
    fn from(team: &Team) -> Self {
        Self {
            gender: team.gender,
            category: team.category,
            team_number: team.team_number,
        }
    }
}

/// Payload of `createCoach` and `updateCoach`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateCoachRequest {
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
}

/// Payload of `createHall` and `updateHall`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HallRequest {
    pub name: String,
    pub address: Address,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSessionBody {
    pub time_slot: TimeSlot,
}

/// Payload of `addTrainingSession`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddTrainingSessionRequest {
    #[serde(rename = "trainingSessionDTORequest")]
    pub training_session: TrainingSessionBody,
    pub hall_id: i64,
}

/// Payload of `addRoleCoach`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddRoleCoachRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<i64>,
    pub role: Role,
}

/// A training session as edited in a team form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSessionForm {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub time_slot: TimeSlot,
    pub hall: Hall,
}

/// A coach assignment as edited in a team form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCoachForm {
    pub role: Role,
    pub coach: Coach,
}

impl From<&TrainingSessionForm> for AddTrainingSessionRequest {
    fn from(form: &TrainingSessionForm) -> Self {
        Self {
            training_session: TrainingSessionBody {
                time_slot: form.time_slot.clone(),
            },
            hall_id: form.hall.id,
        }
    }
}

impl From<&RoleCoachForm> for AddRoleCoachRequest {
    fn from(form: &RoleCoachForm) -> Self {
        Self {
            coach_id: form.coach.id,
            role: form.role,
        }
    }
}

/// Same weekly slot in the same hall
pub fn training_session_matches(existing: &Resource<TrainingSession>, form: &TrainingSessionForm) -> bool {
    existing.data.time_slot.same_slot(&form.time_slot) && existing.data.hall.id == form.hall.id
}

/// Same role held by the same coach
pub fn role_coach_matches(existing: &Resource<RoleCoach>, form: &RoleCoachForm) -> bool {
    existing.data.role == form.role && existing.data.coach == form.coach
}
