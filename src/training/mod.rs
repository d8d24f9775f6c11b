//! Training domain: teams, coaches, halls and their weekly sessions
//!
//! The payload types of the training API, the requests its actions accept,
//! and team operations built on the generic engine.

pub mod dto;
pub mod model;
pub mod service;
pub mod store;

pub use dto::{
    AddRoleCoachRequest, AddTrainingSessionRequest, CreateCoachRequest, CreateTeamRequest, HallRequest,
    RoleCoachForm, TrainingSessionForm, role_coach_matches, training_session_matches,
};
pub use model::{Address, Category, Coach, DayOfWeek, Gender, Hall, Role, RoleCoach, Team, TimeSlot, TrainingSession};
pub use service::{TeamService, TeamWithChildren};
pub use store::TeamStore;
