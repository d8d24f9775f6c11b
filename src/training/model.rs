//! Training domain payloads
//!
//! These are the `data` part of [`Resource`](crate::core::resource::Resource)s
//! served by the training API. Nested resources (the coach of a role
//! assignment, the hall of a session) keep their own `_links`, which serde
//! ignores here.

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    F,
    M,
    /// Mixed team
    N,
}

/// Age category of a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    U11,
    U13,
    U15,
    U18,
    Senior,
    /// Handball school, for beginners
    Edh,
}

/// Role of a coach in a team
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Main,
    Assistant,
    SupportStaff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Gender::F => "F",
            Gender::M => "M",
            Gender::N => "N",
        };
        f.write_str(s)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Category::U11 => "U11",
            Category::U13 => "U13",
            Category::U15 => "U15",
            Category::U18 => "U18",
            Category::Senior => "SENIOR",
            Category::Edh => "EDH",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub gender: Gender,
    pub category: Category,
    pub team_number: u32,
}

impl Team {
    /// Display name, e.g. `U13F 1`
    pub fn name(&self) -> String {
        format!("{}{} {}", self.category, self.gender, self.team_number)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coach {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub surname: String,
    pub email: String,
    pub phone: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hall {
    pub id: i64,
    pub name: String,
    pub address: Address,
}

/// Weekly time slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub day_of_week: DayOfWeek,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl TimeSlot {
    pub fn new(day_of_week: DayOfWeek, start_time: NaiveTime, end_time: NaiveTime) -> Self {
        Self {
            id: None,
            day_of_week,
            start_time,
            end_time,
        }
    }

    /// Same day and hours, whatever the ids
    pub fn same_slot(&self, other: &TimeSlot) -> bool {
        self.day_of_week == other.day_of_week
            && self.start_time == other.start_time
            && self.end_time == other.end_time
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSession {
    pub id: i64,
    pub time_slot: TimeSlot,
    pub hall: Hall,
}

/// Assignment of a coach to a team
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCoach {
    pub id: i64,
    pub role: Role,
    pub coach: Coach,
    pub team: Team,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_enums_use_server_names() {
        assert_eq!(serde_json::to_value(Category::Senior).unwrap(), json!("SENIOR"));
        assert_eq!(serde_json::to_value(Role::SupportStaff).unwrap(), json!("SUPPORT_STAFF"));
        assert_eq!(serde_json::to_value(DayOfWeek::Wednesday).unwrap(), json!("WEDNESDAY"));
        assert_eq!(serde_json::from_value::<Gender>(json!("N")).unwrap(), Gender::N);
    }

    #[test]
    fn test_team_name() {
        let team = Team {
            id: Some(3),
            gender: Gender::F,
            category: Category::U13,
            team_number: 1,
        };
        assert_eq!(team.name(), "U13F 1");
    }

    #[test]
    fn test_session_parses_spring_times() {
        let session: TrainingSession = serde_json::from_value(json!({
            "id": 4,
            "timeSlot": {"id": 9, "dayOfWeek": "TUESDAY", "startTime": "18:00:00", "endTime": "19:30:00"},
            "hall": {
                "id": 1,
                "name": "Gymnase",
                "address": {"street": "1 rue", "city": "Hoenheim", "postalCode": "67800", "country": "France"},
                "_links": {"self": {"href": "http://api/halls/1"}}
            }
        }))
        .unwrap();

        assert_eq!(session.time_slot.start_time, NaiveTime::from_hms_opt(18, 0, 0).unwrap());
        assert_eq!(session.hall.address.city, "Hoenheim");
    }

    #[test]
    fn test_same_slot_ignores_id() {
        let at = |h| NaiveTime::from_hms_opt(h, 0, 0).unwrap();
        let mut stored = TimeSlot::new(DayOfWeek::Monday, at(18), at(20));
        stored.id = Some(12);
        let wanted = TimeSlot::new(DayOfWeek::Monday, at(18), at(20));

        assert!(stored.same_slot(&wanted));
        assert_ne!(stored, wanted);
        assert!(!stored.same_slot(&TimeSlot::new(DayOfWeek::Friday, at(18), at(20))));
    }
}
