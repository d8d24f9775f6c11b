//! Shared fixtures for the hypermedia engine tests
//!
//! Every fixture lives under [`BASE`] and is served by a recording
//! [`MockTransport`], so tests can assert exactly which requests were made.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! mod hal_harness;
//! use hal_harness::*;
//! ```

#![allow(dead_code)]

use halforms::prelude::*;
use serde_json::{Value, json};

pub const BASE: &str = "http://api.test/api";

pub fn url(path: &str) -> String {
    format!("{}/{}", BASE, path)
}

/// Surface library logs with `RUST_LOG=halforms=debug`
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn client(mock: &MockTransport) -> HalClient {
    init_tracing();
    HalClient::new(mock.clone(), ClientConfig::new(BASE)).expect("valid base url")
}

pub fn json_of(resource: &Resource) -> Value {
    serde_json::to_value(resource).expect("resource serializes")
}

// ---------------------------------------------------------------------------
// Resources
// ---------------------------------------------------------------------------

pub fn root() -> Resource {
    ResourceBuilder::new(BASE)
        .with_link("teams", url("teams"))
        .with_link("coaches", url("coaches"))
        .with_link("halls", url("halls"))
        .build()
        .expect("root builds")
}

/// Mock serving the root resource
pub fn mock_with_root() -> MockTransport {
    let mock = MockTransport::new();
    mock.on_get(BASE, json_of(&root()));
    mock
}

/// A team without training sessions or coaches
pub fn team(id: i64) -> Resource {
    team_with_children(id, &[], &[])
}

/// A team linking each of its children, as the backend renders them
pub fn team_with_children(id: i64, sessions: &[i64], coaches: &[i64]) -> Resource {
    let href = url(&format!("teams/{}", id));
    let mut add_session = Template::new("addTrainingSession", "POST");
    add_session.target = Some(format!("{}/trainingSessions", href));
    let mut add_coach = Template::new("addRoleCoach", "POST");
    add_coach.target = Some(format!("{}/roleCoaches", href));

    let session_links: Vec<Link> = sessions
        .iter()
        .map(|s| Link::new(url(&format!("trainingSessions/{}", s))))
        .collect();
    let coach_links: Vec<Link> = coaches
        .iter()
        .map(|c| Link::new(url(&format!("roleCoaches/{}", c))))
        .collect();

    ResourceBuilder::new(&href)
        .with_links(|links| {
            let links = if session_links.is_empty() {
                links
            } else {
                links.with_links("trainingSessionsList", session_links)
            };
            if coach_links.is_empty() {
                links
            } else {
                links.with_links("roleCoachesList", coach_links)
            }
        })
        .with_field("id", json!(id))
        .with_field("gender", json!("F"))
        .with_field("category", json!("U13"))
        .with_field("teamNumber", json!(id))
        .with_action("updateTeam", "PUT")
        .with_action("deleteTeam", "DELETE")
        .with_template(add_session)
        .with_template(add_coach)
        .build()
        .expect("team builds")
}

pub fn coach(id: i64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "surname": "Martin",
        "email": format!("{}@club.fr", name.to_lowercase()),
        "phone": "0600000000",
        "_links": {"self": {"href": url(&format!("coaches/{}", id))}}
    })
}

pub fn coach_model(id: i64, name: &str) -> Coach {
    serde_json::from_value(coach(id, name)).expect("coach parses")
}

pub fn role_coach(id: i64, role: &str, coach_id: i64, coach_name: &str) -> Resource {
    ResourceBuilder::new(url(&format!("roleCoaches/{}", id)))
        .with_field("id", json!(id))
        .with_field("role", json!(role))
        .with_field("coach", coach(coach_id, coach_name))
        .with_field("team", json!({"id": 1, "gender": "F", "category": "U13", "teamNumber": 1}))
        .with_action("deleteRoleCoach", "DELETE")
        .build()
        .expect("role coach builds")
}

pub fn hall_json(id: i64) -> Value {
    json!({
        "id": id,
        "name": format!("Gymnase {}", id),
        "address": {"street": "1 rue du Stade", "city": "Hoenheim", "postalCode": "67800", "country": "France"}
    })
}

pub fn training_session(id: i64, day: &str, start: &str, end: &str, hall_id: i64) -> Resource {
    ResourceBuilder::new(url(&format!("trainingSessions/{}", id)))
        .with_field("id", json!(id))
        .with_field(
            "timeSlot",
            json!({"id": id * 10, "dayOfWeek": day, "startTime": start, "endTime": end}),
        )
        .with_field("hall", hall_json(hall_id))
        .with_action("deleteTrainingSession", "DELETE")
        .build()
        .expect("training session builds")
}

/// A teams page at `number` out of `total_pages`
pub fn teams_page(items: Vec<Resource>, number: u64, total_pages: u64) -> Resource {
    let size = items.len().max(1) as u64;
    CollectionBuilder::new(url("teams"))
        .with_items("teams", items)
        .with_page(size, size * total_pages, total_pages, number)
        .with_link("allTeams", url("teams/all"))
        .with_action("createTeam", "POST")
        .build()
        .expect("teams page builds")
}

