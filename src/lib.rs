//! # halforms
//!
//! A client-side engine for HAL-FORMS hypermedia APIs.
//!
//! ## Features
//!
//! - **Hypermedia Navigation**: only the API root URL is known, everything else is reached through `_links`
//! - **Server-Declared Actions**: `_templates` are invoked generically, their method and target come from the server
//! - **Embedded Collection Edits**: pure add/set/delete helpers matched by `self` href
//! - **Reactive Stores**: paginated collection and detail caches published on `watch` channels
//! - **Composite Writes**: aggregate + children sagas with a compensating delete
//! - **Pluggable Transport**: `reqwest` by default, an in-memory recording mock for tests
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use halforms::prelude::*;
//!
//! let client = HalClient::connect(ClientConfig::new("http://localhost:8082/api"))?;
//!
//! let teams: ResourceStore<Team> = ResourceStore::new(
//!     client.clone(),
//!     CollectionDescriptor::conventional("teams", "Team"),
//! );
//! for team in teams.loaded().await? {
//!     println!("{} -> {}", team.data.name(), team.self_href());
//! }
//!
//! teams.set_pagination(PaginationOption::page(20, 1));
//! ```

pub mod client;
pub mod config;
pub mod core;
pub mod saga;
pub mod store;
pub mod training;
pub mod transport;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        builder::{CollectionBuilder, LinkBuilder, LinksBuilder, ResourceBuilder},
        embedded::{add_item, delete_item, set_item, unwrap},
        error::{HalError, ProtocolError, StoreError, TransportError},
        link::{Link, LinkValue, Links},
        query::{Pagination, PaginationOption, QueryParams, get_pagination},
        resource::{Payload, Resource},
        template::{Property, Template},
    };

    // === Client ===
    pub use crate::client::{Followed, HalClient, RootState};
    pub use crate::transport::{HttpRequest, HttpTransport, Method, MockResponse, MockTransport};
    #[cfg(feature = "reqwest-transport")]
    pub use crate::transport::ReqwestTransport;

    // === Stores ===
    pub use crate::store::{DetailStore, ResourceStatus, ResourceStore};

    // === Sagas ===
    pub use crate::saga::{AggregateActions, ChildPlan, Compensation, CompositeOrchestrator, SagaError, diff_children};

    // === Config ===
    pub use crate::config::{ClientConfig, CollectionDescriptor, HalConfig};

    // === Training ===
    pub use crate::training::{
        Category, Coach, CreateTeamRequest, Gender, Hall, Role, RoleCoach, RoleCoachForm, Team, TeamService,
        TeamStore, TimeSlot, TrainingSession, TrainingSessionForm,
    };

    // === External dependencies ===
    pub use async_trait::async_trait;
    pub use serde::{Deserialize, Serialize};
}
