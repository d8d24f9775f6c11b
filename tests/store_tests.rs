//! Tests for the collection and detail stores
//!
//! These tests verify that:
//! - Pages are loaded lazily with the current pagination option
//! - Mutations patch the cached page before reloading it
//! - Deleting the last item of a page steps back one page
//! - A failed root leaves stores in error with no data
//! - Detail selection is served from the collection cache when possible

mod hal_harness;

use hal_harness::*;
use halforms::prelude::*;
use std::time::Duration;
use tokio_test::{assert_err, assert_ok};

fn teams_store(mock: &MockTransport, page_size: u32) -> ResourceStore<Team> {
    let mut descriptor = CollectionDescriptor::conventional("teams", "Team");
    descriptor.default_page_size = page_size;
    ResourceStore::new(client(mock), descriptor)
}

// =============================================================================
// Loading
// =============================================================================

mod loading_tests {
    use super::*;

    #[tokio::test]
    async fn test_first_read_loads_default_page() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1), team(2)], 0, 1)));
        let store = teams_store(&mock, 20);
        assert_eq!(store.status(), ResourceStatus::Idle);

        let teams = assert_ok!(store.loaded().await);
        assert_eq!(teams.len(), 2);
        assert_eq!(teams[0].data.team_number, 1);
        assert_eq!(store.status(), ResourceStatus::Resolved);
        assert_eq!(mock.count(Method::Get, &url("teams?page=0&size=20")), 1);

        let pagination = store.pagination().expect("page block");
        assert_eq!(pagination.page.total_pages, 1);
    }

    #[tokio::test]
    async fn test_same_option_is_noop() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1)], 0, 1)));
        let store = teams_store(&mock, 20);
        assert_ok!(store.loaded().await);

        store.set_pagination(PaginationOption::page(20, 0));
        tokio::task::yield_now().await;

        assert_eq!(store.status(), ResourceStatus::Resolved);
        assert_eq!(mock.count(Method::Get, &url("teams?page=0&size=20")), 1);
    }

    #[tokio::test]
    async fn test_all_follows_unpaged_relation() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1)], 0, 3)));
        mock.on_get(url("teams/all"), json_of(&teams_page(vec![team(1), team(2), team(3)], 0, 1)));
        let store = teams_store(&mock, 1);

        store.set_pagination(PaginationOption::All);
        let teams = assert_ok!(store.loaded().await);

        assert_eq!(teams.len(), 3);
        assert_eq!(mock.count(Method::Get, &url("teams")), 1);
        assert_eq!(mock.count(Method::Get, &url("teams/all")), 1);
    }

    #[tokio::test]
    async fn test_root_failure_leaves_store_in_error() {
        let mock = MockTransport::new();
        mock.on(Method::Get, BASE, MockResponse::Status(503, None));
        let store = teams_store(&mock, 20);

        let err = assert_err!(store.loaded().await);
        assert_eq!(err.transport().and_then(|t| t.status), Some(503));
        assert_eq!(store.status(), ResourceStatus::Error);
        assert!(store.error().is_some());
        assert!(assert_ok!(store.get_all()).is_empty());
        assert_eq!(mock.count(Method::Get, &url("teams?page=0&size=20")), 0);
    }

    #[tokio::test]
    async fn test_page_without_embedded_is_empty() {
        let mock = mock_with_root();
        let empty = CollectionBuilder::new(url("teams"))
            .with_page(20, 0, 0, 0)
            .build()
            .unwrap();
        mock.on_get(url("teams"), json_of(&empty));
        let store = teams_store(&mock, 20);

        assert!(assert_ok!(store.loaded().await).is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_superseded_page_is_discarded() {
        let mock = mock_with_root();
        mock.on(
            Method::Get,
            url("teams?page=0&size=20"),
            MockResponse::Json(json_of(&teams_page(vec![team(1)], 0, 2))).delayed(Duration::from_secs(10)),
        );
        mock.on_get(url("teams?page=1&size=20"), json_of(&teams_page(vec![team(2)], 1, 2)));
        let store = teams_store(&mock, 20);

        let _ = store.get_all();
        store.set_pagination(PaginationOption::page(20, 1));
        let teams = assert_ok!(store.loaded().await);
        assert_eq!(teams[0].self_href(), url("teams/2"));

        tokio::time::sleep(Duration::from_secs(30)).await;
        let teams = assert_ok!(store.get_all());
        assert_eq!(teams.len(), 1);
        assert_eq!(teams[0].self_href(), url("teams/2"));
    }
}

// =============================================================================
// Mutations
// =============================================================================

mod mutation_tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_before_load_fails_without_request() {
        let mock = mock_with_root();
        let store = teams_store(&mock, 20);

        let err = assert_err!(store.create(&json!({"teamNumber": 1})).await);
        assert_eq!(err.error_code(), "STORE_NOT_LOADED");
        assert_eq!(mock.count_method(Method::Post), 0);
    }

    #[tokio::test]
    async fn test_create_appends_then_reloads() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1)], 0, 1)));
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1), team(2)], 0, 1)));
        mock.on(Method::Post, url("teams"), MockResponse::Json(json_of(&team(2))));
        let store = teams_store(&mock, 20);
        assert_ok!(store.loaded().await);

        let created = assert_ok!(
            store
                .create(&json!({"gender": "F", "category": "U13", "teamNumber": 2}))
                .await
        );
        assert_eq!(created.self_href(), url("teams/2"));
        assert_eq!(store.items().len(), 2);

        assert_eq!(assert_ok!(store.loaded().await).len(), 2);
        assert_eq!(mock.count(Method::Get, &url("teams?page=0&size=20")), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_item_by_href() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1), team(2)], 0, 1)));
        let renumbered = ResourceBuilder::new(url("teams/2"))
            .with_field("id", json!(2))
            .with_field("gender", json!("M"))
            .with_field("category", json!("SENIOR"))
            .with_field("teamNumber", json!(7))
            .build()
            .unwrap();
        mock.on(Method::Put, url("teams/2"), MockResponse::Json(json_of(&renumbered)));
        let store = teams_store(&mock, 20);
        let teams = assert_ok!(store.loaded().await);

        let updated = assert_ok!(store.update(&teams[1], &json!({"teamNumber": 7})).await);
        assert_eq!(updated.data.category, Category::Senior);

        let cached = assert_ok!(store.get_all());
        assert_eq!(cached.len(), 2);
        assert_eq!(cached[1].data.team_number, 7);
    }

    #[tokio::test]
    async fn test_delete_patches_then_reloads() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1), team(2)], 0, 1)));
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(2)], 0, 1)));
        mock.on(Method::Delete, url("teams/1"), MockResponse::Empty);
        let store = teams_store(&mock, 20);
        let teams = assert_ok!(store.loaded().await);

        assert_ok!(store.delete(&teams[0]).await);
        let remaining = store.items();
        assert_eq!(remaining.len(), 1);
        assert_eq!(remaining[0].self_href(), url("teams/2"));
        assert_eq!(store.status(), ResourceStatus::Reloading);

        assert_eq!(assert_ok!(store.loaded().await).len(), 1);
        assert_eq!(store.pagination_option(), PaginationOption::page(20, 0));
    }

    #[tokio::test]
    async fn test_delete_last_item_steps_back_one_page() {
        let mock = mock_with_root();
        mock.on_get(url("teams?page=3&size=1"), json_of(&teams_page(vec![team(4)], 3, 4)));
        mock.on_get(url("teams?page=2&size=1"), json_of(&teams_page(vec![team(3)], 2, 3)));
        mock.on(Method::Delete, url("teams/4"), MockResponse::Empty);
        let store = teams_store(&mock, 1);

        store.set_pagination(PaginationOption::page(1, 3));
        let teams = assert_ok!(store.loaded().await);
        assert_eq!(teams.len(), 1);

        assert_ok!(store.delete(&teams[0]).await);
        assert_eq!(store.pagination_option(), PaginationOption::page(1, 2));

        let teams = assert_ok!(store.loaded().await);
        assert_eq!(teams[0].self_href(), url("teams/3"));
        assert_eq!(mock.count(Method::Get, &url("teams?page=2&size=1")), 1);
        assert_eq!(mock.count(Method::Get, &url("teams?page=3&size=1")), 1);
    }

    #[tokio::test]
    async fn test_delete_last_item_of_first_page_reloads_it() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1)], 0, 1)));
        mock.on(Method::Delete, url("teams/1"), MockResponse::Empty);
        let store = teams_store(&mock, 20);
        let teams = assert_ok!(store.loaded().await);

        assert_ok!(store.delete(&teams[0]).await);
        assert_eq!(store.pagination_option(), PaginationOption::page(20, 0));
        assert_ok!(store.loaded().await);
        assert_eq!(mock.count(Method::Get, &url("teams?page=0&size=20")), 2);
    }
}

// =============================================================================
// Detail
// =============================================================================

mod detail_tests {
    use super::*;

    #[tokio::test]
    async fn test_cached_item_resolves_without_request() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1), team(2)], 0, 1)));
        let store = teams_store(&mock, 20);
        assert_ok!(store.loaded().await);

        let detail = DetailStore::new(client(&mock), store.clone());
        let selected = assert_ok!(detail.resolve(url("teams/2")).await);

        assert_eq!(selected.data.team_number, 2);
        assert_eq!(mock.count(Method::Get, &url("teams/2")), 0);
    }

    #[tokio::test]
    async fn test_cache_miss_fetches_item() {
        let mock = mock_with_root();
        mock.on_get(url("teams"), json_of(&teams_page(vec![team(1)], 0, 1)));
        mock.on_get(url("teams/9"), json_of(&team(9)));
        let store = teams_store(&mock, 20);
        assert_ok!(store.loaded().await);

        let detail = DetailStore::new(client(&mock), store);
        let selected = assert_ok!(detail.resolve(url("teams/9")).await);

        assert_eq!(selected.self_href(), url("teams/9"));
        assert_eq!(mock.count(Method::Get, &url("teams/9")), 1);
    }

    #[tokio::test]
    async fn test_nothing_selected() {
        let mock = mock_with_root();
        let store = teams_store(&mock, 20);
        let detail = DetailStore::new(client(&mock), store);

        let err = assert_err!(detail.loaded().await);
        assert_eq!(err.error_code(), "STORE_NO_SELECTION");
        assert!(detail.current().is_none());
    }
}

// =============================================================================
// Other collections
// =============================================================================

mod other_collection_tests {
    use super::*;
    use halforms::training::{Address, CreateCoachRequest, HallRequest};
    use serde_json::json;

    fn hall_resource(id: i64) -> Resource {
        let mut value = hall_json(id);
        value["_links"] = json!({"self": {"href": url(&format!("halls/{}", id))}});
        Resource::from_value(value).unwrap()
    }

    fn page(rel: &str, items: Vec<Resource>, create_action: &str) -> Resource {
        CollectionBuilder::new(url(rel))
            .with_items(rel, items)
            .with_page(20, 1, 1, 0)
            .with_action(create_action, "POST")
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn test_coach_created_from_request() {
        let mock = mock_with_root();
        let coaches = vec![Resource::from_value(coach(1, "Anna")).unwrap()];
        mock.on_get(url("coaches"), json_of(&page("coaches", coaches, "createCoach")));
        mock.on(Method::Post, url("coaches"), MockResponse::Json(coach(2, "Bruno")));
        let store: ResourceStore<Coach> =
            ResourceStore::new(client(&mock), CollectionDescriptor::conventional("coaches", "Coach"));
        assert_ok!(store.loaded().await);

        let request = CreateCoachRequest {
            name: "Bruno".into(),
            surname: "Martin".into(),
            email: "bruno@club.fr".into(),
            phone: "0600000000".into(),
        };
        let created = assert_ok!(store.create(&request).await);

        assert_eq!(created.data.name, "Bruno");
        assert_eq!(created.data.id, Some(2));
        let post = mock
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post)
            .unwrap();
        assert_eq!(
            post.body,
            Some(json!({
                "name": "Bruno",
                "surname": "Martin",
                "email": "bruno@club.fr",
                "phone": "0600000000"
            }))
        );
    }

    #[tokio::test]
    async fn test_hall_created_from_request() {
        let mock = mock_with_root();
        mock.on_get(url("halls"), json_of(&page("halls", vec![hall_resource(1)], "createHall")));
        mock.on(Method::Post, url("halls"), MockResponse::Json(json_of(&hall_resource(3))));
        let store: ResourceStore<Hall> =
            ResourceStore::new(client(&mock), CollectionDescriptor::conventional("halls", "Hall"));
        assert_ok!(store.loaded().await);

        let request = HallRequest {
            name: "Gymnase 3".into(),
            address: Address {
                street: "1 rue du Stade".into(),
                city: "Hoenheim".into(),
                postal_code: "67800".into(),
                country: "France".into(),
            },
        };
        let created = assert_ok!(store.create(&request).await);

        assert_eq!(created.data.id, 3);
        assert_eq!(store.items().len(), 2);
        let post = mock
            .requests()
            .into_iter()
            .find(|r| r.method == Method::Post)
            .unwrap();
        assert_eq!(post.body.as_ref().and_then(|b| b.pointer("/address/postalCode")), Some(&json!("67800")));
    }
}
