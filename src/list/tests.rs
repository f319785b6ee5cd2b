//! Tests for the paginated collection

use super::*;
use crate::http::RequesterConfig;
use crate::resource::{Course, User};
use futures::StreamExt;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn requester_for(server: &MockServer) -> Arc<Requester> {
    let config = RequesterConfig::builder()
        .base_url(format!("{}/api/v1", server.uri()))
        .max_retries(0)
        .no_rate_limit()
        .build();
    Arc::new(Requester::new(config).unwrap())
}

fn courses(requester: &Arc<Requester>) -> PaginatedList<Course> {
    PaginatedList::new(Arc::clone(requester), ListRequest::get("/courses"))
}

fn course_records(range: std::ops::RangeInclusive<i64>) -> serde_json::Value {
    json!(range
        .map(|i| json!({"id": i, "name": format!("course-{i}"), "workflow_state": "available"}))
        .collect::<Vec<_>>())
}

fn next_link(server: &MockServer, path_and_query: &str) -> String {
    format!("<{}/api/v1{path_and_query}>; rel=\"next\"", server.uri())
}

/// Two pages of /courses: ids 1..=3, then 4..=5. Each page may be fetched
/// at most once.
async fn mount_two_pages(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(course_records(1..=3))
                .insert_header("link", next_link(server, "/courses?page=2").as_str()),
        )
        .expect(1)
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_records(4..=5)))
        .expect(1)
        .mount(server)
        .await;
}

// ============================================================================
// Laziness and growth
// ============================================================================

#[tokio::test]
async fn test_new_collection_fetches_nothing() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let list = courses(&requester);

    assert!(list.has_next());
    assert!(list.is_empty());
}

#[tokio::test]
async fn test_get_grows_exactly_enough_and_caches() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(course_records(1..=3))
                .insert_header("link", next_link(&mock_server, "/courses?page=2").as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "2"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(course_records(4..=6))
                .insert_header("link", next_link(&mock_server, "/courses?page=3").as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Page 3 must never be requested: index 4 is covered by two pages
    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);

    let record = list.get(4).await.unwrap();
    assert_eq!(record["id"], json!(5));
    assert_eq!(list.len(), 6);

    // A second identical access re-fetches nothing
    let record = list.get(4).await.unwrap();
    assert_eq!(record["id"], json!(5));
}

#[tokio::test]
async fn test_get_out_of_range_after_exhaustion() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);

    assert!(list.get(4).await.is_ok());
    let err = list.get(5).await.unwrap_err();
    assert!(matches!(err, Error::IndexOutOfRange { index: 5, len: 5 }));
    assert!(err.is_usage_error());
    assert!(!list.has_next());
}

#[tokio::test]
async fn test_get_range_spans_page_boundary() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);

    let slice = list.get_range(2..5).await.unwrap();
    let ids: Vec<_> = slice.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(3), json!(4), json!(5)]);
}

#[tokio::test]
async fn test_load_all_exhausts_the_cursor() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);

    let rows = list.load_all().await.unwrap();
    assert_eq!(rows.len(), 5);
    assert!(!list.has_next());
}

// ============================================================================
// Column access
// ============================================================================

#[tokio::test]
async fn test_column_access_over_materialized_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Biology"},
            {"id": 2},
            {"id": 3, "name": "Chemistry"},
        ])))
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);
    list.load_all().await.unwrap();

    assert_eq!(
        list.column("name").unwrap(),
        vec![json!("Biology"), json!(null), json!("Chemistry")]
    );

    let err = list.column("missing_everywhere").unwrap_err();
    assert!(matches!(err, Error::ColumnNotFound { .. }));
}

#[tokio::test]
async fn test_column_access_does_not_grow() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(0)
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let list = courses(&requester);

    // Empty materialized prefix: the column exists on no record
    assert!(list.column("id").is_err());
    assert!(list.has_next());
}

// ============================================================================
// Iteration
// ============================================================================

#[tokio::test]
async fn test_iteration_yields_all_records_in_remote_order() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);

    let mut ids = Vec::new();
    let mut iter = list.iter();
    while let Some(record) = iter.next().await.unwrap() {
        ids.push(record["id"].clone());
    }
    assert_eq!(
        ids,
        vec![json!(1), json!(2), json!(3), json!(4), json!(5)]
    );

    // Restarting replays the cache; the expect(1) mocks verify no page is
    // fetched twice.
    let mut count = 0;
    let mut iter = list.iter();
    while let Some(_record) = iter.next().await.unwrap() {
        count += 1;
    }
    assert_eq!(count, 5);
}

#[tokio::test]
async fn test_stream_adapter_matches_iteration() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);

    let records: Vec<_> = list
        .stream()
        .map(|r| r.unwrap())
        .collect::<Vec<_>>()
        .await;
    assert_eq!(records.len(), 5);
    assert_eq!(records[0]["id"], json!(1));
}

// ============================================================================
// Filters and parameters
// ============================================================================

#[tokio::test]
async fn test_filters_apply_to_every_page() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let requester = requester_for(&mock_server);
    let mut list: PaginatedList<Course> = PaginatedList::new(
        Arc::clone(&requester),
        ListRequest::get("/courses").filter("id", [">1", "<5"]),
    );

    // Union within the field: every record passes at least one predicate
    let rows = list.load_all().await.unwrap();
    assert_eq!(rows.len(), 5);
}

#[tokio::test]
async fn test_filter_narrows_rows_per_page() {
    let mock_server = MockServer::start().await;
    mount_two_pages(&mock_server).await;

    let requester = requester_for(&mock_server);
    let mut list: PaginatedList<Course> = PaginatedList::new(
        Arc::clone(&requester),
        ListRequest::get("/courses").filter("id", [">3"]),
    );

    let rows = list.load_all().await.unwrap();
    let ids: Vec<_> = rows.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(4), json!(5)]);
}

#[tokio::test]
async fn test_per_page_defaults_to_100() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("per_page", "100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);
    list.load_all().await.unwrap();
}

#[tokio::test]
async fn test_per_page_override() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("per_page", "25"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list: PaginatedList<Course> = PaginatedList::new(
        Arc::clone(&requester),
        ListRequest::get("/courses").per_page(25),
    );
    list.load_all().await.unwrap();
}

#[tokio::test]
async fn test_first_params_not_resent_on_later_pages() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("enrollment_type", "student"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(course_records(1..=2))
                .insert_header("link", next_link(&mock_server, "/courses?page=2").as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    // Continuation carries only what the next link encodes
    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "2"))
        .and(query_param_is_missing("enrollment_type"))
        .and(query_param_is_missing("per_page"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_records(3..=3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list: PaginatedList<Course> = PaginatedList::new(
        Arc::clone(&requester),
        ListRequest::get("/courses").param("enrollment_type", "student"),
    );

    let rows = list.load_all().await.unwrap();
    assert_eq!(rows.len(), 3);
}

// ============================================================================
// Failure behavior
// ============================================================================

#[tokio::test]
async fn test_failed_later_fetch_preserves_materialized_prefix() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param_is_missing("page"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(course_records(1..=3))
                .insert_header("link", next_link(&mock_server, "/courses?page=2").as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .and(query_param("page", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_records(4..=5)))
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);

    let err = list.get(4).await.unwrap_err();
    assert!(matches!(err, Error::HttpStatus { status: 500, .. }));

    // Earlier cached rows are intact and the cursor is still usable
    assert_eq!(list.len(), 3);
    assert!(list.has_next());

    let record = list.get(4).await.unwrap();
    assert_eq!(record["id"], json!(5));
}

// ============================================================================
// Bulk invocation
// ============================================================================

#[tokio::test]
async fn test_invoke_all_unknown_action_is_usage_error() {
    let mock_server = MockServer::start().await;
    let requester = requester_for(&mock_server);
    let list = courses(&requester);

    let err = list
        .invoke_all("frobnicate", InvokeOptions::new())
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        Error::UnknownAction { kind: "Course", .. }
    ));
    assert!(err.is_usage_error());
}

#[tokio::test]
async fn test_invoke_all_scalar_aggregates_one_column() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_records(1..=2)))
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);
    list.load_all().await.unwrap();

    let combined = list
        .invoke_all("workflow_state", InvokeOptions::new())
        .await
        .unwrap();
    assert_eq!(combined.len(), 2);
    assert_eq!(combined[0]["value"], json!("available"));
}

#[tokio::test]
async fn test_invoke_all_nested_aggregates_all_rows() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses"))
        .respond_with(ResponseTemplate::new(200).set_body_json(course_records(1..=2)))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/1/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 10, "name": "Ana"},
            {"id": 11, "name": "Ben"},
        ])))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/2/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 12, "name": "Cam"}])),
        )
        .mount(&mock_server)
        .await;

    let requester = requester_for(&mock_server);
    let mut list = courses(&requester);
    list.load_all().await.unwrap();

    let combined = list.invoke_all("users", InvokeOptions::new()).await.unwrap();
    let ids: Vec<_> = combined.iter().map(|r| r["id"].clone()).collect();
    assert_eq!(ids, vec![json!(10), json!(11), json!(12)]);
}

#[tokio::test]
async fn test_invoke_all_projectable_aggregates_one_row_each() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .mount(&mock_server)
        .await;

    for id in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/users/{id}/profile")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id, "bio": format!("user {id}")
            })))
            .mount(&mock_server)
            .await;
    }

    let requester = requester_for(&mock_server);
    let mut list: PaginatedList<User> =
        PaginatedList::new(Arc::clone(&requester), ListRequest::get("/users"));
    list.load_all().await.unwrap();

    let combined = list.invoke_all("profile", InvokeOptions::new()).await.unwrap();
    assert_eq!(combined.len(), 2);
    assert_eq!(combined[0]["bio"], json!("user 1"));
}

#[tokio::test]
async fn test_invoke_all_return_type_collects_related_projections() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/courses/7/users"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!([{"id": 1}, {"id": 2}])),
        )
        .mount(&mock_server)
        .await;

    // The per-item action still runs once per record even though its
    // result is discarded
    for id in 1..=2 {
        Mock::given(method("GET"))
            .and(path(format!("/api/v1/users/{id}/profile")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": id})))
            .expect(1)
            .mount(&mock_server)
            .await;
    }

    let requester = requester_for(&mock_server);
    let mut list: PaginatedList<User> = PaginatedList::new(
        Arc::clone(&requester),
        ListRequest::get("/courses/7/users"),
    );
    list.load_all().await.unwrap();

    let combined = list
        .invoke_all("profile", InvokeOptions::new().return_type("course"))
        .await
        .unwrap();
    assert_eq!(combined.len(), 4); // 2 items x 2 context rows
}

// ============================================================================
// Display / Debug
// ============================================================================

#[tokio::test]
async fn test_display_names_the_content_kind() {
    let mock_server = MockServer::start().await;
    let requester = requester_for(&mock_server);
    let list = courses(&requester);

    assert_eq!(list.to_string(), "<PaginatedList of type Course>");
    assert!(format!("{list:?}").contains("materialized: 0"));
}
