mod common;

use actix_web::http::StatusCode;
use actix_web::test;
use backend_test_support::problem_details::assert_problem_details;
use organizer_api::AppState;
use serde_json::{json, Value};

use common::{create_task, task_body};

#[actix_web::test]
async fn create_then_fetch_round_trips_the_task() {
    let app = common::memory_app().await;

    let created = create_task(
        &app,
        task_body("Write report", "2025-03-01T22:30:00-03:00", "Pending"),
    )
    .await;

    let id = created["id"].as_i64().expect("numeric id");
    assert!(id > 0);
    assert_eq!(created["title"], "Write report");
    assert_eq!(created["status"], "Pending");
    // stored in UTC
    assert_eq!(created["date"], "2025-03-02T01:30:00Z");

    let req = test::TestRequest::get()
        .uri(&format!("/api/tasks/{id}"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let fetched: Value = test::read_body_json(resp).await;
    assert_eq!(fetched, created);
}

#[actix_web::test]
async fn status_and_description_default_when_omitted() {
    let app = common::memory_app().await;

    let created = create_task(
        &app,
        json!({ "title": "Call Ana", "date": "2025-05-05T09:00:00Z" }),
    )
    .await;

    assert_eq!(created["status"], "Pending");
    assert_eq!(created["description"], "");
}

#[actix_web::test]
async fn list_is_ordered_and_filterable() {
    let app = common::memory_app().await;

    create_task(&app, task_body("Buy milk", "2025-03-01T10:00:00Z", "Pending")).await;
    create_task(&app, task_body("Pay rent", "2025-03-02T10:00:00Z", "Finished")).await;
    create_task(&app, task_body("Buy stamps", "2025-03-02T23:59:00Z", "Pending")).await;

    let list = |uri: &'static str| {
        let app = &app;
        async move {
            let req = test::TestRequest::get().uri(uri).to_request();
            let resp = test::call_service(app, req).await;
            assert_eq!(resp.status(), StatusCode::OK, "{uri}");
            let body: Vec<Value> = test::read_body_json(resp).await;
            body.into_iter()
                .map(|t| t["title"].as_str().unwrap_or_default().to_string())
                .collect::<Vec<_>>()
        }
    };

    assert_eq!(
        list("/api/tasks").await,
        ["Buy milk", "Pay rent", "Buy stamps"]
    );
    assert_eq!(list("/api/tasks?title=Buy").await, ["Buy milk", "Buy stamps"]);
    assert_eq!(list("/api/tasks?status=Finished").await, ["Pay rent"]);
    assert_eq!(
        list("/api/tasks?date=2025-03-02").await,
        ["Pay rent", "Buy stamps"]
    );
    assert_eq!(
        list("/api/tasks?date=2025-03-02&status=Pending").await,
        ["Buy stamps"]
    );
    assert!(list("/api/tasks?date=2024-01-01").await.is_empty());
}

async fn titles_for<S>(app: &S, uri: &str) -> Vec<String>
where
    S: actix_web::dev::Service<
        actix_http::Request,
        Response = actix_web::dev::ServiceResponse,
        Error = actix_web::Error,
    >,
{
    let resp = test::call_service(app, test::TestRequest::get().uri(uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::OK, "{uri}");
    let body: Vec<Value> = test::read_body_json(resp).await;
    body.into_iter()
        .map(|t| t["title"].as_str().unwrap_or_default().to_string())
        .collect()
}

#[actix_web::test]
async fn title_filter_matches_wildcards_literally_and_ignores_case() {
    let app = common::memory_app().await;

    for title in ["100% done", "1000 things", "a_b", "axb", "Quarterly Review"] {
        create_task(&app, task_body(title, "2025-03-01T10:00:00Z", "Pending")).await;
    }

    assert_eq!(titles_for(&app, "/api/tasks?title=100%25").await, ["100% done"]);
    assert_eq!(titles_for(&app, "/api/tasks?title=a_b").await, ["a_b"]);
    assert_eq!(
        titles_for(&app, "/api/tasks?title=quarterly%20REVIEW").await,
        ["Quarterly Review"]
    );
}

#[actix_web::test]
async fn date_filter_uses_the_utc_calendar_day() {
    let app = common::memory_app().await;

    // 23:30 at -03:00 is 02:30 UTC the next day
    create_task(&app, task_body("Late call", "2025-03-01T23:30:00-03:00", "Pending")).await;
    create_task(&app, task_body("Midnight", "2025-03-02T00:00:00Z", "Pending")).await;
    create_task(&app, task_body("Next day", "2025-03-03T00:00:00Z", "Pending")).await;

    assert_eq!(
        titles_for(&app, "/api/tasks?date=2025-03-02").await,
        ["Late call", "Midnight"]
    );
    assert!(titles_for(&app, "/api/tasks?date=2025-03-01").await.is_empty());
    assert_eq!(titles_for(&app, "/api/tasks?date=2025-03-03").await, ["Next day"]);
}

#[actix_web::test]
async fn update_replaces_fields() {
    let app = common::memory_app().await;
    let created = create_task(&app, task_body("Draft", "2025-03-01T10:00:00Z", "Pending")).await;
    let id = created["id"].as_i64().unwrap();

    let req = test::TestRequest::put()
        .uri(&format!("/api/tasks/{id}"))
        .set_json(task_body("Final", "2025-04-01T08:00:00Z", "Finished"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let updated: Value = test::read_body_json(resp).await;
    assert_eq!(updated["id"], id);
    assert_eq!(updated["title"], "Final");
    assert_eq!(updated["status"], "Finished");
    assert_eq!(updated["date"], "2025-04-01T08:00:00Z");
}

#[actix_web::test]
async fn delete_removes_the_task() {
    let app = common::memory_app().await;
    let created = create_task(&app, task_body("Temp", "2025-03-01T10:00:00Z", "Pending")).await;
    let uri = format!("/api/tasks/{}", created["id"]);

    let resp =
        test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = test::call_service(&app, test::TestRequest::get().uri(&uri).to_request()).await;
    assert_problem_details(resp, "TASK_NOT_FOUND", StatusCode::NOT_FOUND).await;

    let resp =
        test::call_service(&app, test::TestRequest::delete().uri(&uri).to_request()).await;
    assert_problem_details(resp, "TASK_NOT_FOUND", StatusCode::NOT_FOUND).await;
}

#[actix_web::test]
async fn unknown_ids_are_404_on_get_and_put() {
    let app = common::memory_app().await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get().uri("/api/tasks/999").to_request(),
    )
    .await;
    let problem = assert_problem_details(resp, "TASK_NOT_FOUND", StatusCode::NOT_FOUND).await;
    assert_eq!(problem.detail, "Task 999 not found");

    let req = test::TestRequest::put()
        .uri("/api/tasks/999")
        .set_json(task_body("Ghost", "2025-03-01T10:00:00Z", "Pending"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "TASK_NOT_FOUND", StatusCode::NOT_FOUND).await;
}

#[actix_web::test]
async fn malformed_ids_are_rejected() {
    let app = common::memory_app().await;

    for uri in ["/api/tasks/abc", "/api/tasks/0", "/api/tasks/-4"] {
        let resp = test::call_service(&app, test::TestRequest::get().uri(uri).to_request()).await;
        assert_problem_details(resp, "INVALID_TASK_ID", StatusCode::BAD_REQUEST).await;
    }
}

#[actix_web::test]
async fn blank_titles_fail_validation() {
    let app = common::memory_app().await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(task_body("   ", "2025-03-01T10:00:00Z", "Pending"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let problem = assert_problem_details(resp, "VALIDATION_ERROR", StatusCode::BAD_REQUEST).await;
    assert_eq!(problem.detail, "Title must not be blank");
}

#[actix_web::test]
async fn malformed_bodies_are_bad_requests() {
    let app = common::memory_app().await;

    let bodies = [
        r#"{"title": "x", "date": "#.to_string(),
        r#"{"title": "x", "date": "yesterday"}"#.to_string(),
        r#"{"title": "x", "date": "2025-03-01T10:00:00Z", "status": "Archived"}"#.to_string(),
    ];
    for body in bodies {
        let req = test::TestRequest::post()
            .uri("/api/tasks")
            .insert_header(("content-type", "application/json"))
            .set_payload(body)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_problem_details(resp, "BAD_REQUEST", StatusCode::BAD_REQUEST).await;
    }
}

#[actix_web::test]
async fn bad_query_strings_are_problem_details() {
    let app = common::memory_app().await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/tasks?date=03/02/2025")
            .to_request(),
    )
    .await;
    assert_problem_details(resp, "INVALID_DATE", StatusCode::BAD_REQUEST).await;

    let resp = test::call_service(
        &app,
        test::TestRequest::get()
            .uri("/api/tasks?status=Archived")
            .to_request(),
    )
    .await;
    assert_problem_details(resp, "BAD_REQUEST", StatusCode::BAD_REQUEST).await;
}

#[actix_web::test]
async fn data_endpoints_are_503_without_a_database() {
    let app = common::app_for(AppState::without_db()).await;

    let resp = test::call_service(&app, test::TestRequest::get().uri("/api/tasks").to_request())
        .await;
    assert_problem_details(resp, "DB_UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE).await;

    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(task_body("Offline", "2025-03-01T10:00:00Z", "Pending"))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_problem_details(resp, "DB_UNAVAILABLE", StatusCode::SERVICE_UNAVAILABLE).await;
}
