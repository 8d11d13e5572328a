#![allow(dead_code)]

use actix_web::body::BoxBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::StatusCode;
use actix_web::test;
use organizer_api::test_support::{create_test_app_builder, memory_state};
use organizer_api::AppState;
use serde_json::{json, Value};

#[ctor::ctor]
fn init_logging() {
    backend_test_support::logging::init();
}

/// Production routes and middleware over a fresh in-memory database.
pub async fn memory_app(
) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>
{
    let state = memory_state().await.expect("in-memory state");
    app_for(state).await
}

pub async fn app_for(
    state: AppState,
) -> impl Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>
{
    create_test_app_builder(state)
        .with_prod_routes()
        .build()
        .await
}

pub fn task_body(title: &str, date: &str, status: &str) -> Value {
    json!({
        "title": title,
        "description": format!("{title} notes"),
        "date": date,
        "status": status,
    })
}

/// POST a task and return the created JSON.
pub async fn create_task<S>(app: &S, body: Value) -> Value
where
    S: Service<actix_http::Request, Response = ServiceResponse<BoxBody>, Error = actix_web::Error>,
{
    let req = test::TestRequest::post()
        .uri("/api/tasks")
        .set_json(body)
        .to_request();
    let resp = test::call_service(app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    test::read_body_json(resp).await
}
