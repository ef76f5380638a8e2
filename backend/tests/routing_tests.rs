mod common;

use actix_web::{http::StatusCode, test, web, App};
use backend::routes;
use common::CountingRegistrar;
use std::sync::Arc;

#[actix_web::test]
async fn test_root_returns_hello_world() {
    let app = test::init_service(
        App::new().configure(routes::mount(common::app_state(Arc::default()))),
    )
    .await;

    let req = test::TestRequest::get().uri("/").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let body = test::read_body(resp).await;
    assert_eq!(body, web::Bytes::from_static(b"Hello, World!"));
}

#[actix_web::test]
async fn test_graphiql_targets_query_endpoint() {
    let app = test::init_service(
        App::new().configure(routes::mount(common::app_state(Arc::default()))),
    )
    .await;

    let req = test::TestRequest::get().uri("/graphiql").to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp
        .headers()
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(content_type.starts_with("text/html"));

    let body = test::read_body(resp).await;
    let page = String::from_utf8(body.to_vec()).unwrap();
    assert!(page.contains("/query"));
}

#[actix_web::test]
async fn test_query_is_delegated_to_executor() {
    let app = test::init_service(
        App::new().configure(routes::mount(common::app_state(Arc::default()))),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(serde_json::json!({ "query": "{ __typename }" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert!(resp.status().is_success());
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["__typename"], "QueryRoot");
}

#[actix_web::test]
async fn test_executor_reports_its_own_errors() {
    let app = test::init_service(
        App::new().configure(routes::mount(common::app_state(Arc::default()))),
    )
    .await;

    let req = test::TestRequest::post()
        .uri("/query")
        .set_json(serde_json::json!({ "query": "{ noSuchField }" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(body["errors"].is_array());
}

#[actix_web::test]
async fn test_open_routes_ignore_signup_header() {
    let registrar = Arc::new(CountingRegistrar::default());
    let app = test::init_service(
        App::new().configure(routes::mount(common::app_state(registrar.clone()))),
    )
    .await;

    for header in [None, Some("wrong")] {
        let mut root = test::TestRequest::get().uri("/");
        let mut graphiql = test::TestRequest::get().uri("/graphiql");
        let mut query = test::TestRequest::post()
            .uri("/query")
            .set_json(serde_json::json!({ "query": "{ __typename }" }));

        if let Some(value) = header {
            root = root.insert_header(("X-Custom-Header", value));
            graphiql = graphiql.insert_header(("X-Custom-Header", value));
            query = query.insert_header(("X-Custom-Header", value));
        }

        for req in [root, graphiql, query] {
            let resp = test::call_service(&app, req.to_request()).await;
            assert!(resp.status().is_success(), "header {:?}", header);
        }
    }

    assert_eq!(registrar.calls(), 0);
}

#[actix_web::test]
async fn test_unknown_route_is_not_found() {
    let app = test::init_service(
        App::new().configure(routes::mount(common::app_state(Arc::default()))),
    )
    .await;

    for uri in ["/nope", "/signups", "/query/extra"] {
        let req = test::TestRequest::get().uri(uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND, "uri {}", uri);
    }
}
