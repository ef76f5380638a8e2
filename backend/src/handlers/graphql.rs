use actix_web::{get, post, web, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::graphql::AppSchema;

pub const QUERY_PATH: &str = "/query";

/// Hands the request to the executor untouched; protocol errors are the
/// executor's to report.
#[post("/query")]
pub async fn graphql_query(
    schema: web::Data<AppSchema>,
    req: GraphQLRequest,
) -> GraphQLResponse {
    schema.execute(req.into_inner()).await.into()
}

#[get("/graphiql")]
pub async fn graphiql() -> HttpResponse {
    let page = GraphiQLSource::build()
        .endpoint(QUERY_PATH)
        .title("GraphQL")
        .finish();

    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(page)
}
