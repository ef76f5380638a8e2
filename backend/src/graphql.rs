use actix_web::ResponseError;
use async_graphql::{Context, EmptyMutation, EmptySubscription, Object, Schema, SimpleObject, ID};
use chrono::NaiveDateTime;

use crate::db::{Store, User};
use crate::error::ServiceError;

const MAX_USERS: u32 = 100;

pub type AppSchema = Schema<QueryRoot, EmptyMutation, EmptySubscription>;

/// The store is attached as schema data; resolvers fetch it from the context.
pub fn build_schema(store: Store) -> AppSchema {
    Schema::build(QueryRoot, EmptyMutation, EmptySubscription)
        .data(store)
        .finish()
}

#[derive(SimpleObject)]
#[graphql(name = "User")]
pub struct UserNode {
    pub id: ID,
    pub name: String,
    pub email: String,
    pub created_at: Option<NaiveDateTime>,
}

impl From<User> for UserNode {
    fn from(user: User) -> Self {
        Self {
            id: ID(user.id.to_string()),
            name: user.name,
            email: user.email,
            created_at: user.created_at,
        }
    }
}

/// Server-side failures reach clients as a generic message, like the HTTP
/// error bodies; the detail only goes to the log.
fn resolver_error(err: ServiceError) -> async_graphql::Error {
    if err.status_code().is_server_error() {
        log::error!("GraphQL resolver failed: {}", err);
        async_graphql::Error::new("Internal server error")
    } else {
        async_graphql::Error::new(err.to_string())
    }
}

pub struct QueryRoot;

#[Object]
impl QueryRoot {
    /// Registered users, oldest first.
    async fn users(
        &self,
        ctx: &Context<'_>,
        #[graphql(default = 20)] limit: u32,
    ) -> async_graphql::Result<Vec<UserNode>> {
        let store = ctx.data::<Store>()?;
        let users = store
            .users()
            .list(limit.min(MAX_USERS))
            .await
            .map_err(resolver_error)?;
        Ok(users.into_iter().map(UserNode::from).collect())
    }

    async fn user(&self, ctx: &Context<'_>, id: ID) -> async_graphql::Result<Option<UserNode>> {
        let id: u64 = id.parse()?;
        let store = ctx.data::<Store>()?;
        let user = store
            .users()
            .find_by_id(id)
            .await
            .map_err(resolver_error)?;
        Ok(user.map(UserNode::from))
    }
}
