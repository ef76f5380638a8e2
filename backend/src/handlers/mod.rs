pub mod graphql;
pub mod root;
pub mod signup;

pub use graphql::{graphiql, graphql_query};
pub use root::index;
pub use signup::signup;
