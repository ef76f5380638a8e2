use actix_web::{web, HttpResponse};
use serde::Serialize;

use crate::{
    accounts::{AccountRegistrar, SignUpRequest},
    db::Store,
    error::Result,
};

#[derive(Debug, Serialize)]
pub struct SignUpResponse {
    pub success: bool,
    pub id: u64,
    pub name: String,
    pub email: String,
    pub message: String,
}

// Mounted as `POST /signup` inside the gated scope.
pub async fn signup(
    req: web::Json<SignUpRequest>,
    store: web::Data<Store>,
    registrar: web::Data<dyn AccountRegistrar>,
) -> Result<HttpResponse> {
    log::info!("Signup attempt for email: {}", req.email);

    let user = registrar.register(&store, req.into_inner()).await?;

    log::info!("Created account {} for email: {}", user.id, user.email);

    let response = SignUpResponse {
        success: true,
        id: user.id,
        name: user.name,
        email: user.email,
        message: "Account created".to_string(),
    };

    Ok(HttpResponse::Created().json(response))
}
