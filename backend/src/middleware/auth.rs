use actix_web::{
    body::{EitherBody, MessageBody},
    dev::{ServiceRequest, ServiceResponse},
    http::header::HeaderMap,
    middleware::Next,
    web, HttpResponse,
};

use crate::config::SharedSecret;

pub const SIGNUP_SECRET_HEADER: &str = "X-Custom-Header";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Allow,
    Reject,
}

/// Admits a request only when `X-Custom-Header` carries exactly the shared
/// secret, byte for byte.
#[derive(Debug, Clone)]
pub struct AuthGate {
    secret: SharedSecret,
}

impl AuthGate {
    pub fn new(secret: SharedSecret) -> Self {
        Self { secret }
    }

    pub fn admit(&self, headers: &HeaderMap) -> Admission {
        match headers.get(SIGNUP_SECRET_HEADER) {
            Some(value) if value.as_bytes() == self.secret.as_bytes() => Admission::Allow,
            _ => Admission::Reject,
        }
    }
}

/// Rejected requests get an empty 403 and never reach the wrapped service.
/// The header value is not logged.
pub async fn signup_gate<B: MessageBody>(
    req: ServiceRequest,
    next: Next<B>,
) -> Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
    let admission = match req.app_data::<web::Data<AuthGate>>() {
        Some(gate) => gate.admit(req.headers()),
        None => {
            log::error!("Signup gate is not configured; rejecting request");
            Admission::Reject
        }
    };

    if admission == Admission::Reject {
        log::warn!("Rejected {} {}", req.method(), req.path());
        let response = HttpResponse::Forbidden().finish();
        return Ok(req.into_response(response).map_into_right_body());
    }

    next.call(req).await.map(ServiceResponse::map_into_left_body)
}
