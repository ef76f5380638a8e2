pub mod auth;

pub use auth::{signup_gate, Admission, AuthGate, SIGNUP_SECRET_HEADER};
