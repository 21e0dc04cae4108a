// Middleware module - Axum middleware

pub mod cors;
pub mod guard;

pub use cors::apply_cors_headers;
pub use guard::api_guard;
