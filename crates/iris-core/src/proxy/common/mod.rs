// Common utilities shared by the adapters and handlers

pub mod client_builder;
pub mod sanitize_error;
pub mod upstream_body;

pub use sanitize_error::SecretScrubber;
