// Handlers - API endpoint handlers

pub mod common;
pub mod generate;
pub mod health;

pub use generate::handle_generation;
pub use health::handle_health;
