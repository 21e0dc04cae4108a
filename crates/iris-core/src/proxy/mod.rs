//! Proxy module - guarded generation endpoints in front of three upstream providers
//!
//! Request flow: guard -> provider router -> adapter -> normalizer/scrubber.

pub mod common;
pub mod handlers;
pub mod mappers;
pub mod middleware;
pub mod provider_router;
pub mod providers;
pub mod server;

pub use common::SecretScrubber;
pub use provider_router::{LogicalEndpoint, ProviderRoute};
pub use providers::PollSettings;
pub use server::{build_proxy_router, AppState, AxumServer, ServerStartConfig};
