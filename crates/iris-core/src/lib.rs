//! # Iris Core
//!
//! Proxy logic for the Camera Iris media-generation gateway.
//!
//! ```text
//! iris-core/src/
//! ├── modules/          # config provider, static files, logger
//! └── proxy/
//!     ├── middleware/   # origin/path guard, CORS headers
//!     ├── handlers/     # generation + health endpoints
//!     ├── providers/    # Nano Banana, A2E relay, Google Imagen
//!     ├── mappers/      # normalized response assembly
//!     ├── common/       # secret scrubber, upstream body, HTTP client
//!     └── server.rs     # router and server lifecycle
//! ```

pub mod error;
pub mod modules;
pub mod proxy;

pub use error::{AppError, AppResult};
pub use modules::ConfigProvider;
