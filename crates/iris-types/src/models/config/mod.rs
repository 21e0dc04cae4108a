//! Recognized configuration keys and the runtime snapshot built from them.

mod keys;
mod runtime;

pub use keys::ConfigKey;
pub use runtime::RuntimeConfig;
