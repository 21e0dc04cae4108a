pub mod config;
pub mod logger;
pub mod static_files;

pub use config::ConfigProvider;
