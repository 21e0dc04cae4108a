use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "iris-server",
    about = "Camera Iris - static web app and media-generation proxy",
    version = env!("CARGO_PKG_VERSION"),
    author
)]
pub struct Cli {
    #[arg(short, long, help = "Port to listen on (default: PORT from config, then 8080)")]
    pub port: Option<u16>,

    #[arg(long, default_value = "127.0.0.1", help = "Address to bind")]
    pub host: String,

    #[arg(long, default_value = "./public", help = "Directory served as the web app")]
    pub public_dir: PathBuf,

    #[arg(long, default_value = ".", help = "Directory holding .env and the key files")]
    pub config_dir: PathBuf,

    #[arg(short, long, default_value = "info", help = "Log filter used when RUST_LOG is unset")]
    pub log_level: String,

    #[arg(long, default_value = "120", help = "Upstream request timeout in seconds")]
    pub request_timeout: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["iris-server"]).expect("parse");
        assert_eq!(cli.port, None);
        assert_eq!(cli.host, "127.0.0.1");
        assert_eq!(cli.public_dir, PathBuf::from("./public"));
        assert_eq!(cli.config_dir, PathBuf::from("."));
        assert_eq!(cli.request_timeout, 120);
    }

    #[test]
    fn test_overrides() {
        let cli = Cli::try_parse_from([
            "iris-server",
            "-p",
            "9090",
            "--host",
            "0.0.0.0",
            "--public-dir",
            "/srv/iris",
            "-l",
            "iris_core=debug",
        ])
        .expect("parse");
        assert_eq!(cli.port, Some(9090));
        assert_eq!(cli.host, "0.0.0.0");
        assert_eq!(cli.public_dir, PathBuf::from("/srv/iris"));
        assert_eq!(cli.log_level, "iris_core=debug");
    }
}
