//! Static asset serving from the public directory.
//!
//! Traversal attempts are answered with 400 so "unsafe" is distinguishable
//! from "absent" (404).

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use percent_encoding::percent_decode_str;
use tokio_util::io::ReaderStream;

const INDEX_DOCUMENT: &str = "/index.html";
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

const MIME_TYPES: &[(&str, &str)] = &[
    ("html", "text/html; charset=utf-8"),
    ("css", "text/css; charset=utf-8"),
    ("js", "text/javascript; charset=utf-8"),
    ("svg", "image/svg+xml"),
    ("png", "image/png"),
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("webp", "image/webp"),
    ("mp4", "video/mp4"),
    ("json", "application/json; charset=utf-8"),
];

/// Outcome of mapping a request path onto the public root.
#[derive(Debug, PartialEq, Eq)]
pub enum StaticLookup {
    /// Resolved path escapes the root.
    Unsafe,
    /// Nothing servable at the resolved path (absent, directory, unreadable).
    Missing,
    Found { path: PathBuf, content_type: &'static str, len: u64 },
}

#[derive(Debug, Clone)]
pub struct StaticFiles {
    root: PathBuf,
}

impl StaticFiles {
    pub fn new(root: impl AsRef<Path>) -> Self {
        let root = root.as_ref();
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir().map(|cwd| cwd.join(root)).unwrap_or_else(|_| root.to_path_buf())
        };
        Self { root: normalize(&absolute) }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Join `request_path` onto the root and normalize it lexically.
    ///
    /// Returns `None` when the normalized path is not contained in the root.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        let request_path = if request_path == "/" { INDEX_DOCUMENT } else { request_path };
        let decoded = percent_decode_str(request_path).decode_utf8_lossy();

        let mut joined = self.root.clone();
        for segment in decoded.split(&['/', '\\'][..]) {
            match segment {
                "" | "." => {},
                ".." => {
                    if !joined.pop() {
                        return None;
                    }
                },
                other => joined.push(other),
            }
        }

        joined.starts_with(&self.root).then_some(joined)
    }

    pub async fn lookup(&self, request_path: &str) -> StaticLookup {
        let Some(path) = self.resolve(request_path) else {
            return StaticLookup::Unsafe;
        };

        match tokio::fs::metadata(&path).await {
            Ok(meta) if meta.is_file() => {
                let content_type = content_type_for(&path);
                StaticLookup::Found { path, content_type, len: meta.len() }
            },
            _ => StaticLookup::Missing,
        }
    }
}

/// MIME type by extension, case-insensitive; unknown extensions are binary.
pub fn content_type_for(path: &Path) -> &'static str {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return FALLBACK_CONTENT_TYPE;
    };
    let ext = ext.to_ascii_lowercase();
    MIME_TYPES
        .iter()
        .find(|(known, _)| *known == ext)
        .map(|(_, mime)| *mime)
        .unwrap_or(FALLBACK_CONTENT_TYPE)
}

fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                out.pop();
            },
            other => out.push(other.as_os_str()),
        }
    }
    out
}

fn plain_text(status: StatusCode, message: &'static str) -> Response {
    (status, [(header::CONTENT_TYPE, "text/plain; charset=utf-8")], message).into_response()
}

/// Fallback handler: everything that is not an API route.
pub async fn serve_static(State(files): State<Arc<StaticFiles>>, uri: Uri) -> Response {
    match files.lookup(uri.path()).await {
        StaticLookup::Unsafe => {
            tracing::warn!("Rejected traversal attempt: {}", uri.path());
            plain_text(StatusCode::BAD_REQUEST, "Bad Request")
        },
        StaticLookup::Missing => plain_text(StatusCode::NOT_FOUND, "Not Found"),
        StaticLookup::Found { path, content_type, len } => match tokio::fs::File::open(&path).await {
            Ok(file) => (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, content_type.to_string()),
                    (header::CONTENT_LENGTH, len.to_string()),
                ],
                Body::from_stream(ReaderStream::new(file)),
            )
                .into_response(),
            Err(e) => {
                tracing::debug!("Static file vanished before open {}: {}", path.display(), e);
                plain_text(StatusCode::NOT_FOUND, "Not Found")
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn fixture() -> (TempDir, StaticFiles) {
        let dir = TempDir::new().expect("tempdir");
        std::fs::write(dir.path().join("index.html"), "<h1>iris</h1>").expect("write index");
        std::fs::create_dir_all(dir.path().join("assets")).expect("mkdir");
        std::fs::write(dir.path().join("assets/app.JS"), "console.log(1)").expect("write js");
        let files = StaticFiles::new(dir.path());
        (dir, files)
    }

    #[test]
    fn test_root_maps_to_index() {
        let (_dir, files) = fixture();
        assert_eq!(files.resolve("/"), Some(files.root().join("index.html")));
    }

    #[test]
    fn test_traversal_is_unsafe() {
        let (_dir, files) = fixture();
        assert_eq!(files.resolve("/../../etc/passwd"), None);
        assert_eq!(files.resolve("/assets/../../secret.txt"), None);
        assert_eq!(files.resolve("/%2e%2e/%2e%2e/etc/passwd"), None);
        assert_eq!(files.resolve("/..%2F..%2Fetc%2Fpasswd"), None);
    }

    #[test]
    fn test_inner_parent_segments_stay_inside() {
        let (_dir, files) = fixture();
        assert_eq!(
            files.resolve("/assets/../index.html"),
            Some(files.root().join("index.html"))
        );
    }

    #[test]
    fn test_content_types() {
        assert_eq!(content_type_for(Path::new("a/index.html")), "text/html; charset=utf-8");
        assert_eq!(content_type_for(Path::new("clip.MP4")), "video/mp4");
        assert_eq!(content_type_for(Path::new("photo.jpeg")), "image/jpeg");
        assert_eq!(content_type_for(Path::new("archive.tar.gz")), "application/octet-stream");
        assert_eq!(content_type_for(Path::new("Makefile")), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_lookup_outcomes() {
        let (_dir, files) = fixture();

        match files.lookup("/assets/app.JS").await {
            StaticLookup::Found { content_type, len, .. } => {
                assert_eq!(content_type, "text/javascript; charset=utf-8");
                assert_eq!(len, 14);
            },
            other => panic!("expected Found, got {:?}", other),
        }
        assert_eq!(files.lookup("/assets").await, StaticLookup::Missing);
        assert_eq!(files.lookup("/nope.png").await, StaticLookup::Missing);
        assert_eq!(files.lookup("/../../etc/passwd").await, StaticLookup::Unsafe);
    }
}
