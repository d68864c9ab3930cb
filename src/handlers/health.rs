//! Health endpoints.

/// `GET /.well-known/ready` - readiness probe. The service holds no
/// external dependencies, so a running process is a ready process.
pub async fn ready() -> &'static str {
    "I'm ready!\n"
}
