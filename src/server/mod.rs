//! HTTP server surface.

mod router;

pub use router::build_router;
