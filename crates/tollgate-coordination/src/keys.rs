//! Lease key generation.

use uuid::Uuid;

/// Generate an opaque lease key: 128 bits of randomness rendered as
/// hyphenated lowercase hex. Clients must treat keys as opaque strings;
/// nothing about a key is derivable from the semaphore it belongs to.
pub fn generate_key() -> String {
    Uuid::new_v4().to_string()
}
