//! Centralized constants for the tollgate synchronization service.
//!
//! Every tunable the service exposes or relies on lives here, organized by
//! category, so limits and defaults are discoverable in one place rather
//! than scattered across call sites.
//!
//! # Modules
//!
//! - [`coordination`]: primitive defaults and wake-loop bounds
//! - [`network`]: listener defaults

pub mod coordination;
pub mod network;
