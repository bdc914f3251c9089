//! dosync - DigitalOcean resource reconciliation client
//!
//! Lists, paginates, maps, and reconciles remote DigitalOcean resources
//! into a local declarative model. See [`resource::sync::Synchronizer`]
//! for the two user-facing operations, discover and import.

pub mod api;
pub mod config;
pub mod error;
pub mod resource;

/// Version injected at compile time via DOSYNC_VERSION env var (set by CI/CD),
/// or "dev" for local builds.
pub const VERSION: &str = match option_env!("DOSYNC_VERSION") {
    Some(v) => v,
    None => "dev",
};
