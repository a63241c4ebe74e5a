//! Configuration loading and schema definitions
//!
//! `.signkit.toml` drives signing policy, repository mirrors, and the
//! pinned Android toolchain settings.

mod loader;
mod schema;

pub use loader::Config;
pub use schema::*;
