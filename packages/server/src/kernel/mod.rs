//! Kernel module - server infrastructure and dependencies.

pub mod deps;
pub mod test_dependencies;
pub mod traits;

pub use deps::{PostgresDirectory, ServerDeps, TwilioAdapter};
pub use traits::*;
