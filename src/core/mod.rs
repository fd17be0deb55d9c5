// Public modules
pub mod artifact;
pub mod build;
pub mod config;
pub mod context;
pub mod error;
pub mod pipeline;
pub mod refactor;
pub mod registry;

// Re-export common types for convenience
pub use context::RepoContext;
pub use error::{Error, ErrorCode, Result};
