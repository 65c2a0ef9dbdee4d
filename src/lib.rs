//! Promptify
//!
//! Turns a free-text playlist prompt into two ranked track lists, one from an external
//! recommendation service and one from a static local catalog, and collects blind votes on
//! which list is better.

pub mod app;
pub mod catalog;
pub mod config;
pub mod external;
pub mod features;
pub mod harness;
pub mod interpretation;
pub mod pipeline;
pub mod ranking;
pub mod retry_policy;
pub mod seeds;
pub mod server;
pub mod votes;

// Re-export commonly used types for convenience
pub use catalog::{load_catalog, CatalogStore};
pub use harness::ComparisonHarness;
pub use server::{run_server, RequestsLoggingLevel};
