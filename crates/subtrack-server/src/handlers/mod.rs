//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod dashboard;
pub mod due;
pub mod export;
pub mod insights;
pub mod subscriptions;
pub mod summary;

// Re-export all handlers for use in router
pub use dashboard::*;
pub use due::*;
pub use export::*;
pub use insights::*;
pub use subscriptions::*;
pub use summary::*;
