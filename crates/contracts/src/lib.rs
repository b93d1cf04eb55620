//! # Contracts
//!
//! Shared vocabulary of the logging workspace: severity levels, source locations,
//! the sink capability trait, configuration structures and the unified error type.
//! Every other crate depends on this one; reverse dependencies are prohibited.
//!
//! ## Level model
//! - `trace < debug < info < warning < error < critical < off`
//! - `replay` is a side-channel label that never takes part in threshold comparison

mod config;
mod error;
mod level;
mod location;
mod sink;

pub use config::*;
pub use error::*;
pub use level::*;
pub use location::SourceLocation;
pub use sink::*;
