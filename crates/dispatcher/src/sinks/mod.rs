//! Sink implementations
//!
//! Contains ConsoleSink, RotatingFileSink, and MemorySink.

mod console;
mod file;
mod memory;

pub use self::console::{ConsoleSink, ConsoleTarget};
pub use self::file::{rotated_path, RotatingFileSink};
pub use self::memory::MemorySink;
