//! Call-site information attached to every log line.

/// Where a log call was made.
///
/// Normally built by the `source_location!` macro of the dispatcher crate,
/// which fills in `file!()`, `line!()` and the enclosing function path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    /// Source file path as given by `file!()`
    pub file: &'static str,
    /// Fully qualified path of the enclosing function
    pub function: &'static str,
    /// Source line
    pub line: u32,
}

impl SourceLocation {
    pub const fn new(file: &'static str, function: &'static str, line: u32) -> Self {
        Self {
            file,
            function,
            line,
        }
    }
}
