//! Message formatter: built-in line layout, user patterns and name simplification

use std::borrow::Cow;
use std::fmt::{self, Write};
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use contracts::{Level, LogError, SourceLocation, TimeGranularity, REPLAY_LABEL};

/// Thread tag used when the calling thread never registered a name
pub const UNKNOWN_THREAD: &str = "UNKNOWN_THREAD";

/// User hook that turns a full function path into the name shown in log lines
pub type FunctionNameReplacer = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Everything a line is built from
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub level: Level,
    pub message: &'a str,
    pub location: &'a SourceLocation,
    pub thread: &'a str,
    /// Sink name the caller asked for
    pub sink: &'a str,
}

/// Base name of a source path without directories or extension.
///
/// `src/net/conn.rs` -> `conn`. Both `/` and `\` count as separators and the
/// filesystem is never consulted.
pub fn simplify_file_name(path: &str) -> &str {
    let base = path.rsplit(['/', '\\']).next().unwrap_or(path);
    match base.rfind('.') {
        Some(dot) if dot > 0 => &base[..dot],
        _ => base,
    }
}

/// Last segment of a function path, skipping closure frames.
///
/// `app::net::Conn::open::{{closure}}` -> `open`
pub fn simplify_function_name(path: &str) -> &str {
    let mut trimmed = path;
    while let Some(rest) = trimmed.strip_suffix("::{{closure}}") {
        trimmed = rest;
    }
    trimmed.rsplit("::").next().unwrap_or(trimmed)
}

/// Elapsed time rendered at the given granularity
pub fn render_elapsed(elapsed: Duration, granularity: TimeGranularity) -> Option<String> {
    match granularity {
        TimeGranularity::None => None,
        TimeGranularity::Seconds => Some(elapsed.as_secs().to_string()),
        TimeGranularity::Milliseconds => Some(format!(
            "{}.{:03}",
            elapsed.as_secs(),
            elapsed.subsec_millis()
        )),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Time,
    Level,
    File,
    Function,
    Line,
    Thread,
    Message,
    Sink,
}

impl Segment {
    fn placeholder(name: &str) -> Option<Self> {
        Some(match name {
            "time" => Self::Time,
            "level" => Self::Level,
            "file" => Self::File,
            "function" => Self::Function,
            "line" => Self::Line,
            "thread" => Self::Thread,
            "message" => Self::Message,
            "sink" => Self::Sink,
            _ => return None,
        })
    }
}

/// A parsed line template such as `{time} {level} {message}`.
///
/// Placeholders: `time`, `level`, `file`, `function`, `line`, `thread`, `message`,
/// `sink`. Literal braces are written `{{` and `}}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    source: String,
    segments: Vec<Segment>,
}

impl Pattern {
    /// # Errors
    /// [`LogError::InvalidPattern`] for unknown placeholders or unbalanced braces.
    pub fn parse(source: &str) -> Result<Self, LogError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            match c {
                '{' if chars.peek() == Some(&'{') => {
                    chars.next();
                    literal.push('{');
                }
                '{' => {
                    let mut name = String::new();
                    let mut closed = false;
                    for n in chars.by_ref() {
                        if n == '}' {
                            closed = true;
                            break;
                        }
                        name.push(n);
                    }
                    if !closed {
                        return Err(LogError::invalid_pattern(source, "unclosed '{'"));
                    }
                    let segment = Segment::placeholder(&name).ok_or_else(|| {
                        LogError::invalid_pattern(source, format!("unknown placeholder '{{{name}}}'"))
                    })?;
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                }
                '}' if chars.peek() == Some(&'}') => {
                    chars.next();
                    literal.push('}');
                }
                '}' => return Err(LogError::invalid_pattern(source, "unmatched '}'")),
                other => literal.push(other),
            }
        }
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

impl FromStr for Pattern {
    type Err = LogError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Builds log lines.
///
/// The clock is the monotonic time elapsed since the formatter was created.
#[derive(Clone)]
pub struct Formatter {
    granularity: TimeGranularity,
    started: Instant,
    default_pattern: Option<Pattern>,
    function_name_replacer: Option<FunctionNameReplacer>,
}

impl Formatter {
    pub fn new(granularity: TimeGranularity) -> Self {
        Self {
            granularity,
            started: Instant::now(),
            default_pattern: None,
            function_name_replacer: None,
        }
    }

    pub fn granularity(&self) -> TimeGranularity {
        self.granularity
    }

    pub fn set_granularity(&mut self, granularity: TimeGranularity) {
        self.granularity = granularity;
    }

    pub fn default_pattern(&self) -> Option<&Pattern> {
        self.default_pattern.as_ref()
    }

    pub fn set_default_pattern(&mut self, pattern: Option<Pattern>) {
        self.default_pattern = pattern;
    }

    pub fn set_function_name_replacer(&mut self, replacer: Option<FunctionNameReplacer>) {
        self.function_name_replacer = replacer;
    }

    pub fn timestamp(&self) -> Option<String> {
        render_elapsed(self.started.elapsed(), self.granularity)
    }

    /// Display name of a function: the replacer's output when one is set,
    /// otherwise the simplified path.
    pub fn function_name<'a>(&self, function: &'a str) -> Cow<'a, str> {
        match &self.function_name_replacer {
            Some(replace) => Cow::Owned(replace(function)),
            None => Cow::Borrowed(simplify_function_name(function)),
        }
    }

    /// Format a record with `pattern`, else the default pattern, else the built-in layout:
    ///
    /// `[<elapsed>] [<level>] <file>::<function>[<line>]{<thread>}: <message>`
    pub fn format(&self, record: &Record<'_>, pattern: Option<&Pattern>) -> String {
        match pattern.or(self.default_pattern.as_ref()) {
            Some(pattern) => self.render(pattern, record),
            None => self.render_builtin(record),
        }
    }

    /// Replay lines carry only the function and the raw message.
    pub fn format_replay(&self, function: &str, message: &str) -> String {
        format!("[{REPLAY_LABEL}] {}: {message}", self.function_name(function))
    }

    fn render_builtin(&self, record: &Record<'_>) -> String {
        let mut line = String::with_capacity(record.message.len() + 64);
        if let Some(stamp) = self.timestamp() {
            let _ = write!(line, "[{stamp}] ");
        }
        let _ = write!(
            line,
            "[{}] {}::{}[{}]{{{}}}: {}",
            record.level.label(),
            simplify_file_name(record.location.file),
            self.function_name(record.location.function),
            record.location.line,
            record.thread,
            record.message
        );
        line
    }

    fn render(&self, pattern: &Pattern, record: &Record<'_>) -> String {
        let mut line = String::with_capacity(record.message.len() + 64);
        for segment in &pattern.segments {
            match segment {
                Segment::Literal(text) => line.push_str(text),
                Segment::Time => {
                    if let Some(stamp) = self.timestamp() {
                        line.push_str(&stamp);
                    }
                }
                Segment::Level => line.push_str(record.level.label()),
                Segment::File => line.push_str(simplify_file_name(record.location.file)),
                Segment::Function => line.push_str(&self.function_name(record.location.function)),
                Segment::Line => {
                    let _ = write!(line, "{}", record.location.line);
                }
                Segment::Thread => line.push_str(record.thread),
                Segment::Message => line.push_str(record.message),
                Segment::Sink => line.push_str(record.sink),
            }
        }
        line
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter")
            .field("granularity", &self.granularity)
            .field("default_pattern", &self.default_pattern)
            .field("function_name_replacer", &self.function_name_replacer.is_some())
            .finish()
    }
}
