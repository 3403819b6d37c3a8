use slog::Logger;

/// Highest tower ceiling an index accepts.
pub const MAX_LEVEL_LIMIT: usize = 32;

pub const DEFAULT_MAX_LEVEL: usize = 12;

pub const DEFAULT_DELIMITER: char = ':';

#[derive(Clone)]
pub struct Options {
    /// Ceiling on the tower height of every record, fixed for the lifetime
    /// of the index. Levels are 0-indexed, so a record occupies at most
    /// `max_level + 1` lanes.
    /// Clipped into `1..=MAX_LEVEL_LIMIT`.
    /// Default: 12
    pub max_level: usize,
    /// Separator between key and value in the dump format.
    /// The key ends at the first occurrence, the value runs to end of line.
    /// A newline can not be used and falls back to the default.
    /// Default: ':'
    pub delimiter: char,
    /// Diagnostics sink. When `None` the global `slog_scope` logger is used,
    /// which discards everything unless the application installed one.
    /// Default: None
    pub info_log: Option<Logger>,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            max_level: DEFAULT_MAX_LEVEL,
            delimiter: DEFAULT_DELIMITER,
            info_log: None,
        }
    }
}

impl Options {
    pub fn with_max_level(max_level: usize) -> Self {
        Options {
            max_level,
            ..Default::default()
        }
    }
}

fn clip_to_range<T>(v: &mut T, min: T, max: T)
where
    T: PartialOrd,
{
    if *v > max {
        *v = max;
    } else if *v < min {
        *v = min;
    }
}

pub(crate) fn sanitize_options(src_opt: Options) -> Options {
    let mut opt = src_opt;
    clip_to_range(&mut opt.max_level, 1, MAX_LEVEL_LIMIT);
    if opt.delimiter == '\n' || opt.delimiter == '\r' {
        opt.delimiter = DEFAULT_DELIMITER;
    }
    opt
}
