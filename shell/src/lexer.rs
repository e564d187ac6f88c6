//! Lexical splitting of a raw input line.
//!
//! The shell has no quoting, escaping or expansion: a line is cut on the pipe
//! character into stages, and every stage is cut on whitespace into tokens.
//! Quote characters are ordinary token characters.

/// Separator between pipeline stages.
pub const PIPE: char = '|';

/// Remove one trailing line terminator (`\n` or `\r\n`), if present.
pub fn strip_line_terminator(line: &str) -> &str {
    line.strip_suffix('\n')
        .map(|l| l.strip_suffix('\r').unwrap_or(l))
        .unwrap_or(line)
}

/// Split `line` on [`PIPE`] into one slice per stage.
///
/// Whitespace inside a stage is preserved and empty stages are kept, so
/// `"ls |"` gives two stages, the second one blank. Callers decide what an
/// empty stage means.
pub fn split_pipeline(line: &str) -> Vec<&str> {
    line.split(PIPE).collect()
}

/// Split one stage into argument tokens on runs of whitespace.
///
/// Leading, trailing and repeated whitespace never produce empty tokens, and
/// a trailing line terminator is dropped along with other whitespace.
pub fn split_tokens(stage: &str) -> Vec<String> {
    strip_line_terminator(stage)
        .split_whitespace()
        .map(str::to_owned)
        .collect()
}

/// `true` when the line holds nothing but whitespace.
pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}
