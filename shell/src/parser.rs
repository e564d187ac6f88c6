use crate::error::ShellError;
use crate::lexer;

/// One program invocation: the program name followed by its arguments.
///
/// A `Stage` always holds at least one token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    argv: Vec<String>,
}

impl Stage {
    /// Build a stage from already split tokens.
    ///
    /// `position` is the 1-based place of the stage in its pipeline and is
    /// only used for the error report when `argv` is empty.
    pub fn new(argv: Vec<String>, position: usize) -> Result<Self, ShellError> {
        if argv.is_empty() {
            return Err(ShellError::EmptyCommand { stage: position });
        }
        Ok(Self { argv })
    }

    /// Tokenize `text` and build a stage from it.
    pub fn parse(text: &str, position: usize) -> Result<Self, ShellError> {
        Self::new(lexer::split_tokens(text), position)
    }

    /// `argv[0]`.
    pub fn program(&self) -> &str {
        &self.argv[0]
    }

    /// Everything after the program name.
    pub fn args(&self) -> &[String] {
        &self.argv[1..]
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }
}

/// Stages in left-to-right textual order, which is also spawn order and
/// data-flow order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    stages: Vec<Stage>,
}

impl Pipeline {
    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// `true` when there is no pipe operator in the line.
    pub fn is_single(&self) -> bool {
        self.stages.len() == 1
    }

    pub fn into_stages(self) -> Vec<Stage> {
        self.stages
    }
}

/// Turn a raw line into a [`Pipeline`].
///
/// A blank line yields `Ok(None)`. Any stage without tokens, including the
/// blank sides of a bare `|`, is an [`ShellError::EmptyCommand`].
pub fn parse_line(line: &str) -> Result<Option<Pipeline>, ShellError> {
    let line = lexer::strip_line_terminator(line);
    if lexer::is_blank(line) {
        return Ok(None);
    }
    let stages = lexer::split_pipeline(line)
        .into_iter()
        .enumerate()
        .map(|(i, text)| Stage::parse(text, i + 1))
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(Pipeline { stages }))
}
