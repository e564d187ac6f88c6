use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::command::ExitCode;

/// Everything that can go wrong while running one input line.
///
/// None of these are fatal to the shell: the router prints the error as a
/// single line on its error stream and shows the prompt again.
#[derive(Debug, Error)]
pub enum ShellError {
    /// A built-in was invoked without its required operand.
    #[error("{command}: missing argument")]
    MissingArgument { command: &'static str },

    /// `cd` could not switch to the requested directory.
    #[error("cd: {}: {source}", path.display())]
    DirectoryChange {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The program name did not resolve to anything on the search path.
    #[error("{program}: command not found")]
    ProgramNotFound { program: String },

    /// The program was found but could not be executed.
    #[error("Error executing command {program}: {source}")]
    Exec {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The child process could not be created at all.
    #[error("Fork failed for {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// Waiting on a spawned child failed.
    #[error("wait failed for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: io::Error,
    },

    /// A stage had no tokens, e.g. `ls |` or a bare `|`.
    #[error("empty command in pipeline stage {stage}")]
    EmptyCommand { stage: usize },

    /// The input line exceeds the configured limit.
    #[error("input line too long: {len} characters (limit {max})")]
    LineTooLong { len: usize, max: usize },

    /// A stage needed a byte channel and the OS refused to create one.
    #[error("pipe: {0}")]
    Pipe(#[source] io::Error),

    #[error(transparent)]
    Io(#[from] io::Error),
}

impl ShellError {
    /// Status recorded for a command that never ran, following the usual
    /// shell conventions (127 not found, 126 not executable).
    pub fn exit_code(&self) -> ExitCode {
        match self {
            ShellError::ProgramNotFound { .. } => 127,
            ShellError::Exec { .. } => 126,
            ShellError::EmptyCommand { .. } => 2,
            _ => 1,
        }
    }
}
