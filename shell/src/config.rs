/// Longest input line, in characters, the shell accepts.
pub const MAX_LINE_LEN: usize = 1024;

/// Printed between the working directory and the user's input.
pub const PROMPT_SUFFIX: &str = " > ";

/// Introductory message shown when the read-loop starts.
pub const BANNER: &str = "Custom Shell\nType 'help' for a list of commands or 'exit' to quit\n";

/// Acknowledgement printed by `exit`.
pub const EXIT_MESSAGE: &str = "Exiting shell...\n";

/// Tunables for an [`Interpreter`](crate::Interpreter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShellConfig {
    /// Lines longer than this are rejected without running anything.
    pub max_line_len: usize,
    /// Print [`BANNER`] before the first prompt.
    pub show_banner: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            max_line_len: MAX_LINE_LEN,
            show_banner: true,
        }
    }
}
