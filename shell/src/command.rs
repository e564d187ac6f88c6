use crate::env::Environment;
use crate::error::ShellError;
use std::io::{self, Read, Write};
use std::process::Stdio;

/// Status of a finished command: 0 on success, `128 + signal` for a child
/// killed by a signal.
pub type ExitCode = i32;

/// Where a spawned stage reads from.
///
/// `spawn_stage` takes this as a boxed trait object so the router can hand
/// over the terminal, and the pipeline executor the read end of the previous
/// channel, through the same call. Turning it into
/// [`Stdio`] consumes the box, which is how a pipe end leaves the parent.
pub trait Stdin: Read {
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Read + Into<Stdio>> Stdin for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// Where a spawned stage writes to: the shell's own stdout for the last
/// stage, a channel's write end for every other one.
pub trait Stdout: Write {
    fn stdio(self: Box<Self>) -> Stdio;
}

impl<T: Write + Into<Stdio>> Stdout for T {
    fn stdio(self: Box<Self>) -> Stdio {
        (*self).into()
    }
}

/// The shell's own standard input, handed to a child unchanged.
pub struct InheritedStdin;

impl Read for InheritedStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        io::stdin().read(buf)
    }
}

impl Stdin for InheritedStdin {
    fn stdio(self: Box<Self>) -> Stdio {
        Stdio::inherit()
    }
}

/// Object-safe trait for a command the shell runs in-process.
pub trait ExecutableCommand {
    /// Executes the command, writing any regular output to `stdout`.
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError>;
}

/// Factory that tries to create a command from a name and its arguments.
///
/// Returns `None` when the factory doesn't recognize the `name`.
pub trait CommandFactory {
    /// Attempt to create a command instance for the provided name and arguments.
    fn try_create(&self, name: &str, args: &[String]) -> Option<Box<dyn ExecutableCommand>>;
}
