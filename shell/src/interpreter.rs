use crate::builtin::default_builtins;
use crate::command::{CommandFactory, ExitCode, InheritedStdin};
use crate::config::{BANNER, EXIT_MESSAGE, ShellConfig};
use crate::env::Environment;
use crate::error::ShellError;
use crate::external::run_single;
use crate::lexer;
use crate::parser::parse_line;
use crate::pipeline::{PipelineReport, run_pipeline};
use anyhow::Context;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use std::io::{self, BufRead, Write};

/// Which path a line took through the router.
#[derive(Debug)]
pub enum Dispatched {
    /// Blank line; nothing ran.
    Nothing,
    /// A built-in handled the line in-process.
    Builtin { name: String, code: ExitCode },
    /// One external program ran with the shell's streams.
    Single(ExitCode),
    /// Two or more stages ran connected by channels.
    Pipeline(PipelineReport),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Exit,
}

/// The command router and read-loop.
///
/// Owns the working-directory state and the set of built-ins. Lines come in
/// through [`repl`](Interpreter::repl) or [`run_lines`](Interpreter::run_lines),
/// or one at a time through [`execute_line`](Interpreter::execute_line).
///
/// Example
/// ```
/// use pipe_shell::{Interpreter, ShellConfig};
/// let mut sh = Interpreter::new(ShellConfig::default());
/// let code = sh.execute_line("true");
/// assert_eq!(code, 0);
/// ```
pub struct Interpreter {
    env: Environment,
    config: ShellConfig,
    builtins: Vec<Box<dyn CommandFactory>>,
    out: Box<dyn Write>,
    err: Box<dyn Write>,
    last_status: ExitCode,
}

impl Interpreter {
    /// Interpreter on the process's own working directory and standard streams.
    pub fn new(config: ShellConfig) -> Self {
        Self::with_streams(
            config,
            Environment::new(),
            Box::new(io::stdout()),
            Box::new(io::stderr()),
        )
    }

    /// Interpreter whose own messages (prompt, built-in output, errors) go to
    /// `out` and `err`. Child processes still use the real standard streams.
    pub fn with_streams(
        config: ShellConfig,
        env: Environment,
        out: Box<dyn Write>,
        err: Box<dyn Write>,
    ) -> Self {
        Self {
            env,
            config,
            builtins: default_builtins(),
            out,
            err,
            last_status: 0,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    /// Status of the most recent non-blank line.
    pub fn last_status(&self) -> ExitCode {
        self.last_status
    }

    /// Route one line without printing errors.
    ///
    /// A single stage goes to a built-in when its name matches one, otherwise
    /// to [`run_single`]; several stages go to [`run_pipeline`]. Pipeline stage
    /// failures are carried in the report rather than returned.
    #[tracing::instrument(level = "debug", skip(self))]
    pub fn dispatch(&mut self, line: &str) -> Result<Dispatched, ShellError> {
        let len = line.chars().count();
        if len > self.config.max_line_len {
            return Err(ShellError::LineTooLong {
                len,
                max: self.config.max_line_len,
            });
        }
        let Some(pipeline) = parse_line(line)? else {
            return Ok(Dispatched::Nothing);
        };

        if pipeline.is_single() {
            let stage = &pipeline.stages()[0];
            let builtin = self
                .builtins
                .iter()
                .find_map(|f| f.try_create(stage.program(), stage.args()));
            if let Some(cmd) = builtin {
                let code = cmd.execute(self.out.as_mut(), &mut self.env)?;
                self.out.flush()?;
                return Ok(Dispatched::Builtin {
                    name: stage.program().to_string(),
                    code,
                });
            }
            self.out.flush()?;
            let code = run_single(
                stage.argv(),
                &self.env,
                Box::new(InheritedStdin),
                Box::new(io::stdout()),
            )?;
            return Ok(Dispatched::Single(code));
        }

        self.out.flush()?;
        let report = run_pipeline(
            pipeline.stages(),
            &self.env,
            Box::new(InheritedStdin),
            Box::new(io::stdout()),
        )?;
        Ok(Dispatched::Pipeline(report))
    }

    /// Route one line, printing every failure as one line on the error stream.
    ///
    /// Returns the line's status; a blank line keeps the previous status.
    pub fn execute_line(&mut self, line: &str) -> ExitCode {
        let status = match self.dispatch(line) {
            Ok(Dispatched::Nothing) => self.last_status,
            Ok(Dispatched::Builtin { code, .. }) | Ok(Dispatched::Single(code)) => code,
            Ok(Dispatched::Pipeline(report)) => {
                for e in report.failures() {
                    self.report(e);
                }
                report.status()
            }
            Err(e) => {
                self.report(&e);
                e.exit_code()
            }
        };
        self.last_status = status;
        status
    }

    fn report(&mut self, e: &ShellError) {
        tracing::debug!(error = ?e, "command failed");
        if let Err(io_err) = writeln!(self.err, "{e}").and_then(|_| self.err.flush()) {
            tracing::warn!("failed to write error message: {}", io_err);
        }
    }

    fn handle_line(&mut self, line: &str) -> io::Result<Flow> {
        if is_exit(line) {
            self.out.write_all(EXIT_MESSAGE.as_bytes())?;
            self.out.flush()?;
            return Ok(Flow::Exit);
        }
        self.execute_line(line);
        Ok(Flow::Continue)
    }

    fn banner(&mut self) -> io::Result<()> {
        if self.config.show_banner {
            self.out.write_all(BANNER.as_bytes())?;
            self.out.flush()?;
        }
        Ok(())
    }

    /// Interactive read-loop with line editing and history.
    pub fn repl(&mut self) -> anyhow::Result<()> {
        let mut rl = DefaultEditor::new().context("failed to create line editor")?;
        self.banner()?;

        loop {
            match rl.readline(&self.env.prompt()) {
                Ok(line) => {
                    if !lexer::is_blank(&line) {
                        if let Err(e) = rl.add_history_entry(line.as_str()) {
                            tracing::warn!("failed to add history entry: {}", e);
                        }
                    }
                    if self.handle_line(&line)? == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => continue,
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err).context("failed to read input"),
            }
        }
        Ok(())
    }

    /// Plain read-loop over any line source, used when input is not a terminal.
    ///
    /// Prints the prompt before every read, stops on `exit` or end of input.
    pub fn run_lines<R: BufRead>(&mut self, mut input: R) -> anyhow::Result<()> {
        self.banner()?;
        let mut buf = String::new();
        loop {
            write!(self.out, "{}", self.env.prompt())?;
            self.out.flush()?;
            buf.clear();
            if input.read_line(&mut buf).context("failed to read input")? == 0 {
                break;
            }
            let line = lexer::strip_line_terminator(&buf);
            if self.handle_line(line)? == Flow::Exit {
                break;
            }
        }
        Ok(())
    }
}

/// `exit`, ignoring surrounding whitespace. Handled by the read-loop, never
/// dispatched.
pub fn is_exit(line: &str) -> bool {
    line.trim() == "exit"
}
