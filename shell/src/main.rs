use anyhow::Result;
use argh::FromArgs;
use pipe_shell::config::MAX_LINE_LEN;
use pipe_shell::{Interpreter, ShellConfig, is_exit};
use std::io::{self, IsTerminal, Write};
use std::process::ExitCode;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(FromArgs)]
/// Interactive shell with built-ins and pipelines.
struct Args {
    #[argh(option, short = 'c')]
    /// run this line and exit with its status.
    command: Option<String>,

    #[argh(option, default = "MAX_LINE_LEN")]
    /// longest accepted input line, in characters.
    max_line: usize,

    #[argh(switch)]
    /// do not print the introductory message.
    no_banner: bool,
}

fn main() -> ExitCode {
    // Diagnostics go to stderr and stay off unless RUST_LOG asks for them.
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let args: Args = argh::from_env();
    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {e:?}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> Result<ExitCode> {
    let config = ShellConfig {
        max_line_len: args.max_line,
        show_banner: !args.no_banner,
    };
    let mut shell = Interpreter::new(config);

    if let Some(line) = args.command {
        if is_exit(&line) {
            return Ok(ExitCode::SUCCESS);
        }
        let status = shell.execute_line(&line);
        io::stdout().flush()?;
        return Ok(exit_code(status));
    }

    if io::stdin().is_terminal() {
        shell.repl()?;
    } else {
        shell.run_lines(io::stdin().lock())?;
    }
    Ok(ExitCode::SUCCESS)
}

fn exit_code(status: i32) -> ExitCode {
    ExitCode::from((status & 0xff) as u8)
}
