use crate::command::{ExitCode, Stdin, Stdout};
use crate::env::Environment;
use crate::error::ShellError;
use crate::parser::Stage;
use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, ExitStatus};

/// Run one program with the given streams and wait for it.
///
/// Standard error is always inherited. The call returns only after the child
/// has been reaped, so no zombie survives it. An empty `argv` is reported as
/// [`ShellError::EmptyCommand`] without spawning anything.
#[tracing::instrument(level = "debug", skip_all, fields(program = argv.first().map(String::as_str).unwrap_or("")))]
pub fn run_single(
    argv: &[String],
    env: &Environment,
    stdin: Box<dyn Stdin>,
    stdout: Box<dyn Stdout>,
) -> Result<ExitCode, ShellError> {
    let stage = Stage::new(argv.to_vec(), 1)?;
    let mut child = spawn_stage(&stage, env, stdin, stdout)?;
    let code = reap(&stage, &mut child)?;
    tracing::debug!(pid = child.id(), code, "reaped");
    Ok(code)
}

/// Spawn `stage` with the given standard input and output.
///
/// Both stream handles are moved into the `Command`, which is dropped before
/// this returns; the parent keeps no copy of either endpoint afterwards.
pub(crate) fn spawn_stage(
    stage: &Stage,
    env: &Environment,
    stdin: Box<dyn Stdin>,
    stdout: Box<dyn Stdout>,
) -> Result<Child, ShellError> {
    let program = resolve_program(env, stage.program())?;
    let mut cmd = Command::new(&program);
    set_arg0(&mut cmd, stage.program());
    cmd.args(stage.args())
        .current_dir(env.current_dir())
        .stdin(stdin.stdio())
        .stdout(stdout.stdio());
    let child = cmd
        .spawn()
        .map_err(|source| spawn_error(stage.program(), source))?;
    tracing::debug!(pid = child.id(), program = %program.display(), "spawned");
    Ok(child)
}

/// Wait for `child` exactly once and translate its status.
pub(crate) fn reap(stage: &Stage, child: &mut Child) -> Result<ExitCode, ShellError> {
    let status = child.wait().map_err(|source| ShellError::Wait {
        program: stage.program().to_string(),
        source,
    })?;
    Ok(exit_code(status))
}

/// Locate `name` for execution, or report it as not found.
pub(crate) fn resolve_program(env: &Environment, name: &str) -> Result<PathBuf, ShellError> {
    find_command_path(env.search_path(), env.current_dir(), Path::new(name)).ok_or_else(|| {
        ShellError::ProgramNotFound {
            program: name.to_string(),
        }
    })
}

fn spawn_error(program: &str, source: io::Error) -> ShellError {
    let program = program.to_string();
    match source.kind() {
        io::ErrorKind::NotFound => ShellError::ProgramNotFound { program },
        // fork itself ran out of processes or memory
        io::ErrorKind::WouldBlock | io::ErrorKind::OutOfMemory => {
            ShellError::Spawn { program, source }
        }
        _ => ShellError::Exec { program, source },
    }
}

#[cfg(unix)]
fn set_arg0(cmd: &mut Command, name: &str) {
    use std::os::unix::process::CommandExt;
    cmd.arg0(name);
}

#[cfg(not(unix))]
fn set_arg0(_cmd: &mut Command, _name: &str) {}

/// Map a child's status to a shell exit code.
pub fn exit_code(status: ExitStatus) -> ExitCode {
    match status.code() {
        Some(x) => x,
        None => terminated_by_signal(status),
    }
}

#[cfg(unix)]
fn terminated_by_signal(exit_status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = ExitStatusExt::signal(&exit_status) {
        128 + signal
    } else {
        -1
    }
}

#[cfg(not(unix))]
fn terminated_by_signal(_exit_status: ExitStatus) -> i32 {
    -1
}

/// Resolve a command path the way a typical shell would.
///
/// Behavior:
/// - Absolute path: returns it if it names a file.
/// - Relative path with a separator (e.g. `bin/sh`, `./foo`): resolved against `cwd`.
/// - Single path component: searched in each directory of `search_paths` (PATH),
///   relative PATH entries again taken against `cwd`; the first file wins.
/// - Empty path, or no PATH for a bare name: `None`.
pub fn find_command_path(search_paths: Option<&OsStr>, cwd: &Path, path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    if path.is_absolute() {
        return find_by_path(path.to_path_buf());
    }
    if path.components().count() > 1 {
        return find_by_path(cwd.join(path));
    }
    std::env::split_paths(search_paths?)
        .map(|dir| cwd.join(dir).join(path))
        .find_map(find_by_path)
}

fn find_by_path(path: PathBuf) -> Option<PathBuf> {
    if path.is_file() { Some(path) } else { None }
}
