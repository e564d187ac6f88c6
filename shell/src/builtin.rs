use crate::command::{CommandFactory, ExecutableCommand, ExitCode};
use crate::env::Environment;
use crate::error::ShellError;
use std::io::Write;
use std::thread;
use std::time::Duration;

/// Fixed command reference printed by `help`.
pub const HELP_TEXT: &str = "\
List of Commands:
cd <directory>    - Change the current directory to <directory>
help              - Display this help menu
exit              - Exit the shell
sleep <seconds>   - Pause for the specified number of seconds
<command>         - Execute the specified command
<command1> | <command2> - Execute command1 and pass its output to command2
";

/// Built-in commands known to the shell at compile time.
///
/// Builtins run in-process without spawning a child. Their operands are taken
/// verbatim: nothing is treated as an option, so `cd -x` or `sleep -4` reach
/// the command as plain words.
pub(crate) trait BuiltinCommand: Sized {
    /// Canonical name of the command, e.g. "help" or "cd".
    fn name() -> &'static str;

    /// Build the command from the words after its name.
    fn from_operands(operands: &[String]) -> Self;

    /// Executes the command using the provided output stream and environment.
    fn execute(self, stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode, ShellError>;
}

impl<T: BuiltinCommand> ExecutableCommand for T {
    fn execute(
        self: Box<Self>,
        stdout: &mut dyn Write,
        env: &mut Environment,
    ) -> Result<ExitCode, ShellError> {
        tracing::debug!(builtin = T::name(), "running builtin");
        <T as BuiltinCommand>::execute(*self, stdout, env)
    }
}

/// Creates a builtin of type `T` when asked for its name.
pub(crate) struct Factory<T> {
    _phantom: std::marker::PhantomData<T>,
}

impl<T> Default for Factory<T> {
    fn default() -> Self {
        Self {
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T: BuiltinCommand + 'static> CommandFactory for Factory<T> {
    fn try_create(&self, name: &str, args: &[String]) -> Option<Box<dyn ExecutableCommand>> {
        if name != T::name() {
            return None;
        }
        Some(Box::new(T::from_operands(args)))
    }
}

/// The builtins the router consults before launching a process.
///
/// `exit` is not among them: the read-loop handles it before dispatch.
pub(crate) fn default_builtins() -> Vec<Box<dyn CommandFactory>> {
    vec![
        Box::new(Factory::<Help>::default()),
        Box::new(Factory::<Cd>::default()),
        Box::new(Factory::<Sleep>::default()),
    ]
}

/// Display the list of commands. Operands are ignored.
pub struct Help;

impl BuiltinCommand for Help {
    fn name() -> &'static str {
        "help"
    }

    fn from_operands(_operands: &[String]) -> Self {
        Help
    }

    fn execute(self, stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode, ShellError> {
        stdout.write_all(HELP_TEXT.as_bytes())?;
        Ok(0)
    }
}

/// Change the current working directory.
pub struct Cd {
    /// Absolute or relative to the current directory; extra operands are ignored.
    pub target: Option<String>,
}

impl BuiltinCommand for Cd {
    fn name() -> &'static str {
        "cd"
    }

    fn from_operands(operands: &[String]) -> Self {
        Self {
            target: operands.first().cloned(),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, env: &mut Environment) -> Result<ExitCode, ShellError> {
        let target = self
            .target
            .ok_or(ShellError::MissingArgument { command: "cd" })?;
        let new_dir = env.change_dir(&target)?;
        tracing::debug!(dir = %new_dir.display(), "changed directory");
        Ok(0)
    }
}

/// Pause the shell for a number of seconds.
pub struct Sleep {
    /// Raw operand; non-numeric input counts as zero.
    pub seconds: Option<String>,
}

impl BuiltinCommand for Sleep {
    fn name() -> &'static str {
        "sleep"
    }

    fn from_operands(operands: &[String]) -> Self {
        Self {
            seconds: operands.first().cloned(),
        }
    }

    fn execute(self, _stdout: &mut dyn Write, _env: &mut Environment) -> Result<ExitCode, ShellError> {
        let raw = self
            .seconds
            .ok_or(ShellError::MissingArgument { command: "sleep" })?;
        let seconds = parse_seconds(&raw);
        tracing::debug!(seconds, "sleeping");
        // Blocks the whole shell; there is no background sleep.
        thread::sleep(Duration::from_secs(seconds));
        Ok(0)
    }
}

/// Read a leading integer the way C's `atoi` does.
///
/// Leading whitespace and a sign are accepted, digits are read until the first
/// non-digit, and input without digits is 0. Negative values clamp to 0 and
/// overflow saturates.
pub fn parse_seconds(raw: &str) -> u64 {
    let s = raw.trim_start();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    let value = digits
        .bytes()
        .take_while(u8::is_ascii_digit)
        .fold(0u64, |acc, d| acc.saturating_mul(10).saturating_add(u64::from(d - b'0')));
    if negative { 0 } else { value }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env as stdenv;
    use std::fs;
    use std::path::PathBuf;
    use std::time::{Instant, SystemTime, UNIX_EPOCH};

    fn make_unique_temp_dir() -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = stdenv::temp_dir().join(format!(
            "pipe_shell_builtin_{}_{}",
            std::process::id(),
            nanos
        ));
        fs::create_dir_all(&dir).expect("create temp dir");
        fs::canonicalize(dir).expect("canonicalize temp dir")
    }

    fn run(name: &str, args: &[&str], env: &mut Environment) -> (Result<ExitCode, ShellError>, String) {
        let args: Vec<String> = args.iter().map(|s| s.to_string()).collect();
        let cmd = default_builtins()
            .iter()
            .find_map(|f| f.try_create(name, &args))
            .expect("builtin should be recognised");
        let mut out = Vec::new();
        let res = cmd.execute(&mut out, env);
        (res, String::from_utf8(out).unwrap())
    }

    #[test]
    fn test_help_output_is_stable() {
        let mut env = Environment::new();
        let (code1, out1) = run("help", &[], &mut env);
        let (code2, out2) = run("help", &[], &mut env);
        assert_eq!(code1.unwrap(), 0);
        assert_eq!(code2.unwrap(), 0);
        assert_eq!(out1, HELP_TEXT);
        assert_eq!(out1, out2);
    }

    #[test]
    fn test_help_lists_every_command() {
        for needle in ["cd <directory>", "help", "exit", "sleep <seconds>", "<command1> | <command2>"] {
            assert!(HELP_TEXT.contains(needle), "missing {needle}");
        }
    }

    #[test]
    fn test_names_are_case_sensitive() {
        let builtins = default_builtins();
        assert!(builtins.iter().all(|f| f.try_create("HELP", &[]).is_none()));
        assert!(builtins.iter().all(|f| f.try_create("Cd", &[]).is_none()));
        assert!(builtins.iter().all(|f| f.try_create("ls", &[]).is_none()));
        assert!(builtins.iter().all(|f| f.try_create("exit", &[]).is_none()));
    }

    #[test]
    fn test_cd_missing_argument() {
        let base = make_unique_temp_dir();
        let mut env = Environment::with(&base, None);
        let (res, out) = run("cd", &[], &mut env);
        let err = res.unwrap_err();
        assert_eq!(err.to_string(), "cd: missing argument");
        assert!(out.is_empty());
        assert_eq!(env.current_dir(), base);
        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn test_cd_nonexistent_then_valid_sibling() {
        let base = make_unique_temp_dir();
        fs::create_dir_all(base.join("start")).unwrap();
        fs::create_dir_all(base.join("sibling")).unwrap();
        let mut env = Environment::with(base.join("start"), None);

        let (res, _) = run("cd", &["../missing"], &mut env);
        assert!(matches!(res, Err(ShellError::DirectoryChange { .. })));
        assert_eq!(env.current_dir(), base.join("start"));

        let (res, _) = run("cd", &["../sibling", "ignored"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir(), base.join("sibling"));
        assert!(env.prompt().starts_with(base.join("sibling").to_str().unwrap()));

        let _ = fs::remove_dir_all(base);
    }

    #[test]
    fn test_sleep_missing_argument_does_not_block() {
        let mut env = Environment::new();
        let start = Instant::now();
        let (res, _) = run("sleep", &[], &mut env);
        assert_eq!(res.unwrap_err().to_string(), "sleep: missing argument");
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_sleep_non_numeric_is_zero() {
        let mut env = Environment::new();
        let start = Instant::now();
        let (res, _) = run("sleep", &["abc"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_sleep_one_second_blocks() {
        let mut env = Environment::new();
        let start = Instant::now();
        let (res, _) = run("sleep", &["1"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert!(start.elapsed() >= Duration::from_secs(1));
    }

    #[test]
    fn test_parse_seconds_like_atoi() {
        assert_eq!(parse_seconds("5"), 5);
        assert_eq!(parse_seconds("  7"), 7);
        assert_eq!(parse_seconds("+3"), 3);
        assert_eq!(parse_seconds("12abc"), 12);
        assert_eq!(parse_seconds("abc"), 0);
        assert_eq!(parse_seconds(""), 0);
        assert_eq!(parse_seconds("-4"), 0);
        assert_eq!(parse_seconds("99999999999999999999999"), u64::MAX);
    }

    #[test]
    fn test_help_ignores_any_operands() {
        let mut env = Environment::new();
        for args in [&["-x"][..], &["--help"][..], &["help"][..]] {
            let (res, out) = run("help", args, &mut env);
            assert_eq!(res.unwrap(), 0);
            assert_eq!(out, HELP_TEXT);
        }
    }

    #[test]
    fn test_sleep_negative_is_zero() {
        let mut env = Environment::new();
        let start = Instant::now();
        let (res, _) = run("sleep", &["-4"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_cd_operand_named_like_a_flag() {
        let base = make_unique_temp_dir();
        fs::create_dir_all(base.join("help")).unwrap();
        fs::create_dir_all(base.join("--help")).unwrap();
        let mut env = Environment::with(&base, None);

        let (res, out) = run("cd", &["help"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert!(out.is_empty());
        assert_eq!(env.current_dir(), base.join("help"));

        let (res, _) = run("cd", &["../--help"], &mut env);
        assert_eq!(res.unwrap(), 0);
        assert_eq!(env.current_dir(), base.join("--help"));
        let _ = fs::remove_dir_all(base);
    }
}
