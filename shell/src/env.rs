use std::env as stdenv;
use std::ffi::{OsStr, OsString};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::config::PROMPT_SUFFIX;
use crate::error::ShellError;

/// The process-scoped state the shell owns.
///
/// The working directory lives here instead of in the OS-level process state:
/// `cd` writes it, the prompt reads it, and every spawned child receives a
/// copy through `Command::current_dir`. A child keeps the directory it was
/// spawned with even if `cd` runs later.
#[derive(Debug, Clone)]
pub struct Environment {
    current_dir: PathBuf,
    search_path: Option<OsString>,
}

impl Environment {
    /// Capture the current process working directory and `PATH`.
    pub fn new() -> Self {
        let current_dir = stdenv::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self {
            current_dir,
            search_path: stdenv::var_os("PATH"),
        }
    }

    /// Start from an explicit directory and search path.
    pub fn with(current_dir: impl Into<PathBuf>, search_path: Option<OsString>) -> Self {
        Self {
            current_dir: current_dir.into(),
            search_path,
        }
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    /// The executable search path, if `PATH` was set.
    pub fn search_path(&self) -> Option<&OsStr> {
        self.search_path.as_deref()
    }

    /// Resolve `target` against the working directory and switch to it.
    ///
    /// On failure the working directory is left untouched.
    pub fn change_dir(&mut self, target: &str) -> Result<&Path, ShellError> {
        let requested = self.current_dir.join(target);
        let canonical = fs::canonicalize(&requested).map_err(|source| {
            ShellError::DirectoryChange {
                path: PathBuf::from(target),
                source,
            }
        })?;
        if !canonical.is_dir() {
            return Err(ShellError::DirectoryChange {
                path: PathBuf::from(target),
                source: io::Error::from(io::ErrorKind::NotADirectory),
            });
        }
        self.current_dir = canonical;
        Ok(&self.current_dir)
    }

    /// `<cwd> > `, without a trailing newline.
    pub fn prompt(&self) -> String {
        format!("{}{}", self.current_dir.display(), PROMPT_SUFFIX)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}
