//! Temporary, per-request workspaces.

use std::ffi::OsStr;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;

use tempfile::TempDir;

use crate::error::{Error, Result};

/// A uniquely named temporary directory owned by one compilation.
///
/// The directory is removed by [`Workspace::close`], or on drop if the
/// owner never gets that far (e.g. while unwinding).
#[derive(Debug)]
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    /// Create a fresh directory whose name starts with `prefix`.
    pub fn create(prefix: &str) -> Result<Self> {
        let dir = tempfile::Builder::new().prefix(prefix).tempdir()?;
        log::debug!("created workspace {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    /// A `Command` for `program` that runs with this workspace as its
    /// working directory. The parent process's directory is never touched.
    pub fn command(&self, program: impl AsRef<OsStr>) -> Command {
        let mut cmd = Command::new(program);
        cmd.current_dir(self.path());
        cmd
    }

    /// Recursively delete the workspace.
    pub fn close(self) -> Result<()> {
        let path = self.dir.path().to_path_buf();
        match self.dir.close() {
            Ok(()) => Ok(()),
            // Someone beat us to it; the directory is gone either way.
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(Error::WorkspaceCleanup { path, source }),
        }
    }
}

/// Run `f` inside a fresh workspace and remove the workspace afterwards,
/// whatever `f` returned.
///
/// A cleanup failure is logged and never replaces the value or error
/// produced by `f`.
pub fn with_scoped_workspace<T>(
    prefix: &str,
    f: impl FnOnce(&Workspace) -> Result<T>,
) -> Result<T> {
    let workspace = Workspace::create(prefix)?;
    let result = f(&workspace);
    if let Err(e) = workspace.close() {
        log::warn!("{}", e);
    }
    result
}
