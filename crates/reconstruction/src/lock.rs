//! Advisory workspace lock.

use std::fs::OpenOptions;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use contracts::{ContractError, Workspace};
use tracing::{debug, warn};

/// Exclusive `.colmap-runner.lock` at the workspace root
///
/// The file is removed when the guard drops. A lock left behind by a killed
/// process has to be deleted by hand.
#[derive(Debug)]
pub struct WorkspaceLock {
    path: PathBuf,
}

impl WorkspaceLock {
    pub fn acquire(workspace: &Workspace) -> Result<Self, ContractError> {
        let path = workspace.lock_path();
        let mut file = match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(ContractError::conflict(
                    &path,
                    "another run holds the workspace lock",
                ));
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                return Err(ContractError::missing_input(
                    workspace.root(),
                    "workspace directory not found",
                ));
            }
            Err(e) => return Err(e.into()),
        };
        writeln!(file, "{}", std::process::id())?;

        debug!(path = %path.display(), "workspace lock acquired");
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for WorkspaceLock {
    fn drop(&mut self) {
        if let Err(e) = std::fs::remove_file(&self.path) {
            warn!(path = %self.path.display(), error = %e, "failed to remove workspace lock");
        }
    }
}
