//! Child-process helpers shared by the generator adapter and the sweep executor.

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

const POLL_FLOOR: Duration = Duration::from_millis(1);
const POLL_CEILING: Duration = Duration::from_millis(50);

/// Reason an external tool could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ResolveProblem {
    Missing,
    NotAFile,
    NotExecutable,
}

impl ResolveProblem {
    pub(crate) fn describe(self) -> &'static str {
        match self {
            ResolveProblem::Missing => "binary not found",
            ResolveProblem::NotAFile => "path is not a regular file",
            ResolveProblem::NotExecutable => "binary is not executable",
        }
    }
}

/// Resolves a tool path; bare names that do not exist locally are looked up on `PATH`.
pub(crate) fn resolve_binary(path: &Path) -> Result<PathBuf, ResolveProblem> {
    if path.components().count() == 1 {
        if path.exists() {
            check_binary(path)?;
            // A bare program name would otherwise be looked up on PATH by `Command`.
            return Ok(Path::new(".").join(path));
        }
        let search = env::var_os("PATH").unwrap_or_default();
        return env::split_paths(&search)
            .map(|dir| dir.join(path))
            .find(|candidate| check_binary(candidate).is_ok())
            .ok_or(ResolveProblem::Missing);
    }
    check_binary(path)?;
    Ok(path.to_path_buf())
}

fn check_binary(path: &Path) -> Result<(), ResolveProblem> {
    let metadata = path.metadata().map_err(|_| ResolveProblem::Missing)?;
    if !metadata.is_file() {
        return Err(ResolveProblem::NotAFile);
    }
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        if metadata.permissions().mode() & 0o111 == 0 {
            return Err(ResolveProblem::NotExecutable);
        }
    }
    Ok(())
}

/// Owns a spawned child and kills and reaps it if dropped before completion.
#[derive(Debug)]
pub(crate) struct ChildGuard {
    child: Option<Child>,
}

impl ChildGuard {
    pub(crate) fn new(child: Child) -> Self {
        Self { child: Some(child) }
    }

    /// Waits for the child; returns `None` if `timeout` elapsed and the child was killed.
    pub(crate) fn wait(mut self, timeout: Option<Duration>) -> io::Result<Option<ExitStatus>> {
        let Some(child) = self.child.as_mut() else {
            return Err(io::Error::new(io::ErrorKind::Other, "child already reaped"));
        };
        // A limit too large to represent as an instant is no limit at all.
        let deadline = timeout.and_then(|limit| Instant::now().checked_add(limit));
        let result = match deadline {
            None => child.wait().map(Some),
            Some(deadline) => wait_deadline(child, deadline),
        };
        if result.is_ok() {
            self.child = None;
        }
        result
    }
}

impl Drop for ChildGuard {
    fn drop(&mut self) {
        if let Some(child) = self.child.as_mut() {
            let _ = child.kill();
            let _ = child.wait();
        }
    }
}

fn wait_deadline(child: &mut Child, deadline: Instant) -> io::Result<Option<ExitStatus>> {
    let mut pause = POLL_FLOOR;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        let now = Instant::now();
        if now >= deadline {
            // The child may exit between `try_wait` and `kill`; either way it is reaped below.
            let _ = child.kill();
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(pause.min(deadline - now));
        pause = (pause * 2).min(POLL_CEILING);
    }
}
