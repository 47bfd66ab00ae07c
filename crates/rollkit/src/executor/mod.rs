//! Remote executor abstraction.
//!
//! The [`RemoteExecutor`] trait is the only way procedures reach a host. It
//! hands back a [`RemoteHandle`] that can be polled without blocking, which is
//! what lets one thread drive many remote commands at once:
//! - the real implementation shells out to `ssh`/`scp` (in the CLI)
//! - [`mock::MockExecutor`] scripts outcomes against a simulated clock

pub mod mock;

use crate::error::Result;
use std::path::Path;

/// One in-flight remote command.
///
/// A handle is owned by exactly one procedure and dropped when the procedure
/// moves on to its next command.
pub trait RemoteHandle {
    /// Whether the command has exited. Never blocks.
    fn completed(&mut self) -> bool;

    /// Exit code, available once [`completed`](Self::completed) returned true.
    fn exit_code(&self) -> Option<i32>;

    /// Output lines produced since the previous call.
    ///
    /// Each line is returned at most once. Calling this before completion
    /// drains what is available so far; later calls return the remainder.
    fn read_lines(&mut self) -> Vec<String>;
}

/// Launches commands on remote hosts.
pub trait RemoteExecutor: Send + Sync {
    /// Run `command` through the host's shell.
    fn launch(&self, host: &str, command: &str) -> Result<Box<dyn RemoteHandle>>;

    /// Transfer a local file into `remote_dir` on `host`.
    fn copy(&self, local_path: &Path, host: &str, remote_dir: &str)
    -> Result<Box<dyn RemoteHandle>>;
}
