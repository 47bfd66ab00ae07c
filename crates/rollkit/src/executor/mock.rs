//! Scripted executor for tests.
//!
//! Every launch is answered by a user-supplied script returning an
//! [`Outcome`]: how long the command runs in simulated time, its exit code
//! and its output. Launches are recorded with the time they happened.

use super::{RemoteExecutor, RemoteHandle};
use crate::clock::{Clock, ManualClock};
use crate::error::Result;
use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

/// How a scripted command behaves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Outcome {
    /// Run time after launch; `None` means the command never exits
    pub runtime: Option<Duration>,
    /// Exit code reported on completion
    pub exit_code: i32,
    /// Lines readable as soon as the command starts
    pub early_output: Vec<String>,
    /// Lines readable once the command has exited
    pub output: Vec<String>,
}

impl Outcome {
    /// Exits immediately with code 0 and no output.
    pub fn ok() -> Self {
        Self {
            runtime: Some(Duration::ZERO),
            ..Self::default()
        }
    }

    /// Exits immediately with the given code.
    pub fn exit(code: i32) -> Self {
        Self {
            exit_code: code,
            ..Self::ok()
        }
    }

    /// Never exits.
    pub fn hang() -> Self {
        Self::default()
    }

    /// Run for `runtime` before exiting.
    pub fn after(mut self, runtime: Duration) -> Self {
        self.runtime = Some(runtime);
        self
    }

    pub fn with_output<S: Into<String>>(mut self, lines: impl IntoIterator<Item = S>) -> Self {
        self.output = lines.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_early_output<S: Into<String>>(
        mut self,
        lines: impl IntoIterator<Item = S>,
    ) -> Self {
        self.early_output = lines.into_iter().map(Into::into).collect();
        self
    }
}

/// A recorded launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    /// Simulated time of the launch
    pub at: Duration,
    pub host: String,
    /// Shell command, or `copy <local> <remote_dir>` for transfers
    pub command: String,
}

type Script = Box<dyn Fn(&str, &str) -> Outcome + Send + Sync>;

/// Executor whose commands follow a script instead of touching any host.
pub struct MockExecutor {
    clock: ManualClock,
    script: Script,
    launches: Mutex<Vec<Launch>>,
}

impl MockExecutor {
    /// Create an executor answering every `(host, command)` with `script`.
    pub fn new<F>(clock: ManualClock, script: F) -> Self
    where
        F: Fn(&str, &str) -> Outcome + Send + Sync + 'static,
    {
        Self {
            clock,
            script: Box::new(script),
            launches: Mutex::new(Vec::new()),
        }
    }

    /// Executor where every command succeeds immediately without output.
    pub fn succeeding(clock: ManualClock) -> Self {
        Self::new(clock, |_, _| Outcome::ok())
    }

    /// All launches so far, in order.
    pub fn launches(&self) -> Vec<Launch> {
        self.launches
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone()
    }

    /// Launches whose command contains `pattern`.
    pub fn launches_matching(&self, pattern: &str) -> Vec<Launch> {
        self.launches()
            .into_iter()
            .filter(|l| l.command.contains(pattern))
            .collect()
    }

    fn start(&self, host: &str, command: String) -> Box<dyn RemoteHandle> {
        let outcome = (self.script)(host, &command);
        let at = self.clock.now();
        self.launches
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Launch {
                at,
                host: host.to_string(),
                command,
            });
        Box::new(MockHandle {
            clock: self.clock.clone(),
            done_at: outcome.runtime.and_then(|r| at.checked_add(r)),
            exit_code: outcome.exit_code,
            early_output: outcome.early_output,
            output: outcome.output,
            finished: false,
        })
    }
}

impl RemoteExecutor for MockExecutor {
    fn launch(&self, host: &str, command: &str) -> Result<Box<dyn RemoteHandle>> {
        Ok(self.start(host, command.to_string()))
    }

    fn copy(
        &self,
        local_path: &Path,
        host: &str,
        remote_dir: &str,
    ) -> Result<Box<dyn RemoteHandle>> {
        Ok(self.start(
            host,
            format!("copy {} {}", local_path.display(), remote_dir),
        ))
    }
}

struct MockHandle {
    clock: ManualClock,
    done_at: Option<Duration>,
    exit_code: i32,
    early_output: Vec<String>,
    output: Vec<String>,
    finished: bool,
}

impl RemoteHandle for MockHandle {
    fn completed(&mut self) -> bool {
        if !self.finished {
            self.finished = self.done_at.is_some_and(|t| self.clock.now() >= t);
        }
        self.finished
    }

    fn exit_code(&self) -> Option<i32> {
        self.finished.then_some(self.exit_code)
    }

    fn read_lines(&mut self) -> Vec<String> {
        let mut lines = std::mem::take(&mut self.early_output);
        if self.finished {
            lines.append(&mut self.output);
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handle_completes_after_runtime() {
        let clock = ManualClock::new();
        let executor = MockExecutor::new(clock.clone(), |_, _| {
            Outcome::exit(2).after(Duration::from_secs(3))
        });

        let mut handle = executor.launch("h1", "true").unwrap();
        assert!(!handle.completed());
        assert_eq!(handle.exit_code(), None);

        clock.advance(Duration::from_secs(3));
        assert!(handle.completed());
        assert_eq!(handle.exit_code(), Some(2));
    }

    #[test]
    fn test_output_is_consumed_once() {
        let clock = ManualClock::new();
        let executor = MockExecutor::new(clock.clone(), |_, _| {
            Outcome::ok()
                .after(Duration::from_secs(1))
                .with_early_output(["+ step one"])
                .with_output(["done"])
        });

        let mut handle = executor.launch("h1", "work").unwrap();
        assert_eq!(handle.read_lines(), vec!["+ step one"]);
        assert!(handle.read_lines().is_empty());

        clock.advance(Duration::from_secs(1));
        assert!(handle.completed());
        assert_eq!(handle.read_lines(), vec!["done"]);
        assert!(handle.read_lines().is_empty());
    }

    #[test]
    fn test_hanging_command_never_completes() {
        let clock = ManualClock::new();
        let executor = MockExecutor::new(clock.clone(), |_, _| Outcome::hang());
        let mut handle = executor.launch("h1", "sleep infinity").unwrap();
        clock.advance(Duration::from_secs(3600));
        assert!(!handle.completed());
    }

    #[test]
    fn test_launches_are_recorded() {
        let clock = ManualClock::new();
        let executor = MockExecutor::succeeding(clock.clone());
        executor.launch("h1", "uptime").unwrap();
        clock.advance(Duration::from_secs(2));
        executor
            .copy(Path::new("/build/a.tar.gz"), "h2", "/tmp")
            .unwrap();

        let launches = executor.launches();
        assert_eq!(launches.len(), 2);
        assert_eq!(launches[0].host, "h1");
        assert_eq!(launches[0].at, Duration::ZERO);
        assert_eq!(launches[1].command, "copy /build/a.tar.gz /tmp");
        assert_eq!(launches[1].at, Duration::from_secs(2));
        assert_eq!(executor.launches_matching("uptime").len(), 1);
    }
}
