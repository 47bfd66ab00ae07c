//! Core types shared by procedures, drivers and the sequencer.

use std::path::PathBuf;
use std::time::Duration;

/// Interval between two polls of a procedure collection (10 polls per second).
pub const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Deadline of the ordered driver.
pub const ORDERED_DEADLINE: Duration = Duration::from_secs(15);

/// Deadline for stopping services, alone or as the first phase of a roll.
pub const STOP_DEADLINE: Duration = Duration::from_secs(30);

/// Deadline for deploying the artifact to every host.
pub const COPY_DEADLINE: Duration = Duration::from_secs(90);

/// Time after which an unsuccessful stop is sent again.
pub const STOP_RETRY_INTERVAL: Duration = Duration::from_secs(1);

/// A cluster service role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Service {
    /// Metadata master
    Master,
    /// Tablet server
    Tserver,
}

impl Service {
    /// Every role, in the order lifecycle operations visit them.
    pub const ALL: [Service; 2] = [Service::Master, Service::Tserver];

    /// Role name as used in command names and remote scripts.
    pub fn name(&self) -> &'static str {
        match self {
            Service::Master => "master",
            Service::Tserver => "tserver",
        }
    }

    /// Name of the remote process (and of its control script prefix).
    pub fn process_name(&self) -> String {
        format!("yb-{}", self.name())
    }

    /// Delay after a roll of this role before the next host is touched.
    pub fn pacing(&self) -> Duration {
        match self {
            Service::Master => Duration::from_secs(5),
            Service::Tserver => Duration::from_secs(45),
        }
    }
}

impl std::fmt::Display for Service {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Verb understood by a service control script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Stop,
    Start,
    Create,
    Clean,
    CleanLogs,
}

impl Verb {
    /// Argument passed to the control script.
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Stop => "stop",
            Verb::Start => "start",
            Verb::Create => "create",
            Verb::Clean => "clean",
            Verb::CleanLogs => "clean-logs",
        }
    }
}

impl std::fmt::Display for Verb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A versioned release archive to be deployed on every host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    /// Release name, e.g. `yugabyte.2bdf487-release`
    pub tar_prefix: String,
    /// Local path of `<tar_prefix>.tar.gz`
    pub local_path: PathBuf,
}

impl Artifact {
    /// Artifact built inside `repo`, found at `<repo>/build/<tar_prefix>.tar.gz`.
    pub fn in_repo(repo: impl Into<PathBuf>, tar_prefix: impl Into<String>) -> Self {
        let tar_prefix = tar_prefix.into();
        let local_path = repo
            .into()
            .join("build")
            .join(format!("{tar_prefix}.tar.gz"));
        Self {
            tar_prefix,
            local_path,
        }
    }
}
