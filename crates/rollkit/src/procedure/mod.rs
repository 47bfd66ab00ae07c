//! Procedures: units of remote work that can be polled without blocking.
//!
//! Every variant answers two questions, `check` (are you done yet?) and
//! `describe` (what are you?). Drivers own collections of procedures and
//! call `check` on a fixed cadence until their termination policy is met.
//!
//! The set of variants is closed:
//! - [`SimpleProcedure`]: one command, output shown on completion
//! - [`StopProcedure`]: stop a service and confirm it is gone, retrying
//! - [`CopyArtifactProcedure`]: stage, unpack and install a release

mod copy;
mod simple;
mod stop;

pub use copy::{CopyArtifactProcedure, CopyStep};
pub use simple::SimpleProcedure;
pub use stop::{StopProcedure, StopState};

use crate::clock::Clock;
use crate::error::Result;
use crate::executor::RemoteExecutor;
use crate::report::Reporter;

/// Collaborators a procedure needs while it runs.
#[derive(Clone, Copy)]
pub struct RunContext<'a> {
    /// Launches remote commands
    pub executor: &'a dyn RemoteExecutor,
    /// Measures deadlines and retry intervals, and paces polling
    pub clock: &'a dyn Clock,
    /// Receives user-facing output
    pub reporter: &'a dyn Reporter,
}

/// A unit of remote work.
pub enum Procedure {
    Simple(SimpleProcedure),
    Stop(StopProcedure),
    CopyArtifact(CopyArtifactProcedure),
}

impl Procedure {
    /// Advance the procedure and report whether it is done.
    ///
    /// Once this returns `Ok(true)` it keeps returning `Ok(true)` without
    /// touching the remote side again. An `Err` aborts the whole run.
    pub fn check(&mut self, ctx: &RunContext<'_>) -> Result<bool> {
        match self {
            Procedure::Simple(p) => Ok(p.check(ctx)),
            Procedure::Stop(p) => p.check(ctx),
            Procedure::CopyArtifact(p) => p.check(ctx),
        }
    }

    /// Human-readable description, used in timeout and undone reports.
    pub fn describe(&self) -> String {
        match self {
            Procedure::Simple(p) => p.describe(),
            Procedure::Stop(p) => p.describe(),
            Procedure::CopyArtifact(p) => p.describe(),
        }
    }

    /// Exit code the procedure contributes to a batch, once done.
    ///
    /// Only simple procedures carry a remote exit code; the others either
    /// succeed or abort the run.
    pub fn exit_code(&self) -> i32 {
        match self {
            Procedure::Simple(p) => p.exit_code().unwrap_or(0),
            Procedure::Stop(_) | Procedure::CopyArtifact(_) => 0,
        }
    }
}

impl From<SimpleProcedure> for Procedure {
    fn from(p: SimpleProcedure) -> Self {
        Procedure::Simple(p)
    }
}

impl From<StopProcedure> for Procedure {
    fn from(p: StopProcedure) -> Self {
        Procedure::Stop(p)
    }
}

impl From<CopyArtifactProcedure> for Procedure {
    fn from(p: CopyArtifactProcedure) -> Self {
        Procedure::CopyArtifact(p)
    }
}
