//! # rollkit
//!
//! Lifecycle orchestration for a two-role cluster driven purely over remote
//! shells: no agent on the hosts, no shared state store.
//!
//! Remote commands run in parallel on the hosts while a single local thread
//! polls their handles cooperatively:
//! - **Procedures** wrap one or more remote commands as small state machines
//!   exposing `check` and `describe`
//! - **Drivers** poll a batch of procedures to a termination policy, ordered
//!   with a deadline or unordered best effort
//! - **Roll tasks** sequence stop, relink and start per host with pacing
//! - **Cluster** maps each service role to its hosts
//!
//! ## Example
//!
//! ```
//! use rollkit::clock::ManualClock;
//! use rollkit::executor::mock::MockExecutor;
//! use rollkit::report::NoReporter;
//! use rollkit::{Cluster, RollTask, RunContext, Service, perform_tasks};
//!
//! let clock = ManualClock::new();
//! let executor = MockExecutor::succeeding(clock.clone());
//! let ctx = RunContext {
//!     executor: &executor,
//!     clock: &clock,
//!     reporter: &NoReporter,
//! };
//!
//! let cluster = Cluster::parse("10.0.0.1 10.0.0.2", "10.0.0.3");
//! let tasks: Vec<RollTask> = cluster
//!     .hosts(Service::Master)
//!     .iter()
//!     .map(|host| RollTask::restart(host, Service::Master))
//!     .collect();
//! perform_tasks(&ctx, &tasks).unwrap();
//! ```

pub mod clock;
pub mod commands;
pub mod driver;
pub mod error;
pub mod executor;
pub mod procedure;
pub mod registry;
pub mod report;
pub mod roll;
pub mod types;

pub use driver::{BatchReport, drive_ordered, drive_unordered};
pub use error::{Error, Result};
pub use executor::{RemoteExecutor, RemoteHandle};
pub use procedure::{
    CopyArtifactProcedure, Procedure, RunContext, SimpleProcedure, StopProcedure,
};
pub use registry::Cluster;
pub use report::Reporter;
pub use roll::{RollTask, perform_tasks};
pub use types::{Artifact, Service, Verb};
