//! Command table and dispatch
//!
//! Every command ybctl accepts is one entry in [`CommandTable`]: a name, a
//! hint for the usage listing and the [`Action`] to perform. Role-scoped
//! commands carry their [`Target`] as data.

use std::collections::BTreeMap;

use anyhow::Result;
use rollkit::Service;

use crate::Context;

pub mod deploy;
pub mod lifecycle;
pub mod roll;

/// Which roles a command applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Masters,
    Tservers,
    All,
}

impl Target {
    pub const ALL: [Target; 3] = [Target::Masters, Target::Tservers, Target::All];

    pub fn services(&self) -> &'static [Service] {
        match self {
            Target::Masters => &[Service::Master],
            Target::Tservers => &[Service::Tserver],
            Target::All => &Service::ALL,
        }
    }

    /// Command name prefix
    pub fn prefix(&self) -> &'static str {
        match self {
            Target::Masters => "masters",
            Target::Tservers => "tservers",
            Target::All => "all",
        }
    }

    fn processes(&self) -> &'static str {
        match self {
            Target::Masters => "the YB master",
            Target::Tservers => "the YB tserver",
            Target::All => "all YB",
        }
    }
}

/// What a command does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Execute,
    Status,
    CopyTar,
    MastersCreate,
    Stop(Target),
    Start(Target),
    Clean(Target),
    Roll { target: Target, upgrade: bool },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub name: String,
    pub hint: String,
    pub action: Action,
}

/// All commands by name, kept sorted for the usage listing
pub struct CommandTable {
    commands: BTreeMap<String, CommandSpec>,
}

impl CommandTable {
    pub fn new() -> Self {
        let mut table = Self {
            commands: BTreeMap::new(),
        };

        table.add("execute", "Execute a command on all hosts.", Action::Execute);
        table.add(
            "masters_create",
            "Start the YB master processes for the cluster in cluster create mode.",
            Action::MastersCreate,
        );
        table.add("status", "Status of masters and servers.", Action::Status);
        table.add("copy_tar", "Copy the tar file to all the nodes.", Action::CopyTar);

        for target in Target::ALL {
            let prefix = target.prefix();
            let processes = target.processes();
            table.add(
                &format!("{prefix}_stop"),
                &format!("Stop {processes} processes."),
                Action::Stop(target),
            );
            table.add(
                &format!("{prefix}_start"),
                &format!("Start {processes} processes."),
                Action::Start(target),
            );
            table.add(
                &format!("{prefix}_clean"),
                &format!("Clean {processes} data and logs."),
                Action::Clean(target),
            );
            table.add(
                &format!("{prefix}_rolling_restart"),
                &format!("Restarts the {prefix} in a rolling manner."),
                Action::Roll {
                    target,
                    upgrade: false,
                },
            );
            table.add(
                &format!("{prefix}_rolling_upgrade"),
                &format!("Upgrades the {prefix} to the newly copied TAR in a rolling manner."),
                Action::Roll {
                    target,
                    upgrade: true,
                },
            );
        }

        table
    }

    fn add(&mut self, name: &str, hint: &str, action: Action) {
        self.commands.insert(
            name.to_string(),
            CommandSpec {
                name: name.to_string(),
                hint: hint.to_string(),
                action,
            },
        );
    }

    pub fn get(&self, name: &str) -> Option<&CommandSpec> {
        self.commands.get(name)
    }

    /// Sorted `name - hint` listing, names padded to a common width
    pub fn help_text(&self) -> String {
        let width = self.commands.keys().map(String::len).max().unwrap_or(0);
        let mut text = String::from("Commands:\n");
        for spec in self.commands.values() {
            text.push_str(&format!("  {:<width$} - {}\n", spec.name, spec.hint));
        }
        text
    }
}

impl Default for CommandTable {
    fn default() -> Self {
        Self::new()
    }
}

pub fn run(ctx: &Context, action: Action) -> Result<()> {
    log::debug!("Running {action:?}");
    match action {
        Action::Execute => lifecycle::execute(ctx),
        Action::Status => lifecycle::status(ctx),
        Action::CopyTar => deploy::copy_tar(ctx),
        Action::MastersCreate => lifecycle::masters_create(ctx),
        Action::Stop(target) => lifecycle::stop(ctx, target.services()),
        Action::Start(target) => lifecycle::start(ctx, target.services()),
        Action::Clean(target) => lifecycle::clean(ctx, target.services()),
        Action::Roll { target, upgrade } => roll::run(ctx, target.services(), upgrade),
    }
}

// ============================================================================
// Test Support
// ============================================================================

#[cfg(test)]
pub(crate) mod testing {
    use std::path::PathBuf;
    use std::sync::Arc;

    use rollkit::clock::ManualClock;
    use rollkit::executor::mock::{MockExecutor, Outcome};
    use rollkit::report::RecordingReporter;

    use crate::Context;
    use crate::config::Settings;

    /// A context wired to scripted remotes and simulated time
    pub struct Harness {
        pub clock: ManualClock,
        pub executor: Arc<MockExecutor>,
        pub reporter: Arc<RecordingReporter>,
        pub ctx: Context,
    }

    pub fn settings() -> Settings {
        Settings {
            master_ips: "m1 m2".to_string(),
            tserver_ips: "t1 m2".to_string(),
            pem_file: PathBuf::from("/keys/dev.pem"),
            repo: PathBuf::from("/src/yugabyte"),
            tar_prefix: Some("yb.2-release".to_string()),
            port: 54422,
            ssh_user: "centos".to_string(),
        }
    }

    pub fn harness<F>(settings: Settings, parameters: &[&str], script: F) -> Harness
    where
        F: Fn(&str, &str) -> Outcome + Send + Sync + 'static,
    {
        let clock = ManualClock::new();
        let executor = Arc::new(MockExecutor::new(clock.clone(), script));
        let reporter = Arc::new(RecordingReporter::new());
        let ctx = Context::with_backends(
            settings,
            parameters.iter().map(|p| p.to_string()).collect(),
            executor.clone(),
            Arc::new(clock.clone()),
            reporter.clone(),
        );
        Harness {
            clock,
            executor,
            reporter,
            ctx,
        }
    }
}
