mod cli;
mod commands;
mod config;
mod paths;
mod runner;
mod ui;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::{CommandFactory, Parser};
use cli::{Cli, UsageError};
use commands::CommandTable;
use config::Settings;
use rollkit::clock::{Clock, SystemClock};
use rollkit::{Cluster, RemoteExecutor, Reporter, RunContext};

/// Global context for one invocation
pub struct Context {
    pub settings: Settings,
    pub cluster: Cluster,
    /// Arguments after the command name
    pub parameters: Vec<String>,
    pub executor: Arc<dyn RemoteExecutor>,
    pub clock: Arc<dyn Clock>,
    pub reporter: Arc<dyn Reporter>,
}

impl Context {
    /// Context that talks to the real hosts over ssh
    pub fn new(settings: Settings, parameters: Vec<String>) -> Self {
        let executor = Arc::new(runner::SshExecutor::new(&settings));
        Self::with_backends(
            settings,
            parameters,
            executor,
            Arc::new(SystemClock::new()),
            Arc::new(ui::ConsoleReporter),
        )
    }

    pub fn with_backends(
        settings: Settings,
        parameters: Vec<String>,
        executor: Arc<dyn RemoteExecutor>,
        clock: Arc<dyn Clock>,
        reporter: Arc<dyn Reporter>,
    ) -> Self {
        let cluster = settings.cluster();
        Self {
            settings,
            cluster,
            parameters,
            executor,
            clock,
            reporter,
        }
    }

    /// Borrowed collaborators for procedures and drivers
    pub fn run(&self) -> RunContext<'_> {
        RunContext {
            executor: self.executor.as_ref(),
            clock: self.clock.as_ref(),
            reporter: self.reporter.as_ref(),
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    let log_level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        2 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };

    env_logger::Builder::new()
        .filter_level(if cli.quiet {
            log::LevelFilter::Error
        } else {
            log_level
        })
        .format_timestamp(None)
        .init();

    let table = CommandTable::new();
    match dispatch(cli, &table, |key| std::env::var(key).ok()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => report_error(&err, &table),
    }
}

/// Look up the command, resolve settings and run it.
///
/// The command name is checked first so a typo is reported without
/// complaining about missing cluster settings.
fn dispatch<F>(cli: Cli, table: &CommandTable, env: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let name = cli.command.ok_or(UsageError::MissingCommand)?;
    let spec = table
        .get(&name)
        .ok_or_else(|| UsageError::UnknownCommand(name.clone()))?;

    let settings = config::resolve(&cli.cluster, env)?;
    let ctx = Context::new(settings, cli.parameters);
    commands::run(&ctx, spec.action)
}

fn report_error(err: &anyhow::Error, table: &CommandTable) -> ExitCode {
    if let Some(usage) = err.downcast_ref::<UsageError>() {
        ui::error(&usage.to_string());
        let _ = Cli::command().print_help();
        println!();
        print!("{}", table.help_text());
        return ExitCode::FAILURE;
    }

    if let Some(run_error) = err.downcast_ref::<rollkit::Error>() {
        ui::error(&run_error.to_string());
        return ExitCode::from(exit_status(run_error.exit_code()));
    }

    ui::error(&format!("{err:#}"));
    ExitCode::FAILURE
}

/// Map an exit code to a process status, never turning a failure into 0.
fn exit_status(code: i32) -> u8 {
    match (code & 0xff) as u8 {
        0 => 1,
        status => status,
    }
}
