//! Service lifecycle commands: stop, start, clean, create, status, execute

use anyhow::Result;
use rollkit::commands::{join_command, list_command, service_command};
use rollkit::types::STOP_DEADLINE;
use rollkit::{
    Procedure, Service, SimpleProcedure, StopProcedure, Verb, drive_ordered, drive_unordered,
};

use crate::Context;
use crate::cli::UsageError;

/// Stop every selected role on each of its hosts, best effort.
pub fn stop(ctx: &Context, services: &[Service]) -> Result<()> {
    let procedures: Vec<Procedure> = services
        .iter()
        .flat_map(|&service| {
            ctx.cluster
                .hosts(service)
                .iter()
                .map(move |host| Procedure::from(StopProcedure::new(host, service)))
        })
        .collect();

    let report = drive_unordered(&ctx.run(), procedures, STOP_DEADLINE)?;
    if !report.is_complete() {
        log::warn!("{} stop(s) not confirmed", report.undone.len());
    }
    Ok(())
}

pub fn start(ctx: &Context, services: &[Service]) -> Result<()> {
    perform(ctx, services, &[Verb::Start])
}

/// Wipe data, then logs.
pub fn clean(ctx: &Context, services: &[Service]) -> Result<()> {
    perform(ctx, services, &[Verb::Clean, Verb::CleanLogs])
}

pub fn masters_create(ctx: &Context) -> Result<()> {
    perform(ctx, &[Service::Master], &[Verb::Create])
}

/// Run each control verb for each role on all of its hosts, then show the
/// output in launch order.
fn perform(ctx: &Context, services: &[Service], verbs: &[Verb]) -> Result<()> {
    let run = ctx.run();
    let mut procedures: Vec<Procedure> = Vec::new();
    for &service in services {
        for &verb in verbs {
            let launched = SimpleProcedure::launch_all(
                &run,
                ctx.cluster.hosts(service),
                &service_command(service, verb),
                &format!("Perform {service} {verb}"),
            )?;
            procedures.extend(launched.into_iter().map(Procedure::from));
        }
    }
    drive_ordered(&run, procedures)?;
    Ok(())
}

/// Show the processes of both roles on their hosts.
pub fn status(ctx: &Context) -> Result<()> {
    let run = ctx.run();
    let mut procedures: Vec<Procedure> = Vec::new();
    for service in Service::ALL {
        let launched = SimpleProcedure::launch_all(
            &run,
            ctx.cluster.hosts(service),
            &list_command(service),
            &format!("Processes related to {service}"),
        )?;
        procedures.extend(launched.into_iter().map(Procedure::from));
    }
    drive_ordered(&run, procedures)?;
    Ok(())
}

/// Run the command given as parameters on every distinct host.
pub fn execute(ctx: &Context) -> Result<()> {
    if ctx.parameters.is_empty() {
        return Err(UsageError::MissingParameters.into());
    }
    let command = join_command(&ctx.parameters);
    let run = ctx.run();
    let procedures = SimpleProcedure::launch_all(
        &run,
        &ctx.cluster.all_hosts(),
        &command,
        &format!("`{command}`"),
    )?;
    drive_ordered(&run, procedures.into_iter().map(Procedure::from).collect())?;
    Ok(())
}
