use anyhow::Result;
use rollkit::{RollTask, Service, perform_tasks};

use crate::Context;

/// Restart (or upgrade) every host of the selected roles, one at a time.
///
/// Roles are rolled in the order given, so masters go first for `all`.
pub fn run(ctx: &Context, services: &[Service], upgrade: bool) -> Result<()> {
    let tar_prefix = if upgrade {
        Some(ctx.settings.tar_prefix()?)
    } else {
        None
    };

    let tasks: Vec<RollTask> = services
        .iter()
        .flat_map(|&service| {
            ctx.cluster.hosts(service).iter().map(move |host| match tar_prefix {
                Some(tar_prefix) => RollTask::upgrade(host, service, tar_prefix),
                None => RollTask::restart(host, service),
            })
        })
        .collect();
    log::info!("Rolling {} task(s)", tasks.len());

    perform_tasks(&ctx.run(), &tasks)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::UsageError;
    use crate::commands::testing::{harness, settings};
    use rollkit::executor::mock::Outcome;
    use rollkit::report::Event;
    use std::time::Duration;

    fn tasks(events: &[Event]) -> Vec<String> {
        events
            .iter()
            .filter_map(|e| match e {
                Event::Task(description) => Some(description.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_rolling_restart_all_masters_first() {
        let h = harness(settings(), &[], |_, _| Outcome::ok());
        run(&h.ctx, &Service::ALL, false).unwrap();

        assert_eq!(
            tasks(&h.reporter.events()),
            vec![
                "Restart master at m1",
                "Restart master at m2",
                "Restart tserver at t1",
                "Restart tserver at m2",
            ]
        );
        assert!(h.executor.launches_matching("ln -s").is_empty());
    }

    #[test]
    fn test_pacing_follows_previous_role() {
        let h = harness(settings(), &[], |_, _| Outcome::ok());
        run(&h.ctx, &Service::ALL, false).unwrap();

        let delays: Vec<Duration> = h
            .reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Pacing { delay, .. } => Some(delay),
                _ => None,
            })
            .collect();
        assert_eq!(
            delays,
            vec![
                Duration::from_secs(5),
                Duration::from_secs(5),
                Duration::from_secs(45),
            ]
        );
    }

    #[test]
    fn test_rolling_upgrade_relinks() {
        let h = harness(settings(), &[], |_, _| Outcome::ok());
        run(&h.ctx, &[Service::Tserver], true).unwrap();

        let relinks = h.executor.launches_matching("ln -s /opt/yugabyte/yb.2-release");
        let hosts: Vec<&str> = relinks.iter().map(|l| l.host.as_str()).collect();
        assert_eq!(hosts, vec!["t1", "m2"]);
        assert_eq!(
            tasks(&h.reporter.events())[0],
            "Upgrade tserver at t1"
        );
    }

    #[test]
    fn test_rolling_upgrade_requires_tar_prefix() {
        let mut settings = settings();
        settings.tar_prefix = None;
        let h = harness(settings, &[], |_, _| Outcome::ok());

        let err = run(&h.ctx, &[Service::Master], true).unwrap_err();
        assert_eq!(
            err.downcast::<UsageError>().unwrap(),
            UsageError::MissingSetting("tar_prefix")
        );
        assert!(h.executor.launches().is_empty());
    }
}
