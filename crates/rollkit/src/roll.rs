//! Rolling restarts and upgrades, one host at a time.
//!
//! A [`RollTask`] stops a service on one host, optionally repoints the
//! service's install link at a new release, and starts it again. The
//! sequencer runs tasks back to back with a pacing pause in between so the
//! cluster can settle before the next host goes down.

use crate::commands::{relink_command, start_command};
use crate::driver::{drive_ordered, drive_unordered};
use crate::error::Result;
use crate::procedure::{RunContext, SimpleProcedure, StopProcedure};
use crate::types::{STOP_DEADLINE, Service};
use std::time::Duration;

/// Stop, optional relink and start of one service on one host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollTask {
    host: String,
    service: Service,
    /// Release to link to before starting; `None` for a plain restart
    upgrade_to: Option<String>,
    pacing: Duration,
    description: String,
}

impl RollTask {
    /// Restart `service` on `host`.
    pub fn restart(host: &str, service: Service) -> Self {
        Self::new(host, service, None)
    }

    /// Restart `service` on `host` on the release `tar_prefix`.
    pub fn upgrade(host: &str, service: Service, tar_prefix: &str) -> Self {
        Self::new(host, service, Some(tar_prefix.to_string()))
    }

    fn new(host: &str, service: Service, upgrade_to: Option<String>) -> Self {
        let action = if upgrade_to.is_some() {
            "Upgrade"
        } else {
            "Restart"
        };
        Self {
            host: host.to_string(),
            service,
            upgrade_to,
            pacing: service.pacing(),
            description: format!("{action} {service} at {host}"),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    /// Pause to observe after this task before starting the next one.
    pub fn pacing(&self) -> Duration {
        self.pacing
    }

    /// Run the task to completion.
    ///
    /// The stop phase is best effort: if the service cannot be confirmed gone
    /// within [`STOP_DEADLINE`] it is reported and the task carries on. The
    /// relink and start phases fail the task like any ordered batch.
    pub fn execute(&self, ctx: &RunContext<'_>) -> Result<()> {
        ctx.reporter.on_task(&self.description);

        let stop = StopProcedure::new(&self.host, self.service);
        drive_unordered(ctx, vec![stop.into()], STOP_DEADLINE)?;

        if let Some(tar_prefix) = &self.upgrade_to {
            self.run_step(ctx, &relink_command(self.service, tar_prefix), "Update link")?;
        }
        self.run_step(
            ctx,
            &start_command(self.service),
            &format!("Start {}", self.service),
        )
    }

    fn run_step(&self, ctx: &RunContext<'_>, command: &str, title: &str) -> Result<()> {
        let procedure = SimpleProcedure::launch(ctx, &self.host, command, title)?;
        drive_ordered(ctx, vec![procedure.into()])
    }
}

/// Run `tasks` one after another.
///
/// After each task except the last, sleeps for that task's pacing interval
/// before announcing the next one. Stops at the first failing task.
pub fn perform_tasks(ctx: &RunContext<'_>, tasks: &[RollTask]) -> Result<()> {
    let mut pacing: Option<Duration> = None;
    for task in tasks {
        if let Some(delay) = pacing {
            ctx.reporter.on_pacing(delay, task.description());
            log::info!("pacing {}s before {}", delay.as_secs(), task.description());
            ctx.clock.sleep(delay);
        }
        task.execute(ctx)?;
        pacing = Some(task.pacing());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, ManualClock};
    use crate::error::Error;
    use crate::executor::mock::{MockExecutor, Outcome};
    use crate::report::{Event, RecordingReporter};

    fn pacing_events(reporter: &RecordingReporter) -> Vec<(Duration, String)> {
        reporter
            .events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Pacing { delay, next } => Some((delay, next)),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_descriptions() {
        assert_eq!(
            RollTask::restart("10.0.0.1", Service::Master).description(),
            "Restart master at 10.0.0.1"
        );
        let upgrade = RollTask::upgrade("10.0.0.2", Service::Tserver, "yb.2");
        assert_eq!(upgrade.description(), "Upgrade tserver at 10.0.0.2");
        assert_eq!(upgrade.pacing(), Duration::from_secs(45));
    }

    #[test]
    fn test_restart_runs_stop_then_start() {
        let clock = ManualClock::new();
        let executor = MockExecutor::succeeding(clock.clone());
        let reporter = RecordingReporter::new();
        let ctx = RunContext {
            executor: &executor,
            clock: &clock,
            reporter: &reporter,
        };

        RollTask::restart("h", Service::Master).execute(&ctx).unwrap();

        let commands: Vec<String> = executor.launches().into_iter().map(|l| l.command).collect();
        assert_eq!(
            commands,
            vec![
                "yb-master-ctl.sh stop".to_string(),
                "ps auxww | grep [y]b-master | grep -v bash".to_string(),
                "yb-master-ctl.sh start".to_string(),
            ]
        );
    }

    #[test]
    fn test_upgrade_relinks_before_start() {
        let clock = ManualClock::new();
        let executor = MockExecutor::succeeding(clock.clone());
        let reporter = RecordingReporter::new();
        let ctx = RunContext {
            executor: &executor,
            clock: &clock,
            reporter: &reporter,
        };

        RollTask::upgrade("h", Service::Tserver, "yb.9-release")
            .execute(&ctx)
            .unwrap();

        let commands: Vec<String> = executor.launches().into_iter().map(|l| l.command).collect();
        assert_eq!(commands.len(), 4);
        assert_eq!(commands[2], relink_command(Service::Tserver, "yb.9-release"));
        assert_eq!(commands[3], "yb-tserver-ctl.sh start");
    }

    #[test]
    fn test_pacing_follows_finished_task() {
        let clock = ManualClock::new();
        let executor = MockExecutor::succeeding(clock.clone());
        let reporter = RecordingReporter::new();
        let ctx = RunContext {
            executor: &executor,
            clock: &clock,
            reporter: &reporter,
        };

        let tasks = vec![
            RollTask::restart("m1", Service::Master),
            RollTask::restart("t1", Service::Tserver),
            RollTask::restart("t2", Service::Tserver),
        ];
        perform_tasks(&ctx, &tasks).unwrap();

        assert_eq!(
            pacing_events(&reporter),
            vec![
                (Duration::from_secs(5), "Restart tserver at t1".to_string()),
                (Duration::from_secs(45), "Restart tserver at t2".to_string()),
            ]
        );

        // No pause before the first task nor after the last one.
        let first = reporter.events().into_iter().next();
        assert_eq!(first, Some(Event::Task("Restart master at m1".to_string())));
        assert!(matches!(reporter.events().last(), Some(Event::Output { .. })));

        // t1 starts only after the master's 5s pause.
        let t1_stop = &executor.launches_matching("yb-tserver-ctl.sh stop")[0];
        let m1_start = &executor.launches_matching("yb-master-ctl.sh start")[0];
        assert!(t1_stop.at - m1_start.at >= Duration::from_secs(5));
        assert!(t1_stop.at - m1_start.at < Duration::from_secs(6));
    }

    #[test]
    fn test_single_task_never_paces() {
        let clock = ManualClock::new();
        let executor = MockExecutor::succeeding(clock.clone());
        let reporter = RecordingReporter::new();
        let ctx = RunContext {
            executor: &executor,
            clock: &clock,
            reporter: &reporter,
        };

        perform_tasks(&ctx, &[RollTask::restart("t1", Service::Tserver)]).unwrap();
        assert!(pacing_events(&reporter).is_empty());
        assert!(clock.now() < Duration::from_secs(5));
    }

    #[test]
    fn test_failed_start_stops_the_sequence() {
        let clock = ManualClock::new();
        let executor = MockExecutor::new(clock.clone(), |host, cmd| {
            if host == "m1" && cmd.ends_with("start") {
                Outcome::exit(7)
            } else {
                Outcome::ok()
            }
        });
        let reporter = RecordingReporter::new();
        let ctx = RunContext {
            executor: &executor,
            clock: &clock,
            reporter: &reporter,
        };

        let tasks = vec![
            RollTask::restart("m1", Service::Master),
            RollTask::restart("m2", Service::Master),
        ];
        let err = perform_tasks(&ctx, &tasks).unwrap_err();
        assert!(matches!(err, Error::RemoteFailed { code: 7 }));
        assert!(executor.launches().iter().all(|l| l.host == "m1"));
    }

    #[test]
    fn test_unconfirmed_stop_still_starts() {
        let clock = ManualClock::new();
        let executor = MockExecutor::new(clock.clone(), |_, cmd| {
            if cmd.starts_with("ps") {
                Outcome::ok().with_output(["yugabyte 99 yb-master"])
            } else {
                Outcome::ok()
            }
        });
        let reporter = RecordingReporter::new();
        let ctx = RunContext {
            executor: &executor,
            clock: &clock,
            reporter: &reporter,
        };

        RollTask::restart("h", Service::Master).execute(&ctx).unwrap();
        assert_eq!(reporter.undone(), vec!["Stop master at h".to_string()]);
        assert_eq!(executor.launches_matching("ctl.sh start").len(), 1);
        assert!(clock.now() >= STOP_DEADLINE);
    }
}
