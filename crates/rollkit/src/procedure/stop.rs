use super::RunContext;
use crate::commands::{is_connection_banner, list_command, stop_command};
use crate::error::Result;
use crate::executor::RemoteHandle;
use crate::types::{STOP_RETRY_INTERVAL, Service};
use std::time::Duration;

/// Where a [`StopProcedure`] is in its stop/verify loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopState {
    /// Nothing sent yet
    AwaitingStopLaunch,
    /// Stop command in flight
    AwaitingStopExit,
    /// Presence check in flight; `stop_sent` is when the last stop finished
    AwaitingListExit { stop_sent: Duration },
    /// Service confirmed gone
    Done,
}

/// Stops a service on one host and keeps at it until no process is left.
///
/// After the stop command exits, the host is asked for the service's
/// processes. While some remain, only the presence check is repeated until
/// [`STOP_RETRY_INTERVAL`] has passed since the last stop, then the stop
/// itself is sent again.
pub struct StopProcedure {
    host: String,
    service: Service,
    state: StopState,
    handle: Option<Box<dyn RemoteHandle>>,
}

impl StopProcedure {
    /// Create the procedure; nothing is sent until the first `check`.
    pub fn new(host: &str, service: Service) -> Self {
        Self {
            host: host.to_string(),
            service,
            state: StopState::AwaitingStopLaunch,
            handle: None,
        }
    }

    pub fn check(&mut self, ctx: &RunContext<'_>) -> Result<bool> {
        match self.state {
            StopState::Done => return Ok(true),
            StopState::AwaitingStopLaunch => self.send_stop(ctx)?,
            _ => {}
        }

        let Some(handle) = self.handle.as_mut() else {
            return Ok(false);
        };
        if !handle.completed() {
            return Ok(false);
        }

        match self.state {
            StopState::AwaitingStopExit => {
                let stop_sent = ctx.clock.now();
                self.send_list(ctx, stop_sent)?;
            }
            StopState::AwaitingListExit { stop_sent } => {
                let still_running = handle
                    .read_lines()
                    .iter()
                    .any(|line| !is_connection_banner(line));

                if !still_running {
                    ctx.reporter.on_stopped(self.service, &self.host);
                    self.state = StopState::Done;
                    self.handle = None;
                    return Ok(true);
                }

                if ctx.clock.now() > stop_sent + STOP_RETRY_INTERVAL {
                    log::debug!(
                        "{} still running at {}, stopping again",
                        self.service,
                        self.host
                    );
                    self.send_stop(ctx)?;
                } else {
                    self.send_list(ctx, stop_sent)?;
                }
            }
            StopState::AwaitingStopLaunch | StopState::Done => {}
        }
        Ok(false)
    }

    pub fn describe(&self) -> String {
        format!("Stop {} at {}", self.service, self.host)
    }

    pub fn state(&self) -> StopState {
        self.state
    }

    fn send_stop(&mut self, ctx: &RunContext<'_>) -> Result<()> {
        self.handle = Some(ctx.executor.launch(&self.host, &stop_command(self.service))?);
        self.state = StopState::AwaitingStopExit;
        Ok(())
    }

    fn send_list(&mut self, ctx: &RunContext<'_>, stop_sent: Duration) -> Result<()> {
        self.handle = Some(ctx.executor.launch(&self.host, &list_command(self.service))?);
        self.state = StopState::AwaitingListExit { stop_sent };
        Ok(())
    }
}
