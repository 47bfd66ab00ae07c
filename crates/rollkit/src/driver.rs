//! Batch drivers: cooperative polling loops over a set of procedures.
//!
//! Both drivers poll on the same cadence ([`POLL_INTERVAL`]) and differ only
//! in their termination policy:
//! - [`drive_ordered`] completes procedures in launch order under a fixed
//!   deadline; a timeout or a nonzero exit code fails the run
//! - [`drive_unordered`] polls everything until all are done or the caller's
//!   deadline passes; leftovers are reported, not treated as an error
//!
//! The sleep between ticks is the only place a driver yields. Remote commands
//! still running when a deadline passes are left alone; nothing is sent to
//! stop them.

use crate::error::{Error, Result};
use crate::procedure::{Procedure, RunContext};
use crate::types::{ORDERED_DEADLINE, POLL_INTERVAL};
use std::time::Duration;

/// Outcome of a best-effort batch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Descriptions of procedures that had not finished by the deadline
    pub undone: Vec<String>,
}

impl BatchReport {
    pub fn is_complete(&self) -> bool {
        self.undone.is_empty()
    }
}

/// Complete `procedures` in order within [`ORDERED_DEADLINE`].
///
/// Only the procedure at the head of the queue is checked on each tick; the
/// next one is looked at only after it reports done. Fails with
/// [`Error::Timeout`] naming the head procedure if the deadline passes, or
/// with [`Error::RemoteFailed`] carrying the first nonzero exit code once all
/// procedures are done.
pub fn drive_ordered(ctx: &RunContext<'_>, procedures: Vec<Procedure>) -> Result<()> {
    drive_ordered_within(ctx, procedures, ORDERED_DEADLINE)
}

/// [`drive_ordered`] with an explicit deadline.
pub fn drive_ordered_within(
    ctx: &RunContext<'_>,
    mut procedures: Vec<Procedure>,
    deadline: Duration,
) -> Result<()> {
    let start = ctx.clock.now();
    let mut exit_code = 0;
    let mut index = 0;

    while index < procedures.len() && ctx.clock.now() < start + deadline {
        let head = &mut procedures[index];
        if head.check(ctx)? {
            if exit_code == 0 {
                exit_code = head.exit_code();
            }
            index += 1;
        }
        ctx.clock.sleep(POLL_INTERVAL);
    }

    if let Some(stuck) = procedures.get(index) {
        let description = stuck.describe();
        log::warn!("deadline of {}s elapsed waiting for {description}", deadline.as_secs());
        return Err(Error::Timeout { description });
    }

    if exit_code != 0 {
        return Err(Error::RemoteFailed { code: exit_code });
    }
    Ok(())
}

/// Poll every procedure until all are done or `deadline` elapses.
///
/// Procedures still running at the deadline are reported through
/// [`Reporter::on_undone`](crate::report::Reporter::on_undone) and listed in
/// the returned [`BatchReport`]. Only a procedure that aborts the run (a
/// failed deployment step) produces an error.
pub fn drive_unordered(
    ctx: &RunContext<'_>,
    mut procedures: Vec<Procedure>,
    deadline: Duration,
) -> Result<BatchReport> {
    let start = ctx.clock.now();
    let mut done = vec![false; procedures.len()];

    while done.contains(&false) && ctx.clock.now() < start + deadline {
        poll_pending(ctx, &mut procedures, &mut done)?;
        ctx.clock.sleep(POLL_INTERVAL);
    }

    let mut report = BatchReport::default();
    if done.contains(&false) {
        // One last look before declaring anything undone.
        poll_pending(ctx, &mut procedures, &mut done)?;
        for (procedure, _) in procedures.iter().zip(&done).filter(|(_, done)| !**done) {
            let description = procedure.describe();
            ctx.reporter.on_undone(&description);
            report.undone.push(description);
        }
    }
    Ok(report)
}

/// Check each procedure not yet done, marking the ones that finish.
fn poll_pending(
    ctx: &RunContext<'_>,
    procedures: &mut [Procedure],
    done: &mut [bool],
) -> Result<()> {
    for (procedure, done) in procedures.iter_mut().zip(done.iter_mut()) {
        if !*done {
            *done = procedure.check(ctx)?;
        }
    }
    Ok(())
}
