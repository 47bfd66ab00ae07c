use super::RunContext;
use crate::error::Result;
use crate::executor::RemoteHandle;

/// A single remote command whose output is shown once it exits.
pub struct SimpleProcedure {
    host: String,
    title: String,
    handle: Option<Box<dyn RemoteHandle>>,
    exit_code: Option<i32>,
}

impl SimpleProcedure {
    /// Launch `command` on `host` right away.
    pub fn launch(ctx: &RunContext<'_>, host: &str, command: &str, title: &str) -> Result<Self> {
        log::debug!("{host}: {command}");
        let handle = ctx.executor.launch(host, command)?;
        Ok(Self {
            host: host.to_string(),
            title: title.to_string(),
            handle: Some(handle),
            exit_code: None,
        })
    }

    /// Launch the same command on every host.
    pub fn launch_all(
        ctx: &RunContext<'_>,
        hosts: &[String],
        command: &str,
        title: &str,
    ) -> Result<Vec<Self>> {
        hosts
            .iter()
            .map(|host| Self::launch(ctx, host, command, title))
            .collect()
    }

    pub fn check(&mut self, ctx: &RunContext<'_>) -> bool {
        if self.exit_code.is_some() {
            return true;
        }
        let Some(handle) = self.handle.as_mut() else {
            return false;
        };
        if !handle.completed() {
            return false;
        }

        // Killed by a signal: no code, count it as a failure.
        let code = handle.exit_code().unwrap_or(-1);
        let lines = handle.read_lines();
        ctx.reporter.on_output(&self.title, &self.host, &lines);
        log::debug!("{} exited with {code}", self.describe());

        self.exit_code = Some(code);
        self.handle = None;
        true
    }

    pub fn describe(&self) -> String {
        format!("{} at {}", self.title, self.host)
    }

    /// Exit code of the command, once it has been observed to finish.
    pub fn exit_code(&self) -> Option<i32> {
        self.exit_code
    }
}
