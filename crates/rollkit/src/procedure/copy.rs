use super::RunContext;
use crate::commands::{PROGRESS_MARKER, STAGING_DIR, create_install_dir_command, extract_command};
use crate::error::{Error, Result};
use crate::executor::RemoteHandle;
use crate::types::Artifact;

/// Steps of the artifact deployment pipeline, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyStep {
    /// Archive is being transferred to the staging directory
    Transfer,
    /// Install directory is being created
    CreateDir,
    /// Archive is being unpacked and the post-install hook run
    Extract,
    /// Release installed
    Done,
}

impl CopyStep {
    pub fn name(&self) -> &'static str {
        match self {
            CopyStep::Transfer => "Copy tar",
            CopyStep::CreateDir => "Create install directory",
            CopyStep::Extract => "Extract tar",
            CopyStep::Done => "Done",
        }
    }
}

/// Deploys a release archive to one host.
///
/// Each step starts only after the previous command exited with 0. A nonzero
/// exit at any step aborts the run with [`Error::StepFailed`].
pub struct CopyArtifactProcedure {
    host: String,
    artifact: Artifact,
    step: CopyStep,
    handle: Option<Box<dyn RemoteHandle>>,
    // Non-progress output of the extract step, shown if it fails.
    captured: Vec<String>,
}

impl CopyArtifactProcedure {
    /// Start transferring the archive to `host`.
    pub fn start(ctx: &RunContext<'_>, host: &str, artifact: &Artifact) -> Result<Self> {
        ctx.reporter.on_step(&format!("Copy tar to {host}"));
        let handle = ctx.executor.copy(&artifact.local_path, host, STAGING_DIR)?;
        Ok(Self {
            host: host.to_string(),
            artifact: artifact.clone(),
            step: CopyStep::Transfer,
            handle: Some(handle),
            captured: Vec::new(),
        })
    }

    pub fn check(&mut self, ctx: &RunContext<'_>) -> Result<bool> {
        if self.step == CopyStep::Done {
            return Ok(true);
        }
        let Some(handle) = self.handle.as_mut() else {
            return Ok(false);
        };

        let finished = handle.completed();
        if self.step == CopyStep::Extract {
            for line in handle.read_lines() {
                if line.starts_with(PROGRESS_MARKER) {
                    ctx.reporter.on_progress(&self.host, &line);
                } else {
                    self.captured.push(line);
                }
            }
        }
        if !finished {
            return Ok(false);
        }

        let code = handle.exit_code().unwrap_or(-1);
        if code != 0 {
            let mut lines = std::mem::take(&mut self.captured);
            lines.extend(handle.read_lines());
            let step = self.step.name();
            ctx.reporter
                .on_output(&format!("{step} failed"), &self.host, &lines);
            return Err(Error::StepFailed {
                host: self.host.clone(),
                step: step.to_string(),
                code,
            });
        }

        let tar_prefix = &self.artifact.tar_prefix;
        match self.step {
            CopyStep::Transfer => {
                ctx.reporter.on_step(&format!("Tar copied to {}", self.host));
                let command = create_install_dir_command(tar_prefix);
                self.handle = Some(ctx.executor.launch(&self.host, &command)?);
                self.step = CopyStep::CreateDir;
            }
            CopyStep::CreateDir => {
                ctx.reporter
                    .on_step(&format!("Extracting tar at {}", self.host));
                let command = extract_command(tar_prefix);
                self.handle = Some(ctx.executor.launch(&self.host, &command)?);
                self.step = CopyStep::Extract;
            }
            CopyStep::Extract => {
                ctx.reporter.on_step(&format!("Tar extracted at {}", self.host));
                self.step = CopyStep::Done;
                self.handle = None;
                self.captured.clear();
                return Ok(true);
            }
            CopyStep::Done => return Ok(true),
        }
        Ok(false)
    }

    pub fn describe(&self) -> String {
        format!("Copy tar to {}", self.host)
    }

    pub fn step(&self) -> CopyStep {
        self.step
    }
}
