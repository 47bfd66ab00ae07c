use anyhow::{Result, bail};
use rollkit::types::COPY_DEADLINE;
use rollkit::{CopyArtifactProcedure, Procedure, drive_unordered};

use crate::Context;

/// Install the release archive on every distinct host.
pub fn copy_tar(ctx: &Context) -> Result<()> {
    let artifact = ctx.settings.artifact()?;
    if !artifact.local_path.is_file() {
        bail!("Tar file not found: {}", artifact.local_path.display());
    }
    log::info!(
        "Deploying {} from {}",
        artifact.tar_prefix,
        artifact.local_path.display()
    );

    let run = ctx.run();
    let procedures = ctx
        .cluster
        .all_hosts()
        .iter()
        .map(|host| CopyArtifactProcedure::start(&run, host, &artifact).map(Procedure::from))
        .collect::<rollkit::Result<Vec<_>>>()?;

    let report = drive_unordered(&run, procedures, COPY_DEADLINE)?;
    if !report.is_complete() {
        log::warn!("{} deployment(s) still running", report.undone.len());
    }
    Ok(())
}
