//! Local path resolution for ybctl
//!
//! Paths given on the command line or through `YB_*` variables may contain
//! `~` and environment variables; they are expanded here before use.

use std::path::PathBuf;

/// Default repository the release archive is built in
pub const DEFAULT_REPO: &str = "~/code/yugabyte";

/// Get the default ssh key path: `~/.yugabyte/yugabyte-dev-aws-keypair.pem`
///
/// Returns `None` when the home directory cannot be determined.
pub fn default_pem_file() -> Option<PathBuf> {
    let path = dirs::home_dir()?
        .join(".yugabyte")
        .join("yugabyte-dev-aws-keypair.pem");
    log::debug!("Using default pem file: {}", path.display());
    Some(path)
}

/// Expand ~ and environment variables in a path string.
///
/// Unknown variables are left untouched.
pub fn expand(path: &str) -> PathBuf {
    let expanded = shellexpand::full(path).unwrap_or(std::borrow::Cow::Borrowed(path));
    PathBuf::from(expanded.as_ref())
}

// ============================================================================
// Tests
// ============================================================================
