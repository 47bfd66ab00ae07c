use clap::{Args, Parser};
use thiserror::Error;

#[derive(Parser)]
#[command(name = "ybctl")]
#[command(version)]
#[command(about = "Control a YugaByte cluster over ssh", long_about = None)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(flatten)]
    pub cluster: ClusterArgs,

    /// Command to execute (listed below)
    pub command: Option<String>,

    /// Command arguments
    #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
    pub parameters: Vec<String>,
}

// ============================================================================
// Cluster Settings
// ============================================================================

/// Settings that may also come from `YB_<NAME>` environment variables
#[derive(Args, Debug, Default)]
pub struct ClusterArgs {
    /// Name of the pem file
    #[arg(long, alias = "pem_file")]
    pub pem_file: Option<String>,

    /// Space separated IPs of masters (e.g., '10.a.b.c 10.d.e.f')
    #[arg(long, alias = "master_ips", num_args = 1.., action = clap::ArgAction::Append)]
    pub master_ips: Vec<String>,

    /// Space separated IPs of tservers (e.g., '10.a.b.c 10.d.e.f')
    #[arg(long, alias = "tserver_ips", num_args = 1.., action = clap::ArgAction::Append)]
    pub tserver_ips: Vec<String>,

    /// Repository base used to pick up the TAR file
    #[arg(long)]
    pub repo: Option<String>,

    /// TAR file prefix (e.g., yugabyte.2bdf48724db5869d0c88c85e0fa65e9ac3a21511-release)
    #[arg(long, alias = "tar_prefix")]
    pub tar_prefix: Option<String>,

    /// SSH port
    #[arg(long)]
    pub port: Option<String>,

    /// Remote account to log in as
    #[arg(long, alias = "ssh_user")]
    pub ssh_user: Option<String>,
}

impl ClusterArgs {
    /// Value given on the command line for a setting, by setting name
    pub fn explicit(&self, name: &str) -> Option<String> {
        let value = match name {
            "pem_file" => &self.pem_file,
            "master_ips" => return join_hosts(&self.master_ips),
            "tserver_ips" => return join_hosts(&self.tserver_ips),
            "repo" => &self.repo,
            "tar_prefix" => &self.tar_prefix,
            "port" => &self.port,
            "ssh_user" => &self.ssh_user,
            _ => return None,
        };
        value.clone()
    }
}

/// Host values from all occurrences of an option, as one space-separated list
fn join_hosts(values: &[String]) -> Option<String> {
    (!values.is_empty()).then(|| values.join(" "))
}

// ============================================================================
// Usage Errors
// ============================================================================

/// Mistakes in how ybctl was invoked; reported together with the usage text
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UsageError {
    #[error("Please specify: {0}")]
    MissingSetting(&'static str),

    #[error("Invalid {name}: {value}")]
    InvalidSetting { name: &'static str, value: String },

    #[error("Please specify command")]
    MissingCommand,

    #[error("Command not found: {0}")]
    UnknownCommand(String),

    #[error("Please specify remote command")]
    MissingParameters,
}
