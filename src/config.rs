//! Cluster settings resolution
//!
//! Every setting is resolved in one pass over [`SETTINGS`]:
//! 1. Explicit command-line argument
//! 2. `YB_<NAME>` environment variable (e.g. `YB_MASTER_IPS`)
//! 3. Built-in default, if the setting has one

use std::collections::HashMap;
use std::path::PathBuf;

use rollkit::{Artifact, Cluster};

use crate::cli::{ClusterArgs, UsageError};
use crate::paths;

/// Prefix of the environment variables settings fall back to
pub const ENV_PREFIX: &str = "YB_";

/// Default remote login
pub const DEFAULT_SSH_USER: &str = "centos";

/// What to use when a setting is given neither as argument nor in the environment
#[derive(Debug, Clone, Copy)]
enum Fallback {
    /// No default: resolution fails
    Required,
    /// No default: the setting stays unset
    Optional,
    Value(&'static str),
    /// Key file under the home directory
    PemFile,
}

#[derive(Debug)]
struct Setting {
    name: &'static str,
    fallback: Fallback,
}

const SETTINGS: [Setting; 7] = [
    Setting {
        name: "master_ips",
        fallback: Fallback::Required,
    },
    Setting {
        name: "tserver_ips",
        fallback: Fallback::Required,
    },
    Setting {
        name: "pem_file",
        fallback: Fallback::PemFile,
    },
    Setting {
        name: "repo",
        fallback: Fallback::Value(paths::DEFAULT_REPO),
    },
    Setting {
        name: "tar_prefix",
        fallback: Fallback::Optional,
    },
    Setting {
        name: "port",
        fallback: Fallback::Value("54422"),
    },
    Setting {
        name: "ssh_user",
        fallback: Fallback::Value(DEFAULT_SSH_USER),
    },
];

impl Fallback {
    fn value(self) -> Option<String> {
        match self {
            Fallback::Required | Fallback::Optional => None,
            Fallback::Value(value) => Some(value.to_string()),
            Fallback::PemFile => paths::default_pem_file().map(|p| p.display().to_string()),
        }
    }
}

/// Environment variable a setting falls back to
pub fn env_key(name: &str) -> String {
    format!("{ENV_PREFIX}{}", name.to_uppercase())
}

/// Fully resolved settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub master_ips: String,
    pub tserver_ips: String,
    pub pem_file: PathBuf,
    pub repo: PathBuf,
    pub tar_prefix: Option<String>,
    pub port: u16,
    pub ssh_user: String,
}

impl Settings {
    pub fn cluster(&self) -> Cluster {
        Cluster::parse(&self.master_ips, &self.tserver_ips)
    }

    /// Release prefix, required by deployments and upgrades
    pub fn tar_prefix(&self) -> Result<&str, UsageError> {
        self.tar_prefix
            .as_deref()
            .ok_or(UsageError::MissingSetting("tar_prefix"))
    }

    /// Release archive built in the repository
    pub fn artifact(&self) -> Result<Artifact, UsageError> {
        Ok(Artifact::in_repo(&self.repo, self.tar_prefix()?))
    }
}

/// Resolve all settings from arguments, then `env`, then defaults.
///
/// `env` looks up an environment variable by name; pass
/// `|key| std::env::var(key).ok()` for the process environment.
pub fn resolve<F>(args: &ClusterArgs, env: F) -> Result<Settings, UsageError>
where
    F: Fn(&str) -> Option<String>,
{
    let mut values: HashMap<&'static str, String> = HashMap::new();

    for setting in &SETTINGS {
        let value = args
            .explicit(setting.name)
            .or_else(|| env(&env_key(setting.name)))
            .or_else(|| setting.fallback.value());

        match (value, setting.fallback) {
            (Some(value), _) => {
                values.insert(setting.name, value);
            }
            (None, Fallback::Optional) => {}
            (None, _) => return Err(UsageError::MissingSetting(setting.name)),
        }
    }

    let tar_prefix = values.remove("tar_prefix");
    let mut take = |name: &'static str| values.remove(name).unwrap_or_default();

    let port_value = take("port");
    let port = port_value
        .trim()
        .parse::<u16>()
        .map_err(|_| UsageError::InvalidSetting {
            name: "port",
            value: port_value.clone(),
        })?;

    let settings = Settings {
        master_ips: take("master_ips"),
        tserver_ips: take("tserver_ips"),
        pem_file: paths::expand(&take("pem_file")),
        repo: paths::expand(&take("repo")),
        tar_prefix,
        port,
        ssh_user: take("ssh_user"),
    };
    log::debug!("Resolved settings: {settings:?}");
    Ok(settings)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    fn cluster_args() -> ClusterArgs {
        ClusterArgs {
            master_ips: vec!["10.0.0.1 10.0.0.2".to_string()],
            tserver_ips: vec!["10.0.0.3".to_string()],
            ..ClusterArgs::default()
        }
    }

    #[test]
    fn test_env_key() {
        assert_eq!(env_key("master_ips"), "YB_MASTER_IPS");
        assert_eq!(env_key("port"), "YB_PORT");
    }

    #[test]
    fn test_defaults() {
        let settings = resolve(&cluster_args(), no_env).unwrap();
        assert_eq!(settings.port, 54422);
        assert_eq!(settings.ssh_user, "centos");
        assert_eq!(settings.tar_prefix, None);

        let home = dirs::home_dir().unwrap();
        assert_eq!(settings.repo, home.join("code").join("yugabyte"));
        assert_eq!(
            settings.pem_file,
            home.join(".yugabyte").join("yugabyte-dev-aws-keypair.pem")
        );
    }

    #[test]
    fn test_env_overrides_default() {
        let settings = resolve(&cluster_args(), |key| match key {
            "YB_PORT" => Some("2222".to_string()),
            "YB_TAR_PREFIX" => Some("yb.3-release".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(settings.port, 2222);
        assert_eq!(settings.tar_prefix.as_deref(), Some("yb.3-release"));
    }

    #[test]
    fn test_explicit_overrides_env() {
        let args = ClusterArgs {
            port: Some("2200".to_string()),
            ..cluster_args()
        };
        let settings = resolve(&args, |key| {
            (key == "YB_PORT").then(|| "2222".to_string())
        })
        .unwrap();
        assert_eq!(settings.port, 2200);
    }

    #[test]
    fn test_hosts_from_env() {
        let settings = resolve(&ClusterArgs::default(), |key| match key {
            "YB_MASTER_IPS" => Some("m1 m2 m3".to_string()),
            "YB_TSERVER_IPS" => Some("t1".to_string()),
            _ => None,
        })
        .unwrap();
        let cluster = settings.cluster();
        assert_eq!(cluster.all_hosts(), vec!["m1", "m2", "m3", "t1"]);
    }

    #[test]
    fn test_missing_required_setting() {
        let args = ClusterArgs {
            tserver_ips: vec!["t1".to_string()],
            ..ClusterArgs::default()
        };
        assert_eq!(
            resolve(&args, no_env),
            Err(UsageError::MissingSetting("master_ips"))
        );
    }

    #[test]
    fn test_invalid_port() {
        let args = ClusterArgs {
            port: Some("ssh".to_string()),
            ..cluster_args()
        };
        assert_eq!(
            resolve(&args, no_env),
            Err(UsageError::InvalidSetting {
                name: "port",
                value: "ssh".to_string(),
            })
        );
    }

    #[test]
    fn test_artifact_requires_tar_prefix() {
        let mut settings = resolve(&cluster_args(), no_env).unwrap();
        assert_eq!(
            settings.artifact(),
            Err(UsageError::MissingSetting("tar_prefix"))
        );

        settings.tar_prefix = Some("yb.5".to_string());
        settings.repo = PathBuf::from("/src/yb");
        let artifact = settings.artifact().unwrap();
        assert_eq!(artifact.local_path, PathBuf::from("/src/yb/build/yb.5.tar.gz"));
    }
}
