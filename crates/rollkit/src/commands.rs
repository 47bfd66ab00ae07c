//! Remote shell command catalog.
//!
//! The text of these commands is what the hosts' control scripts expect, so
//! it is kept verbatim rather than composed from smaller pieces.

use crate::types::{Service, Verb};

/// Installation root on every host.
pub const INSTALL_ROOT: &str = "/opt/yugabyte";

/// Account that owns the installation.
pub const SERVICE_ACCOUNT: &str = "yugabyte";

/// Remote directory artifacts are staged in.
pub const STAGING_DIR: &str = "/tmp";

/// Prefix of the notice ssh prints when it records a new host key.
pub const CONNECTION_BANNER: &str = "Warning: Permanently added";

/// Prefix of the trace lines the post-install hook emits.
pub const PROGRESS_MARKER: char = '+';

/// Presence check: lists the service's processes, excluding shells and grep.
pub fn list_command(service: Service) -> String {
    let process = service.process_name();
    let (first, rest) = process.split_at(1);
    format!("ps auxww | grep [{first}]{rest} | grep -v bash")
}

/// Control script invocation for the given service and verb.
pub fn service_command(service: Service, verb: Verb) -> String {
    format!("{}-ctl.sh {}", service.process_name(), verb)
}

pub fn stop_command(service: Service) -> String {
    service_command(service, Verb::Stop)
}

pub fn start_command(service: Service) -> String {
    service_command(service, Verb::Start)
}

/// Points `<root>/<service>` at the install directory of `tar_prefix`.
pub fn relink_command(service: Service, tar_prefix: &str) -> String {
    format!(
        "sudo -u {SERVICE_ACCOUNT} rm {INSTALL_ROOT}/{service} && \
         sudo -u {SERVICE_ACCOUNT} ln -s {INSTALL_ROOT}/{tar_prefix} {INSTALL_ROOT}/{service}"
    )
}

/// Creates the install directory for `tar_prefix`.
pub fn create_install_dir_command(tar_prefix: &str) -> String {
    format!("sudo -u {SERVICE_ACCOUNT} mkdir -p {INSTALL_ROOT}/{tar_prefix}")
}

/// Unpacks the staged archive and runs its post-install hook.
pub fn extract_command(tar_prefix: &str) -> String {
    format!(
        "cd {INSTALL_ROOT}/{tar_prefix} && \
         sudo -u {SERVICE_ACCOUNT} tar xvf {STAGING_DIR}/{tar_prefix}.tar.gz && \
         sudo {INSTALL_ROOT}/{tar_prefix}/bin/post_install.sh"
    )
}

/// Whether an output line is the ssh host-key notice rather than command output.
pub fn is_connection_banner(line: &str) -> bool {
    line.starts_with(CONNECTION_BANNER)
}

/// Quote a word for a POSIX shell, leaving safe words untouched.
pub fn shell_quote(word: &str) -> String {
    if word.is_empty() {
        return "''".to_string();
    }
    let safe = word
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        word.to_string()
    } else {
        format!("'{}'", word.replace('\'', "'\"'\"'"))
    }
}

/// Join words into one shell command line.
///
/// A single word is passed through as-is so callers can hand over a complete
/// command line; several words are quoted individually.
pub fn join_command(words: &[String]) -> String {
    match words {
        [single] => single.clone(),
        _ => words
            .iter()
            .map(|w| shell_quote(w))
            .collect::<Vec<_>>()
            .join(" "),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_list_command_excludes_grep_itself() {
        assert_eq!(
            list_command(Service::Master),
            "ps auxww | grep [y]b-master | grep -v bash"
        );
        assert_eq!(
            list_command(Service::Tserver),
            "ps auxww | grep [y]b-tserver | grep -v bash"
        );
    }

    #[test]
    fn test_service_commands() {
        assert_eq!(stop_command(Service::Master), "yb-master-ctl.sh stop");
        assert_eq!(start_command(Service::Tserver), "yb-tserver-ctl.sh start");
        assert_eq!(
            service_command(Service::Tserver, Verb::CleanLogs),
            "yb-tserver-ctl.sh clean-logs"
        );
    }

    #[test]
    fn test_relink_command() {
        assert_eq!(
            relink_command(Service::Tserver, "yb.1-release"),
            "sudo -u yugabyte rm /opt/yugabyte/tserver && \
             sudo -u yugabyte ln -s /opt/yugabyte/yb.1-release /opt/yugabyte/tserver"
        );
    }

    #[test]
    fn test_deploy_commands() {
        assert_eq!(
            create_install_dir_command("yb.1"),
            "sudo -u yugabyte mkdir -p /opt/yugabyte/yb.1"
        );
        let extract = extract_command("yb.1");
        assert!(extract.starts_with("cd /opt/yugabyte/yb.1 && "));
        assert!(extract.contains("tar xvf /tmp/yb.1.tar.gz"));
        assert!(extract.ends_with("sudo /opt/yugabyte/yb.1/bin/post_install.sh"));
    }

    #[test]
    fn test_connection_banner() {
        assert!(is_connection_banner(
            "Warning: Permanently added '10.0.0.1' (ECDSA) to the list of known hosts."
        ));
        assert!(!is_connection_banner("yugabyte 1234 0.0 yb-master --flagfile"));
    }

    #[test]
    fn test_shell_quote() {
        assert_eq!(shell_quote("ls"), "ls");
        assert_eq!(shell_quote("/opt/yugabyte"), "/opt/yugabyte");
        assert_eq!(shell_quote("a b"), "'a b'");
        assert_eq!(shell_quote("it's"), "'it'\"'\"'s'");
        assert_eq!(shell_quote(""), "''");
    }

    #[test]
    fn test_join_command() {
        assert_eq!(join_command(&["df -h | head".to_string()]), "df -h | head");
        assert_eq!(
            join_command(&["grep".to_string(), "a b".to_string(), "/var/log".to_string()]),
            "grep 'a b' /var/log"
        );
    }
}
