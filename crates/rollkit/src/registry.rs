//! Cluster registry: which hosts run which service role.

use crate::types::Service;

/// Host sets of a cluster, per role.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cluster {
    masters: Vec<String>,
    tservers: Vec<String>,
}

impl Cluster {
    pub fn new(masters: Vec<String>, tservers: Vec<String>) -> Self {
        Self { masters, tservers }
    }

    /// Build a cluster from space-separated host lists.
    pub fn parse(master_ips: &str, tserver_ips: &str) -> Self {
        Self::new(parse_hosts(master_ips), parse_hosts(tserver_ips))
    }

    /// Hosts running `service`.
    pub fn hosts(&self, service: Service) -> &[String] {
        match service {
            Service::Master => &self.masters,
            Service::Tserver => &self.tservers,
        }
    }

    /// Every distinct host, masters first, in first-seen order.
    pub fn all_hosts(&self) -> Vec<String> {
        let mut hosts: Vec<String> = Vec::new();
        for host in self.masters.iter().chain(&self.tservers) {
            if !hosts.contains(host) {
                hosts.push(host.clone());
            }
        }
        hosts
    }
}

/// Split a whitespace-separated host list, dropping empty entries.
pub fn parse_hosts(input: &str) -> Vec<String> {
    input.split_whitespace().map(str::to_string).collect()
}
