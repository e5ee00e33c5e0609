//! Access to the remote machine API.
//!
//! [`Machine`] is the seam between the reporting core and the transport:
//! one call issues one fan-out query to all [`Targets`] and yields one
//! [`Reply`] holding a group of records per node. [`GrpcMachine`] speaks
//! the `machine.MachineService` gRPC API.
mod client;
mod error;
pub mod proto;

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use tonic::metadata::{MetadataMap, MetadataValue};

pub use client::GrpcMachine;
pub use error::{Error, Result};
pub use proto::ContainerDriver;

use crate::record::{Container, Process, Reply};

/// containerd namespace holding the system services of a node.
pub const SYSTEM_NAMESPACE: &str = "system";
/// containerd namespace used by the CRI plugin for Kubernetes workloads.
pub const KUBERNETES_NAMESPACE: &str = "k8s.io";

const TARGETS_METADATA_KEY: &str = "targets";

pub trait Machine {
    /// Lists the processes of every targeted node.
    fn processes(
        &self,
        targets: &Targets,
    ) -> impl std::future::Future<Output = Result<Reply<Process>>> + Send;

    /// Lists the containers of every targeted node.
    fn containers(
        &self,
        targets: &Targets,
        query: &ContainerQuery,
    ) -> impl std::future::Future<Output = Result<Reply<Container>>> + Send;
}

/// The nodes a query fans out to. An empty set addresses the node that
/// serves the request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Targets(Vec<String>);

impl Targets {
    pub fn new(nodes: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(nodes.into_iter().map(Into::into).collect())
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns only the first requested node, or the unchanged (empty) set.
    pub fn first_only(&self) -> Targets {
        Self(self.0.iter().take(1).cloned().collect())
    }

    /// Adds one `targets` metadata entry per node.
    pub fn apply(&self, metadata: &mut MetadataMap) -> Result<()> {
        for target in &self.0 {
            let value =
                MetadataValue::from_str(target).map_err(|source| Error::InvalidTarget {
                    target: target.clone(),
                    source,
                })?;
            metadata.append(TARGETS_METADATA_KEY, value);
        }
        Ok(())
    }
}

/// Selects which containers a container listing returns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerQuery {
    pub namespace: String,
    pub driver: ContainerDriver,
}

impl ContainerQuery {
    /// Builds the query for the system namespace, or for the Kubernetes
    /// namespace if `kubernetes` is set; `use_cri` selects the CRI driver
    /// instead of talking to containerd directly.
    pub fn new(kubernetes: bool, use_cri: bool) -> Self {
        let namespace = if kubernetes {
            KUBERNETES_NAMESPACE
        } else {
            SYSTEM_NAMESPACE
        };
        let driver = if use_cri {
            ContainerDriver::Cri
        } else {
            ContainerDriver::Containerd
        };
        Self {
            namespace: namespace.to_owned(),
            driver,
        }
    }
}

/// Where the machine API is served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServerAddress {
    Unix(PathBuf),
    Http(hyper::Uri),
}

impl ServerAddress {
    /// Returns the address used to label nodes that did not report a
    /// hostname of their own.
    ///
    /// This is the host as configured, not the socket address the transport
    /// ended up connected to: a DNS endpoint labels rows with its name, not
    /// the resolved IP.
    pub fn peer(&self) -> String {
        match self {
            ServerAddress::Unix(path) => path.display().to_string(),
            ServerAddress::Http(uri) => uri.host().unwrap_or_default().to_owned(),
        }
    }
}

impl FromStr for ServerAddress {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if let Some(path) = s.strip_prefix("unix://") {
            if path.is_empty() {
                return Err(Error::InvalidEndpoint(s.to_owned()));
            }
            return Ok(ServerAddress::Unix(PathBuf::from(path)));
        }

        let uri = if s.contains("://") {
            s.to_owned()
        } else {
            format!("http://{s}")
        };
        let uri = hyper::Uri::from_str(&uri).map_err(|_| Error::InvalidEndpoint(s.to_owned()))?;
        if uri.scheme_str() != Some("http") || uri.host().is_none() {
            return Err(Error::InvalidEndpoint(s.to_owned()));
        }

        Ok(ServerAddress::Http(uri))
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ServerAddress::Unix(path) => write!(f, "unix://{}", path.display()),
            ServerAddress::Http(uri) => write!(f, "{uri}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_only_narrows_to_first_node() {
        let targets = Targets::new(["10.5.0.2", "10.5.0.3"]);
        assert_eq!(targets.first_only(), Targets::new(["10.5.0.2"]));
        assert!(Targets::default().first_only().is_empty());
    }

    #[test]
    fn targets_become_repeated_metadata() {
        let targets = Targets::new(["10.5.0.2", "10.5.0.3"]);
        let mut metadata = MetadataMap::new();
        targets.apply(&mut metadata).unwrap();

        let values: Vec<_> = metadata
            .get_all(TARGETS_METADATA_KEY)
            .iter()
            .map(|v| v.to_str().unwrap().to_owned())
            .collect();
        assert_eq!(values, vec!["10.5.0.2", "10.5.0.3"]);
    }

    #[test]
    fn rejects_targets_that_are_not_header_safe() {
        let targets = Targets::new(["bad\nnode"]);
        let err = targets.apply(&mut MetadataMap::new()).unwrap_err();
        assert!(matches!(err, Error::InvalidTarget { .. }));
    }

    #[test]
    fn container_query_selection() {
        let system = ContainerQuery::new(false, false);
        assert_eq!(system.namespace, SYSTEM_NAMESPACE);
        assert_eq!(system.driver, ContainerDriver::Containerd);

        let k8s = ContainerQuery::new(true, true);
        assert_eq!(k8s.namespace, KUBERNETES_NAMESPACE);
        assert_eq!(k8s.driver, ContainerDriver::Cri);
    }

    #[test]
    fn parses_server_addresses() {
        let addr: ServerAddress = "unix:///run/machined.sock".parse().unwrap();
        assert_eq!(addr, ServerAddress::Unix(PathBuf::from("/run/machined.sock")));
        assert_eq!(addr.peer(), "/run/machined.sock");

        let addr: ServerAddress = "10.5.0.2:50000".parse().unwrap();
        assert_eq!(addr.peer(), "10.5.0.2");
        assert!(matches!(addr, ServerAddress::Http(_)));
    }

    #[test]
    fn peer_of_dns_endpoint_is_the_configured_name() {
        let addr: ServerAddress = "http://node-1:50000".parse().unwrap();
        assert_eq!(addr.peer(), "node-1");
    }

    #[test]
    fn rejects_invalid_server_addresses() {
        assert!("unix://".parse::<ServerAddress>().is_err());
        assert!("https://node-1:50000".parse::<ServerAddress>().is_err());
        assert!("http://".parse::<ServerAddress>().is_err());
    }
}
