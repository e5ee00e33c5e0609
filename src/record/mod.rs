//! Resource records as returned by the remote nodes.
//!
//! A single query fans out to every targeted node; each node answers with a
//! [`NodeReply`] holding its own records and, optionally, metadata describing
//! itself. All node replies of one query are collected into a [`Reply`].
mod container;
mod process;

pub use container::{Container, NESTING_MARKER};
pub use process::Process;

/// Metadata a node attaches to its reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct NodeMetadata {
    pub hostname: String,
}

/// The records returned by one node for one query.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeReply<T> {
    pub metadata: Option<NodeMetadata>,
    pub records: Vec<T>,
}

impl<T> NodeReply<T> {
    pub fn new(metadata: Option<NodeMetadata>, records: Vec<T>) -> Self {
        Self { metadata, records }
    }

    /// Returns the hostname the node reported, or `fallback` if it did not
    /// attach any metadata.
    pub fn node_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.metadata
            .as_ref()
            .map_or(fallback, |metadata| metadata.hostname.as_str())
    }
}

/// All node replies of a single fan-out query.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply<T> {
    /// Node replies in the order the nodes answered.
    pub nodes: Vec<NodeReply<T>>,
    /// Address of the peer that served the query, used to label nodes that
    /// did not identify themselves.
    pub peer: Option<String>,
}

impl<T> Reply<T> {
    pub fn new(nodes: Vec<NodeReply<T>>, peer: Option<String>) -> Self {
        Self { nodes, peer }
    }

    pub fn default_node(&self) -> &str {
        self.peer.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_name_prefers_metadata() {
        let reply = NodeReply::<Process>::new(
            Some(NodeMetadata {
                hostname: "worker-1".to_owned(),
            }),
            Vec::new(),
        );
        assert_eq!(reply.node_name("10.5.0.2"), "worker-1");
    }

    #[test]
    fn node_name_falls_back_to_peer() {
        let reply = Reply::new(
            vec![NodeReply::<Process>::new(None, Vec::new())],
            Some("10.5.0.2".to_owned()),
        );
        assert_eq!(reply.nodes[0].node_name(reply.default_node()), "10.5.0.2");
    }

    #[test]
    fn default_node_is_empty_without_peer() {
        let reply = Reply::<Process>::new(Vec::new(), None);
        assert_eq!(reply.default_node(), "");
    }
}
