//! Wire messages of the `machine.MachineService` gRPC API.
//!
//! ```proto
//! service MachineService {
//!   rpc Processes(google.protobuf.Empty) returns (ProcessesResponse);
//!   rpc Containers(ContainersRequest) returns (ContainersResponse);
//! }
//! ```
use crate::record;

pub const PROCESSES_PATH: &str = "/machine.MachineService/Processes";
pub const CONTAINERS_PATH: &str = "/machine.MachineService/Containers";

#[derive(Clone, PartialEq, prost::Message)]
pub struct NodeMetadata {
    #[prost(string, tag = "1")]
    pub hostname: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProcessInfo {
    #[prost(int32, tag = "1")]
    pub pid: i32,
    #[prost(int32, tag = "2")]
    pub ppid: i32,
    #[prost(string, tag = "3")]
    pub state: String,
    #[prost(int32, tag = "4")]
    pub threads: i32,
    #[prost(double, tag = "5")]
    pub cpu_time: f64,
    #[prost(uint64, tag = "6")]
    pub virtual_memory: u64,
    #[prost(uint64, tag = "7")]
    pub resident_memory: u64,
    #[prost(string, tag = "8")]
    pub command: String,
    #[prost(string, tag = "9")]
    pub executable: String,
    #[prost(string, tag = "10")]
    pub args: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProcessesNodeReply {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<NodeMetadata>,
    #[prost(message, repeated, tag = "2")]
    pub processes: Vec<ProcessInfo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ProcessesResponse {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<ProcessesNodeReply>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, prost::Enumeration)]
#[repr(i32)]
pub enum ContainerDriver {
    Containerd = 0,
    Cri = 1,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ContainersRequest {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(enumeration = "ContainerDriver", tag = "2")]
    pub driver: i32,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ContainerInfo {
    #[prost(string, tag = "1")]
    pub namespace: String,
    #[prost(string, tag = "2")]
    pub id: String,
    #[prost(string, tag = "3")]
    pub image: String,
    #[prost(uint32, tag = "4")]
    pub pid: u32,
    #[prost(string, tag = "5")]
    pub status: String,
    #[prost(string, tag = "6")]
    pub pod_id: String,
    #[prost(string, tag = "7")]
    pub name: String,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ContainersNodeReply {
    #[prost(message, optional, tag = "1")]
    pub metadata: Option<NodeMetadata>,
    #[prost(message, repeated, tag = "2")]
    pub containers: Vec<ContainerInfo>,
}

#[derive(Clone, PartialEq, prost::Message)]
pub struct ContainersResponse {
    #[prost(message, repeated, tag = "1")]
    pub messages: Vec<ContainersNodeReply>,
}

impl From<NodeMetadata> for record::NodeMetadata {
    fn from(metadata: NodeMetadata) -> Self {
        Self {
            hostname: metadata.hostname,
        }
    }
}

impl From<ProcessInfo> for record::Process {
    fn from(p: ProcessInfo) -> Self {
        Self {
            pid: p.pid,
            ppid: p.ppid,
            state: p.state,
            threads: p.threads,
            cpu_time: p.cpu_time,
            virtual_memory: p.virtual_memory,
            resident_memory: p.resident_memory,
            command: p.command,
            executable: p.executable,
            args: p.args,
        }
    }
}

impl From<ContainerInfo> for record::Container {
    fn from(c: ContainerInfo) -> Self {
        Self {
            namespace: c.namespace,
            id: c.id,
            pod_id: c.pod_id,
            name: c.name,
            image: c.image,
            pid: c.pid,
            status: c.status,
        }
    }
}

impl From<ProcessesNodeReply> for record::NodeReply<record::Process> {
    fn from(reply: ProcessesNodeReply) -> Self {
        Self::new(
            reply.metadata.map(Into::into),
            reply.processes.into_iter().map(Into::into).collect(),
        )
    }
}

impl From<ContainersNodeReply> for record::NodeReply<record::Container> {
    fn from(reply: ContainersNodeReply) -> Self {
        Self::new(
            reply.metadata.map(Into::into),
            reply.containers.into_iter().map(Into::into).collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use prost::Message;

    use super::*;

    #[test]
    fn decodes_process_reply_into_records() {
        let response = ProcessesResponse {
            messages: vec![ProcessesNodeReply {
                metadata: Some(NodeMetadata {
                    hostname: "cp-1".to_owned(),
                }),
                processes: vec![ProcessInfo {
                    pid: 1,
                    state: "S".to_owned(),
                    threads: 3,
                    cpu_time: 1.5,
                    resident_memory: 4096,
                    executable: "/sbin/init".to_owned(),
                    args: "/sbin/init".to_owned(),
                    ..Default::default()
                }],
            }],
        };
        let bytes = response.encode_to_vec();
        let decoded = ProcessesResponse::decode(bytes.as_slice()).unwrap();

        let node: record::NodeReply<record::Process> =
            decoded.messages.into_iter().next().unwrap().into();
        assert_eq!(node.node_name("fallback"), "cp-1");
        assert_eq!(node.records.len(), 1);
        assert_eq!(node.records[0].pid, 1);
        assert_eq!(node.records[0].resident_memory, 4096);
        assert_eq!(node.records[0].state, "S");
    }

    #[test]
    fn missing_metadata_stays_missing() {
        let node: record::NodeReply<record::Container> = ContainersNodeReply {
            metadata: None,
            containers: vec![ContainerInfo {
                id: "b".to_owned(),
                pod_id: "a".to_owned(),
                ..Default::default()
            }],
        }
        .into();
        assert!(node.metadata.is_none());
        assert!(node.records[0].is_nested());
    }

    #[test]
    fn containers_request_carries_driver() {
        let request = ContainersRequest {
            namespace: "k8s.io".to_owned(),
            driver: ContainerDriver::Cri as i32,
        };
        assert_eq!(request.driver(), ContainerDriver::Cri);
    }
}
