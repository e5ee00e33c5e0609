//! Merging per-node replies into one ordered listing.
//!
//! Each call on a [`Reporter`] issues exactly one fan-out query through its
//! [`Machine`], sorts the records within every node group, labels each group
//! with its node name and turns the result into a [`Table`]. Node groups
//! keep the order in which the nodes replied.
use crate::format::byte_size;
use crate::machine::{self, ContainerQuery, Machine, Targets};
use crate::record::{Container, Process, Reply};
use crate::render::Table;
use crate::sort::SortKey;

pub const PROCESS_HEADER: [&str; 8] = [
    "NODE", "PID", "STATE", "THREADS", "CPU-TIME", "VIRTMEM", "RESMEM", "COMMAND",
];
pub const CONTAINER_HEADER: [&str; 6] = ["NODE", "NAMESPACE", "ID", "IMAGE", "PID", "STATUS"];

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to query nodes: {0}")]
    Query(#[source] machine::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// The records of one node, labeled with the node's name.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct NodeListing<T> {
    pub node: String,
    pub records: Vec<T>,
}

pub struct Reporter<M> {
    machine: M,
    targets: Targets,
}

impl<M: Machine> Reporter<M> {
    pub fn new(machine: M, targets: Targets) -> Self {
        Self { machine, targets }
    }

    pub fn targets(&self) -> &Targets {
        &self.targets
    }

    /// Restricts all further queries to the first requested node.
    pub fn narrow_to_first_target(&mut self) {
        if self.targets.len() > 1 {
            log::debug!(
                "Narrowing {} targets to `{}`",
                self.targets.len(),
                self.targets.as_slice()[0]
            );
        }
        self.targets = self.targets.first_only();
    }

    /// Queries all targets for their processes, ordered by `sort_key`
    /// within each node.
    pub async fn process_listings(&self, sort_key: SortKey) -> Result<Vec<NodeListing<Process>>> {
        let reply = self
            .machine
            .processes(&self.targets)
            .await
            .map_err(Error::Query)?;
        Ok(merge_processes(reply, sort_key))
    }

    /// Queries all targets for their containers, ordered by ID within each
    /// node.
    pub async fn container_listings(
        &self,
        query: &ContainerQuery,
    ) -> Result<Vec<NodeListing<Container>>> {
        let reply = self
            .machine
            .containers(&self.targets, query)
            .await
            .map_err(Error::Query)?;
        Ok(merge_containers(reply))
    }

    pub async fn processes(&self, sort_key: SortKey) -> Result<Table> {
        Ok(process_table(&self.process_listings(sort_key).await?))
    }

    pub async fn containers(&self, query: &ContainerQuery) -> Result<Table> {
        Ok(container_table(&self.container_listings(query).await?))
    }
}

fn label<T>(reply: Reply<T>) -> impl Iterator<Item = NodeListing<T>> {
    let default_node = reply.default_node().to_owned();
    reply.nodes.into_iter().map(move |node| NodeListing {
        node: node.node_name(&default_node).to_owned(),
        records: node.records,
    })
}

/// Labels every node group and sorts its processes by `sort_key`.
pub fn merge_processes(reply: Reply<Process>, sort_key: SortKey) -> Vec<NodeListing<Process>> {
    label(reply)
        .map(|mut listing| {
            sort_key.sort(&mut listing.records);
            listing
        })
        .collect()
}

/// Labels every node group and sorts its containers by ID.
pub fn merge_containers(reply: Reply<Container>) -> Vec<NodeListing<Container>> {
    label(reply)
        .map(|mut listing| {
            listing.records.sort_by(|a, b| a.id.cmp(&b.id));
            listing
        })
        .collect()
}

pub fn process_table(listings: &[NodeListing<Process>]) -> Table {
    let mut table = Table::new(PROCESS_HEADER);
    for listing in listings {
        for p in &listing.records {
            table.push_row(vec![
                listing.node.clone(),
                p.pid.to_string(),
                p.state.clone(),
                p.threads.to_string(),
                format!("{:.2}", p.cpu_time),
                byte_size(p.virtual_memory),
                byte_size(p.resident_memory),
                p.display_command().into_owned(),
            ]);
        }
    }
    table
}

pub fn container_table(listings: &[NodeListing<Container>]) -> Table {
    let mut table = Table::new(CONTAINER_HEADER);
    for listing in listings {
        for c in &listing.records {
            table.push_row(vec![
                listing.node.clone(),
                c.namespace.clone(),
                c.display_id().into_owned(),
                c.image.clone(),
                c.pid.to_string(),
                c.status.clone(),
            ]);
        }
    }
    table
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::record::{NodeMetadata, NodeReply};
    use crate::render::{CONTAINER_SEPARATOR, PROCESS_SEPARATOR};

    fn process(pid: i32, resident_memory: u64, cpu_time: f64) -> Process {
        Process {
            pid,
            state: "S".to_owned(),
            threads: 1,
            resident_memory,
            cpu_time,
            command: format!("proc{pid}"),
            ..Default::default()
        }
    }

    fn container(id: &str, pod_id: &str) -> Container {
        Container {
            namespace: "k8s.io".to_owned(),
            id: id.to_owned(),
            pod_id: pod_id.to_owned(),
            image: "registry.k8s.io/pause:3.9".to_owned(),
            pid: 42,
            status: "RUNNING".to_owned(),
            ..Default::default()
        }
    }

    fn hostname(name: &str) -> Option<NodeMetadata> {
        Some(NodeMetadata {
            hostname: name.to_owned(),
        })
    }

    fn column(table: &Table, index: usize) -> Vec<&str> {
        table.rows().iter().map(|row| row[index].as_str()).collect()
    }

    #[derive(Default)]
    struct FakeMachine {
        processes: Mutex<Option<machine::Result<Reply<Process>>>>,
        containers: Mutex<Option<machine::Result<Reply<Container>>>>,
        seen_targets: Mutex<Vec<Targets>>,
        seen_queries: Mutex<Vec<ContainerQuery>>,
    }

    impl Machine for FakeMachine {
        async fn processes(&self, targets: &Targets) -> machine::Result<Reply<Process>> {
            self.seen_targets.lock().unwrap().push(targets.clone());
            self.processes.lock().unwrap().take().expect("unexpected query")
        }

        async fn containers(
            &self,
            targets: &Targets,
            query: &ContainerQuery,
        ) -> machine::Result<Reply<Container>> {
            self.seen_targets.lock().unwrap().push(targets.clone());
            self.seen_queries.lock().unwrap().push(query.clone());
            self.containers.lock().unwrap().take().expect("unexpected query")
        }
    }

    #[test]
    fn groups_by_node_in_reply_order_and_sorts_within_groups() {
        let reply = Reply::new(
            vec![
                NodeReply::new(
                    hostname("worker-2"),
                    vec![process(1, 10, 0.0), process(2, 30, 0.0)],
                ),
                NodeReply::new(
                    hostname("worker-1"),
                    vec![process(3, 20, 0.0), process(4, 50, 0.0)],
                ),
            ],
            Some("10.5.0.2".to_owned()),
        );

        let table = process_table(&merge_processes(reply, SortKey::ResidentMemory));
        assert_eq!(column(&table, 0), vec!["worker-2", "worker-2", "worker-1", "worker-1"]);
        assert_eq!(column(&table, 1), vec!["2", "1", "4", "3"]);
    }

    #[test]
    fn unnamed_nodes_fall_back_to_peer_address() {
        let reply = Reply::new(
            vec![NodeReply::new(None, vec![process(1, 1, 0.0)])],
            Some("10.5.0.2".to_owned()),
        );
        let listings = merge_processes(reply, SortKey::CpuTime);
        assert_eq!(listings[0].node, "10.5.0.2");
    }

    #[test]
    fn formats_process_cells() {
        let mut p = process(7, 3 * 1024 * 1024, 12.5);
        p.virtual_memory = 1536;
        p.executable = "/usr/bin/containerd".to_owned();
        p.args = "containerd --config /etc/containerd.toml".to_owned();
        let reply = Reply::new(vec![NodeReply::new(hostname("cp-1"), vec![p])], None);

        let table = process_table(&merge_processes(reply, SortKey::ResidentMemory));
        assert_eq!(
            table.rows()[0],
            vec![
                "cp-1",
                "7",
                "S",
                "1",
                "12.50",
                "1.5K",
                "3M",
                "/usr/bin/containerd --config /etc/containerd.toml",
            ]
        );
    }

    #[test]
    fn empty_reply_renders_header_only() {
        let reply = Reply::new(vec![NodeReply::new(hostname("cp-1"), Vec::new())], None);
        let table = process_table(&merge_processes(reply, SortKey::ResidentMemory));

        assert!(table.rows().is_empty());
        assert_eq!(
            table.render(PROCESS_SEPARATOR),
            "NODE | PID | STATE | THREADS | CPU-TIME | VIRTMEM | RESMEM | COMMAND"
        );

        let table = container_table(&[]);
        assert_eq!(
            table.render(CONTAINER_SEPARATOR),
            "NODE   NAMESPACE   ID   IMAGE   PID   STATUS"
        );
    }

    #[test]
    fn nested_containers_are_prefixed_and_sorted_by_id() {
        let reply = Reply::new(
            vec![NodeReply::new(
                hostname("worker-1"),
                vec![container("b", "a"), container("a", "a")],
            )],
            None,
        );

        let table = container_table(&merge_containers(reply));
        assert_eq!(column(&table, 2), vec!["a", "└─ b"]);
    }

    #[tokio::test]
    async fn reporter_issues_one_query_per_call() {
        let machine = FakeMachine::default();
        *machine.processes.lock().unwrap() = Some(Ok(Reply::new(
            vec![NodeReply::new(hostname("cp-1"), vec![process(1, 1, 0.0)])],
            None,
        )));
        let reporter = Reporter::new(machine, Targets::new(["10.5.0.2", "10.5.0.3"]));

        let table = reporter.processes(SortKey::ResidentMemory).await.unwrap();
        assert_eq!(table.rows().len(), 1);
        assert_eq!(
            *reporter.machine.seen_targets.lock().unwrap(),
            vec![Targets::new(["10.5.0.2", "10.5.0.3"])]
        );
    }

    #[tokio::test]
    async fn reporter_passes_container_query() {
        let machine = FakeMachine::default();
        *machine.containers.lock().unwrap() = Some(Ok(Reply::new(Vec::new(), None)));
        let reporter = Reporter::new(machine, Targets::default());
        let query = ContainerQuery::new(true, false);

        let table = reporter.containers(&query).await.unwrap();
        assert!(table.rows().is_empty());
        assert_eq!(*reporter.machine.seen_queries.lock().unwrap(), vec![query]);
    }

    #[tokio::test]
    async fn reporter_returns_query_errors() {
        let machine = FakeMachine::default();
        *machine.processes.lock().unwrap() = Some(Err(machine::Error::Rpc(Box::new(
            tonic::Status::unavailable("node down"),
        ))));
        let reporter = Reporter::new(machine, Targets::default());

        let err = reporter.processes(SortKey::CpuTime).await.unwrap_err();
        assert!(matches!(err, Error::Query(machine::Error::Rpc(_))));
    }

    #[test]
    fn narrowing_keeps_first_target() {
        let mut reporter = Reporter::new(
            FakeMachine::default(),
            Targets::new(["10.5.0.2", "10.5.0.3"]),
        );
        reporter.narrow_to_first_target();
        assert_eq!(reporter.targets(), &Targets::new(["10.5.0.2"]));
    }
}
