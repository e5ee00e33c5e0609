use tonic::codec::ProstCodec;
use tonic::codegen::http::uri::PathAndQuery;
use tonic::transport::Channel;

use super::proto::{self, CONTAINERS_PATH, PROCESSES_PATH};
use super::{ContainerQuery, Error, Machine, Result, ServerAddress, Targets};
use crate::record::{Container, NodeReply, Process, Reply};

/// [`Machine`] implementation backed by the `machine.MachineService` gRPC API.
#[derive(Debug, Clone)]
pub struct GrpcMachine {
    channel: Channel,
    peer: String,
}

impl GrpcMachine {
    /// Connects to the machine API served at `address`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the channel cannot be established.
    pub async fn connect(address: &ServerAddress) -> Result<Self> {
        let channel = match address {
            ServerAddress::Unix(path) => crate::grpc::channel_for_unix_socket(path).await,
            ServerAddress::Http(uri) => crate::grpc::channel_for_uri(uri).await,
        }
        .map_err(|source| Error::Connect {
            endpoint: address.to_string(),
            source,
        })?;

        Ok(Self {
            channel,
            peer: address.peer(),
        })
    }

    async fn unary<Req, Resp>(
        &self,
        path: &'static str,
        targets: &Targets,
        message: Req,
    ) -> Result<Resp>
    where
        Req: prost::Message + Send + Sync + 'static,
        Resp: prost::Message + Default + Send + Sync + 'static,
    {
        let mut grpc = tonic::client::Grpc::new(self.channel.clone());
        grpc.ready()
            .await
            .map_err(|err| Error::NotReady(err.into()))?;

        let mut request = tonic::Request::new(message);
        targets.apply(request.metadata_mut())?;
        log::debug!("Calling {path} for {} target(s)", targets.len());

        let codec: ProstCodec<Req, Resp> = ProstCodec::default();
        let response = grpc
            .unary(request, PathAndQuery::from_static(path), codec)
            .await
            .map_err(|status| Error::Rpc(Box::new(status)))?;

        Ok(response.into_inner())
    }
}

impl Machine for GrpcMachine {
    async fn processes(&self, targets: &Targets) -> Result<Reply<Process>> {
        let response: proto::ProcessesResponse =
            self.unary(PROCESSES_PATH, targets, ()).await?;
        let nodes = response
            .messages
            .into_iter()
            .map(NodeReply::from)
            .collect();

        Ok(Reply::new(nodes, Some(self.peer.clone())))
    }

    async fn containers(
        &self,
        targets: &Targets,
        query: &ContainerQuery,
    ) -> Result<Reply<Container>> {
        let request = proto::ContainersRequest {
            namespace: query.namespace.clone(),
            driver: query.driver as i32,
        };
        let response: proto::ContainersResponse =
            self.unary(CONTAINERS_PATH, targets, request).await?;
        let nodes = response
            .messages
            .into_iter()
            .map(NodeReply::from)
            .collect();

        Ok(Reply::new(nodes, Some(self.peer.clone())))
    }
}
