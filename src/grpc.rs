use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{pin, task};

use hyper_util::rt::TokioIo;
use tonic::transport::{Channel, Endpoint};

const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Upper bound for a single call, so a hung node cannot stall a listing.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone)]
struct UnixConnector {
    path: PathBuf,
}

impl tower::Service<hyper::Uri> for UnixConnector {
    type Response = TokioIo<tokio::net::UnixStream>;

    type Error = std::io::Error;

    type Future = pin::Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(
        &mut self,
        _cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        task::Poll::Ready(Ok(()))
    }

    fn call(&mut self, _req: hyper::Uri) -> Self::Future {
        let path = self.path.clone();
        Box::pin(async move {
            let stream = tokio::net::UnixStream::connect(path).await?;

            Ok(TokioIo::new(stream))
        })
    }
}

/// Opens a channel to a gRPC server listening on a unix socket.
pub async fn channel_for_unix_socket(
    path: impl AsRef<Path>,
) -> Result<Channel, tonic::transport::Error> {
    let path = path.as_ref();
    log::debug!("Connecting to {}...", path.display());
    let connector = UnixConnector {
        path: path.to_path_buf(),
    };
    // The authority is ignored by the connector; it only has to be a valid URI.
    let channel = Endpoint::from_static("http://[::]:50000")
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .connect_with_connector(connector)
        .await?;
    log::debug!("Created channel for {}.", path.display());

    Ok(channel)
}

/// Opens a channel to a gRPC server reachable over TCP.
pub async fn channel_for_uri(uri: &hyper::Uri) -> Result<Channel, tonic::transport::Error> {
    log::debug!("Connecting to {uri}...");
    let channel = Endpoint::from_shared(uri.to_string())?
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(REQUEST_TIMEOUT)
        .connect()
        .await?;
    log::debug!("Created channel for {uri}.");

    Ok(channel)
}
