//! Clients connected to a handler running in the same process.
//!
//! The handler is served over an in-memory duplex stream on a spawned task, so calls go through
//! the full gRPC encoding and transport path without opening a socket.

use crate::backend::{ItemBackend, OrderBackend};
use crate::client::{ClientConfig, ItemClient, OrderClient};
use crate::handler::{ItemHandler, OrderHandler};
use crate::registrar::ServiceSet;
use hyper_util::rt::TokioIo;
use tonic::transport::{Channel, Endpoint};

const DUPLEX_SIZE: usize = 1024;

/// Serve `services` on a spawned task and return a channel connected to them.
async fn spawn(services: ServiceSet) -> Result<Channel, tonic::transport::Error> {
    let (client, server) = tokio::io::duplex(DUPLEX_SIZE);

    let _join_handle = tokio::spawn(
        services.serve_with_incoming(tokio_stream::once(Ok::<_, std::io::Error>(server))),
    );

    // The URI is required but never resolved.
    let mut client = Some(client);
    Endpoint::try_from("http://[::]:50051")?
        .connect_with_connector(tower::service_fn(move |_| {
            let client = client.take();
            async move {
                client.map(TokioIo::new).ok_or_else(|| {
                    std::io::Error::new(std::io::ErrorKind::Other, "Client already taken")
                })
            }
        }))
        .await
}

/// An item client served by the given backend.
pub async fn item_client<Backend>(backend: Backend) -> Result<ItemClient, tonic::transport::Error>
where
    Backend: ItemBackend + 'static,
{
    item_client_with_config(backend, ClientConfig::default()).await
}

/// An item client with the given settings, served by the given backend.
pub async fn item_client_with_config<Backend>(
    backend: Backend,
    config: ClientConfig,
) -> Result<ItemClient, tonic::transport::Error>
where
    Backend: ItemBackend + 'static,
{
    let channel = spawn(ServiceSet::new().add_items(ItemHandler::new(backend))).await?;
    Ok(ItemClient::with_config(channel, config))
}

/// An order client served by the given backend.
pub async fn order_client<Backend>(
    backend: Backend,
) -> Result<OrderClient, tonic::transport::Error>
where
    Backend: OrderBackend + 'static,
{
    order_client_with_config(backend, ClientConfig::default()).await
}

/// An order client with the given settings, served by the given backend.
pub async fn order_client_with_config<Backend>(
    backend: Backend,
    config: ClientConfig,
) -> Result<OrderClient, tonic::transport::Error>
where
    Backend: OrderBackend + 'static,
{
    let channel = spawn(ServiceSet::new().add_orders(OrderHandler::new(backend))).await?;
    Ok(OrderClient::with_config(channel, config))
}
