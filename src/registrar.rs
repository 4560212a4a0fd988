//! Aggregation of handlers into one bindable set of services.

use crate::backend::{ItemBackend, OrderBackend};
use crate::handler::{ItemHandler, OrderHandler};
use crate::proto::item::v1::item_persistence_service_server::SERVICE_NAME as ITEM_SERVICE;
use crate::proto::order::v2::order_persistence_service_server::SERVICE_NAME as ORDER_SERVICE;
use crate::tracing_shim::info;
use std::future::Future;
use std::net::SocketAddr;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio_stream::Stream;
use tonic::service::{Routes, RoutesBuilder};
use tonic::transport::server::Connected;
use tonic::transport::Server;

/// The services to bind to a single listener.
///
/// Handlers are added fully constructed. The set itself holds no configuration; every service in
/// it is served on the same address.
#[must_use]
#[derive(Debug, Default, Clone)]
pub struct ServiceSet {
    routes: RoutesBuilder,
    names: Vec<&'static str>,
}

impl ServiceSet {
    /// An empty set.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add the item service.
    pub fn add_items<Backend>(mut self, handler: ItemHandler<Backend>) -> Self
    where
        Backend: ItemBackend + 'static,
    {
        let _routes = self.routes.add_service(handler.into_server());
        self.names.push(ITEM_SERVICE);
        self
    }

    /// Add the order service.
    pub fn add_orders<Backend>(mut self, handler: OrderHandler<Backend>) -> Self
    where
        Backend: OrderBackend + 'static,
    {
        let _routes = self.routes.add_service(handler.into_server());
        self.names.push(ORDER_SERVICE);
        self
    }

    /// The fully qualified names of the services in the set, in the order they were added.
    #[inline]
    pub fn names(&self) -> &[&'static str] {
        &self.names
    }

    /// The routes for all services in the set.
    #[inline]
    pub fn into_routes(self) -> Routes {
        self.routes.routes()
    }

    /// Serve every service in the set on `addr` until the server fails.
    pub async fn serve(self, addr: SocketAddr) -> Result<(), tonic::transport::Error> {
        info!(%addr, services = ?self.names, "serving");
        Server::builder()
            .add_routes(self.into_routes())
            .serve(addr)
            .await
    }

    /// Serve every service in the set on `addr` until `signal` resolves.
    pub async fn serve_with_shutdown<F>(
        self,
        addr: SocketAddr,
        signal: F,
    ) -> Result<(), tonic::transport::Error>
    where
        F: Future<Output = ()>,
    {
        info!(%addr, services = ?self.names, "serving");
        Server::builder()
            .add_routes(self.into_routes())
            .serve_with_shutdown(addr, signal)
            .await
    }

    /// Serve every service in the set on connections from `incoming`.
    pub async fn serve_with_incoming<I, IO, IE>(
        self,
        incoming: I,
    ) -> Result<(), tonic::transport::Error>
    where
        I: Stream<Item = Result<IO, IE>>,
        IO: AsyncRead + AsyncWrite + Connected + Unpin + Send + 'static,
        IO::ConnectInfo: Clone + Send + Sync + 'static,
        IE: Into<Box<dyn std::error::Error + Send + Sync>>,
    {
        info!(services = ?self.names, "serving on provided connections");
        Server::builder()
            .add_routes(self.into_routes())
            .serve_with_incoming(incoming)
            .await
    }
}
