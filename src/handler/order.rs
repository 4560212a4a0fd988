//! The order handler.

use crate::backend::{DatabaseBackend, Memory, OrderBackend};
use crate::conv::order_from_wire;
use crate::error::StoreError;
use crate::proto::order::v2::order_persistence_service_server::{
    OrderPersistenceService, OrderPersistenceServiceServer, SERVICE_NAME,
};
use crate::proto::order::v2::{
    CountOrderResponse, CreateOrderRequest, CreateOrderResponse, DeleteOrderRequest,
    DeleteOrderResponse, Empty, GetOrderRequest, GetOrderResponse, ListOrderResponse,
    UpdateOrderRequest, UpdateOrderResponse,
};
use crate::tracing_shim::warn;
use crate::{telemetry, Location, Order, RpcResponse};
use std::path::PathBuf;
use tonic::{Request, Response, Status};

/// Serves `persistd.order.v2.OrderPersistenceService` from an [`OrderBackend`].
#[must_use]
#[derive(Debug)]
pub struct OrderHandler<Backend> {
    backend: Backend,
}

impl<Backend> OrderHandler<Backend> {
    /// Serve orders from the given backend.
    #[inline]
    pub const fn new(backend: Backend) -> Self {
        Self { backend }
    }

    /// The backend this handler serves from.
    #[inline]
    pub const fn backend(&self) -> &Backend {
        &self.backend
    }

    /// Wrap the handler in the generated gRPC server so it can be bound to a listener.
    #[inline]
    pub fn into_server(self) -> OrderPersistenceServiceServer<Self>
    where
        Backend: OrderBackend + 'static,
    {
        OrderPersistenceServiceServer::new(self)
    }
}

impl<Backend> OrderHandler<Backend>
where
    Backend: DatabaseBackend,
{
    /// Open the backend at the given location and serve orders from it.
    #[inline]
    pub fn at_location(location: Location) -> Result<Self, Backend::Error> {
        Ok(Self::new(Backend::at_location(location)?))
    }

    /// Open the backend at the given path on disk and serve orders from it.
    #[inline]
    pub fn at_path<P>(path: P) -> Result<Self, Backend::Error>
    where
        P: Into<PathBuf>,
    {
        Self::at_location(Location::OnDisk { path: path.into() })
    }
}

impl OrderHandler<Memory<Order>> {
    /// Serve orders from a fresh in-memory store.
    #[inline]
    pub fn in_memory() -> Self {
        Self::new(Memory::new())
    }
}

/// Report a storage failure through the transport.
fn into_status(operation: &'static str, err: StoreError) -> Status {
    warn!(operation, error = %err, "order storage failure");
    err.into()
}

#[tonic::async_trait]
impl<Backend> OrderPersistenceService for OrderHandler<Backend>
where
    Backend: OrderBackend + 'static,
{
    async fn create(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> RpcResponse<CreateOrderResponse> {
        telemetry::observe(SERVICE_NAME, "create", async {
            let CreateOrderRequest { order } = request.into_inner();
            let Order { items, .. } = order_from_wire(order);
            let order = self
                .backend
                .create(Order::new(items))
                .await
                .map_err(|err| into_status("create", err))?;
            Ok(Response::new(CreateOrderResponse {
                order: Some(order.into()),
            }))
        })
        .await
    }

    async fn get(&self, request: Request<GetOrderRequest>) -> RpcResponse<GetOrderResponse> {
        telemetry::observe(SERVICE_NAME, "get", async {
            let GetOrderRequest { id } = request.into_inner();
            let order = self
                .backend
                .get(id)
                .await
                .map_err(|err| into_status("get", err))?;
            Ok(Response::new(GetOrderResponse {
                order: Some(order.into()),
            }))
        })
        .await
    }

    async fn update(
        &self,
        request: Request<UpdateOrderRequest>,
    ) -> RpcResponse<UpdateOrderResponse> {
        telemetry::observe(SERVICE_NAME, "update", async {
            let UpdateOrderRequest { id, order } = request.into_inner();
            let order = self
                .backend
                .update(id, order_from_wire(order))
                .await
                .map_err(|err| into_status("update", err))?;
            Ok(Response::new(UpdateOrderResponse {
                order: Some(order.into()),
            }))
        })
        .await
    }

    async fn delete(
        &self,
        request: Request<DeleteOrderRequest>,
    ) -> RpcResponse<DeleteOrderResponse> {
        telemetry::observe(SERVICE_NAME, "delete", async {
            let DeleteOrderRequest { id } = request.into_inner();
            let order = self
                .backend
                .delete(id)
                .await
                .map_err(|err| into_status("delete", err))?;
            Ok(Response::new(DeleteOrderResponse {
                order: Some(order.into()),
            }))
        })
        .await
    }

    async fn list(&self, _request: Request<Empty>) -> RpcResponse<ListOrderResponse> {
        telemetry::observe(SERVICE_NAME, "list", async {
            let orders = self
                .backend
                .list()
                .await
                .map_err(|err| into_status("list", err))?;
            Ok(Response::new(ListOrderResponse {
                list_of_orders: orders.into_iter().map(Into::into).collect(),
            }))
        })
        .await
    }

    async fn count(&self, _request: Request<Empty>) -> RpcResponse<CountOrderResponse> {
        telemetry::observe(SERVICE_NAME, "count", async {
            let count = self
                .backend
                .count()
                .await
                .map_err(|err| into_status("count", err))?;
            let number_of_orders = i64::try_from(count)
                .map_err(|_| Status::internal(format!("order count {count} out of range")))?;
            Ok(Response::new(CountOrderResponse { number_of_orders }))
        })
        .await
    }
}
