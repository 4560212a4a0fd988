//! The item handler.

use crate::backend::{DatabaseBackend, ItemBackend, Memory};
use crate::conv::item_from_wire;
use crate::error::StoreError;
use crate::proto::item::v1::item_persistence_service_server::{
    ItemPersistenceService, ItemPersistenceServiceServer, SERVICE_NAME,
};
use crate::proto::item::v1::{
    CountItemResponse, CreateItemRequest, CreateItemResponse, DeleteItemRequest,
    DeleteItemResponse, Empty, GetItemRequest, GetItemResponse, ListItemResponse,
    UpdateItemRequest, UpdateItemResponse,
};
use crate::tracing_shim::warn;
use crate::{telemetry, Item, Location, RpcResponse};
use std::path::PathBuf;
use tonic::{Request, Response, Status};

/// Serves `persistd.item.v1.ItemPersistenceService` from an [`ItemBackend`].
#[must_use]
#[derive(Debug)]
pub struct ItemHandler<Backend> {
    backend: Backend,
}

impl<Backend> ItemHandler<Backend> {
    /// Serve items from the given backend.
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
    pub fn into_server(self) -> ItemPersistenceServiceServer<Self>
    where
        Backend: ItemBackend + 'static,
    {
        ItemPersistenceServiceServer::new(self)
    }
}

impl<Backend> ItemHandler<Backend>
where
    Backend: DatabaseBackend,
{
    /// Open the backend at the given location and serve items from it.
    #[inline]
    pub fn at_location(location: Location) -> Result<Self, Backend::Error> {
        Ok(Self::new(Backend::at_location(location)?))
    }

    /// Open the backend at the given path on disk and serve items from it.
    #[inline]
    pub fn at_path<P>(path: P) -> Result<Self, Backend::Error>
    where
        P: Into<PathBuf>,
    {
        Self::at_location(Location::OnDisk { path: path.into() })
    }
}

impl ItemHandler<Memory<Item>> {
    /// Serve items from a fresh in-memory store.
    #[inline]
    pub fn in_memory() -> Self {
        Self::new(Memory::new())
    }
}

/// Report a storage failure through the transport.
fn into_status(operation: &'static str, err: StoreError) -> Status {
    warn!(operation, error = %err, "item storage failure");
    err.into()
}

#[tonic::async_trait]
impl<Backend> ItemPersistenceService for ItemHandler<Backend>
where
    Backend: ItemBackend + 'static,
{
    async fn create(&self, request: Request<CreateItemRequest>) -> RpcResponse<CreateItemResponse> {
        telemetry::observe(SERVICE_NAME, "create", async {
            let CreateItemRequest { item } = request.into_inner();
            let Item { description, .. } = item_from_wire(item);
            let item = self
                .backend
                .create(Item::new(description))
                .await
                .map_err(|err| into_status("create", err))?;
            Ok(Response::new(CreateItemResponse {
                item: Some(item.into()),
            }))
        })
        .await
    }

    async fn get(&self, request: Request<GetItemRequest>) -> RpcResponse<GetItemResponse> {
        telemetry::observe(SERVICE_NAME, "get", async {
            let GetItemRequest { id } = request.into_inner();
            let item = self
                .backend
                .get(id)
                .await
                .map_err(|err| into_status("get", err))?;
            Ok(Response::new(GetItemResponse {
                item: Some(item.into()),
            }))
        })
        .await
    }

    async fn update(&self, request: Request<UpdateItemRequest>) -> RpcResponse<UpdateItemResponse> {
        telemetry::observe(SERVICE_NAME, "update", async {
            let UpdateItemRequest { id, item } = request.into_inner();
            let item = self
                .backend
                .update(id, item_from_wire(item))
                .await
                .map_err(|err| into_status("update", err))?;
            Ok(Response::new(UpdateItemResponse {
                item: Some(item.into()),
            }))
        })
        .await
    }

    async fn delete(&self, request: Request<DeleteItemRequest>) -> RpcResponse<DeleteItemResponse> {
        telemetry::observe(SERVICE_NAME, "delete", async {
            let DeleteItemRequest { id } = request.into_inner();
            let item = self
                .backend
                .delete(id)
                .await
                .map_err(|err| into_status("delete", err))?;
            Ok(Response::new(DeleteItemResponse {
                item: Some(item.into()),
            }))
        })
        .await
    }

    async fn list(&self, _request: Request<Empty>) -> RpcResponse<ListItemResponse> {
        telemetry::observe(SERVICE_NAME, "list", async {
            let items = self
                .backend
                .list()
                .await
                .map_err(|err| into_status("list", err))?;
            Ok(Response::new(ListItemResponse {
                item: items.into_iter().map(Into::into).collect(),
            }))
        })
        .await
    }

    async fn count(&self, _request: Request<Empty>) -> RpcResponse<CountItemResponse> {
        telemetry::observe(SERVICE_NAME, "count", async {
            let count = self
                .backend
                .count()
                .await
                .map_err(|err| into_status("count", err))?;
            let number_of_items = i64::try_from(count)
                .map_err(|_| Status::internal(format!("item count {count} out of range")))?;
            Ok(Response::new(CountItemResponse { number_of_items }))
        })
        .await
    }
}
