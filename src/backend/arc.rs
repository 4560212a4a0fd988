use crate::backend::{DatabaseBackend, ItemBackend, OrderBackend};
use crate::error::StoreError;
use crate::{EntityId, Item, Location, Order};
use std::sync::Arc;
use tonic::async_trait;

impl<Backend> DatabaseBackend for Arc<Backend>
where
    Backend: DatabaseBackend,
{
    type Error = Backend::Error;

    fn at_location(location: Location) -> Result<Self, Self::Error> {
        Backend::at_location(location).map(Self::new)
    }

    fn location(&self) -> &Location {
        self.as_ref().location()
    }
}

#[async_trait]
impl<Backend> ItemBackend for Arc<Backend>
where
    Backend: ItemBackend + ?Sized,
{
    async fn create(&self, item: Item) -> Result<Item, StoreError> {
        self.as_ref().create(item).await
    }

    async fn get(&self, id: EntityId) -> Result<Item, StoreError> {
        self.as_ref().get(id).await
    }

    async fn update(&self, id: EntityId, item: Item) -> Result<Item, StoreError> {
        self.as_ref().update(id, item).await
    }

    async fn delete(&self, id: EntityId) -> Result<Item, StoreError> {
        self.as_ref().delete(id).await
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.as_ref().list().await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.as_ref().count().await
    }
}

#[async_trait]
impl<Backend> OrderBackend for Arc<Backend>
where
    Backend: OrderBackend + ?Sized,
{
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        self.as_ref().create(order).await
    }

    async fn get(&self, id: EntityId) -> Result<Order, StoreError> {
        self.as_ref().get(id).await
    }

    async fn update(&self, id: EntityId, order: Order) -> Result<Order, StoreError> {
        self.as_ref().update(id, order).await
    }

    async fn delete(&self, id: EntityId) -> Result<Order, StoreError> {
        self.as_ref().delete(id).await
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        self.as_ref().list().await
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.as_ref().count().await
    }
}
