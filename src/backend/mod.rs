//! Storage backends.
//!
//! A backend persists one entity family and assigns identifiers on creation. Each operation is
//! atomic for the single entity it touches; nothing is guaranteed across entities.

mod arc;
mod memory;
#[cfg(feature = "sqlite")]
mod sqlite;

pub use self::memory::Memory;
#[cfg(feature = "sqlite")]
pub use self::sqlite::Sqlite;
use crate::error::StoreError;
use crate::{EntityId, Item, Location, Order};
use tonic::async_trait;

/// A backend that is opened at a [`Location`].
pub trait DatabaseBackend: Sized {
    /// The error returned when the backend cannot be opened.
    type Error;

    /// Open the backend at the given location. The location is created if it does not exist.
    fn at_location(location: Location) -> Result<Self, Self::Error>;

    /// The location the backend was opened at.
    fn location(&self) -> &Location;
}

/// Storage for [`Item`]s.
#[async_trait]
pub trait ItemBackend: Send + Sync {
    /// Store a new item and return it with its assigned id. Any id on `item` is ignored.
    async fn create(&self, item: Item) -> Result<Item, StoreError>;
    /// Obtain the item with the given id.
    async fn get(&self, id: EntityId) -> Result<Item, StoreError>;
    /// Replace the description of the item with the given id, returning the updated item.
    async fn update(&self, id: EntityId, item: Item) -> Result<Item, StoreError>;
    /// Remove the item with the given id, returning it as it was last stored.
    async fn delete(&self, id: EntityId) -> Result<Item, StoreError>;
    /// All stored items, in no particular order.
    async fn list(&self) -> Result<Vec<Item>, StoreError>;
    /// The number of stored items.
    async fn count(&self) -> Result<u64, StoreError>;
}

/// Storage for [`Order`]s.
#[async_trait]
pub trait OrderBackend: Send + Sync {
    /// Store a new order and return it with its assigned id. Any id on `order` is ignored.
    async fn create(&self, order: Order) -> Result<Order, StoreError>;
    /// Obtain the order with the given id.
    async fn get(&self, id: EntityId) -> Result<Order, StoreError>;
    /// Replace the items of the order with the given id, returning the updated order.
    async fn update(&self, id: EntityId, order: Order) -> Result<Order, StoreError>;
    /// Remove the order with the given id, returning it as it was last stored.
    async fn delete(&self, id: EntityId) -> Result<Order, StoreError>;
    /// All stored orders, in no particular order.
    async fn list(&self) -> Result<Vec<Order>, StoreError>;
    /// The number of stored orders.
    async fn count(&self) -> Result<u64, StoreError>;
}
