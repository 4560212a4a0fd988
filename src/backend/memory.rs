use crate::backend::{ItemBackend, OrderBackend};
use crate::error::StoreError;
use crate::{Entity, EntityId, Item, Order};
use std::collections::HashMap;
use std::fmt;
use tokio::sync::RwLock;
use tonic::async_trait;

/// Mutable state of a [`Memory`] backend, always accessed through its lock.
struct Table<E> {
    rows: HashMap<EntityId, E>,
    /// The id the next created entity receives. `None` once every id has been handed out.
    next_id: Option<EntityId>,
}

/// An in-memory backend for a single entity family.
///
/// All state sits behind one lock, so every operation is atomic. Identifiers start at 1 and are
/// never reused, even after the entity holding one is deleted.
pub struct Memory<E> {
    table: RwLock<Table<E>>,
}

impl<E> fmt::Debug for Memory<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memory").finish_non_exhaustive()
    }
}

impl<E> Default for Memory<E> {
    fn default() -> Self {
        Self {
            table: RwLock::new(Table {
                rows: HashMap::new(),
                next_id: Some(1),
            }),
        }
    }
}

impl<E> Memory<E>
where
    E: Entity,
{
    /// Create an empty store.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    async fn insert(&self, entity: E) -> Result<E, StoreError> {
        let mut table = self.table.write().await;
        let id = table
            .next_id
            .ok_or_else(|| StoreError::Internal(format!("{} ids exhausted", E::KIND)))?;
        table.next_id = id.checked_add(1);
        let entity = entity.with_id(id);
        let _previous = table.rows.insert(id, entity.clone());
        Ok(entity)
    }

    async fn fetch(&self, id: EntityId) -> Result<E, StoreError> {
        self.table
            .read()
            .await
            .rows
            .get(&id)
            .cloned()
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }

    async fn replace(&self, id: EntityId, entity: E) -> Result<E, StoreError> {
        let mut table = self.table.write().await;
        let Some(row) = table.rows.get_mut(&id) else {
            return Err(StoreError::not_found::<E>(id));
        };
        *row = entity.with_id(id);
        Ok(row.clone())
    }

    async fn remove(&self, id: EntityId) -> Result<E, StoreError> {
        self.table
            .write()
            .await
            .rows
            .remove(&id)
            .ok_or_else(|| StoreError::not_found::<E>(id))
    }

    async fn all(&self) -> Vec<E> {
        self.table.read().await.rows.values().cloned().collect()
    }

    async fn len(&self) -> u64 {
        self.table.read().await.rows.len() as u64
    }
}

#[async_trait]
impl ItemBackend for Memory<Item> {
    async fn create(&self, item: Item) -> Result<Item, StoreError> {
        self.insert(item).await
    }

    async fn get(&self, id: EntityId) -> Result<Item, StoreError> {
        self.fetch(id).await
    }

    async fn update(&self, id: EntityId, item: Item) -> Result<Item, StoreError> {
        self.replace(id, item).await
    }

    async fn delete(&self, id: EntityId) -> Result<Item, StoreError> {
        self.remove(id).await
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        Ok(self.all().await)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.len().await)
    }
}

#[async_trait]
impl OrderBackend for Memory<Order> {
    async fn create(&self, order: Order) -> Result<Order, StoreError> {
        self.insert(order).await
    }

    async fn get(&self, id: EntityId) -> Result<Order, StoreError> {
        self.fetch(id).await
    }

    async fn update(&self, id: EntityId, order: Order) -> Result<Order, StoreError> {
        self.replace(id, order).await
    }

    async fn delete(&self, id: EntityId) -> Result<Order, StoreError> {
        self.remove(id).await
    }

    async fn list(&self) -> Result<Vec<Order>, StoreError> {
        Ok(self.all().await)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.len().await)
    }
}
