use persistd::backend::ItemBackend;
use persistd::error::StoreError;
use persistd::{EntityId, Item};
use std::time::Duration;
use tonic::async_trait;

/// Sort by id so that listings can be compared regardless of backend ordering.
pub(crate) fn sorted_by_id<E>(mut entities: Vec<E>, id: impl Fn(&E) -> EntityId) -> Vec<E> {
    entities.sort_by_key(|entity| id(entity));
    entities
}

/// An item backend that takes `delay` to answer any call.
///
/// `get` answers with an item carrying the requested id; every other operation fails.
#[derive(Debug)]
pub(crate) struct Slow {
    pub(crate) delay: Duration,
}

impl Slow {
    async fn wait(&self) {
        tokio::time::sleep(self.delay).await;
    }
}

#[async_trait]
impl ItemBackend for Slow {
    async fn create(&self, _item: Item) -> Result<Item, StoreError> {
        self.wait().await;
        Err(StoreError::Internal("create unsupported".to_owned()))
    }

    async fn get(&self, id: EntityId) -> Result<Item, StoreError> {
        self.wait().await;
        Ok(Item {
            id,
            description: "slow".to_owned(),
        })
    }

    async fn update(&self, _id: EntityId, _item: Item) -> Result<Item, StoreError> {
        self.wait().await;
        Err(StoreError::Internal("update unsupported".to_owned()))
    }

    async fn delete(&self, _id: EntityId) -> Result<Item, StoreError> {
        self.wait().await;
        Err(StoreError::Internal("delete unsupported".to_owned()))
    }

    async fn list(&self) -> Result<Vec<Item>, StoreError> {
        self.wait().await;
        Ok(Vec::new())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        self.wait().await;
        Ok(0)
    }
}
