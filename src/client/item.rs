use crate::client::{ClientConfig, Connection, Error};
use crate::conv::item_from_wire;
use crate::proto::item::v1::item_persistence_service_client::ItemPersistenceServiceClient;
use crate::proto::item::v1::item_persistence_service_server::SERVICE_NAME;
use crate::proto::item::v1::{
    CountItemResponse, CreateItemRequest, CreateItemResponse, DeleteItemRequest,
    DeleteItemResponse, Empty, GetItemRequest, GetItemResponse, ListItemResponse,
    UpdateItemRequest, UpdateItemResponse,
};
use crate::{EntityId, Item};
use tonic::transport::{Channel, Endpoint};

/// A client for `persistd.item.v1.ItemPersistenceService`.
///
/// Clones share the underlying channel, so shutting down one clone shuts down all of them.
#[derive(Debug, Clone)]
pub struct ItemClient {
    connection: Connection,
}

impl ItemClient {
    /// Connect to a server at the given URI, such as `http://[::1]:50051`.
    #[inline]
    pub async fn connect(dst: impl Into<String>) -> Result<Self, tonic::transport::Error> {
        Self::connect_with(dst, ClientConfig::default()).await
    }

    /// Connect to a server at the given URI with the given settings.
    pub async fn connect_with(
        dst: impl Into<String>,
        config: ClientConfig,
    ) -> Result<Self, tonic::transport::Error> {
        let channel = Endpoint::from_shared(dst.into())?.connect().await?;
        Ok(Self::with_config(channel, config))
    }

    /// Use an existing channel.
    #[inline]
    pub fn new(channel: Channel) -> Self {
        Self::with_config(channel, ClientConfig::default())
    }

    /// Use an existing channel with the given settings.
    #[inline]
    pub fn with_config(channel: Channel, config: ClientConfig) -> Self {
        Self {
            connection: Connection::new(SERVICE_NAME, channel, config),
        }
    }

    /// Store a new item with the given description.
    pub async fn create(&self, description: impl Into<String>) -> Result<Item, Error> {
        let request = CreateItemRequest {
            item: Some(Item::new(description).into()),
        };
        let CreateItemResponse { item } = self
            .connection
            .call("create", request, |channel, request| async move {
                ItemPersistenceServiceClient::new(channel).create(request).await
            })
            .await?;
        Ok(item_from_wire(item))
    }

    /// Obtain the item with the given id.
    pub async fn get(&self, id: EntityId) -> Result<Item, Error> {
        let GetItemResponse { item } = self
            .connection
            .call("get", GetItemRequest { id }, |channel, request| async move {
                ItemPersistenceServiceClient::new(channel).get(request).await
            })
            .await?;
        Ok(item_from_wire(item))
    }

    /// Replace the description of the item with the given id.
    pub async fn update(
        &self,
        id: EntityId,
        description: impl Into<String>,
    ) -> Result<Item, Error> {
        let request = UpdateItemRequest {
            id,
            item: Some(
                Item {
                    id,
                    description: description.into(),
                }
                .into(),
            ),
        };
        let UpdateItemResponse { item } = self
            .connection
            .call("update", request, |channel, request| async move {
                ItemPersistenceServiceClient::new(channel).update(request).await
            })
            .await?;
        Ok(item_from_wire(item))
    }

    /// Remove the item with the given id, returning it as it was last stored.
    pub async fn delete(&self, id: EntityId) -> Result<Item, Error> {
        let DeleteItemResponse { item } = self
            .connection
            .call("delete", DeleteItemRequest { id }, |channel, request| async move {
                ItemPersistenceServiceClient::new(channel).delete(request).await
            })
            .await?;
        Ok(item_from_wire(item))
    }

    /// All stored items, in no particular order.
    pub async fn list(&self) -> Result<Vec<Item>, Error> {
        let ListItemResponse { item } = self
            .connection
            .call("list", Empty {}, |channel, request| async move {
                ItemPersistenceServiceClient::new(channel).list(request).await
            })
            .await?;
        Ok(item.into_iter().map(Into::into).collect())
    }

    /// The number of stored items.
    pub async fn count(&self) -> Result<u64, Error> {
        let CountItemResponse { number_of_items } = self
            .connection
            .call("count", Empty {}, |channel, request| async move {
                ItemPersistenceServiceClient::new(channel).count(request).await
            })
            .await?;
        Ok(u64::try_from(number_of_items).unwrap_or_default())
    }

    /// Release the channel.
    ///
    /// New calls are refused immediately. Calls already in flight get up to the configured grace
    /// period to finish; any still running after that fail with [`Error::Unknown`]. Returns `true`
    /// if nothing had to be cancelled.
    pub async fn shutdown(&self) -> bool {
        self.connection.shutdown().await
    }
}
