use crate::client::{ClientConfig, Connection, Error};
use crate::conv::order_from_wire;
use crate::proto::order::v2::order_persistence_service_client::OrderPersistenceServiceClient;
use crate::proto::order::v2::order_persistence_service_server::SERVICE_NAME;
use crate::proto::order::v2::{
    CountOrderResponse, CreateOrderRequest, CreateOrderResponse, DeleteOrderRequest,
    DeleteOrderResponse, Empty, GetOrderRequest, GetOrderResponse, ListOrderResponse,
    UpdateOrderRequest, UpdateOrderResponse,
};
use crate::{EntityId, Order};
use tonic::transport::{Channel, Endpoint};

/// A client for `persistd.order.v2.OrderPersistenceService`.
///
/// Clones share the underlying channel, so shutting down one clone shuts down all of them.
#[derive(Debug, Clone)]
pub struct OrderClient {
    connection: Connection,
}

impl OrderClient {
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

    /// Store a new order. The id of `order` is ignored by the server.
    pub async fn create(&self, order: Order) -> Result<Order, Error> {
        let request = CreateOrderRequest {
            order: Some(order.into()),
        };
        let CreateOrderResponse { order } = self
            .connection
            .call("create", request, |channel, request| async move {
                OrderPersistenceServiceClient::new(channel).create(request).await
            })
            .await?;
        Ok(order_from_wire(order))
    }

    /// Obtain the order with the given id.
    pub async fn get(&self, id: EntityId) -> Result<Order, Error> {
        let GetOrderResponse { order } = self
            .connection
            .call("get", GetOrderRequest { id }, |channel, request| async move {
                OrderPersistenceServiceClient::new(channel).get(request).await
            })
            .await?;
        Ok(order_from_wire(order))
    }

    /// Replace the items of the order with the given id.
    pub async fn update(&self, id: EntityId, order: Order) -> Result<Order, Error> {
        let request = UpdateOrderRequest {
            id,
            order: Some(order.into()),
        };
        let UpdateOrderResponse { order } = self
            .connection
            .call("update", request, |channel, request| async move {
                OrderPersistenceServiceClient::new(channel).update(request).await
            })
            .await?;
        Ok(order_from_wire(order))
    }

    /// Remove the order with the given id, returning it as it was last stored.
    pub async fn delete(&self, id: EntityId) -> Result<Order, Error> {
        let DeleteOrderResponse { order } = self
            .connection
            .call("delete", DeleteOrderRequest { id }, |channel, request| async move {
                OrderPersistenceServiceClient::new(channel).delete(request).await
            })
            .await?;
        Ok(order_from_wire(order))
    }

    /// All stored orders, in no particular order.
    pub async fn list(&self) -> Result<Vec<Order>, Error> {
        let ListOrderResponse { list_of_orders } = self
            .connection
            .call("list", Empty {}, |channel, request| async move {
                OrderPersistenceServiceClient::new(channel).list(request).await
            })
            .await?;
        Ok(list_of_orders.into_iter().map(Into::into).collect())
    }

    /// The number of stored orders.
    pub async fn count(&self) -> Result<u64, Error> {
        let CountOrderResponse { number_of_orders } = self
            .connection
            .call("count", Empty {}, |channel, request| async move {
                OrderPersistenceServiceClient::new(channel).count(request).await
            })
            .await?;
        Ok(u64::try_from(number_of_orders).unwrap_or_default())
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
