//! Conversion between domain entities and wire messages.
//!
//! Conversions are infallible in both directions. A message field that is absent on the wire
//! becomes the zero value of the corresponding domain field. The same conversions are used by the
//! handlers and the clients.

use crate::proto::item::v1 as item_v1;
use crate::proto::order::v2 as order_v2;
use crate::{Item, Order};

impl From<Item> for item_v1::GrpcItem {
    fn from(Item { id, description }: Item) -> Self {
        Self { id, description }
    }
}

impl From<item_v1::GrpcItem> for Item {
    fn from(item_v1::GrpcItem { id, description }: item_v1::GrpcItem) -> Self {
        Self { id, description }
    }
}

impl From<Item> for order_v2::GrpcItem {
    fn from(Item { id, description }: Item) -> Self {
        Self { id, description }
    }
}

impl From<order_v2::GrpcItem> for Item {
    fn from(order_v2::GrpcItem { id, description }: order_v2::GrpcItem) -> Self {
        Self { id, description }
    }
}

impl From<Order> for order_v2::GrpcOrder {
    fn from(Order { id, items }: Order) -> Self {
        Self {
            id,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<order_v2::GrpcOrder> for Order {
    fn from(order_v2::GrpcOrder { id, items }: order_v2::GrpcOrder) -> Self {
        Self {
            id,
            items: items.into_iter().map(Into::into).collect(),
        }
    }
}

/// Convert an optional v1 item message, treating a missing message as the empty item.
#[inline]
pub fn item_from_wire(item: Option<item_v1::GrpcItem>) -> Item {
    item.map(Into::into).unwrap_or_default()
}

/// Convert an optional v2 order message, treating a missing message as the empty order.
#[inline]
pub fn order_from_wire(order: Option<order_v2::GrpcOrder>) -> Order {
    order.map(Into::into).unwrap_or_default()
}
