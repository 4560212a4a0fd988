//! Item and order persistence over gRPC.
//!
//! Two independently versioned services are provided: `persistd.item.v1` for [`Item`]s and
//! `persistd.order.v2` for [`Order`]s. Each has a server-side [handler](crate::handler) backed by
//! a [storage backend](crate::backend) and a [client](crate::client) that converts responses back
//! into domain types. Handlers are bound to a single listener through a
//! [`ServiceSet`](crate::registrar::ServiceSet).

#![cfg_attr(docsrs, feature(doc_auto_cfg))]

pub mod backend;
pub mod client;
pub mod conv;
mod entity;
pub mod error;
pub mod handler;
pub mod interop;
mod location;
pub mod registrar;
pub mod telemetry;
mod tracing_shim;
pub mod transitive;

pub use self::entity::{Entity, EntityId, Item, Order};
pub use self::location::Location;

/// Generated protobuf types and gRPC stubs.
///
/// The item and order schemas are versioned separately and share no message types.
#[allow(
    missing_docs,
    missing_debug_implementations,
    unreachable_pub,
    unused_qualifications,
    unused_results,
    clippy::all,
    clippy::nursery,
    clippy::missing_docs_in_private_items
)]
pub mod proto {
    /// The item persistence schema.
    pub mod item {
        /// Version 1 of the item persistence schema.
        pub mod v1 {
            tonic::include_proto!("persistd.item.v1");
        }
    }

    /// The order persistence schema.
    pub mod order {
        /// Version 2 of the order persistence schema.
        pub mod v2 {
            tonic::include_proto!("persistd.order.v2");
        }
    }
}

/// The result of a unary RPC on the server side.
pub type RpcResponse<T> = Result<tonic::Response<T>, tonic::Status>;
