//! Handler implementations.
//!
//! A handler implements one family's generated service trait on top of a
//! [backend](crate::backend). Handlers hold no state of their own and take no locks, so the
//! transport may run any number of calls on them concurrently.

mod item;
mod order;

pub use self::item::ItemHandler;
pub use self::order::OrderHandler;
