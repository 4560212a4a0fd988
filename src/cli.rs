//! Command-line interface for persistd.

use persistd::{EntityId, Item};
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// The storage backend to serve from.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum Backend {
    /// Keep everything in memory. Data is lost when the server stops.
    Memory,
    #[cfg(feature = "sqlite")]
    #[allow(clippy::missing_docs_in_private_items)]
    Sqlite,
}

impl Default for Backend {
    fn default() -> Self {
        #[cfg(feature = "sqlite")]
        return Self::Sqlite;
        #[cfg(not(feature = "sqlite"))]
        return Self::Memory;
    }
}

/// Command-line arguments for persistd.
#[derive(Debug, Parser)]
#[command(version, propagate_version = true)]
pub(crate) struct Args {
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: Command,
}

/// What operation to perform.
#[derive(Debug, Subcommand)]
pub(crate) enum Command {
    /// Run persistd as a server.
    ///
    /// Both the item and the order service are served on the given address until the process is
    /// interrupted.
    #[clap(alias = "serve")]
    Run(RunArgs),
    /// Perform an operation on the item service.
    #[clap(alias = "items")]
    Item(ItemArgs),
    /// Perform an operation on the order service.
    #[clap(alias = "orders")]
    Order(OrderArgs),
}

/// Run persistd as a server.
#[derive(Debug, Parser)]
pub(crate) struct RunArgs {
    /// The backend to store entities in.
    #[arg(value_enum, short, long, default_value_t = Backend::default())]
    pub(crate) backend: Backend,
    /// The database file. Ignored by the memory backend.
    #[clap(long, default_value = "persistd.db")]
    pub(crate) store: PathBuf,
    /// The address to listen on.
    #[clap(default_value = "[::1]:50051")]
    pub(crate) addr: SocketAddr,
}

/// How to reach the server.
#[derive(Debug, Parser)]
pub(crate) struct Remote {
    /// The server to connect to.
    #[arg(short, long, default_value = "http://[::1]:50051")]
    pub(crate) addr: String,
    /// Deadline for each call in seconds. `0` waits indefinitely.
    #[arg(short, long, default_value_t = 30)]
    pub(crate) timeout: u64,
}

/// Perform an operation on the item service.
#[derive(Debug, Parser)]
pub(crate) struct ItemArgs {
    #[allow(clippy::missing_docs_in_private_items)]
    #[command(flatten)]
    pub(crate) remote: Remote,
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: ItemCommand,
}

/// Perform an operation on the order service.
#[derive(Debug, Parser)]
pub(crate) struct OrderArgs {
    #[allow(clippy::missing_docs_in_private_items)]
    #[command(flatten)]
    pub(crate) remote: Remote,
    /// The operation to perform.
    #[command(subcommand)]
    pub(crate) command: OrderCommand,
}

/// Perform an operation on the item service.
#[derive(Debug, Subcommand)]
pub(crate) enum ItemCommand {
    /// Store a new item. Its id is written to stdout.
    #[clap(aliases = ["add", "new"])]
    Create {
        /// The description of the item.
        description: String,
    },
    /// Get the item with the given id.
    #[clap(alias = "fetch")]
    Get {
        /// The id of the item.
        id: EntityId,
    },
    /// Replace the description of an item.
    #[clap(alias = "set")]
    Update {
        /// The id of the item.
        id: EntityId,
        /// The new description.
        description: String,
    },
    /// Delete an item.
    #[clap(aliases = ["remove", "rm"])]
    Delete {
        /// The id of the item.
        id: EntityId,
    },
    /// List all items, one per line.
    #[clap(alias = "ls")]
    List,
    /// Count the stored items.
    Count,
}

/// Perform an operation on the order service.
#[derive(Debug, Subcommand)]
pub(crate) enum OrderCommand {
    /// Store a new order. Its id is written to stdout.
    #[clap(aliases = ["add", "new"])]
    Create {
        /// An item of the order, as `ID=DESCRIPTION`. May be repeated.
        #[arg(short, long = "item", value_parser = parse_item)]
        items: Vec<Item>,
    },
    /// Get the order with the given id.
    #[clap(alias = "fetch")]
    Get {
        /// The id of the order.
        id: EntityId,
    },
    /// Replace the items of an order.
    #[clap(alias = "set")]
    Update {
        /// The id of the order.
        id: EntityId,
        /// An item of the order, as `ID=DESCRIPTION`. May be repeated.
        #[arg(short, long = "item", value_parser = parse_item)]
        items: Vec<Item>,
    },
    /// Delete an order.
    #[clap(aliases = ["remove", "rm"])]
    Delete {
        /// The id of the order.
        id: EntityId,
    },
    /// List all orders, one per line.
    #[clap(alias = "ls")]
    List,
    /// Count the stored orders.
    Count,
}

/// Parse an order item given as `ID=DESCRIPTION`.
fn parse_item(value: &str) -> Result<Item, String> {
    let (id, description) = value
        .split_once('=')
        .ok_or_else(|| format!("expected ID=DESCRIPTION, got `{value}`"))?;
    let id = id
        .trim()
        .parse()
        .map_err(|err| format!("invalid item id `{id}`: {err}"))?;
    Ok(Item {
        id,
        description: description.to_owned(),
    })
}
