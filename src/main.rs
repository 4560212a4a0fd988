//! A command-line interface for running and talking to a persistd server.
//!
//! For usage, run `cargo run -- --help`.

mod cli;

use crate::cli::{
    Args, Backend, Command, ItemArgs, ItemCommand, OrderArgs, OrderCommand, Remote, RunArgs,
};
use clap::Parser as _;
#[cfg(feature = "sqlite")]
use persistd::backend::{DatabaseBackend as _, Sqlite};
use persistd::client::{ClientConfig, ItemClient, OrderClient};
use persistd::handler::{ItemHandler, OrderHandler};
use persistd::registrar::ServiceSet;
#[cfg(feature = "sqlite")]
use persistd::Location;
use persistd::{Item, Order};
use std::process::ExitCode;
#[cfg(feature = "sqlite")]
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Args { command } = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let future = async {
        match command {
            Command::Run(args) => run(args).await,
            Command::Item(args) => item(args).await,
            Command::Order(args) => order(args).await,
        }
    };

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(future)
}

/// Run persistd as a server. This function will block until the process is interrupted.
///
/// # Parameters
///
/// - `backend`: Where entities are stored.
/// - `store`: The database file for backends that persist to disk.
/// - `addr`: The address to bind the server to.
async fn run(
    RunArgs {
        backend,
        store,
        addr,
    }: RunArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let services = match backend {
        Backend::Memory => ServiceSet::new()
            .add_items(ItemHandler::in_memory())
            .add_orders(OrderHandler::in_memory()),
        #[cfg(feature = "sqlite")]
        Backend::Sqlite => {
            let sqlite = Arc::new(Sqlite::at_location(Location::from(store))?);
            ServiceSet::new()
                .add_items(ItemHandler::new(Arc::clone(&sqlite)))
                .add_orders(OrderHandler::new(sqlite))
        }
    };
    #[cfg(not(feature = "sqlite"))]
    let _store = store;

    services
        .serve_with_shutdown(addr, async {
            // An error here means the signal handler could not be installed. Shutting down is
            // the only sensible reaction.
            let _result = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(ExitCode::SUCCESS)
}

/// The client settings requested on the command line.
fn client_config(timeout: u64) -> ClientConfig {
    let call_timeout = (timeout != 0).then_some(Duration::from_secs(timeout));
    ClientConfig::default().with_call_timeout(call_timeout)
}

/// Perform an operation on the item service.
///
/// # stdout
///
/// Every item returned by the server is written on its own line as `ID<TAB>DESCRIPTION`. A count
/// is written as a bare number.
async fn item(
    ItemArgs {
        remote: Remote { addr, timeout },
        command,
    }: ItemArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = ItemClient::connect_with(addr, client_config(timeout)).await?;
    let result = match command {
        ItemCommand::Create { description } => {
            client.create(description).await.map(|item| vec![item])
        }
        ItemCommand::Get { id } => client.get(id).await.map(|item| vec![item]),
        ItemCommand::Update { id, description } => {
            client.update(id, description).await.map(|item| vec![item])
        }
        ItemCommand::Delete { id } => client.delete(id).await.map(|item| vec![item]),
        ItemCommand::List => client.list().await,
        ItemCommand::Count => {
            let count = client.count().await;
            let _clean = client.shutdown().await;
            #[allow(clippy::print_stdout)]
            {
                println!("{}", count?);
            }
            return Ok(ExitCode::SUCCESS);
        }
    };
    let _clean = client.shutdown().await;

    for item in result? {
        #[allow(clippy::print_stdout)]
        {
            println!("{}", display_item(&item));
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// Perform an operation on the order service.
///
/// # stdout
///
/// Every order returned by the server is written on its own line as the order id followed by its
/// items, each as `ID=DESCRIPTION`, separated by tabs. A count is written as a bare number.
async fn order(
    OrderArgs {
        remote: Remote { addr, timeout },
        command,
    }: OrderArgs,
) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let client = OrderClient::connect_with(addr, client_config(timeout)).await?;
    let result = match command {
        OrderCommand::Create { items } => client
            .create(Order::new(items))
            .await
            .map(|order| vec![order]),
        OrderCommand::Get { id } => client.get(id).await.map(|order| vec![order]),
        OrderCommand::Update { id, items } => client
            .update(id, Order::new(items))
            .await
            .map(|order| vec![order]),
        OrderCommand::Delete { id } => client.delete(id).await.map(|order| vec![order]),
        OrderCommand::List => client.list().await,
        OrderCommand::Count => {
            let count = client.count().await;
            let _clean = client.shutdown().await;
            #[allow(clippy::print_stdout)]
            {
                println!("{}", count?);
            }
            return Ok(ExitCode::SUCCESS);
        }
    };
    let _clean = client.shutdown().await;

    for order in result? {
        let items: String = order
            .items
            .iter()
            .map(|item| format!("\t{}={}", item.id, item.description))
            .collect();
        #[allow(clippy::print_stdout)]
        {
            println!("{}{items}", order.id);
        }
    }
    Ok(ExitCode::SUCCESS)
}

/// An item as written to stdout.
fn display_item(item: &Item) -> String {
    format!("{}\t{}", item.id, item.description)
}
