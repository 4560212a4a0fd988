use anyhow::Result;
use persistd::backend::{DatabaseBackend as _, Sqlite};
use persistd::transitive::{item_client, order_client};
use persistd::{Location, Order};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinSet;

#[tokio::test]
async fn test_shared_database_survives_reopen() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("persistd.db");

    let sqlite = Arc::new(Sqlite::at_location(Location::from(&path))?);
    let items = item_client(Arc::clone(&sqlite)).await?;
    let orders = order_client(sqlite).await?;

    let pen = items.create("pen").await?;
    let ink = items.create("ink").await?;
    let order = orders.create(Order::new([pen.clone(), ink.clone()])).await?;
    let _updated = items.update(ink.id, "blue ink").await?;
    assert!(items.shutdown().await);
    assert!(orders.shutdown().await);

    let sqlite = Arc::new(Sqlite::at_location(Location::from(&path))?);
    let items = item_client(Arc::clone(&sqlite)).await?;
    let orders = order_client(sqlite).await?;

    assert_eq!(items.count().await?, 2);
    assert_eq!(items.get(ink.id).await?.description, "blue ink");
    // Orders keep the items as they were when the order was written.
    assert_eq!(orders.get(order.id).await?.items, [pen, ink.clone()]);

    let next = items.create("paper").await?;
    assert!(next.id > ink.id);
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_ids() -> Result<()> {
    const CALLS: usize = 32;
    let client = item_client(Sqlite::at_location(Location::InMemory)?).await?;

    let mut calls = JoinSet::new();
    for n in 0..CALLS {
        let client = client.clone();
        let _handle = calls.spawn(async move { client.create(format!("item {n}")).await });
    }
    let mut ids = HashSet::new();
    while let Some(item) = calls.join_next().await {
        let item = item??;
        assert_ne!(item.id, 0);
        assert!(ids.insert(item.id), "id {} handed out twice", item.id);
    }

    assert_eq!(ids.len(), CALLS);
    assert_eq!(client.count().await?, CALLS as u64);
    Ok(())
}
