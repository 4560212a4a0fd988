use crate::helpers::sorted_by_id;
use anyhow::Result;
use persistd::backend::Memory;
use persistd::client::{Error, ItemClient};
use persistd::error::StoreErrorKind;
use persistd::transitive::item_client;
use persistd::Item;
use std::collections::HashSet;
use tokio::task::JoinSet;
use tonic::transport::Endpoint;

#[tokio::test]
async fn test_lifecycle() -> Result<()> {
    let client = item_client(Memory::<Item>::new()).await?;

    let created = client.create("pen").await?;
    assert_ne!(created.id, 0);
    assert_eq!(created.description, "pen");

    assert_eq!(client.get(created.id).await?, created);

    let updated = client.update(created.id, "pencil").await?;
    assert_eq!(
        updated,
        Item {
            id: created.id,
            description: "pencil".to_owned()
        }
    );
    assert_eq!(client.get(created.id).await?, updated);

    let deleted = client.delete(created.id).await?;
    assert_eq!(deleted, updated);
    assert_eq!(
        client.get(created.id).await.map_err(|err| err.store_error_kind()),
        Err(Some(StoreErrorKind::NotFound))
    );

    assert!(client.shutdown().await);
    Ok(())
}

#[tokio::test]
async fn test_get_nonexistent() -> Result<()> {
    let client = item_client(Memory::<Item>::new()).await?;

    let err = client.get(999).await.err();
    assert_eq!(
        err,
        Some(Error::Storage {
            kind: StoreErrorKind::NotFound,
            message: "item with id 999 not found".to_owned(),
        })
    );
    assert_eq!(
        err.map(|err| err.to_string()).as_deref(),
        Some("item with id 999 not found")
    );

    Ok(())
}

#[tokio::test]
async fn test_update_and_delete_nonexistent() -> Result<()> {
    let client = item_client(Memory::<Item>::new()).await?;

    assert_eq!(
        client.update(7, "ghost").await.map_err(|err| err.store_error_kind()),
        Err(Some(StoreErrorKind::NotFound))
    );
    assert_eq!(
        client.delete(7).await.map_err(|err| err.store_error_kind()),
        Err(Some(StoreErrorKind::NotFound))
    );
    assert_eq!(client.count().await?, 0);

    Ok(())
}

#[tokio::test]
async fn test_list_and_count() -> Result<()> {
    let client = item_client(Memory::<Item>::new()).await?;
    assert!(client.list().await?.is_empty());
    assert_eq!(client.count().await?, 0);

    let mut created = Vec::new();
    for description in ["pen", "ink", "paper"] {
        created.push(client.create(description).await?);
    }

    assert_eq!(client.count().await?, 3);
    assert_eq!(sorted_by_id(client.list().await?, |item| item.id), created);

    let _deleted = client.delete(created[1].id).await?;
    assert_eq!(client.count().await?, 2);
    assert_eq!(
        sorted_by_id(client.list().await?, |item| item.id),
        [created[0].clone(), created[2].clone()]
    );

    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_creates_get_distinct_ids() -> Result<()> {
    const CALLS: usize = 64;
    let client = item_client(Memory::<Item>::new()).await?;

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
    assert_eq!(client.list().await?.len(), CALLS);
    Ok(())
}

#[tokio::test]
async fn test_clones_share_backend() -> Result<()> {
    let client = item_client(Memory::<Item>::new()).await?;
    let other = client.clone();

    let created = client.create("stapler").await?;
    assert_eq!(other.get(created.id).await?, created);

    Ok(())
}

#[tokio::test]
async fn test_unreachable_server() -> Result<()> {
    // Nothing listens on the discard port.
    let channel = Endpoint::from_static("http://127.0.0.1:9").connect_lazy();
    let client = ItemClient::new(channel);

    assert_eq!(client.get(1).await, Err(Error::Unknown));
    assert_eq!(client.count().await, Err(Error::Unknown));

    Ok(())
}
