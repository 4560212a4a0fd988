use crate::helpers::sorted_by_id;
use anyhow::Result;
use persistd::backend::Memory;
use persistd::client::Error;
use persistd::error::StoreErrorKind;
use persistd::transitive::order_client;
use persistd::{Item, Order};

fn item(id: i64, description: &str) -> Item {
    Item {
        id,
        description: description.to_owned(),
    }
}

#[tokio::test]
async fn test_lifecycle() -> Result<()> {
    let client = order_client(Memory::<Order>::new()).await?;

    let created = client
        .create(Order::new([item(1, "pen"), item(2, "ink")]))
        .await?;
    assert_ne!(created.id, 0);
    assert_eq!(created.items, [item(1, "pen"), item(2, "ink")]);
    assert_eq!(client.get(created.id).await?, created);

    let updated = client
        .update(created.id, Order::new([item(3, "paper")]))
        .await?;
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.items, [item(3, "paper")]);
    assert_eq!(client.get(created.id).await?, updated);

    assert_eq!(client.delete(created.id).await?, updated);
    assert_eq!(
        client.get(created.id).await.map_err(|err| err.store_error_kind()),
        Err(Some(StoreErrorKind::NotFound))
    );

    Ok(())
}

#[tokio::test]
async fn test_create_ignores_client_id() -> Result<()> {
    let client = order_client(Memory::<Order>::new()).await?;

    let created = client
        .create(Order {
            id: 42,
            items: Vec::new(),
        })
        .await?;
    assert_eq!(created.id, 1);
    assert!(created.items.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_get_nonexistent() -> Result<()> {
    let client = order_client(Memory::<Order>::new()).await?;

    assert_eq!(
        client.get(5).await,
        Err(Error::Storage {
            kind: StoreErrorKind::NotFound,
            message: "order with id 5 not found".to_owned(),
        })
    );

    Ok(())
}

#[tokio::test]
async fn test_list_and_count() -> Result<()> {
    let client = order_client(Memory::<Order>::new()).await?;
    assert!(client.list().await?.is_empty());
    assert_eq!(client.count().await?, 0);

    let first = client.create(Order::new([item(1, "pen")])).await?;
    let second = client.create(Order::new([])).await?;

    assert_eq!(client.count().await?, 2);
    assert_eq!(
        sorted_by_id(client.list().await?, |order| order.id),
        [first.clone(), second.clone()]
    );

    let _deleted = client.delete(first.id).await?;
    assert_eq!(client.count().await?, 1);
    assert_eq!(client.list().await?, [second]);

    Ok(())
}
