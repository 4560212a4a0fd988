use crate::helpers::Slow;
use anyhow::Result;
use persistd::backend::Memory;
use persistd::client::{ClientConfig, Error};
use persistd::transitive::item_client_with_config;
use persistd::Item;
use std::time::{Duration, Instant};

const GRACE: Duration = Duration::from_millis(200);

fn config() -> ClientConfig {
    ClientConfig::default()
        .with_call_timeout(None)
        .with_shutdown_grace(GRACE)
}

#[tokio::test]
async fn test_idle_shutdown_is_clean() -> Result<()> {
    let client = item_client_with_config(Memory::<Item>::new(), config()).await?;
    let _item = client.create("pen").await?;

    let start = Instant::now();
    assert!(client.shutdown().await);
    assert!(start.elapsed() < GRACE);

    Ok(())
}

#[tokio::test]
async fn test_calls_after_shutdown_fail() -> Result<()> {
    let client = item_client_with_config(Memory::<Item>::new(), config()).await?;
    let other = client.clone();
    assert!(client.shutdown().await);

    assert_eq!(client.create("pen").await, Err(Error::Unknown));
    assert_eq!(other.count().await, Err(Error::Unknown));
    // A second shutdown has nothing left to wait for.
    assert!(client.shutdown().await);

    Ok(())
}

#[tokio::test]
async fn test_shutdown_cancels_after_grace() -> Result<()> {
    let backend = Slow {
        delay: Duration::from_secs(30),
    };
    let client = item_client_with_config(backend, config()).await?;

    let in_flight = tokio::spawn({
        let client = client.clone();
        async move { client.get(1).await }
    });
    // Let the call reach the server.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let start = Instant::now();
    assert!(!client.shutdown().await);
    let elapsed = start.elapsed();
    assert!(elapsed >= GRACE);
    assert!(elapsed < Duration::from_secs(5));

    assert_eq!(in_flight.await?, Err(Error::Unknown));
    Ok(())
}

#[tokio::test]
async fn test_shutdown_waits_for_in_flight() -> Result<()> {
    let backend = Slow {
        delay: Duration::from_millis(50),
    };
    let config = config().with_shutdown_grace(Duration::from_secs(5));
    let client = item_client_with_config(backend, config).await?;

    let in_flight = tokio::spawn({
        let client = client.clone();
        async move { client.get(4).await }
    });
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert!(client.shutdown().await);
    assert_eq!(in_flight.await?.map(|item| item.id), Ok(4));
    Ok(())
}

#[tokio::test]
async fn test_deadline_is_unknown() -> Result<()> {
    let backend = Slow {
        delay: Duration::from_secs(30),
    };
    let config = config().with_call_timeout(Some(Duration::from_millis(100)));
    let client = item_client_with_config(backend, config).await?;

    let start = Instant::now();
    assert_eq!(client.list().await, Err(Error::Unknown));
    assert!(start.elapsed() < Duration::from_secs(5));

    Ok(())
}
