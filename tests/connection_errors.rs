//! Integration tests for connection failure handling.

use sqlgrid::{ConnectParams, ConnectionProvider, Error, MySqlDriver, SqliteDriver};
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_connection_timeout_unreachable_host() {
    // 192.0.2.1 is a TEST-NET address that should be unreachable (RFC 5737)
    let params = ConnectParams::new("192.0.2.1", 3306, "bank")
        .with_credentials("user", "pass")
        .with_connect_timeout(Duration::from_secs(2));

    let mut provider = ConnectionProvider::<MySqlDriver>::new();
    let start = Instant::now();
    let result = provider.connect(&params).await;
    let elapsed = start.elapsed();

    assert!(
        elapsed < Duration::from_secs(5),
        "Timeout took too long: {:?}",
        elapsed
    );
    match result {
        Err(Error::ConnectionFailed { target, message }) => {
            assert_eq!(target, "mysql://192.0.2.1:3306/bank");
            assert!(!message.is_empty());
        }
        Err(other) => panic!("expected ConnectionFailed, got {:?}", other),
        Ok(_) => panic!("connected to a TEST-NET address"),
    }
    assert!(matches!(provider.current_session(), Err(Error::NotConnected)));
}

#[tokio::test]
async fn test_dns_resolution_failure() {
    let params = ConnectParams::new("this-hostname-definitely-does-not-exist-12345.invalid", 3306, "bank")
        .with_connect_timeout(Duration::from_secs(5));

    let result = ConnectionProvider::<MySqlDriver>::new().connect(&params).await;
    assert!(matches!(result, Err(Error::ConnectionFailed { .. })));
}

#[tokio::test]
async fn test_sqlite_missing_directory() {
    let params = ConnectParams::sqlite("/this/directory/does/not/exist/bank.db");
    let result = ConnectionProvider::<SqliteDriver>::new().connect(&params).await;
    assert!(matches!(result, Err(Error::ConnectionFailed { .. })));
}

#[tokio::test]
async fn test_backend_must_match_driver() {
    let result = ConnectionProvider::<MySqlDriver>::new()
        .connect(&ConnectParams::sqlite_memory())
        .await;
    assert!(matches!(result, Err(Error::InvalidConnectString { .. })));

    let result = ConnectionProvider::<SqliteDriver>::new()
        .connect(&ConnectParams::new("localhost", 3306, "bank"))
        .await;
    assert!(matches!(result, Err(Error::InvalidConnectString { .. })));
}

#[tokio::test]
async fn test_default_timeout_is_20_seconds() {
    let params = ConnectParams::new("localhost", 3306, "bank");
    assert_eq!(params.connect_timeout, Duration::from_secs(20));
    assert_eq!(params.query_timeout, None);
}
