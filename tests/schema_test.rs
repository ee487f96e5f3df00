mod common;

use anyhow::Result;
use caja::application::{AppError, LedgerService};
use caja::storage::SCHEMA_VERSION;
use common::{db_path, test_service, SampleLedger};

#[tokio::test]
async fn test_init_stamps_schema_version() -> Result<()> {
    let (service, _temp) = test_service().await?;
    assert_eq!(service.schema_version().await?, SCHEMA_VERSION);
    Ok(())
}

#[tokio::test]
async fn test_migrate_is_idempotent() -> Result<()> {
    let (service, temp) = test_service().await?;
    SampleLedger::create(&service).await?;

    service.migrate().await?;
    service.migrate().await?;
    assert_eq!(service.list_entries().await?.len(), 5);

    // Reopening keeps the data as well
    let reopened = LedgerService::connect(&db_path(&temp)).await?;
    assert_eq!(reopened.list_entries().await?.len(), 5);
    assert_eq!(reopened.schema_version().await?, SCHEMA_VERSION);
    Ok(())
}

#[tokio::test]
async fn test_upgrade_discards_entries() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleLedger::create(&service).await?;

    let discarded = service.upgrade_schema(SCHEMA_VERSION, SCHEMA_VERSION + 1).await?;
    assert_eq!(discarded, 5);
    assert!(service.list_entries().await?.is_empty());
    assert_eq!(service.schema_version().await?, SCHEMA_VERSION + 1);

    // The recreated table is usable straight away
    SampleLedger::create(&service).await?;
    assert_eq!(service.list_entries().await?.len(), 5);
    Ok(())
}

#[tokio::test]
async fn test_connect_rejects_newer_schema() -> Result<()> {
    let (service, temp) = test_service().await?;
    service.upgrade_schema(SCHEMA_VERSION, SCHEMA_VERSION + 1).await?;

    match LedgerService::connect(&db_path(&temp)).await {
        Err(AppError::UnsupportedSchemaVersion { found, supported }) => {
            assert_eq!(found, SCHEMA_VERSION + 1);
            assert_eq!(supported, SCHEMA_VERSION);
        }
        Err(other) => panic!("unexpected error: {}", other),
        Ok(_) => panic!("newer schema should be rejected"),
    }
    Ok(())
}

#[tokio::test]
async fn test_connect_fails_for_missing_file() -> Result<()> {
    let temp = tempfile::TempDir::new()?;
    let missing = temp.path().join("missing.db");

    let result = LedgerService::connect(missing.to_str().unwrap()).await;
    assert!(matches!(result, Err(AppError::Database(_))));
    Ok(())
}
