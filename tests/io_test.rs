mod common;

use anyhow::Result;
use caja::io::{Exporter, ImportOptions, Importer, LedgerSnapshot};
use common::{test_service, SampleLedger};

#[tokio::test]
async fn test_csv_export_then_import() -> Result<()> {
    let (source, _source_temp) = test_service().await?;
    SampleLedger::create(&source).await?;

    let mut buffer = Vec::new();
    let exported = Exporter::new(&source).export_entries_csv(&mut buffer).await?;
    assert_eq!(exported, 5);

    let csv_text = String::from_utf8(buffer.clone())?;
    assert!(csv_text.starts_with("id,date,kind,category,description,amount\n"));
    assert!(csv_text.contains("2024-03-01,Expense,Food,Lunch,15.50"));

    let (target, _target_temp) = test_service().await?;
    let result = Importer::new(&target)
        .import_entries_csv(buffer.as_slice(), ImportOptions::default())
        .await?;
    assert_eq!(result.imported, 5);
    assert!(result.errors.is_empty());

    let strip_ids = |entries: Vec<caja::domain::Entry>| {
        let mut drafts: Vec<_> = entries.iter().map(|e| e.to_draft()).collect();
        drafts.sort_by(|a, b| (a.date, &a.description).cmp(&(b.date, &b.description)));
        drafts
    };
    assert_eq!(
        strip_ids(source.list_entries().await?),
        strip_ids(target.list_entries().await?)
    );
    Ok(())
}

#[tokio::test]
async fn test_import_collects_line_errors() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv_data = "\
id,date,kind,category,description,amount
,2024-03-01,Expense,Food,Lunch,15.50
,2024-03-01,Refund,Food,Lunch,15.50
,not-a-date,Income,Sale,Bike,40
,2024-03-02,Income,Sale,,40
,2024-03-02,Income,Sale,Bike,forty
";

    let result = Importer::new(&service)
        .import_entries_csv(csv_data.as_bytes(), ImportOptions::default())
        .await?;

    assert_eq!(result.imported, 1);
    let lines: Vec<_> = result.errors.iter().map(|e| e.line).collect();
    assert_eq!(lines, vec![3, 4, 5, 6]);
    assert_eq!(result.errors[0].field.as_deref(), Some("kind"));
    assert_eq!(result.errors[1].field.as_deref(), Some("date"));
    assert_eq!(result.errors[2].field.as_deref(), Some("description"));
    assert_eq!(result.errors[3].field.as_deref(), Some("amount"));

    assert_eq!(service.list_entries().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_import_dry_run_writes_nothing() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv_data = "\
id,date,kind,category,description,amount
1,2024-03-01,Income,Salary,Salary,1000
2,2024-03-01,Expense,Food,Lunch,15.50
";

    let result = Importer::new(&service)
        .import_entries_csv(csv_data.as_bytes(), ImportOptions { dry_run: true })
        .await?;

    assert_eq!(result.imported, 2);
    assert!(service.list_entries().await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_dry_run_rejects_what_a_real_import_rejects() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv_data = "\
id,date,kind,category,description,amount
,2024-03-01,Expense,Food,   ,15.50
,2024-03-01,Expense,,Lunch,15.50
,2024-03-02,Income,Sale,Bike,40
";

    let dry = Importer::new(&service)
        .import_entries_csv(csv_data.as_bytes(), ImportOptions { dry_run: true })
        .await?;
    assert_eq!(dry.imported, 1);
    assert_eq!(dry.errors.len(), 2);
    assert_eq!(dry.errors[0].field.as_deref(), Some("description"));
    assert_eq!(dry.errors[1].field.as_deref(), Some("category"));
    assert!(service.list_entries().await?.is_empty());

    let real = Importer::new(&service)
        .import_entries_csv(csv_data.as_bytes(), ImportOptions::default())
        .await?;
    assert_eq!(real.imported, dry.imported);
    assert_eq!(
        real.errors.iter().map(|e| e.line).collect::<Vec<_>>(),
        dry.errors.iter().map(|e| e.line).collect::<Vec<_>>()
    );
    assert_eq!(service.list_entries().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_import_rejects_oversized_amount() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let csv_data = "\
id,date,kind,category,description,amount
,2024-03-01,Income,Sale,House,90071992547409.93
";

    let result = Importer::new(&service)
        .import_entries_csv(csv_data.as_bytes(), ImportOptions { dry_run: true })
        .await?;
    assert_eq!(result.imported, 0);
    assert_eq!(result.errors[0].field.as_deref(), Some("amount"));
    Ok(())
}

#[tokio::test]
async fn test_json_export() -> Result<()> {
    let (service, _temp) = test_service().await?;
    SampleLedger::create(&service).await?;

    let mut buffer = Vec::new();
    let snapshot = Exporter::new(&service)
        .export_entries_json(&mut buffer)
        .await?;
    assert_eq!(snapshot.entries.len(), 5);

    let parsed: LedgerSnapshot = serde_json::from_slice(&buffer)?;
    assert_eq!(parsed.entries, snapshot.entries);
    assert_eq!(parsed.version, env!("CARGO_PKG_VERSION"));
    Ok(())
}
