use super::*;
use ledger::adapters::SqliteAdapter;

async fn setup() -> Ledger {
    let adapter = SqliteAdapter::new_memory().await.unwrap();

    if let Err(err) = adapter.init_schema().await {
        panic!("Error: {:#?}", err);
    }

    Ledger::new(Box::new(adapter))
}

async fn open_file(path: &std::path::Path) -> Ledger {
    let adapter = SqliteAdapter::new_file(path.to_str().unwrap())
        .await
        .unwrap();
    adapter.init_schema().await.unwrap();
    Ledger::new(Box::new(adapter))
}

#[tokio::test]
async fn test_create_read_delete() {
    scenario_create_read_delete(setup().await).await;
}

#[tokio::test]
async fn test_update_requires_existing() {
    scenario_update_requires_existing(setup().await).await;
}

#[tokio::test]
async fn test_random_contributions_respect_cap() {
    scenario_random_contributions_respect_cap(setup().await).await;
}

#[tokio::test]
async fn test_expense_bounded_by_contributions() {
    scenario_expense_bounded_by_contributions(setup().await).await;
}

#[tokio::test]
async fn test_history_in_commit_order() {
    scenario_history_in_commit_order(setup().await).await;
}

#[tokio::test]
async fn test_stale_read_conflicts() {
    scenario_stale_read_conflicts(setup().await).await;
}

#[tokio::test]
async fn test_failed_transaction_invisible() {
    scenario_failed_transaction_invisible(setup().await).await;
}

#[tokio::test]
async fn test_list_in_key_order() {
    scenario_list_in_key_order(setup().await).await;
}

#[tokio::test]
async fn test_file_keeps_state_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    {
        let ledger = open_file(&path).await;
        submit(&ledger, "InitLedger", &[]).await.unwrap();
        submit(&ledger, "TransferContribution", &[PSC, "42.42"]).await.unwrap();
    }

    let ledger = open_file(&path).await;
    assert_eq!(ledger.adapter().height().await.unwrap(), 2);
    assert_eq!(
        read(&ledger, PSC).await.unwrap().total_contributions,
        Amount::from_cents(4_242)
    );

    let raw = evaluate(&ledger, "GetAssetHistory", &[PSC]).await.unwrap();
    let history: Vec<HistoryQueryResult> = serde_json::from_slice(&raw).unwrap();
    assert_eq!(history.len(), 2);
}

#[tokio::test]
async fn test_init_schema_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.db");

    let ledger = open_file(&path).await;
    submit(&ledger, "InitLedger", &[]).await.unwrap();
    drop(ledger);

    let ledger = open_file(&path).await;
    assert_eq!(evaluate(&ledger, "AssetExists", &[MOVER]).await.unwrap(), b"true");
}
