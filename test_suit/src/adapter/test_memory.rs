use super::*;
use ledger::adapters::MemoryAdapter;

fn setup() -> Ledger {
    Ledger::new(Box::new(MemoryAdapter::new()))
}

#[tokio::test]
async fn test_create_read_delete() {
    scenario_create_read_delete(setup()).await;
}

#[tokio::test]
async fn test_update_requires_existing() {
    scenario_update_requires_existing(setup()).await;
}

#[tokio::test]
async fn test_random_contributions_respect_cap() {
    scenario_random_contributions_respect_cap(setup()).await;
}

#[tokio::test]
async fn test_expense_bounded_by_contributions() {
    scenario_expense_bounded_by_contributions(setup()).await;
}

#[tokio::test]
async fn test_history_in_commit_order() {
    scenario_history_in_commit_order(setup()).await;
}

#[tokio::test]
async fn test_stale_read_conflicts() {
    scenario_stale_read_conflicts(setup()).await;
}

#[tokio::test]
async fn test_failed_transaction_invisible() {
    scenario_failed_transaction_invisible(setup()).await;
}

#[tokio::test]
async fn test_list_in_key_order() {
    scenario_list_in_key_order(setup()).await;
}

#[tokio::test]
async fn test_clones_share_state() {
    let adapter = MemoryAdapter::new();
    let writer = Ledger::new(Box::new(adapter.clone()));
    let reader = Ledger::new(Box::new(adapter));

    submit(&writer, "InitLedger", &[]).await.unwrap();
    assert!(read(&reader, PSC).await.is_some());
}
