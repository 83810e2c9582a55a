//! Behavioural scenarios shared by every world-state backend. Each backend
//! module builds a fresh [`Ledger`] and runs the same functions against it.
use contract::{Amount, Asset, AssetContract, Chaincode, ContractError, DocType, HistoryQueryResult};
use ledger::{Ledger, LedgerError, StateAdapter};
use rand::Rng;

pub mod test_memory;
pub mod test_sqlite;

pub const PSC: &str = "11223344556";
pub const MOVER: &str = "66778899001";

pub async fn submit(ledger: &Ledger, function: &str, args: &[&str]) -> Result<Vec<u8>, ContractError> {
    let function = function.to_string();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    ledger
        .submit("Org1MSP", |ctx| async move {
            AssetContract::new().invoke(&ctx, &function, &args).await
        })
        .await
        .map(|receipt| receipt.result)
}

pub async fn evaluate(ledger: &Ledger, function: &str, args: &[&str]) -> Result<Vec<u8>, ContractError> {
    let function = function.to_string();
    let args: Vec<String> = args.iter().map(|a| a.to_string()).collect();
    ledger
        .evaluate("Org1MSP", |ctx| async move {
            AssetContract::new().invoke(&ctx, &function, &args).await
        })
        .await
}

pub async fn read(ledger: &Ledger, ruc: &str) -> Option<Asset> {
    evaluate(ledger, "ReadAsset", &[ruc])
        .await
        .ok()
        .map(|raw| Asset::from_json(&raw).unwrap())
}

pub async fn scenario_create_read_delete(ledger: Ledger) {
    let supplier = ["PROVEEDOR", "20100100100", "3", "0", "777", "Imprenta SAC", "0", "0"];

    submit(&ledger, "CreateAsset", &supplier).await.unwrap();
    assert!(matches!(
        submit(&ledger, "CreateAsset", &supplier).await,
        Err(ContractError::AssetExists(_))
    ));

    let asset = read(&ledger, "20100100100").await.unwrap();
    assert_eq!(asset.doc_type, DocType::Supplier);
    assert_eq!(asset.legal_name, "Imprenta SAC");

    submit(&ledger, "DeleteAsset", &["20100100100"]).await.unwrap();
    assert!(read(&ledger, "20100100100").await.is_none());
    assert!(matches!(
        submit(&ledger, "DeleteAsset", &["20100100100"]).await,
        Err(ContractError::AssetNotFound(_))
    ));
}

pub async fn scenario_update_requires_existing(ledger: Ledger) {
    let args = ["APORTANTE", "10456789012", "2", "0", "555", "Juan Perez", "10", "0"];
    assert!(matches!(
        submit(&ledger, "UpdateAsset", &args).await,
        Err(ContractError::AssetNotFound(_))
    ));

    submit(&ledger, "InitLedger", &[]).await.unwrap();
    submit(
        &ledger,
        "UpdateAsset",
        &["ORG-POL", PSC, "1", "9000", "123456789", "PSC", "0", "0"],
    )
    .await
    .unwrap();
    assert_eq!(read(&ledger, PSC).await.unwrap().max_amount, Amount::from_units(9000));
}

/// Random cap and random contributions; the ledger must agree with a plain
/// running total that refuses anything passing the cap.
pub async fn scenario_random_contributions_respect_cap(ledger: Ledger) {
    let mut rng = rand::rng();
    let cap = Amount::from_cents(rng.random_range(100..=500_000));
    let org = Asset::new(DocType::PoliticalOrganization, "ORG-R", 1, cap, "1", "Random");
    ledger
        .submit("Org1MSP", |ctx| async move {
            AssetContract::new().create_asset(&ctx, org).await
        })
        .await
        .unwrap();

    let mut expected = Amount::ZERO;
    for _ in 0..25 {
        let amount = Amount::from_cents(rng.random_range(1..=cap.cents()));
        let result = submit(&ledger, "TransferContribution", &["ORG-R", &amount.to_string()]).await;

        match expected.checked_add(amount) {
            Some(total) if total <= cap => {
                result.unwrap();
                expected = total;
            }
            _ => assert!(matches!(
                result,
                Err(ContractError::ContributionLimitExceeded { .. })
            )),
        }
    }

    assert_eq!(read(&ledger, "ORG-R").await.unwrap().total_contributions, expected);
}

pub async fn scenario_expense_bounded_by_contributions(ledger: Ledger) {
    submit(&ledger, "InitLedger", &[]).await.unwrap();

    assert!(matches!(
        submit(&ledger, "TransferExpense", &[PSC, "0.01"]).await,
        Err(ContractError::ExpensesExceedContributions { .. })
    ));

    submit(&ledger, "TransferContribution", &[PSC, "300"]).await.unwrap();
    submit(&ledger, "TransferExpense", &[PSC, "300"]).await.unwrap();

    let org = read(&ledger, PSC).await.unwrap();
    assert_eq!(org.total_expenses, Amount::from_units(300));
    assert!(org.total_expenses <= org.total_contributions);
    assert!(org.total_contributions <= org.max_amount);
}

pub async fn scenario_history_in_commit_order(ledger: Ledger) {
    submit(&ledger, "InitLedger", &[]).await.unwrap();
    for amount in ["1", "2", "3"] {
        submit(&ledger, "TransferContribution", &[MOVER, amount]).await.unwrap();
    }
    submit(&ledger, "DeleteAsset", &[MOVER]).await.unwrap();

    let raw = evaluate(&ledger, "GetAssetHistory", &[MOVER]).await.unwrap();
    let history: Vec<HistoryQueryResult> = serde_json::from_slice(&raw).unwrap();

    let totals: Vec<Option<Amount>> = history
        .iter()
        .map(|entry| entry.record.asset().map(|a| a.total_contributions))
        .collect();
    assert_eq!(
        totals,
        vec![
            Some(Amount::ZERO),
            Some(Amount::from_units(1)),
            Some(Amount::from_units(3)),
            Some(Amount::from_units(6)),
            None,
        ]
    );
    assert!(history.last().unwrap().is_delete);
    assert_eq!(history.last().unwrap().record.ruc(), MOVER);
    assert!(history.windows(2).all(|pair| pair[0].timestamp <= pair[1].timestamp));

    let mut tx_ids: Vec<&str> = history.iter().map(|h| h.tx_id.as_str()).collect();
    tx_ids.dedup();
    assert_eq!(tx_ids.len(), 5);
}

pub async fn scenario_stale_read_conflicts(ledger: Ledger) {
    submit(&ledger, "InitLedger", &[]).await.unwrap();

    let slow = ledger.begin("Org1MSP");
    AssetContract::new()
        .transfer_contribution(&slow, PSC, Amount::from_units(3000))
        .await
        .unwrap();

    submit(&ledger, "TransferContribution", &[PSC, "3000"]).await.unwrap();
    let height = ledger.adapter().height().await.unwrap();

    let result = ledger.adapter().commit(slow.header(), &slow.snapshot()).await;
    assert_eq!(result, Err(LedgerError::MvccConflict(PSC.to_string())));
    assert_eq!(ledger.adapter().height().await.unwrap(), height);
    assert_eq!(
        read(&ledger, PSC).await.unwrap().total_contributions,
        Amount::from_units(3000)
    );
}

pub async fn scenario_failed_transaction_invisible(ledger: Ledger) {
    let result = ledger
        .submit("Org1MSP", |ctx| async move {
            let contract = AssetContract::new();
            contract.init_ledger(&ctx).await?;
            contract
                .transfer_contribution(&ctx, "missing", Amount::from_units(1))
                .await
        })
        .await;

    assert!(matches!(result, Err(ContractError::AssetNotFound(_))));
    assert_eq!(evaluate(&ledger, "GetAllAssets", &[]).await.unwrap(), b"[]");
    assert!(ledger.adapter().get_history_for_key(PSC).await.unwrap().is_empty());
}

pub async fn scenario_list_in_key_order(ledger: Ledger) {
    submit(&ledger, "InitLedger", &[]).await.unwrap();
    submit(
        &ledger,
        "CreateAsset",
        &["PAGO", "PG-0001", "0", "0", "20100100100", PSC, "0", "10"],
    )
    .await
    .unwrap();

    let raw = evaluate(&ledger, "GetAllAssets", &[]).await.unwrap();
    let assets: Vec<Asset> = serde_json::from_slice(&raw).unwrap();
    let rucs: Vec<&str> = assets.iter().map(|a| a.ruc.as_str()).collect();

    let mut sorted = rucs.clone();
    sorted.sort();
    assert_eq!(rucs, sorted);
    assert_eq!(rucs.len(), 7);
    assert_eq!(rucs.last(), Some(&"PG-0001"));
}
