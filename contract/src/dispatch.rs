use crate::{Amount, Asset, AssetContract, ContractError, DocType};
use async_trait::async_trait;
use ledger::TransactionContext;
use metrics::counter;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// Transaction names exposed by [`AssetContract`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Function {
    InitLedger,
    CreateAsset,
    ReadAsset,
    UpdateAsset,
    DeleteAsset,
    AssetExists,
    TransferContribution,
    TransferContributor,
    TransferExpense,
    TransferSupplier,
    GetAllAssets,
    GetAssetHistory,
}

impl Function {
    pub const ALL: [Function; 12] = [
        Function::InitLedger,
        Function::CreateAsset,
        Function::ReadAsset,
        Function::UpdateAsset,
        Function::DeleteAsset,
        Function::AssetExists,
        Function::TransferContribution,
        Function::TransferContributor,
        Function::TransferExpense,
        Function::TransferSupplier,
        Function::GetAllAssets,
        Function::GetAssetHistory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Function::InitLedger => "InitLedger",
            Function::CreateAsset => "CreateAsset",
            Function::ReadAsset => "ReadAsset",
            Function::UpdateAsset => "UpdateAsset",
            Function::DeleteAsset => "DeleteAsset",
            Function::AssetExists => "AssetExists",
            Function::TransferContribution => "TransferContribution",
            Function::TransferContributor => "TransferContributor",
            Function::TransferExpense => "TransferExpense",
            Function::TransferSupplier => "TransferSupplier",
            Function::GetAllAssets => "GetAllAssets",
            Function::GetAssetHistory => "GetAssetHistory",
        }
    }

    /// Number of positional string arguments.
    pub fn arity(&self) -> usize {
        match self {
            Function::InitLedger | Function::GetAllAssets => 0,
            Function::ReadAsset
            | Function::DeleteAsset
            | Function::AssetExists
            | Function::GetAssetHistory => 1,
            Function::TransferContribution
            | Function::TransferContributor
            | Function::TransferExpense
            | Function::TransferSupplier => 2,
            Function::CreateAsset | Function::UpdateAsset => 8,
        }
    }

    /// Read-only functions; evaluating them is enough.
    pub fn is_query(&self) -> bool {
        matches!(
            self,
            Function::ReadAsset
                | Function::AssetExists
                | Function::GetAllAssets
                | Function::GetAssetHistory
        )
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Function {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Function::ALL
            .into_iter()
            .find(|function| function.name() == s)
            .ok_or_else(|| ContractError::UnknownFunction(s.to_string()))
    }
}

/// A contract reachable by name with positional string arguments.
#[async_trait]
pub trait Chaincode: Send + Sync {
    async fn invoke(
        &self,
        ctx: &TransactionContext,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError>;
}

#[async_trait]
impl Chaincode for AssetContract {
    async fn invoke(
        &self,
        ctx: &TransactionContext,
        function: &str,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        let result = match function.parse::<Function>() {
            Ok(parsed) => self.call(ctx, parsed, args).await,
            Err(err) => Err(err),
        };

        counter!("contract.invocations.total",
            "function" => function.to_string(),
            "status" => if result.is_ok() { "success" } else { "failed" }
        )
        .increment(1);

        result
    }
}

impl AssetContract {
    async fn call(
        &self,
        ctx: &TransactionContext,
        function: Function,
        args: &[String],
    ) -> Result<Vec<u8>, ContractError> {
        if args.len() != function.arity() {
            return Err(ContractError::ArgumentCount {
                function: function.name().to_string(),
                expected: function.arity(),
                got: args.len(),
            });
        }

        match function {
            Function::InitLedger => {
                self.init_ledger(ctx).await?;
                Ok(Vec::new())
            }
            Function::CreateAsset => {
                self.create_asset(ctx, asset_from_args(args)?).await?;
                Ok(Vec::new())
            }
            Function::UpdateAsset => {
                self.update_asset(ctx, asset_from_args(args)?).await?;
                Ok(Vec::new())
            }
            Function::ReadAsset => to_json(&self.read_asset(ctx, &args[0]).await?),
            Function::DeleteAsset => {
                self.delete_asset(ctx, &args[0]).await?;
                Ok(Vec::new())
            }
            Function::AssetExists => to_json(&self.asset_exists(ctx, &args[0]).await?),
            Function::TransferContribution => {
                let amount = parse_amount("amount", &args[1])?;
                to_json(&self.transfer_contribution(ctx, &args[0], amount).await?)
            }
            Function::TransferContributor => {
                let amount = parse_amount("amount", &args[1])?;
                to_json(&self.transfer_contributor(ctx, &args[0], amount).await?)
            }
            Function::TransferExpense => {
                let amount = parse_amount("amount", &args[1])?;
                to_json(&self.transfer_expense(ctx, &args[0], amount).await?)
            }
            Function::TransferSupplier => {
                let amount = parse_amount("amount", &args[1])?;
                to_json(&self.transfer_supplier(ctx, &args[0], amount).await?)
            }
            Function::GetAllAssets => to_json(&self.get_all_assets(ctx).await?),
            Function::GetAssetHistory => to_json(&self.get_asset_history(ctx, &args[0]).await?),
        }
    }
}

/// `docType, ruc, bankId, maxAmount, account, legalName, totalContrib, totalExpense`
fn asset_from_args(args: &[String]) -> Result<Asset, ContractError> {
    let doc_type: DocType = args[0].trim().parse()?;
    let bank_id = args[2]
        .trim()
        .parse::<i64>()
        .map_err(|e| ContractError::InvalidArgument {
            param: "bankId".to_string(),
            reason: e.to_string(),
        })?;

    Ok(Asset::new(
        doc_type,
        &args[1],
        bank_id,
        parse_amount("maxAmount", &args[3])?,
        &args[4],
        &args[5],
    )
    .with_totals(
        parse_amount("totalContributions", &args[6])?,
        parse_amount("totalExpenses", &args[7])?,
    ))
}

fn parse_amount(param: &str, value: &str) -> Result<Amount, ContractError> {
    value
        .parse::<Amount>()
        .map_err(|e| ContractError::InvalidArgument {
            param: param.to_string(),
            reason: e.to_string(),
        })
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, ContractError> {
    serde_json::to_vec(value).map_err(|e| ContractError::Serialize(e.to_string()))
}
