use crate::asset::SEED_ASSETS;
use crate::{Amount, Asset, ContractError, HistoryQueryResult};
use ledger::TransactionContext;
use tracing::{debug, info};

/// The asset contract. Stateless: everything lives in world state behind the
/// transaction context.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetContract;

impl AssetContract {
    pub fn new() -> Self {
        Self
    }

    /// Write the base set of political organisations.
    pub async fn init_ledger(&self, ctx: &TransactionContext) -> Result<(), ContractError> {
        for asset in SEED_ASSETS.iter() {
            put_asset(ctx, asset)?;
        }
        info!(count = SEED_ASSETS.len(), tx_id = ctx.tx_id(), "ledger seeded");
        Ok(())
    }

    /// Issue a new asset. Fails if the RUC is already taken.
    pub async fn create_asset(
        &self,
        ctx: &TransactionContext,
        asset: Asset,
    ) -> Result<(), ContractError> {
        asset.validate()?;
        if self.asset_exists(ctx, &asset.ruc).await? {
            return Err(ContractError::AssetExists(asset.ruc));
        }
        put_asset(ctx, &asset)?;
        debug!(ruc = %asset.ruc, doc_type = %asset.doc_type, "asset created");
        Ok(())
    }

    pub async fn read_asset(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
    ) -> Result<Asset, ContractError> {
        match ctx.get_state(ruc).await? {
            Some(bytes) => Asset::from_json(&bytes),
            None => Err(ContractError::AssetNotFound(ruc.to_string())),
        }
    }

    /// Overwrite an existing asset with the given fields.
    pub async fn update_asset(
        &self,
        ctx: &TransactionContext,
        asset: Asset,
    ) -> Result<(), ContractError> {
        asset.validate()?;
        if !self.asset_exists(ctx, &asset.ruc).await? {
            return Err(ContractError::AssetNotFound(asset.ruc));
        }
        put_asset(ctx, &asset)?;
        debug!(ruc = %asset.ruc, "asset updated");
        Ok(())
    }

    pub async fn delete_asset(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
    ) -> Result<(), ContractError> {
        if !self.asset_exists(ctx, ruc).await? {
            return Err(ContractError::AssetNotFound(ruc.to_string()));
        }
        ctx.del_state(ruc)?;
        debug!(ruc, "asset deleted");
        Ok(())
    }

    pub async fn asset_exists(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
    ) -> Result<bool, ContractError> {
        Ok(ctx.get_state(ruc).await?.is_some())
    }

    /// Credit a contribution to a political organisation, capped by its
    /// `maxAmount`.
    pub async fn transfer_contribution(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
        amount: Amount,
    ) -> Result<Asset, ContractError> {
        self.modify(ctx, ruc, |asset| asset.contribute(amount)).await
    }

    /// Track what a contributor has given. No ceiling.
    pub async fn transfer_contributor(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
        amount: Amount,
    ) -> Result<Asset, ContractError> {
        self.modify(ctx, ruc, |asset| asset.record_contribution(amount))
            .await
    }

    /// Charge an expense to a political organisation, capped by what it has
    /// received.
    pub async fn transfer_expense(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
        amount: Amount,
    ) -> Result<Asset, ContractError> {
        self.modify(ctx, ruc, |asset| asset.spend(amount)).await
    }

    /// Track what a supplier has been paid. No ceiling.
    pub async fn transfer_supplier(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
        amount: Amount,
    ) -> Result<Asset, ContractError> {
        self.modify(ctx, ruc, |asset| asset.record_expense(amount))
            .await
    }

    /// Every asset in world state, ordered by RUC.
    pub async fn get_all_assets(
        &self,
        ctx: &TransactionContext,
    ) -> Result<Vec<Asset>, ContractError> {
        ctx.get_state_by_range("", "")
            .await?
            .iter()
            .map(|kv| Asset::from_json(&kv.value))
            .collect()
    }

    /// Every committed version of an asset, oldest first, deletions included.
    pub async fn get_asset_history(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
    ) -> Result<Vec<HistoryQueryResult>, ContractError> {
        debug!(ruc, "GetAssetHistory");
        ctx.get_history_for_key(ruc)
            .await?
            .into_iter()
            .map(|modification| HistoryQueryResult::from_modification(ruc, modification))
            .collect()
    }

    async fn modify<F>(
        &self,
        ctx: &TransactionContext,
        ruc: &str,
        f: F,
    ) -> Result<Asset, ContractError>
    where
        F: FnOnce(&mut Asset) -> Result<(), ContractError>,
    {
        let mut asset = self.read_asset(ctx, ruc).await?;
        f(&mut asset)?;
        put_asset(ctx, &asset)?;
        Ok(asset)
    }
}

fn put_asset(ctx: &TransactionContext, asset: &Asset) -> Result<(), ContractError> {
    ctx.put_state(&asset.ruc, asset.to_json()?)?;
    Ok(())
}
