use crate::{Amount, ContractError};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Category tag of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DocType {
    /// Political organisation: receives contributions, pays suppliers.
    #[serde(rename = "ORG-POL")]
    PoliticalOrganization,
    #[serde(rename = "APORTANTE")]
    Contributor,
    #[serde(rename = "PROVEEDOR")]
    Supplier,
    /// Receipt of a single contribution.
    #[serde(rename = "APORTE")]
    Contribution,
    /// Receipt of a single payment.
    #[serde(rename = "PAGO")]
    Payment,
}

impl DocType {
    pub const ALL: [DocType; 5] = [
        DocType::PoliticalOrganization,
        DocType::Contributor,
        DocType::Supplier,
        DocType::Contribution,
        DocType::Payment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::PoliticalOrganization => "ORG-POL",
            DocType::Contributor => "APORTANTE",
            DocType::Supplier => "PROVEEDOR",
            DocType::Contribution => "APORTE",
            DocType::Payment => "PAGO",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = ContractError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        DocType::ALL
            .into_iter()
            .find(|doc_type| doc_type.as_str() == s)
            .ok_or_else(|| ContractError::InvalidArgument {
                param: "docType".to_string(),
                reason: format!("unknown document type {:?}", s),
            })
    }
}

/// A record in world state, keyed by its RUC.
///
/// Field names on the wire are the ledger's historical JSON names, including
/// the `totalContibuciones` spelling, so existing records stay readable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    #[serde(rename = "docType")]
    pub doc_type: DocType,
    #[serde(rename = "RUC")]
    pub ruc: String,
    #[serde(rename = "idBanco")]
    pub bank_id: i64,
    #[serde(rename = "montoMax")]
    pub max_amount: Amount,
    #[serde(rename = "numeroDeCuenta")]
    pub account_number: String,
    #[serde(rename = "razonSocial")]
    pub legal_name: String,
    #[serde(rename = "totalContibuciones")]
    pub total_contributions: Amount,
    #[serde(rename = "totalGastos")]
    pub total_expenses: Amount,
}

impl Asset {
    pub fn new(
        doc_type: DocType,
        ruc: &str,
        bank_id: i64,
        max_amount: Amount,
        account_number: &str,
        legal_name: &str,
    ) -> Self {
        Self {
            doc_type,
            ruc: ruc.to_string(),
            bank_id,
            max_amount,
            account_number: account_number.to_string(),
            legal_name: legal_name.to_string(),
            total_contributions: Amount::ZERO,
            total_expenses: Amount::ZERO,
        }
    }

    pub fn with_totals(mut self, contributions: Amount, expenses: Amount) -> Self {
        self.total_contributions = contributions;
        self.total_expenses = expenses;
        self
    }

    pub fn to_json(&self) -> Result<Vec<u8>, ContractError> {
        serde_json::to_vec(self).map_err(|e| ContractError::Serialize(e.to_string()))
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, ContractError> {
        serde_json::from_slice(bytes).map_err(|e| ContractError::Deserialize(e.to_string()))
    }

    pub(crate) fn validate(&self) -> Result<(), ContractError> {
        if self.ruc.trim().is_empty() {
            return Err(ContractError::InvalidArgument {
                param: "RUC".to_string(),
                reason: "must not be empty".to_string(),
            });
        }
        for (name, amount) in [
            ("montoMax", self.max_amount),
            ("totalContibuciones", self.total_contributions),
            ("totalGastos", self.total_expenses),
        ] {
            if amount.is_negative() {
                return Err(ContractError::InvalidAmount(format!(
                    "{} must not be negative, got {}",
                    name, amount
                )));
            }
            if !amount.in_range() {
                return Err(ContractError::InvalidAmount(format!(
                    "{} must not exceed {}, got {}",
                    name,
                    Amount::MAX,
                    amount
                )));
            }
        }
        Ok(())
    }

    /// Add to total contributions, refusing to pass `max_amount`.
    pub fn contribute(&mut self, amount: Amount) -> Result<(), ContractError> {
        let total = self.checked_total(self.total_contributions, amount)?;
        if total > self.max_amount {
            return Err(ContractError::ContributionLimitExceeded {
                ruc: self.ruc.clone(),
                total,
                limit: self.max_amount,
            });
        }
        self.total_contributions = total;
        Ok(())
    }

    /// Add to total contributions without a ceiling (the giving side).
    pub fn record_contribution(&mut self, amount: Amount) -> Result<(), ContractError> {
        self.total_contributions = self.checked_total(self.total_contributions, amount)?;
        Ok(())
    }

    /// Add to total expenses, refusing to pass total contributions.
    pub fn spend(&mut self, amount: Amount) -> Result<(), ContractError> {
        let total = self.checked_total(self.total_expenses, amount)?;
        if total > self.total_contributions {
            return Err(ContractError::ExpensesExceedContributions {
                ruc: self.ruc.clone(),
                total,
                contributions: self.total_contributions,
            });
        }
        self.total_expenses = total;
        Ok(())
    }

    /// Add to total expenses without a ceiling (the receiving supplier).
    pub fn record_expense(&mut self, amount: Amount) -> Result<(), ContractError> {
        self.total_expenses = self.checked_total(self.total_expenses, amount)?;
        Ok(())
    }

    fn checked_total(&self, current: Amount, amount: Amount) -> Result<Amount, ContractError> {
        if !amount.is_positive() {
            return Err(ContractError::InvalidAmount(format!(
                "transfer amount must be positive, got {}",
                amount
            )));
        }
        current.checked_add(amount).ok_or_else(|| {
            ContractError::InvalidAmount(format!(
                "total for {} would exceed {}",
                self.ruc,
                Amount::MAX
            ))
        })
    }
}

/// Records written by `InitLedger`.
pub static SEED_ASSETS: Lazy<Vec<Asset>> = Lazy::new(|| {
    let cap = Amount::from_units(5000);
    [
        ("11223344556", 1, "123456789", "PSC"),
        ("22334455667", 2, "234567891", "PSP"),
        ("33445566778", 3, "345678912", "AVANZA"),
        ("44556677889", 3, "456789123", "CREO"),
        ("55667788990", 2, "567891234", "SUMA"),
        ("66778899001", 1, "678912345", "MOVER"),
    ]
    .into_iter()
    .map(|(ruc, bank, account, name)| {
        Asset::new(DocType::PoliticalOrganization, ruc, bank, cap, account, name)
    })
    .collect()
});
