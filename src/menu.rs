use crate::display;
use crate::gateway::Invoker;
use crate::ClientError;
use contract::ContractError;
use std::io::{BufRead, Write};
use tracing::{error, info};

const DOC_CONTRIBUTOR: &str = "APORTANTE";
const DOC_SUPPLIER: &str = "PROVEEDOR";
const DOC_CONTRIBUTION: &str = "APORTE";
const DOC_PAYMENT: &str = "PAGO";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuOption {
    RegisterContributor,
    RegisterSupplier,
    RegisterContribution,
    RegisterPayment,
    QueryRecord,
    DeleteRecord,
    History,
    ListAll,
    Quit,
}

impl MenuOption {
    pub const ALL: [MenuOption; 9] = [
        MenuOption::RegisterContributor,
        MenuOption::RegisterSupplier,
        MenuOption::RegisterContribution,
        MenuOption::RegisterPayment,
        MenuOption::QueryRecord,
        MenuOption::DeleteRecord,
        MenuOption::History,
        MenuOption::ListAll,
        MenuOption::Quit,
    ];

    pub fn number(&self) -> usize {
        match self {
            MenuOption::RegisterContributor => 1,
            MenuOption::RegisterSupplier => 2,
            MenuOption::RegisterContribution => 3,
            MenuOption::RegisterPayment => 4,
            MenuOption::QueryRecord => 5,
            MenuOption::DeleteRecord => 6,
            MenuOption::History => 7,
            MenuOption::ListAll => 8,
            MenuOption::Quit => 9,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuOption::RegisterContributor => "Registrar aportante",
            MenuOption::RegisterSupplier => "Registrar proveedor",
            MenuOption::RegisterContribution => "Registrar aporte",
            MenuOption::RegisterPayment => "Registrar pago",
            MenuOption::QueryRecord => "Consultar registro",
            MenuOption::DeleteRecord => "Eliminar registro",
            MenuOption::History => "Consultar historial",
            MenuOption::ListAll => "Mostrar todos los registros",
            MenuOption::Quit => "Salir",
        }
    }

    pub fn parse(choice: &str) -> Option<Self> {
        let number = choice.trim().parse::<usize>().ok()?;
        MenuOption::ALL.into_iter().find(|o| o.number() == number)
    }
}

enum Flow {
    Continue,
    Quit,
}

/// Interactive read-eval loop: one menu choice, one operation, repeat.
///
/// Failed operations are reported and the loop goes on. End of input quits.
pub struct Menu<R, W, I> {
    input: R,
    output: W,
    invoker: I,
}

impl<R: BufRead, W: Write, I: Invoker> Menu<R, W, I> {
    pub fn new(input: R, output: W, invoker: I) -> Self {
        Self {
            input,
            output,
            invoker,
        }
    }

    pub fn output(&self) -> &W {
        &self.output
    }

    pub async fn run(&mut self) -> Result<(), ClientError> {
        loop {
            self.print_options()?;
            let Some(choice) = self.read_line()? else {
                break;
            };

            let Some(option) = MenuOption::parse(&choice) else {
                writeln!(self.output, "Opción ingresada no encontrada.")?;
                continue;
            };
            if option == MenuOption::Quit {
                break;
            }

            info!(option = option.label(), "menu");
            match self.dispatch(option).await {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(ClientError::Io(err)) => return Err(ClientError::Io(err)),
                Err(err) => {
                    error!(option = option.label(), error = %err, "operation failed");
                    writeln!(self.output, "La operación no se completó: {}", err)?;
                }
            }
        }

        writeln!(self.output, "Aplicación finalizada.")?;
        self.output.flush()?;
        Ok(())
    }

    async fn dispatch(&mut self, option: MenuOption) -> Result<Flow, ClientError> {
        match option {
            MenuOption::RegisterContributor => self.register_party(DOC_CONTRIBUTOR).await,
            MenuOption::RegisterSupplier => self.register_party(DOC_SUPPLIER).await,
            MenuOption::RegisterContribution => self.register_contribution().await,
            MenuOption::RegisterPayment => self.register_payment().await,
            MenuOption::QueryRecord => self.query_record().await,
            MenuOption::DeleteRecord => self.delete_record().await,
            MenuOption::History => self.history().await,
            MenuOption::ListAll => self.list_all().await,
            MenuOption::Quit => Ok(Flow::Quit),
        }
    }

    async fn register_party(&mut self, doc_type: &str) -> Result<Flow, ClientError> {
        let Some(ruc) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(bank) = self.prompt("Ingrese banco: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(account) = self.prompt("Ingrese número de cuenta: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(legal_name) = self.prompt("Ingrese razón social: ")? else {
            return Ok(Flow::Quit);
        };

        self.submit(
            "CreateAsset",
            &[doc_type, &ruc, &bank, "0", &account, &legal_name, "0", "0"],
        )
        .await?;

        let kind = if doc_type == DOC_CONTRIBUTOR {
            "aportante"
        } else {
            "proveedor"
        };
        writeln!(self.output, "Registro de {} correcto.", kind)?;
        Ok(Flow::Continue)
    }

    /// Organisation receives, contributor gives, then the receipt is stored.
    async fn register_contribution(&mut self) -> Result<Flow, ClientError> {
        writeln!(self.output, "Aportante:")?;
        let Some(contributor) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };
        writeln!(self.output, "Organización política:")?;
        let Some(org) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(amount) = self.prompt("Ingrese total contribuciones: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(record_id) = self.prompt("Ingrese id del registro: ")? else {
            return Ok(Flow::Quit);
        };

        self.check_registration(&[&org, &contributor], &record_id)
            .await?;
        self.submit("TransferContribution", &[&org, &amount]).await?;
        self.submit("TransferContributor", &[&contributor, &amount])
            .await?;
        self.submit(
            "CreateAsset",
            &[DOC_CONTRIBUTION, &record_id, "0", "0", &org, &contributor, &amount, "0"],
        )
        .await?;

        writeln!(self.output, "Registro de aporte correcto.")?;
        Ok(Flow::Continue)
    }

    /// Organisation spends, supplier is paid, then the receipt is stored.
    async fn register_payment(&mut self) -> Result<Flow, ClientError> {
        writeln!(self.output, "Organización política:")?;
        let Some(org) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };
        writeln!(self.output, "Proveedor:")?;
        let Some(supplier) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(amount) = self.prompt("Ingrese total gastos: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(record_id) = self.prompt("Ingrese id del registro: ")? else {
            return Ok(Flow::Quit);
        };

        self.check_registration(&[&org, &supplier], &record_id)
            .await?;
        self.submit("TransferExpense", &[&org, &amount]).await?;
        self.submit("TransferSupplier", &[&supplier, &amount]).await?;
        self.submit(
            "CreateAsset",
            &[DOC_PAYMENT, &record_id, "0", "0", &supplier, &org, "0", &amount],
        )
        .await?;

        writeln!(self.output, "Registro de pago correcto.")?;
        Ok(Flow::Continue)
    }

    async fn query_record(&mut self) -> Result<Flow, ClientError> {
        let Some(ruc) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };

        if !self.exists(&ruc).await? {
            writeln!(self.output, "No existe el registro buscado.")?;
            return Ok(Flow::Continue);
        }

        let result = self.evaluate("ReadAsset", &[&ruc]).await?;
        writeln!(self.output, "Registro encontrado.")?;
        writeln!(self.output, "{}", display::render(&result))?;
        Ok(Flow::Continue)
    }

    async fn delete_record(&mut self) -> Result<Flow, ClientError> {
        let Some(ruc) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };

        if !self.exists(&ruc).await? {
            writeln!(self.output, "No existe el registro buscado.")?;
            return Ok(Flow::Continue);
        }

        self.submit("DeleteAsset", &[&ruc]).await?;
        writeln!(self.output, "Registro eliminado.")?;
        Ok(Flow::Continue)
    }

    async fn history(&mut self) -> Result<Flow, ClientError> {
        let Some(ruc) = self.prompt("Ingrese RUC: ")? else {
            return Ok(Flow::Quit);
        };

        let result = self.evaluate("GetAssetHistory", &[&ruc]).await?;
        writeln!(self.output, "{}", display::render(&result))?;
        Ok(Flow::Continue)
    }

    async fn list_all(&mut self) -> Result<Flow, ClientError> {
        let result = self.evaluate("GetAllAssets", &[]).await?;
        writeln!(self.output, "{}", display::render(&result))?;
        Ok(Flow::Continue)
    }

    /// Each step of a registration commits on its own, so every party must
    /// exist and the receipt id must be free before the first one runs.
    async fn check_registration(
        &self,
        parties: &[&str],
        record_id: &str,
    ) -> Result<(), ClientError> {
        for ruc in parties {
            if !self.exists(ruc).await? {
                return Err(ClientError::Contract(ContractError::AssetNotFound(
                    ruc.to_string(),
                )));
            }
        }
        if self.exists(record_id).await? {
            return Err(ClientError::Contract(ContractError::AssetExists(
                record_id.to_string(),
            )));
        }
        Ok(())
    }

    async fn exists(&self, ruc: &str) -> Result<bool, ClientError> {
        let result = self.evaluate("AssetExists", &[ruc]).await?;
        Ok(display::is_true(&result))
    }

    async fn submit(&self, function: &str, args: &[&str]) -> Result<Vec<u8>, ClientError> {
        self.invoker.submit(function, &to_owned(args)).await
    }

    async fn evaluate(&self, function: &str, args: &[&str]) -> Result<Vec<u8>, ClientError> {
        self.invoker.evaluate(function, &to_owned(args)).await
    }

    fn print_options(&mut self) -> Result<(), ClientError> {
        writeln!(self.output, "Ingrese una opción:")?;
        for option in MenuOption::ALL {
            writeln!(self.output, "{}.- {}", option.number(), option.label())?;
        }
        self.output.flush()?;
        Ok(())
    }

    fn prompt(&mut self, label: &str) -> Result<Option<String>, ClientError> {
        write!(self.output, "{}", label)?;
        self.output.flush()?;
        self.read_line()
    }

    /// Next input line without its line ending. `None` at end of input.
    fn read_line(&mut self) -> Result<Option<String>, ClientError> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }
}

fn to_owned(args: &[&str]) -> Vec<String> {
    args.iter().map(|a| a.to_string()).collect()
}
