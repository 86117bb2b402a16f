//! Execute a deployment plan against a network.
//!
//! Contracts are committed one at a time in plan order. A failing contract
//! is recorded and the run moves on; nothing already committed is undone.

use thiserror::Error;
use tracing::{debug, info, warn};

use super::{DeploymentReport, UnitOutcome, UnitStage, UnitStatus};
use crate::contracts::{ContractUnit, DeploymentPlan};
use crate::gateway::Gateway;
use crate::signer::SignerProvider;
use crate::state::{Account, ProjectState};
use crate::transaction::TransactionTemplates;
use crate::types::TxId;

/// Why a single contract could not be committed.
#[derive(Debug, Error)]
pub enum UnitFailure {
    #[error("failed to fetch latest block: {0:#}")]
    BlockFetch(anyhow::Error),

    #[error("failed to fetch account: {0:#}")]
    AccountFetch(anyhow::Error),

    #[error("account '{account}' has no key with index {key_index} on chain")]
    MissingProposerKey { account: String, key_index: u32 },

    #[error("contract already exists on account '{account}' and update was not requested")]
    AlreadyDeployed { account: String },

    #[error("contracts with init arguments cannot be updated")]
    UpdateWithArguments,

    #[error("failed to build transaction: {0:#}")]
    Build(anyhow::Error),

    #[error("failed to sign transaction: {0:#}")]
    Signing(anyhow::Error),

    #[error("failed to submit transaction: {0:#}")]
    Submission(anyhow::Error),

    #[error("failed to await transaction {tx_id}: {source:#}")]
    Settlement { tx_id: TxId, source: anyhow::Error },

    #[error("no result returned for transaction {tx_id}")]
    MissingResult { tx_id: TxId },

    #[error("transaction {tx_id} was rejected: {message}")]
    Rejected { tx_id: TxId, message: String },
}

impl UnitFailure {
    /// Transaction the failure refers to, once one was submitted.
    pub fn tx_id(&self) -> Option<&TxId> {
        match self {
            UnitFailure::Settlement { tx_id, .. }
            | UnitFailure::MissingResult { tx_id }
            | UnitFailure::Rejected { tx_id, .. } => Some(tx_id),
            _ => None,
        }
    }
}

/// What to do with a contract given what is already on chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Add,
    Update,
    Skip,
}

/// Choose the action for `unit` from the code currently deployed under its name.
pub fn decide(
    unit: &ContractUnit,
    existing: Option<&[u8]>,
    update: bool,
) -> Result<Action, UnitFailure> {
    let Some(existing) = existing else {
        return Ok(Action::Add);
    };
    if !update {
        return Err(UnitFailure::AlreadyDeployed {
            account: unit.account_name.clone(),
        });
    }
    if unit.has_args() {
        return Err(UnitFailure::UpdateWithArguments);
    }
    if existing == unit.code.as_bytes() {
        Ok(Action::Skip)
    } else {
        Ok(Action::Update)
    }
}

/// Runs the commit protocol for every unit of a plan.
pub struct Executor<'a> {
    state: &'a ProjectState,
    gateway: &'a dyn Gateway,
    signers: &'a dyn SignerProvider,
    templates: &'a dyn TransactionTemplates,
    update: bool,
    payer: Option<&'a Account>,
}

impl<'a> Executor<'a> {
    pub fn new(
        state: &'a ProjectState,
        gateway: &'a dyn Gateway,
        signers: &'a dyn SignerProvider,
        templates: &'a dyn TransactionTemplates,
    ) -> Self {
        Self {
            state,
            gateway,
            signers,
            templates,
            update: false,
            payer: None,
        }
    }

    /// Replace contracts whose code differs from what is on chain.
    pub fn with_update(mut self, update: bool) -> Self {
        self.update = update;
        self
    }

    /// Pay for every transaction from `payer` instead of the target account.
    pub fn with_payer(mut self, payer: Option<&'a Account>) -> Self {
        self.payer = payer;
        self
    }

    pub fn execute(&self, network: &str, plan: &DeploymentPlan) -> DeploymentReport {
        let mut report = DeploymentReport::new(network);
        info!(
            network,
            contracts = plan.len(),
            update = self.update,
            "Deploying {} contracts",
            plan.len()
        );

        for unit in plan {
            report.outcomes.push(self.deploy_unit(unit));
        }

        info!(
            network,
            deployed = report.deployed(),
            updated = report.updates(),
            skipped = report.skipped(),
            failed = report.failed(),
            "Deployment finished"
        );
        report
    }

    fn deploy_unit(&self, unit: &ContractUnit) -> UnitOutcome {
        let mut stage = UnitStage::Pending;
        let result = self.commit(unit, &mut stage);

        let (status, final_stage, failed_after, tx_id) = match result {
            Ok((status, tx_id)) => {
                info!(
                    contract = %unit.name,
                    address = %unit.address,
                    tx = tx_id.as_ref().map(|t| t.0.as_str()).unwrap_or("-"),
                    "Contract {}",
                    status.label()
                );
                (status, stage, None, tx_id)
            }
            Err(failure) => {
                warn!(
                    contract = %unit.name,
                    address = %unit.address,
                    stage = %stage,
                    "Contract {} failed: {}",
                    unit.name,
                    failure
                );
                let tx_id = failure.tx_id().cloned();
                (UnitStatus::Failed(failure), UnitStage::Failed, Some(stage), tx_id)
            }
        };

        UnitOutcome {
            contract: unit.name.clone(),
            account: unit.account_name.clone(),
            address: unit.address,
            status,
            stage: final_stage,
            failed_after,
            tx_id,
        }
    }

    fn commit(
        &self,
        unit: &ContractUnit,
        stage: &mut UnitStage,
    ) -> Result<(UnitStatus, Option<TxId>), UnitFailure> {
        let block = self.gateway.latest_block().map_err(UnitFailure::BlockFetch)?;
        advance(unit, stage, UnitStage::BlockFetched);

        let on_chain = self
            .gateway
            .account(unit.address)
            .map_err(UnitFailure::AccountFetch)?;
        advance(unit, stage, UnitStage::AccountFetched);

        let action = decide(unit, on_chain.contract(&unit.name), self.update)?;
        if action == Action::Skip {
            advance(unit, stage, UnitStage::Skipped);
            return Ok((UnitStatus::SkippedNoDiff, None));
        }

        let account = self.state.account(&unit.account_name).ok_or_else(|| {
            UnitFailure::Build(anyhow::anyhow!(
                "account '{}' is not defined",
                unit.account_name
            ))
        })?;
        let key_index = account.key_index();
        let proposer_key =
            on_chain
                .key(key_index)
                .ok_or_else(|| UnitFailure::MissingProposerKey {
                    account: account.name.clone(),
                    key_index,
                })?;

        let mut transaction = match action {
            Action::Add => {
                self.templates
                    .add_contract(unit.address, &unit.name, &unit.code, &unit.args)
            }
            _ => self
                .templates
                .update_contract(unit.address, &unit.name, &unit.code),
        }
        .map_err(UnitFailure::Build)?;

        let payer = self.payer.unwrap_or(account);
        transaction
            .set_reference_block(&block)
            .set_proposer(unit.address, key_index, proposer_key.sequence_number)
            .set_payer(payer.address);
        advance(unit, stage, UnitStage::Built);

        let signer = self
            .signers
            .signer_for(account, key_index)
            .map_err(UnitFailure::Signing)?;
        let role = transaction
            .sign(account.address, key_index, signer.as_ref())
            .map_err(UnitFailure::Signing)?;
        debug!(contract = %unit.name, account = %account.name, ?role, "Signed");

        if payer.address != account.address {
            let payer_signer = self
                .signers
                .signer_for(payer, payer.key_index())
                .map_err(UnitFailure::Signing)?;
            let payer_role = transaction
                .sign(payer.address, payer.key_index(), payer_signer.as_ref())
                .map_err(UnitFailure::Signing)?;
            debug!(contract = %unit.name, payer = %payer.name, role = ?payer_role, "Signed");
        }
        advance(unit, stage, UnitStage::Signed);

        let tx_id = self
            .gateway
            .submit(&transaction)
            .map_err(UnitFailure::Submission)?;
        advance(unit, stage, UnitStage::Submitted);

        let result = self
            .gateway
            .await_result(&tx_id)
            .map_err(|source| UnitFailure::Settlement {
                tx_id: tx_id.clone(),
                source,
            })?
            .ok_or_else(|| UnitFailure::MissingResult {
                tx_id: tx_id.clone(),
            })?;
        if let Some(message) = result.error {
            return Err(UnitFailure::Rejected { tx_id, message });
        }
        advance(unit, stage, UnitStage::Settled);

        let status = match action {
            Action::Add => UnitStatus::Deployed,
            _ => UnitStatus::Updated,
        };
        Ok((status, Some(tx_id)))
    }
}

fn advance(unit: &ContractUnit, stage: &mut UnitStage, next: UnitStage) {
    debug!(contract = %unit.name, from = %stage, to = %next, "Stage transition");
    *stage = next;
}
