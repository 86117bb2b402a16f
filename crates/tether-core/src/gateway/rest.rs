//! Gateway speaking a JSON access API over HTTP.
//!
//! Endpoints, relative to the network host:
//! - `GET  v1/blocks/latest`
//! - `GET  v1/accounts/{address}`
//! - `POST v1/transactions`
//! - `GET  v1/transaction_results/{id}`

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use anyhow::Context;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;
use url::Url;

use super::{AccountKey, AccountState, Gateway, TxResult};
use crate::config::NetworkEntry;
use crate::transaction::Transaction;
use crate::types::{Address, BlockRef, TxId};

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);
const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_secs(120);
const POLL_INTERVAL: Duration = Duration::from_secs(1);

#[derive(Debug, Deserialize)]
struct BlockResponse {
    id: String,
    height: u64,
}

#[derive(Debug, Deserialize)]
struct AccountResponse {
    address: Address,
    #[serde(default)]
    keys: Vec<AccountKey>,
    #[serde(default)]
    contracts: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    id: String,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
enum ResultStatus {
    Pending,
    Sealed,
    Expired,
}

#[derive(Debug, Deserialize)]
struct ResultResponse {
    status: ResultStatus,
    #[serde(default)]
    error_message: Option<String>,
}

/// Blocking HTTP gateway backed by `reqwest` on a private Tokio runtime.
#[derive(Debug)]
pub struct RestGateway {
    host: Url,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
    settle_timeout: Duration,
    poll_interval: Duration,
}

impl RestGateway {
    pub fn new(host: Url, timeout: Duration, settle_timeout: Duration) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("tether/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to build HTTP client")?;
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| anyhow::anyhow!("Failed to create tokio runtime: {}", e))?;

        Ok(Self {
            host,
            client,
            runtime,
            settle_timeout,
            poll_interval: POLL_INTERVAL,
        })
    }

    /// Gateway for a configured network, applying its timeouts.
    pub fn for_network(network: &NetworkEntry) -> anyhow::Result<Self> {
        let host = Url::parse(&network.host)
            .with_context(|| format!("Invalid network host '{}'", network.host))?;
        Self::new(
            host,
            network
                .timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_TIMEOUT),
            network
                .settle_timeout_secs
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_SETTLE_TIMEOUT),
        )
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn host(&self) -> &Url {
        &self.host
    }

    fn endpoint(&self, path: &str) -> anyhow::Result<Url> {
        endpoint(&self.host, path)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url) -> anyhow::Result<T> {
        self.runtime.block_on(async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", url))?;
            if !response.status().is_success() {
                anyhow::bail!("HTTP {} from {}", response.status(), url);
            }
            response
                .json()
                .await
                .with_context(|| format!("Failed to parse response from {}", url))
        })
    }

    /// Fetch the current status of a transaction, `None` on 404.
    fn poll_result(&self, url: &Url) -> anyhow::Result<Option<ResultResponse>> {
        self.runtime.block_on(async {
            let response = self
                .client
                .get(url.clone())
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", url))?;
            if response.status() == StatusCode::NOT_FOUND {
                return Ok(None);
            }
            if !response.status().is_success() {
                anyhow::bail!("HTTP {} from {}", response.status(), url);
            }
            let result = response
                .json()
                .await
                .with_context(|| format!("Failed to parse response from {}", url))?;
            Ok(Some(result))
        })
    }
}

impl Gateway for RestGateway {
    fn latest_block(&self) -> anyhow::Result<BlockRef> {
        let block: BlockResponse = self.get_json(self.endpoint("v1/blocks/latest")?)?;
        debug!(id = %block.id, height = block.height, "Fetched latest block");
        Ok(BlockRef {
            id: block.id,
            height: block.height,
        })
    }

    fn account(&self, address: Address) -> anyhow::Result<AccountState> {
        let url = self.endpoint(&format!("v1/accounts/{}", address.to_hex()))?;
        let response: AccountResponse = self.get_json(url)?;
        decode_account(response)
    }

    fn submit(&self, transaction: &Transaction) -> anyhow::Result<TxId> {
        let url = self.endpoint("v1/transactions")?;
        let submitted: SubmitResponse = self.runtime.block_on(async {
            let response = self
                .client
                .post(url.clone())
                .json(transaction)
                .send()
                .await
                .with_context(|| format!("Failed to reach {}", url))?;
            if !response.status().is_success() {
                let status = response.status();
                let body = response.text().await.unwrap_or_default();
                anyhow::bail!("HTTP {} from {}: {}", status, url, body.trim());
            }
            response
                .json()
                .await
                .with_context(|| format!("Failed to parse response from {}", url))
        })?;
        Ok(TxId(submitted.id))
    }

    fn await_result(&self, id: &TxId) -> anyhow::Result<Option<TxResult>> {
        let url = self.endpoint(&format!("v1/transaction_results/{}", id))?;
        let started = Instant::now();

        loop {
            let result = self.poll_result(&url)?;
            match poll_step(id, result, started.elapsed(), self.settle_timeout)? {
                PollStep::Done(result) => return Ok(result),
                PollStep::Wait => {
                    debug!(%id, "Transaction pending");
                    self.runtime.block_on(tokio::time::sleep(self.poll_interval));
                }
            }
        }
    }
}

/// What to do after one poll of a transaction result.
#[derive(Debug, PartialEq, Eq)]
enum PollStep {
    Done(Option<TxResult>),
    Wait,
}

/// Decide from one poll. `None` means the network does not know the
/// transaction yet, which is only final once the settle timeout has passed.
fn poll_step(
    id: &TxId,
    result: Option<ResultResponse>,
    elapsed: Duration,
    settle_timeout: Duration,
) -> anyhow::Result<PollStep> {
    let timed_out = elapsed >= settle_timeout;
    let Some(result) = result else {
        return Ok(if timed_out {
            PollStep::Done(None)
        } else {
            PollStep::Wait
        });
    };

    match result.status {
        ResultStatus::Sealed => Ok(PollStep::Done(Some(TxResult {
            error: result.error_message.filter(|m| !m.is_empty()),
        }))),
        ResultStatus::Expired => anyhow::bail!("Transaction {} expired", id),
        ResultStatus::Pending if timed_out => anyhow::bail!(
            "Transaction {} did not settle within {}s",
            id,
            settle_timeout.as_secs()
        ),
        ResultStatus::Pending => Ok(PollStep::Wait),
    }
}

fn endpoint(host: &Url, path: &str) -> anyhow::Result<Url> {
    let base = host.as_str().trim_end_matches('/');
    Url::parse(&format!("{}/{}", base, path))
        .with_context(|| format!("Invalid endpoint {}/{}", base, path))
}

fn decode_account(response: AccountResponse) -> anyhow::Result<AccountState> {
    let contracts = response
        .contracts
        .into_iter()
        .map(|(name, code)| {
            let bytes = hex::decode(code.trim_start_matches("0x"))
                .with_context(|| format!("Contract '{}' code is not valid hex", name))?;
            Ok((name, bytes))
        })
        .collect::<anyhow::Result<BTreeMap<_, _>>>()?;

    Ok(AccountState {
        address: response.address,
        keys: response.keys,
        contracts,
    })
}
