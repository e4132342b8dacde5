//! Account discovery.
//!
//! Walks the chain backwards from the tip looking for an operation that
//! names both an account and a currency. The first match becomes the fixture
//! used by the account endpoint checks.
//!
//! # Scan Bounds
//! ```text
//! tip ──▶ tip-1 ──▶ ... ──▶ genesis
//!  │ stops at: first qualifying block
//!  │           genesis passed        → NotFound
//!  │           max blocks scanned    → LimitReached (resumable)
//!  │           shutdown signal       → Cancelled
//!  │           block fetch error     → DiscoveryError::Block
//! ```

use thiserror::Error;

use crate::fetcher::client::Fetcher;
use crate::fetcher::types::{
    AccountIdentifier, Block, Currency, FetchError, NetworkIdentifier, PartialBlockIdentifier,
};
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

const PROGRESS_INTERVAL: u64 = 100;

/// An account known to exist on chain, with the currencies it was paid in.
#[derive(Debug, Clone, PartialEq)]
pub struct Fixture {
    pub account: AccountIdentifier,
    /// Block the account was observed in.
    pub block: PartialBlockIdentifier,
    pub currencies: Vec<Currency>,
}

/// How discovery ended when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum Discovery {
    Found(Fixture),
    /// Every block down to genesis was scanned.
    NotFound { scanned: u64 },
    /// The configured block budget ran out before genesis.
    LimitReached { scanned: u64, next_index: i64 },
    /// The shutdown signal fired mid-scan.
    Cancelled { scanned: u64 },
}

impl Discovery {
    /// The fixture, or a description of why there is none.
    pub fn into_fixture(self) -> Result<Fixture, String> {
        match self {
            Discovery::Found(fixture) => Ok(fixture),
            Discovery::NotFound { scanned } => Err(format!(
                "no account with a currency found in {} blocks down to genesis",
                scanned
            )),
            Discovery::LimitReached { scanned, next_index } => Err(format!(
                "no account with a currency found within the {} block scan limit (stopped above index {})",
                scanned, next_index
            )),
            Discovery::Cancelled { scanned } => {
                Err(format!("account discovery cancelled after {} blocks", scanned))
            }
        }
    }
}

#[derive(Debug, Clone, Error)]
pub enum DiscoveryError {
    #[error("unable to get network status: {0}")]
    NetworkStatus(#[source] FetchError),

    #[error("network status has no {0}")]
    IncompleteStatus(&'static str),

    #[error("unable to fetch block at index {index}: {source}")]
    Block {
        index: i64,
        #[source]
        source: FetchError,
    },
}

/// One step of a [`BlockScan`].
#[derive(Debug)]
pub enum ScanEvent {
    /// Block at `index`; `None` when the node omitted it.
    Block { index: i64, block: Option<Block> },
    ReachedGenesis,
    LimitReached,
    Cancelled,
}

/// Lazy backward walk over block indices.
///
/// The scan keeps its position, so a caller that hits the limit can raise it
/// with [`BlockScan::extend_limit`] and continue where it stopped.
#[derive(Debug, Clone)]
pub struct BlockScan {
    next: i64,
    genesis: i64,
    scanned: u64,
    limit: Option<u64>,
}

impl BlockScan {
    pub fn new(tip: i64, genesis: i64, limit: Option<u64>) -> Self {
        Self {
            next: tip,
            genesis,
            scanned: 0,
            limit,
        }
    }

    pub fn scanned(&self) -> u64 {
        self.scanned
    }

    /// Index the next call will fetch.
    pub fn next_index(&self) -> i64 {
        self.next
    }

    pub fn extend_limit(&mut self, extra: u64) {
        if let Some(limit) = self.limit.as_mut() {
            *limit = limit.saturating_add(extra);
        }
    }

    /// Fetch the next older block.
    pub async fn next(
        &mut self,
        fetcher: &dyn Fetcher,
        network: &NetworkIdentifier,
        signal: &mut ShutdownSignal,
    ) -> Result<ScanEvent, DiscoveryError> {
        if self.next < self.genesis {
            return Ok(ScanEvent::ReachedGenesis);
        }
        if self.limit.is_some_and(|limit| self.scanned >= limit) {
            return Ok(ScanEvent::LimitReached);
        }
        if signal.is_triggered() {
            return Ok(ScanEvent::Cancelled);
        }

        let index = self.next;
        let id = PartialBlockIdentifier::at_index(index);
        let block = tokio::select! {
            result = fetcher.block(network, &id) => {
                result.map_err(|source| DiscoveryError::Block { index, source })?
            }
            _ = signal.triggered() => return Ok(ScanEvent::Cancelled),
        };

        self.next -= 1;
        self.scanned += 1;
        metrics::record_block_scanned();
        Ok(ScanEvent::Block { index, block })
    }
}

/// First account in `block` with a currency, plus every currency the same
/// account was paid in within that transaction. Accounts with an empty
/// address cannot be queried and are passed over.
pub fn find_account(block: &Block) -> Option<(AccountIdentifier, Vec<Currency>)> {
    for transaction in &block.transactions {
        let mut found: Option<&AccountIdentifier> = None;
        let mut currencies: Vec<Currency> = Vec::new();

        for operation in &transaction.operations {
            let account = operation.account.as_ref();
            let currency = operation.amount.as_ref().and_then(|a| a.currency.as_ref());
            let (Some(account), Some(currency)) = (account, currency) else {
                continue;
            };
            if account.address.is_empty() {
                continue;
            }

            match found {
                None => found = Some(account),
                Some(first) if first == account => {}
                Some(_) => continue,
            }
            if !currencies.contains(currency) {
                currencies.push(currency.clone());
            }
        }

        if let Some(account) = found {
            return Some((account.clone(), currencies));
        }
    }
    None
}

/// Search backwards from the tip for a fixture account.
pub async fn discover_account(
    fetcher: &dyn Fetcher,
    network: &NetworkIdentifier,
    max_blocks: Option<u64>,
    signal: &ShutdownSignal,
) -> Result<Discovery, DiscoveryError> {
    let status = fetcher
        .network_status(network)
        .await
        .map_err(DiscoveryError::NetworkStatus)?;
    let tip = status
        .current_block_identifier
        .ok_or(DiscoveryError::IncompleteStatus("current block identifier"))?
        .index;
    let genesis = status
        .genesis_block_identifier
        .ok_or(DiscoveryError::IncompleteStatus("genesis block identifier"))?
        .index;

    tracing::info!(tip, genesis, max_blocks = ?max_blocks, "Searching for an account backwards from the tip");

    let mut signal = signal.clone();
    let mut scan = BlockScan::new(tip, genesis, max_blocks);
    loop {
        match scan.next(fetcher, network, &mut signal).await? {
            ScanEvent::Block { index, block: Some(block) } => {
                if let Some((account, currencies)) = find_account(&block) {
                    tracing::info!(
                        account = %account,
                        index,
                        currencies = currencies.len(),
                        scanned = scan.scanned(),
                        "Found account"
                    );
                    return Ok(Discovery::Found(Fixture {
                        account,
                        block: PartialBlockIdentifier::at_index(index),
                        currencies,
                    }));
                }
                if scan.scanned() % PROGRESS_INTERVAL == 0 {
                    tracing::info!(scanned = scan.scanned(), index, "Still searching for an account");
                }
            }
            ScanEvent::Block { index, block: None } => {
                tracing::debug!(index, "Block omitted by node, skipping");
            }
            ScanEvent::ReachedGenesis => {
                return Ok(Discovery::NotFound { scanned: scan.scanned() });
            }
            ScanEvent::LimitReached => {
                tracing::warn!(scanned = scan.scanned(), "Block scan limit reached");
                return Ok(Discovery::LimitReached {
                    scanned: scan.scanned(),
                    next_index: scan.next_index(),
                });
            }
            ScanEvent::Cancelled => {
                return Ok(Discovery::Cancelled { scanned: scan.scanned() });
            }
        }
    }
}
