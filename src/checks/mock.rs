//! In-memory node used by the check tests.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::sync::Mutex;

use crate::fetcher::client::Fetcher;
use crate::fetcher::types::*;

pub(crate) const TIMESTAMP: i64 = 1_600_000_000_000;

pub(crate) fn sweet() -> NetworkIdentifier {
    NetworkIdentifier::new("sweet", "sweeter")
}

pub(crate) fn block_at(index: i64) -> Block {
    Block {
        block_identifier: BlockIdentifier { index, hash: format!("block-{}", index) },
        parent_block_identifier: BlockIdentifier {
            index: (index - 1).max(0),
            hash: format!("block-{}", (index - 1).max(0)),
        },
        timestamp: TIMESTAMP + index,
        ..Default::default()
    }
}

pub(crate) fn transfer(account: &str, symbol: &str) -> Operation {
    Operation {
        kind: "TRANSFER".into(),
        status: Some("SUCCESS".into()),
        account: Some(AccountIdentifier::new(account)),
        amount: Some(Amount {
            value: "100".into(),
            currency: Some(Currency::new(symbol, 8)),
            metadata: None,
        }),
        ..Default::default()
    }
}

pub(crate) fn api_error(code: Option<i64>, message: &str) -> FetchError {
    FetchError::Api {
        status: 500,
        error: ApiError {
            code,
            message: message.into(),
            ..Default::default()
        },
    }
}

pub(crate) struct MockNode {
    pub network_list: FetchResult<NetworkListResponse>,
    pub network_options: FetchResult<NetworkOptionsResponse>,
    statuses: Mutex<VecDeque<FetchResult<NetworkStatusResponse>>>,
    pub chain: BTreeMap<i64, Block>,
    by_hash: Mutex<VecDeque<FetchResult<Option<Block>>>>,
    pub tip_block: Option<FetchResult<Option<Block>>>,
    pub failing_indices: HashSet<i64>,
    pub balance: FetchResult<AccountBalanceResponse>,
    pub coins: FetchResult<AccountCoinsResponse>,
    /// Error returned for requests with an empty network identifier. An
    /// entry of `None` makes that endpoint accept the invalid request.
    pub invalid_overrides: HashMap<&'static str, Option<FetchError>>,
    pub calls: Mutex<Vec<String>>,
}

impl MockNode {
    /// A conforming node with blocks `0..len` and no transactions.
    pub fn with_chain(len: i64) -> Self {
        let chain: BTreeMap<i64, Block> = (0..len).map(|i| (i, block_at(i))).collect();
        Self {
            network_list: Ok(NetworkListResponse {
                network_identifiers: vec![sweet(), NetworkIdentifier::new("other", "x")],
            }),
            network_options: Ok(NetworkOptionsResponse {
                version: Some(Version {
                    rosetta_version: "1.4.13".into(),
                    node_version: "1.0.0".into(),
                    ..Default::default()
                }),
                allow: Some(Allow {
                    operation_statuses: vec![
                        OperationStatus { status: "SUCCESS".into(), successful: true },
                        OperationStatus { status: "FAILURE".into(), successful: false },
                    ],
                    operation_types: vec!["TRANSFER".into()],
                    errors: vec![ApiError {
                        code: Some(1),
                        message: "invalid network".into(),
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            }),
            statuses: Mutex::new(VecDeque::new()),
            chain,
            by_hash: Mutex::new(VecDeque::new()),
            tip_block: None,
            failing_indices: HashSet::new(),
            balance: Ok(AccountBalanceResponse {
                block_identifier: Some(block_at(0).block_identifier),
                balances: vec![Amount {
                    value: "100".into(),
                    currency: Some(Currency::new("BTC", 8)),
                    metadata: None,
                }],
                metadata: None,
            }),
            coins: Ok(AccountCoinsResponse {
                block_identifier: Some(block_at(0).block_identifier),
                coins: vec![Coin {
                    coin_identifier: Some(CoinIdentifier { identifier: "tx:0".into() }),
                    amount: Some(Amount {
                        value: "100".into(),
                        currency: Some(Currency::new("BTC", 8)),
                        metadata: None,
                    }),
                }],
                metadata: None,
            }),
            invalid_overrides: HashMap::new(),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Append a transaction with `operations` to the block at `index`.
    pub fn add_transaction(&mut self, index: i64, operations: Vec<Operation>) {
        let block = self.chain.get_mut(&index).expect("block exists");
        let hash = format!("tx-{}-{}", index, block.transactions.len());
        block.transactions.push(Transaction {
            transaction_identifier: TransactionIdentifier { hash },
            operations,
            metadata: None,
        });
    }

    /// Queue a `/network/status` answer. The last queued answer repeats.
    pub fn push_status(&self, status: FetchResult<NetworkStatusResponse>) {
        self.statuses.lock().unwrap().push_back(status);
    }

    /// Queue an answer for a block fetched by hash. The last one repeats.
    pub fn push_hash_response(&self, block: FetchResult<Option<Block>>) {
        self.by_hash.lock().unwrap().push_back(block);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn fetched_indices(&self) -> Vec<i64> {
        self.calls()
            .iter()
            .filter_map(|c| c.strip_prefix("block index "))
            .filter_map(|i| i.parse().ok())
            .collect()
    }

    fn chain_status(&self) -> NetworkStatusResponse {
        let tip = self.chain.values().next_back().cloned().unwrap_or_default();
        let genesis = self.chain.values().next().cloned().unwrap_or_default();
        NetworkStatusResponse {
            current_block_identifier: Some(tip.block_identifier),
            current_block_timestamp: Some(tip.timestamp),
            genesis_block_identifier: Some(genesis.block_identifier),
            ..Default::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }

    fn reject_invalid(&self, endpoint: &'static str, network: &NetworkIdentifier) -> FetchResult<()> {
        if !network.blockchain.is_empty() {
            return Ok(());
        }
        match self.invalid_overrides.get(endpoint) {
            Some(None) => Ok(()),
            Some(Some(error)) => Err(error.clone()),
            None => Err(api_error(Some(4), "network identifier is invalid")),
        }
    }

    fn pop_sticky<T: Clone>(queue: &Mutex<VecDeque<T>>) -> Option<T> {
        let mut queue = queue.lock().unwrap();
        if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        }
    }
}

#[async_trait]
impl Fetcher for MockNode {
    async fn network_list(&self) -> FetchResult<NetworkListResponse> {
        self.record("list".into());
        self.network_list.clone()
    }

    async fn network_options(&self, network: &NetworkIdentifier) -> FetchResult<NetworkOptionsResponse> {
        self.record("options".into());
        self.reject_invalid("/network/options", network)?;
        self.network_options.clone()
    }

    async fn network_status(&self, network: &NetworkIdentifier) -> FetchResult<NetworkStatusResponse> {
        self.record("status".into());
        self.reject_invalid("/network/status", network)?;
        Self::pop_sticky(&self.statuses).unwrap_or_else(|| Ok(self.chain_status()))
    }

    async fn account_balance(
        &self,
        network: &NetworkIdentifier,
        account: &AccountIdentifier,
        block: Option<&PartialBlockIdentifier>,
        _currencies: &[Currency],
    ) -> FetchResult<AccountBalanceResponse> {
        let at = block.map(|b| b.to_string()).unwrap_or_default();
        self.record(format!("balance {} {}", account, at));
        self.reject_invalid("/account/balance", network)?;
        self.balance.clone()
    }

    async fn account_coins(
        &self,
        network: &NetworkIdentifier,
        account: &AccountIdentifier,
        _include_mempool: bool,
        _currencies: &[Currency],
    ) -> FetchResult<AccountCoinsResponse> {
        self.record(format!("coins {}", account));
        self.reject_invalid("/account/coins", network)?;
        self.coins.clone()
    }

    async fn block(
        &self,
        network: &NetworkIdentifier,
        block: &PartialBlockIdentifier,
    ) -> FetchResult<Option<Block>> {
        self.record(format!("block {}", block));
        self.reject_invalid("/block", network)?;

        if block.is_tip() {
            return match &self.tip_block {
                Some(tip) => tip.clone(),
                None => Ok(self.chain.values().next_back().cloned()),
            };
        }
        if let Some(hash) = &block.hash {
            if let Some(response) = Self::pop_sticky(&self.by_hash) {
                return response;
            }
            return match self.chain.values().find(|b| &b.block_identifier.hash == hash) {
                Some(found) => Ok(Some(found.clone())),
                None => Err(api_error(Some(6), "block not found")),
            };
        }

        let index = block.index.unwrap_or_default();
        if self.failing_indices.contains(&index) {
            return Err(FetchError::Transport("connection reset".into()));
        }
        Ok(self.chain.get(&index).cloned())
    }

    async fn transactions(
        &self,
        network: &NetworkIdentifier,
        block: &BlockIdentifier,
        transactions: &[TransactionIdentifier],
    ) -> FetchResult<Vec<Transaction>> {
        self.record(format!("transactions {}", block.index));
        self.reject_invalid("/block/transaction", network)?;
        let found = self
            .chain
            .get(&block.index)
            .map(|b| {
                b.transactions
                    .iter()
                    .filter(|t| transactions.contains(&t.transaction_identifier))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        Ok(found)
    }
}
