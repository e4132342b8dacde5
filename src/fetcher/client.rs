//! Node API client with connection limits, timeouts and retries.
//!
//! # Responsibilities
//! - Expose every data endpoint the checks consume as a typed call
//! - Map HTTP failures onto `FetchError`, keeping the node's error object
//! - Retry retriable failures within the configured budget

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use url::Url;

use crate::config::schema::{CheckConfig, ConstructionConfig};
use crate::fetcher::types::*;
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// Typed access to a node's data API.
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn network_list(&self) -> FetchResult<NetworkListResponse>;

    async fn network_options(&self, network: &NetworkIdentifier) -> FetchResult<NetworkOptionsResponse>;

    async fn network_status(&self, network: &NetworkIdentifier) -> FetchResult<NetworkStatusResponse>;

    async fn account_balance(
        &self,
        network: &NetworkIdentifier,
        account: &AccountIdentifier,
        block: Option<&PartialBlockIdentifier>,
        currencies: &[Currency],
    ) -> FetchResult<AccountBalanceResponse>;

    async fn account_coins(
        &self,
        network: &NetworkIdentifier,
        account: &AccountIdentifier,
        include_mempool: bool,
        currencies: &[Currency],
    ) -> FetchResult<AccountCoinsResponse>;

    /// Fetch a block. `Ok(None)` means the node omitted the block.
    async fn block(
        &self,
        network: &NetworkIdentifier,
        block: &PartialBlockIdentifier,
    ) -> FetchResult<Option<Block>>;

    async fn transactions(
        &self,
        network: &NetworkIdentifier,
        block: &BlockIdentifier,
        transactions: &[TransactionIdentifier],
    ) -> FetchResult<Vec<Transaction>>;
}

/// Settings for one request handle.
#[derive(Debug, Clone)]
pub struct FetcherOptions {
    pub max_connections: usize,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl FetcherOptions {
    /// Options for the online (data) handle.
    pub fn online(config: &CheckConfig) -> Self {
        Self::with_connections(config, config.max_online_connections)
    }

    /// Options for the offline (construction) handle.
    pub fn offline(config: &CheckConfig, construction: &ConstructionConfig) -> Self {
        Self::with_connections(config, construction.max_offline_connections)
    }

    fn with_connections(config: &CheckConfig, max_connections: usize) -> Self {
        Self {
            max_connections,
            timeout: Duration::from_secs(config.http_timeout_secs),
            retry: RetryPolicy {
                max_retries: config.max_retries,
                max_elapsed: Duration::from_secs(config.retry_elapsed_time_secs),
                force_retry: config.force_retry,
                ..RetryPolicy::default()
            },
        }
    }
}

/// JSON-over-HTTP implementation of [`Fetcher`].
#[derive(Clone)]
pub struct HttpFetcher {
    base_url: Url,
    client: reqwest::Client,
    permits: Arc<Semaphore>,
    retry: RetryPolicy,
}

impl HttpFetcher {
    /// Create a new fetcher for the node at `base_url`.
    pub fn new(base_url: &str, options: FetcherOptions) -> FetchResult<Self> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| FetchError::Url(format!("'{}': {}", base_url, e)))?;
        // Endpoint paths are joined relative to the base.
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .pool_max_idle_per_host(options.max_connections)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        Ok(Self {
            base_url,
            client,
            permits: Arc::new(Semaphore::new(options.max_connections.max(1))),
            retry: options.retry,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    async fn post<B, T>(&self, endpoint: &'static str, body: &B) -> FetchResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let url = self
            .base_url
            .join(endpoint.trim_start_matches('/'))
            .map_err(|e| FetchError::Url(e.to_string()))?;

        let started = Instant::now();
        let mut retry = 0;
        loop {
            let attempt = Instant::now();
            let result = self.post_once(&url, body).await;
            metrics::record_fetch(endpoint, result.is_ok(), attempt.elapsed());

            let error = match result {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            retry += 1;
            match self.retry.next_delay(retry, started, &error) {
                Some(delay) => {
                    tracing::debug!(
                        endpoint,
                        retry,
                        delay_ms = delay.as_millis() as u64,
                        error = %error,
                        "Request failed, retrying"
                    );
                    metrics::record_retry(endpoint);
                    tokio::time::sleep(delay).await;
                }
                None => return Err(error),
            }
        }
    }

    async fn post_once<B, T>(&self, url: &Url, body: &B) -> FetchResult<T>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned,
    {
        let _permit = self
            .permits
            .acquire()
            .await
            .map_err(|_| FetchError::Transport("connection limiter closed".to_string()))?;

        let response = self.client.post(url.clone()).json(body).send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;

        if status.is_success() {
            return serde_json::from_slice(&bytes).map_err(|e| FetchError::Decode(e.to_string()));
        }

        match serde_json::from_slice::<ApiError>(&bytes) {
            Ok(error) if error.code.is_some() || !error.message.is_empty() => Err(FetchError::Api {
                status: status.as_u16(),
                error,
            }),
            _ => Err(FetchError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&bytes).into_owned(),
            }),
        }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn network_list(&self) -> FetchResult<NetworkListResponse> {
        self.post("/network/list", &MetadataRequest { metadata: None }).await
    }

    async fn network_options(&self, network: &NetworkIdentifier) -> FetchResult<NetworkOptionsResponse> {
        self.post("/network/options", &NetworkRequest { network_identifier: network })
            .await
    }

    async fn network_status(&self, network: &NetworkIdentifier) -> FetchResult<NetworkStatusResponse> {
        self.post("/network/status", &NetworkRequest { network_identifier: network })
            .await
    }

    async fn account_balance(
        &self,
        network: &NetworkIdentifier,
        account: &AccountIdentifier,
        block: Option<&PartialBlockIdentifier>,
        currencies: &[Currency],
    ) -> FetchResult<AccountBalanceResponse> {
        let request = AccountBalanceRequest {
            network_identifier: network,
            account_identifier: account,
            block_identifier: block,
            currencies,
        };
        self.post("/account/balance", &request).await
    }

    async fn account_coins(
        &self,
        network: &NetworkIdentifier,
        account: &AccountIdentifier,
        include_mempool: bool,
        currencies: &[Currency],
    ) -> FetchResult<AccountCoinsResponse> {
        let request = AccountCoinsRequest {
            network_identifier: network,
            account_identifier: account,
            include_mempool,
            currencies,
        };
        self.post("/account/coins", &request).await
    }

    async fn block(
        &self,
        network: &NetworkIdentifier,
        block: &PartialBlockIdentifier,
    ) -> FetchResult<Option<Block>> {
        let request = BlockRequest {
            network_identifier: network,
            block_identifier: block,
        };
        let response: BlockResponse = self.post("/block", &request).await?;

        let Some(mut fetched) = response.block else {
            return Ok(None);
        };
        if !response.other_transactions.is_empty() {
            let others = self
                .transactions(network, &fetched.block_identifier, &response.other_transactions)
                .await?;
            fetched.transactions.extend(others);
        }
        Ok(Some(fetched))
    }

    async fn transactions(
        &self,
        network: &NetworkIdentifier,
        block: &BlockIdentifier,
        transactions: &[TransactionIdentifier],
    ) -> FetchResult<Vec<Transaction>> {
        let mut fetched = Vec::with_capacity(transactions.len());
        for transaction in transactions {
            let request = BlockTransactionRequest {
                network_identifier: network,
                block_identifier: block,
                transaction_identifier: transaction,
            };
            let response: BlockTransactionResponse = self.post("/block/transaction", &request).await?;
            fetched.push(response.transaction);
        }
        Ok(fetched)
    }
}

impl std::fmt::Debug for HttpFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpFetcher")
            .field("base_url", &self.base_url.as_str())
            .field("max_retries", &self.retry.max_retries)
            .finish()
    }
}
