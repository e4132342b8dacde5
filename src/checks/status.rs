//! Requirement and status model.
//!
//! # State Transitions
//! ```text
//! success → failure   (set_failure / mark_all_failed, idempotent)
//! failure → success   never
//! ```
//!
//! Each endpoint has its own closed set of requirements. A [`Validation`] is
//! seeded with every requirement of its set as `success` and is turned into
//! an immutable [`EndpointReport`] when the check returns.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

use crate::fetcher::types::NetworkIdentifier;
use crate::observability::metrics;

/// API surface a report covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Api {
    NetworkStatus,
    NetworkList,
    NetworkOptions,
    AccountBalance,
    AccountCoins,
    Block,
    ErrorObject,
}

impl Api {
    pub fn name(self) -> &'static str {
        match self {
            Api::NetworkStatus => "/network/status",
            Api::NetworkList => "/network/list",
            Api::NetworkOptions => "/network/options",
            Api::AccountBalance => "/account/balance",
            Api::AccountCoins => "/account/coins",
            Api::Block => "/block",
            Api::ErrorObject => "error object",
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("Success"),
            Status::Failure => f.write_str("Failure"),
        }
    }
}

/// The closed requirement set of one endpoint.
pub trait RequirementSet: Copy + Ord + fmt::Debug + Into<Requirement> + 'static {
    const API: Api;
    const ALL: &'static [Self];

    fn name(self) -> &'static str;
}

macro_rules! requirement_set {
    ($(#[$meta:meta])* $name:ident => $api:ident { $($variant:ident => $label:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum $name {
            $($variant),+
        }

        impl RequirementSet for $name {
            const API: Api = Api::$api;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn name(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl From<$name> for Requirement {
            fn from(requirement: $name) -> Self {
                Requirement::$api(requirement)
            }
        }
    };
}

requirement_set! {
    /// `/network/status` requirements.
    NetworkStatusRequirement => NetworkStatus {
        CurrentBlockId => "current_block_identifier",
        CurrentBlockTime => "current_block_timestamp",
        GenesisBlockId => "genesis_block_identifier",
    }
}

requirement_set! {
    /// `/network/list` requirements.
    NetworkListRequirement => NetworkList {
        NetworkIds => "network_identifiers",
        OfflineMode => "offline_mode",
        StaticNetworkId => "static_network_id",
    }
}

requirement_set! {
    /// `/network/options` requirements.
    NetworkOptionsRequirement => NetworkOptions {
        Version => "version",
        Allow => "allow",
        OfflineMode => "offline_mode",
    }
}

requirement_set! {
    /// `/account/balance` requirements.
    AccountBalanceRequirement => AccountBalance {
        BlockId => "block_identifier",
        Balances => "balances",
    }
}

requirement_set! {
    /// `/account/coins` requirements.
    AccountCoinsRequirement => AccountCoins {
        BlockId => "block_identifier",
        Coins => "coins",
    }
}

requirement_set! {
    /// `/block` requirements.
    BlockRequirement => Block {
        Idempotent => "idempotent",
        DefaultTip => "default_tip",
    }
}

requirement_set! {
    /// Error object requirements.
    ErrorObjectRequirement => ErrorObject {
        ErrorCode => "error_code",
        ErrorMessage => "error_message",
    }
}

/// A requirement of any endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Requirement {
    NetworkStatus(NetworkStatusRequirement),
    NetworkList(NetworkListRequirement),
    NetworkOptions(NetworkOptionsRequirement),
    AccountBalance(AccountBalanceRequirement),
    AccountCoins(AccountCoinsRequirement),
    Block(BlockRequirement),
    ErrorObject(ErrorObjectRequirement),
}

impl Requirement {
    pub fn api(self) -> Api {
        match self {
            Requirement::NetworkStatus(_) => Api::NetworkStatus,
            Requirement::NetworkList(_) => Api::NetworkList,
            Requirement::NetworkOptions(_) => Api::NetworkOptions,
            Requirement::AccountBalance(_) => Api::AccountBalance,
            Requirement::AccountCoins(_) => Api::AccountCoins,
            Requirement::Block(_) => Api::Block,
            Requirement::ErrorObject(_) => Api::ErrorObject,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Requirement::NetworkStatus(r) => r.name(),
            Requirement::NetworkList(r) => r.name(),
            Requirement::NetworkOptions(r) => r.name(),
            Requirement::AccountBalance(r) => r.name(),
            Requirement::AccountCoins(r) => r.name(),
            Requirement::Block(r) => r.name(),
            Requirement::ErrorObject(r) => r.name(),
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Requirement {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Why a requirement failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Finding {
    pub requirement: Requirement,
    pub cause: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RequirementStatus {
    pub requirement: Requirement,
    pub status: Status,
}

/// In-progress validation state owned by one check.
#[derive(Debug)]
pub struct Validation<R: RequirementSet> {
    statuses: BTreeMap<R, Status>,
    findings: Vec<Finding>,
    skipped: Option<String>,
}

impl<R: RequirementSet> Validation<R> {
    /// Seed every requirement of the set with `success`.
    pub fn new() -> Self {
        Self {
            statuses: R::ALL.iter().map(|r| (*r, Status::Success)).collect(),
            findings: Vec::new(),
            skipped: None,
        }
    }

    pub fn status(&self, requirement: R) -> Status {
        self.statuses[&requirement]
    }

    /// Flip one requirement to `failure` and record the cause.
    pub fn set_failure(&mut self, requirement: R, cause: impl fmt::Display) {
        let cause = cause.to_string();
        tracing::error!(
            api = R::API.name(),
            requirement = requirement.name(),
            cause = %cause,
            "Requirement failed"
        );
        self.statuses.insert(requirement, Status::Failure);
        self.findings.push(Finding {
            requirement: requirement.into(),
            cause,
        });
    }

    /// Flip every requirement to `failure`. Used when the defining call errors.
    pub fn mark_all_failed(&mut self, cause: impl fmt::Display) {
        let cause = cause.to_string();
        tracing::error!(api = R::API.name(), cause = %cause, "All requirements failed");
        for (requirement, status) in self.statuses.iter_mut() {
            *status = Status::Failure;
            self.findings.push(Finding {
                requirement: (*requirement).into(),
                cause: cause.clone(),
            });
        }
    }

    /// Record that the endpoint was not exercised.
    pub fn skip(&mut self, reason: impl Into<String>) {
        let reason = reason.into();
        tracing::info!(api = R::API.name(), reason = %reason, "Endpoint skipped");
        self.skipped = Some(reason);
    }

    /// Freeze into a report.
    pub fn finish(self) -> EndpointReport {
        let validation: Vec<_> = self
            .statuses
            .into_iter()
            .map(|(requirement, status)| {
                metrics::record_requirement(R::API.name(), requirement.name(), status == Status::Success);
                RequirementStatus {
                    requirement: requirement.into(),
                    status,
                }
            })
            .collect();

        EndpointReport {
            api: R::API,
            validation,
            findings: self.findings,
            skipped: self.skipped,
        }
    }
}

impl<R: RequirementSet> Default for Validation<R> {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of one endpoint check.
#[derive(Debug, Clone, Serialize)]
pub struct EndpointReport {
    pub api: Api,
    pub validation: Vec<RequirementStatus>,
    pub findings: Vec<Finding>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl EndpointReport {
    pub fn status(&self, requirement: impl Into<Requirement>) -> Option<Status> {
        let requirement = requirement.into();
        self.validation
            .iter()
            .find(|entry| entry.requirement == requirement)
            .map(|entry| entry.status)
    }

    pub fn passed(&self) -> bool {
        self.validation.iter().all(|entry| entry.status == Status::Success)
    }

    pub fn findings_for(&self, requirement: impl Into<Requirement>) -> impl Iterator<Item = &Finding> {
        let requirement = requirement.into();
        self.findings.iter().filter(move |f| f.requirement == requirement)
    }
}

/// Ordered results of one run.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub network: NetworkIdentifier,
    pub endpoints: Vec<EndpointReport>,
}

impl RunReport {
    pub fn passed(&self) -> bool {
        self.endpoints.iter().all(EndpointReport::passed)
    }

    pub fn endpoint(&self, api: Api) -> Option<&EndpointReport> {
        self.endpoints.iter().find(|report| report.api == api)
    }

    /// Number of failed requirements across all endpoints.
    pub fn failure_count(&self) -> usize {
        self.endpoints
            .iter()
            .flat_map(|report| report.validation.iter())
            .filter(|entry| entry.status == Status::Failure)
            .count()
    }
}
