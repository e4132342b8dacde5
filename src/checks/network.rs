//! `/network/status`, `/network/list` and `/network/options` checks.

use crate::checks::status::{
    EndpointReport, NetworkListRequirement, NetworkOptionsRequirement, NetworkStatusRequirement,
    Validation,
};
use crate::checks::validators::{
    validate_allow, validate_block_identifier, validate_network_identifier, validate_timestamp,
    validate_versions,
};
use crate::checks::CheckContext;
use crate::fetcher::types::NetworkIdentifier;

/// Validate the required fields of `/network/status` (online).
pub async fn network_status(ctx: &CheckContext<'_>) -> EndpointReport {
    let mut validation = Validation::<NetworkStatusRequirement>::new();

    let status = match ctx.online.network_status(ctx.network()).await {
        Ok(status) => status,
        Err(e) => {
            validation.mark_all_failed(format!("unable to fetch network status: {}", e));
            return validation.finish();
        }
    };

    if let Err(e) = validate_block_identifier(status.current_block_identifier.as_ref()) {
        validation.set_failure(
            NetworkStatusRequirement::CurrentBlockId,
            format!("current_block_identifier: {}", e),
        );
    }
    if let Err(e) = validate_timestamp(status.current_block_timestamp) {
        validation.set_failure(
            NetworkStatusRequirement::CurrentBlockTime,
            format!("current_block_timestamp: {}", e),
        );
    }
    if let Err(e) = validate_block_identifier(status.genesis_block_identifier.as_ref()) {
        validation.set_failure(
            NetworkStatusRequirement::GenesisBlockId,
            format!("genesis_block_identifier: {}", e),
        );
    }

    validation.finish()
}

/// Validate `/network/list` (offline) and look for the configured network.
pub async fn network_list(ctx: &CheckContext<'_>) -> EndpointReport {
    let mut validation = Validation::<NetworkListRequirement>::new();

    let networks = match ctx.offline.network_list().await {
        Ok(response) => response.network_identifiers,
        Err(e) => {
            validation.mark_all_failed(format!("unable to fetch network list: {}", e));
            return validation.finish();
        }
    };

    if networks.is_empty() {
        validation.set_failure(
            NetworkListRequirement::NetworkIds,
            "network_identifiers is required",
        );
    }
    for network in &networks {
        if let Err(e) = validate_network_identifier(network) {
            validation.set_failure(NetworkListRequirement::NetworkIds, e);
        }
    }

    if !contains_network(&networks, ctx.network()) {
        validation.set_failure(
            NetworkListRequirement::StaticNetworkId,
            format!(
                "configured network {}/{} is not returned by /network/list",
                ctx.network().blockchain,
                ctx.network().network
            ),
        );
    }

    validation.finish()
}

/// Exact, case-sensitive match on blockchain and network.
pub fn contains_network(networks: &[NetworkIdentifier], wanted: &NetworkIdentifier) -> bool {
    networks
        .iter()
        .any(|n| n.blockchain == wanted.blockchain && n.network == wanted.network)
}

/// Validate `/network/options` (offline).
pub async fn network_options(ctx: &CheckContext<'_>) -> EndpointReport {
    let mut validation = Validation::<NetworkOptionsRequirement>::new();

    let options = match ctx.offline.network_options(ctx.network()).await {
        Ok(options) => options,
        Err(e) => {
            validation.mark_all_failed(format!("unable to fetch network options: {}", e));
            return validation.finish();
        }
    };

    if let Err(e) = validate_versions(options.version.as_ref()) {
        validation.set_failure(NetworkOptionsRequirement::Version, e);
    }
    if let Err(errors) = validate_allow(options.allow.as_ref()) {
        for e in errors {
            validation.set_failure(NetworkOptionsRequirement::Allow, e);
        }
    }

    validation.finish()
}
