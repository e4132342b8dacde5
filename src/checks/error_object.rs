//! Error object checks.
//!
//! Sends a request with empty identifiers to each endpoint. A conforming node
//! rejects every one of them with an error object carrying a non-negative
//! code and a non-empty message.

use crate::checks::status::{EndpointReport, ErrorObjectRequirement, Validation};
use crate::checks::validators::{validate_error_code, validate_error_message};
use crate::checks::CheckContext;
use crate::fetcher::types::{
    AccountIdentifier, BlockIdentifier, FetchResult, NetworkIdentifier, PartialBlockIdentifier,
    TransactionIdentifier,
};

pub async fn error_object(ctx: &CheckContext<'_>) -> EndpointReport {
    let mut validation = Validation::<ErrorObjectRequirement>::new();
    let online = ctx.online;
    let network = NetworkIdentifier::default();
    let account = AccountIdentifier::default();

    let result = online.network_status(&network).await.map(|_| ());
    inspect("/network/status", result, &mut validation);

    let result = online.network_options(&network).await.map(|_| ());
    inspect("/network/options", result, &mut validation);

    let result = online.account_balance(&network, &account, None, &[]).await.map(|_| ());
    inspect("/account/balance", result, &mut validation);

    if ctx.config.is_utxo() {
        let result = online.account_coins(&network, &account, false, &[]).await.map(|_| ());
        inspect("/account/coins", result, &mut validation);
    } else {
        tracing::info!(endpoint = "/account/coins", "Skipping error check for account based chain");
    }

    let result = online
        .block(&network, &PartialBlockIdentifier::default())
        .await
        .map(|_| ());
    inspect("/block", result, &mut validation);

    let result = online
        .transactions(&network, &BlockIdentifier::default(), &[TransactionIdentifier::default()])
        .await
        .map(|_| ());
    inspect("/block/transaction", result, &mut validation);

    validation.finish()
}

/// Validate the error object returned for one invalid request.
fn inspect(
    endpoint: &'static str,
    result: FetchResult<()>,
    validation: &mut Validation<ErrorObjectRequirement>,
) {
    let error = match result {
        Ok(()) => {
            tracing::warn!(endpoint, "Node accepted a request with an empty network identifier");
            return;
        }
        Err(e) => e,
    };

    match error.api_error() {
        Some(api) => {
            if let Err(e) = validate_error_code(api) {
                validation.set_failure(ErrorObjectRequirement::ErrorCode, format!("{}: {}", endpoint, e));
            }
            if let Err(e) = validate_error_message(api) {
                validation.set_failure(
                    ErrorObjectRequirement::ErrorMessage,
                    format!("{}: {}", endpoint, e),
                );
            }
        }
        None => {
            let cause = format!("{}: no error object in response ({})", endpoint, error);
            validation.set_failure(ErrorObjectRequirement::ErrorCode, &cause);
            validation.set_failure(ErrorObjectRequirement::ErrorMessage, cause);
        }
    }
}
