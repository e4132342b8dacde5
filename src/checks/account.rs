//! `/account/balance` and `/account/coins` checks.
//!
//! Both run against an account found on chain by [`discover_account`]. When
//! discovery comes back empty there is nothing to query, so every requirement
//! of the endpoint fails with the discovery outcome as the cause.

use crate::checks::discovery::{discover_account, Fixture};
use crate::checks::status::{
    AccountBalanceRequirement, AccountCoinsRequirement, EndpointReport, RequirementSet, Validation,
};
use crate::checks::validators::{
    validate_account_identifier, validate_balances, validate_block_identifier, validate_coins,
};
use crate::checks::CheckContext;

/// Discover a fixture or fail every requirement of `validation`.
async fn fixture<R: RequirementSet>(
    ctx: &CheckContext<'_>,
    validation: &mut Validation<R>,
) -> Option<Fixture> {
    let discovery = match discover_account(ctx.online, ctx.network(), ctx.max_blocks(), &ctx.signal).await {
        Ok(discovery) => discovery,
        Err(e) => {
            validation.mark_all_failed(format!("unable to get an account: {}", e));
            return None;
        }
    };

    let fixture = match discovery.into_fixture() {
        Ok(fixture) => fixture,
        Err(reason) => {
            validation.mark_all_failed(reason);
            return None;
        }
    };

    if let Err(e) = validate_account_identifier(Some(&fixture.account)) {
        validation.mark_all_failed(format!("discovered account {} is invalid: {}", fixture.account, e));
        return None;
    }

    Some(fixture)
}

/// Query the balance of a discovered account at the block it was seen in.
pub async fn account_balance(ctx: &CheckContext<'_>) -> EndpointReport {
    let mut validation = Validation::<AccountBalanceRequirement>::new();

    let Some(fixture) = fixture(ctx, &mut validation).await else {
        return validation.finish();
    };

    let response = match ctx
        .online
        .account_balance(ctx.network(), &fixture.account, Some(&fixture.block), &fixture.currencies)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            validation.mark_all_failed(format!(
                "unable to fetch balance for account {} at {}: {}",
                fixture.account, fixture.block, e
            ));
            return validation.finish();
        }
    };

    if let Err(e) = validate_block_identifier(response.block_identifier.as_ref()) {
        validation.set_failure(
            AccountBalanceRequirement::BlockId,
            format!("block_identifier: {}", e),
        );
    }
    if let Err(e) = validate_balances(&response.balances) {
        validation.set_failure(AccountBalanceRequirement::Balances, format!("balances: {}", e));
    }

    validation.finish()
}

/// Query the unspent coins of a discovered account. UTXO chains only.
pub async fn account_coins(ctx: &CheckContext<'_>) -> EndpointReport {
    let mut validation = Validation::<AccountCoinsRequirement>::new();

    if !ctx.config.is_utxo() {
        validation.skip("account based chain, /account/coins is not served");
        return validation.finish();
    }

    let Some(fixture) = fixture(ctx, &mut validation).await else {
        return validation.finish();
    };

    let response = match ctx
        .online
        .account_coins(ctx.network(), &fixture.account, false, &fixture.currencies)
        .await
    {
        Ok(response) => response,
        Err(e) => {
            validation.mark_all_failed(format!(
                "unable to fetch coins for account {}: {}",
                fixture.account, e
            ));
            return validation.finish();
        }
    };

    if let Err(e) = validate_block_identifier(response.block_identifier.as_ref()) {
        validation.set_failure(AccountCoinsRequirement::BlockId, format!("block_identifier: {}", e));
    }
    if let Err(e) = validate_coins(&response.coins) {
        validation.set_failure(AccountCoinsRequirement::Coins, format!("coins: {}", e));
    }

    validation.finish()
}
