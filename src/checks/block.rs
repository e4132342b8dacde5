//! `/block` checks: idempotency by hash and default-to-tip.

use crate::checks::status::{BlockRequirement, EndpointReport, Status, Validation};
use crate::checks::CheckContext;
use crate::fetcher::types::{Block, PartialBlockIdentifier};

/// Fetches of the same block compared against the first one.
const IDEMPOTENCY_FETCHES: usize = 3;

/// Whether a block served for an empty identifier sits below a tip the node
/// already reported.
pub fn tip_regressed(served_index: i64, reported_tip: i64) -> bool {
    served_index < reported_tip
}

pub async fn block(ctx: &CheckContext<'_>) -> EndpointReport {
    let mut validation = Validation::<BlockRequirement>::new();
    let network = ctx.network();

    let status = match ctx.online.network_status(network).await {
        Ok(status) => status,
        Err(e) => {
            validation.mark_all_failed(format!("unable to get network status: {}", e));
            return validation.finish();
        }
    };
    let Some(tip) = status.current_block_identifier else {
        validation.mark_all_failed("network status has no current block identifier");
        return validation.finish();
    };

    let by_hash = PartialBlockIdentifier::with_hash(tip.hash);
    let mut first: Option<Block> = None;
    for attempt in 1..=IDEMPOTENCY_FETCHES {
        let block = match ctx.online.block(network, &by_hash).await {
            Ok(Some(block)) => block,
            Ok(None) => {
                validation.mark_all_failed(format!("node omitted block {}", by_hash));
                return validation.finish();
            }
            Err(e) => {
                validation.mark_all_failed(format!("unable to fetch block {}: {}", by_hash, e));
                return validation.finish();
            }
        };

        match &first {
            None => first = Some(block),
            Some(expected) if *expected != block => {
                if validation.status(BlockRequirement::Idempotent) == Status::Success {
                    validation.set_failure(
                        BlockRequirement::Idempotent,
                        format!("fetch {} of block {} differs from the first", attempt, by_hash),
                    );
                }
            }
            Some(_) => {}
        }
    }

    // The tip may only have moved forward since the first status call.
    let status = match ctx.online.network_status(network).await {
        Ok(status) => status,
        Err(e) => {
            validation.set_failure(
                BlockRequirement::DefaultTip,
                format!("unable to get network status: {}", e),
            );
            return validation.finish();
        }
    };
    let Some(tip) = status.current_block_identifier else {
        validation.set_failure(
            BlockRequirement::DefaultTip,
            "network status has no current block identifier",
        );
        return validation.finish();
    };

    let served = match ctx.online.block(network, &PartialBlockIdentifier::default()).await {
        Ok(Some(block)) => block,
        Ok(None) => {
            validation.set_failure(BlockRequirement::DefaultTip, "node omitted the tip block");
            return validation.finish();
        }
        Err(e) => {
            validation.set_failure(
                BlockRequirement::DefaultTip,
                format!("unable to fetch block with an empty identifier: {}", e),
            );
            return validation.finish();
        }
    };

    if tip_regressed(served.block_identifier.index, tip.index) {
        validation.set_failure(
            BlockRequirement::DefaultTip,
            format!(
                "block for an empty identifier has index {}, below the reported tip {}",
                served.block_identifier.index, tip.index
            ),
        );
    }

    validation.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::mock::{block_at, sweet, MockNode};
    use crate::config::CheckConfig;
    use crate::fetcher::types::{BlockIdentifier, FetchError, NetworkStatusResponse};
    use crate::lifecycle::ShutdownSignal;

    fn config() -> CheckConfig {
        CheckConfig {
            network: sweet(),
            ..CheckConfig::default()
        }
    }

    fn status_at(index: i64) -> NetworkStatusResponse {
        NetworkStatusResponse {
            current_block_identifier: Some(block_at(index).block_identifier),
            current_block_timestamp: Some(block_at(index).timestamp),
            genesis_block_identifier: Some(BlockIdentifier { index: 0, hash: "block-0".into() }),
            ..Default::default()
        }
    }

    async fn run(node: &MockNode) -> EndpointReport {
        let config = config();
        let ctx = CheckContext::new(node, node, &config, ShutdownSignal::never());
        block(&ctx).await
    }

    #[tokio::test]
    async fn test_stable_node_passes() {
        let node = MockNode::with_chain(5);
        let report = run(&node).await;

        assert!(report.passed(), "{:?}", report.findings);
        let by_hash = node.calls().iter().filter(|c| *c == "block hash block-4").count();
        assert_eq!(by_hash, 3);
        assert!(node.calls().contains(&"block tip".to_string()));
    }

    #[tokio::test]
    async fn test_changing_block_fails_idempotency_once() {
        let node = MockNode::with_chain(5);
        node.push_hash_response(Ok(Some(block_at(4))));
        let mut changed = block_at(4);
        changed.timestamp += 1;
        node.push_hash_response(Ok(Some(changed)));

        let report = run(&node).await;

        assert_eq!(report.status(BlockRequirement::Idempotent), Some(Status::Failure));
        assert_eq!(report.findings_for(BlockRequirement::Idempotent).count(), 1);
        assert_eq!(report.status(BlockRequirement::DefaultTip), Some(Status::Success));
    }

    #[tokio::test]
    async fn test_fetch_error_fails_everything() {
        let node = MockNode::with_chain(5);
        node.push_hash_response(Err(FetchError::Timeout));

        let report = run(&node).await;
        assert_eq!(report.status(BlockRequirement::Idempotent), Some(Status::Failure));
        assert_eq!(report.status(BlockRequirement::DefaultTip), Some(Status::Failure));
    }

    #[tokio::test]
    async fn test_omitted_block_fails_everything() {
        let node = MockNode::with_chain(5);
        node.push_hash_response(Ok(None));

        let report = run(&node).await;
        assert!(report.validation.iter().all(|e| e.status == Status::Failure));
    }

    #[tokio::test]
    async fn test_tip_behind_reported_status_fails_default_tip() {
        let mut node = MockNode::with_chain(5);
        node.push_status(Ok(status_at(4)));
        node.push_status(Ok(status_at(4)));
        node.tip_block = Some(Ok(Some(block_at(3))));

        let report = run(&node).await;

        assert_eq!(report.status(BlockRequirement::Idempotent), Some(Status::Success));
        assert_eq!(report.status(BlockRequirement::DefaultTip), Some(Status::Failure));
    }

    #[tokio::test]
    async fn test_tip_ahead_of_status_passes() {
        let mut node = MockNode::with_chain(5);
        node.tip_block = Some(Ok(Some(block_at(9))));

        let report = run(&node).await;
        assert!(report.passed());
    }

    #[tokio::test]
    async fn test_second_status_error_fails_default_tip_only() {
        let node = MockNode::with_chain(5);
        node.push_status(Ok(status_at(4)));
        node.push_status(Err(FetchError::Transport("reset".into())));

        let report = run(&node).await;
        assert_eq!(report.status(BlockRequirement::Idempotent), Some(Status::Success));
        assert_eq!(report.status(BlockRequirement::DefaultTip), Some(Status::Failure));
    }

    #[test]
    fn test_tip_regressed_is_strict() {
        for tip in [0, 5, 1_000] {
            assert!(!tip_regressed(tip, tip));
            assert!(!tip_regressed(tip + 1, tip));
        }
        assert!(tip_regressed(4, 5));
    }
}
