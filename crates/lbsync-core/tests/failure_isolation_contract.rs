//! Contract Test: Failure Isolation
//!
//! Constraints verified:
//! - A failing domain does not stop the remaining domains of its tracker
//! - A missing credential fails the update without sending anything
//! - A load balancer that never resolves does not hold up other trackers
//! - Trackers keep running after failures and stop only when aborted
//!
//! If this test fails, one broken name or server can freeze synchronization
//! for unrelated domains.

mod common;

use common::*;
use lbsync_core::{DomainOutcome, SyncCoordinator};
use std::sync::Arc;
use std::time::Duration;

const REMOTE: &str = "192.0.2.53:53";
const LB: &str = "lb.example.net";

#[tokio::test(start_paused = true)]
async fn failing_domain_does_not_block_siblings() {
    let exchange = ScriptedExchange::new();
    exchange.answer(REMOTE, LB, a_response(LB, 60, &[[1, 2, 3, 4]]));
    exchange.answer(LOCAL, "a.example.com", empty_response());
    exchange.reply(LOCAL, "b.example.com", Reply::Fail);
    exchange.answer(LOCAL, "c.example.com", empty_response());

    let transport = RecordingTransport::new();
    let ctx = context(
        config(
            &[REMOTE],
            &[
                ("a.example.com", "example.com", LB),
                ("b.example.com", "example.com", LB),
                ("c.example.com", "example.com", LB),
            ],
        ),
        &exchange,
        &transport,
        &StaticCredentials::valid(),
    );
    let tracker = ctx.tracker(ctx.load_balancers()[0].clone()).unwrap();

    let report = tracker.run_cycle().await;

    assert_eq!(report.domains[0].1, DomainOutcome::Updated);
    assert!(matches!(report.domains[1].1, DomainOutcome::Failed(_)));
    assert_eq!(report.domains[2].1, DomainOutcome::Updated);

    assert_eq!(transport.sent_for("a.example.com").len(), 1);
    assert!(transport.sent_for("b.example.com").is_empty());
    assert_eq!(transport.sent_for("c.example.com").len(), 1);
    assert_eq!(report.next_interval, Duration::from_secs(61));
}

#[tokio::test(start_paused = true)]
async fn missing_credential_fails_without_sending() {
    let exchange = ScriptedExchange::new();
    exchange.answer(REMOTE, LB, a_response(LB, 60, &[[1, 2, 3, 4]]));
    exchange.answer(LOCAL, "a.example.com", empty_response());
    exchange.answer(LOCAL, "b.example.com", empty_response());

    let transport = RecordingTransport::new();
    let credentials = StaticCredentials::missing();
    let ctx = context(
        config(
            &[REMOTE],
            &[
                ("a.example.com", "example.com", LB),
                ("b.example.com", "example.com", LB),
            ],
        ),
        &exchange,
        &transport,
        &credentials,
    );
    let tracker = ctx.tracker(ctx.load_balancers()[0].clone()).unwrap();

    let report = tracker.run_cycle().await;

    assert!(
        report
            .domains
            .iter()
            .all(|(_, outcome)| matches!(outcome, DomainOutcome::Failed(_)))
    );
    // Reloaded for every update attempt
    assert_eq!(credentials.load_count(), 2);
    assert!(transport.sent().is_empty());
    assert_eq!(report.next_interval, Duration::from_secs(61));
}

#[tokio::test(start_paused = true)]
async fn unresolvable_load_balancer_does_not_hold_up_others() {
    let exchange = ScriptedExchange::new();
    exchange.reply(REMOTE, "down.example.net", Reply::Timeout);
    exchange.answer(REMOTE, "up.example.net", a_response("up.example.net", 60, &[[1, 2, 3, 4]]));
    exchange.answer(LOCAL, "www.example.com", empty_response());
    exchange.answer(LOCAL, "api.example.com", empty_response());

    let transport = RecordingTransport::new();
    let ctx = Arc::new(context(
        config(
            &[REMOTE],
            &[
                ("status.example.com", "example.com", "down.example.net"),
                ("www.example.com", "example.com", "up.example.net"),
                ("api.example.com", "example.com", "up.example.net"),
            ],
        ),
        &exchange,
        &transport,
        &StaticCredentials::valid(),
    ));

    let mut coordinator = SyncCoordinator::new(Arc::clone(&ctx));
    assert_eq!(coordinator.start().unwrap(), 2);
    assert_eq!(coordinator.tracked(), vec!["down.example.net", "up.example.net"]);

    tokio::time::sleep(Duration::from_secs(1)).await;

    assert_eq!(transport.sent_for("www.example.com").len(), 1);
    assert_eq!(transport.sent_for("api.example.com").len(), 1);
    assert!(transport.sent_for("status.example.com").is_empty());
    assert!(coordinator.is_running("down.example.net"));
    assert!(coordinator.is_running("up.example.net"));

    // Starting again does not duplicate trackers
    assert_eq!(coordinator.start().unwrap(), 0);

    coordinator.abort_all();
    assert!(coordinator.tracked().is_empty());
    assert!(!coordinator.is_running("up.example.net"));
}

#[tokio::test(start_paused = true)]
async fn tracker_retries_after_failure_interval() {
    let exchange = ScriptedExchange::new();
    exchange.reply(REMOTE, LB, Reply::Fail);

    let transport = RecordingTransport::new();
    let ctx = Arc::new(context(
        config(&[REMOTE], &[("www.example.com", "example.com", LB)]),
        &exchange,
        &transport,
        &StaticCredentials::valid(),
    ));
    let mut coordinator = SyncCoordinator::new(Arc::clone(&ctx));
    coordinator.start().unwrap();

    // First cycle: query, 5s backoff, then 30s until the next cycle
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(exchange.names_queried_on(REMOTE).len(), 1);

    // The remote recovers before the second cycle
    exchange.answer(REMOTE, LB, a_response(LB, 60, &[[1, 2, 3, 4]]));
    exchange.answer(LOCAL, "www.example.com", empty_response());

    tokio::time::sleep(Duration::from_secs(40)).await;
    assert_eq!(exchange.names_queried_on(REMOTE).len(), 2);
    assert_eq!(transport.sent_for("www.example.com").len(), 1);
    assert!(coordinator.is_running(LB));

    coordinator.abort_all();
}
