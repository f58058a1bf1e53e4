use std::sync::atomic::{AtomicU32, Ordering};

use super::*;
use crate::cloner::retry::Retrier;
use crate::cloner::stats::CloneStats;
use crate::platform::error::PlatformError;
use tokio::time::Instant;

fn retrier_with(
    connection: &Arc<crate::cloner::connection::ConnectionManager<MockConnector>>,
    stats: &Arc<CloneStats>,
) -> Retrier<MockConnector> {
    Retrier::new(
        Arc::clone(connection),
        Arc::clone(stats),
        RetryPolicy {
            max_attempts: 3,
            backoff: Duration::from_secs(1),
            auto_reconnect: true,
        },
    )
}

/// Tests the recovery path: two transient failures, then success.
///
/// Expected: the success value comes back after exactly three attempts, with
/// one reconnect (triggered after the second attempt) and two sleeps of
/// increasing duration (1s then 2s).
#[tokio::test(start_paused = true)]
async fn recovers_after_transient_failures() {
    let state = MockState::new();
    let connection = connect(&state).await;
    let stats = Arc::new(CloneStats::new());
    let retrier = retrier_with(&connection, &stats);

    let calls = AtomicU32::new(0);
    let start = Instant::now();

    let result = retrier
        .execute("test operation", || async {
            if calls.fetch_add(1, Ordering::AcqRel) < 2 {
                Err(PlatformError::RateLimited)
            } else {
                Ok(42)
            }
        })
        .await;

    assert_eq!(result.unwrap(), 42);
    assert_eq!(calls.load(Ordering::Acquire), 3);
    assert_eq!(start.elapsed(), Duration::from_secs(3));
    assert_eq!(state.connects.load(Ordering::Acquire), 2);
    assert_eq!(stats.snapshot().reconnects, 1);
}

/// Tests that a fatal error propagates from the first attempt with zero
/// sleeps and zero reconnect triggers.
#[tokio::test(start_paused = true)]
async fn fatal_error_propagates_immediately() {
    let state = MockState::new();
    let connection = connect(&state).await;
    let stats = Arc::new(CloneStats::new());
    let retrier = retrier_with(&connection, &stats);

    let calls = AtomicU32::new(0);
    let start = Instant::now();

    let result: Result<u64, _> = retrier
        .execute("test operation", || async {
            calls.fetch_add(1, Ordering::AcqRel);
            Err(PlatformError::Forbidden)
        })
        .await;

    assert!(matches!(result, Err(PlatformError::Forbidden)));
    assert_eq!(calls.load(Ordering::Acquire), 1);
    assert_eq!(start.elapsed(), Duration::ZERO);
    assert_eq!(state.connects.load(Ordering::Acquire), 1);
    assert_eq!(stats.snapshot().reconnects, 0);
}

/// Tests exhaustion: three transient failures propagate the last error,
/// having reconnected exactly once along the way.
#[tokio::test(start_paused = true)]
async fn exhaustion_propagates_the_last_error() {
    let state = MockState::new();
    let connection = connect(&state).await;
    let stats = Arc::new(CloneStats::new());
    let retrier = retrier_with(&connection, &stats);

    let calls = AtomicU32::new(0);

    let result: Result<u64, _> = retrier
        .execute("test operation", || async {
            calls.fetch_add(1, Ordering::AcqRel);
            Err(PlatformError::Timeout)
        })
        .await;

    assert!(matches!(result, Err(PlatformError::Timeout)));
    assert_eq!(calls.load(Ordering::Acquire), 3);
    assert_eq!(state.connects.load(Ordering::Acquire), 2);
    assert_eq!(stats.snapshot().reconnects, 1);
}

/// Tests that the reconnect stat is bumped even when the reconnect itself
/// fails; the retry loop keeps going against whatever session is live.
#[tokio::test(start_paused = true)]
async fn reconnect_failure_does_not_stop_retries() {
    let state = MockState::new();
    let connection = connect(&state).await;
    let stats = Arc::new(CloneStats::new());
    let retrier = retrier_with(&connection, &stats);
    state.fail_connect(PlatformError::Unauthorized);

    let calls = AtomicU32::new(0);

    let result = retrier
        .execute("test operation", || async {
            if calls.fetch_add(1, Ordering::AcqRel) < 2 {
                Err(PlatformError::ConnectionReset)
            } else {
                Ok("done")
            }
        })
        .await;

    assert_eq!(result.unwrap(), "done");
    // The reconnect was attempted and failed; only the original login ever
    // succeeded, but the stat still counts the trigger.
    assert_eq!(state.connects.load(Ordering::Acquire), 1);
    assert_eq!(stats.snapshot().reconnects, 1);
    assert_eq!(connection.reconnect_attempts(), 1);
}
