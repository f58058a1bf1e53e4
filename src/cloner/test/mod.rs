use std::sync::Arc;
use std::time::Duration;

use crate::cloner::connection::{ConnectionManager, ReconnectPolicy};
use crate::cloner::orchestrator::{CloneOptions, CloneSettings, ServerCloner};
use crate::cloner::progress::ProgressReporter;
use crate::cloner::retry::RetryPolicy;
use crate::testing::mock::{MockConnector, MockImageSource, MockState, RecordingSink};

mod clone_roles;
mod retry;

const SOURCE: u64 = 100;
const TARGET: u64 = 200;

/// Zero-delay settings so phase tests complete instantly.
fn fast_settings() -> CloneSettings {
    CloneSettings {
        operation_delay: Duration::ZERO,
        emoji_delay: Duration::ZERO,
        retry: RetryPolicy {
            max_attempts: 3,
            backoff: Duration::ZERO,
            auto_reconnect: true,
        },
    }
}

/// Reconnect policy with no cooldown, for tests that exercise reconnection.
fn fast_reconnect_policy() -> ReconnectPolicy {
    ReconnectPolicy {
        cooldown: Duration::ZERO,
        ..ReconnectPolicy::default()
    }
}

async fn connect(state: &Arc<MockState>) -> Arc<ConnectionManager<MockConnector>> {
    ConnectionManager::connect(
        MockConnector {
            state: Arc::clone(state),
        },
        "token".to_string(),
        fast_reconnect_policy(),
    )
    .await
    .unwrap()
}

/// Builds a cloner over the mock platform, returning the recording sink and
/// image source alongside it for assertions.
async fn cloner_with(
    state: &Arc<MockState>,
) -> (
    ServerCloner<MockConnector>,
    Arc<RecordingSink>,
    Arc<MockImageSource>,
) {
    let connection = connect(state).await;
    let sink = Arc::new(RecordingSink::default());
    let images = Arc::new(MockImageSource::default());
    let reporter = ProgressReporter::new().with_sink(sink.clone());

    let cloner = ServerCloner::new(connection, images.clone(), reporter, fast_settings());
    (cloner, sink, images)
}
