#![allow(dead_code)]

pub mod builders;
pub mod mock_provider;
pub mod strategies;

pub use builders::*;
pub use mock_provider::*;

use std::time::Duration;

/// Poll `condition` until it holds or `timeout` elapses
pub async fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
