//! Browser timer backed by `setTimeout`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use gloo_timers::future::TimeoutFuture;

use synapse_core::ports::TimerPort;

#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl TimerPort for BrowserTimer {
    async fn sleep(&self, ms: u64) {
        TimeoutFuture::new(u32::try_from(ms).unwrap_or(u32::MAX)).await;
    }

    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
