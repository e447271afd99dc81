//! Background weather lookups
//!
//! Network lookups run on spawned tokio tasks and report back over a channel.
//! Tasks never write to the cache: the owning context receives each
//! `FetchMessage` and applies it through `WeatherService::apply`, so the cache
//! has a single writer.

use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::FutureExt;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::data::{ProviderError, WeatherProvider, WeatherSnapshot};

/// Channel capacity for completed lookups
const CHANNEL_CAPACITY: usize = 32;

/// Result of one background lookup
#[derive(Debug)]
pub struct FetchMessage {
    /// City exactly as requested
    pub city: String,
    /// When the lookup was started
    pub requested_at: DateTime<Utc>,
    pub result: Result<WeatherSnapshot, ProviderError>,
}

/// Spawns lookups and collects their results
///
/// Lookups are neither deduplicated nor cancellable: searching the same city
/// twice runs two tasks, and both results are delivered in completion order.
#[derive(Debug)]
pub struct FetchWorker {
    sender: mpsc::Sender<FetchMessage>,
    receiver: mpsc::Receiver<FetchMessage>,
    in_flight: usize,
}

impl Default for FetchWorker {
    fn default() -> Self {
        Self::new()
    }
}

impl FetchWorker {
    pub fn new() -> Self {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            receiver,
            in_flight: 0,
        }
    }

    /// Starts a lookup for `city` on a background task
    ///
    /// Must be called from within a tokio runtime. A lookup that panics is
    /// reported as `ProviderError::TaskFailed`, so every spawn yields exactly
    /// one message.
    pub fn spawn<P: WeatherProvider>(&mut self, provider: Arc<P>, city: &str, now: DateTime<Utc>) {
        let tx = self.sender.clone();
        let city = city.to_string();
        self.in_flight += 1;
        debug!(city = %city, "spawning weather lookup");

        tokio::spawn(async move {
            let result = match AssertUnwindSafe(provider.lookup(&city, now))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(payload) => {
                    let reason = panic_message(payload.as_ref());
                    warn!(city = %city, reason = %reason, "weather lookup panicked");
                    Err(ProviderError::TaskFailed(reason))
                }
            };
            let _ = tx
                .send(FetchMessage {
                    city,
                    requested_at: now,
                    result,
                })
                .await;
        });
    }

    /// Number of lookups started but not yet received
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Returns a completed lookup without blocking, if one is ready
    pub fn try_recv(&mut self) -> Option<FetchMessage> {
        let message = self.receiver.try_recv().ok()?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(message)
    }

    /// Waits for the next completed lookup
    ///
    /// Returns `None` immediately when nothing is in flight.
    pub async fn recv(&mut self) -> Option<FetchMessage> {
        if self.in_flight == 0 {
            return None;
        }
        let message = self.receiver.recv().await?;
        self.in_flight = self.in_flight.saturating_sub(1);
        Some(message)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
