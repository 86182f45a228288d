//! # Event fan-out to subscribers.
//!
//! Provides [`SubscriberSet`], one listener task that receives events from a [`Bus`] and
//! hands each one to every subscriber.
//!
//! ## Architecture
//! ```text
//! Bus ──► listener ──► sub1.on_event()
//!            │    └──► sub2.on_event() ──► panic → SubscriberPanicked (on the bus)
//!            └──► shutdown token
//! ```
//!
//! ## Rules
//! - **Ordered**: subscribers see events in publish order, in registration order.
//! - **Lag**: when the listener falls behind the bus capacity, skipped events are lost.
//! - **Isolation**: a panicking subscriber is reported and the listener keeps going.
//!
//! **Warning**: `AssertUnwindSafe` is used, which can leave shared state inconsistent
//! if a subscriber uses `Arc<Mutex<T>>` and panics while holding the lock.

use std::sync::Arc;

use futures::FutureExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::events::{Bus, Event};
use crate::stages::panic::panic_message;
use crate::subscribers::Subscribe;

/// Running listener delivering bus events to a list of subscribers.
pub struct SubscriberSet {
    shutdown: CancellationToken,
    worker: JoinHandle<()>,
}

impl SubscriberSet {
    /// Subscribes to `bus` and spawns the listener task.
    ///
    /// Only events published after this call are delivered. Must be called within a
    /// tokio runtime.
    #[must_use]
    pub fn spawn(bus: &Bus, subs: Vec<Arc<dyn Subscribe>>) -> Self {
        let mut rx = bus.subscribe();
        let bus = bus.clone();
        let shutdown = CancellationToken::new();
        let stop = shutdown.clone();

        let worker = tokio::spawn(async move {
            loop {
                let ev = tokio::select! {
                    biased;
                    _ = stop.cancelled() => break,
                    received = rx.recv() => match received {
                        Ok(ev) => ev,
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                };
                deliver(&subs, &ev, &bus).await;
            }
        });

        Self { shutdown, worker }
    }

    /// Stops the listener and waits for it to finish the event in progress.
    ///
    /// Events still queued on the bus are not delivered.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        let _ = self.worker.await;
    }
}

async fn deliver(subs: &[Arc<dyn Subscribe>], ev: &Event, bus: &Bus) {
    for sub in subs {
        let fut = sub.on_event(ev);
        if let Err(panic_err) = std::panic::AssertUnwindSafe(fut).catch_unwind().await {
            // Do not report a failure to report a failure.
            if !ev.is_subscriber_panic() {
                bus.publish(Event::subscriber_panicked(
                    sub.name(),
                    panic_message(panic_err.as_ref()),
                ));
            }
        }
    }
}
