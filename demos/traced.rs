//! # Example: traced
//!
//! Engine diagnostics through `tracing`.
//!
//! ## Run
//! Requires the `tracing` feature.
//! ```bash
//! RUST_LOG=taskstage=trace cargo run --example traced --features tracing
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use taskstage::{Config, Context, Task, TaskError};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "debug".into()))
        .init();

    let task = Task::with_config(AtomicU32::new(0), Config::named("traced"));
    for delay in [10, 20, 500] {
        task.todo(move |s: Arc<AtomicU32>, ctx: Context| async move {
            tokio::select! {
                _ = ctx.cancelled() => return Ok(()),
                _ = tokio::time::sleep(Duration::from_millis(delay)) => {}
            }
            if delay > 100 {
                return Err(TaskError::fail("too slow"));
            }
            s.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
    }

    // Cancel the whole run before the slow unit finishes.
    let ctx = Context::new();
    let canceler = ctx.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceler.cancel();
    });

    task.run(&ctx).await?;
    task.join_detached().await;
    tracing::info!(done = task.state().load(Ordering::SeqCst), "finished");
    Ok(())
}
