//! # Example: basic_run
//!
//! One task, all four stages.
//!
//! Demonstrates how to:
//! - Register parallel `todo` steps on a shared state.
//! - Check their combined effect in a `then` step.
//! - Clean up in `finally` and observe failures in `on_error`.
//!
//! ## Flow
//! ```text
//! Task::run()
//!     ├─► todo: fetch "a" ║ fetch "b" ║ fetch "c"
//!     ├─► then: verify three pages
//!     ├─► finally: print summary
//!     └─► second run: fetch "missing" fails ─► on_error
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example basic_run
//! ```

use std::sync::Arc;
use std::time::Duration;

use taskstage::{Context, Guarded, Task, TaskError};

#[derive(Default)]
struct Crawl {
    pages: Guarded<Vec<String>>,
}

async fn fetch(crawl: Arc<Crawl>, ctx: Context, page: &'static str) -> Result<(), TaskError> {
    tokio::select! {
        _ = ctx.cancelled() => return Err(TaskError::Canceled),
        _ = tokio::time::sleep(Duration::from_millis(100)) => {}
    }
    if page == "missing" {
        return Err(TaskError::fail(format!("page {page:?} not found")));
    }
    crawl.pages.update(|p| p.push(page.to_string()));
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Build the task over a default state
    let task = Task::<Crawl>::new();

    // 2. Three fetches run concurrently
    for page in ["a", "b", "c"] {
        task.todo(move |s: Arc<Crawl>, ctx: Context| fetch(s, ctx, page));
    }

    // 3. Sequential follow-up, cleanup and error hooks
    task.then(|s: Arc<Crawl>, _ctx: Context| async move {
        let n = s.pages.lock().len();
        println!("[then] fetched {n} pages");
        if n == 3 {
            Ok(())
        } else {
            Err(TaskError::fail(format!("expected 3 pages, got {n}")))
        }
    })
    .finally(|s: Arc<Crawl>, _ctx: Context| async move {
        println!("[finally] pages so far: {:?}", s.pages.get());
        Ok(())
    })
    .on_error(|_s: Arc<Crawl>, _ctx: Context, err: TaskError| async move {
        println!("[on_error] {err}");
    });

    // 4. Run: everything succeeds
    task.run(&Context::new()).await?;

    // 5. Add a failing fetch and run again
    task.todo(|s: Arc<Crawl>, ctx: Context| fetch(s, ctx, "missing"));
    if let Err(err) = task.run(&Context::new()).await {
        println!("[main] second run failed: {err} ({})", err.as_label());
    }

    // Leftover fetches of the second run may still be running.
    task.join_detached().await;
    Ok(())
}
