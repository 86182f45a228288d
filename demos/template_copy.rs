//! # Example: template_copy
//!
//! Reusing one set of hooks for many states with [`Task::copy_for`].
//!
//! Demonstrates how to:
//! - Build a template task once.
//! - Derive one task per input and run them concurrently.
//! - Add a hook to a single copy without touching the template.
//!
//! ## Run
//! ```bash
//! cargo run --example template_copy
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use taskstage::{Config, Context, Task, TaskError};

struct Sum {
    input: Vec<u64>,
    total: AtomicU64,
}

impl Sum {
    fn of(input: Vec<u64>) -> Self {
        Self {
            input,
            total: AtomicU64::new(0),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 1. Template: sum the input, reject empty inputs
    let template = Task::with_config(Sum::of(Vec::new()), Config::named("sum"));
    template
        .todo(|s: Arc<Sum>, _ctx: Context| async move {
            s.total.store(s.input.iter().sum(), Ordering::SeqCst);
            Ok(())
        })
        .then(|s: Arc<Sum>, _ctx: Context| async move {
            if s.input.is_empty() {
                return Err(TaskError::fail("empty input"));
            }
            Ok(())
        });

    // 2. One copy per input
    let inputs = vec![vec![1, 2, 3], vec![10, 20], vec![]];
    let copies: Vec<_> = inputs
        .into_iter()
        .map(|input| template.copy_for(Sum::of(input)))
        .collect();

    // 3. Only the first copy reports its total
    copies[0].finally(|s: Arc<Sum>, _ctx: Context| async move {
        println!("[finally] first copy total = {}", s.total.load(Ordering::SeqCst));
        Ok(())
    });

    // 4. Run all copies under one shared context
    let ctx = Context::new();
    let results = futures::future::join_all(copies.iter().map(|t| t.run(&ctx))).await;

    for (task, res) in copies.iter().zip(results) {
        let total = task.state().total.load(Ordering::SeqCst);
        match res {
            Ok(()) => println!("[main] {:?} -> {total}", task.state().input),
            Err(err) => println!("[main] {:?} failed: {err}", task.state().input),
        }
    }
    Ok(())
}
