//! # Example: chained
//!
//! Running tasks back to back with [`Task::chain`], and composing steps with
//! [`if_else`] and [`serial`].
//!
//! ## Flow
//! ```text
//! extract.run()
//!     ├─► todo: read primary ─✗─► read mirror (if_else)
//!     └─► finally ─► transform.run()
//!                       ├─► then: serial[trim, upper]
//!                       └─► finally ─► load.run()
//! ```
//!
//! ## Run
//! ```bash
//! cargo run --example chained
//! ```

use std::sync::Arc;

use taskstage::{Context, Guarded, StepFn, StepRef, Task, TaskError, if_else, serial};

type Doc = Guarded<String>;

fn edit(f: fn(&str) -> String) -> StepRef<Doc> {
    StepFn::arc(move |s: Arc<Doc>, _ctx: Context| async move {
        s.update(|text| *text = f(text));
        Ok::<_, TaskError>(())
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let doc = Arc::new(Doc::default());

    // 1. Extract: the primary source is down, the mirror answers
    let extract = Task::from_shared(Arc::clone(&doc));
    extract.todo(if_else(
        |_s: Arc<Doc>, _ctx: Context| async { Err(TaskError::fail("primary unreachable")) },
        |s: Arc<Doc>, ctx: Context| async move {
            if let Some(err) = ctx.error() {
                println!("[extract] falling back to mirror: {err}");
            }
            s.update(|text| *text = "  hello from the mirror  ".to_string());
            Ok(())
        },
    ));

    // 2. Transform: two edits in a fixed order
    let transform = Task::from_shared(Arc::clone(&doc));
    transform.then(serial(vec![
        edit(|t| t.trim().to_string()),
        edit(|t| t.to_uppercase()),
    ]));

    // 3. Load: print the result
    let load = Task::from_shared(Arc::clone(&doc));
    load.then(|s: Arc<Doc>, _ctx: Context| async move {
        println!("[load] {:?}", s.get());
        Ok(())
    });

    // 4. extract -> transform -> load
    extract.chain(transform).chain(load);
    extract.run(&Context::new()).await?;
    Ok(())
}
