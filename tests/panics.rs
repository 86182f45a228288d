use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::Mutex;
use taskstage::{Context, Task, TaskError};

#[derive(Default)]
struct Counters {
    finally: AtomicU32,
    errors: AtomicU32,
    seen: Mutex<Vec<TaskError>>,
    cleanup_saw: Mutex<Vec<Option<TaskError>>>,
}

fn explode(msg: &str) -> Result<(), TaskError> {
    std::panic::panic_any(TaskError::fail(msg))
}

fn counted(task: &Task<Counters>) {
    task.finally(|s: Arc<Counters>, _ctx: Context| async move {
        s.finally.fetch_add(1, Ordering::SeqCst);
        Ok(())
    })
    .on_error(|s: Arc<Counters>, _ctx: Context, err: TaskError| async move {
        s.errors.fetch_add(1, Ordering::SeqCst);
        s.seen.lock().push(err);
    });
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_error_panic_in_parallel_step_is_recovered() {
    let task = Task::<Counters>::new();
    task.todo(|_s: Arc<Counters>, _ctx: Context| async { explode("bad input") });
    counted(&task);

    assert!(task.run(&Context::new()).await.is_ok());
    let s = task.state();
    assert_eq!(s.finally.load(Ordering::SeqCst), 1);
    assert_eq!(*s.seen.lock(), vec![TaskError::fail("bad input")]);
}

#[tokio::test]
async fn test_error_panic_in_then_is_recovered() {
    let task = Task::<Counters>::new();
    task.then(|_s: Arc<Counters>, _ctx: Context| async { explode("then panic") });
    counted(&task);

    assert!(task.run(&Context::new()).await.is_ok());
    let s = task.state();
    assert_eq!(s.finally.load(Ordering::SeqCst), 1);
    assert_eq!(s.errors.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_error_panic_in_finally_keeps_the_earlier_result() {
    let task = Task::<Counters>::new();
    task.todo(|_s: Arc<Counters>, _ctx: Context| async { Err(TaskError::fail("boom")) })
        .finally(|_s: Arc<Counters>, _ctx: Context| async { explode("cleanup panic") })
        .on_error(|s: Arc<Counters>, _ctx: Context, err: TaskError| async move {
            s.seen.lock().push(err);
        });

    let err = task.run(&Context::new()).await.unwrap_err();
    assert_eq!(err, TaskError::fail("boom"));
    assert_eq!(
        *task.state().seen.lock(),
        vec![TaskError::fail("boom"), TaskError::fail("cleanup panic")]
    );
}

#[tokio::test]
async fn test_other_panic_propagates_after_finally() {
    let task = Task::<Counters>::new();
    task.then(|_s: Arc<Counters>, _ctx: Context| async {
        if std::hint::black_box(true) {
            panic!("kaboom");
        }
        Ok(())
    });
    counted(&task);

    let runner = task.clone();
    let joined = tokio::spawn(async move { runner.run(&Context::new()).await }).await;

    let payload = joined.unwrap_err().into_panic();
    assert_eq!(payload.downcast_ref::<&str>(), Some(&"kaboom"));

    let s = task.state();
    assert_eq!(s.finally.load(Ordering::SeqCst), 1);
    assert_eq!(s.errors.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_other_panic_in_parallel_step_propagates() {
    let task = Task::<Counters>::new();
    task.todo(|_s: Arc<Counters>, _ctx: Context| async {
        if std::hint::black_box(true) {
            std::panic::panic_any(42u32);
        }
        Ok(())
    });
    counted(&task);

    let runner = task.clone();
    let joined = tokio::spawn(async move { runner.run(&Context::new()).await }).await;

    let payload = joined.unwrap_err().into_panic();
    assert_eq!(payload.downcast_ref::<u32>(), Some(&42));
    assert_eq!(task.state().finally.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_observer_panic_keeps_todo_error_and_context() {
    let task = Task::<Counters>::new();
    task.todo(|_s: Arc<Counters>, _ctx: Context| async { Err(TaskError::fail("boom")) })
        .on_error(|s: Arc<Counters>, _ctx: Context, err: TaskError| async move {
            if err == TaskError::fail("boom") {
                std::panic::panic_any(TaskError::fail("observer panic"));
            }
            s.seen.lock().push(err);
        })
        .finally(|s: Arc<Counters>, ctx: Context| async move {
            s.cleanup_saw.lock().push(ctx.error().cloned());
            Ok(())
        });

    let err = task.run(&Context::new()).await.unwrap_err();
    assert_eq!(err, TaskError::fail("boom"));

    let s = task.state();
    assert_eq!(*s.cleanup_saw.lock(), vec![Some(TaskError::fail("boom"))]);
    assert_eq!(*s.seen.lock(), vec![TaskError::fail("observer panic")]);
}

#[tokio::test]
async fn test_observer_panic_result_is_combined_with_finally_error() {
    let task = Task::<Counters>::new();
    task.todo(|_s: Arc<Counters>, _ctx: Context| async { Err(TaskError::fail("boom")) })
        .on_error(|_s: Arc<Counters>, _ctx: Context, err: TaskError| async move {
            if err == TaskError::fail("boom") {
                std::panic::panic_any(TaskError::fail("observer panic"));
            }
        })
        .finally(|_s: Arc<Counters>, _ctx: Context| async { Err(TaskError::fail("cleanup")) });

    let err = task.run(&Context::new()).await.unwrap_err();
    assert_eq!(err.to_string(), "cleanup: boom");
}

#[tokio::test]
async fn test_then_panic_after_successful_todo_leaves_context_clean() {
    let task = Task::<Counters>::new();
    task.todo(|_s: Arc<Counters>, _ctx: Context| async { Ok(()) })
        .then(|_s: Arc<Counters>, _ctx: Context| async { explode("then panic") })
        .finally(|s: Arc<Counters>, ctx: Context| async move {
            s.cleanup_saw.lock().push(ctx.error().cloned());
            Ok(())
        });

    assert!(task.run(&Context::new()).await.is_ok());
    assert_eq!(*task.state().cleanup_saw.lock(), vec![None]);
}
