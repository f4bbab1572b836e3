//! `ThreadScheduler` FIFO and per-thread isolation: jobs queued against
//! the same resume token run one at a time, in arrival order; jobs on
//! different tokens don't wait on each other.

use agx_core::ResumeToken;
use agx_scheduler::ThreadScheduler;
use parking_lot::Mutex;
use similar_asserts::assert_eq;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;

#[tokio::test]
async fn jobs_on_one_thread_run_strictly_in_arrival_order() {
    let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let done = Arc::new(Notify::new());

    let order_for_job = Arc::clone(&order);
    let done_for_job = Arc::clone(&done);
    let scheduler = ThreadScheduler::new(move |job| {
        let order = Arc::clone(&order_for_job);
        let done = Arc::clone(&done_for_job);
        async move {
            // The first job sleeps; if the scheduler ran jobs for this
            // thread concurrently the second job's text would land in
            // `order` before the first job wakes up.
            if job.text == "first" {
                tokio::time::sleep(Duration::from_millis(30)).await;
            }
            order.lock().push(job.text);
            if order.lock().len() == 2 {
                done.notify_one();
            }
        }
    });

    let token = ResumeToken::new("codex", "T1");
    scheduler.enqueue_resume("chat", "m1", "first", token.clone(), None, None, None, None);
    scheduler.enqueue_resume("chat", "m2", "second", token, None, None, None, None);

    tokio::time::timeout(Duration::from_secs(2), done.notified()).await.expect("both jobs ran");
    assert_eq!(order.lock().as_slice(), &["first".to_string(), "second".to_string()]);
}

#[tokio::test]
async fn jobs_on_different_threads_do_not_wait_on_each_other() {
    let order: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let done = Arc::new(Notify::new());

    let order_for_job = Arc::clone(&order);
    let done_for_job = Arc::clone(&done);
    let scheduler = ThreadScheduler::new(move |job| {
        let order = Arc::clone(&order_for_job);
        let done = Arc::clone(&done_for_job);
        async move {
            // The job belonging to the slow thread sleeps far longer
            // than the fast thread's job; if threads serialised against
            // each other the fast job would only land after the sleep.
            if job.text == "slow" {
                tokio::time::sleep(Duration::from_millis(200)).await;
            }
            order.lock().push(job.text);
            if order.lock().len() == 2 {
                done.notify_one();
            }
        }
    });

    scheduler.enqueue_resume("chat", "m1", "slow", ResumeToken::new("codex", "T-slow"), None, None, None, None);
    scheduler.enqueue_resume("chat", "m2", "fast", ResumeToken::new("codex", "T-fast"), None, None, None, None);

    tokio::time::timeout(Duration::from_secs(2), done.notified()).await.expect("both jobs ran");
    assert_eq!(order.lock().as_slice(), &["fast".to_string(), "slow".to_string()]);
}

#[tokio::test]
async fn cancelling_a_still_queued_job_by_its_progress_message_removes_it() {
    use agx_wire::MessageRef;

    let ran: Arc<Mutex<Vec<String>>> = Arc::new(Mutex::new(Vec::new()));
    let blocker = Arc::new(Notify::new());
    let done = Arc::new(Notify::new());

    let ran_for_job = Arc::clone(&ran);
    let blocker_for_job = Arc::clone(&blocker);
    let done_for_job = Arc::clone(&done);
    let scheduler = ThreadScheduler::new(move |job| {
        let ran = Arc::clone(&ran_for_job);
        let blocker = Arc::clone(&blocker_for_job);
        let done = Arc::clone(&done_for_job);
        async move {
            if job.text == "holds_the_thread" {
                blocker.notified().await;
            }
            ran.lock().push(job.text);
            done.notify_one();
        }
    });

    let token = ResumeToken::new("codex", "T-cancel");
    scheduler.enqueue_resume("chat", "m1", "holds_the_thread", token.clone(), None, None, None, None);
    let cancel_target = MessageRef::new("chat", "progress-2");
    scheduler.enqueue_resume(
        "chat",
        "m2",
        "should_be_cancelled",
        token,
        None,
        None,
        None,
        Some(cancel_target.clone()),
    );

    let cancelled = scheduler.cancel_queued("chat", "progress-2");
    assert!(cancelled.is_some(), "queued job was found and removed before its turn came up");

    blocker.notify_one();
    tokio::time::timeout(Duration::from_secs(2), done.notified()).await.expect("the first job still ran");
    assert_eq!(ran.lock().as_slice(), &["holds_the_thread".to_string()]);
}
