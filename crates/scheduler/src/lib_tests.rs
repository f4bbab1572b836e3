// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use agx_core::ResumeToken;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::mpsc::unbounded_channel;
use tokio::time::timeout;

fn token(value: &str) -> ResumeToken {
    ResumeToken::new("codex", value)
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(20)).await;
}

#[tokio::test]
async fn jobs_for_the_same_thread_run_one_at_a_time_in_order() {
    let (tx, mut rx) = unbounded_channel::<String>();
    let scheduler = ThreadScheduler::new(move |job: ThreadJob| {
        let tx = tx.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(10)).await;
            let _ = tx.send(job.text);
        }
    });

    scheduler.enqueue(ThreadJob::new("chat", "m1", "first", token("t1")));
    scheduler.enqueue(ThreadJob::new("chat", "m2", "second", token("t1")));

    let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    let second = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(first, "first");
    assert_eq!(second, "second");
}

#[tokio::test]
async fn jobs_for_different_threads_run_concurrently() {
    let counter = Arc::new(AtomicUsize::new(0));
    let concurrent = Arc::new(AtomicUsize::new(0));
    let max_concurrent = Arc::new(AtomicUsize::new(0));

    let counter2 = Arc::clone(&counter);
    let concurrent2 = Arc::clone(&concurrent);
    let max2 = Arc::clone(&max_concurrent);
    let scheduler = ThreadScheduler::new(move |_job: ThreadJob| {
        let counter = Arc::clone(&counter2);
        let concurrent = Arc::clone(&concurrent2);
        let max_concurrent = Arc::clone(&max2);
        async move {
            let now = concurrent.fetch_add(1, Ordering::SeqCst) + 1;
            max_concurrent.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(30)).await;
            concurrent.fetch_sub(1, Ordering::SeqCst);
            counter.fetch_add(1, Ordering::SeqCst);
        }
    });

    scheduler.enqueue(ThreadJob::new("chat", "m1", "a", token("t1")));
    scheduler.enqueue(ThreadJob::new("chat", "m2", "b", token("t2")));

    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(counter.load(Ordering::SeqCst), 2);
    assert!(max_concurrent.load(Ordering::SeqCst) >= 2);
}

#[tokio::test]
async fn cancel_queued_removes_a_job_before_it_runs() {
    let (tx, mut rx) = unbounded_channel::<String>();
    let scheduler = ThreadScheduler::new(move |job: ThreadJob| {
        let tx = tx.clone();
        async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            let _ = tx.send(job.text);
        }
    });

    let progress = MessageRef::new("chat", "progress-1");
    scheduler.enqueue(ThreadJob::new("chat", "m1", "running", token("t1")));
    scheduler.enqueue(ThreadJob::new("chat", "m2", "queued", token("t1")).with_progress_ref(Some(progress.clone())));

    let cancelled = scheduler.cancel_queued("chat", "progress-1");
    assert!(cancelled.is_some());
    assert_eq!(cancelled.unwrap().text, "queued");

    let first = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(first, "running");
    assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err(), "cancelled job must not run");
}

#[tokio::test]
async fn cancel_queued_returns_none_for_an_unknown_progress_ref() {
    let scheduler = ThreadScheduler::new(|_job: ThreadJob| async {});
    assert!(scheduler.cancel_queued("chat", "nonexistent").is_none());
}

#[tokio::test]
async fn a_panicking_job_does_not_stop_subsequent_jobs_on_the_same_thread() {
    let (tx, mut rx) = unbounded_channel::<String>();
    let scheduler = ThreadScheduler::new(move |job: ThreadJob| {
        let tx = tx.clone();
        async move {
            if job.text == "boom" {
                panic!("synthetic failure");
            }
            let _ = tx.send(job.text);
        }
    });

    scheduler.enqueue(ThreadJob::new("chat", "m1", "boom", token("t1")));
    scheduler.enqueue(ThreadJob::new("chat", "m2", "after", token("t1")));

    let after = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(after, "after");
}

#[tokio::test]
async fn note_thread_known_delays_the_first_job_until_the_gate_fires() {
    let (tx, mut rx) = unbounded_channel::<String>();
    let scheduler = ThreadScheduler::new(move |job: ThreadJob| {
        let tx = tx.clone();
        async move {
            let _ = tx.send(job.text);
        }
    });

    let gate = BusyGate::new();
    let tok = token("t1");
    scheduler.note_thread_known(&tok, gate.clone());
    scheduler.enqueue(ThreadJob::new("chat", "m1", "only", tok));

    settle().await;
    assert!(timeout(Duration::from_millis(50), rx.recv()).await.is_err(), "job must wait for the gate");

    gate.set();
    let received = timeout(Duration::from_secs(1), rx.recv()).await.unwrap().unwrap();
    assert_eq!(received, "only");
}

#[tokio::test]
async fn active_thread_is_cleared_once_its_queue_drains() {
    let scheduler = ThreadScheduler::new(|_job: ThreadJob| async {});
    scheduler.enqueue(ThreadJob::new("chat", "m1", "only", token("t1")));
    settle().await;
    assert_eq!(scheduler.active_thread_count(), 0);
}
