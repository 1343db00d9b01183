//! Transition waiter behavior against a scripted compute provider
//!
//! All tests run on a paused clock, so sleeps complete instantly while the
//! observed durations stay exact.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use ocictl_core::testing::FakeCompute;
use ocictl_core::{
    CoreError, InstanceAction, ProgressEvent, Transition, TransitionSpec, TransitionWaiter,
    WaitOptions,
};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use ocictl_core::LifecycleState::{Running, Starting, Stopped, Stopping, Terminated};

const INSTANCE: &str = "ocid1.instance.oc1..aaaa";

fn options(max_wait_secs: u64, interval_secs: u64) -> WaitOptions {
    WaitOptions::new(
        Duration::from_secs(max_wait_secs),
        Duration::from_secs(interval_secs),
    )
}

#[tokio::test(start_paused = true)]
async fn already_in_target_issues_no_action() {
    let compute = FakeCompute::new(vec![Running]);
    let waiter = TransitionWaiter::new(&compute);

    let outcome = waiter
        .run(INSTANCE, &TransitionSpec::start(), &WaitOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, Transition::AlreadyInState(Running));
    assert_eq!(compute.action_calls(), 0);
    assert_eq!(compute.get_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn stop_when_already_stopped_is_a_no_op() {
    let compute = FakeCompute::new(vec![Stopped]);
    let outcome = TransitionWaiter::new(&compute)
        .run(INSTANCE, &TransitionSpec::stop(), &WaitOptions::default())
        .await
        .unwrap();

    assert_eq!(outcome, Transition::AlreadyInState(Stopped));
    assert_eq!(compute.action_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn precondition_violations_fail_without_polling() {
    let cases = [
        (TransitionSpec::soft_reset(), Stopped),
        (TransitionSpec::start(), Stopping),
        (TransitionSpec::stop(), Starting),
        (TransitionSpec::start(), Terminated),
    ];

    for (spec, current) in cases {
        let compute = FakeCompute::new(vec![current.clone()]);
        let err = TransitionWaiter::new(&compute)
            .run(INSTANCE, &spec, &WaitOptions::default())
            .await
            .unwrap_err();

        match err {
            CoreError::PreconditionNotMet { action, current: seen } => {
                assert_eq!(action, spec.action);
                assert_eq!(seen, current);
            }
            other => panic!("expected PreconditionNotMet, got {other:?}"),
        }
        assert_eq!(compute.action_calls(), 0);
        assert_eq!(compute.get_calls(), 1, "no polls after the state check");
    }
}

#[tokio::test(start_paused = true)]
async fn start_from_stopped_reaches_running_on_third_poll() {
    let compute = FakeCompute::new(vec![Stopped, Starting, Starting, Running]);
    let waiter = TransitionWaiter::new(&compute);

    let outcome = waiter
        .run(INSTANCE, &TransitionSpec::start(), &options(300, 5))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Transition::Completed {
            polls: 3,
            elapsed: Duration::from_secs(10),
        }
    );
    assert_eq!(compute.actions(), vec![InstanceAction::Start]);
    // One state check plus three polls
    assert_eq!(compute.get_calls(), 4);
}

#[tokio::test(start_paused = true)]
async fn success_after_k_intervals_takes_k_plus_one_polls() {
    for k in 0..6u32 {
        let mut states = vec![Running];
        states.extend(std::iter::repeat_n(Stopping, k as usize));
        states.push(Stopped);
        let compute = FakeCompute::new(states);

        let outcome = TransitionWaiter::new(&compute)
            .run(INSTANCE, &TransitionSpec::stop(), &options(60, 5))
            .await
            .unwrap();

        assert_eq!(
            outcome,
            Transition::Completed {
                polls: k + 1,
                elapsed: Duration::from_secs(5 * u64::from(k)),
            }
        );
        assert_eq!(compute.action_calls(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn never_reaching_target_times_out_not_before_max_wait() {
    for (max_wait, interval) in [(30, 5), (12, 5), (1, 5)] {
        let compute = FakeCompute::new(vec![Stopped, Starting]);
        let started = Instant::now();

        let err = TransitionWaiter::new(&compute)
            .run(INSTANCE, &TransitionSpec::start(), &options(max_wait, interval))
            .await
            .unwrap_err();

        let max_wait = Duration::from_secs(max_wait);
        assert!(started.elapsed() >= max_wait);
        match err {
            CoreError::Timeout {
                target,
                last_seen,
                waited,
            } => {
                assert_eq!(target, Running);
                assert_eq!(last_seen, Starting);
                assert!(waited >= max_wait);
                // The final sleep is clamped to the deadline
                assert_eq!(waited, max_wait);
            }
            other => panic!("expected Timeout, got {other:?}"),
        }
        assert_eq!(compute.action_calls(), 1);
    }
}

#[tokio::test(start_paused = true)]
async fn soft_reset_waits_settle_delay_before_first_poll() {
    let compute = FakeCompute::new(vec![Running, Running]);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);
    let waiter = TransitionWaiter::new(&compute)
        .with_progress(Box::new(move |event| sink.lock().unwrap().push(event)));

    let started = Instant::now();
    let outcome = waiter
        .run(INSTANCE, &TransitionSpec::soft_reset(), &options(300, 5))
        .await
        .unwrap();

    assert_eq!(started.elapsed(), Duration::from_secs(5));
    assert_eq!(
        outcome,
        Transition::Completed {
            polls: 1,
            elapsed: Duration::ZERO,
        }
    );
    assert_eq!(compute.actions(), vec![InstanceAction::SoftReset]);

    let events = events.lock().unwrap();
    assert!(matches!(
        events[0],
        ProgressEvent::Started {
            action: InstanceAction::SoftReset,
            ..
        }
    ));
    assert_eq!(
        events[1],
        ProgressEvent::Settling {
            delay: Duration::from_secs(5)
        }
    );
    assert!(matches!(events.last(), Some(ProgressEvent::Completed { .. })));
}

#[tokio::test(start_paused = true)]
async fn settle_delay_does_not_count_against_max_wait() {
    let compute = FakeCompute::new(vec![Running, Starting, Running]);
    let spec = TransitionSpec::soft_reset().with_settle_delay(Duration::from_secs(20));

    let outcome = TransitionWaiter::new(&compute)
        .run(INSTANCE, &spec, &options(10, 5))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        Transition::Completed {
            polls: 2,
            elapsed: Duration::from_secs(5),
        }
    );
}

#[tokio::test(start_paused = true)]
async fn terminal_state_ends_the_wait() {
    let compute = FakeCompute::new(vec![Running, Stopping, Terminated]);

    let err = TransitionWaiter::new(&compute)
        .run(INSTANCE, &TransitionSpec::stop(), &options(300, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::TerminalState { state: Terminated }));
    assert_eq!(compute.get_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn poll_failure_propagates_without_retry() {
    let compute = FakeCompute::new(vec![Stopped, Starting, Starting, Running]).with_get_error_at(2);
    let events = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&events);

    let err = TransitionWaiter::new(&compute)
        .with_progress(Box::new(move |event| sink.lock().unwrap().push(event)))
        .run(INSTANCE, &TransitionSpec::start(), &options(300, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Remote { .. }));
    assert!(err.is_retryable());
    assert_eq!(compute.get_calls(), 3);
    assert_eq!(compute.action_calls(), 1);
    assert!(matches!(
        events.lock().unwrap().last(),
        Some(ProgressEvent::Failed { .. })
    ));
}

#[tokio::test(start_paused = true)]
async fn action_failure_skips_polling() {
    let compute = FakeCompute::new(vec![Stopped]).with_action_error("LimitExceeded");

    let err = TransitionWaiter::new(&compute)
        .run(INSTANCE, &TransitionSpec::start(), &options(300, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Remote { ref message } if message == "LimitExceeded"));
    assert_eq!(compute.get_calls(), 1);
}

#[tokio::test(start_paused = true)]
async fn cancellation_interrupts_the_poll_sleep() {
    let compute = FakeCompute::new(vec![Stopped, Starting]);
    let token = CancellationToken::new();
    let canceller = token.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(7)).await;
        canceller.cancel();
    });

    let started = Instant::now();
    let err = TransitionWaiter::new(&compute)
        .with_cancellation(token)
        .run(INSTANCE, &TransitionSpec::start(), &options(300, 5))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Cancelled));
    assert_eq!(started.elapsed(), Duration::from_secs(7));
    // State check plus polls at 0s and 5s
    assert_eq!(compute.get_calls(), 3);
}

#[tokio::test(start_paused = true)]
async fn cancelled_token_stops_before_any_call() {
    let compute = FakeCompute::new(vec![Stopped]);
    let token = CancellationToken::new();
    token.cancel();

    let err = TransitionWaiter::new(&compute)
        .with_cancellation(token)
        .run(INSTANCE, &TransitionSpec::start(), &WaitOptions::default())
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Cancelled));
    assert_eq!(compute.get_calls(), 0);
}

#[tokio::test(start_paused = true)]
async fn zero_poll_interval_is_rejected_up_front() {
    let compute = FakeCompute::new(vec![Stopped]);

    let err = TransitionWaiter::new(&compute)
        .run(INSTANCE, &TransitionSpec::start(), &options(30, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::Validation(_)));
    assert_eq!(compute.get_calls(), 0);
}
