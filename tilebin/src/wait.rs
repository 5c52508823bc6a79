// Copyright 2024 the Tilebin Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bounded waiting on device completion signals.
//!
//! Every wait services the device's event queue, sleeps for a fixed interval
//! and then checks the signal, up to a ceiling. Reaching the ceiling is not
//! an error in itself: the wait logs one diagnostic and returns
//! [`Completion::TimedOut`], and the caller decides what that means.

use std::future::Future;
use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};
use std::time::{Duration, Instant};

use futures_intrusive::channel::shared::{oneshot_channel, OneshotReceiver};

use crate::{Error, Result, Session};

struct NullWake;

impl Wake for NullWake {
    fn wake(self: Arc<Self>) {}
}

/// How often and how long to wait for a completion signal.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WaitPolicy {
    /// Sleep between two checks of the signal.
    pub interval: Duration,
    /// Number of checks before giving up.
    pub max_iterations: u32,
}

impl WaitPolicy {
    /// Policy for queue submissions: 1ms steps, one second in total.
    pub const SUBMISSION: Self = Self {
        interval: Duration::from_millis(1),
        max_iterations: 1000,
    };

    /// Policy for buffer mapping: 50µs steps, five seconds in total.
    pub const MAPPING: Self = Self {
        interval: Duration::from_micros(50),
        max_iterations: 100_000,
    };

    /// Longest time a wait under this policy can take.
    pub fn ceiling(&self) -> Duration {
        self.interval.saturating_mul(self.max_iterations)
    }
}

/// Something that can make progress on pending device callbacks.
pub trait DevicePoller {
    /// Services the event queue without blocking.
    fn poll_events(&self);
}

impl DevicePoller for wgpu::Device {
    fn poll_events(&self) {
        self.poll(wgpu::Maintain::Poll);
    }
}

/// Outcome of a bounded wait.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[must_use]
pub enum Completion<T> {
    /// The signal fired with this value.
    Signaled(T),
    /// The ceiling was reached first.
    TimedOut,
}

impl<T> Completion<T> {
    pub fn is_signaled(&self) -> bool {
        matches!(self, Self::Signaled(_))
    }

    pub fn signaled(self) -> Option<T> {
        match self {
            Self::Signaled(value) => Some(value),
            Self::TimedOut => None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Completion<U> {
        match self {
            Self::Signaled(value) => Completion::Signaled(f(value)),
            Self::TimedOut => Completion::TimedOut,
        }
    }

    /// Converts a timeout into [`Error::MapTimeout`].
    pub fn into_result(self, what: &'static str) -> Result<T> {
        self.signaled().ok_or(Error::MapTimeout { what })
    }
}

/// Polls `fut` until it resolves or `policy` runs out.
///
/// Each iteration calls [`DevicePoller::poll_events`], sleeps for the
/// policy's interval and then polls the future. The wait also stops once the
/// policy's ceiling has elapsed on the wall clock, so oversleeping can't
/// stretch it. On timeout exactly one `error` record is logged, naming
/// `what`.
pub fn wait_with_timeout<P, F>(
    poller: &P,
    fut: F,
    policy: WaitPolicy,
    what: &'static str,
) -> Completion<F::Output>
where
    P: DevicePoller + ?Sized,
    F: Future,
{
    let waker = Waker::from(Arc::new(NullWake));
    let mut context = Context::from_waker(&waker);
    let mut fut = std::pin::pin!(fut);
    if let Poll::Ready(value) = fut.as_mut().poll(&mut context) {
        return Completion::Signaled(value);
    }
    let deadline = Instant::now() + policy.ceiling();
    for _ in 0..policy.max_iterations {
        poller.poll_events();
        std::thread::sleep(policy.interval);
        if let Poll::Ready(value) = fut.as_mut().poll(&mut context) {
            return Completion::Signaled(value);
        }
        if Instant::now() >= deadline {
            break;
        }
    }
    log::error!(
        "Timed out waiting for {what} after {:?}; device work may still be in flight",
        policy.ceiling()
    );
    Completion::TimedOut
}

/// Waits for a value on a oneshot channel fed by a device callback.
///
/// A sender dropped without sending means the callback will never fire; it
/// is reported like a timeout.
pub fn wait_for_signal<P, T>(
    poller: &P,
    receiver: &OneshotReceiver<T>,
    policy: WaitPolicy,
    what: &'static str,
) -> Completion<T>
where
    P: DevicePoller + ?Sized,
{
    match wait_with_timeout(poller, receiver.receive(), policy, what) {
        Completion::Signaled(Some(value)) => Completion::Signaled(value),
        Completion::Signaled(None) => {
            log::error!("Completion callback for {what} was dropped without firing");
            Completion::TimedOut
        }
        Completion::TimedOut => Completion::TimedOut,
    }
}

/// Handle on work submitted to the queue.
///
/// Dropping it doesn't cancel anything; submitted work always runs.
pub struct Submission {
    receiver: OneshotReceiver<()>,
}

impl Submission {
    /// Registers a completion callback for everything submitted to `queue`
    /// so far.
    pub(crate) fn new(queue: &wgpu::Queue) -> Self {
        let (sender, receiver) = oneshot_channel();
        queue.on_submitted_work_done(move || {
            // The receiver may already be gone.
            let _ = sender.send(());
        });
        Self { receiver }
    }

    /// Waits for the submitted work under the session's submission policy.
    pub fn wait(&self, session: &Session) -> Completion<()> {
        wait_for_signal(
            &session.device,
            &self.receiver,
            session.options().submission_wait,
            "submitted work",
        )
    }
}

impl std::fmt::Debug for Submission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Submission").finish_non_exhaustive()
    }
}
