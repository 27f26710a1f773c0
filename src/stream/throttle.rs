//! Latest-wins stream throttling.
//!
//! Trackers emit at device rate (120-240Hz); feedback UIs repaint far
//! slower. Throttling keeps the newest reading from each interval and drops
//! the rest, so a gradient display always shows the current state without
//! queueing stale history.

use futures::stream::Fuse;
use futures::{Stream, StreamExt, ready};
use pin_project_lite::pin_project;
use std::pin::Pin;
use std::task::{Context, Poll};
use std::time::Duration;
use tokio::time::{Interval, interval};

/// Extension trait to add throttling to any Stream.
pub trait ThrottleExt: Stream {
    /// Emit at most once per interval, keeping only the latest item when
    /// several arrive within one interval.
    fn throttle(self, duration: Duration) -> Throttle<Self>
    where
        Self: Sized,
    {
        Throttle::new(self, duration)
    }
}

impl<T: Stream> ThrottleExt for T {}

pin_project! {
    /// A stream combinator that caps emission rate with latest-wins semantics.
    pub struct Throttle<S: Stream> {
        // Fused: the drain loop polls again after end-of-stream when an
        // item is still waiting on the tick gate
        #[pin]
        stream: Fuse<S>,
        interval: Interval,
        pending: Option<S::Item>,
    }
}

impl<S: Stream> Throttle<S> {
    /// Create a new throttled stream.
    pub fn new(stream: S, duration: Duration) -> Self {
        let mut interval = interval(duration);
        // Delay missed ticks instead of bursting to catch up
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

        Self { stream: stream.fuse(), interval, pending: None }
    }
}

impl<S: Stream> Stream for Throttle<S> {
    type Item = S::Item;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();

        // Drain whatever is ready, keeping only the newest item
        let ended = loop {
            match this.stream.as_mut().poll_next(cx) {
                Poll::Ready(Some(item)) => {
                    *this.pending = Some(item);
                }
                Poll::Ready(None) => break true,
                Poll::Pending => break false,
            }
        };

        if this.pending.is_some() {
            // Gate emission on the interval; the first tick is immediate
            ready!(this.interval.poll_tick(cx));
            return Poll::Ready(this.pending.take());
        }

        if ended { Poll::Ready(None) } else { Poll::Pending }
    }
}
