//! Internal events for metrics emission.
//!
//! Each event struct represents a measurable occurrence in a stream session
//! or an upstream fetch. Events implement the `InternalEvent` trait which
//! records the corresponding Prometheus metric.

use metrics::{counter, gauge, histogram};
use std::time::Duration;
use tracing::trace;

/// Trait for internal events that can be emitted as metrics.
pub trait InternalEvent {
    /// Emit this event as a metric.
    fn emit(self);
}

/// A client connected and its session became active.
pub struct SessionOpened;

impl InternalEvent for SessionOpened {
    fn emit(self) {
        trace!("Session opened");
        counter!("brewery_stream_sessions_opened_total").increment(1);
        gauge!("brewery_stream_sessions_active").increment(1.0);
    }
}

/// An active session reached its terminal state.
pub struct SessionClosed {
    pub lifetime: Duration,
}

impl InternalEvent for SessionClosed {
    fn emit(self) {
        trace!(lifetime_secs = self.lifetime.as_secs_f64(), "Session closed");
        counter!("brewery_stream_sessions_closed_total").increment(1);
        gauge!("brewery_stream_sessions_active").decrement(1.0);
        histogram!("brewery_stream_session_duration_seconds").record(self.lifetime.as_secs_f64());
    }
}

/// A session was refused because its transport cannot flush incrementally.
pub struct StreamingUnsupported;

impl InternalEvent for StreamingUnsupported {
    fn emit(self) {
        trace!("Streaming unsupported");
        counter!("brewery_stream_sessions_unsupported_total").increment(1);
    }
}

/// One frame was written and flushed to a client.
pub struct EventDelivered {
    pub bytes: u64,
}

impl InternalEvent for EventDelivered {
    fn emit(self) {
        trace!(bytes = self.bytes, "Event delivered");
        counter!("brewery_stream_events_delivered_total").increment(1);
        counter!("brewery_stream_event_bytes_total").increment(self.bytes);
    }
}

/// An upstream fetch failed and the tick was skipped.
pub struct FetchFailed {
    pub reason: &'static str,
}

impl InternalEvent for FetchFailed {
    fn emit(self) {
        trace!(reason = self.reason, "Fetch failed");
        counter!("brewery_stream_fetch_failures_total", "reason" => self.reason).increment(1);
    }
}

/// A fetched record could not be serialized and the tick was skipped.
pub struct EncodeFailed;

impl InternalEvent for EncodeFailed {
    fn emit(self) {
        trace!("Encode failed");
        counter!("brewery_stream_encode_failures_total").increment(1);
    }
}

/// Wall-clock time of a successful upstream fetch.
pub struct FetchDuration {
    pub duration: Duration,
}

impl InternalEvent for FetchDuration {
    fn emit(self) {
        trace!(duration_ms = self.duration.as_millis() as u64, "Fetch duration");
        histogram!("brewery_stream_fetch_duration_seconds").record(self.duration.as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::{MetricsController, init_test};

    #[test]
    fn test_events_render() {
        init_test();

        crate::emit!(SessionOpened);
        crate::emit!(EventDelivered { bytes: 42 });
        crate::emit!(FetchFailed { reason: "timeout" });
        crate::emit!(SessionClosed {
            lifetime: Duration::from_secs(3),
        });

        let output = MetricsController::get().unwrap().render();

        assert!(output.contains("brewery_stream_events_delivered_total"));
        assert!(output.contains("brewery_stream_fetch_failures_total{reason=\"timeout\"}"));
        assert!(output.contains("brewery_stream_sessions_active"));
    }
}
