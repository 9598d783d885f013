//! Metrics and observability infrastructure.
//!
//! - `events`: Internal event types and the `InternalEvent` trait
//! - `controller`: Prometheus recorder singleton rendered by `/metrics`

pub mod controller;
pub mod events;

pub use controller::{MetricsController, init_global, init_test};

/// Macro for emitting metric events.
///
/// Calls `InternalEvent::emit()` on the given event, which records the
/// corresponding Prometheus metric.
///
/// ```ignore
/// use brewery_stream::metrics::events::EventDelivered;
///
/// emit!(EventDelivered { bytes: 312 });
/// ```
#[macro_export]
macro_rules! emit {
    ($event:expr) => {
        $crate::metrics::events::InternalEvent::emit($event)
    };
}
