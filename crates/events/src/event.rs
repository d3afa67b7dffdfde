use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are immutable facts about something that already happened.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "products.updated").
    fn event_type(&self) -> String;

    /// When the event occurred (store time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
