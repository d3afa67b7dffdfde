//! Change feed plumbing for catalog collections.
//!
//! Document stores publish a [`ChangeEvent`] after every committed write; live
//! listeners subscribe through the [`EventBus`] abstraction.

pub mod bus;
pub mod envelope;
pub mod event;
pub mod in_memory_bus;

pub use bus::{EventBus, RecvError, Subscription};
pub use envelope::{ChangeEvent, ChangeKind};
pub use event::Event;
pub use in_memory_bus::InMemoryEventBus;
