//! Event distribution for runtime subscribers.
mod bus;

pub use bus::{Event, EventBus, Topic};
