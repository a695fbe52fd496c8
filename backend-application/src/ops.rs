pub mod inflight_registry;
pub mod ticket_numbers;

pub use inflight_registry::*;
pub use ticket_numbers::*;
