// Domain entities

pub mod booking;
pub mod config;
pub mod event;
pub mod issuance;
pub mod payload;
pub mod scan;
pub mod ticket;
pub mod webhook;

pub use booking::*;
pub use config::*;
pub use event::*;
pub use issuance::*;
pub use payload::*;
pub use scan::*;
pub use ticket::*;
pub use webhook::*;
