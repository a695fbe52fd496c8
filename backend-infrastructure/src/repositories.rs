pub mod config_files;
pub mod memory_bookings;
pub mod memory_events;
pub mod memory_scan_logs;
pub mod memory_tickets;
pub mod memory_webhook_ledger;

pub use config_files::*;
pub use memory_bookings::*;
pub use memory_events::*;
pub use memory_scan_logs::*;
pub use memory_tickets::*;
pub use memory_webhook_ledger::*;
