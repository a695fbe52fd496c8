pub mod ops_handlers;
pub mod scan_handlers;
pub mod ticket_handlers;
pub mod webhook_handlers;

pub use ops_handlers::*;
pub use scan_handlers::*;
pub use ticket_handlers::*;
pub use webhook_handlers::*;
