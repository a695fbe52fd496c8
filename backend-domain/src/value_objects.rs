// Domain value objects
pub mod identifiers;
pub mod payment;
pub mod scan_result;
pub mod ticket_status;
pub mod webhook_status;

pub use identifiers::*;
pub use payment::*;
pub use scan_result::*;
pub use ticket_status::*;
pub use webhook_status::*;
