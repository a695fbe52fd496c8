pub mod bulk_render_commands;
pub mod issuance_commands;
pub mod ticket_admin_commands;
pub mod verification_commands;
pub mod webhook_commands;
