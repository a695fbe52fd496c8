pub mod config;
pub mod repositories;
pub mod services;
pub mod state_builder;

pub use config::*;
pub use repositories::*;
pub use services::*;
pub use state_builder::*;
