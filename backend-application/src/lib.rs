// Backend Application Layer

pub mod commands;
pub mod error;
pub mod metrics;
pub mod ops;
pub mod queries;
pub mod security;
pub mod state;

pub use error::AppError;
pub use metrics::Metrics;
pub use security::{CodecError, QrCodec};
pub use state::AppState;
