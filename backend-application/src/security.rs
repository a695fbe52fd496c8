pub mod qr_codec;
pub mod signing;

pub use qr_codec::*;
pub use signing::*;
