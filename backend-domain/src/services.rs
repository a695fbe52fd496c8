// Pure domain services

pub mod batch_plan;
pub mod check_in_policy;

pub use batch_plan::*;
pub use check_in_policy::*;
