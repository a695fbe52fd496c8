pub mod archive_writer;
pub mod maintenance_service;
pub mod svg_renderer;

pub use archive_writer::*;
pub use maintenance_service::*;
pub use svg_renderer::*;
