use crate::entities::{EventInfo, TicketArtifact, TicketRecord};

/// Draws the visual ticket (template, QR graphic and label).
pub trait TicketRenderer: Send + Sync {
    fn render(&self, ticket: &TicketRecord, event: &EventInfo) -> anyhow::Result<TicketArtifact>;
}

/// Packages rendered artifacts into one downloadable archive.
pub trait ArchiveWriter: Send + Sync {
    fn content_type(&self) -> &'static str;
    fn file_extension(&self) -> &'static str;
    fn write(&self, artifacts: &[TicketArtifact]) -> anyhow::Result<Vec<u8>>;
}
