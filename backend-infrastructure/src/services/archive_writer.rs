use std::io::Write;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use chrono::Utc;
use flate2::write::GzEncoder;
use flate2::Compression;
use serde::{Deserialize, Serialize};

use backend_domain::ports::ArchiveWriter;
use backend_domain::TicketArtifact;

#[derive(Debug, Serialize, Deserialize)]
pub struct ArchiveBundle {
    pub generated_at: String,
    pub entries: Vec<ArchiveEntry>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ArchiveEntry {
    pub file_name: String,
    pub content_type: String,
    pub content_base64: String,
}

/// Gzip-compressed JSON bundle of rendered tickets.
#[derive(Debug, Default)]
pub struct GzipBundleWriter;

impl ArchiveWriter for GzipBundleWriter {
    fn content_type(&self) -> &'static str {
        "application/gzip"
    }

    fn file_extension(&self) -> &'static str {
        "json.gz"
    }

    fn write(&self, artifacts: &[TicketArtifact]) -> anyhow::Result<Vec<u8>> {
        let bundle = ArchiveBundle {
            generated_at: Utc::now().to_rfc3339(),
            entries: artifacts
                .iter()
                .map(|artifact| ArchiveEntry {
                    file_name: artifact.file_name.clone(),
                    content_type: artifact.content_type.clone(),
                    content_base64: STANDARD.encode(&artifact.bytes),
                })
                .collect(),
        };
        let json = serde_json::to_vec(&bundle)?;
        let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&json)?;
        Ok(encoder.finish()?)
    }
}
