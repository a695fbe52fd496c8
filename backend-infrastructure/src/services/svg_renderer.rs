use std::path::Path;

use anyhow::anyhow;
use qrcode::render::svg;
use qrcode::{EcLevel, QrCode};
use tokio::fs;

use backend_domain::ports::TicketRenderer;
use backend_domain::{EventInfo, TicketArtifact, TicketRecord};

const QR_SIZE: u32 = 320;

pub const DEFAULT_TICKET_TEMPLATE: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="600" height="400" viewBox="0 0 600 400">
  <rect width="600" height="400" rx="16" fill="#ffffff" stroke="#1f2937" stroke-width="4"/>
  <text x="24" y="48" font-family="sans-serif" font-size="26" font-weight="bold" fill="#111827">{event}</text>
  <text x="24" y="88" font-family="sans-serif" font-size="18" fill="#374151">{attendee}</text>
  <text x="24" y="118" font-family="sans-serif" font-size="16" fill="#6b7280">{ticket_type}</text>
  <text x="24" y="372" font-family="monospace" font-size="16" fill="#111827">{label}</text>
  <g transform="translate(260,40)">{qr}</g>
</svg>
"##;

/// Renders tickets as SVG: the template with the QR graphic and text label
/// substituted into `{qr}`, `{label}`, `{event}`, `{attendee}` and
/// `{ticket_type}`.
pub struct SvgTicketRenderer {
    template: String,
}

impl SvgTicketRenderer {
    pub fn new(template: impl Into<String>) -> Self {
        Self {
            template: template.into(),
        }
    }

    /// Reads the template file, falling back to the built-in layout.
    pub async fn load(path: Option<&str>) -> anyhow::Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        if !Path::new(path).exists() {
            return Err(anyhow!("ticket template not found: {}", path));
        }
        let template = fs::read_to_string(path).await?;
        if !template.contains("{qr}") {
            return Err(anyhow!("ticket template {} has no {{qr}} placeholder", path));
        }
        Ok(Self::new(template))
    }
}

impl Default for SvgTicketRenderer {
    fn default() -> Self {
        Self::new(DEFAULT_TICKET_TEMPLATE)
    }
}

impl TicketRenderer for SvgTicketRenderer {
    fn render(&self, ticket: &TicketRecord, event: &EventInfo) -> anyhow::Result<TicketArtifact> {
        let code = QrCode::with_error_correction_level(ticket.qr_token.as_bytes(), EcLevel::M)
            .map_err(|err| anyhow!("QR generation failed: {}", err))?;
        let qr = code
            .render::<svg::Color>()
            .min_dimensions(QR_SIZE, QR_SIZE)
            .dark_color(svg::Color("#000000"))
            .light_color(svg::Color("#ffffff"))
            .build();
        let qr = strip_xml_declaration(&qr);

        let number = ticket.ticket_number().as_str();
        let document = self
            .template
            .replace("{qr}", qr)
            .replace("{label}", &escape_xml(number))
            .replace("{event}", &escape_xml(&event.name))
            .replace(
                "{attendee}",
                &escape_xml(ticket.attendee_name.as_deref().unwrap_or("")),
            )
            .replace("{ticket_type}", &escape_xml(&ticket.identity.ticket_type));

        Ok(TicketArtifact {
            file_name: format!("{}.svg", number),
            content_type: "image/svg+xml".to_string(),
            bytes: document.into_bytes(),
        })
    }
}

fn strip_xml_declaration(document: &str) -> &str {
    let body = document
        .strip_prefix("<?xml")
        .and_then(|rest| rest.find("?>").map(|end| &rest[end + 2..]))
        .unwrap_or(document);
    body.trim_start()
}

fn escape_xml(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(ch),
        }
    }
    out
}
