use anyhow::anyhow;
use chrono::Utc;
use tokio::time::{Duration, Instant};
use tracing::{info, warn};

use super::issuance_commands::{
    bulk_draft, load_event, mint_ticket, validate_quantity, DEFAULT_ATTENDEE_PREFIX,
};
use crate::{AppError, AppState};
use backend_domain::{
    adaptive_batch_size, attendee_display_name, normalize_optional_text, plan_batches,
    BulkIssueRequest, BulkRenderReport, RenderItemOutcome, TicketArtifact,
};

/// Issues, renders and archives tickets in adaptive batches under the render
/// budget. Persistence runs after rendering; a failed write leaves the
/// artifact in the archive and is reported as a partial success.
pub async fn render_bulk(
    state: &AppState,
    request: BulkIssueRequest,
) -> Result<BulkRenderReport, AppError> {
    let quantity = validate_quantity(request.quantity, state.config.bulk_max_quantity)?;
    let batch_size = request
        .batch_size
        .unwrap_or_else(|| adaptive_batch_size(quantity))
        .clamp(1, quantity as usize);
    let draft = bulk_draft(&request)?;
    let event = load_event(state, &request.event_id).await?;
    let prefix = normalize_optional_text(request.attendee_prefix.clone())
        .unwrap_or_else(|| DEFAULT_ATTENDEE_PREFIX.to_string());

    let deadline = Instant::now() + Duration::from_secs(state.config.render_budget_seconds);
    let batches = plan_batches(quantity, batch_size);
    let batch_count = batches.len() as u32;
    let mut items = Vec::with_capacity(quantity as usize);
    let mut artifacts: Vec<TicketArtifact> = Vec::with_capacity(quantity as usize);
    let mut skipped = 0u32;

    for batch in batches {
        if Instant::now() >= deadline {
            for index in batch {
                skipped += 1;
                items.push(RenderItemOutcome::Failed {
                    sequence: index + 1,
                    reason: "render budget exhausted".to_string(),
                });
            }
            continue;
        }

        for index in batch {
            let sequence = index + 1;
            let attendee = attendee_display_name(&prefix, sequence, quantity);
            let record = match mint_ticket(state, &event, &draft, Some(attendee), Utc::now()) {
                Ok(record) => record,
                Err(err) => {
                    items.push(RenderItemOutcome::Failed {
                        sequence,
                        reason: err.to_string(),
                    });
                    continue;
                }
            };
            let artifact = match state.renderer.render(&record, &event) {
                Ok(artifact) => artifact,
                Err(err) => {
                    warn!(sequence, error = %err, "ticket render failed");
                    items.push(RenderItemOutcome::Failed {
                        sequence,
                        reason: format!("render failed: {}", err),
                    });
                    continue;
                }
            };
            artifacts.push(artifact);

            let ticket_number = record.ticket_number().clone();
            let persisted = match state.tickets.insert(record).await {
                Ok(true) => Ok(()),
                Ok(false) => Err("ticket number already stored".to_string()),
                Err(err) => Err(err.to_string()),
            };
            items.push(match persisted {
                Ok(()) => RenderItemOutcome::Generated {
                    sequence,
                    ticket_number,
                },
                Err(secondary_error) => {
                    warn!(
                        sequence,
                        ticket_number = %ticket_number,
                        error = %secondary_error,
                        "rendered ticket could not be persisted"
                    );
                    RenderItemOutcome::PartialSuccess {
                        sequence,
                        ticket_number,
                        secondary_error,
                    }
                }
            });
        }
        tokio::task::yield_now().await;
    }

    let generated = items.iter().filter(|item| item.is_generated()).count();
    if generated == 0 {
        return Err(AppError::Internal(anyhow!(
            "bulk render produced no tickets out of {}",
            quantity
        )));
    }
    let archive = state.archive.write(&artifacts)?;

    let report = BulkRenderReport {
        requested: quantity,
        batch_size,
        batches: batch_count,
        generated: generated as u32,
        skipped,
        items,
        archive,
    };
    let persistence_errors = report.persistence_errors();
    state
        .metrics
        .record_rendered(generated, persistence_errors);
    state.metrics.record_issued(generated - persistence_errors);
    info!(
        event_id = %event.event_id,
        requested = quantity,
        generated,
        persistence_errors,
        skipped,
        "bulk render finished"
    );
    Ok(report)
}
